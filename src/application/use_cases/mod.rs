//! # Use Cases
//!
//! アプリケーション固有のビジネスフロー
//!
//! ## ユースケース一覧
//!
//! - **select_media**: ファイル選択と撮影日時による並び替え
//! - **upload_media**: ワーカープールによる並列アップロード（再試行付き）
//! - **find_album**: タイトルからアルバムを解決、重複タイトルの検査
//! - **assemble_album**: アルバム作成、写真の追加、並び替え
//! - **list_album_photos**: アルバム内の写真一覧
//! - **delete_album**: アルバムとその写真の削除

pub mod assemble_album;
pub mod delete_album;
pub mod find_album;
pub mod list_album_photos;
pub mod select_media;
pub mod upload_media;
