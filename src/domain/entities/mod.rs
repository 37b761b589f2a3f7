//! # Domain Entities
//!
//! ビジネスエンティティとバリューオブジェクトを定義するモジュール
//!
//! ## エンティティ
//!
//! - **SourceFile**: アップロード対象ファイルと撮影日時
//! - **UploadResult**: 1ファイル分のアップロード結果
//! - **AlbumHandle / AlbumStage**: 作成済みアルバムと組み立ての進行状態
//! - **PhotoId / AlbumId**: リモート識別子

pub mod album;
pub mod identifiers;
pub mod source_file;
pub mod upload_result;
