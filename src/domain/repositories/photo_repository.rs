//! # Photo Repository Trait
//!
//! 写真共有サービス（アルバムと写真）の操作を抽象化

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::fs::File;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::identifiers::{AlbumId, PhotoId};
use crate::domain::errors::RemoteError;

/// アップロード要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// リモート側のタイトル（ファイル名をそのまま使う）
    pub title: String,
    /// 送信するファイル名
    pub file_name: String,
    /// リモート側の重複検出を有効にするか
    pub dedup: bool,
}

/// アップロード成功時の応答
///
/// 重複検出は失敗ではなく、既存の識別子を再利用する成功として扱う
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Uploaded(PhotoId),
    Duplicate(PhotoId),
}

impl UploadOutcome {
    pub fn photo_id(&self) -> &PhotoId {
        match self {
            UploadOutcome::Uploaded(id) | UploadOutcome::Duplicate(id) => id,
        }
    }
}

/// アルバム内の写真
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumPhoto {
    pub id: PhotoId,
    pub title: String,
}

/// 写真リポジトリ
///
/// リモートサービスのクライアントハンドルはワーカー間で共有される（呼び出しごとに状態を持たない）
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    /// アルバム一覧（タイトル → 識別子）
    async fn list_albums(&self) -> Result<HashMap<String, AlbumId>, RemoteError>;

    /// カバー写真を指定してアルバムを作成する
    ///
    /// カバー写真は作成と同時にアルバムのメンバーになる
    async fn create_album(&self, title: &str, cover: &PhotoId) -> Result<AlbumId, RemoteError>;

    /// ファイルを1つアップロードする
    ///
    /// # Arguments
    ///
    /// * `request` - タイトルと重複検出フラグ
    /// * `media` - この試行のために開いたばかりのファイル（呼び出し側は試行ごとに開き直す）
    async fn upload_photo(
        &self,
        request: &UploadRequest,
        media: File,
    ) -> Result<UploadOutcome, RemoteError>;

    /// 写真をアルバムに追加する
    async fn attach_photo(&self, album: &AlbumId, photo: &PhotoId) -> Result<(), RemoteError>;

    /// アルバム内の並びを指定した順序で置き換える
    async fn reorder_album(&self, album: &AlbumId, ordered: &[PhotoId])
        -> Result<(), RemoteError>;

    /// アルバム内の写真をアルバム内の順序で返す
    async fn list_album_photos(&self, album: &AlbumId) -> Result<Vec<AlbumPhoto>, RemoteError>;

    /// 写真を削除する
    async fn delete_photo(&self, photo: &PhotoId) -> Result<(), RemoteError>;

    /// アルバムを削除する（写真は残る）
    async fn delete_album(&self, album: &AlbumId) -> Result<(), RemoteError>;
}
