//! # Find Album Use Case
//!
//! アルバムタイトルの解決

use anyhow::{Context, Result};
use log::{error, info};
use std::sync::Arc;

use crate::domain::entities::identifiers::AlbumId;
use crate::domain::errors::SetupError;
use crate::domain::repositories::photo_repository::PhotoRepository;

/// アルバム検索ユースケース
pub struct FindAlbumUseCase<P: PhotoRepository + ?Sized> {
    photo_repository: Arc<P>,
}

impl<P: PhotoRepository + ?Sized> FindAlbumUseCase<P> {
    /// 新しいユースケースを作成
    pub fn new(photo_repository: Arc<P>) -> Self {
        Self { photo_repository }
    }

    /// タイトルに一致するアルバムの識別子を返す
    pub async fn find(&self, title: &str) -> Result<Option<AlbumId>> {
        info!("Getting list of albums");
        let albums = self
            .photo_repository
            .list_albums()
            .await
            .context("Failed to get list of albums")?;

        Ok(albums.get(title).cloned())
    }

    /// タイトルに一致するアルバムの識別子を返す（無ければ致命的エラー）
    pub async fn require(&self, title: &str) -> Result<AlbumId> {
        match self.find(title).await? {
            Some(album_id) => Ok(album_id),
            None => {
                error!("Did not find album with name '{}'", title);
                Err(SetupError::AlbumNotFound(title.to_string()).into())
            }
        }
    }

    /// 同じタイトルのアルバムが無いことを確認する
    ///
    /// 作成APIはタイトルの一意性を保証しないため、アップロード開始前に検査する
    pub async fn ensure_absent(&self, title: &str) -> Result<()> {
        if self.find(title).await?.is_some() {
            error!("Duplicate album name: '{}'", title);
            return Err(SetupError::DuplicateAlbum(title.to_string()).into());
        }
        Ok(())
    }
}
