//! # List Album Photos Use Case

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::application::use_cases::find_album::FindAlbumUseCase;
use crate::domain::entities::identifiers::AlbumId;
use crate::domain::repositories::photo_repository::{AlbumPhoto, PhotoRepository};

/// アルバム内の写真一覧
#[derive(Debug, Clone)]
pub struct AlbumListing {
    pub album_id: AlbumId,
    pub photos: Vec<AlbumPhoto>,
}

/// アルバム内の写真を列挙するユースケース
pub struct ListAlbumPhotosUseCase<P: PhotoRepository + ?Sized> {
    photo_repository: Arc<P>,
    find_album: FindAlbumUseCase<P>,
}

impl<P: PhotoRepository + ?Sized> ListAlbumPhotosUseCase<P> {
    pub fn new(photo_repository: Arc<P>) -> Self {
        Self {
            find_album: FindAlbumUseCase::new(photo_repository.clone()),
            photo_repository,
        }
    }

    /// タイトルでアルバムを解決し、写真をアルバム内の順序で返す
    pub async fn execute(&self, title: &str) -> Result<AlbumListing> {
        let album_id = self.find_album.require(title).await?;
        let photos = self
            .photo_repository
            .list_album_photos(&album_id)
            .await
            .with_context(|| format!("Failed to list photos in album '{}'", title))?;

        Ok(AlbumListing { album_id, photos })
    }
}
