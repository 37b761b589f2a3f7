//! Flickr Photo Repository Implementation
//!
//! PhotoRepositoryのFlickr実装

use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use tokio::fs::File;

use crate::adapter::flickr::client::FlickrClient;
use crate::adapter::flickr::models::{
    CreatePhotosetReply, EmptyReply, PhotosetListReply, PhotosetPhotosReply, UploadReply,
};
use crate::domain::entities::identifiers::{AlbumId, PhotoId};
use crate::domain::errors::RemoteError;
use crate::domain::repositories::photo_repository::{
    AlbumPhoto, PhotoRepository, UploadOutcome, UploadRequest,
};

/// 1ページあたりの最大件数
const PER_PAGE: &str = "500";

/// Flickrベースの写真リポジトリ
pub struct FlickrPhotoRepository {
    client: FlickrClient,
}

impl FlickrPhotoRepository {
    pub fn new(client: FlickrClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PhotoRepository for FlickrPhotoRepository {
    async fn list_albums(&self) -> Result<HashMap<String, AlbumId>, RemoteError> {
        let mut albums = HashMap::new();
        let mut page = 1u32;

        loop {
            let page_param = page.to_string();
            let reply: PhotosetListReply = self
                .client
                .call(
                    "flickr.photosets.getList",
                    &[("page", page_param.as_str()), ("per_page", PER_PAGE)],
                )
                .await?;

            for photoset in reply.photosets.photoset {
                albums.insert(photoset.title.content, AlbumId::new(photoset.id));
            }

            if page >= reply.photosets.pages {
                break;
            }
            page += 1;
        }

        debug!("Found {} albums", albums.len());
        Ok(albums)
    }

    async fn create_album(&self, title: &str, cover: &PhotoId) -> Result<AlbumId, RemoteError> {
        let reply: CreatePhotosetReply = self
            .client
            .call(
                "flickr.photosets.create",
                &[("title", title), ("primary_photo_id", cover.as_str())],
            )
            .await?;
        Ok(AlbumId::new(reply.photoset.id))
    }

    async fn upload_photo(
        &self,
        request: &UploadRequest,
        media: File,
    ) -> Result<UploadOutcome, RemoteError> {
        let reply = self
            .client
            .upload(&request.title, &request.file_name, request.dedup, media)
            .await?;

        Ok(match reply {
            UploadReply::Uploaded(id) => UploadOutcome::Uploaded(PhotoId::new(id)),
            UploadReply::Duplicate(id) => UploadOutcome::Duplicate(PhotoId::new(id)),
        })
    }

    async fn attach_photo(&self, album: &AlbumId, photo: &PhotoId) -> Result<(), RemoteError> {
        let _: EmptyReply = self
            .client
            .call(
                "flickr.photosets.addPhoto",
                &[("photoset_id", album.as_str()), ("photo_id", photo.as_str())],
            )
            .await?;
        Ok(())
    }

    async fn reorder_album(
        &self,
        album: &AlbumId,
        ordered: &[PhotoId],
    ) -> Result<(), RemoteError> {
        let photo_ids = ordered
            .iter()
            .map(PhotoId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let _: EmptyReply = self
            .client
            .call(
                "flickr.photosets.reorderPhotos",
                &[("photoset_id", album.as_str()), ("photo_ids", photo_ids.as_str())],
            )
            .await?;
        Ok(())
    }

    async fn list_album_photos(&self, album: &AlbumId) -> Result<Vec<AlbumPhoto>, RemoteError> {
        let mut photos = Vec::new();
        let mut page = 1u32;

        loop {
            let page_param = page.to_string();
            let reply: PhotosetPhotosReply = self
                .client
                .call(
                    "flickr.photosets.getPhotos",
                    &[
                        ("photoset_id", album.as_str()),
                        ("page", page_param.as_str()),
                        ("per_page", PER_PAGE),
                    ],
                )
                .await?;

            photos.extend(reply.photoset.photo.into_iter().map(|photo| AlbumPhoto {
                id: PhotoId::new(photo.id),
                title: photo.title,
            }));

            if page >= reply.photoset.pages {
                break;
            }
            page += 1;
        }

        Ok(photos)
    }

    async fn delete_photo(&self, photo: &PhotoId) -> Result<(), RemoteError> {
        debug!("Deleting photo {}", photo);
        let _: EmptyReply = self
            .client
            .call("flickr.photos.delete", &[("photo_id", photo.as_str())])
            .await?;
        Ok(())
    }

    async fn delete_album(&self, album: &AlbumId) -> Result<(), RemoteError> {
        debug!("Deleting album {}", album);
        let _: EmptyReply = self
            .client
            .call("flickr.photosets.delete", &[("photoset_id", album.as_str())])
            .await?;
        Ok(())
    }
}
