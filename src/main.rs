//! flickr-knob - Flickr album uploader
//!
//! ディレクトリの写真を新しい Flickr アルバムにアップロード

// coverage_nightly cfg が設定されている場合のみ coverage_attribute を有効化
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use flickr_knob::adapter::config::Credentials;
use flickr_knob::adapter::flickr::client::FlickrClient;
use flickr_knob::adapter::logging::init_logging;
use flickr_knob::adapter::progress::IndicatifProgress;
use flickr_knob::adapter::repositories::file_media_repository::FileMediaRepository;
use flickr_knob::adapter::repositories::flickr_photo_repository::FlickrPhotoRepository;
use flickr_knob::driver::{
    AlbumUploadWorkflow, Args, Command, DeleteAlbumWorkflow, ListPhotosWorkflow,
};

#[cfg_attr(coverage_nightly, coverage(off))]
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.loglevel)?;

    match args.command {
        Command::Upload(upload) => {
            let config = upload.to_config();
            let photos = photo_repository(Credentials::from_env()?)?;
            let workflow = AlbumUploadWorkflow::new(
                photos,
                Arc::new(FileMediaRepository::new()),
                Arc::new(IndicatifProgress::new()),
            );
            workflow.execute(&config).await?;
        }
        Command::List { album } => {
            let photos = photo_repository(Credentials::from_env()?)?;
            ListPhotosWorkflow::new(photos).execute(&album).await?;
        }
        Command::Delete {
            album,
            yes,
            threads,
        } => {
            let photos = photo_repository(Credentials::for_delete()?)?;
            DeleteAlbumWorkflow::new(photos, Arc::new(IndicatifProgress::new()))
                .execute(&album, yes, threads)
                .await?;
        }
    }

    Ok(())
}

#[cfg_attr(coverage_nightly, coverage(off))]
fn photo_repository(credentials: Credentials) -> Result<Arc<FlickrPhotoRepository>> {
    let client = FlickrClient::new(credentials)?;
    Ok(Arc::new(FlickrPhotoRepository::new(client)))
}
