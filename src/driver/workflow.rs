//! Workflow Orchestration
//!
//! ワークフローのオーケストレーション

use anyhow::{Context, Result};
use dialoguer::Confirm;
use log::info;
use std::sync::Arc;

use crate::adapter::repositories::file_audit_repository::FileAuditRepository;
use crate::application::dto::upload_config::UploadConfig;
use crate::application::use_cases::assemble_album::{AlbumReport, AssembleAlbumUseCase};
use crate::application::use_cases::delete_album::{DeleteAlbumUseCase, DeleteReport};
use crate::application::use_cases::find_album::FindAlbumUseCase;
use crate::application::use_cases::list_album_photos::{AlbumListing, ListAlbumPhotosUseCase};
use crate::application::use_cases::select_media::SelectMediaUseCase;
use crate::application::use_cases::upload_media::{UploadMediaUseCase, UploadReport};
use crate::domain::errors::SetupError;
use crate::domain::repositories::media_repository::MediaRepository;
use crate::domain::repositories::photo_repository::PhotoRepository;
use crate::domain::repositories::progress_reporter::ProgressReporter;
use crate::domain::services::album_planner::AlbumPlanner;

/// アップロード実行の結果
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub upload: UploadReport,
    pub album: AlbumReport,
}

/// Album Upload Workflow
pub struct AlbumUploadWorkflow<P, M>
where
    P: PhotoRepository + ?Sized + 'static,
    M: MediaRepository,
{
    photo_repository: Arc<P>,
    select_use_case: SelectMediaUseCase<M>,
    progress: Arc<dyn ProgressReporter>,
}

impl<P, M> AlbumUploadWorkflow<P, M>
where
    P: PhotoRepository + ?Sized + 'static,
    M: MediaRepository,
{
    /// Create a new workflow instance with dependency injection
    pub fn new(
        photo_repository: Arc<P>,
        media_repository: Arc<M>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            photo_repository,
            select_use_case: SelectMediaUseCase::new(media_repository),
            progress,
        }
    }

    /// Execute the upload workflow
    ///
    /// 致命的なエラーはリモート呼び出しやファイル読み取りの前に検出する
    pub async fn execute(&self, config: &UploadConfig) -> Result<RunSummary> {
        info!("Starting upload to album '{}'", config.album_title);

        if !config.source_dir.is_dir() {
            return Err(SetupError::NotADirectory(config.source_dir.clone()).into());
        }

        FindAlbumUseCase::new(self.photo_repository.clone())
            .ensure_absent(&config.album_title)
            .await?;
        println!("✓ Album '{}' does not exist yet", config.album_title);

        let files = self
            .select_use_case
            .execute(&config.source_dir, config.date_policy)
            .await?;
        println!(
            "✓ Found {} media files in {}",
            files.len(),
            config.source_dir.display()
        );

        let audit = Arc::new(FileAuditRepository::create(&config.audit_log)?);
        println!("✓ Writing audit log to {}", audit.path().display());

        let upload = UploadMediaUseCase::new(
            self.photo_repository.clone(),
            audit.clone(),
            self.progress.clone(),
        )
        .execute(&files, config)
        .await;

        let plan = AlbumPlanner::plan(&files, &upload.photo_ids).ok_or_else(|| {
            SetupError::AlbumCreation {
                title: config.album_title.clone(),
                reason: "no file was uploaded".to_string(),
            }
        })?;

        let album = AssembleAlbumUseCase::new(
            self.photo_repository.clone(),
            audit,
            self.progress.clone(),
        )
        .execute(&plan, config)
        .await?;

        let summary = RunSummary { upload, album };
        print_summary(&summary);
        Ok(summary)
    }
}

fn print_summary(summary: &RunSummary) {
    let upload = &summary.upload;
    let album = &summary.album;

    println!(
        "✓ Uploaded {} files ({} duplicates)",
        upload.uploaded_count() + upload.duplicate_count(),
        upload.duplicate_count()
    );
    if upload.failed_count() > 0 {
        println!("⚠ {} files failed to upload:", upload.failed_count());
        for result in upload.results.iter().filter(|r| !r.is_success()) {
            println!("  {}", result.path.display());
        }
    }
    println!(
        "✓ Album '{}' ({}) with {} photos, cover {}",
        album.album.title,
        album.album.id,
        album.attached + 1,
        album.album.cover_photo_id
    );
    if album.attach_failed > 0 {
        println!("⚠ {} photos could not be added to the album", album.attach_failed);
    }
    println!("  Final stage: {}", album.stage);
}

/// List Photos Workflow
pub struct ListPhotosWorkflow<P: PhotoRepository + ?Sized> {
    list_use_case: ListAlbumPhotosUseCase<P>,
}

impl<P: PhotoRepository + ?Sized> ListPhotosWorkflow<P> {
    pub fn new(photo_repository: Arc<P>) -> Self {
        Self {
            list_use_case: ListAlbumPhotosUseCase::new(photo_repository),
        }
    }

    /// アルバム内の写真タイトルを1行ずつ表示する
    pub async fn execute(&self, title: &str) -> Result<AlbumListing> {
        let listing = self.list_use_case.execute(title).await?;
        info!(
            "Album '{}' ({}) has {} photos",
            title,
            listing.album_id,
            listing.photos.len()
        );
        for photo in &listing.photos {
            println!("{}", photo.title);
        }
        Ok(listing)
    }
}

/// Delete Album Workflow
pub struct DeleteAlbumWorkflow<P: PhotoRepository + ?Sized + 'static> {
    delete_use_case: DeleteAlbumUseCase<P>,
}

impl<P: PhotoRepository + ?Sized + 'static> DeleteAlbumWorkflow<P> {
    pub fn new(photo_repository: Arc<P>, progress: Arc<dyn ProgressReporter>) -> Self {
        Self {
            delete_use_case: DeleteAlbumUseCase::new(photo_repository, progress),
        }
    }

    /// 確認の上でアルバムと写真をすべて削除する
    ///
    /// 確認で拒否された場合は `None`
    pub async fn execute(
        &self,
        title: &str,
        assume_yes: bool,
        workers: usize,
    ) -> Result<Option<DeleteReport>> {
        let plan = self.delete_use_case.prepare(title).await?;

        if !assume_yes {
            let prompt = format!(
                "Delete album '{}' with {} photos?",
                title,
                plan.photo_ids.len()
            );
            let confirmed = Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
                .context("Failed to read confirmation")?;
            if !confirmed {
                println!("Aborted.");
                return Ok(None);
            }
        }

        let report = self.delete_use_case.execute(plan, workers).await?;
        println!("✓ Deleted {} photos", report.deleted);
        if report.failed > 0 {
            println!("⚠ {} photos could not be deleted", report.failed);
        }
        if report.album_deleted {
            println!("✓ Deleted album '{}'", title);
        }
        Ok(Some(report))
    }
}
