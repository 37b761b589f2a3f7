//! # Delete Album Use Case
//!
//! アルバム内の写真をすべて削除し、最後にアルバム自体を削除する

use anyhow::{Context, Result};
use log::{error, info, warn};
use std::sync::Arc;

use crate::application::use_cases::find_album::FindAlbumUseCase;
use crate::application::worker_pool::WorkerPool;
use crate::domain::entities::identifiers::{AlbumId, PhotoId};
use crate::domain::repositories::photo_repository::PhotoRepository;
use crate::domain::repositories::progress_reporter::ProgressReporter;

/// 削除対象
#[derive(Debug, Clone)]
pub struct DeletePlan {
    pub title: String,
    pub album_id: AlbumId,
    pub photo_ids: Vec<PhotoId>,
}

/// 削除結果
#[derive(Debug, Clone, Default)]
pub struct DeleteReport {
    pub deleted: usize,
    pub failed: usize,
    /// アルバム自体を削除したか
    pub album_deleted: bool,
}

/// アルバム削除ユースケース
///
/// 確認プロンプトを挟めるよう、対象の解決 (`prepare`) と削除 (`execute`) を分けている
pub struct DeleteAlbumUseCase<P: PhotoRepository + ?Sized + 'static> {
    photo_repository: Arc<P>,
    find_album: FindAlbumUseCase<P>,
    progress: Arc<dyn ProgressReporter>,
}

impl<P: PhotoRepository + ?Sized + 'static> DeleteAlbumUseCase<P> {
    pub fn new(photo_repository: Arc<P>, progress: Arc<dyn ProgressReporter>) -> Self {
        Self {
            find_album: FindAlbumUseCase::new(photo_repository.clone()),
            photo_repository,
            progress,
        }
    }

    /// アルバムと写真を解決する
    pub async fn prepare(&self, title: &str) -> Result<DeletePlan> {
        let album_id = self.find_album.require(title).await?;
        let photo_ids = self
            .photo_repository
            .list_album_photos(&album_id)
            .await
            .with_context(|| format!("Failed to list photos in album '{}'", title))?
            .into_iter()
            .map(|photo| photo.id)
            .collect();

        Ok(DeletePlan {
            title: title.to_string(),
            album_id,
            photo_ids,
        })
    }

    /// 写真を並列に削除し、アルバムがまだ残っていれば削除する
    ///
    /// 最後の写真が消えるとサービス側でアルバムも消えることがあるため、
    /// アルバムの削除前にタイトルを引き直す
    pub async fn execute(&self, plan: DeletePlan, workers: usize) -> Result<DeleteReport> {
        let total = plan.photo_ids.len();
        let mut report = DeleteReport::default();

        if total > 0 {
            self.progress.start("Deleting", total as u64);

            let photo_repository = self.photo_repository.clone();
            let progress = self.progress.clone();
            let completed = WorkerPool::new(workers, std::time::Duration::ZERO)
                .run(plan.photo_ids, move |photo_id| {
                    let photo_repository = photo_repository.clone();
                    let progress = progress.clone();
                    async move {
                        let result = photo_repository.delete_photo(&photo_id).await;
                        progress.advance();
                        match result {
                            Ok(()) => true,
                            Err(e) => {
                                error!("Failed to delete photo {}: {}", photo_id, e);
                                false
                            }
                        }
                    }
                })
                .await;

            self.progress.finish();

            report.deleted = completed.iter().filter(|(_, ok)| *ok).count();
            report.failed = total - report.deleted;
            info!("Deleted {} of {} photos", report.deleted, total);
        }

        match self.find_album.find(&plan.title).await? {
            Some(album_id) => {
                self.photo_repository
                    .delete_album(&album_id)
                    .await
                    .with_context(|| format!("Failed to delete album '{}'", plan.title))?;
                info!("Deleted album '{}' ({})", plan.title, album_id);
                report.album_deleted = true;
            }
            None => {
                warn!("Album '{}' no longer exists", plan.title);
            }
        }

        Ok(report)
    }
}
