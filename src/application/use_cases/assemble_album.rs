//! # Assemble Album Use Case
//!
//! アルバムの作成、写真の追加、並び替え

use anyhow::Result;
use log::{error, info, warn};
use std::sync::Arc;

use crate::application::dto::upload_config::UploadConfig;
use crate::application::worker_pool::WorkerPool;
use crate::domain::entities::album::{AlbumHandle, AlbumPlan, AlbumStage};
use crate::domain::entities::identifiers::PhotoId;
use crate::domain::errors::SetupError;
use crate::domain::repositories::audit_repository::{AuditEntry, AuditRepository};
use crate::domain::repositories::photo_repository::PhotoRepository;
use crate::domain::repositories::progress_reporter::ProgressReporter;

/// アルバム組み立ての結果
#[derive(Debug, Clone)]
pub struct AlbumReport {
    pub album: AlbumHandle,
    /// 到達した段階
    pub stage: AlbumStage,
    /// 追加に成功した写真（カバーを除く）
    pub attached: usize,
    /// 追加に失敗した写真
    pub attach_failed: usize,
}

/// アルバム組み立てユースケース
pub struct AssembleAlbumUseCase<P, A>
where
    P: PhotoRepository + ?Sized + 'static,
    A: AuditRepository + ?Sized + 'static,
{
    photo_repository: Arc<P>,
    audit_repository: Arc<A>,
    progress: Arc<dyn ProgressReporter>,
}

impl<P, A> AssembleAlbumUseCase<P, A>
where
    P: PhotoRepository + ?Sized + 'static,
    A: AuditRepository + ?Sized + 'static,
{
    pub fn new(
        photo_repository: Arc<P>,
        audit_repository: Arc<A>,
        progress: Arc<dyn ProgressReporter>,
    ) -> Self {
        Self {
            photo_repository,
            audit_repository,
            progress,
        }
    }

    /// 計画に従ってアルバムを組み立てる
    ///
    /// # Arguments
    ///
    /// * `plan` - 撮影日時順の写真ID（先頭がカバー）
    /// * `config` - アルバム名と並列度
    ///
    /// # Returns
    ///
    /// 作成に失敗した場合のみエラー。追加や並び替えの失敗はログに残して続行する。
    pub async fn execute(&self, plan: &AlbumPlan, config: &UploadConfig) -> Result<AlbumReport> {
        let mut stage = AlbumStage::NotCreated;

        let album_id = self
            .photo_repository
            .create_album(&config.album_title, plan.cover())
            .await
            .map_err(|e| SetupError::AlbumCreation {
                title: config.album_title.clone(),
                reason: e.to_string(),
            })?;
        stage.advance();
        info!(
            "Created album '{}' ({}) with cover {}",
            config.album_title,
            album_id,
            plan.cover()
        );
        let album = AlbumHandle::new(album_id, config.album_title.clone(), plan.cover().clone());

        let attached = self.attach_all(&album, plan, config).await;
        let attach_failed = plan.to_attach().len() - attached.len();
        stage.advance();

        // カバー + 追加に成功した写真を計画の順序で
        let ordered: Vec<PhotoId> = plan
            .ordered()
            .iter()
            .filter(|id| *id == plan.cover() || attached.contains(id))
            .cloned()
            .collect();

        match self
            .photo_repository
            .reorder_album(&album.id, &ordered)
            .await
        {
            Ok(()) => {
                stage.advance();
                info!("Reordered {} photos in album '{}'", ordered.len(), album.title);
            }
            Err(e) => {
                error!("Failed to reorder album '{}': {}", album.title, e);
            }
        }

        Ok(AlbumReport {
            album,
            stage,
            attached: attached.len(),
            attach_failed,
        })
    }

    /// カバー以外の写真を並列に追加し、成功したIDを返す
    async fn attach_all(
        &self,
        album: &AlbumHandle,
        plan: &AlbumPlan,
        config: &UploadConfig,
    ) -> Vec<PhotoId> {
        let to_attach = plan.to_attach().to_vec();
        if to_attach.is_empty() {
            return Vec::new();
        }

        self.progress.start("Adding to album", to_attach.len() as u64);

        let pool = WorkerPool::new(config.workers, config.stagger);
        let photo_repository = self.photo_repository.clone();
        let audit_repository = self.audit_repository.clone();
        let progress = self.progress.clone();
        let album_id = album.id.clone();

        let completed = pool
            .run(to_attach, move |photo_id| {
                let photo_repository = photo_repository.clone();
                let audit_repository = audit_repository.clone();
                let progress = progress.clone();
                let album_id = album_id.clone();
                async move {
                    let result = photo_repository.attach_photo(&album_id, &photo_id).await;
                    progress.advance();
                    match result {
                        Ok(()) => {
                            let entry = AuditEntry::Attached {
                                photo_id: photo_id.clone(),
                                album_id,
                            };
                            if let Err(e) = audit_repository.record(&entry).await {
                                warn!("Failed to write audit log: {}", e);
                            }
                            Some(photo_id)
                        }
                        Err(e) => {
                            error!("Failed to add {} to album {}: {}", photo_id, album_id, e);
                            None
                        }
                    }
                }
            })
            .await;

        self.progress.finish();

        completed.into_iter().filter_map(|(_, id)| id).collect()
    }
}
