//! # Upload Media Use Case
//!
//! ワーカープールによる並列アップロード（ファイルごとの再試行付き）

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::File;
use tokio::time::sleep;

use crate::application::dto::upload_config::{RetryPolicy, UploadConfig};
use crate::application::worker_pool::WorkerPool;
use crate::domain::entities::identifiers::PhotoId;
use crate::domain::entities::source_file::SourceFile;
use crate::domain::entities::upload_result::{UploadResult, UploadStatus};
use crate::domain::errors::RemoteError;
use crate::domain::repositories::audit_repository::{AuditEntry, AuditRepository};
use crate::domain::repositories::photo_repository::{
    PhotoRepository, UploadOutcome, UploadRequest,
};
use crate::domain::repositories::progress_reporter::ProgressReporter;

/// 1ファイルのアップロード失敗
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("cannot open '{path}': {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// アップロード結果のサマリー
#[derive(Debug, Clone, Default)]
pub struct UploadReport {
    /// 撮影日時順に並んだ結果（ソースファイルと同じ順序）
    pub results: Vec<UploadResult>,
    /// 成功したファイルのファイル名 → 写真ID
    pub photo_ids: HashMap<String, PhotoId>,
}

impl UploadReport {
    pub fn uploaded_count(&self) -> usize {
        self.count(|status| matches!(status, UploadStatus::Uploaded))
    }

    pub fn duplicate_count(&self) -> usize {
        self.count(|status| matches!(status, UploadStatus::Duplicate))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|status| matches!(status, UploadStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&UploadStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }
}

/// メディアアップロードユースケース
///
/// 失敗したファイルはログに残して除外するだけで、実行全体は中止しない
pub struct UploadMediaUseCase<P, A>
where
    P: PhotoRepository + ?Sized + 'static,
    A: AuditRepository + ?Sized + 'static,
{
    photo_repository: Arc<P>,
    audit_repository: Arc<A>,
    progress: Arc<dyn ProgressReporter>,
}

impl<P, A> UploadMediaUseCase<P, A>
where
    P: PhotoRepository + ?Sized + 'static,
    A: AuditRepository + ?Sized + 'static,
{
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `photo_repository` - 写真リポジトリ（ワーカー間で共有）
    /// * `audit_repository` - 監査ログ
    /// * `progress` - 進捗表示
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

    /// ファイルを並列にアップロードする
    ///
    /// # Arguments
    ///
    /// * `files` - 撮影日時順のソースファイル
    /// * `config` - アップロード設定（並列度、再試行、重複検出）
    ///
    /// # Returns
    ///
    /// 全ワーカーの完了後に1か所で集計した結果
    pub async fn execute(&self, files: &[SourceFile], config: &UploadConfig) -> UploadReport {
        if files.is_empty() {
            return UploadReport::default();
        }

        info!("Uploading {} files", files.len());
        self.progress.start("Uploading", files.len() as u64);

        let pool = WorkerPool::new(config.workers, config.stagger);
        let photo_repository = self.photo_repository.clone();
        let audit_repository = self.audit_repository.clone();
        let progress = self.progress.clone();
        let dedup = config.dedup;
        let retry = config.retry;

        let completed = pool
            .run(files.to_vec(), move |file| {
                let photo_repository = photo_repository.clone();
                let audit_repository = audit_repository.clone();
                let progress = progress.clone();
                async move {
                    let result =
                        upload_file(photo_repository.as_ref(), &file, dedup, retry).await;
                    if let Some(photo_id) = &result.photo_id {
                        let entry = AuditEntry::Uploaded {
                            path: file.path().to_path_buf(),
                            photo_id: photo_id.clone(),
                        };
                        if let Err(e) = audit_repository.record(&entry).await {
                            warn!("Failed to write audit log: {}", e);
                        }
                    }
                    progress.advance();
                    result
                }
            })
            .await;

        self.progress.finish();

        let report = aggregate(files, completed);
        info!(
            "Uploaded {} files ({} duplicates, {} failed)",
            report.uploaded_count() + report.duplicate_count(),
            report.duplicate_count(),
            report.failed_count()
        );
        report
    }
}

/// 完了順の結果をソースファイル順に並べ直し、ファイル名 → 写真IDの対応を作る
fn aggregate(files: &[SourceFile], completed: Vec<(usize, UploadResult)>) -> UploadReport {
    let mut slots: Vec<Option<UploadResult>> = vec![None; files.len()];
    for (index, result) in completed {
        if let Some(slot) = slots.get_mut(index) {
            *slot = Some(result);
        }
    }

    let mut photo_ids = HashMap::new();
    let results: Vec<UploadResult> = slots
        .into_iter()
        .zip(files)
        .map(|(slot, file)| {
            slot.unwrap_or_else(|| {
                UploadResult::failed(file.path(), file.basename(), "upload did not complete")
            })
        })
        .inspect(|result| {
            if let Some(photo_id) = &result.photo_id {
                photo_ids.insert(result.file_name.clone(), photo_id.clone());
            }
        })
        .collect();

    UploadReport { results, photo_ids }
}

/// 1ファイルをアップロードして最終結果を返す
async fn upload_file<P: PhotoRepository + ?Sized>(
    photo_repository: &P,
    file: &SourceFile,
    dedup: bool,
    retry: RetryPolicy,
) -> UploadResult {
    let request = UploadRequest {
        title: file.basename().to_string(),
        file_name: file.basename().to_string(),
        dedup,
    };

    match upload_with_retry(photo_repository, file.path(), &request, retry).await {
        Ok(UploadOutcome::Uploaded(photo_id)) => {
            info!("Uploaded '{}' as {}", file.basename(), photo_id);
            UploadResult::uploaded(file.path(), file.basename(), photo_id)
        }
        Ok(UploadOutcome::Duplicate(photo_id)) => {
            info!("Duplicate photo '{}' with ID {}", file.basename(), photo_id);
            UploadResult::duplicate(file.path(), file.basename(), photo_id)
        }
        Err(e) => {
            error!("Failed to upload '{}': {}", file.path().display(), e);
            UploadResult::failed(file.path(), file.basename(), e.to_string())
        }
    }
}

/// 一時的なエラーの間だけ再試行しながらアップロードする
///
/// ファイルは試行ごとに開き直す。失敗した試行で読み進められたストリームは再利用できない。
/// 開いたファイルは `upload_photo` に移動され、どの終了経路でもその試行の中で閉じられる。
/// 最後の試行のエラーが返される。
pub async fn upload_with_retry<P: PhotoRepository + ?Sized>(
    photo_repository: &P,
    path: &Path,
    request: &UploadRequest,
    retry: RetryPolicy,
) -> Result<UploadOutcome, UploadError> {
    let attempts = retry.attempts();
    let mut attempt = 1;

    loop {
        debug!(
            "Uploading '{}' (try {}/{})",
            path.display(),
            attempt,
            attempts
        );
        let media = File::open(path).await.map_err(|source| UploadError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        match photo_repository.upload_photo(request, media).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) if e.is_transient() && attempt < attempts => {
                let delay = retry.delay_for(attempt);
                debug!(
                    "Failed to upload '{}' (try {}/{}), retrying in {}ms: {}",
                    path.display(),
                    attempt,
                    attempts,
                    delay.as_millis(),
                    e
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                debug!(
                    "Failed to upload '{}' (try {}/{}): {}",
                    path.display(),
                    attempt,
                    attempts,
                    e
                );
                return Err(e.into());
            }
        }
    }
}
