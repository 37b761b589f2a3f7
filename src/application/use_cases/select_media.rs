//! # Select Media Use Case
//!
//! アップロード対象ファイルの選択と撮影日時順への並び替え

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

use crate::application::dto::upload_config::DatePolicy;
use crate::domain::entities::source_file::{CaptureTime, SourceFile, TimeSource};
use crate::domain::errors::SetupError;
use crate::domain::repositories::media_repository::MediaRepository;
use crate::domain::services::chronological_order::ChronologicalOrder;
use crate::domain::services::media_filter::MediaFilter;

/// メディア選択ユースケース
///
/// ディレクトリ直下の対象ファイルを列挙し、撮影日時の昇順に並べる
pub struct SelectMediaUseCase<M: MediaRepository> {
    media_repository: Arc<M>,
}

impl<M: MediaRepository> SelectMediaUseCase<M> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `media_repository` - メディアリポジトリ
    pub fn new(media_repository: Arc<M>) -> Self {
        Self { media_repository }
    }

    /// 対象ファイルを撮影日時順に返す
    ///
    /// # Arguments
    ///
    /// * `dir` - アップロード元ディレクトリ
    /// * `policy` - 撮影日時タグが読めない場合の扱い
    ///
    /// # Errors
    ///
    /// - 対象ファイルが1つもない場合 `SetupError::NoEligibleFiles`
    /// - `DatePolicy::Strict` でタグが読めない場合 `SetupError::UnsortableMedia`
    pub async fn execute(&self, dir: &Path, policy: DatePolicy) -> Result<Vec<SourceFile>> {
        info!("Getting list of media files from '{}'", dir.display());
        let paths = self
            .media_repository
            .list_files(dir)
            .await
            .with_context(|| format!("Failed to list files in '{}'", dir.display()))?;
        let paths = MediaFilter::retain_known(paths);

        if paths.is_empty() {
            return Err(SetupError::NoEligibleFiles(dir.to_path_buf()).into());
        }

        info!("Sorting {} media files", paths.len());
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(captured) = self.capture_time(&path, policy).await? {
                files.push(SourceFile::new(path, captured));
            }
        }

        if files.is_empty() {
            return Err(SetupError::NoEligibleFiles(dir.to_path_buf()).into());
        }

        let files = ChronologicalOrder::sort(files);
        debug!(
            "Sorted files: {:?}",
            files.iter().map(|f| f.basename()).collect::<Vec<_>>()
        );

        Ok(files)
    }

    /// 1ファイルの撮影日時を決める
    ///
    /// 更新日時も読めないファイルは `None` を返し、対象から外す
    async fn capture_time(&self, path: &Path, policy: DatePolicy) -> Result<Option<CaptureTime>> {
        match self.media_repository.read_capture_time(path).await {
            Ok(timestamp) => Ok(Some(CaptureTime::new(timestamp, TimeSource::Exif))),
            Err(e) => match policy {
                DatePolicy::Strict => Err(SetupError::UnsortableMedia(e).into()),
                DatePolicy::FallbackToModified => {
                    debug!("{}; using modification time", e);
                    match self.media_repository.modified_time(path).await {
                        Ok(timestamp) => {
                            Ok(Some(CaptureTime::new(timestamp, TimeSource::FileSystem)))
                        }
                        Err(e) => {
                            warn!(
                                "Skipping '{}': cannot read modification time: {:#}",
                                path.display(),
                                e
                            );
                            Ok(None)
                        }
                    }
                }
            },
        }
    }
}
