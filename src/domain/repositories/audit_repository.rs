//! # Audit Repository Trait
//!
//! 中断時の手動復旧のための追記専用ログ

use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;

#[cfg(test)]
use mockall::automock;

use crate::domain::entities::identifiers::{AlbumId, PhotoId};

/// 監査ログの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEntry {
    /// ファイルがアップロードされた（重複検出を含む）
    Uploaded { path: PathBuf, photo_id: PhotoId },
    /// 写真がアルバムに追加された
    Attached { photo_id: PhotoId, album_id: AlbumId },
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEntry::Uploaded { path, photo_id } => {
                write!(f, "Uploaded '{}':{}", path.display(), photo_id)
            }
            AuditEntry::Attached { photo_id, album_id } => {
                write!(f, "Added {} to album {}", photo_id, album_id)
            }
        }
    }
}

/// 監査リポジトリ
///
/// アップロードや追加が完了するたびに1行ずつ追記される
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> Result<()>;
}
