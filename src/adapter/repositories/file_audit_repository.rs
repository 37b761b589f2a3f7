//! File Audit Repository Implementation
//!
//! 監査ログをプレーンテキストファイルに1行ずつ追記する

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::domain::repositories::audit_repository::{AuditEntry, AuditRepository};

/// ファイルベースの監査リポジトリ
pub struct FileAuditRepository {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl FileAuditRepository {
    /// ログファイルを作成する（既存の内容は切り詰める）
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create audit log {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Arc::new(Mutex::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1行書き込んでフラッシュする
    fn append_line(file: &Mutex<File>, path: &Path, line: &str) -> Result<()> {
        let mut file = file
            .lock()
            .map_err(|_| anyhow::anyhow!("Audit log lock poisoned"))?;
        writeln!(file, "{}", line)
            .and_then(|_| file.flush())
            .with_context(|| format!("Failed to write audit log {}", path.display()))
    }
}

#[async_trait]
impl AuditRepository for FileAuditRepository {
    async fn record(&self, entry: &AuditEntry) -> Result<()> {
        let file = self.file.clone();
        let path = self.path.clone();
        let line = entry.to_string();
        tokio::task::spawn_blocking(move || Self::append_line(&file, &path, &line))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }
}
