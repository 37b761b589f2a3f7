//! # Media Repository Trait
//!
//! ローカルのメディアファイルの列挙とメタデータ読み取りを抽象化

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

use crate::domain::errors::MetadataError;

/// メディアリポジトリ
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MediaRepository: Send + Sync {
    /// ディレクトリ直下の通常ファイルを列挙する（再帰しない）
    ///
    /// 返す順序がディレクトリの列挙順であり、撮影日時が同じファイルの並びに使われる
    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// 埋め込みの撮影日時タグ（`"YYYY:MM:DD HH:MM:SS"`）を読む
    async fn read_capture_time(&self, path: &Path) -> Result<NaiveDateTime, MetadataError>;

    /// ファイルの最終更新日時を読む
    async fn modified_time(&self, path: &Path) -> Result<NaiveDateTime>;
}
