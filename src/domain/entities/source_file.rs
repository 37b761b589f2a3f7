//! # SourceFile Entity
//!
//! アップロード対象ファイルのビジネス表現

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// 撮影日時の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeSource {
    /// EXIFの DateTimeOriginal タグ
    Exif,
    /// ファイルシステムの最終更新日時
    FileSystem,
}

/// 並び替えに使う撮影日時
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTime {
    pub timestamp: NaiveDateTime,
    pub source: TimeSource,
}

impl CaptureTime {
    pub fn new(timestamp: NaiveDateTime, source: TimeSource) -> Self {
        Self { timestamp, source }
    }
}

/// アップロード対象ファイル
///
/// File Selector が作成し、Date Extractor が撮影日時を埋めた後は不変。
/// 1回の実行の間だけ存在する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    basename: String,
    captured: CaptureTime,
}

impl SourceFile {
    /// 新しいソースファイルを作成
    ///
    /// # Arguments
    ///
    /// * `path` - ファイルのパス
    /// * `captured` - 並び替えに使う撮影日時
    pub fn new(path: impl Into<PathBuf>, captured: CaptureTime) -> Self {
        let path = path.into();
        let basename = basename_of(&path);
        Self {
            path,
            basename,
            captured,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ファイル名（アップロード時のタイトルにも使う）
    pub fn basename(&self) -> &str {
        &self.basename
    }

    pub fn taken_at(&self) -> NaiveDateTime {
        self.captured.timestamp
    }

    pub fn time_source(&self) -> TimeSource {
        self.captured.source
    }
}

/// パスの最終要素を文字列で返す
pub fn basename_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
