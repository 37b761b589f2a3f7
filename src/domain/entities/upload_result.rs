//! # UploadResult Value Object
//!
//! 1ファイル分のアップロード結果（リトライを使い切った後の最終結果）

use std::path::{Path, PathBuf};

use super::identifiers::PhotoId;

/// アップロードの最終状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    /// 新規にアップロードされた
    Uploaded,
    /// 重複として検出され、既存の識別子を採用した
    Duplicate,
    /// リトライを使い切っても失敗した
    Failed(String),
}

/// アップロード結果
///
/// ソースファイル1つにつき、1回の実行で高々1つだけ作られる
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub file_name: String,
    pub path: PathBuf,
    pub photo_id: Option<PhotoId>,
    pub status: UploadStatus,
}

impl UploadResult {
    /// 成功した（新規アップロード）結果を作成
    pub fn uploaded(path: &Path, file_name: &str, photo_id: PhotoId) -> Self {
        Self {
            file_name: file_name.to_string(),
            path: path.to_path_buf(),
            photo_id: Some(photo_id),
            status: UploadStatus::Uploaded,
        }
    }

    /// 重複検出による成功結果を作成
    pub fn duplicate(path: &Path, file_name: &str, photo_id: PhotoId) -> Self {
        Self {
            file_name: file_name.to_string(),
            path: path.to_path_buf(),
            photo_id: Some(photo_id),
            status: UploadStatus::Duplicate,
        }
    }

    /// 失敗結果を作成
    pub fn failed(path: &Path, file_name: &str, reason: impl Into<String>) -> Self {
        Self {
            file_name: file_name.to_string(),
            path: path.to_path_buf(),
            photo_id: None,
            status: UploadStatus::Failed(reason.into()),
        }
    }

    /// アップロードが成功したか（重複も成功扱い）
    ///
    /// ```
    /// use std::path::Path;
    /// use flickr_knob::domain::entities::identifiers::PhotoId;
    /// use flickr_knob::domain::entities::upload_result::UploadResult;
    ///
    /// let dup = UploadResult::duplicate(Path::new("a.jpg"), "a.jpg", PhotoId::new("42"));
    /// assert!(dup.is_success());
    ///
    /// let failed = UploadResult::failed(Path::new("b.jpg"), "b.jpg", "timeout");
    /// assert!(!failed.is_success());
    /// ```
    pub fn is_success(&self) -> bool {
        !matches!(self.status, UploadStatus::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploaded_result() {
        let result = UploadResult::uploaded(Path::new("/d/a.jpg"), "a.jpg", PhotoId::new("1"));
        assert!(result.is_success());
        assert_eq!(result.status, UploadStatus::Uploaded);
        assert_eq!(result.photo_id, Some(PhotoId::new("1")));
    }

    #[test]
    fn test_failed_result_has_no_photo_id() {
        let result = UploadResult::failed(Path::new("/d/a.jpg"), "a.jpg", "503");
        assert!(!result.is_success());
        assert!(result.photo_id.is_none());
        assert_eq!(result.status, UploadStatus::Failed("503".to_string()));
    }
}
