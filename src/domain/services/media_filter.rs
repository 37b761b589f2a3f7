//! # Media Filter Service
//!
//! アップロード対象の拡張子判定

use std::path::Path;

/// アップロード対象の拡張子（小文字）
pub const KNOWN_SUFFIXES: &[&str] = &["jpg", "jpeg", "mov", "mp4"];

/// メディアフィルタサービス
pub struct MediaFilter;

impl MediaFilter {
    /// ファイル名の拡張子が対象かどうか（大文字小文字を区別しない）
    ///
    /// ```
    /// use flickr_knob::domain::services::media_filter::MediaFilter;
    ///
    /// assert!(MediaFilter::is_known_suffix("IMG_0001.JPG"));
    /// assert!(MediaFilter::is_known_suffix("clip.mp4"));
    /// assert!(!MediaFilter::is_known_suffix("notes.txt"));
    /// assert!(!MediaFilter::is_known_suffix("README"));
    /// ```
    pub fn is_known_suffix(file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                KNOWN_SUFFIXES.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    /// 対象拡張子のパスだけを順序を保って残す
    pub fn retain_known<P: AsRef<Path>>(paths: Vec<P>) -> Vec<P> {
        paths
            .into_iter()
            .filter(|path| {
                path.as_ref()
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(Self::is_known_suffix)
                    .unwrap_or(false)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_known_suffixes_case_insensitive() {
        assert!(MediaFilter::is_known_suffix("a.jpg"));
        assert!(MediaFilter::is_known_suffix("a.JPEG"));
        assert!(MediaFilter::is_known_suffix("a.Mov"));
        assert!(MediaFilter::is_known_suffix("a.MP4"));
    }

    #[test]
    fn test_unknown_suffixes() {
        assert!(!MediaFilter::is_known_suffix("c.txt"));
        assert!(!MediaFilter::is_known_suffix("raw.cr2"));
        assert!(!MediaFilter::is_known_suffix("jpg"));
        assert!(!MediaFilter::is_known_suffix(".jpg.bak"));
    }

    #[test]
    fn test_retain_known_keeps_order() {
        let paths = vec![
            PathBuf::from("/d/b.jpg"),
            PathBuf::from("/d/c.txt"),
            PathBuf::from("/d/a.jpg"),
            PathBuf::from("/d/v.MOV"),
        ];
        let kept = MediaFilter::retain_known(paths);
        assert_eq!(
            kept,
            vec![
                PathBuf::from("/d/b.jpg"),
                PathBuf::from("/d/a.jpg"),
                PathBuf::from("/d/v.MOV"),
            ]
        );
    }
}
