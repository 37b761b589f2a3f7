//! File Media Repository Implementation
//!
//! MediaRepositoryのファイルシステム実装（EXIFの撮影日時と更新日時）

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime};
use exif::{In, Reader, Tag, Value};
use log::{debug, info, warn};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::domain::errors::MetadataError;
use crate::domain::repositories::media_repository::MediaRepository;

/// EXIF の日時形式
const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// ファイルシステムベースのメディアリポジトリ
pub struct FileMediaRepository;

impl FileMediaRepository {
    pub fn new() -> Self {
        Self
    }

    /// ディレクトリ直下の通常ファイルをファイル名順に列挙する
    fn list_files_internal(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                // リンク切れのシンボリックリンクは読み飛ばす
                Err(e) if e.depth() > 0 => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Failed to read directory {}", dir.display()))
                }
            };
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        info!("Found {} files in {}", files.len(), dir.display());
        Ok(files)
    }

    /// `DateTimeOriginal` タグを読む
    fn read_capture_time_internal(path: &Path) -> Result<NaiveDateTime, MetadataError> {
        let unreadable = |message: String| MetadataError::Unreadable {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
        let mut reader = BufReader::new(file);

        let exif = match Reader::new().read_from_container(&mut reader) {
            Ok(exif) => exif,
            Err(exif::Error::NotFound(_)) => {
                return Err(MetadataError::MissingTag {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(unreadable(e.to_string())),
        };

        let field = exif
            .get_field(Tag::DateTimeOriginal, In::PRIMARY)
            .ok_or_else(|| MetadataError::MissingTag {
                path: path.to_path_buf(),
            })?;

        let raw = match &field.value {
            Value::Ascii(values) => values
                .first()
                .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
                .unwrap_or_default(),
            other => format!("{:?}", other),
        };

        parse_exif_datetime(&raw).ok_or_else(|| MetadataError::Malformed {
            path: path.to_path_buf(),
            value: raw.clone(),
        })
    }

    fn modified_time_internal(path: &Path) -> Result<NaiveDateTime> {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to read modification time of {}", path.display()))?;
        let local: DateTime<Local> = modified.into();
        Ok(local.naive_local())
    }
}

/// `"YYYY:MM:DD HH:MM:SS"` をパースする
fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim_end_matches('\0').trim();
    NaiveDateTime::parse_from_str(s, EXIF_DATETIME_FORMAT).ok()
}

#[async_trait]
impl MediaRepository for FileMediaRepository {
    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || Self::list_files_internal(&dir))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }

    async fn read_capture_time(&self, path: &Path) -> Result<NaiveDateTime, MetadataError> {
        let owned = path.to_path_buf();
        let result = tokio::task::spawn_blocking(move || Self::read_capture_time_internal(&owned))
            .await
            .map_err(|e| MetadataError::Unreadable {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        if let Err(e) = &result {
            debug!("No capture time: {}", e);
        }
        result
    }

    async fn modified_time(&self, path: &Path) -> Result<NaiveDateTime> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::modified_time_internal(&path))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }
}

impl Default for FileMediaRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, NaiveDate, Timelike};
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    /// 最小の JPEG（APP1 の EXIF に DateTimeOriginal だけを持つ）
    fn jpeg_with_date(date: &str) -> Vec<u8> {
        assert_eq!(date.len(), 19);
        let mut tiff: Vec<u8> = Vec::new();
        // header (big endian), IFD0 at 8
        tiff.extend_from_slice(b"MM\x00\x2a\x00\x00\x00\x08");
        // IFD0: ExifIFDPointer -> 26
        tiff.extend_from_slice(&[0x00, 0x01]);
        tiff.extend_from_slice(&[0x87, 0x69, 0x00, 0x04, 0x00, 0x00, 0x00, 0x01]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x1a]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        // Exif IFD: DateTimeOriginal, ASCII x 20 at 44
        tiff.extend_from_slice(&[0x00, 0x01]);
        tiff.extend_from_slice(&[0x90, 0x03, 0x00, 0x02, 0x00, 0x00, 0x00, 0x14]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x2c]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        tiff.extend_from_slice(date.as_bytes());
        tiff.push(0);

        let mut app1 = b"Exif\x00\x00".to_vec();
        app1.extend_from_slice(&tiff);
        let len = (app1.len() + 2) as u16;

        let mut jpeg = vec![0xff, 0xd8, 0xff, 0xe1];
        jpeg.extend_from_slice(&len.to_be_bytes());
        jpeg.extend_from_slice(&app1);
        jpeg.extend_from_slice(&[0xff, 0xd9]);
        jpeg
    }

    #[test]
    fn test_parse_exif_datetime() {
        let dt = parse_exif_datetime("2024:01:15 14:30:00").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);

        assert!(parse_exif_datetime("2024:01:15 14:30:00\0").is_some());
        assert!(parse_exif_datetime("2024-01-15 14:30:00").is_none());
        assert!(parse_exif_datetime("    :  :     :  :  ").is_none());
    }

    #[tokio::test]
    async fn test_list_files_top_level_only_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"b").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        std::fs::write(dir.path().join("c.txt"), b"c").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("d.jpg"), b"d").unwrap();

        let files = FileMediaRepository::new()
            .list_files(dir.path())
            .await
            .unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "c.txt"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_list_files_follows_symlinked_photos() {
        let dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let target = elsewhere.path().join("real.jpg");
        std::fs::write(&target, b"jpg").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"a").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("linked.jpg")).unwrap();
        std::os::unix::fs::symlink(elsewhere.path(), dir.path().join("album")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.jpg"), dir.path().join("broken.jpg"))
            .unwrap();

        let files = FileMediaRepository::new()
            .list_files(dir.path())
            .await
            .unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "linked.jpg"]);
    }

    #[tokio::test]
    async fn test_list_files_missing_dir() {
        let result = FileMediaRepository::new()
            .list_files(Path::new("/nonexistent/photos"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_read_capture_time() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, jpeg_with_date("2019:08:01 07:30:00")).unwrap();

        let ts = FileMediaRepository::new()
            .read_capture_time(&path)
            .await
            .unwrap();

        let expected = NaiveDate::from_ymd_opt(2019, 8, 1)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap();
        assert_eq!(ts, expected);
    }

    #[tokio::test]
    async fn test_read_capture_time_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, jpeg_with_date("not a date at all!!")).unwrap();

        let err = FileMediaRepository::new()
            .read_capture_time(&path)
            .await
            .unwrap_err();

        assert!(matches!(err, MetadataError::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_read_capture_time_without_exif() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jpg");
        std::fs::write(&path, [0xff, 0xd8, 0xff, 0xd9]).unwrap();

        let err = FileMediaRepository::new()
            .read_capture_time(&path)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MetadataError::MissingTag { .. } | MetadataError::Unreadable { .. }
        ));
    }

    #[tokio::test]
    async fn test_read_capture_time_missing_file() {
        let err = FileMediaRepository::new()
            .read_capture_time(Path::new("/nonexistent/a.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, MetadataError::Unreadable { .. }));
    }

    #[tokio::test]
    async fn test_modified_time() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.mov");
        let file = File::create(&path).unwrap();
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_565_000_000);
        file.set_modified(mtime).unwrap();
        drop(file);

        let ts = FileMediaRepository::new()
            .modified_time(&path)
            .await
            .unwrap();

        let expected: DateTime<Local> = mtime.into();
        assert_eq!(ts, expected.naive_local());
    }
}
