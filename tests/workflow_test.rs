//! Workflow Integration Tests
//!
//! AlbumUploadWorkflow などをインメモリの写真サービスに対して実行する統合テスト

use async_trait::async_trait;
use chrono::NaiveDateTime;
use flickr_knob::adapter::progress::IndicatifProgress;
use flickr_knob::adapter::repositories::file_media_repository::FileMediaRepository;
use flickr_knob::application::dto::upload_config::{DatePolicy, RetryPolicy, UploadConfig};
use flickr_knob::domain::entities::album::AlbumStage;
use flickr_knob::domain::entities::identifiers::{AlbumId, PhotoId};
use flickr_knob::domain::errors::{MetadataError, RemoteError, SetupError};
use flickr_knob::domain::repositories::media_repository::MediaRepository;
use flickr_knob::domain::repositories::photo_repository::{
    AlbumPhoto, PhotoRepository, UploadOutcome, UploadRequest,
};
use flickr_knob::driver::workflow::{AlbumUploadWorkflow, DeleteAlbumWorkflow, ListPhotosWorkflow};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// インメモリの写真サービス
#[derive(Default)]
struct FakeFlickr {
    state: Mutex<FakeState>,
    /// タイトル → アップロード完了までの遅延
    delays: HashMap<String, Duration>,
    /// タイトル → 一時的エラーを返す回数
    transient_failures: HashMap<String, u32>,
    /// タイトル → 既存の写真ID
    duplicates: HashMap<String, String>,
    /// 常に致命的エラーになるタイトル
    fatal: HashSet<String>,
    list_albums_calls: AtomicUsize,
}

#[derive(Default)]
struct FakeState {
    next_id: u64,
    albums: HashMap<String, AlbumId>,
    album_photos: HashMap<AlbumId, Vec<PhotoId>>,
    titles: HashMap<PhotoId, String>,
    upload_attempts: HashMap<String, u32>,
    completion_order: Vec<String>,
    empty_reads: u32,
}

impl FakeState {
    fn new_id(&mut self) -> String {
        self.next_id += 1;
        format!("{}", 1000 + self.next_id)
    }
}

impl FakeFlickr {
    fn with_album(self, title: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = AlbumId::new(state.new_id());
            state.albums.insert(title.to_string(), id.clone());
            state.album_photos.insert(id, Vec::new());
        }
        self
    }

    /// アルバム内の写真タイトルをアルバム内の順序で返す
    fn album_titles(&self, title: &str) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let Some(album) = state.albums.get(title) else {
            return Vec::new();
        };
        state.album_photos[album]
            .iter()
            .map(|id| state.titles.get(id).cloned().unwrap_or_else(|| id.to_string()))
            .collect()
    }

    fn attempts(&self, title: &str) -> u32 {
        let state = self.state.lock().unwrap();
        state.upload_attempts.get(title).copied().unwrap_or(0)
    }

    fn total_attempts(&self) -> u32 {
        self.state.lock().unwrap().upload_attempts.values().sum()
    }
}

#[async_trait]
impl PhotoRepository for FakeFlickr {
    async fn list_albums(&self) -> Result<HashMap<String, AlbumId>, RemoteError> {
        self.list_albums_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().unwrap().albums.clone())
    }

    async fn create_album(&self, title: &str, cover: &PhotoId) -> Result<AlbumId, RemoteError> {
        let mut state = self.state.lock().unwrap();
        if !state.titles.contains_key(cover) {
            return Err(RemoteError::Fatal("Photo not found".to_string()));
        }
        let id = AlbumId::new(state.new_id());
        state.albums.insert(title.to_string(), id.clone());
        state.album_photos.insert(id.clone(), vec![cover.clone()]);
        Ok(id)
    }

    async fn upload_photo(
        &self,
        request: &UploadRequest,
        mut media: File,
    ) -> Result<UploadOutcome, RemoteError> {
        let mut bytes = Vec::new();
        media
            .read_to_end(&mut bytes)
            .await
            .map_err(|e| RemoteError::Fatal(e.to_string()))?;

        if let Some(delay) = self.delays.get(&request.title) {
            tokio::time::sleep(*delay).await;
        }

        let mut state = self.state.lock().unwrap();
        if bytes.is_empty() {
            state.empty_reads += 1;
        }
        let attempt = {
            let attempts = state.upload_attempts.entry(request.title.clone()).or_default();
            *attempts += 1;
            *attempts
        };

        if attempt <= self.transient_failures.get(&request.title).copied().unwrap_or(0) {
            return Err(RemoteError::Transient("503 Service Unavailable".to_string()));
        }
        if self.fatal.contains(&request.title) {
            return Err(RemoteError::Fatal("Filetype was not recognised".to_string()));
        }
        if request.dedup {
            if let Some(existing) = self.duplicates.get(&request.title) {
                let id = PhotoId::new(existing.clone());
                state.titles.insert(id.clone(), request.title.clone());
                state.completion_order.push(request.title.clone());
                return Ok(UploadOutcome::Duplicate(id));
            }
        }

        let id = PhotoId::new(state.new_id());
        state.titles.insert(id.clone(), request.title.clone());
        state.completion_order.push(request.title.clone());
        Ok(UploadOutcome::Uploaded(id))
    }

    async fn attach_photo(&self, album: &AlbumId, photo: &PhotoId) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        let photos = state
            .album_photos
            .get_mut(album)
            .ok_or_else(|| RemoteError::Fatal("Photoset not found".to_string()))?;
        photos.push(photo.clone());
        Ok(())
    }

    async fn reorder_album(
        &self,
        album: &AlbumId,
        ordered: &[PhotoId],
    ) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        let photos = state
            .album_photos
            .get_mut(album)
            .ok_or_else(|| RemoteError::Fatal("Photoset not found".to_string()))?;
        let current: HashSet<&PhotoId> = photos.iter().collect();
        let requested: HashSet<&PhotoId> = ordered.iter().collect();
        if current != requested {
            return Err(RemoteError::Fatal("Photo not in set".to_string()));
        }
        *photos = ordered.to_vec();
        Ok(())
    }

    async fn list_album_photos(&self, album: &AlbumId) -> Result<Vec<AlbumPhoto>, RemoteError> {
        let state = self.state.lock().unwrap();
        let photos = state
            .album_photos
            .get(album)
            .ok_or_else(|| RemoteError::Fatal("Photoset not found".to_string()))?;
        Ok(photos
            .iter()
            .map(|id| AlbumPhoto {
                id: id.clone(),
                title: state.titles.get(id).cloned().unwrap_or_default(),
            })
            .collect())
    }

    async fn delete_photo(&self, photo: &PhotoId) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.titles.remove(photo);
        for photos in state.album_photos.values_mut() {
            photos.retain(|id| id != photo);
        }
        // 空になったアルバムはサービス側で消える
        let emptied: HashSet<AlbumId> = state
            .album_photos
            .iter()
            .filter(|(_, photos)| photos.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        state.albums.retain(|_, id| !emptied.contains(id));
        Ok(())
    }

    async fn delete_album(&self, album: &AlbumId) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        state.albums.retain(|_, id| id != album);
        state.album_photos.remove(album);
        Ok(())
    }
}

/// 呼び出し回数を数えるメディアリポジトリ
#[derive(Default)]
struct CountingMedia {
    inner: FileMediaRepository,
    calls: AtomicUsize,
}

#[async_trait]
impl MediaRepository for CountingMedia {
    async fn list_files(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list_files(dir).await
    }

    async fn read_capture_time(&self, path: &Path) -> Result<NaiveDateTime, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.read_capture_time(path).await
    }

    async fn modified_time(&self, path: &Path) -> anyhow::Result<NaiveDateTime> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.modified_time(path).await
    }
}

/// EXIFのないファイルを書き、更新日時を基準時刻 + `offset_secs` にする
fn write_media(dir: &Path, name: &str, offset_secs: u64) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("not really a {}", name)).unwrap();
    let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_560_000_000 + offset_secs);
    std::fs::File::options()
        .write(true)
        .open(&path)
        .unwrap()
        .set_modified(mtime)
        .unwrap();
    path
}

fn test_config(title: &str, source: &Path, logs: &Path) -> UploadConfig {
    let mut config = UploadConfig::new(title, source);
    config.retry = RetryPolicy::immediate(3);
    config.stagger = Duration::ZERO;
    config.audit_log = logs.join(format!("{}.log", title));
    config
}

fn workflow(
    fake: &Arc<FakeFlickr>,
    media: &Arc<CountingMedia>,
) -> AlbumUploadWorkflow<FakeFlickr, CountingMedia> {
    AlbumUploadWorkflow::new(
        fake.clone(),
        media.clone(),
        Arc::new(IndicatifProgress::hidden()),
    )
}

#[tokio::test]
async fn test_upload_orders_album_by_capture_time() {
    let source = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write_media(source.path(), "b.jpg", 200);
    write_media(source.path(), "a.jpg", 100);
    write_media(source.path(), "c.txt", 0);

    let fake = Arc::new(FakeFlickr::default());
    let media = Arc::new(CountingMedia::default());
    let config = test_config("Summer", source.path(), logs.path());

    let summary = workflow(&fake, &media).execute(&config).await.unwrap();

    assert_eq!(fake.album_titles("Summer"), vec!["a.jpg", "b.jpg"]);
    assert_eq!(fake.attempts("c.txt"), 0);
    assert_eq!(summary.upload.uploaded_count(), 2);
    assert_eq!(summary.album.stage, AlbumStage::Reordered);

    let a_id = summary.upload.photo_ids["a.jpg"].clone();
    assert_eq!(summary.album.album.cover_photo_id, a_id);

    let audit = std::fs::read_to_string(&config.audit_log).unwrap();
    assert_eq!(audit.lines().filter(|l| l.starts_with("Uploaded '")).count(), 2);
    assert_eq!(audit.lines().filter(|l| l.starts_with("Added ")).count(), 1);
    assert!(audit.contains(&format!("a.jpg':{}", a_id)));
}

#[tokio::test]
async fn test_album_order_independent_of_completion_order() {
    let names = ["p1.jpg", "p2.jpg", "p3.jpg"];
    let permutations: [[u64; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    for delays in permutations {
        let source = TempDir::new().unwrap();
        let logs = TempDir::new().unwrap();
        for (i, name) in names.iter().enumerate() {
            // 撮影時刻はファイル名の逆順
            write_media(source.path(), name, 10 * (names.len() - i) as u64);
        }

        let fake = Arc::new(FakeFlickr {
            delays: names
                .iter()
                .zip(delays)
                .map(|(name, d)| (name.to_string(), Duration::from_millis(20 * d)))
                .collect(),
            ..Default::default()
        });
        let media = Arc::new(CountingMedia::default());
        let mut config = test_config("Perm", source.path(), logs.path());
        config.workers = 3;

        let summary = workflow(&fake, &media).execute(&config).await.unwrap();

        assert_eq!(
            fake.album_titles("Perm"),
            vec!["p3.jpg", "p2.jpg", "p1.jpg"],
            "delays {:?}, completion order {:?}",
            delays,
            fake.state.lock().unwrap().completion_order
        );
        assert_eq!(
            summary.album.album.cover_photo_id,
            summary.upload.photo_ids["p3.jpg"]
        );
    }
}

#[tokio::test]
async fn test_duplicate_album_aborts_before_reading_files() {
    let source = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write_media(source.path(), "a.jpg", 0);

    let fake = Arc::new(FakeFlickr::default().with_album("Summer"));
    let media = Arc::new(CountingMedia::default());
    let config = test_config("Summer", source.path(), logs.path());

    let err = workflow(&fake, &media).execute(&config).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::DuplicateAlbum(title)) if title == "Summer"
    ));
    assert_eq!(media.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fake.total_attempts(), 0);
    assert!(!config.audit_log.exists());
}

#[tokio::test]
async fn test_not_a_directory_fails_before_remote_calls() {
    let source = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    let file = write_media(source.path(), "a.jpg", 0);

    let fake = Arc::new(FakeFlickr::default());
    let media = Arc::new(CountingMedia::default());
    let config = test_config("Summer", &file, logs.path());

    let err = workflow(&fake, &media).execute(&config).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::NotADirectory(_))
    ));
    assert_eq!(fake.list_albums_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_no_eligible_files() {
    let source = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write_media(source.path(), "notes.txt", 0);

    let fake = Arc::new(FakeFlickr::default());
    let media = Arc::new(CountingMedia::default());
    let config = test_config("Summer", source.path(), logs.path());

    let err = workflow(&fake, &media).execute(&config).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::NoEligibleFiles(_))
    ));
}

#[tokio::test]
async fn test_strict_dates_rejects_files_without_exif() {
    let source = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write_media(source.path(), "a.jpg", 0);

    let fake = Arc::new(FakeFlickr::default());
    let media = Arc::new(CountingMedia::default());
    let mut config = test_config("Summer", source.path(), logs.path());
    config.date_policy = DatePolicy::Strict;

    let err = workflow(&fake, &media).execute(&config).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::UnsortableMedia(_))
    ));
    assert_eq!(fake.total_attempts(), 0);
}

#[tokio::test]
async fn test_transient_failures_retried_with_fresh_stream() {
    let source = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write_media(source.path(), "a.jpg", 0);
    write_media(source.path(), "b.jpg", 10);

    let fake = Arc::new(FakeFlickr {
        transient_failures: HashMap::from([("a.jpg".to_string(), 3)]),
        ..Default::default()
    });
    let media = Arc::new(CountingMedia::default());
    let config = test_config("Retry", source.path(), logs.path());

    let summary = workflow(&fake, &media).execute(&config).await.unwrap();

    assert_eq!(fake.attempts("a.jpg"), 4);
    assert_eq!(fake.state.lock().unwrap().empty_reads, 0);
    assert_eq!(summary.upload.failed_count(), 0);
    assert_eq!(fake.album_titles("Retry"), vec!["a.jpg", "b.jpg"]);
}

#[tokio::test]
async fn test_duplicate_signal_reuses_existing_photo() {
    let source = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write_media(source.path(), "a.jpg", 0);
    write_media(source.path(), "b.jpg", 10);

    let fake = Arc::new(FakeFlickr {
        duplicates: HashMap::from([("a.jpg".to_string(), "777".to_string())]),
        ..Default::default()
    });
    let media = Arc::new(CountingMedia::default());
    let mut config = test_config("Dedup", source.path(), logs.path());
    config.dedup = true;

    let summary = workflow(&fake, &media).execute(&config).await.unwrap();

    assert_eq!(summary.upload.duplicate_count(), 1);
    assert_eq!(summary.upload.failed_count(), 0);
    assert_eq!(summary.upload.photo_ids["a.jpg"], PhotoId::new("777"));
    assert_eq!(summary.album.album.cover_photo_id, PhotoId::new("777"));
    assert_eq!(fake.album_titles("Dedup"), vec!["a.jpg", "b.jpg"]);
}

#[tokio::test]
async fn test_failed_upload_excluded_and_cover_moves_on() {
    let source = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write_media(source.path(), "a.jpg", 0);
    write_media(source.path(), "b.mov", 10);
    write_media(source.path(), "c.mp4", 20);

    let fake = Arc::new(FakeFlickr {
        fatal: HashSet::from(["a.jpg".to_string()]),
        ..Default::default()
    });
    let media = Arc::new(CountingMedia::default());
    let config = test_config("Partial", source.path(), logs.path());

    let summary = workflow(&fake, &media).execute(&config).await.unwrap();

    // 致命的エラーは再試行しない
    assert_eq!(fake.attempts("a.jpg"), 1);
    assert_eq!(summary.upload.failed_count(), 1);
    assert_eq!(
        summary.album.album.cover_photo_id,
        summary.upload.photo_ids["b.mov"]
    );
    assert_eq!(fake.album_titles("Partial"), vec!["b.mov", "c.mp4"]);
    assert_eq!(summary.album.stage, AlbumStage::Reordered);
}

#[tokio::test]
async fn test_every_upload_failing_is_fatal() {
    let source = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write_media(source.path(), "a.jpg", 0);

    let fake = Arc::new(FakeFlickr {
        fatal: HashSet::from(["a.jpg".to_string()]),
        ..Default::default()
    });
    let media = Arc::new(CountingMedia::default());
    let config = test_config("Nothing", source.path(), logs.path());

    let err = workflow(&fake, &media).execute(&config).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::AlbumCreation { .. })
    ));
    assert!(fake.album_titles("Nothing").is_empty());
}

#[tokio::test]
async fn test_list_and_delete_uploaded_album() {
    let source = TempDir::new().unwrap();
    let logs = TempDir::new().unwrap();
    write_media(source.path(), "a.jpg", 0);
    write_media(source.path(), "b.jpg", 10);

    let fake = Arc::new(FakeFlickr::default());
    let media = Arc::new(CountingMedia::default());
    let config = test_config("Trip", source.path(), logs.path());
    workflow(&fake, &media).execute(&config).await.unwrap();

    let listing = ListPhotosWorkflow::new(fake.clone())
        .execute("Trip")
        .await
        .unwrap();
    let titles: Vec<&str> = listing.photos.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["a.jpg", "b.jpg"]);

    let report = DeleteAlbumWorkflow::new(fake.clone(), Arc::new(IndicatifProgress::hidden()))
        .execute("Trip", true, 2)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.deleted, 2);
    assert_eq!(report.failed, 0);
    // 最後の写真と一緒にアルバムも消えている
    assert!(!report.album_deleted);
    assert!(fake.state.lock().unwrap().albums.is_empty());
}

#[tokio::test]
async fn test_list_unknown_album() {
    let fake = Arc::new(FakeFlickr::default());
    let err = ListPhotosWorkflow::new(fake).execute("Nope").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SetupError>(),
        Some(SetupError::AlbumNotFound(_))
    ));
}
