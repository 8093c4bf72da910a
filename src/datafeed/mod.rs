//! Dataset acquisition: make sure the COMPAS CSV is on disk.

pub mod http;

use std::fs;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::auditor::error::{AuditError, AuditResult};

pub use http::HttpFetcher;

/// Source able to download the raw dataset bytes.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    /// Fetch the whole file behind `url`. One attempt, no retry.
    async fn fetch(&self, url: &str) -> AuditResult<Vec<u8>>;
}

/// What [`acquire`] had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// The file was already present, nothing was fetched
    AlreadyPresent,
    /// The file was downloaded
    Downloaded { bytes: usize },
}

/// Ensure a dataset file exists at `path`, downloading it from `url` if absent.
pub async fn acquire(path: &Path, url: &str, fetcher: &dyn DatasetFetcher) -> AuditResult<Acquisition> {
    if path.is_file() {
        info!("dataset found at {}", path.display());
        return Ok(Acquisition::AlreadyPresent);
    }

    url::Url::parse(url).map_err(|e| AuditError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    info!("dataset missing at {}, downloading from {}", path.display(), url);

    let download_error = |reason: String| AuditError::Download {
        url: url.to_string(),
        path: path.to_path_buf(),
        reason,
    };

    let bytes = fetcher.fetch(url).await.map_err(|e| match e {
        AuditError::Download { reason, .. } => download_error(reason),
        other => download_error(other.to_string()),
    })?;
    if bytes.is_empty() {
        return Err(download_error("server returned an empty body".to_string()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| download_error(e.to_string()))?;
    }

    // The target only appears once the whole body is on disk
    let partial = partial_path(path);
    fs::write(&partial, &bytes).map_err(|e| download_error(e.to_string()))?;
    if let Err(e) = fs::rename(&partial, path) {
        let _ = fs::remove_file(&partial);
        return Err(download_error(e.to_string()));
    }

    info!("downloaded {} bytes to {}", bytes.len(), path.display());
    Ok(Acquisition::Downloaded { bytes: bytes.len() })
}

/// Sibling file a download is staged in, e.g. `compas.csv.part`.
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

/// Copy the dataset into a second location, overwriting any existing file.
pub fn mirror(from: &Path, to: &Path) -> AuditResult<()> {
    let copy_error = |source: std::io::Error| AuditError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(copy_error)?;
    }
    if to.exists() {
        warn!("overwriting {}", to.display());
    }
    let copied = fs::copy(from, to).map_err(copy_error)?;

    info!("copied {} bytes to {}", copied, to.display());
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fetcher that counts calls and serves a canned answer.
    pub(crate) struct StubFetcher {
        pub calls: AtomicUsize,
        pub body: Option<Vec<u8>>,
    }

    impl StubFetcher {
        pub(crate) fn serving(body: &[u8]) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                body: Some(body.to_vec()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                body: None,
            }
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DatasetFetcher for StubFetcher {
        async fn fetch(&self, url: &str) -> AuditResult<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.body.clone().ok_or_else(|| AuditError::Download {
                url: url.to_string(),
                path: Default::default(),
                reason: "connection refused".to_string(),
            })
        }
    }

    const URL: &str = "https://example.org/compas.csv";

    #[tokio::test]
    async fn test_present_file_is_not_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compas.csv");
        fs::write(&path, "race\n").unwrap();

        let fetcher = StubFetcher::serving(b"unused");
        let outcome = acquire(&path, URL, &fetcher).await.unwrap();

        assert_eq!(outcome, Acquisition::AlreadyPresent);
        assert_eq!(fetcher.calls(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "race\n");
    }

    #[tokio::test]
    async fn test_missing_file_is_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("compas.csv");

        let fetcher = StubFetcher::serving(b"race,score_text\n");
        let outcome = acquire(&path, URL, &fetcher).await.unwrap();

        assert_eq!(outcome, Acquisition::Downloaded { bytes: 16 });
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(fs::read(&path).unwrap(), b"race,score_text\n");
        assert!(!partial_path(&path).exists());
    }

    #[tokio::test]
    async fn test_leftover_partial_download_is_not_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compas.csv");
        let partial = partial_path(&path);
        assert_eq!(partial, dir.path().join("compas.csv.part"));

        // interrupted earlier run
        fs::write(&partial, "race,score_text\nCauc").unwrap();

        let fetcher = StubFetcher::serving(b"race,score_text\nCaucasian,Low\n");
        let outcome = acquire(&path, URL, &fetcher).await.unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert!(matches!(outcome, Acquisition::Downloaded { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"race,score_text\nCaucasian,Low\n");
        assert!(!partial.exists());
    }

    #[tokio::test]
    async fn test_failed_download_reports_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compas.csv");

        let fetcher = StubFetcher::failing();
        let err = acquire(&path, URL, &fetcher).await.unwrap_err();

        assert_eq!(fetcher.calls(), 1);
        assert!(matches!(err, AuditError::Download { ref url, .. } if url == URL));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_invalid_url_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compas.csv");

        let fetcher = StubFetcher::serving(b"x");
        let err = acquire(&path, "not a url", &fetcher).await.unwrap_err();

        assert!(matches!(err, AuditError::InvalidUrl { .. }));
        assert_eq!(fetcher.calls(), 0);
    }

    #[test]
    fn test_mirror_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let from = dir.path().join("compas.csv");
        let to = dir.path().join("lib").join("data").join("compas.csv");
        fs::write(&from, "new").unwrap();
        fs::create_dir_all(to.parent().unwrap()).unwrap();
        fs::write(&to, "old").unwrap();

        mirror(&from, &to).unwrap();
        assert_eq!(fs::read_to_string(&to).unwrap(), "new");
    }

    #[test]
    fn test_mirror_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = mirror(&dir.path().join("absent.csv"), &dir.path().join("copy.csv")).unwrap_err();
        assert!(matches!(err, AuditError::Copy { .. }));
    }
}
