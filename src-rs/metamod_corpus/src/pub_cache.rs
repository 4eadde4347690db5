//! Disk-backed cache of publication metadata.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::warn;

use crate::collaborators::{FetchError, PublicationInfo, PublicationLookup};

/// How many times a transient fetch failure is retried before giving up.
const RETRY_BUDGET: usize = 3;

/// A JSON file mapping publication ids to their metadata.
///
/// Lookups are served from the cache when possible; misses go through the
/// external lookup with a bounded retry budget and fall back to the
/// "no info available" placeholder. Cache write failures are logged and
/// otherwise ignored; the cache is an accelerator, not a store of record.
#[derive(Debug)]
pub struct PublicationCache {
    path: PathBuf,
    entries: IndexMap<String, PublicationInfo>,
}

#[derive(Debug)]
enum CacheError {
    Io(io::Error),
    Format(serde_json::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Format(err) => write!(f, "{err}"),
        }
    }
}

impl PublicationCache {
    /// Opens the cache file at `path`, starting empty when the file is
    /// missing or unreadable.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(CacheError::Io(err)) if err.kind() == io::ErrorKind::NotFound => IndexMap::new(),
            Err(err) => {
                warn!("starting with an empty publication cache, {}: {err}", path.display());
                IndexMap::new()
            }
        };

        Self { path, entries }
    }

    /// Returns the number of cached publications.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the metadata for one publication, fetching and caching it on
    /// a miss.
    ///
    /// Transient fetch failures are retried up to the retry budget; after
    /// that the placeholder is served. Placeholders are not cached, so a
    /// later call retries the lookup.
    pub fn info_for<L>(&mut self, publication_id: &str, lookup: &L) -> PublicationInfo
    where
        L: PublicationLookup + ?Sized,
    {
        if let Some(info) = self.entries.get(publication_id) {
            return info.clone();
        }

        let info = fetch_with_retry(publication_id, lookup);

        if !info.is_unavailable() {
            self.entries
                .insert(publication_id.to_string(), info.clone());
            if let Err(err) = self.save() {
                warn!("could not write publication cache {}: {err}", self.path.display());
            }
        }

        info
    }

    fn save(&self) -> Result<(), CacheError> {
        let json = serde_json::to_string_pretty(&self.entries).map_err(CacheError::Format)?;
        fs::write(&self.path, json).map_err(CacheError::Io)
    }
}

fn read_entries(path: &Path) -> Result<IndexMap<String, PublicationInfo>, CacheError> {
    let text = fs::read_to_string(path).map_err(CacheError::Io)?;
    serde_json::from_str(&text).map_err(CacheError::Format)
}

fn fetch_with_retry<L>(publication_id: &str, lookup: &L) -> PublicationInfo
where
    L: PublicationLookup + ?Sized,
{
    for attempt in 1..=RETRY_BUDGET {
        match lookup.fetch(publication_id) {
            Ok(info) => return info,
            Err(FetchError::Transient(message)) => {
                warn!(
                    "transient failure fetching publication {publication_id} \
                     (attempt {attempt}/{RETRY_BUDGET}): {message}"
                );
            }
            Err(FetchError::Permanent(message)) => {
                warn!("cannot fetch publication {publication_id}: {message}");
                break;
            }
        }
    }

    PublicationInfo::unavailable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Scripted lookup double counting its calls.
    struct TestLookup {
        calls: RefCell<usize>,
        results: Vec<Result<PublicationInfo, FetchError>>,
    }

    impl TestLookup {
        fn new(results: Vec<Result<PublicationInfo, FetchError>>) -> Self {
            Self {
                calls: RefCell::new(0),
                results,
            }
        }

        fn calls(&self) -> usize {
            *self.calls.borrow()
        }
    }

    impl PublicationLookup for TestLookup {
        fn fetch(&self, _publication_id: &str) -> Result<PublicationInfo, FetchError> {
            let index = *self.calls.borrow();
            *self.calls.borrow_mut() += 1;
            self.results
                .get(index)
                .cloned()
                .unwrap_or_else(|| Err(FetchError::Transient("exhausted script".to_string())))
        }
    }

    fn info(authors: &str) -> PublicationInfo {
        PublicationInfo {
            authors: authors.to_string(),
            year: "1998".to_string(),
            journal: "J Neurophysiol".to_string(),
        }
    }

    fn cache_in(dir: &tempfile::TempDir) -> PublicationCache {
        PublicationCache::load(dir.path().join("pubs.json"))
    }

    #[test]
    fn serves_cached_entries_without_calling_the_lookup() {
        let dir = tempfile::tempdir().expect("should create a temp dir");
        let lookup = TestLookup::new(vec![Ok(info("O'Reilly et al."))]);

        let mut cache = cache_in(&dir);
        let first = cache.info_for("pub-1", &lookup);
        let second = cache.info_for("pub-1", &lookup);

        assert_eq!(first, second);
        assert_eq!(lookup.calls(), 1);
    }

    #[test]
    fn cache_survives_a_reload_from_disk() {
        let dir = tempfile::tempdir().expect("should create a temp dir");
        let lookup = TestLookup::new(vec![Ok(info("O'Reilly et al."))]);

        let mut cache = cache_in(&dir);
        cache.info_for("pub-1", &lookup);

        let mut reloaded = cache_in(&dir);
        assert_eq!(reloaded.len(), 1);
        let served = reloaded.info_for("pub-1", &lookup);
        assert_eq!(served.authors, "O'Reilly et al.");
        assert_eq!(lookup.calls(), 1);
    }

    #[test]
    fn transient_failures_retry_then_succeed() {
        let dir = tempfile::tempdir().expect("should create a temp dir");
        let lookup = TestLookup::new(vec![
            Err(FetchError::Transient("reset".to_string())),
            Err(FetchError::Transient("reset".to_string())),
            Ok(info("Markram et al.")),
        ]);

        let mut cache = cache_in(&dir);
        let served = cache.info_for("pub-2", &lookup);

        assert_eq!(served.authors, "Markram et al.");
        assert_eq!(lookup.calls(), 3);
    }

    #[test]
    fn retries_stop_at_the_budget() {
        let dir = tempfile::tempdir().expect("should create a temp dir");
        let lookup = TestLookup::new(vec![
            Err(FetchError::Transient("reset".to_string())),
            Err(FetchError::Transient("reset".to_string())),
            Err(FetchError::Transient("reset".to_string())),
            Ok(info("never reached")),
        ]);

        let mut cache = cache_in(&dir);
        let served = cache.info_for("pub-3", &lookup);

        assert!(served.is_unavailable());
        assert_eq!(lookup.calls(), 3);
    }

    #[test]
    fn permanent_failures_do_not_retry() {
        let dir = tempfile::tempdir().expect("should create a temp dir");
        let lookup = TestLookup::new(vec![Err(FetchError::Permanent("gone".to_string()))]);

        let mut cache = cache_in(&dir);
        let served = cache.info_for("pub-4", &lookup);

        assert!(served.is_unavailable());
        assert_eq!(lookup.calls(), 1);
    }

    #[test]
    fn placeholders_are_not_cached() {
        let dir = tempfile::tempdir().expect("should create a temp dir");
        let failing = TestLookup::new(vec![
            Err(FetchError::Transient("reset".to_string())),
            Err(FetchError::Transient("reset".to_string())),
            Err(FetchError::Transient("reset".to_string())),
            Ok(info("back online")),
        ]);

        let mut cache = cache_in(&dir);
        assert!(cache.info_for("pub-5", &failing).is_unavailable());

        // the service recovered; the next call goes through again
        let served = cache.info_for("pub-5", &failing);
        assert_eq!(served.authors, "back online");
    }
}
