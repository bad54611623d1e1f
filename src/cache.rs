//! Memoization for file loaders.
//!
//! Parsed inputs are cached per (path, modification time) for the lifetime of
//! the process, so the availability check and the render pass parse each file
//! at most once. A changed mtime invalidates the entry; a path without
//! readable metadata (typically a missing file) bypasses the cache entirely so
//! the loader runs, and diagnoses, every time.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Debug)]
pub struct FileCache<T> {
    entries: HashMap<PathBuf, (SystemTime, Arc<T>)>,
}

impl<T> Default for FileCache<T> {
    fn default() -> Self {
        FileCache {
            entries: HashMap::new(),
        }
    }
}

impl<T> FileCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `path` if its mtime is unchanged,
    /// otherwise run `load` and cache the result.
    pub fn get_or_insert_with(&mut self, path: &Path, load: impl FnOnce() -> T) -> Arc<T> {
        let mtime = fs::metadata(path).and_then(|m| m.modified()).ok();

        let Some(mtime) = mtime else {
            // No metadata: do not cache, the loader handles the failure.
            return Arc::new(load());
        };

        if let Some((cached_mtime, value)) = self.entries.get(path) {
            if *cached_mtime == mtime {
                tracing::debug!(?path, "loader cache hit");
                return Arc::clone(value);
            }
        }

        let value = Arc::new(load());
        self.entries
            .insert(path.to_path_buf(), (mtime, Arc::clone(&value)));
        value
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn second_load_of_unchanged_file_hits_cache() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut cache = FileCache::new();
        let mut loads = 0;

        let first = cache.get_or_insert_with(file.path(), || {
            loads += 1;
            42u64
        });
        let second = cache.get_or_insert_with(file.path(), || {
            loads += 1;
            99u64
        });

        assert_eq!(loads, 1);
        assert_eq!(*first, 42);
        assert_eq!(*second, 42);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn changed_mtime_invalidates_entry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "v1").unwrap();
        let mut cache = FileCache::new();

        let first = cache.get_or_insert_with(file.path(), || 1u64);
        assert_eq!(*first, 1);

        // Force a distinct mtime; filesystem timestamp granularity can
        // otherwise swallow a quick rewrite.
        let later = SystemTime::now() + Duration::from_secs(5);
        File::options()
            .write(true)
            .open(file.path())
            .unwrap()
            .set_modified(later)
            .unwrap();

        let second = cache.get_or_insert_with(file.path(), || 2u64);
        assert_eq!(*second, 2);
    }

    #[test]
    fn missing_file_is_never_cached() {
        let mut cache = FileCache::new();
        let path = Path::new("/nonexistent/counts.csv");

        let first = cache.get_or_insert_with(path, || 1u64);
        let second = cache.get_or_insert_with(path, || 2u64);

        assert_eq!(*first, 1);
        assert_eq!(*second, 2);
        assert_eq!(cache.len(), 0);
    }
}
