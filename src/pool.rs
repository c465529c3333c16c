//! Worker Pool (C4, SPEC_FULL.md §4.4 and §9): a bounded `rayon` thread
//! pool plus a coordinator-owned memoization cache keyed by path. Mirrors
//! the "keyed map of single-result handles, never thread-local state" design
//! from §9 — each in-flight parse is a channel receiver, resolved to an
//! `Arc` the first time it is awaited.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;

use crate::errors::LintError;
use crate::extractor;
use crate::model::Directive;

type DirectiveResult = Result<Arc<Vec<Directive>>, Arc<LintError>>;

enum CacheEntry {
    Pending(mpsc::Receiver<DirectiveResult>),
    Ready(DirectiveResult),
}

/// Owns the thread pool and the future cache. Only ever touched from the
/// coordinating (engine) thread; workers only read file contents and hand
/// back owned results over a channel.
pub struct Pool {
    thread_pool: rayon::ThreadPool,
    cache: HashMap<PathBuf, CacheEntry>,
}

impl Pool {
    pub fn new(parallelism: usize) -> Result<Self, LintError> {
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism)
            .build()
            .map_err(|source| LintError::PoolBuild { parallelism, source })?;
        Ok(Pool {
            thread_pool,
            cache: HashMap::new(),
        })
    }

    /// Get (scheduling on first request) the parsed directive list for
    /// `path`. Subsequent calls for the same path return the memoized
    /// result without rescheduling, shared by both the source-side and
    /// target-side passes.
    pub fn get_or_schedule(&mut self, path: &Path) -> DirectiveResult {
        if !self.cache.contains_key(path) {
            let (tx, rx) = mpsc::channel();
            let owned = path.to_path_buf();
            self.thread_pool.spawn(move || {
                let result = extractor::read_directives(&owned)
                    .map(Arc::new)
                    .map_err(Arc::new);
                let _ = tx.send(result);
            });
            self.cache.insert(path.to_path_buf(), CacheEntry::Pending(rx));
        }

        let entry = self.cache.remove(path).expect("just inserted or already present");
        let resolved = match entry {
            CacheEntry::Ready(result) => result,
            CacheEntry::Pending(rx) => rx.recv().unwrap_or_else(|_| {
                Err(Arc::new(LintError::WorkerPanicked {
                    path: path.to_path_buf(),
                }))
            }),
        };
        self.cache.insert(path.to_path_buf(), CacheEntry::Ready(resolved.clone()));
        resolved
    }

    /// Deterministic teardown, called once by the engine at Phase E. All
    /// outstanding work has already been drained by `get_or_schedule`'s
    /// blocking `recv`, so this is just an explicit drop point.
    pub fn shutdown(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn memoization_returns_identical_arc_for_repeated_requests() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.rs");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"// LINT.IfChange\n// LINT.ThenChange(\"g.rs\")\n")
            .unwrap();

        let mut pool = Pool::new(1).unwrap();
        let first = pool.get_or_schedule(&path).unwrap();
        let second = pool.get_or_schedule(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        pool.shutdown();
    }

    #[test]
    fn teardown_with_no_outstanding_tasks_does_not_panic() {
        let pool = Pool::new(2).unwrap();
        pool.shutdown();
    }

    #[test]
    fn missing_file_is_cached_as_an_error() {
        let mut pool = Pool::new(1).unwrap();
        let missing = Path::new("/nonexistent/path/does/not/exist.rs");
        let first = pool.get_or_schedule(missing);
        assert!(first.is_err());
        let second = pool.get_or_schedule(missing);
        assert!(second.is_err());
    }
}
