use std::{
    collections::HashMap,
    io,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};

use serde::Serialize;

use crate::{
    cache::fingerprint::{Fingerprint, fingerprint},
    foundation::error::{AnimError, AnimResult},
    scene::model::Metadata,
};

/// Counters since the cache was created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub renders: u64,
    /// Storage failures that were downgraded to misses.
    pub errors: u64,
}

/// Result of a cache lookup that may have rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheOutcome {
    pub path: PathBuf,
    pub fingerprint: Fingerprint,
    pub hit: bool,
}

/// Process-wide store of rendered artifacts, keyed by [`Fingerprint`].
///
/// Entries are files named `anim-<fingerprint>.gif` in one directory. They are written once via
/// an atomic rename and never modified. Concurrent requests for the same fingerprint are
/// serialized on a per-fingerprint gate so at most one of them renders.
#[derive(Debug)]
pub struct ArtifactCache {
    dir: PathBuf,
    gates: Mutex<HashMap<Fingerprint, Arc<Mutex<()>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    renders: AtomicU64,
    errors: AtomicU64,
}

impl ArtifactCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            gates: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            renders: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, fp: &Fingerprint) -> PathBuf {
        self.dir.join(format!("anim-{}.gif", fp.to_hex()))
    }

    /// Stored artifact for `fp`, if any. Storage errors are logged and reported as a miss.
    pub fn lookup(&self, fp: &Fingerprint) -> Option<PathBuf> {
        let path = self.artifact_path(fp);
        match std::fs::metadata(&path) {
            Ok(m) if m.is_file() => Some(path),
            Ok(_) => {
                self.storage_error(&AnimError::cache(format!(
                    "'{}' exists but is not a file",
                    path.display()
                )));
                None
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                self.storage_error(&AnimError::cache(format!(
                    "failed to stat '{}': {e}",
                    path.display()
                )));
                None
            }
        }
    }

    /// Return the artifact for this block, calling `render` only on a miss.
    ///
    /// `render` receives a staging path it must write the artifact to.
    pub fn lookup_or_render<F>(
        &self,
        source: &str,
        metadata: &Metadata,
        backend_version: &str,
        render: F,
    ) -> AnimResult<CacheOutcome>
    where
        F: FnOnce(&Path) -> AnimResult<()>,
    {
        let fp = fingerprint(source, metadata, backend_version);
        self.get_or_render(fp, render)
    }

    /// Same as [`ArtifactCache::lookup_or_render`] for an already computed fingerprint.
    #[tracing::instrument(skip_all, fields(fingerprint = %fp.short()))]
    pub fn get_or_render<F>(&self, fp: Fingerprint, render: F) -> AnimResult<CacheOutcome>
    where
        F: FnOnce(&Path) -> AnimResult<()>,
    {
        if let Some(path) = self.lookup(&fp) {
            return Ok(self.hit(fp, path));
        }

        let gate = self.gate(fp);
        let outcome = {
            let _held = gate.lock().unwrap_or_else(PoisonError::into_inner);
            self.render_gated(fp, render)
        };
        self.release_gate(fp, gate);
        outcome
    }

    /// Miss path; the caller holds the gate for `fp`.
    fn render_gated<F>(&self, fp: Fingerprint, render: F) -> AnimResult<CacheOutcome>
    where
        F: FnOnce(&Path) -> AnimResult<()>,
    {
        // Another caller may have rendered while we waited.
        if let Some(path) = self.lookup(&fp) {
            return Ok(self.hit(fp, path));
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("cache miss");

        let staging_dir = match std::fs::create_dir_all(&self.dir) {
            Ok(()) => self.dir.clone(),
            Err(e) => {
                self.storage_error(&AnimError::cache(format!(
                    "failed to create '{}': {e}",
                    self.dir.display()
                )));
                std::env::temp_dir()
            }
        };
        let staging_path = staging_dir.join(staging_name(&fp));
        let mut staging = StagingGuard(Some(staging_path.clone()));

        render(&staging_path)?;
        self.renders.fetch_add(1, Ordering::Relaxed);

        if !staging_path.is_file() {
            return Err(AnimError::render(format!(
                "renderer reported success but wrote no artifact to '{}'",
                staging_path.display()
            )));
        }

        let final_path = self.artifact_path(&fp);
        match std::fs::rename(&staging_path, &final_path) {
            Ok(()) => {
                staging.disarm();
                tracing::info!(path = %final_path.display(), "stored artifact");
                Ok(CacheOutcome {
                    path: final_path,
                    fingerprint: fp,
                    hit: false,
                })
            }
            Err(e) => {
                self.storage_error(&AnimError::cache(format!(
                    "failed to persist '{}': {e}",
                    final_path.display()
                )));
                staging.disarm();
                Ok(CacheOutcome {
                    path: staging_path,
                    fingerprint: fp,
                    hit: false,
                })
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            renders: self.renders.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    fn hit(&self, fp: Fingerprint, path: PathBuf) -> CacheOutcome {
        self.hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(path = %path.display(), "cache hit");
        CacheOutcome {
            path,
            fingerprint: fp,
            hit: true,
        }
    }

    fn gate(&self, fp: Fingerprint) -> Arc<Mutex<()>> {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(gates.entry(fp).or_default())
    }

    /// Drop the gate entry once no other caller holds or waits on it.
    fn release_gate(&self, fp: Fingerprint, gate: Arc<Mutex<()>>) {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the map plus ours.
        if Arc::strong_count(&gate) == 2 {
            gates.remove(&fp);
        }
    }

    fn storage_error(&self, err: &AnimError) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("{err}");
    }
}

fn staging_name(fp: &Fingerprint) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    format!(".anim-{}.{}-{nanos}.partial.gif", fp.to_hex(), std::process::id())
}

/// Removes the staging file on drop unless disarmed.
struct StagingGuard(Option<PathBuf>);

impl StagingGuard {
    fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/cache/store.rs"]
mod tests;
