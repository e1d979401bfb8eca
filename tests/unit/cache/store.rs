use std::{
    sync::atomic::{AtomicUsize, Ordering as AtomicOrdering},
    time::Duration,
};

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!(
        "animdown_store_{name}_{}_{}",
        std::process::id(),
        nanos
    ))
}

fn write_gif(path: &Path) -> AnimResult<()> {
    std::fs::write(path, b"GIF89a").map_err(|e| AnimError::render(e.to_string()))
}

const SRC: &str = "create circle as c\n";

#[test]
fn miss_then_hit() {
    let dir = temp_dir("hit");
    let cache = ArtifactCache::new(&dir);
    let m = Metadata::default();

    let first = cache.lookup_or_render(SRC, &m, "v1", write_gif).unwrap();
    assert!(!first.hit);
    assert_eq!(first.path, cache.artifact_path(&first.fingerprint));
    assert_eq!(first.path.parent(), Some(cache.dir()));
    assert!(cache.gates.lock().unwrap().is_empty());
    assert_eq!(
        first.path.file_name().and_then(|n| n.to_str()),
        Some(format!("anim-{}.gif", first.fingerprint.to_hex()).as_str())
    );
    assert!(first.path.is_file());

    let second = cache
        .lookup_or_render(SRC, &m, "v1", |_| panic!("must not render on a hit"))
        .unwrap();
    assert!(second.hit);
    assert_eq!(second.path, first.path);
    assert_eq!(
        cache.stats(),
        CacheStats {
            hits: 1,
            misses: 1,
            renders: 1,
            errors: 0,
        }
    );

    let leftovers = std::fs::read_dir(&dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().contains(".partial"))
        .count();
    assert_eq!(leftovers, 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn a_new_cache_over_the_same_directory_hits() {
    let dir = temp_dir("reopen");
    let m = Metadata::default();
    let a = ArtifactCache::new(&dir)
        .lookup_or_render(SRC, &m, "v1", write_gif)
        .unwrap();
    let b = ArtifactCache::new(&dir)
        .lookup_or_render(SRC, &m, "v1", |_| panic!("must not render"))
        .unwrap();
    assert!(b.hit);
    assert_eq!(a.path, b.path);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_render_stores_nothing() {
    let dir = temp_dir("fail");
    let cache = ArtifactCache::new(&dir);
    let m = Metadata::default();

    let err = cache
        .lookup_or_render(SRC, &m, "v1", |path| {
            std::fs::write(path, b"half").map_err(|e| AnimError::render(e.to_string()))?;
            Err(AnimError::render("backend crashed"))
        })
        .unwrap_err();
    assert!(matches!(err, AnimError::Render { .. }));
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

    assert!(cache.gates.lock().unwrap().is_empty());

    let retry = cache.lookup_or_render(SRC, &m, "v1", write_gif).unwrap();
    assert!(!retry.hit);
    assert_eq!(cache.stats().renders, 1);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn renderer_that_writes_nothing_is_a_render_error() {
    let dir = temp_dir("empty");
    let cache = ArtifactCache::new(&dir);
    let err = cache
        .lookup_or_render(SRC, &Metadata::default(), "v1", |_| Ok(()))
        .unwrap_err();
    assert!(err.to_string().contains("wrote no artifact"), "{err}");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn concurrent_callers_render_once() {
    let dir = temp_dir("single_flight");
    let cache = ArtifactCache::new(&dir);
    let m = Metadata::default();
    let calls = AtomicUsize::new(0);
    let (cache_ref, m_ref, calls_ref) = (&cache, &m, &calls);

    let paths: Vec<PathBuf> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(move || {
                    let (cache, m, calls) = (cache_ref, m_ref, calls_ref);
                    cache
                        .lookup_or_render(SRC, m, "v1", |path| {
                            calls.fetch_add(1, AtomicOrdering::SeqCst);
                            std::thread::sleep(Duration::from_millis(50));
                            write_gif(path)
                        })
                        .unwrap()
                        .path
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(AtomicOrdering::SeqCst), 1);
    assert!(paths.windows(2).all(|w| w[0] == w[1]));
    assert!(cache.gates.lock().unwrap().is_empty());
    let stats = cache.stats();
    assert_eq!(stats.renders, 1);
    assert_eq!(stats.hits + stats.misses, 8);
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn persist_failure_returns_the_staged_artifact() {
    let dir = temp_dir("persist");
    let cache = ArtifactCache::new(&dir);
    let m = Metadata::default();
    let fp = fingerprint(SRC, &m, "v1");
    // A directory squatting on the artifact name makes both lookup and rename fail.
    std::fs::create_dir_all(cache.artifact_path(&fp).join("occupied")).unwrap();

    let out = cache.lookup_or_render(SRC, &m, "v1", write_gif).unwrap();
    assert!(!out.hit);
    assert_ne!(out.path, cache.artifact_path(&fp));
    assert!(out.path.is_file());
    assert!(cache.stats().errors >= 2);
    let _ = std::fs::remove_dir_all(&dir);
}
