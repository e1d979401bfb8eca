use crate::{cache::fingerprint::fingerprint, scene::model::Metadata};

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!(
        "animdown_manim_{name}_{}_{}",
        std::process::id(),
        nanos
    ))
}

fn options(dir: &Path, command: &[&str]) -> ManimOptions {
    ManimOptions {
        command: command.iter().map(|s| s.to_string()).collect(),
        work_dir: dir.join("work"),
        timeout: Duration::from_secs(10),
        ..ManimOptions::default()
    }
}

fn job<'a>(metadata: &'a Metadata) -> RenderJob<'a> {
    RenderJob {
        script: "from manim import *\n",
        scene_name: "AnimateScene",
        metadata,
        fingerprint: fingerprint("wait 1", metadata, "test"),
    }
}

#[test]
fn defaults() {
    let o = ManimOptions::default();
    assert_eq!(o.command, ["python3", "-m", "manim"]);
    assert_eq!(o.ffmpeg, "ffmpeg");
    assert_eq!(o.repeat, GifRepeat::Times(0));
    assert!(o.transparent);
}

#[test]
fn configured_backend_version_wins() {
    let r = ManimRenderer::new(ManimOptions {
        backend_version: Some("pinned-1".to_string()),
        ..ManimOptions::default()
    });
    assert_eq!(r.backend_version(), "pinned-1");
}

#[test]
fn empty_command_is_a_config_error() {
    let dir = temp_dir("empty");
    let r = ManimRenderer::new(options(&dir, &[]));
    let m = Metadata::default();
    let err = r.render(&job(&m), &dir.join("out.gif")).unwrap_err();
    assert!(matches!(err, AnimError::Config(_)), "{err}");
    assert!(!r.check_dependencies().manim);
    assert_eq!(r.backend_version(), "manim-unknown");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn dependency_report() {
    let report = DependencyReport {
        manim: true,
        ffmpeg: false,
    };
    assert!(!report.all_present());
    assert_eq!(report.missing(), ["ffmpeg"]);
}

#[test]
fn video_lookup_skips_partial_movies() {
    let dir = temp_dir("find");
    let partial = dir.join("videos/scene/480p15/partial_movie_files/AnimateScene");
    let final_dir = dir.join("videos/scene/480p15");
    std::fs::create_dir_all(&partial).unwrap();
    std::fs::write(partial.join("000.mp4"), b"x").unwrap();
    assert!(find_video(&dir).is_err());
    std::fs::write(final_dir.join("scene.mp4"), b"x").unwrap();
    assert_eq!(find_video(&dir).unwrap(), final_dir.join("scene.mp4"));
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn version_probe_uses_the_command_output() {
    let dir = temp_dir("probe");
    let r = ManimRenderer::new(options(
        &dir,
        &["sh", "-c", "echo 'Manim Community v0.18.1'", "manim"],
    ));
    assert_eq!(r.backend_version(), "Manim Community v0.18.1");
    assert!(r.check_dependencies().manim);
    assert_eq!(std::fs::read_dir(dir.join("work")).unwrap().count(), 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn hanging_version_probe_is_cut_off() {
    let dir = temp_dir("hang");
    let r = ManimRenderer::new(ManimOptions {
        timeout: Duration::from_millis(300),
        ..options(&dir, &["sh", "-c", "sleep 10; echo v1", "manim"])
    });
    let started = std::time::Instant::now();
    assert_eq!(r.backend_version(), "manim-unknown");
    assert!(started.elapsed() < Duration::from_secs(5));
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn failing_backend_reports_stderr_and_cleans_up() {
    let dir = temp_dir("fail");
    let r = ManimRenderer::new(options(
        &dir,
        &["sh", "-c", "echo 'NameError: Foo' >&2; exit 1", "manim"],
    ));
    let m = Metadata::default();
    match r.render(&job(&m), &dir.join("out.gif")).unwrap_err() {
        AnimError::Render { message, output } => {
            assert!(message.starts_with("manim exited"), "{message}");
            assert_eq!(output.as_deref(), Some("NameError: Foo"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    let leftover = std::fs::read_dir(dir.join("work")).unwrap().count();
    assert_eq!(leftover, 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn backend_without_video_is_a_render_error() {
    let dir = temp_dir("novideo");
    let r = ManimRenderer::new(options(&dir, &["sh", "-c", "exit 0", "manim"]));
    let m = Metadata::default();
    let err = r.render(&job(&m), &dir.join("out.gif")).unwrap_err();
    assert!(err.to_string().contains("no video was found"), "{err}");
    let _ = std::fs::remove_dir_all(&dir);
}
