use std::time::{SystemTime, UNIX_EPOCH};

use super::*;

fn temp_dir(name: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let dir = std::env::temp_dir().join(format!(
        "animdown_process_{name}_{}_{}",
        std::process::id(),
        nanos
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn missing_program_is_a_render_error() {
    let dir = temp_dir("missing");
    let err = run_with_timeout(
        &mut Command::new("animdown-definitely-not-installed"),
        Duration::from_secs(5),
        &dir,
        "ghost",
    )
    .unwrap_err();
    assert!(matches!(err, AnimError::Render { .. }));
    assert!(err.to_string().contains("failed to spawn ghost"), "{err}");
    assert!(!is_program_available(
        "animdown-definitely-not-installed",
        "--version",
        Duration::from_secs(5),
        &dir,
    ));
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn captures_output_and_reports_failure() {
    let dir = temp_dir("fail");
    let out = run_with_timeout(
        Command::new("sh").args(["-c", "echo out; echo boom >&2; exit 3"]),
        Duration::from_secs(10),
        &dir,
        "shell",
    )
    .unwrap();
    assert!(!out.status.success());
    assert_eq!(out.stdout.trim(), "out");
    assert_eq!(out.stderr.trim(), "boom");

    match expect_success("shell", out).unwrap_err() {
        AnimError::Render { message, output } => {
            assert!(message.starts_with("shell exited with status"), "{message}");
            assert_eq!(output.as_deref(), Some("boom"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn slow_processes_are_killed() {
    let dir = temp_dir("timeout");
    let started = Instant::now();
    let err = run_with_timeout(
        Command::new("sh").args(["-c", "sleep 10"]),
        Duration::from_millis(200),
        &dir,
        "sleeper",
    )
    .unwrap_err();
    assert!(err.to_string().contains("sleeper timed out"), "{err}");
    assert!(started.elapsed() < Duration::from_secs(5));
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn success_passes_through() {
    let dir = temp_dir("ok");
    let out = run_with_timeout(
        Command::new("sh").args(["-c", "printf done"]),
        Duration::from_secs(10),
        &dir,
        "ok",
    )
    .and_then(|o| expect_success("ok", o))
    .unwrap();
    assert_eq!(out.stdout, "done");
    let _ = std::fs::remove_dir_all(&dir);
}

#[cfg(unix)]
#[test]
fn availability_check_gives_up_on_a_hanging_program() {
    let dir = temp_dir("hang");
    let started = Instant::now();
    assert!(!is_program_available(
        "sleep",
        "10",
        Duration::from_millis(200),
        &dir,
    ));
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(is_program_available("true", "--version", Duration::from_secs(10), &dir));
    assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    let _ = std::fs::remove_dir_all(&dir);
}
