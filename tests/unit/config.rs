use super::*;

#[test]
fn empty_object_gives_defaults() {
    let cfg = CompilerConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, CompilerConfig::default());
    assert_eq!(cfg.render_timeout(), Duration::from_secs(300));
    assert_eq!(cfg.work_dir(), PathBuf::from("animations").join(".work"));
    assert_eq!(cfg.gif_repeat(), GifRepeat::Times(0));
}

#[test]
fn fields_flow_into_manim_options() {
    let cfg = CompilerConfig::from_json_str(
        r#"{
            "output_dir": "out",
            "work_dir": "/tmp/anim-work",
            "backend_version": "manim-0.18",
            "render_timeout_secs": 20,
            "workers": 2,
            "manim_command": ["manim"],
            "gif_width": 480,
            "gif_repeat": null,
            "transparent": false
        }"#,
    )
    .unwrap();
    let o = cfg.manim_options();
    assert_eq!(o.command, ["manim"]);
    assert_eq!(o.timeout, Duration::from_secs(20));
    assert_eq!(o.work_dir, PathBuf::from("/tmp/anim-work"));
    assert_eq!(o.gif_width, Some(480));
    assert_eq!(o.repeat, GifRepeat::Forever);
    assert!(!o.transparent);
    assert_eq!(o.backend_version.as_deref(), Some("manim-0.18"));
    assert_eq!(cfg.workers, Some(2));
}

#[test]
fn invalid_values_are_config_errors() {
    for json in [
        r#"{"render_timeout_secs": 0}"#,
        r#"{"workers": 0}"#,
        r#"{"manim_command": []}"#,
        r#"{"manim_command": [" "]}"#,
        r#"{"ffmpeg": ""}"#,
        r#"{"gif_width": 0}"#,
        r#"{"output_dir": ""}"#,
        r#"{"unknown_field": 1}"#,
        "not json",
    ] {
        let err = CompilerConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, AnimError::Config(_)), "{json}: {err}");
    }
}

#[test]
fn missing_file_is_reported_with_its_path() {
    let err = CompilerConfig::from_json_file("/definitely/not/here/animdown.json").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here/animdown.json"));
}
