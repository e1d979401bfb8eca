use std::{
    path::{Path, PathBuf},
    process::Command,
    sync::OnceLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use anyhow::Context as _;

use crate::{
    foundation::error::{AnimError, AnimResult},
    render::{
        RenderJob, Renderer,
        ffmpeg::{GifConversion, GifRepeat, video_to_gif},
        gif::make_white_transparent,
        process::{
            TempDirGuard, ensure_dir, expect_success, is_program_available, probe,
            run_with_timeout,
        },
    },
};

/// Settings for [`ManimRenderer`].
#[derive(Clone, Debug)]
pub struct ManimOptions {
    /// Program and leading arguments that start the manim CLI.
    pub command: Vec<String>,
    pub ffmpeg: String,
    pub timeout: Duration,
    /// Scratch space for per-job scripts, media and logs.
    pub work_dir: PathBuf,
    /// GIF width in pixels; `None` keeps the rendered width unless the block sets `width`.
    pub gif_width: Option<u32>,
    pub repeat: GifRepeat,
    pub transparent: bool,
    /// Fixed version tag; probed from the backend when unset.
    pub backend_version: Option<String>,
}

impl Default for ManimOptions {
    fn default() -> Self {
        Self {
            command: vec!["python3".into(), "-m".into(), "manim".into()],
            ffmpeg: "ffmpeg".to_string(),
            timeout: Duration::from_secs(300),
            work_dir: std::env::temp_dir().join("animdown-work"),
            gif_width: None,
            repeat: GifRepeat::Times(0),
            transparent: true,
            backend_version: None,
        }
    }
}

/// Availability of the external tools the renderer shells out to.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DependencyReport {
    pub manim: bool,
    pub ffmpeg: bool,
}

impl DependencyReport {
    pub fn all_present(&self) -> bool {
        self.manim && self.ffmpeg
    }

    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if !self.manim {
            out.push("manim");
        }
        if !self.ffmpeg {
            out.push("ffmpeg");
        }
        out
    }
}

/// Renders scene scripts with the manim CLI, then converts the video into a GIF.
#[derive(Debug)]
pub struct ManimRenderer {
    options: ManimOptions,
    version: OnceLock<String>,
}

impl ManimRenderer {
    pub fn new(options: ManimOptions) -> Self {
        Self {
            options,
            version: OnceLock::new(),
        }
    }

    pub fn options(&self) -> &ManimOptions {
        &self.options
    }

    pub fn check_dependencies(&self) -> DependencyReport {
        DependencyReport {
            manim: self.probe_version().is_some(),
            ffmpeg: is_program_available(
                &self.options.ffmpeg,
                "-version",
                self.options.timeout,
                &self.options.work_dir,
            ),
        }
    }

    fn manim_command(&self) -> AnimResult<Command> {
        let Some((program, args)) = self.options.command.split_first() else {
            return Err(AnimError::config("manim command is empty"));
        };
        let mut cmd = Command::new(program);
        cmd.args(args);
        Ok(cmd)
    }

    fn probe_version(&self) -> Option<String> {
        let mut cmd = self.manim_command().ok()?;
        cmd.arg("--version");
        let out = probe(
            &mut cmd,
            self.options.timeout,
            &self.options.work_dir,
            "manim-version",
        )?;
        let text = out.stdout.trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    fn job_dir(&self, job: &RenderJob<'_>) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        self.options.work_dir.join(format!(
            "job-{}-{}-{nanos}",
            job.fingerprint.short(),
            std::process::id()
        ))
    }
}

impl Renderer for ManimRenderer {
    fn backend_version(&self) -> String {
        if let Some(v) = &self.options.backend_version {
            return v.clone();
        }
        self.version
            .get_or_init(|| self.probe_version().unwrap_or_else(|| "manim-unknown".to_string()))
            .clone()
    }

    #[tracing::instrument(skip_all, fields(fingerprint = %job.fingerprint.short()))]
    fn render(&self, job: &RenderJob<'_>, out: &Path) -> AnimResult<()> {
        let dir = self.job_dir(job);
        ensure_dir(&dir)?;
        let _cleanup = TempDirGuard::new(dir.clone());

        let script = dir.join("scene.py");
        std::fs::write(&script, job.script)
            .with_context(|| format!("failed to write '{}'", script.display()))?;
        let media = dir.join("media");

        let mut cmd = self.manim_command()?;
        cmd.arg("render")
            .arg(job.metadata.quality.renderer_flag())
            .args(["--fps", &job.metadata.fps.to_string()])
            .args(["--format", "mp4", "--disable_caching", "--progress_bar", "none"])
            .arg("--media_dir")
            .arg(&media)
            .args(["-o", "scene"])
            .arg(&script)
            .arg(job.scene_name);
        tracing::info!(quality = %job.metadata.quality, "running manim");
        let output = run_with_timeout(&mut cmd, self.options.timeout, &dir, "manim")?;
        expect_success("manim", output)?;

        let video = find_video(&media)?;
        let conversion = GifConversion {
            ffmpeg: &self.options.ffmpeg,
            fps: job.metadata.fps,
            width: job.metadata.width.or(self.options.gif_width),
            repeat: self.options.repeat,
            timeout: self.options.timeout,
        };
        video_to_gif(&conversion, &video, out, &dir)?;

        if self.options.transparent {
            make_white_transparent(out, self.options.repeat)?;
        }
        Ok(())
    }
}

/// Locate the `.mp4` manim wrote somewhere below `media`.
fn find_video(media: &Path) -> AnimResult<PathBuf> {
    let mut stack = vec![media.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().is_some_and(|e| e == "mp4")
                && !path.components().any(|c| c.as_os_str() == "partial_movie_files")
            {
                return Ok(path);
            }
        }
    }
    Err(AnimError::render(format!(
        "manim finished but no video was found under '{}'",
        media.display()
    )))
}

#[cfg(test)]
#[path = "../../tests/unit/render/manim.rs"]
mod tests;
