use std::{path::PathBuf, time::Duration};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    foundation::error::{AnimError, AnimResult},
    render::{ffmpeg::GifRepeat, manim::ManimOptions},
};

/// Compiler settings, loadable from JSON. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    /// Directory holding `anim-<fingerprint>.gif` artifacts.
    pub output_dir: PathBuf,
    /// Scratch directory for render jobs. Defaults to `<output_dir>/.work`.
    pub work_dir: Option<PathBuf>,
    /// Overrides the probed backend version in fingerprints.
    pub backend_version: Option<String>,
    pub render_timeout_secs: u64,
    /// Render worker threads. `None` uses one per CPU.
    pub workers: Option<usize>,
    pub manim_command: Vec<String>,
    pub ffmpeg: String,
    pub gif_width: Option<u32>,
    /// Extra plays after the first; `None` loops forever.
    pub gif_repeat: Option<u16>,
    pub transparent: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("animations"),
            work_dir: None,
            backend_version: None,
            render_timeout_secs: 300,
            workers: None,
            manim_command: vec!["python3".into(), "-m".into(), "manim".into()],
            ffmpeg: "ffmpeg".to_string(),
            gif_width: None,
            gif_repeat: Some(0),
            transparent: true,
        }
    }
}

impl CompilerConfig {
    pub fn from_json_str(s: &str) -> AnimResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| AnimError::config(format!("invalid config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> AnimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> AnimResult<()> {
        if self.render_timeout_secs == 0 {
            return Err(AnimError::config("render_timeout_secs must be >= 1"));
        }
        if self.workers == Some(0) {
            return Err(AnimError::config("workers must be >= 1 when set"));
        }
        if self.manim_command.first().is_none_or(|p| p.trim().is_empty()) {
            return Err(AnimError::config("manim_command must name a program"));
        }
        if self.ffmpeg.trim().is_empty() {
            return Err(AnimError::config("ffmpeg must name a program"));
        }
        if self.gif_width == Some(0) {
            return Err(AnimError::config("gif_width must be >= 1 when set"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(AnimError::config("output_dir must not be empty"));
        }
        Ok(())
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn work_dir(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| self.output_dir.join(".work"))
    }

    pub fn gif_repeat(&self) -> GifRepeat {
        self.gif_repeat.map_or(GifRepeat::Forever, GifRepeat::Times)
    }

    pub fn manim_options(&self) -> ManimOptions {
        ManimOptions {
            command: self.manim_command.clone(),
            ffmpeg: self.ffmpeg.clone(),
            timeout: self.render_timeout(),
            work_dir: self.work_dir(),
            gif_width: self.gif_width,
            repeat: self.gif_repeat(),
            transparent: self.transparent,
            backend_version: self.backend_version.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
