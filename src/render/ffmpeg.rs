use std::{path::Path, process::Command, time::Duration};

use crate::{
    foundation::error::AnimResult,
    render::process::{expect_success, run_with_timeout},
};

/// How a GIF repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GifRepeat {
    Forever,
    /// Extra plays after the first one; `Times(0)` plays once.
    Times(u16),
}

impl GifRepeat {
    /// Value for ffmpeg's GIF muxer `-loop` option.
    fn ffmpeg_loop_arg(self) -> String {
        match self {
            Self::Forever => "0".to_string(),
            Self::Times(0) => "-1".to_string(),
            Self::Times(n) => n.to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct GifConversion<'a> {
    pub(crate) ffmpeg: &'a str,
    pub(crate) fps: u32,
    pub(crate) width: Option<u32>,
    pub(crate) repeat: GifRepeat,
    pub(crate) timeout: Duration,
}

/// Palette filter graph: white is keyed out before palette generation so the palette reserves a
/// transparent entry.
pub(crate) fn filter_graph(fps: u32, width: Option<u32>) -> String {
    let mut chain = format!("fps={fps}");
    if let Some(w) = width {
        chain.push_str(&format!(",scale={w}:-1:flags=lanczos"));
    }
    format!(
        "[0:v]{chain},colorkey=white:0.1:0.0,split[a][b];\
         [a]palettegen=reserve_transparent=1[p];\
         [b][p]paletteuse=alpha_threshold=128"
    )
}

/// Convert a rendered video into a GIF at `output`.
pub(crate) fn video_to_gif(
    conv: &GifConversion<'_>,
    input: &Path,
    output: &Path,
    log_dir: &Path,
) -> AnimResult<()> {
    let mut cmd = Command::new(conv.ffmpeg);
    cmd.args(["-y", "-loglevel", "error", "-i"])
        .arg(input)
        .args(["-filter_complex", &filter_graph(conv.fps, conv.width)])
        .args(["-loop", &conv.repeat.ffmpeg_loop_arg(), "-f", "gif"])
        .arg(output);
    let out = run_with_timeout(&mut cmd, conv.timeout, log_dir, "ffmpeg")?;
    expect_success("ffmpeg", out)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/ffmpeg.rs"]
mod tests;
