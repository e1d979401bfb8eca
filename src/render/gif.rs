use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use image::{
    AnimationDecoder as _, RgbaImage,
    codecs::gif::{GifDecoder, GifEncoder, Repeat},
};

use crate::{
    foundation::error::{AnimError, AnimResult},
    render::ffmpeg::GifRepeat,
};

/// Channel value above which a pixel counts as background white.
pub const NEAR_WHITE: u8 = 250;

/// Make every pixel whose RGB channels are all above [`NEAR_WHITE`] fully transparent.
///
/// Returns the number of pixels changed.
pub fn clear_near_white(img: &mut RgbaImage) -> usize {
    let mut changed = 0;
    for px in img.pixels_mut() {
        let [r, g, b, a] = px.0;
        if r > NEAR_WHITE && g > NEAR_WHITE && b > NEAR_WHITE && a != 0 {
            px.0 = [255, 255, 255, 0];
            changed += 1;
        }
    }
    changed
}

/// Rewrite the GIF at `path` with near-white pixels cleared and the given repeat behavior.
pub(crate) fn make_white_transparent(path: &Path, repeat: GifRepeat) -> AnimResult<()> {
    let file = File::open(path)
        .map_err(|e| AnimError::render(format!("failed to open '{}': {e}", path.display())))?;
    let decoder = GifDecoder::new(BufReader::new(file))
        .map_err(|e| AnimError::render(format!("failed to decode GIF '{}': {e}", path.display())))?;
    let mut frames = decoder.into_frames().collect_frames().map_err(|e| {
        AnimError::render(format!("failed to read frames of '{}': {e}", path.display()))
    })?;

    let mut changed = 0usize;
    for frame in &mut frames {
        changed += clear_near_white(frame.buffer_mut());
    }

    let tmp = path.with_extension("post.gif");
    let mut guard = TempFileGuard(Some(tmp.clone()));
    {
        let file = File::create(&tmp)
            .map_err(|e| AnimError::render(format!("failed to create '{}': {e}", tmp.display())))?;
        let mut encoder = GifEncoder::new(BufWriter::new(file));
        encoder
            .set_repeat(match repeat {
                GifRepeat::Forever => Repeat::Infinite,
                GifRepeat::Times(n) => Repeat::Finite(n),
            })
            .map_err(|e| AnimError::render(format!("failed to set GIF repeat: {e}")))?;
        encoder
            .encode_frames(frames)
            .map_err(|e| AnimError::render(format!("failed to encode '{}': {e}", tmp.display())))?;
    }
    std::fs::rename(&tmp, path)
        .map_err(|e| AnimError::render(format!("failed to replace '{}': {e}", path.display())))?;
    guard.0 = None;
    tracing::debug!(changed, path = %path.display(), "cleared near-white pixels");
    Ok(())
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/gif.rs"]
mod tests;
