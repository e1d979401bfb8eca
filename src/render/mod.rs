use std::path::Path;

use crate::{cache::fingerprint::Fingerprint, foundation::error::AnimResult, scene::model::Metadata};

pub(crate) mod ffmpeg;
pub(crate) mod gif;
pub(crate) mod manim;
pub(crate) mod process;

/// Everything a backend needs to turn one compiled block into an artifact.
#[derive(Clone, Copy, Debug)]
pub struct RenderJob<'a> {
    /// Complete backend script.
    pub script: &'a str,
    /// Scene class the backend should render.
    pub scene_name: &'a str,
    pub metadata: &'a Metadata,
    pub fingerprint: Fingerprint,
}

/// Boundary to the external animation engine.
///
/// Implementations must be usable from several worker threads at once.
pub trait Renderer: Send + Sync {
    /// Version tag folded into every fingerprint; a change invalidates cached artifacts.
    fn backend_version(&self) -> String;

    /// Render `job` and write the finished artifact to `out`.
    fn render(&self, job: &RenderJob<'_>, out: &Path) -> AnimResult<()>;
}
