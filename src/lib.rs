//! animdown compiles a small line-oriented animation language into Manim scenes and caches the
//! rendered GIFs.
//!
//! The pipeline for one block is pure up to the render step:
//!
//! - [`parse_block`] turns source text into a [`Scene`]
//! - [`resolve`] checks names against a [`SymbolTable`]
//! - [`generate`] lowers the scene into a [`Program`], which [`emit_manim`] prints as a script
//! - [`ArtifactCache`] keys rendered artifacts by [`Fingerprint`] and renders only on a miss
//!
//! [`Compiler`] ties these together and renders batches of blocks on a worker pool.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod cache;
pub(crate) mod compile;
pub(crate) mod config;
pub(crate) mod parse;
pub(crate) mod render;
pub(crate) mod resolve;
pub(crate) mod scene;

mod pipeline;

pub use crate::foundation::diagnostic::{Diagnostic, DiagnosticKind};
pub use crate::foundation::error::{AnimError, AnimResult};

pub use crate::scene::language::LanguageTable;
pub use crate::scene::model::{
    AxisRange, Color, Command, Direction, Domain, Metadata, ObjectKind, Position, Quality,
    RawCode, Scene, ShapeKind, Statement,
};

pub use crate::parse::block::{check_syntax, parse_block};
pub use crate::parse::line::{Line, VERBS, parse_line};
pub use crate::parse::metadata::{METADATA_KEYS, MetadataEntry, parse_metadata};

pub use crate::resolve::resolver::{ResolvedScene, resolve};
pub use crate::resolve::symbols::{Symbol, SymbolTable};

pub use crate::compile::codegen::generate;
pub use crate::compile::emit::{SCENE_NAME, emit_manim};
pub use crate::compile::program::{
    Animation, Construct, Display, ObjectSpec, Op, OpKind, Placement, Program,
};

pub use crate::cache::fingerprint::{Fingerprint, fingerprint, normalize_source};
pub use crate::cache::store::{ArtifactCache, CacheOutcome, CacheStats};

pub use crate::config::CompilerConfig;
pub use crate::render::ffmpeg::GifRepeat;
pub use crate::render::manim::{DependencyReport, ManimOptions, ManimRenderer};
pub use crate::render::{RenderJob, Renderer};

pub use crate::pipeline::{
    Artifact, BatchStats, BlockOutcome, CompiledBlock, Compiler, check_dependencies,
    check_source, compile_source,
};
