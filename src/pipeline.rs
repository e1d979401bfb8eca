use std::{path::PathBuf, sync::Arc};

use rayon::prelude::*;
use serde::Serialize;

use crate::{
    cache::{
        fingerprint::{Fingerprint, fingerprint},
        store::{ArtifactCache, CacheStats},
    },
    compile::{
        codegen::generate,
        emit::{SCENE_NAME, emit_manim},
        program::Program,
    },
    config::CompilerConfig,
    foundation::{
        diagnostic::Diagnostic,
        error::{AnimError, AnimResult},
    },
    parse::block::{check_syntax, parse_block},
    render::{
        RenderJob, Renderer,
        manim::{DependencyReport, ManimRenderer},
    },
    resolve::{resolver::resolve, symbols::SymbolTable},
    scene::language::LanguageTable,
};

/// A block taken through parsing, resolution and code generation.
#[derive(Clone, Debug)]
pub struct CompiledBlock {
    pub program: Program,
    pub symbols: SymbolTable,
    /// Manim script for `program`.
    pub script: String,
}

/// Parse, resolve and generate one block. Pure; never touches the renderer or the cache.
#[tracing::instrument(skip_all, fields(bytes = source.len()))]
pub fn compile_source(source: &str, table: &LanguageTable) -> AnimResult<CompiledBlock> {
    let scene = parse_block(source, table)?;
    let resolved = resolve(scene, table)?;
    let program = generate(&resolved);
    let script = emit_manim(&program);
    Ok(CompiledBlock {
        program,
        symbols: resolved.symbols,
        script,
    })
}

/// Every diagnostic for `source`: all syntax errors, or else the first resolution error.
pub fn check_source(source: &str, table: &LanguageTable) -> Vec<Diagnostic> {
    let syntax = check_syntax(source, table);
    if !syntax.is_empty() {
        return syntax.iter().map(Diagnostic::from).collect();
    }
    match parse_block(source, table).and_then(|scene| resolve(scene, table)) {
        Ok(_) => Vec::new(),
        Err(e) => vec![Diagnostic::from(&e)],
    }
}

/// A rendered block plus the layout hints the document needs to embed it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Artifact {
    pub path: PathBuf,
    pub fingerprint: String,
    /// Served from the cache without rendering.
    pub cached: bool,
    pub height: u32,
    pub width: Option<u32>,
    pub scale: Option<f64>,
}

/// Per-block result of a batch.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum BlockOutcome {
    Rendered(Artifact),
    Failed(Diagnostic),
}

impl BlockOutcome {
    pub fn artifact(&self) -> Option<&Artifact> {
        match self {
            Self::Rendered(a) => Some(a),
            Self::Failed(_) => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Rendered(_) => None,
            Self::Failed(d) => Some(d),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub blocks: u64,
    pub rendered: u64,
    pub cached: u64,
    pub failed: u64,
}

/// Compiles blocks and renders them through a shared artifact cache.
pub struct Compiler {
    table: &'static LanguageTable,
    cache: ArtifactCache,
    renderer: Arc<dyn Renderer>,
    workers: Option<usize>,
}

impl Compiler {
    pub fn new(config: &CompilerConfig, renderer: Arc<dyn Renderer>) -> AnimResult<Self> {
        config.validate()?;
        Ok(Self {
            table: LanguageTable::standard(),
            cache: ArtifactCache::new(config.output_dir.clone()),
            renderer,
            workers: config.workers,
        })
    }

    /// Compiler backed by the manim CLI as configured.
    pub fn with_manim(config: &CompilerConfig) -> AnimResult<Self> {
        let renderer = Arc::new(ManimRenderer::new(config.manim_options()));
        Self::new(config, renderer)
    }

    pub fn table(&self) -> &'static LanguageTable {
        self.table
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn compile(&self, source: &str) -> AnimResult<CompiledBlock> {
        compile_source(source, self.table)
    }

    pub fn check(&self, source: &str) -> Vec<Diagnostic> {
        check_source(source, self.table)
    }

    /// Cache key of `source` under the current backend version.
    pub fn fingerprint(&self, source: &str) -> AnimResult<Fingerprint> {
        let scene = parse_block(source, self.table)?;
        Ok(fingerprint(
            source,
            &scene.metadata,
            &self.renderer.backend_version(),
        ))
    }

    /// Compile and render one block, reusing the cached artifact when there is one.
    #[tracing::instrument(skip_all)]
    pub fn render_block(&self, source: &str) -> AnimResult<Artifact> {
        let compiled = self.compile(source)?;
        let metadata = &compiled.program.metadata;
        let version = self.renderer.backend_version();
        let outcome = self
            .cache
            .lookup_or_render(source, metadata, &version, |out| {
                let job = RenderJob {
                    script: &compiled.script,
                    scene_name: SCENE_NAME,
                    metadata,
                    fingerprint: fingerprint(source, metadata, &version),
                };
                self.renderer.render(&job, out)
            })?;
        Ok(Artifact {
            path: outcome.path,
            fingerprint: outcome.fingerprint.to_hex(),
            cached: outcome.hit,
            height: metadata.height,
            width: metadata.width,
            scale: metadata.scale,
        })
    }

    /// Render independent blocks on the worker pool. Results are in input order; a failing
    /// block yields a diagnostic in its slot and does not affect the others.
    #[tracing::instrument(skip_all, fields(blocks = sources.len()))]
    pub fn render_blocks<S>(&self, sources: &[S]) -> AnimResult<(Vec<BlockOutcome>, BatchStats)>
    where
        S: AsRef<str> + Sync,
    {
        let pool = build_thread_pool(self.workers)?;
        let outcomes: Vec<BlockOutcome> = pool.install(|| {
            sources
                .par_iter()
                .enumerate()
                .map(|(idx, source)| match self.render_block(source.as_ref()) {
                    Ok(artifact) => BlockOutcome::Rendered(artifact),
                    Err(e) => {
                        tracing::warn!(block = idx, "{e}");
                        BlockOutcome::Failed(Diagnostic::from(e))
                    }
                })
                .collect()
        });

        let mut stats = BatchStats {
            blocks: outcomes.len() as u64,
            ..BatchStats::default()
        };
        for outcome in &outcomes {
            match outcome {
                BlockOutcome::Rendered(a) if a.cached => stats.cached += 1,
                BlockOutcome::Rendered(_) => stats.rendered += 1,
                BlockOutcome::Failed(_) => stats.failed += 1,
            }
        }
        tracing::info!(
            rendered = stats.rendered,
            cached = stats.cached,
            failed = stats.failed,
            "batch finished"
        );
        Ok((outcomes, stats))
    }
}

/// External tools needed by the manim renderer under `config`.
pub fn check_dependencies(config: &CompilerConfig) -> DependencyReport {
    ManimRenderer::new(config.manim_options()).check_dependencies()
}

fn build_thread_pool(threads: Option<usize>) -> AnimResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(AnimError::config("workers must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| AnimError::render(format!("failed to build render worker pool: {e}")))
}
