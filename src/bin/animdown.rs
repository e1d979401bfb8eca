use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "animdown", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and resolve blocks and report every problem found.
    Check(CheckArgs),
    /// Print the generated Manim script for a block.
    Emit(EmitArgs),
    /// Render blocks to GIFs through the artifact cache.
    Render(RenderArgs),
    /// Print the cache key of a block.
    Fingerprint(FingerprintArgs),
    /// Report whether manim and ffmpeg are available.
    Doctor(DoctorArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// DSL block files.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Print diagnostics as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct EmitArgs {
    /// DSL block file.
    file: PathBuf,

    /// Print the operation listing instead of the script.
    #[arg(long)]
    dump: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// DSL block files.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Compiler config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Artifact directory (overrides the config).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Render worker threads (overrides the config).
    #[arg(long)]
    workers: Option<usize>,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FingerprintArgs {
    /// DSL block file.
    file: PathBuf,

    /// Compiler config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DoctorArgs {
    /// Compiler config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Emit(args) => cmd_emit(args),
        Command::Render(args) => cmd_render(args),
        Command::Fingerprint(args) => cmd_fingerprint(args),
        Command::Doctor(args) => cmd_doctor(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_block(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("read block '{}'", path.display()))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<animdown::CompilerConfig> {
    match path {
        Some(p) => Ok(animdown::CompilerConfig::from_json_file(p)?),
        None => Ok(animdown::CompilerConfig::default()),
    }
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let table = animdown::LanguageTable::standard();
    let mut failed = 0usize;
    let mut report = serde_json::Map::new();

    for file in &args.files {
        let source = read_block(file)?;
        let diagnostics = animdown::check_source(&source, table);
        if !diagnostics.is_empty() {
            failed += 1;
        }
        if args.json {
            report.insert(
                file.display().to_string(),
                serde_json::to_value(&diagnostics).context("serialize diagnostics")?,
            );
            continue;
        }
        if diagnostics.is_empty() {
            println!("{}: ok", file.display());
        }
        for d in &diagnostics {
            println!("{}: {d}", file.display());
        }
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serialize report")?
        );
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} block(s) have errors", args.files.len());
    }
    Ok(())
}

fn cmd_emit(args: EmitArgs) -> anyhow::Result<()> {
    let source = read_block(&args.file)?;
    let compiled = animdown::compile_source(&source, animdown::LanguageTable::standard())?;
    if args.dump {
        print!("{}", compiled.program.dump());
    } else {
        print!("{}", compiled.script);
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(dir) = args.out_dir {
        config.output_dir = dir;
    }
    if args.workers.is_some() {
        config.workers = args.workers;
    }

    let sources = args
        .files
        .iter()
        .map(|f| read_block(f))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let compiler = animdown::Compiler::with_manim(&config)?;
    let (outcomes, stats) = compiler.render_blocks(&sources)?;

    if args.json {
        let rows: Vec<_> = args
            .files
            .iter()
            .zip(&outcomes)
            .map(|(file, outcome)| {
                serde_json::json!({ "file": file.display().to_string(), "outcome": outcome })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "blocks": rows, "stats": stats }))
                .context("serialize render report")?
        );
    } else {
        for (file, outcome) in args.files.iter().zip(&outcomes) {
            match outcome {
                animdown::BlockOutcome::Rendered(a) => {
                    let how = if a.cached { "cached" } else { "rendered" };
                    println!("{}: {how} {}", file.display(), a.path.display());
                }
                animdown::BlockOutcome::Failed(d) => {
                    println!("{}: {d}", file.display());
                }
            }
        }
        eprintln!(
            "blocks: {} rendered: {} cached: {} failed: {}",
            stats.blocks, stats.rendered, stats.cached, stats.failed
        );
    }

    if stats.failed > 0 {
        anyhow::bail!("{} of {} block(s) failed", stats.failed, stats.blocks);
    }
    Ok(())
}

fn cmd_fingerprint(args: FingerprintArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let source = read_block(&args.file)?;
    let compiler = animdown::Compiler::with_manim(&config)?;
    println!("{}", compiler.fingerprint(&source)?);
    Ok(())
}

fn cmd_doctor(args: DoctorArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let report = animdown::check_dependencies(&config);
    let status = |ok: bool| if ok { "found" } else { "missing" };
    println!("manim:  {} ({})", status(report.manim), config.manim_command.join(" "));
    println!("ffmpeg: {} ({})", status(report.ffmpeg), config.ffmpeg);
    if !report.all_present() {
        anyhow::bail!("missing dependencies: {}", report.missing().join(", "));
    }
    Ok(())
}
