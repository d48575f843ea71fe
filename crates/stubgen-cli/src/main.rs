use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use stubgen_config::{load_for_root, StubgenConfig};
use stubgen_processor::{
    ArtifactKind, GeneratedArtifact, ProcessError, Processor, RequestKind, RequestSummary,
};
use stubgen_symbols::SymbolUniverse;

mod writer;

use writer::{portable_path, DirectoryWriter};

#[derive(Parser)]
#[command(name = "stubgen", version, about = "Generate mocks, fakes and injectors from a symbol snapshot")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a full round and write the generated sources
    Generate(GenerateArgs),
    /// Report what a round would generate, without generating it
    Check(CheckArgs),
    /// Print the effective configuration as TOML
    Config(ConfigArgs),
}

#[derive(Args)]
struct ConfigSource {
    /// Config file (defaults to `stubgen.toml` in the root, or `$STUBGEN_CONFIG`)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Root that config discovery and the output directory are relative to
    #[arg(long, default_value = ".")]
    root: PathBuf,
}

#[derive(Args)]
struct GenerateArgs {
    /// JSON symbol snapshot exported by the host
    snapshot: PathBuf,
    #[command(flatten)]
    source: ConfigSource,
    /// Output directory (overrides `output.dir`)
    #[arg(long)]
    out: Option<PathBuf>,
    /// List the artifacts without writing them
    #[arg(long)]
    dry_run: bool,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct CheckArgs {
    /// JSON symbol snapshot exported by the host
    snapshot: PathBuf,
    #[command(flatten)]
    source: ConfigSource,
    /// Emit JSON suitable for CI
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ConfigArgs {
    #[command(flatten)]
    source: ConfigSource,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Generate(args) => {
            let (config, _) = load_config(&args.source)?;
            stubgen_config::init_tracing(&config.logging);
            let universe = load_snapshot(&args.snapshot)?;
            let processor = processor(&config);

            let out = args
                .out
                .unwrap_or_else(|| args.source.root.join(&config.output.dir));

            if args.dry_run {
                let artifacts = match processor.run(&universe) {
                    Ok(artifacts) => artifacts,
                    Err(err) => return report_failure(err, args.json),
                };
                print_generated(&artifacts, &out, None, args.json)?;
                return Ok(0);
            }

            let mut writer = DirectoryWriter::new(&out);
            let artifacts = match processor.run_and_write(&universe, &mut writer) {
                Ok(artifacts) => artifacts,
                Err(err) => return report_failure(err, args.json),
            };
            let manifest = writer
                .write_manifest(&config.output.manifest)
                .with_context(|| format!("failed to write manifest under {}", out.display()))?;
            tracing::info!(
                target: "stubgen.cli",
                written = writer.written(),
                unchanged = writer.unchanged(),
                "generation finished"
            );
            print_generated(&artifacts, writer.root(), Some(&manifest), args.json)?;
            Ok(0)
        }
        Command::Check(args) => {
            let (config, _) = load_config(&args.source)?;
            stubgen_config::init_tracing(&config.logging);
            let universe = load_snapshot(&args.snapshot)?;

            let requests = match processor(&config).analyze(&universe) {
                Ok(requests) => requests,
                Err(err) => return report_failure(err, args.json),
            };
            print_summary(&requests.summary(&universe), args.json)?;
            Ok(0)
        }
        Command::Config(args) => {
            let (config, path) = load_config(&args.source)?;
            if let Some(path) = path {
                println!("# loaded from {}", path.display());
            }
            print!("{}", config.to_toml_string()?);
            Ok(0)
        }
    }
}

fn load_config(source: &ConfigSource) -> Result<(StubgenConfig, Option<PathBuf>)> {
    match &source.config {
        Some(path) => {
            let config = StubgenConfig::load_from_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            Ok((config, Some(path.clone())))
        }
        None => load_for_root(&source.root).context("failed to load config"),
    }
}

fn load_snapshot(path: &Path) -> Result<SymbolUniverse> {
    SymbolUniverse::load_from_path(path)
        .with_context(|| format!("failed to load symbol snapshot {}", path.display()))
}

fn processor(config: &StubgenConfig) -> Processor {
    Processor::new(config.processor_options()).with_print_config(config.print_config())
}

#[derive(Serialize)]
struct DiagnosticReport<'a> {
    kind: &'static str,
    location: Option<&'a str>,
    message: String,
}

#[derive(Serialize)]
struct FailureReport<'a> {
    ok: bool,
    errors: Vec<DiagnosticReport<'a>>,
}

/// Diagnostics exit with 1; anything else is an ordinary error.
fn report_failure(err: ProcessError, json: bool) -> Result<i32> {
    if !err.is_diagnostic() {
        return Err(err.into());
    }

    let diagnostics = err.diagnostics();
    if json {
        let report = FailureReport {
            ok: false,
            errors: diagnostics
                .iter()
                .map(|diagnostic| DiagnosticReport {
                    kind: diagnostic.kind(),
                    location: diagnostic.location(),
                    message: diagnostic
                        .message()
                        .map(str::to_owned)
                        .unwrap_or_else(|| diagnostic.to_string()),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for diagnostic in &diagnostics {
            eprintln!("error[{}]: {diagnostic}", diagnostic.kind());
        }
        eprintln!("stubgen: {} error(s), nothing generated", diagnostics.len());
    }
    Ok(1)
}

#[derive(Serialize)]
struct ArtifactReport<'a> {
    kind: ArtifactKind,
    name: String,
    path: String,
    origins: Vec<&'a str>,
}

#[derive(Serialize)]
struct GenerateReport<'a> {
    ok: bool,
    out_dir: String,
    manifest: Option<String>,
    artifacts: Vec<ArtifactReport<'a>>,
}

fn print_generated(
    artifacts: &[GeneratedArtifact],
    out: &Path,
    manifest: Option<&Path>,
    json: bool,
) -> Result<()> {
    if json {
        let report = GenerateReport {
            ok: true,
            out_dir: out.display().to_string(),
            manifest: manifest.map(|path| path.display().to_string()),
            artifacts: artifacts
                .iter()
                .map(|artifact| ArtifactReport {
                    kind: artifact.kind,
                    name: artifact.qualified_name(),
                    path: portable_path(&artifact.relative_path()),
                    origins: artifact.origins.iter().map(String::as_str).collect(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for artifact in artifacts {
        println!(
            "{:<8} {}",
            kind_label(artifact.kind),
            portable_path(&artifact.relative_path())
        );
    }
    match manifest {
        Some(path) => println!(
            "generated {} file(s) in {} (manifest: {})",
            artifacts.len(),
            out.display(),
            path.display()
        ),
        None => println!("dry run: {} file(s) would be generated in {}", artifacts.len(), out.display()),
    }
    Ok(())
}

fn kind_label(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Mock => "mock",
        ArtifactKind::Fake => "fake",
        ArtifactKind::Injector => "injector",
    }
}

fn print_summary(summary: &RequestSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("mocks:");
    for target in &summary.mocks {
        println!("  {} ({})", target.target, target.origins.join(", "));
    }
    println!("fakes:");
    for target in &summary.fakes {
        println!("  {} ({})", target.target, target.origins.join(", "));
    }
    println!("injections:");
    for injection in &summary.injections {
        let fields: Vec<String> = injection
            .fields
            .iter()
            .map(|field| format!("{} ({})", field.name, field_kind(field.kind)))
            .collect();
        println!("  {}: {}", injection.owner, fields.join(", "));
    }
    Ok(())
}

fn field_kind(kind: RequestKind) -> &'static str {
    match kind {
        RequestKind::Mock => "mock",
        RequestKind::Fake => "fake",
    }
}
