use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use psmodgen_core::config::load_config;
use psmodgen_core::manifest::assemble_manifest;
use psmodgen_core::model::load_model;
use psmodgen_core::script::{generate_scripts, inspect_model};

#[derive(Debug, Parser)]
#[command(
    name = "psmodgen",
    version,
    about = "Generates PowerShell proxy cmdlet scripts and a module manifest from a cmdlet variant model"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Generate one proxy cmdlet script per logical operation")]
    Generate(GenerateArgs),
    #[command(about = "Assemble the module manifest (.psd1) over generated scripts")]
    Manifest(ManifestArgs),
    #[command(about = "Resolve the model without writing anything and report per-group details")]
    Inspect(InspectArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    #[arg(long, value_name = "PATH", help = "Cmdlet variant model (JSON)")]
    model: PathBuf,
    #[arg(long, value_name = "DIR", help = "Output folder for generated scripts")]
    exports: PathBuf,
    #[arg(long, help = "Print the report as JSON")]
    json: bool,
}

#[derive(Debug, Args)]
struct ManifestArgs {
    #[arg(long, value_name = "DIR", help = "Folder of generated proxy scripts")]
    exports: PathBuf,
    #[arg(long, value_name = "DIR", help = "Folder of custom extension files")]
    custom: PathBuf,
    #[arg(long, value_name = "PATH", help = "Manifest file to write (GUID preserved if present)")]
    psd1: PathBuf,
    #[arg(long, value_name = "PATH", help = "Module metadata TOML (defaults to psmodgen.toml)")]
    config: Option<PathBuf>,
    #[arg(long, help = "Print the report as JSON")]
    json: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    #[arg(long, value_name = "PATH", help = "Cmdlet variant model (JSON)")]
    model: PathBuf,
    #[arg(long, help = "Print the report as JSON")]
    json: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Generate(args)) => run_generate(args),
        Some(Commands::Manifest(args)) => run_manifest(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        None => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    let report = generate_scripts(&model, &args.exports)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("exports: {}", normalize_path(&args.exports));
    println!("generated: {}", report.generated);
    for script in &report.scripts {
        println!("  - {script}");
    }
    if !report.failures.is_empty() {
        println!("failures: {}", report.failures.len());
        for failure in &report.failures {
            println!("  - {failure}");
        }
    }
    Ok(())
}

fn run_manifest(args: ManifestArgs) -> Result<()> {
    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from("psmodgen.toml"));
    let config = load_config(&config_path)?;
    let report = assemble_manifest(&args.exports, &args.custom, &args.psd1, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("psd1: {}", report.psd1_path);
    println!("guid: {} ({})", report.guid, if report.reused_guid { "reused" } else { "fresh" });
    println!("cmdlets: {}", report.cmdlets.len());
    println!("aliases: {}", report.aliases.len());
    println!("format_files: {}", report.format_files.len());
    for file in &report.format_files {
        println!("  - {file}");
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    let report = inspect_model(&model);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("groups: {}", report.total_groups);
    println!("failed: {}", report.failed_groups);
    for group in &report.groups {
        println!();
        println!("cmdlet: {}", group.cmdlet_name);
        println!("  variants: {}", group.variants);
        if !group.parameter_sets.is_empty() {
            println!("  parameter_sets: {}", group.parameter_sets.join(", "));
        }
        if !group.parameters.is_empty() {
            println!("  parameters: {}", group.parameters.join(", "));
        }
        if !group.shared_parameters.is_empty() {
            println!("  shared: {}", group.shared_parameters.join(", "));
        }
        println!(
            "  default_parameter_set: {}",
            group.default_parameter_set.as_deref().unwrap_or("<none>")
        );
        if let Some(failure) = &group.failure {
            println!("  failure: {failure}");
        }
    }
    Ok(())
}

fn normalize_path(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
