use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "weightpaint", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a rig from JSON and write one image per exported bone.
    Render(RenderArgs),
    /// Compute a built-in rig and write its images.
    Preset(PresetArgs),
    /// Print a built-in rig as JSON (a starting point for custom rigs).
    DumpPreset(DumpPresetArgs),
    /// Check a rig JSON file without computing anything.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input rig JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct PresetArgs {
    /// Built-in rig name.
    #[arg(long, default_value = "bat-wing")]
    name: String,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser, Debug)]
struct DumpPresetArgs {
    /// Built-in rig name.
    #[arg(long, default_value = "bat-wing")]
    name: String,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input rig JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Output directory (created if missing).
    #[arg(long)]
    out_dir: PathBuf,

    /// File name prefix; images are named `<base-name>_<bone>.<ext>`.
    #[arg(long, default_value = "bone")]
    base_name: String,

    /// Override the rig's image format.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Bmp,
    Tiff,
}

impl From<FormatChoice> for weightpaint::ExportFormat {
    fn from(c: FormatChoice) -> Self {
        match c {
            FormatChoice::Png => Self::Png,
            FormatChoice::Bmp => Self::Bmp,
            FormatChoice::Tiff => Self::Tiff,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Preset(args) => cmd_preset(args),
        Command::DumpPreset(args) => cmd_dump_preset(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let rig = weightpaint::Rig::from_path(&args.in_path)
        .with_context(|| format!("load rig '{}'", args.in_path.display()))?;
    write_rig(rig, &args.output)
}

fn cmd_preset(args: PresetArgs) -> anyhow::Result<()> {
    write_rig(lookup_preset(&args.name)?, &args.output)
}

fn cmd_dump_preset(args: DumpPresetArgs) -> anyhow::Result<()> {
    let rig = lookup_preset(&args.name)?;
    println!("{}", rig.to_json_string()?);
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let rig = weightpaint::Rig::from_path(&args.in_path)
        .with_context(|| format!("validate rig '{}'", args.in_path.display()))?;
    eprintln!(
        "{} is valid ({} maps, {}x{})",
        args.in_path.display(),
        rig.maps.len(),
        rig.resolution.width,
        rig.resolution.height
    );
    Ok(())
}

fn lookup_preset(name: &str) -> anyhow::Result<weightpaint::Rig> {
    weightpaint::presets::preset(name).with_context(|| {
        format!(
            "unknown preset '{name}' (available: {})",
            weightpaint::presets::PRESET_NAMES.join(", ")
        )
    })
}

fn write_rig(mut rig: weightpaint::Rig, output: &OutputArgs) -> anyhow::Result<()> {
    if let Some(format) = output.format {
        rig.format = format.into();
    }
    std::fs::create_dir_all(&output.out_dir)
        .with_context(|| format!("create output dir '{}'", output.out_dir.display()))?;

    let base = Path::new(&output.out_dir).join(&output.base_name);
    let written = weightpaint::export_rig(&rig, &base)?;
    for path in &written {
        tracing::info!(path = %path.display(), "wrote");
    }
    eprintln!("wrote {} images to {}", written.len(), output.out_dir.display());
    Ok(())
}
