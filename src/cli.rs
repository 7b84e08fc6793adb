//! Minimal CLI: style spec → (flow | manifest)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stylespec_typegen::codegen::{self, Config};
use stylespec_typegen::variant::LayerRules;
use stylespec_typegen::StyleSpec;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate Flow type declarations from the style specification reference
#[derive(Parser, Debug)]
#[command(name = "stylespec-typegen", version)]
pub struct CommandLineInterface {
    /// log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate the Flow declarations
    Flow(FlowOut),
    /// print the names of every declaration as JSON
    Manifest(ManifestOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// style specification reference document (e.g. v8.json)
    #[arg(long, short)]
    input: PathBuf,

    /// reference unknown type tags by their capitalized name instead of failing
    #[arg(long, default_value_t = false)]
    allow_unknown_types: bool,

    /// layer type without a geometric source; repeat to list several (replaces the default set)
    #[arg(long = "sourceless-layer", value_name = "TAG")]
    sourceless_layers: Vec<String>,

    /// layer type without a zoom range; repeat to list several (replaces the default set)
    #[arg(long = "unzoomable-layer", value_name = "TAG")]
    unzoomable_layers: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct FlowOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .js file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// fail if the output file is not up to date, without writing it
    #[arg(long, requires = "out")]
    check: bool,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct ManifestOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<StyleSpec> {
        let source = std::fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read {}", self.input.display()))?;
        StyleSpec::parse(&source).with_context(|| format!("failed to load {}", self.input.display()))
    }

    fn config(&self) -> Config {
        let defaults = LayerRules::default();
        let pick = |given: &Vec<String>, default: Vec<String>| {
            if given.is_empty() { default } else { given.clone() }
        };
        Config {
            allow_unknown_types: self.allow_unknown_types,
            layer_rules: LayerRules {
                sourceless: pick(&self.sourceless_layers, defaults.sourceless),
                unzoomable: pick(&self.unzoomable_layers, defaults.unzoomable),
            },
        }
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        init_logging(&self.log_level);
        match &self.cmd {
            Command::Flow(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let spec = target.input_settings.load()?;
                let flow_src = codegen::generate(&spec, &target.input_settings.config())
                    .with_context(|| format!("failed to generate from {}", target.input_settings.input.display()))?;

                match (&target.out, target.check) {
                    (Some(out), true) => check_output(out, &flow_src),
                    (out, _) => write_output(out.as_deref(), &flow_src),
                }
            }
            Command::Manifest(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let spec = target.input_settings.load()?;
                let document = codegen::assemble(&spec, &target.input_settings.config())?;
                let mut manifest_src = serde_json::to_string_pretty(&document.manifest())?;
                manifest_src.push('\n');
                write_output(target.out.as_deref(), &manifest_src)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    let Some(out) = out else {
        print!("{src}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(path = %out.display(), "wrote output");
    Ok(())
}

fn check_output(out: &Path, src: &str) -> Result<()> {
    let current = std::fs::read_to_string(out)
        .with_context(|| format!("failed to read {}", out.display()))?;
    if current != src {
        bail!("{} is out of date; regenerate it with `stylespec-typegen flow`", out.display());
    }
    Ok(())
}
