use artfx::filters::{FilterKind, FilterRegistry};
use artfx::{config, output, process};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let hash = env!("ARTFX_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "artfx")]
#[command(about = "Apply artistic filters to photographs")]
#[command(long_about = "\
Apply artistic filters to photographs

Filters:
  vintage     muted warm colour, film grain and a dark vignette
  watercolor  smoothed colour with soft edges
  oil         punchy edges smoothed into brush strokes
  sketch      grayscale pencil lines on white
  enhance     gentle sharpness, contrast and colour boost

Batch mode processes every .jpg/.jpeg/.png/.bmp file directly inside the input
directory and writes <effect>_<filename> into the output directory.

Run 'artfx gen-config' to generate a documented artfx.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (defaults to ./artfx.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fixed seed for film grain, for reproducible output
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply an effect to a single image
    Apply {
        /// Input image
        #[arg(short, long)]
        input: PathBuf,
        /// Output image; the extension picks the format
        #[arg(short, long)]
        output: PathBuf,
        /// Effect to apply
        #[arg(short, long, value_enum)]
        effect: Effect,
    },
    /// Apply an effect to every image in a directory
    Batch {
        /// Directory to read images from (not recursive)
        #[arg(long)]
        input_dir: PathBuf,
        /// Directory to write results to (created if missing)
        #[arg(long)]
        output_dir: PathBuf,
        /// Effect to apply
        #[arg(short, long, value_enum)]
        effect: Effect,
    },
    /// List the available effects and their stages
    List,
    /// Print a stock artfx.toml with all options documented
    GenConfig,
}

/// Command-line names of the built-in effects.
#[derive(Clone, Copy, ValueEnum)]
enum Effect {
    Vintage,
    Watercolor,
    Oil,
    Sketch,
    Enhance,
}

impl From<Effect> for FilterKind {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::Vintage => FilterKind::Vintage,
            Effect::Watercolor => FilterKind::Watercolor,
            Effect::Oil => FilterKind::Oil,
            Effect::Sketch => FilterKind::Sketch,
            Effect::Enhance => FilterKind::Enhance,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Apply {
            input,
            output: output_path,
            effect,
        } => {
            let effect = FilterKind::from(effect);
            let config = config::load_config(cli.config.as_deref(), &std::env::current_dir()?)?;
            let registry = FilterRegistry::builtin_with_grain_seed(cli.seed);
            let image = process::process_file(
                &registry,
                effect.name(),
                &input,
                &output_path,
                config.quality(),
            )?;
            output::print_apply_result(effect.name(), &image);
        }
        Command::Batch {
            input_dir,
            output_dir,
            effect,
        } => {
            let effect = FilterKind::from(effect);
            let config = config::load_config(cli.config.as_deref(), &std::env::current_dir()?)?;
            init_thread_pool(&config.processing);
            let registry = FilterRegistry::builtin_with_grain_seed(cli.seed);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::process_batch(
                &registry,
                effect.name(),
                &input_dir,
                &output_dir,
                config.quality(),
                Some(tx),
            );
            printer.join().ok();
            output::print_batch_summary(&result?);
        }
        Command::List => {
            output::print_filter_list();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` overrides `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the config can only constrain down.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
