use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use pastefx::{
    config::{Config, FILES_ENV},
    io::{
        parse_file_list, EnvTextSource, FsReferenceLoader, LogNotifier, Notifier, OsascriptNotifier, SystemClipboard,
        SystemFontLoader,
    },
    pipeline::{CompositingPipeline, TransformKind, TransformResources},
    runner::{self, ClipboardPorts},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Source {
    /// Read from and write back to the clipboard
    Clipboard,
    /// Process the tab-separated paths in the `files` environment variable
    File,
}

#[derive(Parser)]
#[command(
    name = "pastefx",
    version,
    about = "Screenshot filters for the clipboard and image files",
    long_about = "PasteFx applies one filter (beautify, torn_edge, whitebg, pad_text) to the image on the clipboard, or to every file listed in the `files` environment variable. Animated GIFs keep their animation."
)]
struct Cli {
    /// Filter to apply
    #[arg(value_enum)]
    action: TransformKind,

    /// Where the input comes from
    #[arg(value_enum)]
    source: Source,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Log notifications instead of showing them on the desktop
    #[arg(long)]
    no_notify: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting PasteFx v{}", env!("CARGO_PKG_VERSION"));
    info!("Action: {}", cli.action);
    info!("Source: {:?}", cli.source);

    // Load configuration
    if let Some(path) = &cli.config {
        info!("Loading configuration from {:?}", path);
    }
    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;

    let text = EnvTextSource::default();
    let resources = TransformResources {
        references: &FsReferenceLoader,
        text: &text,
        fonts: &SystemFontLoader,
    };

    match cli.source {
        Source::Clipboard => {
            let notifier: Box<dyn Notifier> = if cli.no_notify {
                Box::new(LogNotifier)
            } else {
                Box::new(OsascriptNotifier)
            };
            let ports = ClipboardPorts {
                source: &SystemClipboard,
                sink: &SystemClipboard,
                notifier: notifier.as_ref(),
            };
            let title = config.workflow_name(cli.action).to_string();
            runner::run_clipboard(&ports, &title, || {
                CompositingPipeline::from_config(cli.action, &config, &resources)
            })?;
            info!("Clipboard updated");
        }
        Source::File => {
            let raw = std::env::var(FILES_ENV)
                .with_context(|| format!("environment variable `{}` is not set", FILES_ENV))?;
            let paths = parse_file_list(&raw);
            debug!("File paths: {:?}", paths);
            if paths.is_empty() {
                bail!("`{}` lists no files", FILES_ENV);
            }

            let pipeline = CompositingPipeline::from_config(cli.action, &config, &resources)?;
            let report = runner::run_files(&paths, &pipeline, cli.action, &config);
            for output in &report.written {
                println!("{}", output.display());
            }
            if !report.is_success() {
                let failures: Vec<String> = report
                    .failed
                    .iter()
                    .map(|(path, e)| format!("{}: {}", path.display(), e))
                    .collect();
                bail!("{}\n{}", report.summary(), failures.join("\n"));
            }
        }
    }

    Ok(())
}
