/// Orbis Terminal - orbital showcase scene in the terminal
///
/// Controls:
///   - V: Cycle view (fixed, cockpit, free-fly)
///   - W/S, Up/Down: Fly forward / back
///   - A/D: Strafe
///   - J/L, Left/Right: Turn left / right
///   - I/K, PageUp/PageDown: Turn up / down
///   - Q/ESC: Quit
use std::fs::File;
use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::fmt::writer as tsfw;
use tracing_subscriber::EnvFilter;

use orbis_core::ViewMode;
use orbis_terminal::{Config, TerminalApp};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum View {
    Fixed,
    Cockpit,
    FreeFly,
}

impl From<View> for ViewMode {
    fn from(view: View) -> Self {
        match view {
            View::Fixed => Self::Fixed,
            View::Cockpit => Self::Cockpit,
            View::FreeFly => Self::FreeFly,
        }
    }
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The TOML config file to load
    ///
    /// Without one, the showcase scene runs with default settings.
    config: Option<PathBuf>,
    /// The log file to write to
    ///
    /// Logs go to stderr otherwise. Verbosity is controlled with RUST_LOG.
    #[arg(short, long)]
    log_file: Option<PathBuf>,
    /// Initial view, overriding the config file
    #[arg(short, long)]
    view: Option<View>,
}

/// Log sink: the log file if one was opened, stderr otherwise
struct Writer(Option<File>);
impl<'a> tsfw::MakeWriter<'a> for Writer {
    type Writer = tsfw::EitherWriter<&'a File, std::io::Stderr>;

    fn make_writer(&'a self) -> Self::Writer {
        match &self.0 {
            Some(file) => tsfw::EitherWriter::A(file),
            None => tsfw::EitherWriter::B(std::io::stderr()),
        }
    }
}

fn main() {
    let args = Cli::parse();

    let log_file = args.log_file.as_ref().map(|path| {
        File::options()
            .append(true)
            .create(true)
            .open(path)
            .unwrap_or_else(|err| {
                eprintln!("failed to open log file at {}: {err}", path.display());
                exit(2);
            })
    });
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_ansi(log_file.is_none())
        .with_writer(Writer(log_file))
        .init();

    let mut config = match &args.config {
        Some(path) => match Config::load(path) {
            Ok(config) => config,
            Err(err) => {
                error!(%err, "failed to load config file");
                eprintln!("{err}");
                exit(3);
            }
        },
        None => {
            info!("no config file given, using defaults");
            Config::default()
        }
    };
    if let Some(view) = args.view {
        config.camera.view = view.into();
    }

    let result = TerminalApp::new(&config).and_then(|mut app| app.run());
    if let Err(err) = result {
        error!(%err, "terminal host failed");
        eprintln!("{err}");
        exit(1);
    }
}
