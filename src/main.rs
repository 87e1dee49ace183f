// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use xmlpack::app_config::{self, Config};
use xmlpack::app_controller::Controller;
use xmlpack::file_utils::FileManager;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Unpack tagged XML file(s) into indexed text
    Unpack {
        /// XML files or directories containing them
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory for unpacked text file(s)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Partition output files by character limit
        #[arg(short, long)]
        partition: bool,

        /// Create an empty `_translate` file per partition in the configured repack input directory
        #[arg(long)]
        placeholders: bool,

        /// Directory receiving the placeholder files (implies --placeholders)
        #[arg(long)]
        placeholder_dir: Option<PathBuf>,
    },

    /// Write translated text back into its XML file
    Repack {
        /// Original XML file
        #[arg(short, long)]
        base: PathBuf,

        /// Translated text file, or every partition of it
        #[arg(short, long, required = true, num_args = 1..)]
        translated: Vec<PathBuf>,

        /// Output directory for reconstructed XML file(s)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Repair broken line indices of edited text against untouched originals
    Align {
        /// Edited (translated) text files or directories
        #[arg(short, long, required = true, num_args = 1..)]
        base: Vec<PathBuf>,

        /// Untouched unpacker output files or directories
        #[arg(short, long, required = true, num_args = 1..)]
        anchor: Vec<PathBuf>,

        /// Output directory for aligned text file(s)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions for xmlpack
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// xmlpack - unpack, repack and align translatable text in tagged XML scripts
#[derive(Parser, Debug)]
#[command(name = "xmlpack")]
#[command(version)]
#[command(about = "Round-trip translatable text out of and back into tagged XML files")]
#[command(long_about = "xmlpack extracts the text between <text> markers of XML script files into
line-indexed plain text, and writes translated text back at the exact original positions.

EXAMPLES:
    xmlpack unpack scripts/                               # Unpack every XML file in a directory
    xmlpack unpack -p --placeholders a.xml               # Partition output, create placeholders
    xmlpack repack -b a.xml -t a_translate.txt            # Reinsert translated text
    xmlpack align -b edited/ -a output-unpack/            # Repair damaged line indices
    xmlpack completions bash > xmlpack.bash               # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and emoji for log level
    fn decoration_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌"),
            Level::Warn => ("\x1B[1;33m", "🚧"),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍"),
            Level::Trace => ("\x1B[1;35m", "📋"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, emoji) = Self::decoration_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                colour, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through log::set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "xmlpack", &mut std::io::stdout());
        }
        Commands::Unpack {
            inputs,
            output,
            partition,
            placeholders,
            placeholder_dir,
        } => {
            for input in &inputs {
                if input.is_file() && !FileManager::has_extension(input, "xml") {
                    return Err(anyhow!("File: {:?} is not a valid XML file", input));
                }
            }
            let mut config = load_config(&cli.config_path, cli.log_level)?;
            if partition {
                config.packing.partition = true;
            }
            let output = output.unwrap_or_else(|| config.directories.unpack_output.clone());
            let placeholder_dir = placeholder_dir
                .or_else(|| placeholders.then(|| config.directories.repack_input.clone()));

            let controller = Controller::with_config(config)?;
            let written = controller
                .run_unpack(&inputs, &output, placeholder_dir.as_deref())?
                .into_result()?;
            info!("Success: {} file(s) written to {:?}", written.len(), output);
        }
        Commands::Repack { base, translated, output } => {
            if !FileManager::has_extension(&base, "xml") {
                return Err(anyhow!("File: {:?} is not a valid XML file", base));
            }
            if let Some(bad) = translated.iter().find(|t| !FileManager::has_extension(t, "txt")) {
                return Err(anyhow!("File: {:?} is not a valid TXT file", bad));
            }
            let config = load_config(&cli.config_path, cli.log_level)?;
            let output = output.unwrap_or_else(|| config.directories.repack_output.clone());

            let controller = Controller::with_config(config)?;
            let written = controller.run_repack(&base, &translated, &output)?;
            info!("Success: {:?}", written);
        }
        Commands::Align { base, anchor, output } => {
            let config = load_config(&cli.config_path, cli.log_level)?;
            let output = output.unwrap_or_else(|| config.directories.align_output.clone());

            let controller = Controller::with_config(config)?;
            let written = controller.run_align(&base, &anchor, &output)?.into_result()?;
            info!("Success: {} file(s) aligned into {:?}", written.len(), output);
        }
    }

    Ok(())
}

// Load the config file and apply the command line log level on top of it
fn load_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = Config::load_or_create(config_path)?;
    if let Some(log_level) = log_level {
        config.log_level = log_level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());
    Ok(config)
}
