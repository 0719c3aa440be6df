// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};

use xliffbridge::app_config::{self, Config};
use xliffbridge::app_controller::Controller;

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

/// Options shared by every processing command
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Split a rows file into one XLIFF document per target language
    Split {
        /// Rows file (JSON) exported from the workbook
        #[arg(value_name = "ROWS_FILE")]
        input_file: PathBuf,

        /// Target locale codes, overriding the configuration (e.g. fr_FR,no_NO)
        #[arg(short, long, value_delimiter = ',')]
        target_languages: Option<Vec<String>>,

        /// Source language tag written into document headers
        #[arg(short, long)]
        source_language: Option<String>,

        /// Split long cells into sentence segments
        #[arg(long)]
        segment: bool,

        /// Root folder for generated documents
        #[arg(short, long)]
        output_dir: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Merge returned XLIFF documents back into per-language cell values
    Merge {
        /// Folder containing translation_*.xlf files
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        /// Folder for the merged JSON files (defaults to the input folder)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate shell completions for xliffbridge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// xliffbridge - spreadsheet <-> XLIFF round-tripping
///
/// Splits a multilingual workbook export into bilingual XLIFF 1.2 documents
/// and merges translated documents back, keeping bold/red emphasis.
#[derive(Parser, Debug)]
#[command(name = "xliffbridge")]
#[command(version)]
#[command(about = "Spreadsheet to XLIFF localization bridge")]
#[command(long_about = "xliffbridge turns a workbook export into XLIFF 1.2 documents and merges them back.

EXAMPLES:
    xliffbridge split rows.json                      # One document per configured language
    xliffbridge split -t fr_FR,no_NO rows.json       # Only French and Norwegian
    xliffbridge split --segment rows.json            # Split long cells into sentences
    xliffbridge merge output/rows_20250101_120000/   # Merge returned documents
    xliffbridge completions bash > xliffbridge.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
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
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                color, now, record.level(), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger with the most verbose filter; the effective
    // level is applied through set_max_level once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "xliffbridge", &mut std::io::stdout());
            Ok(())
        }
        Commands::Split {
            input_file,
            target_languages,
            source_language,
            segment,
            output_dir,
            common,
        } => {
            let mut config = load_config(&common)?;

            // Override config with CLI options if provided
            if let Some(languages) = target_languages {
                config.target_languages = languages;
            }
            if let Some(source_language) = source_language {
                config.source_language = source_language;
            }
            if segment {
                config.segmentation.enabled = true;
            }
            if let Some(output_dir) = output_dir {
                config.output_dir = output_dir;
            }
            config.validate().context("Configuration validation failed")?;

            let controller = Controller::with_config(config)?;
            let summary = controller.split_file(&input_file).await?;

            for document in &summary.documents {
                info!(
                    "{}: {} segment(s), {} with comments",
                    document.language_tag,
                    document.stats.total_segments,
                    document.stats.segments_with_comments
                );
            }
            for (code, reason) in &summary.failed {
                warn!("{}: {}", code, reason);
            }
            for (row, reason) in &summary.rejected_rows {
                warn!("Row {} left out: {}", row, reason);
            }
            info!("Success: {:?}", summary.output_folder);
            Ok(())
        }
        Commands::Merge {
            input_dir,
            output_dir,
            common,
        } => {
            let config = load_config(&common)?;
            config.validate().context("Configuration validation failed")?;

            let controller = Controller::with_config(config)?;
            let output_dir = output_dir.unwrap_or_else(|| input_dir.clone());
            let summary = controller.merge_folder(&input_dir, &output_dir)?;

            for (language, paths) in &summary.outputs {
                for path in paths {
                    info!("{}: {:?}", language, path);
                }
            }
            for (path, reason) in &summary.failed {
                warn!("{:?}: {}", path, reason);
            }
            Ok(())
        }
    }
}

/// Load the configuration file, creating a default one if it is missing,
/// and apply the effective log level
fn load_config(options: &CommonArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = &options.config_path;
    let mut config: Config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Update log level in config if specified via command line
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}
