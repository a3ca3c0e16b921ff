//! CLI entry point for `sparkpayload`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};

use sparkpayload::config::{self, Config};
use sparkpayload::{build_payload, loader, parser, Message};

#[derive(Parser)]
#[command(
    name = "sparkpayload",
    version,
    about = "Build SparkPost transmission payloads from email messages"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Write the payload to FILE instead of stdout
    #[arg(short, long, global = true, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print single-line JSON
    #[arg(long, global = true)]
    compact: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a payload from a TOML or JSON message file
    Build { path: PathBuf },
    /// Build a payload from a raw .eml message
    Eml {
        path: PathBuf,
        /// Treat the message as plain (no send options)
        #[arg(long)]
        plain: bool,
        /// Campaign id for the transmission
        #[arg(long, value_name = "ID", conflicts_with = "plain")]
        campaign: Option<String>,
    },
    /// Show the config file location, or write a default one
    Config {
        #[arg(long)]
        init: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let pretty = config.output.pretty && !cli.compact;
    let output = cli.output.as_deref();

    match cli.command {
        Commands::Build { path } => cmd_build(&path, &config, pretty, output),
        Commands::Eml {
            path,
            plain,
            campaign,
        } => cmd_eml(&path, plain, campaign, &config, pretty, output),
        Commands::Config { init } => cmd_config(init),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_path = config::log_file_path(config);
    let log_dir = config::cache_dir(config);
    let log_name = log_path.file_name().unwrap_or_default();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, log_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Build from a message description file.
fn cmd_build(
    path: &Path,
    config: &Config,
    pretty: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let message = loader::load_message(path)
        .with_context(|| format!("Failed to load message from {}", path.display()))?;
    emit(apply_defaults(message, config), pretty, output)
}

/// Build from a raw RFC 5322 message.
fn cmd_eml(
    path: &Path,
    plain: bool,
    campaign: Option<String>,
    config: &Config,
    pretty: bool,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let mut message = parser::eml::load_eml(path)
        .with_context(|| format!("Failed to read EML from {}", path.display()))?;
    if !plain {
        message = message.into_extended();
    }
    if let Some(campaign) = campaign {
        message = message.with_campaign_id(campaign);
    }
    emit(apply_defaults(message, config), pretty, output)
}

fn apply_defaults(message: Message, config: &Config) -> Message {
    match &config.defaults.from {
        Some(from) => message.or_from(from.as_str()),
        None => message,
    }
}

/// Build the payload and write it out.
fn emit(message: Message, pretty: bool, output: Option<&Path>) -> anyhow::Result<()> {
    let payload = build_payload(&message).context("Cannot build payload")?;
    let json = payload.to_json(pretty)?;

    match output {
        Some(path) => {
            std::fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                recipients = payload.recipients.len(),
                "Wrote payload"
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}

/// Print the config location, or write the default config there.
fn cmd_config(init: bool) -> anyhow::Result<()> {
    let path = config::config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;

    if init {
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }
        config::save_config(&Config::default())?;
        println!("Wrote default config to {}", path.display());
    } else {
        println!("{}", path.display());
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "sparkpayload", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::stdout().write_all(&buf)?;
    Ok(())
}
