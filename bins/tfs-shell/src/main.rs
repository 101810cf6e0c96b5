use std::io::IsTerminal;
use std::process::ExitCode;

use clap::Parser;

use tfs_cli::connection::ShellOptions;
use tfs_cli::output::{OutputFormat, Printer};
use tfs_cli::repl;

/// TreeFS shell
///
/// Browse and edit a remote tree database with filesystem commands. Nodes are
/// fetched on first access and cached for the rest of the session.
#[derive(Parser, Debug)]
#[command(name = "tfs-shell", version, about)]
struct Cli {
    #[command(flatten)]
    options: ShellOptions,

    /// Output format (table or json).
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Enable verbose logging.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Run one command and exit.
    #[arg(short = 'c', long = "command")]
    command: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = cli.options.load_config()?;
    if cli.verbose {
        config.log = config.log.with_level("debug");
    }
    let _guard = tfs_logging::init_logging(&config.log)?;
    tracing::info!(host = %config.host, mode = %config.mode, "starting tfs-shell");

    let mut session = cli.options.connect(config).await?;
    let mut printer = Printer::stdout(cli.format);

    if let Some(line) = cli.command.as_deref() {
        let ok = repl::run_once(&mut session, line, &mut printer).await?;
        return Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE });
    }

    let interactive = std::io::stdin().is_terminal();
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    repl::run(&mut session, stdin, &mut printer, interactive).await?;
    Ok(ExitCode::SUCCESS)
}
