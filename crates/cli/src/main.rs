//! cspress CLI - Content spec client for the document server

mod config;
mod logging;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use cspress_core::application::commands::PushOutcome;
use cspress_core::application::{CommandContext, CommandFrame, ContentSpecService};
use cspress_core::domain::{cancellation_channel, CancellationSource, DocumentId, ExitStatus};
use cspress_core::{AppError, VERSION};
use cspress_infra_rest::RestDocumentServer;
use cspress_infra_system::{Console, ConsoleStream, LocalWorkspaceFs, ProcessSupervisor};

use crate::config::Settings;

#[derive(Parser)]
#[command(name = "cspress")]
#[command(about = "Content spec client for the document server", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Document server URL (overrides configuration)
    #[arg(long, global = true)]
    server: Option<String>,

    /// Configuration file (default: per-user config directory)
    #[arg(long, global = true, env = "CSPRESS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a content spec
    Pull {
        /// Content spec ID
        id: DocumentId,

        /// Output file (default: <id>-post.contentspec)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload local changes to the server
    Push {
        file: PathBuf,
    },

    /// Create a new content spec on the server
    Create {
        file: PathBuf,
    },

    /// Compare a local content spec with the server copy
    Status {
        file: PathBuf,
    },

    /// Check the metadata of a local content spec
    Validate {
        file: PathBuf,
    },

    /// Show server information for a content spec
    Info {
        /// Content spec ID
        id: DocumentId,
    },

    /// Lay out the bundle directory and run the builder
    Assemble {
        file: PathBuf,

        /// Only lay out the bundle directory
        #[arg(long)]
        no_build: bool,
    },

    /// Open the built bundle
    Preview {
        file: PathBuf,
    },

    /// Edit a content spec, then validate it
    Edit {
        file: PathBuf,
    },

    /// Print the checksum of a content spec
    Checksum {
        file: PathBuf,

        /// Re-stamp the file's CHECKSUM header
        #[arg(long)]
        write: bool,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Pull { .. } => "pull",
            Commands::Push { .. } => "push",
            Commands::Create { .. } => "create",
            Commands::Status { .. } => "status",
            Commands::Validate { .. } => "validate",
            Commands::Info { .. } => "info",
            Commands::Assemble { .. } => "assemble",
            Commands::Preview { .. } => "preview",
            Commands::Edit { .. } => "edit",
            Commands::Checksum { .. } => "checksum",
        }
    }
}

#[tokio::main]
async fn main() {
    // Parse errors exit with clap's code 2 (ArgumentError)
    let cli = Cli::parse();
    let status = run(cli).await;
    std::process::exit(status.code());
}

async fn run(cli: Cli) -> ExitStatus {
    // 1. Load configuration
    let mut settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            return ExitStatus::ConfigError;
        }
    };
    if let Some(server) = cli.server {
        settings.server_url = server;
    }

    // 2. Initialize logging
    logging::init_logging(&settings.log_level);
    info!(version = VERSION, command = cli.command.name(), "cspress starting");

    // 3. Setup dependencies (DI wiring)
    let server = match RestDocumentServer::new(&settings.server_url, settings.request_timeout()) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            return ExitStatus::ConfigError;
        }
    };

    let console = Console::stdio();
    let ctx = CommandContext {
        server: Arc::new(server),
        fs: Arc::new(LocalWorkspaceFs::new()),
        runner: Arc::new(ProcessSupervisor::new(console.clone())),
        settings: settings.tool_settings(),
    };
    let service = ContentSpecService::new(ctx);

    // 4. Interrupts cancel the command scope
    let (source, token) = cancellation_channel();
    tokio::spawn(watch_interrupts(source));

    let frame = CommandFrame::new(cli.command.name(), token);
    let output = Output { console };

    match dispatch(&service, &frame, cli.command, &output).await {
        Ok(status) => status,
        Err(e) => {
            output.error(&e.to_string());
            e.exit_status()
        }
    }
}

/// First interrupt requests a clean shutdown; a second one exits at once
async fn watch_interrupts(source: CancellationSource) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    if source.cancel() {
        warn!("Interrupt received, shutting down (press Ctrl+C again to exit immediately)");
    }

    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Second interrupt received, exiting");
        std::process::exit(ExitStatus::ShutdownRequested.code());
    }
}

async fn dispatch(
    service: &ContentSpecService,
    frame: &CommandFrame,
    command: Commands,
    output: &Output,
) -> Result<ExitStatus, AppError> {
    match command {
        Commands::Pull { id, output: path } => {
            let outcome = service.pull(frame, id, path).await?;
            output.success(&format!(
                "Pulled content spec {} to {}",
                outcome.id,
                outcome.path.display()
            ));
            if outcome.checksum.is_none() {
                output.warning("The server copy carries no CHECKSUM header");
            }
        }

        Commands::Push { file } => match service.push(frame, &file).await? {
            PushOutcome::Unchanged { id } => {
                output.info(&format!("Content spec {} is up to date; nothing to push", id));
            }
            PushOutcome::Pushed { id, path, checksum } => {
                output.success(&format!("Pushed content spec {} from {}", id, path.display()));
                if let Some(checksum) = checksum {
                    output.field("Checksum", &checksum);
                }
            }
        },

        Commands::Create { file } => {
            let outcome = service.create(frame, &file).await?;
            match outcome.id {
                Some(id) => output.success(&format!(
                    "Created content spec {} from {}",
                    id,
                    outcome.path.display()
                )),
                None => output.success(&format!(
                    "Created content spec from {}",
                    outcome.path.display()
                )),
            }
        }

        Commands::Status { file } => {
            let reconciliation = service.status(frame, &file).await?;
            output.field("ID", &reconciliation.id.to_string());
            output.field("State", &reconciliation.state.to_string());
            if reconciliation.state.is_up_to_date() {
                output.success(reconciliation.state.message());
            } else {
                output.warning(reconciliation.state.message());
                return Ok(ExitStatus::OutOfDate);
            }
        }

        Commands::Validate { file } => {
            let metadata = service.validate(frame, &file).await?;
            output.success(&format!(
                "{} is valid{}",
                file.display(),
                metadata
                    .title()
                    .map(|t| format!(" ({})", t))
                    .unwrap_or_default()
            ));
        }

        Commands::Info { id } => {
            let info = service.info(frame, id).await?;
            output.field("ID", &info.id.to_string());
            output.field("Title", info.title.as_deref().unwrap_or("-"));
            output.field(
                "Revision",
                &info
                    .revision
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
            if let Some(modified) = info.last_modified.as_deref() {
                output.field("Last Modified", modified);
            }
        }

        Commands::Assemble { file, no_build } => {
            let outcome = service.assemble(frame, &file, !no_build).await?;
            if outcome.built {
                output.success(&format!("Built bundle in {}", outcome.bundle_dir.display()));
            } else {
                output.success(&format!(
                    "Laid out bundle in {} (build skipped)",
                    outcome.bundle_dir.display()
                ));
            }
        }

        Commands::Preview { file } => {
            let bundle = service.preview(frame, &file).await?;
            output.info(&format!("Previewed {}", bundle.display()));
        }

        Commands::Edit { file } => {
            service.edit(frame, &file).await?;
            output.success(&format!("{} is valid", file.display()));
        }

        Commands::Checksum { file, write } => {
            let outcome = service.checksum(frame, &file, write).await?;
            output.plain(&outcome.computed);
            if outcome.rewritten {
                output.success(&format!("Updated CHECKSUM header in {}", file.display()));
            } else if outcome.header.is_some() && !outcome.matches_header() {
                output.warning("CHECKSUM header does not match the content");
            }
        }
    }

    Ok(ExitStatus::Success)
}

/// Operator-facing output; shares the console lock with child relays
struct Output {
    console: Console,
}

impl Output {
    fn plain(&self, line: &str) {
        self.console.println(ConsoleStream::Stdout, line);
    }

    fn success(&self, message: &str) {
        self.plain(&format!("{} {}", "✓".green(), message.green().bold()));
    }

    fn info(&self, message: &str) {
        self.plain(&format!("{} {}", "•".bold(), message));
    }

    fn field(&self, label: &str, value: &str) {
        self.plain(&format!("  {} {}", format!("{}:", label).bold(), value));
    }

    fn warning(&self, message: &str) {
        self.console
            .println(ConsoleStream::Stderr, &format!("{} {}", "!".yellow(), message.yellow()));
    }

    fn error(&self, message: &str) {
        self.console
            .println(ConsoleStream::Stderr, &format!("{} {}", "✗".red().bold(), message.red()));
    }
}
