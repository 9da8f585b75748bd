//! Draftwork - snapshot-versioned writing backend.
//!
//! This is the main entry point for the draftwork server CLI.

mod config;

use clap::{Parser, Subcommand};
use config::Config;
use draftwork_server::AppState;
use draftwork_snapshot::SnapshotStore;
use draftwork_util::{init_logging, LogConfig, LogLevel};
use draftwork_workspace::Workspace;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Seeded into an empty workspace so the first connection has something
/// to open.
const WELCOME_DOCUMENT: &str = "# Draftwork\n\n\
这是一个 **AI 驱动的文字创作** 后端。\n\n\
## 快速体验\n\n\
1. 选中一段文字，打开命令面板。\n\
2. 输入指令：例如“改得更口语化 / 扩写到 200 字 / 压缩一下”。\n\
3. 预览 diff，确认后应用。\n\n\
## 排版导出\n\n\
选择平台模式：公众号 / 知乎 / 小红书，实时预览导出 HTML。\n";

#[derive(Parser)]
#[command(name = "draftwork")]
#[command(author, version, about = "Snapshot-versioned writing backend", long_about = None)]
struct Cli {
    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1:8787")]
    address: SocketAddr,

    /// Data directory (overrides configuration)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (the default when no subcommand is given)
    Serve {
        /// Address to bind to
        #[arg(short, long, default_value = "127.0.0.1:8787")]
        address: SocketAddr,
    },
    /// Show the effective configuration
    Config,
    /// Print version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).await?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }

    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        config
            .log_level
            .as_deref()
            .and_then(LogLevel::parse)
            .unwrap_or_default()
    };
    init_logging(LogConfig {
        level,
        ..Default::default()
    });

    match cli.command {
        Some(Commands::Serve { address }) => serve(config, address).await,
        Some(Commands::Config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Some(Commands::Version) => {
            println!("draftwork {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => serve(config, cli.address).await,
    }
}

/// Start the HTTP server.
async fn serve(config: Config, address: SocketAddr) -> anyhow::Result<()> {
    let data_dir = config.data_dir()?;
    info!("Using data directory {}", data_dir.display());

    let store = Arc::new(SnapshotStore::new(data_dir.join("snapshots")).await?);
    let workspace = Arc::new(Workspace::new(data_dir.join("workspace"), store).await?);
    seed_welcome_document(&workspace).await?;

    let mut state = AppState::new(workspace, config.provider.clone());
    state.allowed_origins = config.allowed_origins.clone();
    if let Some(ceiling) = config.max_selection_chars {
        state.max_selection_chars = ceiling;
    }

    let app = draftwork_server::create_router(state);

    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Server listening on http://{}", address);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Seed a welcome document into an empty workspace, with a history entry
/// like any other write.
async fn seed_welcome_document(workspace: &Workspace) -> anyhow::Result<()> {
    if workspace.list_documents()?.is_empty() {
        workspace
            .write("welcome.md", WELCOME_DOCUMENT, "seed", "system")
            .await?;
        info!("Seeded welcome document");
    }
    Ok(())
}
