use clap::Parser;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use elimufund_core::adapters::InMemoryStore;
use elimufund_core::cli::{self, Cli, Commands, DbCommands, ServeArgs};
use elimufund_core::config::{Config, LogFormat};
use elimufund_core::{create_app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Setup logging
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }

    let cli = Cli::parse();
    match cli.command {
        None => serve(config, ServeArgs::default()).await,
        Some(Commands::Serve(args)) => serve(config, args).await,
        Some(Commands::Db(DbCommands::Migrate)) => cli::handle_db_migrate(&config).await,
        Some(Commands::Db(DbCommands::Seed)) => cli::handle_db_seed(&config).await,
        Some(Commands::Config) => cli::handle_config_validate(&config),
    }
}

async fn serve(config: Config, args: ServeArgs) -> anyhow::Result<()> {
    let port = config.server_port;

    let state = if args.in_memory {
        let store = InMemoryStore::new();
        if args.seed {
            db::seed::seed(&store, &store).await?;
        }
        tracing::info!("Using in-memory store");
        AppState::in_memory(store, config)
    } else {
        let pool = db::create_pool(&config).await?;
        db::run_migrations(&pool).await?;
        if args.seed {
            let repos = elimufund_core::Repositories::postgres(pool.clone());
            db::seed::seed(repos.campaigns.as_ref(), repos.donations.as_ref()).await?;
        }
        AppState::postgres(pool, config)
    };

    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
