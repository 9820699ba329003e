use clap::{Args, Parser, Subcommand};

use crate::adapters::{PostgresCampaignRepository, PostgresDonationRepository};
use crate::config::{mask_password, Config};

#[derive(Parser)]
#[command(name = "elimufund")]
#[command(about = "ElimuFund - student fee crowdfunding backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve(ServeArgs),

    /// Database management commands
    #[command(subcommand)]
    Db(DbCommands),

    /// Configuration validation
    Config,
}

#[derive(Args, Debug, Default, Clone, Copy)]
pub struct ServeArgs {
    /// Keep all data in process memory instead of PostgreSQL
    #[arg(long)]
    pub in_memory: bool,

    /// Insert sample campaigns before serving
    #[arg(long)]
    pub seed: bool,
}

#[derive(Subcommand)]
pub enum DbCommands {
    /// Run database migrations
    Migrate,

    /// Insert sample campaigns and donations
    Seed,
}

pub async fn handle_db_migrate(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;

    tracing::info!("Running database migrations...");
    crate::db::run_migrations(&pool).await?;

    println!("✓ Database migrations completed");
    Ok(())
}

pub async fn handle_db_seed(config: &Config) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(config).await?;
    crate::db::run_migrations(&pool).await?;

    let campaigns = PostgresCampaignRepository::new(pool.clone());
    let donations = PostgresDonationRepository::new(pool);
    let created = crate::db::seed::seed(&campaigns, &donations).await?;

    println!("✓ Seeded {} campaigns", created);
    Ok(())
}

pub fn handle_config_validate(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Validating configuration...");

    println!("Configuration:");
    println!("  Server Port: {}", config.server_port);
    match &config.database_url {
        Some(url) => println!("  Database URL: {}", mask_password(url)),
        None => println!("  Database URL: (not set, in-memory only)"),
    }
    println!("  Database Max Connections: {}", config.database_max_connections);
    println!("  CORS Allowed Origins: {}", config.cors_allowed_origins.join(", "));
    println!(
        "  Donation Cancel Window: {} hours",
        config.donation_cancel_window_hours
    );
    println!("  Log Request Body: {}", config.log_request_body);

    tracing::info!("Configuration is valid");
    println!("✓ Configuration is valid");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["elimufund"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from(["elimufund", "serve", "--in-memory", "--seed"]).unwrap();
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert!(args.in_memory);
                assert!(args.seed);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn parses_db_seed() {
        let cli = Cli::try_parse_from(["elimufund", "db", "seed"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Db(DbCommands::Seed))));
    }
}
