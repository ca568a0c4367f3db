mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use folio_config::Config;
use folio_storage::Storage;

use crate::cli::Commands;
use crate::commands::portfolio::{self, OwnerContext};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    // RUST_LOG wins over the configured filter
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Completions { shell } = cli.command {
        commands::completions::handle(shell);
        return Ok(());
    }
    if let Commands::Templates = cli.command {
        return portfolio::templates();
    }

    // Initialize storage once (creates connection pool and schema)
    let db_path = cli.db.clone().or_else(|| config.storage.database_path.clone());
    let storage = Storage::new(db_path)
        .await?
        .with_public_base_url(config.publish.base_url.clone());

    let ctx = OwnerContext {
        storage: &storage,
        owner: cli.owner.unwrap_or_else(|| config.cli.default_owner.clone()),
        history_limit: config.editor.history_limit,
    };

    match cli.command {
        Commands::Serve {
            host,
            port,
            read_only,
        } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let read_only = read_only || config.server.read_only;
            commands::serve::handle(&storage, host, port, read_only).await
        }
        Commands::Show => portfolio::show(&ctx).await,
        Commands::Versions => portfolio::versions(&ctx).await,
        Commands::Restore { version_id } => portfolio::restore(&ctx, version_id).await,
        Commands::Publish => portfolio::publish(&ctx).await,
        Commands::Import { file, label } => portfolio::import(&ctx, file, label).await,
        Commands::Export { file } => portfolio::export(&ctx, file).await,
        Commands::Edit {
            file,
            label,
            dry_run,
        } => portfolio::edit(&ctx, file, label, dry_run).await,
        Commands::AddSection { kind, name, label } => {
            portfolio::add_section(&ctx, kind, name, label).await
        }
        Commands::Templates | Commands::Completions { .. } => Ok(()),
    }
}
