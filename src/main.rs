//! spx-project CLI
//!
//! Command-line interface for spx project archives.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use spx_project::cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("spx-project v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd, &cli.cache_dir).await,
        None => {
            println!("spx-project v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

async fn handle_command(cmd: Commands, cache_dir: &std::path::Path) -> anyhow::Result<()> {
    let result = match cmd {
        Commands::Inspect { archive } => commands::inspect(&archive).await,
        Commands::Pack { dir, output, name } => commands::pack(&dir, &output, name.as_deref()).await,
        Commands::Unpack { archive, output } => commands::unpack(&archive, &output).await,
        Commands::Zorder { archive, sprite, to } => commands::zorder(&archive, &sprite, to).await,
        Commands::RenameSprite { archive, from, to } => {
            commands::rename_sprite(&archive, &from, &to).await
        }
        Commands::CacheStore { archive, key } => commands::cache_store(cache_dir, &archive, &key).await,
        Commands::CacheRestore { key, output } => commands::cache_restore(cache_dir, &key, &output).await,
        Commands::CacheList => commands::cache_list(cache_dir),
    };

    if let Err(e) = &result {
        if let Some(hint) = e.recovery_suggestion() {
            eprintln!("hint: {}", hint);
        }
    }
    result.with_context(|| "command failed")
}
