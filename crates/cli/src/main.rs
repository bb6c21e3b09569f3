use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::Result;
use quire_storage::{FilesystemStorage, ProjectStorage};
use tracing::debug;

mod cli;
mod commands;
mod config;

use cli::{Cli, Commands};
use commands::*;
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else if cli.quiet {
            tracing::Level::ERROR
        } else {
            tracing::Level::INFO
        })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = if cli.dry_run {
        Config::read().await?
    } else {
        Config::load().await?
    };

    let library_path = cli
        .library
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.library.path));
    debug!("Using library at {}", library_path.display());

    let filesystem = FilesystemStorage::new(&library_path)
        .with_max_manuscript_bytes(config.publish.max_manuscript_bytes);
    if !cli.dry_run {
        filesystem.initialize().await?;
    }
    let storage: Arc<dyn ProjectStorage> = Arc::new(filesystem);

    match cli.command {
        Commands::Publish {
            project,
            print,
            images,
            sample,
            generate_cover,
        } => {
            let options = config.publish_options(&print, &images, sample, generate_cover)?;
            handle_publish_command(project, options, storage, cli.dry_run).await
        }
        Commands::Unpublish { project } => {
            handle_unpublish_command(project, storage, cli.dry_run).await
        }
        Commands::Export {
            project,
            format,
            output,
            sample,
        } => {
            handle_export_command(project, format, output, sample, storage.as_ref(), cli.dry_run)
                .await
        }
        Commands::Chapters { file, preview } => handle_chapters_command(file, preview).await,
        Commands::Dimensions { pages, print } => handle_dimensions_command(
            pages,
            print.paper.unwrap_or(config.publish.paper),
            print.ink.unwrap_or(config.publish.ink),
        ),
        Commands::CoverProof {
            project,
            pages,
            print,
            images,
            generate_cover,
        } => {
            let options = config.publish_options(&print, &images, None, generate_cover)?;
            handle_cover_proof_command(project, pages, options, storage, cli.dry_run).await
        }
        Commands::List => handle_list_command(storage.as_ref()).await,
        Commands::Config { command } => handle_config_command(command, cli.dry_run).await,
    }
}
