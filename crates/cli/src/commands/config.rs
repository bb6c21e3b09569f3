use eyre::Result;
use std::io::{self, Write};

use crate::cli::ConfigCommands;
use crate::config::Config;

pub async fn handle_config_command(cmd: ConfigCommands, dry_run: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Set { key, value } => handle_set_config(key, value, dry_run).await,
        ConfigCommands::Get { key } => handle_get_config(key, dry_run).await,
        ConfigCommands::Show => handle_show_config(dry_run).await,
        ConfigCommands::Reset { force } => handle_reset_config(force, dry_run).await,
    }
}

async fn handle_set_config(key: String, value: String, dry_run: bool) -> Result<()> {
    let mut config = load_config(dry_run).await?;

    // Validate even on a dry run so typos surface before the real run
    if let Err(e) = config.set_value(&key, &value) {
        println!("❌ Failed to set configuration: {}", e);
        return Err(e);
    }

    if dry_run {
        println!("Would set config: {} = {}", key, value);
        return Ok(());
    }

    config.save().await?;
    println!("✅ Configuration updated: {} = {}", key, value);
    Ok(())
}

async fn handle_get_config(key: String, dry_run: bool) -> Result<()> {
    let config = load_config(dry_run).await?;

    match config.get_value(&key) {
        Ok(value) if value.is_empty() => println!("{}: (not set)", key),
        Ok(value) => println!("{}: {}", key, value),
        Err(e) => {
            println!("❌ Failed to get configuration: {}", e);
            return Err(e);
        }
    }

    Ok(())
}

async fn handle_show_config(dry_run: bool) -> Result<()> {
    let config = load_config(dry_run).await?;
    println!("{}", config.show_all());
    Ok(())
}

async fn handle_reset_config(force: bool, dry_run: bool) -> Result<()> {
    if dry_run {
        println!(
            "Would reset configuration at {} to defaults",
            Config::get_config_path().display()
        );
        return Ok(());
    }

    if !force {
        print!("Reset all quire settings to their defaults? (y/N): ");
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().to_lowercase().starts_with('y') {
            println!("❌ Cancelled");
            return Ok(());
        }
    }

    let config = Config::reset().await?;
    println!("✅ Configuration reset to defaults");
    println!("  📁 Library: {}", config.library.path);
    Ok(())
}

/// A dry run must not create the config file as a side effect.
async fn load_config(dry_run: bool) -> Result<Config> {
    if dry_run {
        Config::read().await
    } else {
        Config::load().await
    }
}
