use anyhow::Result;
use colored::Colorize;

use covermap::overlay::Overlay;

use crate::cli::ConfigCommands;
use crate::config::{Config, VALID_KEYS};

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let exists = path.exists();
    let config = Config::load_or_default();

    println!("{} {}", "Config file:".bold(), path.display());
    if !exists {
        println!("{}", "  (not created yet, showing defaults)".dimmed());
    }
    println!();

    let overlays = config.overlays();
    let overlay_list = Overlay::ALL
        .iter()
        .map(|o| {
            if overlays.is_visible(*o) {
                o.name().green().to_string()
            } else {
                o.name().dimmed().strikethrough().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    println!("  {:<26} {}", "defaults.theme", config.theme());
    println!("  {:<26} {}", "defaults.overlays", overlay_list);
    println!(
        "  {:<26} {}",
        "defaults.start_fullscreen",
        config.start_fullscreen()
    );
    println!(
        "  {:<26} {}",
        "defaults.zones",
        config
            .zones()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(built-in layout)".dimmed().to_string())
    );
    println!();
    println!("{} {VALID_KEYS}", "Keys:".dimmed());
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    tracing::info!(path = %path.display(), key, value, "config updated");
    println!("{} {key} = {value}", "Saved".green().bold());
    Ok(())
}
