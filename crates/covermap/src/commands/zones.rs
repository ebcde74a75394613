use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use covermap::zone::{ZoneModel, ZoneSummary};

use crate::cli::ZonesCommands;

pub fn run(command: ZonesCommands) -> Result<()> {
    match command {
        ZonesCommands::Dump => {
            print!("{}", ZoneModel::default_layout().to_yaml()?);
            Ok(())
        }
        ZonesCommands::Check { file } => check(&file),
    }
}

fn check(file: &Path) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }
    let model = ZoneModel::load_from(file)?;
    let summary = model.summary();

    println!("{} {}", "OK".green().bold(), file.display());
    for line in summary_lines(&summary) {
        println!("  {line}");
    }
    if !summary.patrol_closed && summary.patrol_waypoints > 1 {
        println!(
            "{}",
            "  note: patrol route does not return to its first waypoint".yellow()
        );
    }
    Ok(())
}

fn summary_lines(summary: &ZoneSummary) -> Vec<String> {
    vec![
        format!("{:<16} {}", "rooms", summary.rooms),
        format!("{:<16} {}", "aisles", summary.aisles),
        format!("{:<16} {}", "checkout lanes", summary.checkout_lanes),
        format!("{:<16} {}", "cameras", summary.cameras),
        format!(
            "{:<16} {} low, {} med, {} high",
            "alerts", summary.alerts_low, summary.alerts_med, summary.alerts_high
        ),
        format!("{:<16} {}", "patrol waypoints", summary.patrol_waypoints),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines_for_default_layout() {
        let lines = summary_lines(&ZoneModel::default_layout().summary());
        assert_eq!(lines.len(), 6);
        assert!(lines[1].ends_with("12"));
        assert!(lines[4].contains("1 low, 1 med, 1 high"));
        assert!(lines[5].ends_with("10"));
    }

    #[test]
    fn test_check_accepts_dumped_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.yaml");
        std::fs::write(&path, ZoneModel::default_layout().to_yaml().unwrap()).unwrap();
        check(&path).unwrap();
    }

    #[test]
    fn test_check_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "aisles:\n  - { x: 10, y: 10, width: -5, height: 20 }\n").unwrap();
        assert!(check(&path).is_err());
        assert!(check(&dir.path().join("missing.yaml")).is_err());
    }
}
