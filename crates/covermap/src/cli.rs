use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use covermap::overlay::{Overlay, OverlayState};
use covermap::theme::Theme;
use covermap::zone::ZoneModel;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "covermap")]
#[command(author, version, about)]
#[command(long_about = "Virtual guard store coverage map.\n\n\
    Shows the store floor with camera fields of view, active alerts,\n\
    guard patrol routes and checkout queues as toggleable overlays.\n\n\
    Examples:\n  \
    covermap                          Open the built-in store layout\n  \
    covermap store.yaml --watch       Open a zone file and reload on change\n  \
    covermap --show queues --hide fov Start with custom overlays\n  \
    covermap export -o map.svg        Render the map to SVG\n  \
    covermap zones dump > store.yaml  Start a zone file from the default layout")]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Zone file (YAML) to show instead of the built-in layout
    pub zones: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Start with the map covering the whole window
    #[arg(long, global = false)]
    pub fullscreen_map: bool,

    /// Reload the zone file when it changes on disk
    #[arg(long, global = false)]
    pub watch: bool,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Overlay and theme overrides shared by the viewer and `export`.
#[derive(Args, Debug, Clone, Default)]
pub struct ViewArgs {
    /// Overlay to show on top of the configured defaults (repeatable)
    #[arg(long, value_enum, value_name = "OVERLAY")]
    pub show: Vec<Overlay>,

    /// Overlay to hide (repeatable, applied after --show)
    #[arg(long, value_enum, value_name = "OVERLAY")]
    pub hide: Vec<Overlay>,

    /// Color theme
    #[arg(long, value_enum)]
    pub theme: Option<ThemeChoice>,
}

impl ViewArgs {
    /// Config defaults with the command line applied on top.
    pub fn overlays(&self, config: &Config) -> OverlayState {
        let mut state = config.overlays();
        for overlay in &self.show {
            state.set(*overlay, true);
        }
        for overlay in &self.hide {
            state.set(*overlay, false);
        }
        state
    }

    pub fn theme(&self, config: &Config) -> Theme {
        match self.theme {
            Some(choice) => Theme::from_name(choice.name()),
            None => Theme::from_name(config.theme()),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render the map to an SVG or PNG file
    Export {
        /// Zone file (YAML); the built-in layout is used when omitted
        zones: Option<PathBuf>,

        /// Output file
        #[arg(short, long, default_value = "coverage-map.svg")]
        output: PathBuf,

        /// Output format (guessed from the output extension when omitted)
        #[arg(long, value_enum)]
        format: Option<ExportFormat>,

        /// Export width in pixels
        #[arg(long, default_value = "1000")]
        width: u32,

        /// Export height in pixels
        #[arg(long, default_value = "600")]
        height: u32,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Inspect and validate zone files
    Zones {
        #[command(subcommand)]
        command: ZonesCommands,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ZonesCommands {
    /// Print the built-in store layout as a zone file
    Dump,

    /// Load and validate a zone file, then print what it contains
    Check {
        /// Zone file (YAML)
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. defaults.theme, defaults.overlays, defaults.zones)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ThemeChoice {
    Dark,
    Light,
}

impl ThemeChoice {
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    /// Format implied by a file extension, if any.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(Self::Svg),
            "png" => Some(Self::Png),
            _ => None,
        }
    }
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Zone model from an explicit file, then the configured file, then the
/// built-in layout.
pub fn resolve_zones(file: Option<&Path>, config: &Config) -> anyhow::Result<ZoneModel> {
    match file.or_else(|| config.zones()) {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("File not found: {}", path.display());
            }
            ZoneModel::load_from(path)
        }
        None => Ok(ZoneModel::default_layout()),
    }
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Export {
                zones,
                output,
                format,
                width,
                height,
                view,
            }) => {
                let format = format
                    .or_else(|| ExportFormat::from_path(&output))
                    .unwrap_or(ExportFormat::Svg);
                crate::commands::export::run(crate::commands::export::ExportRequest {
                    zones,
                    output,
                    format,
                    width,
                    height,
                    view,
                    quiet: self.quiet,
                })
            }
            Some(Commands::Zones { command }) => crate::commands::zones::run(command),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("covermap {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => {
                crate::app::run(crate::app::LaunchOptions {
                    zones: self.zones,
                    windowed: self.windowed,
                    fullscreen_map: self.fullscreen_map,
                    watch: self.watch,
                    view: self.view,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_viewer_flags() {
        let cli = Cli::try_parse_from([
            "covermap",
            "store.yaml",
            "--show",
            "queues",
            "--hide",
            "fov",
            "--theme",
            "light",
            "--watch",
        ])
        .unwrap();
        assert_eq!(cli.zones, Some(PathBuf::from("store.yaml")));
        assert!(cli.watch);
        assert_eq!(cli.view.show, vec![Overlay::Queues]);
        assert_eq!(cli.view.hide, vec![Overlay::Fov]);
        assert_eq!(cli.view.theme, Some(ThemeChoice::Light));
    }

    #[test]
    fn test_overlay_aliases() {
        let cli = Cli::try_parse_from(["covermap", "--show", "queue", "--hide", "patrol"]).unwrap();
        assert_eq!(cli.view.show, vec![Overlay::Queues]);
        assert_eq!(cli.view.hide, vec![Overlay::Patrols]);
    }

    #[test]
    fn test_unknown_overlay_rejected() {
        assert!(Cli::try_parse_from(["covermap", "--show", "heatmap"]).is_err());
    }

    #[test]
    fn test_view_args_apply_over_config() {
        let mut config = Config::default();
        config.set("defaults.overlays", "fov").unwrap();
        config.set("defaults.theme", "light").unwrap();

        let view = ViewArgs {
            show: vec![Overlay::Queues],
            hide: vec![Overlay::Fov],
            theme: None,
        };
        let overlays = view.overlays(&config);
        assert_eq!(overlays.visible(), vec![Overlay::Queues]);
        assert_eq!(view.theme(&config).name, "light");

        let view = ViewArgs {
            theme: Some(ThemeChoice::Dark),
            ..Default::default()
        };
        assert_eq!(view.theme(&config).name, "dark");
    }

    #[test]
    fn test_hide_wins_over_show() {
        let view = ViewArgs {
            show: vec![Overlay::Alerts],
            hide: vec![Overlay::Alerts],
            theme: None,
        };
        assert!(!view.overlays(&Config::default()).is_visible(Overlay::Alerts));
    }

    #[test]
    fn test_parse_export() {
        let cli = Cli::try_parse_from([
            "covermap", "export", "-o", "out.png", "--width", "1920", "--hide", "alerts",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Export {
                output,
                format,
                width,
                height,
                view,
                ..
            }) => {
                assert_eq!(output, PathBuf::from("out.png"));
                assert_eq!(format, None);
                assert_eq!(width, 1920);
                assert_eq!(height, 600);
                assert_eq!(view.hide, vec![Overlay::Alerts]);
            }
            _ => panic!("expected export"),
        }
    }

    #[test]
    fn test_export_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("a.SVG")), Some(ExportFormat::Svg));
        assert_eq!(ExportFormat::from_path(Path::new("a.png")), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_path(Path::new("a.pdf")), None);
        assert_eq!(ExportFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_resolve_zones_prefers_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.yaml");
        let mut model = ZoneModel::default_layout();
        model.cameras.truncate(2);
        std::fs::write(&path, model.to_yaml().unwrap()).unwrap();

        let loaded = resolve_zones(Some(&path), &Config::default()).unwrap();
        assert_eq!(loaded.cameras.len(), 2);

        let fallback = resolve_zones(None, &Config::default()).unwrap();
        assert_eq!(fallback.cameras.len(), 4);
    }

    #[test]
    fn test_resolve_zones_uses_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configured.yaml");
        let mut model = ZoneModel::default_layout();
        model.alerts.clear();
        std::fs::write(&path, model.to_yaml().unwrap()).unwrap();

        let mut config = Config::default();
        config
            .set("defaults.zones", path.to_str().unwrap())
            .unwrap();
        let loaded = resolve_zones(None, &config).unwrap();
        assert!(loaded.alerts.is_empty());
    }

    #[test]
    fn test_resolve_zones_missing_file() {
        let err = resolve_zones(Some(Path::new("/nonexistent/zones.yaml")), &Config::default())
            .unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
