use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four independently toggleable map layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overlay {
    /// Camera fields of view
    Fov,
    /// Active alert markers
    Alerts,
    /// Guard patrol route
    #[value(alias = "patrol")]
    #[serde(alias = "patrol")]
    Patrols,
    /// Checkout queue indicators
    #[value(alias = "queue")]
    #[serde(alias = "queue")]
    Queues,
}

impl Overlay {
    pub const ALL: [Overlay; 4] = [Self::Fov, Self::Alerts, Self::Patrols, Self::Queues];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Fov => "fov",
            Self::Alerts => "alerts",
            Self::Patrols => "patrols",
            Self::Queues => "queues",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Fov => "FOV",
            Self::Alerts => "Alerts",
            Self::Patrols => "Patrol",
            Self::Queues => "Queues",
        }
    }

    /// Number key that toggles this overlay in the viewer.
    pub fn shortcut(&self) -> char {
        match self {
            Self::Fov => '1',
            Self::Alerts => '2',
            Self::Patrols => '3',
            Self::Queues => '4',
        }
    }
}

impl fmt::Display for Overlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Overlay {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fov" => Ok(Self::Fov),
            "alerts" => Ok(Self::Alerts),
            "patrols" | "patrol" => Ok(Self::Patrols),
            "queues" | "queue" => Ok(Self::Queues),
            other => anyhow::bail!(
                "Unknown overlay: {other}. Valid overlays: fov, alerts, patrols, queues"
            ),
        }
    }
}

/// Visibility of each overlay. Flags are independent: changing one never
/// touches another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayState {
    fov: bool,
    alerts: bool,
    patrols: bool,
    queues: bool,
}

impl Default for OverlayState {
    fn default() -> Self {
        Self {
            fov: true,
            alerts: true,
            patrols: true,
            queues: false,
        }
    }
}

impl OverlayState {
    /// State with exactly the given overlays visible.
    pub fn from_visible(visible: &[Overlay]) -> Self {
        let mut state = Self {
            fov: false,
            alerts: false,
            patrols: false,
            queues: false,
        };
        for overlay in visible {
            state.set(*overlay, true);
        }
        state
    }

    /// Parse a list of overlay names, e.g. from config.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> anyhow::Result<Self> {
        let overlays = names
            .iter()
            .map(|n| n.as_ref().parse::<Overlay>())
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self::from_visible(&overlays))
    }

    pub fn is_visible(&self, overlay: Overlay) -> bool {
        *self.flag(overlay)
    }

    pub fn set(&mut self, overlay: Overlay, visible: bool) {
        *self.flag_mut(overlay) = visible;
    }

    pub fn toggle(&mut self, overlay: Overlay) {
        let flag = self.flag_mut(overlay);
        *flag = !*flag;
    }

    pub fn visible(&self) -> Vec<Overlay> {
        Overlay::ALL
            .into_iter()
            .filter(|o| self.is_visible(*o))
            .collect()
    }

    fn flag(&self, overlay: Overlay) -> &bool {
        match overlay {
            Overlay::Fov => &self.fov,
            Overlay::Alerts => &self.alerts,
            Overlay::Patrols => &self.patrols,
            Overlay::Queues => &self.queues,
        }
    }

    fn flag_mut(&mut self, overlay: Overlay) -> &mut bool {
        match overlay {
            Overlay::Fov => &mut self.fov,
            Overlay::Alerts => &mut self.alerts,
            Overlay::Patrols => &mut self.patrols,
            Overlay::Queues => &mut self.queues,
        }
    }
}
