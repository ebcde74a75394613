use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Width of the logical map canvas. All zone coordinates live in this space.
pub const CANVAS_WIDTH: f32 = 1000.0;
/// Height of the logical map canvas.
pub const CANVAS_HEIGHT: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned box used for aisles, checkout lanes, entrance, vestibule and
/// back-of-house rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    #[serde(alias = "w")]
    pub width: f32,
    #[serde(alias = "h")]
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            label: None,
        }
    }

    pub fn labeled(x: f32, y: f32, width: f32, height: f32, label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            ..Self::new(x, y, width, height)
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    fn intersects_canvas(&self) -> bool {
        self.x <= CANVAS_WIDTH
            && self.y <= CANVAS_HEIGHT
            && self.x + self.width >= 0.0
            && self.y + self.height >= 0.0
    }
}

/// A camera position and its field-of-view arc. Angles are in degrees and the
/// arc sweeps clockwise (screen space, y down) from `start_angle` to `end_angle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    #[serde(alias = "r")]
    pub radius: f32,
    #[serde(alias = "a0")]
    pub start_angle: f32,
    #[serde(alias = "a1")]
    pub end_angle: f32,
    pub label: String,
}

impl Camera {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[serde(alias = "medium")]
    Med,
    High,
}

impl Severity {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Med => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub x: f32,
    pub y: f32,
    #[serde(alias = "level")]
    pub severity: Severity,
    pub text: String,
}

impl Alert {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Static description of a store floor. Loaded once and never mutated by the
/// viewer; a reload replaces the whole model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<Rectangle>,
    #[serde(default)]
    pub rooms: Vec<Rectangle>,
    #[serde(default)]
    pub aisles: Vec<Rectangle>,
    #[serde(default)]
    pub checkout: Vec<Rectangle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vestibule: Option<Rectangle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entrance: Option<Rectangle>,
    #[serde(default)]
    pub cameras: Vec<Camera>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    #[serde(default, alias = "patrol_path")]
    pub patrol: Vec<Point>,
}

impl ZoneModel {
    /// The reference store layout shown when no zone file is supplied.
    pub fn default_layout() -> Self {
        let aisles = [120.0, 190.0, 260.0]
            .into_iter()
            .flat_map(|y| {
                [140.0, 320.0, 500.0, 680.0]
                    .into_iter()
                    .map(move |x| Rectangle::new(x, y, 140.0, 36.0))
            })
            .collect();

        let checkout = (0..4)
            .map(|i| {
                let x = 120.0 + 140.0 * i as f32;
                Rectangle::labeled(x, 420.0, 120.0, 18.0, &format!("Lane {}", i + 1))
            })
            .collect();

        let camera = |x, y, start_angle, end_angle, label: &str| Camera {
            x,
            y,
            radius: 180.0,
            start_angle,
            end_angle,
            label: label.to_string(),
        };

        let alert = |x, y, severity, text: &str| Alert {
            x,
            y,
            severity,
            text: text.to_string(),
        };

        Self {
            floor: Some(Rectangle::new(60.0, 60.0, 880.0, 480.0)),
            rooms: vec![
                Rectangle::labeled(820.0, 80.0, 120.0, 130.0, "Stockroom"),
                Rectangle::labeled(820.0, 230.0, 120.0, 80.0, "Staff Only"),
                Rectangle::labeled(820.0, 330.0, 120.0, 80.0, "Office"),
                Rectangle::labeled(820.0, 430.0, 120.0, 80.0, "Loading"),
            ],
            aisles,
            checkout,
            vestibule: Some(Rectangle::labeled(60.0, 480.0, 280.0, 24.0, "Vestibule")),
            entrance: Some(Rectangle::labeled(60.0, 510.0, 280.0, 24.0, "Main Entrance")),
            cameras: vec![
                camera(120.0, 80.0, 10.0, 60.0, "C-01"),
                camera(500.0, 80.0, 20.0, 70.0, "C-02"),
                camera(880.0, 60.0, 110.0, 170.0, "C-03"),
                camera(880.0, 540.0, 200.0, 255.0, "C-04"),
            ],
            alerts: vec![
                alert(270.0, 190.0, Severity::Med, "Item sweep"),
                alert(410.0, 420.0, Severity::High, "Voided txn"),
                alert(860.0, 120.0, Severity::Low, "Door ajar"),
            ],
            patrol: vec![
                Point::new(120.0, 500.0),
                Point::new(220.0, 300.0),
                Point::new(360.0, 200.0),
                Point::new(540.0, 200.0),
                Point::new(720.0, 230.0),
                Point::new(860.0, 440.0),
                Point::new(540.0, 440.0),
                Point::new(360.0, 420.0),
                Point::new(200.0, 420.0),
                Point::new(120.0, 500.0),
            ],
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let model: ZoneModel = serde_yaml::from_str(content).context("Invalid zone file")?;
        model.validate()?;
        Ok(model)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read zone file {}", path.display()))?;
        let model = Self::from_yaml(&content)
            .with_context(|| format!("Failed to load zones from {}", path.display()))?;
        tracing::info!(path = %path.display(), "{}", model.summary());
        Ok(model)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject authoring defects that would otherwise surface as broken
    /// rendering: non-finite numbers, negative sizes, shapes entirely off the
    /// canvas and unlabeled cameras.
    pub fn validate(&self) -> Result<()> {
        let named_rects = self
            .floor
            .iter()
            .map(|r| ("floor".to_string(), r))
            .chain(self.rooms.iter().enumerate().map(|(i, r)| (format!("rooms[{i}]"), r)))
            .chain(self.aisles.iter().enumerate().map(|(i, r)| (format!("aisles[{i}]"), r)))
            .chain(
                self.checkout
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (format!("checkout[{i}]"), r)),
            )
            .chain(self.vestibule.iter().map(|r| ("vestibule".to_string(), r)))
            .chain(self.entrance.iter().map(|r| ("entrance".to_string(), r)));

        for (name, rect) in named_rects {
            if !rect.is_finite() {
                anyhow::bail!("{name}: coordinates must be finite numbers");
            }
            if rect.width < 0.0 || rect.height < 0.0 {
                anyhow::bail!(
                    "{name}: negative size {}x{} is not allowed",
                    rect.width,
                    rect.height
                );
            }
            if !rect.intersects_canvas() {
                anyhow::bail!(
                    "{name}: lies entirely outside the {CANVAS_WIDTH}x{CANVAS_HEIGHT} canvas"
                );
            }
        }

        for (i, cam) in self.cameras.iter().enumerate() {
            let values = [cam.x, cam.y, cam.radius, cam.start_angle, cam.end_angle];
            if values.iter().any(|v| !v.is_finite()) {
                anyhow::bail!("cameras[{i}]: values must be finite numbers");
            }
            if cam.label.trim().is_empty() {
                anyhow::bail!("cameras[{i}]: label must not be empty");
            }
            if cam.radius < 0.0 {
                tracing::warn!(camera = %cam.label, radius = cam.radius, "negative camera radius");
            }
        }

        for (i, alert) in self.alerts.iter().enumerate() {
            if !alert.position().is_finite() {
                anyhow::bail!("alerts[{i}]: position must be finite");
            }
        }

        if let Some(i) = self.patrol.iter().position(|p| !p.is_finite()) {
            anyhow::bail!("patrol[{i}]: waypoint must be finite");
        }

        Ok(())
    }

    pub fn patrol_is_closed(&self) -> bool {
        match (self.patrol.first(), self.patrol.last()) {
            (Some(first), Some(last)) => self.patrol.len() > 1 && first == last,
            _ => false,
        }
    }

    pub fn summary(&self) -> ZoneSummary {
        let count = |severity| self.alerts.iter().filter(|a| a.severity == severity).count();
        ZoneSummary {
            rooms: self.rooms.len(),
            aisles: self.aisles.len(),
            checkout_lanes: self.checkout.len(),
            cameras: self.cameras.len(),
            alerts_low: count(Severity::Low),
            alerts_med: count(Severity::Med),
            alerts_high: count(Severity::High),
            patrol_waypoints: self.patrol.len(),
            patrol_closed: self.patrol_is_closed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSummary {
    pub rooms: usize,
    pub aisles: usize,
    pub checkout_lanes: usize,
    pub cameras: usize,
    pub alerts_low: usize,
    pub alerts_med: usize,
    pub alerts_high: usize,
    pub patrol_waypoints: usize,
    pub patrol_closed: bool,
}

impl fmt::Display for ZoneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rooms, {} aisles, {} checkout lanes, {} cameras, {} alerts ({} low / {} med / {} high), patrol of {} waypoints ({})",
            self.rooms,
            self.aisles,
            self.checkout_lanes,
            self.cameras,
            self.alerts_low + self.alerts_med + self.alerts_high,
            self.alerts_low,
            self.alerts_med,
            self.alerts_high,
            self.patrol_waypoints,
            if self.patrol_closed { "closed" } else { "open" },
        )
    }
}
