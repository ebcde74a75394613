use eframe::egui;

use crate::overlay::Overlay;
use crate::zone::Point;

/// Screen-space offset of the tooltip from the hovered feature's anchor.
pub const TOOLTIP_OFFSET: egui::Vec2 = egui::vec2(12.0, 12.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Room,
    Aisle,
    Checkout,
    Vestibule,
    Entrance,
    Camera,
    Alert,
}

impl FeatureKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Room => "Room",
            Self::Aisle => "Aisle",
            Self::Checkout => "Checkout",
            Self::Vestibule => "Vestibule",
            Self::Entrance => "Entrance",
            Self::Camera => "Camera",
            Self::Alert => "Alert",
        }
    }

    /// The overlay that draws this kind, or `None` for the always-on floor.
    pub fn overlay(&self) -> Option<Overlay> {
        match self {
            Self::Camera => Some(Overlay::Fov),
            Self::Alert => Some(Overlay::Alerts),
            _ => None,
        }
    }
}

/// An inspectable map feature: what it is, where its tooltip hangs, and the
/// text it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub kind: FeatureKind,
    pub anchor: Point,
    pub label: String,
}

impl Feature {
    pub fn new(kind: FeatureKind, anchor: Point, label: impl Into<String>) -> Self {
        Self {
            kind,
            anchor,
            label: label.into(),
        }
    }
}

/// The single currently inspected feature.
///
/// Entering a feature replaces the target unconditionally. Only leaving the
/// whole map canvas clears it; moving across empty floor between two shapes
/// keeps the last one so the tooltip does not flicker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoverState {
    current: Option<Feature>,
}

impl HoverState {
    pub fn current(&self) -> Option<&Feature> {
        self.current.as_ref()
    }

    pub fn set(&mut self, feature: Feature) {
        self.current = Some(feature);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Fold one pointer sample into the state. `hit` is the feature under the
    /// pointer, `inside_canvas` whether the pointer is over the map at all.
    /// Returns true when the hover target changed.
    pub fn pointer_moved(&mut self, hit: Option<Feature>, inside_canvas: bool) -> bool {
        let before = self.current.clone();
        match (inside_canvas, hit) {
            (false, _) => self.clear(),
            (true, Some(feature)) => {
                if self.current.as_ref() != Some(&feature) {
                    self.set(feature);
                }
            }
            (true, None) => {}
        }
        before != self.current
    }

    /// Where the tooltip goes: the anchor mapped to screen space, nudged by
    /// `TOOLTIP_OFFSET`.
    pub fn tooltip_position(&self, to_screen: impl Fn(Point) -> egui::Pos2) -> Option<egui::Pos2> {
        self.current
            .as_ref()
            .map(|f| to_screen(f.anchor) + TOOLTIP_OFFSET)
    }
}
