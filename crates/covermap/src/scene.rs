//! Ordered draw list for the coverage map.
//!
//! The scene is built from the zone model and the overlay flags and is shared
//! by the on-screen painter, the SVG exporter and hit-testing. Disabled
//! overlays are left out of the list entirely, so they can never swallow a
//! hover meant for whatever lies underneath.

use eframe::egui;

use crate::geometry::{self, MapPath};
use crate::hover::{Feature, FeatureKind};
use crate::overlay::{Overlay, OverlayState};
use crate::zone::{Alert, CANVAS_HEIGHT, CANVAS_WIDTH, Camera, Point, Rectangle, ZoneModel};

/// Legend box in canvas coordinates. Drawn last, so it occludes hits.
pub const LEGEND_RECT: Rectangle = Rectangle {
    x: 20.0,
    y: 20.0,
    width: 280.0,
    height: 130.0,
    label: None,
};

/// Queue bars sit this far above their checkout lane.
pub const QUEUE_BAR_OFFSET: f32 = 38.0;
pub const QUEUE_BAR_HEIGHT: f32 = 6.0;
pub const CAMERA_DOT_RADIUS: f32 = 4.0;
pub const ALERT_RADIUS: f32 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Background,
    Floor(Rectangle),
    Room(Rectangle),
    Aisle { index: usize, rect: Rectangle },
    Checkout { index: usize, rect: Rectangle },
    QueueIndicator(Rectangle),
    Vestibule(Rectangle),
    Entrance(Rectangle),
    CameraFov { camera: Camera, slice: MapPath },
    Patrol(MapPath),
    Alert(Alert),
    Legend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Background,
    Floor,
    Room,
    Aisle,
    Checkout,
    QueueIndicator,
    Vestibule,
    Entrance,
    CameraFov,
    Patrol,
    Alert,
    Legend,
}

impl LayerKind {
    /// Position in the fixed bottom-to-top paint order. Queue bars share the
    /// checkout band because each one is drawn right after its lane.
    pub fn rank(self) -> u8 {
        match self {
            Self::Background => 0,
            Self::Floor => 1,
            Self::Room => 2,
            Self::Aisle => 3,
            Self::Checkout | Self::QueueIndicator => 4,
            Self::Vestibule => 5,
            Self::Entrance => 6,
            Self::CameraFov => 7,
            Self::Patrol => 8,
            Self::Alert => 9,
            Self::Legend => 10,
        }
    }
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        match self {
            Self::Background => LayerKind::Background,
            Self::Floor(_) => LayerKind::Floor,
            Self::Room(_) => LayerKind::Room,
            Self::Aisle { .. } => LayerKind::Aisle,
            Self::Checkout { .. } => LayerKind::Checkout,
            Self::QueueIndicator(_) => LayerKind::QueueIndicator,
            Self::Vestibule(_) => LayerKind::Vestibule,
            Self::Entrance(_) => LayerKind::Entrance,
            Self::CameraFov { .. } => LayerKind::CameraFov,
            Self::Patrol(_) => LayerKind::Patrol,
            Self::Alert(_) => LayerKind::Alert,
            Self::Legend => LayerKind::Legend,
        }
    }

    fn contains(&self, p: Point) -> bool {
        match self {
            Self::Room(rect)
            | Self::Aisle { rect, .. }
            | Self::Checkout { rect, .. }
            | Self::Vestibule(rect)
            | Self::Entrance(rect) => rect.contains(p),
            Self::CameraFov { camera, .. } => {
                geometry::point_in_circle(p, camera.position(), CAMERA_DOT_RADIUS)
                    || geometry::point_in_slice(
                        p,
                        camera.position(),
                        camera.radius,
                        camera.start_angle,
                        camera.end_angle,
                    )
            }
            Self::Alert(alert) => geometry::point_in_circle(p, alert.position(), ALERT_RADIUS),
            Self::Background
            | Self::Floor(_)
            | Self::QueueIndicator(_)
            | Self::Patrol(_)
            | Self::Legend => false,
        }
    }

    /// The inspectable feature this layer represents, if any.
    pub fn feature(&self) -> Option<Feature> {
        let rect_feature = |kind: FeatureKind, rect: &Rectangle, fallback: String| {
            let label = rect.label.clone().unwrap_or(fallback);
            Some(Feature::new(kind, rect.center(), label))
        };

        match self {
            Self::Room(rect) => rect_feature(FeatureKind::Room, rect, "Room".to_string()),
            Self::Aisle { index, rect } => {
                rect_feature(FeatureKind::Aisle, rect, format!("Aisle {}", index + 1))
            }
            Self::Checkout { index, rect } => {
                rect_feature(FeatureKind::Checkout, rect, format!("Lane {}", index + 1))
            }
            Self::Vestibule(rect) => {
                rect_feature(FeatureKind::Vestibule, rect, "Vestibule".to_string())
            }
            Self::Entrance(rect) => rect_feature(FeatureKind::Entrance, rect, "Entrance".to_string()),
            Self::CameraFov { camera, .. } => {
                let sweep = geometry::clockwise_sweep(camera.start_angle, camera.end_angle);
                Some(Feature::new(
                    FeatureKind::Camera,
                    camera.position(),
                    format!("{} \u{00b7} {}\u{00b0} field of view", camera.label, sweep.round()),
                ))
            }
            Self::Alert(alert) => Some(Feature::new(
                FeatureKind::Alert,
                alert.position(),
                format!("{} \u{00b7} {} priority", alert.text, alert.severity),
            )),
            Self::Background
            | Self::Floor(_)
            | Self::QueueIndicator(_)
            | Self::Patrol(_)
            | Self::Legend => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    layers: Vec<Layer>,
}

impl Scene {
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn kinds(&self) -> Vec<LayerKind> {
        self.layers.iter().map(Layer::kind).collect()
    }

    pub fn count(&self, kind: LayerKind) -> usize {
        self.layers.iter().filter(|l| l.kind() == kind).count()
    }

    /// Topmost inspectable feature under `p` (canvas coordinates). The legend
    /// blocks anything beneath it.
    pub fn hit_test(&self, p: Point) -> Option<Feature> {
        for layer in self.layers.iter().rev() {
            if matches!(layer, Layer::Legend) && LEGEND_RECT.contains(p) {
                return None;
            }
            if layer.contains(p) {
                return layer.feature();
            }
        }
        None
    }
}

/// Build the bottom-to-top draw list for `model` under the given overlays.
pub fn build(model: &ZoneModel, overlays: &OverlayState) -> Scene {
    let mut layers = vec![Layer::Background];

    if let Some(floor) = &model.floor {
        layers.push(Layer::Floor(floor.clone()));
    }
    layers.extend(model.rooms.iter().cloned().map(Layer::Room));
    layers.extend(
        model
            .aisles
            .iter()
            .enumerate()
            .map(|(index, rect)| Layer::Aisle {
                index,
                rect: rect.clone(),
            }),
    );

    let show_queues = overlays.is_visible(Overlay::Queues);
    for (index, rect) in model.checkout.iter().enumerate() {
        layers.push(Layer::Checkout {
            index,
            rect: rect.clone(),
        });
        if show_queues {
            layers.push(Layer::QueueIndicator(Rectangle::new(
                rect.x,
                rect.y - QUEUE_BAR_OFFSET,
                rect.width,
                QUEUE_BAR_HEIGHT,
            )));
        }
    }

    if let Some(vestibule) = &model.vestibule {
        layers.push(Layer::Vestibule(vestibule.clone()));
    }
    if let Some(entrance) = &model.entrance {
        layers.push(Layer::Entrance(entrance.clone()));
    }

    if overlays.is_visible(Overlay::Fov) {
        layers.extend(model.cameras.iter().map(|camera| Layer::CameraFov {
            camera: camera.clone(),
            slice: geometry::arc_slice_path(
                camera.position(),
                camera.radius,
                camera.start_angle,
                camera.end_angle,
            ),
        }));
    }

    if overlays.is_visible(Overlay::Patrols) && !model.patrol.is_empty() {
        layers.push(Layer::Patrol(geometry::polyline_path(&model.patrol)));
    }

    if overlays.is_visible(Overlay::Alerts) {
        layers.extend(model.alerts.iter().cloned().map(Layer::Alert));
    }

    layers.push(Layer::Legend);

    tracing::trace!(layers = layers.len(), "scene built");
    Scene { layers }
}

/// Maps the fixed logical canvas into a screen rect, preserving its aspect
/// ratio and centering it (letterboxed) inside the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    origin: egui::Pos2,
    scale: f32,
}

impl CanvasTransform {
    pub fn fit(target: egui::Rect) -> Self {
        let scale = (target.width() / CANVAS_WIDTH)
            .min(target.height() / CANVAS_HEIGHT)
            .max(0.0);
        let size = egui::vec2(CANVAS_WIDTH * scale, CANVAS_HEIGHT * scale);
        Self {
            origin: target.center() - size / 2.0,
            scale,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn to_screen(&self, p: Point) -> egui::Pos2 {
        self.origin + egui::vec2(p.x, p.y) * self.scale
    }

    pub fn to_logical(&self, pos: egui::Pos2) -> Point {
        let scale = self.scale.max(f32::EPSILON);
        let local = (pos - self.origin) / scale;
        Point::new(local.x, local.y)
    }

    pub fn rect_to_screen(&self, rect: &Rectangle) -> egui::Rect {
        egui::Rect::from_min_size(
            self.to_screen(Point::new(rect.x, rect.y)),
            egui::vec2(rect.width, rect.height) * self.scale,
        )
    }

    /// Screen rect covered by the whole logical canvas.
    pub fn canvas_rect(&self) -> egui::Rect {
        egui::Rect::from_min_size(
            self.origin,
            egui::vec2(CANVAS_WIDTH, CANVAS_HEIGHT) * self.scale,
        )
    }
}
