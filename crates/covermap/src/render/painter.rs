use eframe::egui::{self, Color32, Pos2, Stroke};

use crate::geometry::MapPath;
use crate::render::{self, legend};
use crate::scene::{
    ALERT_RADIUS, CAMERA_DOT_RADIUS, CanvasTransform, LEGEND_RECT, Layer, Scene,
};
use crate::theme::Theme;
use crate::zone::{Alert, Camera, Point, Rectangle};

const LABEL_SIZE: f32 = 12.0;
const SMALL_LABEL_SIZE: f32 = 11.0;

/// Paint a scene with the egui painter, bottom to top.
pub fn paint_scene(
    painter: &egui::Painter,
    scene: &Scene,
    transform: &CanvasTransform,
    theme: &Theme,
) {
    let ctx = PaintCtx {
        painter,
        transform,
        theme,
    };

    for layer in scene.layers() {
        match layer {
            Layer::Background => ctx.background(),
            Layer::Floor(rect) => ctx.outlined(rect, theme.floor_fill, theme.floor_stroke),
            Layer::Room(rect) => {
                ctx.outlined(rect, theme.room_fill, theme.room_stroke);
                if let Some(label) = &rect.label {
                    ctx.label(render::room_label_pos(rect.x, rect.y), label, LABEL_SIZE);
                }
            }
            Layer::Aisle { rect, .. } => ctx.outlined(rect, theme.aisle_fill, theme.aisle_stroke),
            Layer::Checkout { rect, .. } => {
                ctx.outlined(rect, theme.checkout_fill, theme.checkout_stroke);
                if let Some(label) = &rect.label {
                    ctx.label(render::lane_label_pos(rect.x, rect.y), label, SMALL_LABEL_SIZE);
                }
            }
            Layer::QueueIndicator(rect) => {
                painter.rect_filled(transform.rect_to_screen(rect), 0.0, theme.queue_fill);
            }
            Layer::Vestibule(rect) => {
                ctx.outlined(rect, theme.vestibule_fill, theme.room_stroke);
                if let Some(label) = &rect.label {
                    ctx.label(render::zone_label_pos(rect.x, rect.y), label, LABEL_SIZE);
                }
            }
            Layer::Entrance(rect) => {
                ctx.outlined(rect, theme.entrance_fill, theme.entrance_stroke);
                if let Some(label) = &rect.label {
                    ctx.label(render::zone_label_pos(rect.x, rect.y), label, LABEL_SIZE);
                }
            }
            Layer::CameraFov { camera, slice } => ctx.camera(camera, slice),
            Layer::Patrol(path) => ctx.patrol(path),
            Layer::Alert(alert) => ctx.alert(alert),
            Layer::Legend => ctx.legend(),
        }
    }
}

struct PaintCtx<'a> {
    painter: &'a egui::Painter,
    transform: &'a CanvasTransform,
    theme: &'a Theme,
}

impl PaintCtx<'_> {
    fn scale(&self) -> f32 {
        self.transform.scale()
    }

    fn pos(&self, p: Point) -> Pos2 {
        self.transform.to_screen(p)
    }

    fn stroke(&self, color: Color32) -> Stroke {
        Stroke::new(1.0_f32.max(self.scale()), color)
    }

    /// Diagonal gradient over the whole canvas, top-left to bottom-right.
    fn background(&self) {
        let rect = self.transform.canvas_rect();
        let top = self.theme.canvas_top;
        let bottom = self.theme.canvas_bottom;
        let middle = render::mix(top, bottom, 0.5);

        let mut mesh = egui::Mesh::default();
        mesh.colored_vertex(rect.left_top(), top);
        mesh.colored_vertex(rect.right_top(), middle);
        mesh.colored_vertex(rect.left_bottom(), middle);
        mesh.colored_vertex(rect.right_bottom(), bottom);
        mesh.add_triangle(0, 2, 1);
        mesh.add_triangle(1, 2, 3);
        self.painter.add(egui::Shape::mesh(mesh));
    }

    fn outlined(&self, rect: &Rectangle, fill: Color32, stroke: Color32) {
        let screen = self.transform.rect_to_screen(rect);
        self.painter.rect_filled(screen, 0.0, fill);
        self.painter
            .rect_stroke(screen, 0.0, self.stroke(stroke), egui::StrokeKind::Inside);
    }

    fn label(&self, at: Point, text: &str, size: f32) {
        self.colored_label(at, text, size, self.theme.map_text);
    }

    fn colored_label(&self, at: Point, text: &str, size: f32, color: Color32) {
        let size = (size * self.scale()).max(1.0);
        self.painter.text(
            self.pos(at),
            egui::Align2::LEFT_BOTTOM,
            text,
            egui::FontId::proportional(size),
            color,
        );
    }

    /// Fill a pie slice as a triangle fan around its first point (the
    /// center). A fan stays correct for slices wider than 180 degrees, where
    /// a convex polygon fill would not.
    fn slice(&self, path: &MapPath, fill: Color32, stroke: Color32) {
        let points: Vec<Pos2> = path.flatten().into_iter().map(|p| self.pos(p)).collect();
        if points.len() < 3 {
            return;
        }

        let mut mesh = egui::Mesh::default();
        for p in &points {
            mesh.colored_vertex(*p, fill);
        }
        for i in 1..points.len() as u32 - 1 {
            mesh.add_triangle(0, i, i + 1);
        }
        self.painter.add(egui::Shape::mesh(mesh));
        self.painter
            .add(egui::Shape::closed_line(points, self.stroke(stroke)));
    }

    fn camera(&self, camera: &Camera, slice: &MapPath) {
        self.slice(slice, self.theme.fov_fill, self.theme.fov_stroke);
        self.painter.circle_filled(
            self.pos(camera.position()),
            CAMERA_DOT_RADIUS * self.scale(),
            self.theme.camera_color,
        );
        self.colored_label(
            render::camera_label_pos(camera.position()),
            &camera.label,
            SMALL_LABEL_SIZE,
            self.theme.camera_color,
        );
    }

    fn patrol(&self, path: &MapPath) {
        let points: Vec<Pos2> = path.flatten().into_iter().map(|p| self.pos(p)).collect();
        if points.len() < 2 {
            return;
        }
        let dash = (6.0 * self.scale()).max(1.0);
        let stroke = Stroke::new(1.5 * self.scale().max(1.0), self.theme.patrol_color);
        self.painter
            .extend(egui::Shape::dashed_line(&points, stroke, dash, dash));
    }

    /// Soft marker: stacked translucent discs fading out toward the rim,
    /// then a solid center dot.
    fn alert(&self, alert: &Alert) {
        let center = self.pos(alert.position());
        let color = self.theme.alert_color(alert.severity);
        let radius = ALERT_RADIUS * self.scale();
        for (fraction, opacity) in [(1.0, 0.15), (0.75, 0.3), (0.5, 0.5), (0.3, 0.7)] {
            self.painter
                .circle_filled(center, radius * fraction, Theme::with_opacity(color, opacity));
        }
        self.painter
            .circle_filled(center, 4.0 * self.scale(), Color32::WHITE);
        self.label(render::alert_label_pos(alert.position()), &alert.text, SMALL_LABEL_SIZE);
    }

    fn legend(&self) {
        let theme = self.theme;
        let rect = self.transform.rect_to_screen(&LEGEND_RECT);
        let rounding = 10.0 * self.scale();
        self.painter.rect_filled(rect, rounding, theme.legend_fill);
        self.painter.rect_stroke(
            rect,
            rounding,
            self.stroke(theme.legend_stroke),
            egui::StrokeKind::Inside,
        );

        self.colored_label(legend::TITLE_POS, legend::TITLE, legend::TITLE_SIZE, theme.heading_color);

        self.painter.circle(
            self.pos(legend::INCIDENT_DOT),
            legend::INCIDENT_DOT_RADIUS * self.scale(),
            Theme::with_opacity(theme.alert_high, 0.7),
            self.stroke(theme.alert_high),
        );
        let (at, text) = legend::INCIDENT_LABEL;
        self.label(at, text, legend::ENTRY_SIZE);

        let (min, size) = legend::AISLE_SWATCH;
        let swatch = Rectangle::new(min.x, min.y, size.x, size.y);
        self.painter
            .rect_filled(self.transform.rect_to_screen(&swatch), 0.0, theme.aisle_fill);
        let (at, text) = legend::AISLE_LABEL;
        self.label(at, text, legend::ENTRY_SIZE);

        self.slice(&render::legend_fov_slice(), theme.fov_fill, theme.fov_stroke);
        let (at, text) = legend::FOV_LABEL;
        self.label(at, text, legend::ENTRY_SIZE);

        let line = legend::PATROL_LINE.map(|p| self.pos(p));
        let dash = (4.0 * self.scale()).max(1.0);
        self.painter.extend(egui::Shape::dashed_line(
            &line,
            self.stroke(theme.patrol_color),
            dash,
            dash,
        ));
        let (at, text) = legend::PATROL_LABEL;
        self.label(at, text, legend::ENTRY_SIZE);
    }
}
