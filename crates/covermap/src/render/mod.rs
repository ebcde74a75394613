pub mod painter;
pub mod svg;

use eframe::egui::Color32;

use crate::geometry::{self, MapPath};
use crate::zone::Point;

/// Legend contents in canvas coordinates, shared by both renderers.
pub mod legend {
    use super::Point;

    pub const TITLE: &str = "Legend";
    pub const TITLE_POS: Point = Point::new(36.0, 46.0);
    pub const TITLE_SIZE: f32 = 14.0;
    pub const ENTRY_SIZE: f32 = 12.0;

    pub const INCIDENT_DOT: Point = Point::new(36.0, 68.0);
    pub const INCIDENT_DOT_RADIUS: f32 = 6.0;
    pub const INCIDENT_LABEL: (Point, &str) = (Point::new(52.0, 72.0), "Incident");

    pub const AISLE_SWATCH: (Point, Point) = (Point::new(30.0, 84.0), Point::new(16.0, 8.0));
    pub const AISLE_LABEL: (Point, &str) = (Point::new(52.0, 92.0), "Shelf/Aisle");

    pub const FOV_CENTER: Point = Point::new(180.0, 40.0);
    pub const FOV_RADIUS: f32 = 16.0;
    pub const FOV_START: f32 = -50.0;
    pub const FOV_END: f32 = 20.0;
    pub const FOV_LABEL: (Point, &str) = (Point::new(200.0, 44.0), "Camera FOV");

    pub const PATROL_LINE: [Point; 2] = [Point::new(30.0, 106.0), Point::new(80.0, 106.0)];
    pub const PATROL_LABEL: (Point, &str) = (Point::new(90.0, 110.0), "Patrol route");
}

pub fn legend_fov_slice() -> MapPath {
    geometry::arc_slice_path(
        legend::FOV_CENTER,
        legend::FOV_RADIUS,
        legend::FOV_START,
        legend::FOV_END,
    )
}

/// Label offsets relative to the shape they annotate, in canvas units.
pub fn room_label_pos(x: f32, y: f32) -> Point {
    Point::new(x + 10.0, y + 22.0)
}

pub fn lane_label_pos(x: f32, y: f32) -> Point {
    Point::new(x + 6.0, y - 6.0)
}

pub fn zone_label_pos(x: f32, y: f32) -> Point {
    Point::new(x + 8.0, y - 6.0)
}

pub fn camera_label_pos(p: Point) -> Point {
    Point::new(p.x + 8.0, p.y - 8.0)
}

pub fn alert_label_pos(p: Point) -> Point {
    Point::new(p.x + 10.0, p.y + 4.0)
}

/// Linear blend of two colors in unmultiplied sRGB space.
pub fn mix(a: Color32, b: Color32, t: f32) -> Color32 {
    let a = a.to_srgba_unmultiplied();
    let b = b.to_srgba_unmultiplied();
    let lerp = |i: usize| (a[i] as f32 + (b[i] as f32 - a[i] as f32) * t).round() as u8;
    Color32::from_rgba_unmultiplied(lerp(0), lerp(1), lerp(2), lerp(3))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mix_endpoints() {
        let a = Color32::from_rgb(0, 0, 0);
        let b = Color32::from_rgb(200, 100, 50);
        assert_eq!(mix(a, b, 0.0), a);
        assert_eq!(mix(a, b, 1.0), b);
        assert_eq!(mix(a, b, 0.5), Color32::from_rgb(100, 50, 25));
    }

    #[test]
    fn test_legend_slice_is_narrow() {
        assert_eq!(legend_fov_slice().large_arc(), Some(false));
    }
}
