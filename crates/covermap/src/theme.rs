use eframe::egui::Color32;

use crate::zone::Severity;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    pub card_background: Color32,
    pub card_border: Color32,
    pub canvas_top: Color32,
    pub canvas_bottom: Color32,
    pub map_text: Color32,
    pub floor_fill: Color32,
    pub floor_stroke: Color32,
    pub room_fill: Color32,
    pub room_stroke: Color32,
    pub aisle_fill: Color32,
    pub aisle_stroke: Color32,
    pub checkout_fill: Color32,
    pub checkout_stroke: Color32,
    pub queue_fill: Color32,
    pub vestibule_fill: Color32,
    pub entrance_fill: Color32,
    pub entrance_stroke: Color32,
    pub fov_fill: Color32,
    pub fov_stroke: Color32,
    pub camera_color: Color32,
    pub patrol_color: Color32,
    pub alert_high: Color32,
    pub alert_med: Color32,
    pub alert_low: Color32,
    pub legend_fill: Color32,
    pub legend_stroke: Color32,
    pub tooltip_background: Color32,
    pub tooltip_text: Color32,
}

fn rgba(r: u8, g: u8, b: u8, a: f32) -> Color32 {
    Color32::from_rgba_unmultiplied(r, g, b, (a * 255.0).round() as u8)
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x0B, 0x10, 0x20),
            foreground: Color32::from_rgb(0xC8, 0xCC, 0xD8),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0x81, 0x8C, 0xF8),
            card_background: rgba(255, 255, 255, 0.05),
            card_border: rgba(255, 255, 255, 0.10),
            canvas_top: rgba(99, 102, 241, 0.15),
            canvas_bottom: rgba(0, 0, 0, 0.6),
            map_text: Color32::WHITE,
            floor_fill: rgba(255, 255, 255, 0.03),
            floor_stroke: rgba(255, 255, 255, 0.2),
            room_fill: rgba(255, 255, 255, 0.06),
            room_stroke: rgba(255, 255, 255, 0.25),
            aisle_fill: rgba(255, 255, 255, 0.22),
            aisle_stroke: rgba(255, 255, 255, 0.3),
            checkout_fill: rgba(34, 197, 94, 0.25),
            checkout_stroke: rgba(34, 197, 94, 0.6),
            queue_fill: rgba(234, 179, 8, 0.45),
            vestibule_fill: rgba(255, 255, 255, 0.08),
            entrance_fill: rgba(59, 130, 246, 0.25),
            entrance_stroke: rgba(59, 130, 246, 0.6),
            fov_fill: rgba(99, 102, 241, 0.35),
            fov_stroke: rgba(180, 188, 255, 0.6),
            camera_color: Color32::from_rgb(0xC7, 0xD2, 0xFE),
            patrol_color: rgba(34, 197, 94, 0.8),
            alert_high: Color32::from_rgb(239, 68, 68),
            alert_med: Color32::from_rgb(234, 179, 8),
            alert_low: Color32::from_rgb(59, 130, 246),
            legend_fill: rgba(0, 0, 0, 0.35),
            legend_stroke: rgba(255, 255, 255, 0.2),
            tooltip_background: rgba(15, 23, 42, 0.92),
            tooltip_text: Color32::WHITE,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(0xF4, 0xF5, 0xFA),
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            accent: Color32::from_rgb(0x43, 0x38, 0xCA),
            card_background: Color32::WHITE,
            card_border: rgba(15, 23, 42, 0.12),
            canvas_top: rgba(99, 102, 241, 0.10),
            canvas_bottom: rgba(226, 232, 240, 1.0),
            map_text: Color32::from_rgb(0x1E, 0x29, 0x3B),
            floor_fill: rgba(15, 23, 42, 0.03),
            floor_stroke: rgba(15, 23, 42, 0.3),
            room_fill: rgba(15, 23, 42, 0.06),
            room_stroke: rgba(15, 23, 42, 0.3),
            aisle_fill: rgba(15, 23, 42, 0.18),
            aisle_stroke: rgba(15, 23, 42, 0.35),
            checkout_fill: rgba(22, 163, 74, 0.25),
            checkout_stroke: rgba(22, 163, 74, 0.7),
            queue_fill: rgba(202, 138, 4, 0.6),
            vestibule_fill: rgba(15, 23, 42, 0.08),
            entrance_fill: rgba(37, 99, 235, 0.2),
            entrance_stroke: rgba(37, 99, 235, 0.7),
            fov_fill: rgba(79, 70, 229, 0.25),
            fov_stroke: rgba(67, 56, 202, 0.6),
            camera_color: Color32::from_rgb(0x43, 0x38, 0xCA),
            patrol_color: rgba(22, 163, 74, 0.9),
            alert_high: Color32::from_rgb(220, 38, 38),
            alert_med: Color32::from_rgb(202, 138, 4),
            alert_low: Color32::from_rgb(37, 99, 235),
            legend_fill: rgba(255, 255, 255, 0.85),
            legend_stroke: rgba(15, 23, 42, 0.2),
            tooltip_background: rgba(255, 255, 255, 0.95),
            tooltip_text: Color32::from_rgb(0x1A, 0x1A, 0x2E),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    pub fn is_dark(&self) -> bool {
        self.name == "dark"
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        let [r, g, b, _] = color.to_srgba_unmultiplied();
        Color32::from_rgba_unmultiplied(r, g, b, (opacity * 255.0) as u8)
    }

    pub fn alert_color(&self, severity: Severity) -> Color32 {
        match severity {
            Severity::High => self.alert_high,
            Severity::Med => self.alert_med,
            Severity::Low => self.alert_low,
        }
    }
}
