//! Standalone SVG document for a scene, using the logical canvas as viewBox.

use std::fmt::Write;

use eframe::egui::Color32;

use crate::geometry::{fmt_num, polyline_path};
use crate::render::{self, legend};
use crate::scene::{ALERT_RADIUS, CAMERA_DOT_RADIUS, LEGEND_RECT, Layer, Scene};
use crate::theme::Theme;
use crate::zone::{CANVAS_HEIGHT, CANVAS_WIDTH, Point, Rectangle, Severity};

/// Render `scene` as an SVG document. `size` sets the width/height attributes;
/// without it the document scales to its container.
pub fn render_svg(scene: &Scene, theme: &Theme, size: Option<(u32, u32)>) -> anyhow::Result<String> {
    let mut out = String::new();
    let dims = size
        .map(|(w, h)| format!(" width=\"{w}\" height=\"{h}\""))
        .unwrap_or_default();
    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {} {}\"{dims}>",
        fmt_num(CANVAS_WIDTH),
        fmt_num(CANVAS_HEIGHT)
    )?;
    write_defs(&mut out, theme)?;

    for layer in scene.layers() {
        match layer {
            Layer::Background => writeln!(
                out,
                "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"url(#bgGrad)\" />",
                fmt_num(CANVAS_WIDTH),
                fmt_num(CANVAS_HEIGHT)
            )?,
            Layer::Floor(rect) => write_rect(&mut out, rect, theme.floor_fill, Some(theme.floor_stroke))?,
            Layer::Room(rect) => {
                write_rect(&mut out, rect, theme.room_fill, Some(theme.room_stroke))?;
                if let Some(label) = &rect.label {
                    write_text(&mut out, render::room_label_pos(rect.x, rect.y), label, 12.0, theme.map_text)?;
                }
            }
            Layer::Aisle { rect, .. } => {
                write_rect(&mut out, rect, theme.aisle_fill, Some(theme.aisle_stroke))?
            }
            Layer::Checkout { rect, .. } => {
                write_rect(&mut out, rect, theme.checkout_fill, Some(theme.checkout_stroke))?;
                if let Some(label) = &rect.label {
                    write_text(&mut out, render::lane_label_pos(rect.x, rect.y), label, 11.0, theme.map_text)?;
                }
            }
            Layer::QueueIndicator(rect) => write_rect(&mut out, rect, theme.queue_fill, None)?,
            Layer::Vestibule(rect) | Layer::Entrance(rect) => {
                let (fill, stroke) = if matches!(layer, Layer::Entrance(_)) {
                    (theme.entrance_fill, theme.entrance_stroke)
                } else {
                    (theme.vestibule_fill, theme.room_stroke)
                };
                write_rect(&mut out, rect, fill, Some(stroke))?;
                if let Some(label) = &rect.label {
                    write_text(&mut out, render::zone_label_pos(rect.x, rect.y), label, 12.0, theme.map_text)?;
                }
            }
            Layer::CameraFov { camera, slice } => {
                writeln!(
                    out,
                    "  <path d=\"{slice}\" fill=\"{}\" stroke=\"{}\" />",
                    css(theme.fov_fill),
                    css(theme.fov_stroke)
                )?;
                writeln!(
                    out,
                    "  <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\" />",
                    fmt_num(camera.x),
                    fmt_num(camera.y),
                    fmt_num(CAMERA_DOT_RADIUS),
                    css(theme.camera_color)
                )?;
                write_text(
                    &mut out,
                    render::camera_label_pos(camera.position()),
                    &camera.label,
                    11.0,
                    theme.camera_color,
                )?;
            }
            Layer::Patrol(path) => writeln!(
                out,
                "  <path d=\"{path}\" stroke=\"{}\" stroke-dasharray=\"6 6\" fill=\"none\" />",
                css(theme.patrol_color)
            )?,
            Layer::Alert(alert) => {
                writeln!(
                    out,
                    "  <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"url(#{})\" filter=\"url(#soft)\" />",
                    fmt_num(alert.x),
                    fmt_num(alert.y),
                    fmt_num(ALERT_RADIUS),
                    gradient_id(alert.severity)
                )?;
                writeln!(
                    out,
                    "  <circle cx=\"{}\" cy=\"{}\" r=\"4\" fill=\"#fff\" />",
                    fmt_num(alert.x),
                    fmt_num(alert.y)
                )?;
                write_text(&mut out, render::alert_label_pos(alert.position()), &alert.text, 11.0, theme.map_text)?;
            }
            Layer::Legend => write_legend(&mut out, theme)?,
        }
    }

    writeln!(out, "</svg>")?;
    Ok(out)
}

fn write_defs(out: &mut String, theme: &Theme) -> std::fmt::Result {
    writeln!(out, "  <defs>")?;
    writeln!(out, "    <linearGradient id=\"bgGrad\" x1=\"0\" y1=\"0\" x2=\"1\" y2=\"1\">")?;
    writeln!(out, "      <stop offset=\"0%\" stop-color=\"{}\" />", css(theme.canvas_top))?;
    writeln!(out, "      <stop offset=\"100%\" stop-color=\"{}\" />", css(theme.canvas_bottom))?;
    writeln!(out, "    </linearGradient>")?;
    for severity in [Severity::High, Severity::Med, Severity::Low] {
        let color = theme.alert_color(severity);
        writeln!(
            out,
            "    <radialGradient id=\"{}\" cx=\"50%\" cy=\"50%\" r=\"50%\">",
            gradient_id(severity)
        )?;
        writeln!(
            out,
            "      <stop offset=\"0%\" stop-color=\"{}\" />",
            css(Theme::with_opacity(color, 0.8))
        )?;
        writeln!(
            out,
            "      <stop offset=\"100%\" stop-color=\"{}\" />",
            css(Theme::with_opacity(color, 0.15))
        )?;
        writeln!(out, "    </radialGradient>")?;
    }
    writeln!(
        out,
        "    <filter id=\"soft\" x=\"-20%\" y=\"-20%\" width=\"140%\" height=\"140%\">"
    )?;
    writeln!(out, "      <feGaussianBlur in=\"SourceGraphic\" stdDeviation=\"2\" />")?;
    writeln!(out, "    </filter>")?;
    writeln!(out, "  </defs>")
}

fn write_legend(out: &mut String, theme: &Theme) -> std::fmt::Result {
    let r = &LEGEND_RECT;
    writeln!(out, "  <g>")?;
    writeln!(
        out,
        "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"10\" ry=\"10\" fill=\"{}\" stroke=\"{}\" />",
        fmt_num(r.x),
        fmt_num(r.y),
        fmt_num(r.width),
        fmt_num(r.height),
        css(theme.legend_fill),
        css(theme.legend_stroke)
    )?;
    write_text(out, legend::TITLE_POS, legend::TITLE, legend::TITLE_SIZE, theme.heading_color)?;

    writeln!(
        out,
        "  <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"url(#{})\" stroke=\"{}\" />",
        fmt_num(legend::INCIDENT_DOT.x),
        fmt_num(legend::INCIDENT_DOT.y),
        fmt_num(legend::INCIDENT_DOT_RADIUS),
        gradient_id(Severity::High),
        css(theme.alert_high)
    )?;
    let (at, text) = legend::INCIDENT_LABEL;
    write_text(out, at, text, legend::ENTRY_SIZE, theme.map_text)?;

    let (min, size) = legend::AISLE_SWATCH;
    write_rect(out, &Rectangle::new(min.x, min.y, size.x, size.y), theme.aisle_fill, None)?;
    let (at, text) = legend::AISLE_LABEL;
    write_text(out, at, text, legend::ENTRY_SIZE, theme.map_text)?;

    writeln!(
        out,
        "  <path d=\"{}\" fill=\"{}\" stroke=\"{}\" />",
        render::legend_fov_slice(),
        css(theme.fov_fill),
        css(theme.fov_stroke)
    )?;
    let (at, text) = legend::FOV_LABEL;
    write_text(out, at, text, legend::ENTRY_SIZE, theme.map_text)?;

    writeln!(
        out,
        "  <path d=\"{}\" stroke=\"{}\" stroke-dasharray=\"4 4\" />",
        polyline_path(&legend::PATROL_LINE),
        css(theme.patrol_color)
    )?;
    let (at, text) = legend::PATROL_LABEL;
    write_text(out, at, text, legend::ENTRY_SIZE, theme.map_text)?;
    writeln!(out, "  </g>")
}

fn write_rect(
    out: &mut String,
    rect: &Rectangle,
    fill: Color32,
    stroke: Option<Color32>,
) -> std::fmt::Result {
    let stroke = stroke
        .map(|c| format!(" stroke=\"{}\"", css(c)))
        .unwrap_or_default();
    writeln!(
        out,
        "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\"{stroke} />",
        fmt_num(rect.x),
        fmt_num(rect.y),
        fmt_num(rect.width),
        fmt_num(rect.height),
        css(fill)
    )
}

fn write_text(out: &mut String, at: Point, text: &str, size: f32, color: Color32) -> std::fmt::Result {
    writeln!(
        out,
        "  <text x=\"{}\" y=\"{}\" fill=\"{}\" font-size=\"{}\">{}</text>",
        fmt_num(at.x),
        fmt_num(at.y),
        css(color),
        fmt_num(size),
        escape(text)
    )
}

fn gradient_id(severity: Severity) -> &'static str {
    match severity {
        Severity::High => "alertHigh",
        Severity::Med => "alertMed",
        Severity::Low => "alertLow",
    }
}

/// CSS color for an egui color. Opaque colors become hex, the rest `rgba()`.
fn css(color: Color32) -> String {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 255 {
        format!("#{r:02x}{g:02x}{b:02x}")
    } else {
        let alpha = fmt_num((a as f32 / 255.0 * 100.0).round() / 100.0);
        format!("rgba({r},{g},{b},{alpha})")
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{Overlay, OverlayState};
    use crate::scene;
    use crate::zone::ZoneModel;

    fn svg_for(overlays: OverlayState) -> String {
        let scene = scene::build(&ZoneModel::default_layout(), &overlays);
        render_svg(&scene, &Theme::dark(), None).unwrap()
    }

    #[test]
    fn test_document_envelope() {
        let svg = svg_for(OverlayState::default());
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 1000 600\">"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("id=\"bgGrad\""));
    }

    #[test]
    fn test_size_attributes() {
        let scene = scene::build(&ZoneModel::default_layout(), &OverlayState::default());
        let svg = render_svg(&scene, &Theme::light(), Some((1920, 1152))).unwrap();
        assert!(svg.contains("width=\"1920\" height=\"1152\""));
    }

    #[test]
    fn test_camera_slices_present_when_enabled() {
        let svg = svg_for(OverlayState::default());
        assert!(svg.contains("C-01"));
        assert!(svg.contains("<path d=\"M 120 80 L "));
    }

    #[test]
    fn test_hidden_overlays_are_absent() {
        let svg = svg_for(OverlayState::from_visible(&[Overlay::Queues]));
        assert!(!svg.contains(">C-01<"));
        assert!(!svg.contains(">Voided txn<"));
        assert!(!svg.contains("stroke-dasharray=\"6 6\""));
        assert!(svg.contains(">Lane 1<"));
    }

    #[test]
    fn test_patrol_path_data() {
        let svg = svg_for(OverlayState::default());
        assert!(svg.contains("d=\"M 120 500 L 220 300 L 360 200"));
    }

    #[test]
    fn test_paint_order_in_document() {
        let svg = svg_for(OverlayState::default());
        let aisle = svg.find("width=\"140\" height=\"36\"").unwrap();
        let fov = svg.find("<path d=\"M 120 80").unwrap();
        let alert = svg.find("url(#alertMed)\" filter").unwrap();
        let legend = svg.find(">Legend<").unwrap();
        assert!(aisle < fov && fov < alert && alert < legend);
    }

    #[test]
    fn test_css_colors() {
        assert_eq!(css(Color32::from_rgb(255, 0, 16)), "#ff0010");
        assert_eq!(css(Color32::TRANSPARENT), "rgba(0,0,0,0)");
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("Fish & <Chips>"), "Fish &amp; &lt;Chips&gt;");
    }
}
