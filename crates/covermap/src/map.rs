//! The embeddable coverage map widget.
//!
//! The host hands in the `egui::Ui` to draw into. In fullscreen the widget
//! lifts itself onto a foreground layer covering the viewport and handles
//! Escape itself. Overlay, hover and display state live here and change only
//! through [`CoverageMap::apply`].

use anyhow::Context as _;
use eframe::egui;

use crate::display::DisplayMode;
use crate::hover::{Feature, HoverState};
use crate::overlay::{Overlay, OverlayState};
use crate::render::painter::paint_scene;
use crate::scene::{self, CanvasTransform, Scene};
use crate::theme::Theme;
use crate::zone::ZoneModel;

const MAP_ASPECT: f32 = 9.0 / 16.0;
const TOOLTIP_PADDING: f32 = 8.0;
const FULLSCREEN_MARGIN: f32 = 16.0;

#[derive(Debug, Clone)]
pub struct CoverageMapOptions {
    /// Zone model override; the built-in store layout is used when absent.
    pub zones: Option<ZoneModel>,
    pub overlays: OverlayState,
    pub start_fullscreen: bool,
    pub title: String,
    pub badge: Option<String>,
}

impl Default for CoverageMapOptions {
    fn default() -> Self {
        Self {
            zones: None,
            overlays: OverlayState::default(),
            start_fullscreen: false,
            title: "Retail Floor Coverage".to_string(),
            badge: Some("Auto-Redaction Enabled".to_string()),
        }
    }
}

/// Every way the map state can change.
#[derive(Debug, Clone, PartialEq)]
pub enum MapAction {
    Toggle(Overlay),
    ToggleFullscreen,
    Escape,
    Pointer {
        hit: Option<Feature>,
        inside_canvas: bool,
    },
    ReplaceZones(Box<ZoneModel>),
}

pub struct CoverageMap {
    model: ZoneModel,
    scene: Scene,
    overlays: OverlayState,
    hover: HoverState,
    display: DisplayMode,
    title: String,
    badge: Option<String>,
    /// Canvas transform from the last frame, used for tooltip placement and
    /// pointer conversion
    last_transform: Option<CanvasTransform>,
}

impl CoverageMap {
    /// Build the widget. Fails when the supplied zone model does not validate.
    pub fn new(options: CoverageMapOptions) -> anyhow::Result<Self> {
        let model = options.zones.unwrap_or_else(ZoneModel::default_layout);
        model.validate().context("Invalid zone model")?;
        let scene = scene::build(&model, &options.overlays);
        let display = if options.start_fullscreen {
            DisplayMode::Fullscreen
        } else {
            DisplayMode::Normal
        };
        Ok(Self {
            model,
            scene,
            overlays: options.overlays,
            hover: HoverState::default(),
            display,
            title: options.title,
            badge: options.badge,
            last_transform: None,
        })
    }

    pub fn model(&self) -> &ZoneModel {
        &self.model
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn overlays(&self) -> &OverlayState {
        &self.overlays
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn display(&self) -> DisplayMode {
        self.display
    }

    pub fn last_transform(&self) -> Option<CanvasTransform> {
        self.last_transform
    }

    /// Swap in a new zone model. An invalid model is rejected and the current
    /// one stays on screen.
    pub fn replace_zones(&mut self, model: ZoneModel) -> anyhow::Result<()> {
        model.validate().context("Invalid zone model")?;
        self.model = model;
        self.hover.clear();
        self.rebuild();
        tracing::info!("{}", self.model.summary());
        Ok(())
    }

    /// Apply one interaction synchronously. Returns whether anything changed;
    /// for `Escape` that means the key press was consumed.
    pub fn apply(&mut self, action: MapAction) -> bool {
        match action {
            MapAction::Toggle(overlay) => {
                self.overlays.toggle(overlay);
                let hidden = !self.overlays.is_visible(overlay);
                let owned = self.hover.current().and_then(|f| f.kind.overlay()) == Some(overlay);
                if hidden && owned {
                    self.hover.clear();
                }
                self.rebuild();
                tracing::debug!(
                    overlay = %overlay,
                    visible = self.overlays.is_visible(overlay),
                    "overlay toggled"
                );
                true
            }
            MapAction::ToggleFullscreen => {
                self.display = self.display.toggled();
                tracing::debug!(mode = ?self.display, "display mode changed");
                true
            }
            MapAction::Escape => {
                let (mode, consumed) = self.display.escaped();
                self.display = mode;
                if consumed {
                    tracing::debug!("fullscreen dismissed");
                }
                consumed
            }
            MapAction::Pointer { hit, inside_canvas } => {
                let changed = self.hover.pointer_moved(hit, inside_canvas);
                if changed {
                    tracing::trace!(
                        hover = self.hover.current().map(|f| f.label.as_str()),
                        "hover changed"
                    );
                }
                changed
            }
            MapAction::ReplaceZones(model) => match self.replace_zones(*model) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("{e:#}");
                    false
                }
            },
        }
    }

    fn rebuild(&mut self) {
        self.scene = scene::build(&self.model, &self.overlays);
    }

    /// Draw the toolbar and the map. Normal mode lays out inside `ui` with a
    /// 16:9 map at full width. Fullscreen consumes Escape and covers the whole
    /// viewport on a foreground layer, whatever region the host handed in.
    pub fn show(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        if self.display.is_fullscreen() {
            let escaped =
                ui.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Escape));
            if escaped {
                self.apply(MapAction::Escape);
            }
        }

        if !self.display.is_fullscreen() {
            self.show_contents(ui, theme);
            return;
        }

        let ctx = ui.ctx().clone();
        let screen = ctx.screen_rect();
        egui::Area::new(ui.id().with("covermap_fullscreen"))
            .order(egui::Order::Foreground)
            .fixed_pos(screen.min)
            .show(&ctx, |ui| {
                ui.set_min_size(screen.size());
                ui.painter().rect_filled(screen, 0.0, theme.background);
                let inner = screen.shrink(FULLSCREEN_MARGIN);
                ui.scope_builder(egui::UiBuilder::new().max_rect(inner), |ui| {
                    self.show_contents(ui, theme);
                });
            });
    }

    fn show_contents(&mut self, ui: &mut egui::Ui, theme: &Theme) {
        let mut actions = Vec::new();
        self.toolbar(ui, theme, &mut actions);
        ui.add_space(8.0);

        let available = ui.available_rect_before_wrap();
        let map_rect = if self.display.is_fullscreen() {
            available
        } else {
            let height = (available.width() * MAP_ASPECT).min(available.height());
            egui::Rect::from_min_size(available.min, egui::vec2(available.width(), height))
        };

        let response = ui.allocate_rect(map_rect, egui::Sense::hover());
        let transform = CanvasTransform::fit(map_rect);
        self.last_transform = Some(transform);

        // The hover container is the whole map region, not a single shape.
        let pointer = response.hover_pos();
        let hit = pointer.and_then(|p| self.scene.hit_test(transform.to_logical(p)));
        actions.push(MapAction::Pointer {
            hit,
            inside_canvas: pointer.is_some(),
        });

        for action in actions {
            self.apply(action);
        }

        let painter = ui.painter_at(map_rect);
        painter.rect_filled(map_rect, 12.0, theme.card_background);
        paint_scene(&painter, &self.scene, &transform, theme);
        self.paint_tooltip(&painter, &transform, theme, map_rect);
    }

    fn toolbar(&self, ui: &mut egui::Ui, theme: &Theme, actions: &mut Vec<MapAction>) {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(&self.title)
                    .size(18.0)
                    .strong()
                    .color(theme.heading_color),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if self.display.is_fullscreen() {
                    "\u{2715} Exit fullscreen"
                } else {
                    "\u{26F6} Fullscreen"
                };
                let hint = if self.display.is_fullscreen() { "F / Esc" } else { "F" };
                if ui.button(label).on_hover_text(hint).clicked() {
                    actions.push(MapAction::ToggleFullscreen);
                }

                if let Some(badge) = &self.badge {
                    ui.label(
                        egui::RichText::new(badge)
                            .small()
                            .color(Theme::with_opacity(theme.foreground, 0.7)),
                    );
                }

                for overlay in Overlay::ALL.iter().rev() {
                    let active = self.overlays.is_visible(*overlay);
                    let response = ui
                        .selectable_label(active, overlay.display_name())
                        .on_hover_text(format!(
                            "Toggle {} ({})",
                            overlay.display_name(),
                            overlay.shortcut()
                        ));
                    if response.clicked() {
                        actions.push(MapAction::Toggle(*overlay));
                    }
                }
            });
        });
    }

    /// Tooltip hangs off the hovered feature's anchor and is painted on top of
    /// the map, so it never moves any layout.
    fn paint_tooltip(
        &self,
        painter: &egui::Painter,
        transform: &CanvasTransform,
        theme: &Theme,
        bounds: egui::Rect,
    ) {
        let Some(feature) = self.hover.current() else {
            return;
        };
        let Some(pos) = self.hover.tooltip_position(|p| transform.to_screen(p)) else {
            return;
        };

        let kind = painter.layout_no_wrap(
            feature.kind.display_name().to_uppercase(),
            egui::FontId::proportional(10.0),
            theme.accent,
        );
        let label = painter.layout_no_wrap(
            feature.label.clone(),
            egui::FontId::proportional(13.0),
            theme.tooltip_text,
        );

        let width = kind.rect.width().max(label.rect.width()) + TOOLTIP_PADDING * 2.0;
        let height = kind.rect.height() + label.rect.height() + TOOLTIP_PADDING * 2.0 + 2.0;
        let x = pos.x.min(bounds.right() - width).max(bounds.left());
        let y = pos.y.min(bounds.bottom() - height).max(bounds.top());
        let rect = egui::Rect::from_min_size(egui::pos2(x, y), egui::vec2(width, height));

        painter.rect_filled(rect, 6.0, theme.tooltip_background);
        painter.rect_stroke(
            rect,
            6.0,
            egui::Stroke::new(1.0, theme.card_border),
            egui::StrokeKind::Inside,
        );
        let text_pos = rect.min + egui::vec2(TOOLTIP_PADDING, TOOLTIP_PADDING);
        let kind_height = kind.rect.height();
        painter.galley(text_pos, kind, theme.accent);
        painter.galley(
            text_pos + egui::vec2(0.0, kind_height + 2.0),
            label,
            theme.tooltip_text,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hover::FeatureKind;
    use crate::scene::LayerKind;
    use crate::zone::Point;

    fn feature(kind: FeatureKind, label: &str) -> Feature {
        Feature::new(kind, Point::new(10.0, 10.0), label)
    }

    fn pointer(hit: Option<Feature>, inside_canvas: bool) -> MapAction {
        MapAction::Pointer { hit, inside_canvas }
    }

    #[test]
    fn test_defaults() {
        let map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        assert_eq!(map.display(), DisplayMode::Normal);
        assert_eq!(*map.overlays(), OverlayState::default());
        assert_eq!(map.model().cameras.len(), 4);
        assert!(map.hover().current().is_none());
    }

    #[test]
    fn test_fullscreen_then_escape() {
        let mut map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        assert!(map.apply(MapAction::ToggleFullscreen));
        assert!(map.display().is_fullscreen());
        assert!(map.apply(MapAction::Escape));
        assert_eq!(map.display(), DisplayMode::Normal);
        assert!(!map.apply(MapAction::Escape));
    }

    #[test]
    fn test_fullscreen_keeps_overlays_and_hover() {
        let mut map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        map.apply(MapAction::Toggle(Overlay::Queues));
        map.apply(pointer(Some(feature(FeatureKind::Aisle, "Aisle 1")), true));
        map.apply(MapAction::ToggleFullscreen);
        assert!(map.overlays().is_visible(Overlay::Queues));
        assert_eq!(map.hover().current().unwrap().label, "Aisle 1");
        map.apply(MapAction::Escape);
        assert!(map.overlays().is_visible(Overlay::Queues));
    }

    #[test]
    fn test_toggle_rebuilds_scene() {
        let mut map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        assert_eq!(map.scene().count(LayerKind::CameraFov), 4);
        map.apply(MapAction::Toggle(Overlay::Fov));
        assert_eq!(map.scene().count(LayerKind::CameraFov), 0);
        map.apply(MapAction::Toggle(Overlay::Queues));
        assert_eq!(map.scene().count(LayerKind::QueueIndicator), 4);
    }

    #[test]
    fn test_hover_last_write_wins_then_canvas_leave_clears() {
        let mut map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        map.apply(pointer(Some(feature(FeatureKind::Aisle, "A")), true));
        map.apply(pointer(None, true));
        map.apply(pointer(Some(feature(FeatureKind::Camera, "B")), true));
        assert_eq!(map.hover().current().unwrap().label, "B");
        map.apply(pointer(None, false));
        assert!(map.hover().current().is_none());
    }

    #[test]
    fn test_replace_zones_clears_hover() {
        let mut map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        map.apply(pointer(Some(feature(FeatureKind::Aisle, "A")), true));
        let mut model = ZoneModel::default_layout();
        model.cameras.truncate(1);
        assert!(map.apply(MapAction::ReplaceZones(Box::new(model))));
        assert!(map.hover().current().is_none());
        assert_eq!(map.scene().count(LayerKind::CameraFov), 1);
    }

    #[test]
    fn test_start_fullscreen_and_custom_overlays() {
        let map = CoverageMap::new(CoverageMapOptions {
            start_fullscreen: true,
            overlays: OverlayState::from_visible(&[Overlay::Alerts]),
            ..Default::default()
        })
        .unwrap();
        assert!(map.display().is_fullscreen());
        assert_eq!(map.scene().count(LayerKind::CameraFov), 0);
        assert_eq!(map.scene().count(LayerKind::Alert), 3);
    }

    fn raw_input(events: Vec<egui::Event>) -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(1280.0, 800.0),
            )),
            events,
            ..Default::default()
        }
    }

    fn run_frame(ctx: &egui::Context, map: &mut CoverageMap, events: Vec<egui::Event>) {
        let theme = Theme::dark();
        let _ = ctx.run(raw_input(events), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| map.show(ui, &theme));
        });
    }

    fn escape_pressed() -> egui::Event {
        egui::Event::Key {
            key: egui::Key::Escape,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers::NONE,
        }
    }

    /// One frame with the map in a small host region. Returns whether the
    /// host still saw Escape after the map drew.
    fn run_embedded_frame(
        ctx: &egui::Context,
        map: &mut CoverageMap,
        events: Vec<egui::Event>,
    ) -> bool {
        let theme = Theme::dark();
        let mut host_saw_escape = false;
        let _ = ctx.run(raw_input(events), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.allocate_ui(egui::vec2(320.0, 240.0), |ui| map.show(ui, &theme));
                host_saw_escape = ui.input(|i| i.key_pressed(egui::Key::Escape));
            });
        });
        host_saw_escape
    }

    #[test]
    fn test_pointer_over_canvas_drives_hover() {
        let ctx = egui::Context::default();
        let mut map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        run_frame(&ctx, &mut map, Vec::new());

        let transform = map.last_transform().unwrap();
        // Center of aisle 6, clear of cameras and alerts.
        let target = transform.to_screen(Point::new(390.0, 208.0));
        for _ in 0..3 {
            run_frame(&ctx, &mut map, vec![egui::Event::PointerMoved(target)]);
        }
        let hovered = map.hover().current().unwrap();
        assert_eq!(hovered.kind, FeatureKind::Aisle);
        assert_eq!(hovered.label, "Aisle 6");

        // Empty floor inside the canvas keeps the tooltip.
        let empty = transform.to_screen(Point::new(700.0, 380.0));
        for _ in 0..2 {
            run_frame(&ctx, &mut map, vec![egui::Event::PointerMoved(empty)]);
        }
        assert_eq!(map.hover().current().unwrap().label, "Aisle 6");

        for _ in 0..2 {
            run_frame(&ctx, &mut map, vec![egui::Event::PointerGone]);
        }
        assert!(map.hover().current().is_none());
    }

    #[test]
    fn test_fullscreen_map_is_larger() {
        let ctx = egui::Context::default();
        let mut map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        run_frame(&ctx, &mut map, Vec::new());
        let normal = map.last_transform().unwrap().canvas_rect();

        map.apply(MapAction::ToggleFullscreen);
        run_frame(&ctx, &mut map, Vec::new());
        let full = map.last_transform().unwrap().canvas_rect();

        // 16:9 region is shorter than the panel, so fullscreen draws larger.
        assert!(full.height() > normal.height());
    }

    #[test]
    fn test_embedded_fullscreen_handles_escape() {
        let ctx = egui::Context::default();
        let mut map = CoverageMap::new(CoverageMapOptions {
            start_fullscreen: true,
            ..Default::default()
        })
        .unwrap();
        run_embedded_frame(&ctx, &mut map, Vec::new());

        let host_saw_escape = run_embedded_frame(&ctx, &mut map, vec![escape_pressed()]);
        assert_eq!(map.display(), DisplayMode::Normal);
        assert!(!host_saw_escape);

        // Back in normal mode the key is left for the host.
        let host_saw_escape = run_embedded_frame(&ctx, &mut map, vec![escape_pressed()]);
        assert_eq!(map.display(), DisplayMode::Normal);
        assert!(host_saw_escape);
    }

    #[test]
    fn test_embedded_fullscreen_covers_viewport() {
        let ctx = egui::Context::default();
        let mut map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        run_embedded_frame(&ctx, &mut map, Vec::new());
        let embedded = map.last_transform().unwrap().canvas_rect();
        assert!(embedded.width() < 640.0);

        map.apply(MapAction::ToggleFullscreen);
        run_embedded_frame(&ctx, &mut map, Vec::new());
        let full = map.last_transform().unwrap().canvas_rect();
        assert!(full.width() > 1000.0);
    }

    #[test]
    fn test_invalid_model_rejected_at_construction() {
        let mut model = ZoneModel::default_layout();
        model.aisles[0].width = f32::NAN;
        let result = CoverageMap::new(CoverageMapOptions {
            zones: Some(model),
            ..Default::default()
        });
        assert!(result.is_err());

        let mut model = ZoneModel::default_layout();
        model.cameras[1].label = String::new();
        let result = CoverageMap::new(CoverageMapOptions {
            zones: Some(model),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_replacement_keeps_current_model() {
        let mut map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        map.apply(pointer(Some(feature(FeatureKind::Aisle, "A")), true));

        let mut model = ZoneModel::default_layout();
        model.cameras.truncate(1);
        model.cameras[0].x = f32::INFINITY;
        assert!(map.replace_zones(model.clone()).is_err());
        assert!(!map.apply(MapAction::ReplaceZones(Box::new(model))));

        assert_eq!(map.model().cameras.len(), 4);
        assert_eq!(map.scene().count(LayerKind::CameraFov), 4);
        assert_eq!(map.hover().current().unwrap().label, "A");
    }

    #[test]
    fn test_hiding_overlay_clears_its_hover_target() {
        let mut map = CoverageMap::new(CoverageMapOptions::default()).unwrap();
        map.apply(pointer(Some(feature(FeatureKind::Camera, "C-02")), true));
        map.apply(MapAction::Toggle(Overlay::Fov));
        map.apply(pointer(None, true));
        assert!(map.hover().current().is_none());

        // Floor features stay inspectable when an overlay goes away.
        map.apply(pointer(Some(feature(FeatureKind::Aisle, "Aisle 1")), true));
        map.apply(MapAction::Toggle(Overlay::Alerts));
        assert_eq!(map.hover().current().unwrap().label, "Aisle 1");

        // Showing an overlay never clears.
        map.apply(pointer(Some(feature(FeatureKind::Alert, "Voided txn")), true));
        map.apply(MapAction::Toggle(Overlay::Fov));
        assert_eq!(map.hover().current().unwrap().label, "Voided txn");
    }
}
