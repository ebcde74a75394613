use eframe::egui;
use std::path::PathBuf;
use std::time::Instant;

use covermap::map::{CoverageMap, CoverageMapOptions, MapAction};
use covermap::overlay::Overlay;
use covermap::theme::Theme;
use covermap::zone::ZoneModel;

use crate::cli::{self, ViewArgs};
use crate::config::Config;
use crate::watch::{WatchEvent, ZoneWatcher};

const PANEL_MARGIN: f32 = 24.0;

pub struct LaunchOptions {
    pub zones: Option<PathBuf>,
    pub windowed: bool,
    pub fullscreen_map: bool,
    pub watch: bool,
    pub view: ViewArgs,
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let duration = 1.5;
        let fade_start = 1.0;
        if elapsed < fade_start {
            1.0
        } else if elapsed < duration {
            1.0 - (elapsed - fade_start) / (duration - fade_start)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= 1.5
    }
}

struct CoverageApp {
    map: CoverageMap,
    theme: Theme,
    show_hud: bool,
    toast: Option<Toast>,
    last_esc: Option<Instant>,
    watcher: Option<ZoneWatcher>,
}

impl CoverageApp {
    fn new(map: CoverageMap, theme: Theme, watcher: Option<ZoneWatcher>) -> Self {
        Self {
            map,
            theme,
            show_hud: false,
            toast: None,
            last_esc: None,
            watcher,
        }
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.theme = self.theme.toggled();
        apply_visuals(ctx, &self.theme);
        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
    }

    fn toggle_overlay(&mut self, overlay: Overlay) {
        self.map.apply(MapAction::Toggle(overlay));
        let state = if self.map.overlays().is_visible(overlay) {
            "on"
        } else {
            "off"
        };
        self.toast = Some(Toast::new(format!("{}: {state}", overlay.display_name())));
    }

    /// Pick up a changed zone file. A file that fails to load leaves the
    /// current map untouched.
    fn poll_watcher(&mut self) {
        let Some(watcher) = &self.watcher else {
            return;
        };
        let Some(event) = watcher.poll() else {
            return;
        };

        match event {
            WatchEvent::Changed => match ZoneModel::load_from(watcher.path())
                .and_then(|model| self.map.replace_zones(model))
            {
                Ok(()) => {
                    self.toast = Some(Toast::new("Zones reloaded".to_string()));
                }
                Err(e) => {
                    tracing::warn!("zone reload failed: {e:#}");
                    self.toast = Some(Toast::new(format!("Reload failed: {e}")));
                }
            },
            WatchEvent::Failed(e) => {
                tracing::warn!("zone watcher error: {e}");
                self.toast = Some(Toast::new(format!("Watcher error: {e}")));
            }
        }
    }

    /// Escape that the map did not consume: first press arms, a second within
    /// a second quits.
    fn escape_to_quit(&mut self, ctx: &egui::Context) {
        if let Some(last) = self.last_esc {
            if last.elapsed().as_secs_f32() < 1.0 {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                return;
            }
        }
        self.last_esc = Some(Instant::now());
        self.toast = Some(Toast::new("Press Esc again to exit".to_string()));
    }

    fn draw_toast(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(toast) = &self.toast else {
            return;
        };
        let opacity = toast.opacity();
        if opacity <= 0.0 {
            return;
        }
        let toast_color = Theme::with_opacity(self.theme.foreground, opacity * 0.9);
        let toast_bg = Theme::with_opacity(self.theme.tooltip_background, opacity * 0.9);
        let galley = painter.layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(16.0),
            toast_color,
        );
        let padding = 12.0;
        let toast_rect = egui::Rect::from_min_size(
            egui::pos2(
                rect.center().x - galley.rect.width() / 2.0 - padding,
                rect.bottom() - 64.0,
            ),
            egui::vec2(
                galley.rect.width() + padding * 2.0,
                galley.rect.height() + padding * 2.0,
            ),
        );
        painter.rect_filled(toast_rect, 8.0, toast_bg);
        let text_pos = egui::pos2(toast_rect.left() + padding, toast_rect.top() + padding);
        painter.galley(text_pos, galley, toast_color);
        painter.ctx().request_repaint();
    }

    fn draw_footer(&self, ui: &mut egui::Ui) {
        let summary = self.map.model().summary();
        let mut text = format!(
            "{} cameras \u{00b7} {} active alerts \u{00b7} {} checkout lanes",
            summary.cameras,
            summary.alerts_low + summary.alerts_med + summary.alerts_high,
            summary.checkout_lanes
        );
        if let Some(watcher) = &self.watcher {
            let name = watcher
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            text.push_str(&format!(" \u{00b7} watching {name}"));
        }
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(text)
                    .small()
                    .color(Theme::with_opacity(self.theme.foreground, 0.7)),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    egui::RichText::new("H for shortcuts")
                        .small()
                        .color(Theme::with_opacity(self.theme.foreground, 0.5)),
                );
            });
        });
    }
}

impl eframe::App for CoverageApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_watcher();

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut actions: Vec<MapAction> = Vec::new();
        let mut toggle_theme = false;

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }

            if i.key_pressed(egui::Key::F) {
                actions.push(MapAction::ToggleFullscreen);
            }
            if i.key_pressed(egui::Key::D) {
                toggle_theme = true;
            }
            if i.key_pressed(egui::Key::H) {
                self.show_hud = !self.show_hud;
            }

            let overlay_keys = [
                (egui::Key::Num1, Overlay::Fov),
                (egui::Key::Num2, Overlay::Alerts),
                (egui::Key::Num3, Overlay::Patrols),
                (egui::Key::Num4, Overlay::Queues),
            ];
            for (key, overlay) in overlay_keys {
                if i.key_pressed(key) {
                    actions.push(MapAction::Toggle(overlay));
                }
            }
        });

        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
        if toggle_theme {
            self.toggle_theme(ctx);
        }
        for action in actions {
            match action {
                MapAction::Toggle(overlay) => self.toggle_overlay(overlay),
                other => {
                    self.map.apply(other);
                }
            }
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        let bg = self.theme.background;
        let fullscreen = self.map.display().is_fullscreen();
        let margin = if fullscreen { 8.0 } else { PANEL_MARGIN };

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(margin))
            .show(ctx, |ui| {
                if fullscreen {
                    self.map.show(ui, &self.theme);
                } else {
                    egui::Frame::new()
                        .fill(self.theme.card_background)
                        .stroke(egui::Stroke::new(1.0, self.theme.card_border))
                        .corner_radius(12.0)
                        .inner_margin(16.0)
                        .show(ui, |ui| {
                            self.map.show(ui, &self.theme);
                            self.draw_footer(ui);
                        });
                }
            });

        // The map takes Escape while fullscreen; what is left is ours.
        if fullscreen && !self.map.display().is_fullscreen() {
            self.last_esc = None;
        } else if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.escape_to_quit(ctx);
        }

        // Above the fullscreen map layer.
        let screen = ctx.screen_rect();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Tooltip,
            egui::Id::new("covermap_hud"),
        ));
        self.draw_toast(&painter, screen);
        if self.show_hud {
            draw_hud(&painter, &self.theme, screen);
        }
    }
}

fn apply_visuals(ctx: &egui::Context, theme: &Theme) {
    let mut visuals = if theme.is_dark() {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };
    visuals.selection.bg_fill = theme.accent;
    visuals.panel_fill = theme.background;
    ctx.set_visuals(visuals);
}

fn draw_hud(painter: &egui::Painter, theme: &Theme, rect: egui::Rect) {
    let shortcuts = [
        ("F", "Toggle map fullscreen"),
        ("Esc", "Exit fullscreen / \u{00d7}2 quit"),
        ("1", "Camera FOV overlay"),
        ("2", "Alerts overlay"),
        ("3", "Patrol overlay"),
        ("4", "Queues overlay"),
        ("D", "Toggle theme"),
        ("H", "Toggle this HUD"),
        ("Q", "Quit"),
    ];

    let bg = Theme::with_opacity(theme.tooltip_background, 0.95);
    let text_color = Theme::with_opacity(theme.foreground, 0.9);
    let key_color = Theme::with_opacity(theme.accent, 0.9);

    let padding = 24.0;
    let line_height = 28.0;
    let hud_height = shortcuts.len() as f32 * line_height + padding * 2.0 + 40.0;
    let hud_width = 340.0;

    let hud_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(hud_width, hud_height));

    painter.rect_filled(hud_rect, 12.0, bg);

    let title_galley = painter.layout_no_wrap(
        "Keyboard Shortcuts".to_string(),
        egui::FontId::proportional(20.0),
        Theme::with_opacity(theme.heading_color, 0.9),
    );
    let title_pos = egui::pos2(hud_rect.left() + padding, hud_rect.top() + padding);
    painter.galley(title_pos, title_galley, text_color);

    let mut y = hud_rect.top() + padding + 40.0;

    for (key, desc) in &shortcuts {
        let key_galley = painter.layout_no_wrap(
            key.to_string(),
            egui::FontId::monospace(15.0),
            key_color,
        );
        painter
            .galley(egui::pos2(hud_rect.left() + padding, y), key_galley, key_color);

        let desc_galley = painter.layout_no_wrap(
            desc.to_string(),
            egui::FontId::proportional(15.0),
            text_color,
        );
        painter.galley(
            egui::pos2(hud_rect.left() + padding + 80.0, y),
            desc_galley,
            text_color,
        );

        y += line_height;
    }
}

pub fn run(options: LaunchOptions) -> anyhow::Result<()> {
    let config = Config::load_or_default();
    let zones_path = options
        .zones
        .clone()
        .or_else(|| config.zones().map(PathBuf::from));
    let model = cli::resolve_zones(zones_path.as_deref(), &config)?;

    if options.watch && zones_path.is_none() {
        anyhow::bail!("--watch needs a zone file (argument or defaults.zones)");
    }

    let overlays = options.view.overlays(&config);
    let theme = options.view.theme(&config);
    let start_fullscreen = options.fullscreen_map || config.start_fullscreen();

    let title = match &zones_path {
        Some(path) => format!(
            "covermap \u{2014} {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        ),
        None => "covermap".to_string(),
    };

    tracing::debug!(
        overlays = ?overlays.visible(),
        theme = %theme.name,
        start_fullscreen,
        "launching viewer"
    );

    let viewport = if options.windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let watch_path = if options.watch { zones_path } else { None };

    let map = CoverageMap::new(CoverageMapOptions {
        zones: Some(model),
        overlays,
        start_fullscreen,
        ..Default::default()
    })?;

    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| {
            apply_visuals(&cc.egui_ctx, &theme);
            let watcher = match watch_path {
                Some(path) => Some(ZoneWatcher::start(&path, cc.egui_ctx.clone())?),
                None => None,
            };
            Ok(Box::new(CoverageApp::new(map, theme, watcher)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
