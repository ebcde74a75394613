use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use eframe::egui;

use covermap::render::{painter, svg};
use covermap::scene::{self, CanvasTransform, Scene};
use covermap::theme::Theme;

use crate::cli::{self, ExportFormat, ViewArgs};
use crate::config::Config;

pub struct ExportRequest {
    pub zones: Option<PathBuf>,
    pub output: PathBuf,
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub view: ViewArgs,
    pub quiet: bool,
}

pub fn run(request: ExportRequest) -> anyhow::Result<()> {
    if request.width == 0 || request.height == 0 {
        anyhow::bail!(
            "Export size must be non-zero, got {}x{}",
            request.width,
            request.height
        );
    }

    let config = Config::load_or_default();
    let model = cli::resolve_zones(request.zones.as_deref(), &config)?;
    let overlays = request.view.overlays(&config);
    let theme = request.view.theme(&config);
    let scene = scene::build(&model, &overlays);

    if let Some(parent) = request.output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    tracing::info!(
        output = %request.output.display(),
        format = ?request.format,
        width = request.width,
        height = request.height,
        overlays = ?overlays.visible(),
        "exporting coverage map"
    );

    match request.format {
        ExportFormat::Svg => write_svg(&scene, &theme, &request)?,
        ExportFormat::Png => write_png(scene, theme, &request)?,
    }

    if !request.quiet {
        println!(
            "{} {} ({}x{})",
            "Exported".green().bold(),
            request.output.display(),
            request.width,
            request.height
        );
    }
    Ok(())
}

fn write_svg(scene: &Scene, theme: &Theme, request: &ExportRequest) -> anyhow::Result<()> {
    let document = svg::render_svg(scene, theme, Some((request.width, request.height)))?;
    std::fs::write(&request.output, document)
        .with_context(|| format!("Failed to write {}", request.output.display()))
}

/// PNG goes through a borderless window: paint one frame, grab it with a
/// viewport screenshot, then close.
struct ExportApp {
    scene: Scene,
    theme: Theme,
    output: PathBuf,
    size: (u32, u32),
    screenshot_requested: bool,
    result: std::sync::mpsc::Sender<anyhow::Result<()>>,
    done: bool,
}

impl eframe::App for ExportApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.done {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        let screenshot = ctx.input(|i| {
            i.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(image.clone()),
                _ => None,
            })
        });

        if let Some(image) = screenshot {
            let saved = save_color_image(&image, &self.output, self.size);
            let _ = self.result.send(saved);
            self.done = true;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        let bg = self.theme.background;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                ui.painter().rect_filled(rect, 0.0, bg);
                let transform = CanvasTransform::fit(rect);
                painter::paint_scene(ui.painter(), &self.scene, &transform, &self.theme);
            });

        // Request screenshot after rendering (will arrive next frame)
        if !self.screenshot_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot(egui::UserData::default()));
            self.screenshot_requested = true;
        }

        ctx.request_repaint();
    }
}

/// Save a captured frame, resampling when the display scale made the
/// capture larger or smaller than requested.
fn save_color_image(image: &egui::ColorImage, path: &Path, size: (u32, u32)) -> anyhow::Result<()> {
    let width = image.width() as u32;
    let height = image.height() as u32;
    let pixels: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|c| {
            let [r, g, b, a] = c.to_srgba_unmultiplied();
            [r, g, b, a]
        })
        .collect();

    let buffer = image::RgbaImage::from_raw(width, height, pixels)
        .ok_or_else(|| anyhow::anyhow!("Screenshot buffer has unexpected size"))?;
    let buffer = if (width, height) == size {
        buffer
    } else {
        tracing::debug!(
            captured = ?(width, height),
            requested = ?size,
            "resampling screenshot"
        );
        image::imageops::resize(&buffer, size.0, size.1, image::imageops::FilterType::Lanczos3)
    };

    buffer
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to save {}", path.display()))
}

fn write_png(scene: Scene, theme: Theme, request: &ExportRequest) -> anyhow::Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let title = "covermap export";

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([request.width as f32, request.height as f32])
        .with_title(title)
        .with_decorations(false);

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let output = request.output.clone();
    let size = (request.width, request.height);
    eframe::run_native(
        title,
        options,
        Box::new(move |_cc| {
            Ok(Box::new(ExportApp {
                scene,
                theme,
                output,
                size,
                screenshot_requested: false,
                result: tx,
                done: false,
            }))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    rx.try_recv()
        .map_err(|_| anyhow::anyhow!("Export window closed before the map was captured"))?
}
