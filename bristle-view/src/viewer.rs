//! Interactive bristle-stroke viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the stroke layer (a
//! [`Canvas`]), the simulation context and configuration, and implements
//! [`eframe::App`] to paint new strokes over time and display the result.

use std::path::PathBuf;

use bristle_core::{
    canvas::Canvas,
    config::Config,
    context::SimContext,
    error::CanvasError,
    sketch::{self, PaintedStroke},
};
use eframe::App;
use glam::Vec2;
use tracing::{info, warn};

/// Side length used before the first frame reports the real panel size.
const INITIAL_SIDE: u32 = 400;

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The stroke layer: a transparent [`Canvas`] that strokes accumulate on.
/// - The simulation: [`SimContext`] seeded from `seed`, and [`Config`].
/// - UI state (timing, texture upload, status line).
///
/// The typical per-frame update is:
/// 1. Handle UI interactions and keep the canvas square and sized to the
///    central panel (a resize clears it and reseeds).
/// 2. If `running` is `true` and enough time has passed, call
///    [`Viewer::step_once`].
/// 3. Upload the canvas if it changed and draw it over a light background.
///
/// ### Fields
/// - `canvas` - Stroke layer; strokes mix with what is already on it.
/// - `ctx` - RNG and noise context all strokes draw from.
/// - `cfg` - Brush, trace and sketch configuration.
/// - `seed` - Seed `ctx` is rebuilt from on reset and resize.
///
/// - `running` - Whether strokes are painted automatically.
/// - `show_last_start` - Whether to mark where the last stroke began.
/// - `last_stroke` - Summary of the most recently painted stroke.
/// - `strokes` - Number of strokes on the canvas.
///
/// - `texture` - GPU copy of the canvas; `dirty` marks it stale.
/// - `step_interval` - Target time between automatic strokes (seconds).
/// - `last_step_time` - Time stamp of the last stroke (egui time).
/// - `last_step_dt` - Actual time delta between the last two strokes.
/// - `png_path` - Where "Save PNG" writes.
/// - `status` - Message shown in the status bar.
pub struct Viewer {
    canvas: Canvas,
    ctx: SimContext,
    cfg: Config,
    seed: u64,

    running: bool,
    show_last_start: bool,
    last_stroke: Option<PaintedStroke>,
    strokes: usize,

    texture: Option<egui::TextureHandle>,
    dirty: bool,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,

    png_path: PathBuf,
    status: String,
}

impl Viewer {
    /// Creates a viewer with an empty canvas.
    ///
    /// ### Parameters
    /// - `cfg` - Validated configuration.
    /// - `seed` - Seed for every stroke's randomness.
    ///
    /// ### Returns
    /// A fully-initialized [`Viewer`] ready to be passed to `eframe::run_native`.
    pub fn new(cfg: Config, seed: u64) -> Result<Self, CanvasError> {
        Ok(Self {
            canvas: Canvas::new(INITIAL_SIDE, INITIAL_SIDE)?,
            ctx: SimContext::seeded(seed),
            cfg,
            seed,
            running: true,
            show_last_start: false,
            last_stroke: None,
            strokes: 0,
            texture: None,
            dirty: true,
            step_interval: 1.0 / 60.0,
            last_step_time: 0.0,
            last_step_dt: 0.0,
            png_path: PathBuf::from("bristle-strokes.png"),
            status: String::new(),
        })
    }

    /// Clears the canvas and restarts the random sequence from `seed`.
    ///
    /// Keeps the configuration, canvas size and run state.
    fn reset(&mut self) {
        self.ctx = SimContext::seeded(self.seed);
        self.clear();
    }

    /// Clears the canvas without touching the random sequence.
    fn clear(&mut self) {
        self.canvas.clear();
        self.last_stroke = None;
        self.strokes = 0;
        self.dirty = true;
    }

    /// Recreates the canvas at a new size and density, then resets.
    fn resize_canvas(&mut self, side: u32, density: u32) {
        match Canvas::with_density(side, side, density) {
            Ok(canvas) => {
                info!(side, density, "resized canvas");
                self.canvas = canvas;
                self.reset();
            }
            Err(e) => warn!("keeping current canvas: {e}"),
        }
    }

    /// Paints one complete stroke (color precompute and replay) onto the canvas.
    fn step_once(&mut self) {
        match sketch::paint_random_trace(&mut self.ctx, &mut self.canvas, &self.cfg) {
            Ok(stroke) => {
                self.last_stroke = Some(stroke);
                self.strokes += 1;
                self.dirty = true;
            }
            Err(e) => {
                warn!("stroke skipped: {e}");
                self.status = e.to_string();
            }
        }
    }

    fn save_png(&mut self) {
        self.status = match self.canvas.save_png(&self.png_path) {
            Ok(()) => format!("saved {}", self.png_path.display()),
            Err(e) => {
                warn!("{e}");
                e.to_string()
            }
        };
    }

    /// Converts a canvas position to screen-space inside `rect`.
    fn canvas_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let scale = rect.width() / self.canvas.width() as f32;
        egui::pos2(rect.min.x + p.x * scale, rect.min.y + p.y * scale)
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, seed, export).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.0..=2.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                ui.add(egui::DragValue::new(&mut self.seed).prefix("seed = "));

                ui.separator();
                if ui.button("Save PNG").clicked() {
                    self.save_png();
                }
                ui.checkbox(&mut self.show_last_start, "Mark last start");
            });
        });
    }

    /// Builds the bottom status bar (timing, stroke count, canvas size).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("strokes = {}", self.strokes));
                if let Some(stroke) = &self.last_stroke {
                    ui.label(format!("bristles = {}", stroke.n_bristles));
                }
                ui.label(format!(
                    "canvas = {}×{} @{}x",
                    self.canvas.width(),
                    self.canvas.height(),
                    self.canvas.density()
                ));
                if !self.status.is_empty() {
                    ui.separator();
                    ui.label(&self.status);
                }
            });
        });
    }

    /// Builds the right-hand configuration panel.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Stroke");
                Self::labeled_drag_f32(
                    ui,
                    "brush_size:",
                    &mut self.cfg.sketch.brush_size,
                    1.0..=200.0,
                    0.5,
                );
                Self::labeled_drag_usize(ui, "n_steps:", &mut self.cfg.sketch.n_steps, 1..=1000, 1.0);
                Self::labeled_drag_f32(ui, "speed:", &mut self.cfg.sketch.speed, 0.0..=20.0, 0.1);
                Self::labeled_drag_f32(
                    ui,
                    "heading_noise_scale:",
                    &mut self.cfg.sketch.heading_noise_scale,
                    0.0..=0.2,
                    0.001,
                );

                ui.separator();
                ui.label("Bristles");
                Self::labeled_drag_f32(
                    ui,
                    "max_bristle_length:",
                    &mut self.cfg.brush.max_bristle_length,
                    0.0..=60.0,
                    0.5,
                );
                Self::labeled_drag_f32(
                    ui,
                    "max_bristle_thickness:",
                    &mut self.cfg.brush.max_bristle_thickness,
                    0.1..=20.0,
                    0.1,
                );
                Self::labeled_drag_f32(
                    ui,
                    "max_horizontal_noise:",
                    &mut self.cfg.brush.max_horizontal_noise,
                    0.0..=40.0,
                    0.2,
                );
                Self::labeled_drag_f32(
                    ui,
                    "noise_speed:",
                    &mut self.cfg.brush.noise_speed,
                    0.0..=1.0,
                    0.005,
                );

                ui.separator();
                ui.label("Paint");
                Self::labeled_drag_f32(
                    ui,
                    "brightness_change:",
                    &mut self.cfg.trace.brightness_relative_change,
                    0.0..=1.0,
                    0.01,
                );
                Self::labeled_drag_usize(
                    ui,
                    "mix_starting_step:",
                    &mut self.cfg.trace.mix_starting_step,
                    0..=200,
                    1.0,
                );
                Self::labeled_drag_f32(
                    ui,
                    "mix_strength:",
                    &mut self.cfg.trace.mix_strength,
                    0.0..=1.0,
                    0.005,
                );

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = Config::default();
                }
            });
    }

    /// Builds the central panel where the stroke layer is shown.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let side = available.x.min(available.y).floor().max(1.0) as u32;
            let density = ctx.pixels_per_point().round().max(1.0) as u32;
            if side != self.canvas.width() || density != self.canvas.density() {
                self.resize_canvas(side, density);
            }

            let (response, painter) =
                ui.allocate_painter(egui::vec2(side as f32, side as f32), egui::Sense::hover());
            let rect = response.rect;

            // Auto-run: one full stroke per elapsed interval.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }

            if self.dirty || self.texture.is_none() {
                let size = [
                    self.canvas.pixmap().width() as usize,
                    self.canvas.pixmap().height() as usize,
                ];
                let image = egui::ColorImage::from_rgba_unmultiplied(size, &self.canvas.to_rgba8());
                match &mut self.texture {
                    Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                    None => {
                        self.texture =
                            Some(ctx.load_texture("strokes", image, egui::TextureOptions::LINEAR));
                    }
                }
                self.dirty = false;
            }

            painter.rect_filled(rect, 0.0, egui::Color32::from_gray(230));
            if let Some(texture) = &self.texture {
                let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                painter.image(texture.id(), rect, uv, egui::Color32::WHITE);
            }

            if self.show_last_start
                && let Some(stroke) = &self.last_stroke
            {
                let p = self.canvas_to_screen(stroke.start, rect);
                painter.circle_stroke(p, 4.0, egui::Stroke::new(1.5, egui::Color32::YELLOW));
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    ///
    /// This method:
    /// - Renders the top control bar and status bar.
    /// - Renders the config side panel.
    /// - Paints due strokes and draws the canvas.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
