//! Native viewer using egui
//!
//! Steps the session one batch per frame and draws the render log with
//! egui_plot. Every control maps onto a `commands::Action`.

use eframe::egui;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::commands::{Action, Outcome};
use crate::config::Config;
use crate::curve::{view_bounds, AxisInfluence, CurvePoint, Dimension, Projection, Rgb, ShapeInfluence, ZOOM_RANGE};
use crate::playback::{PlaybackState, PointBatch};
use crate::session::Session;
use crate::sink::export::{export_png, ExportOptions};
use crate::sink::persist::save_snapshot;
use crate::sink::{RenderSink, RenderView};

/// Run the native viewer
pub fn run_viewer(config: Config) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 700.0])
            .with_title("Spiral Shapes"),
        ..Default::default()
    };

    eframe::run_native(
        "Spiral Shapes",
        options,
        Box::new(|cc| Ok(Box::new(ShapesApp::new(cc, config)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

/// Remembers the newest point for the trace marker
#[derive(Default)]
struct ViewerSink {
    head: Option<CurvePoint>,
}

impl RenderSink for ViewerSink {
    fn draw_batch(&mut self, batch: &PointBatch, _view: &RenderView<'_>) {
        self.head = batch.points.last().copied();
    }

    fn erase_batch(&mut self, _batch: &PointBatch) {
        self.head = None;
    }

    fn clear(&mut self) {
        self.head = None;
    }
}

struct ShapesApp {
    session: Session,
    sink: ViewerSink,
    frame_delay: Duration,
    last_step: Instant,
    // View state
    zoom: f64,
    projection: Projection,
    // File paths
    snapshot_path: String,
    export_path: String,
    status: String,
}

impl ShapesApp {
    fn new(_cc: &eframe::CreationContext<'_>, config: Config) -> Self {
        let mut session = Session::new(&config);
        session.next_pattern();

        Self {
            session,
            sink: ViewerSink::default(),
            frame_delay: Duration::from_millis(config.frame_delay_ms),
            last_step: Instant::now(),
            zoom: 1.0,
            projection: Projection::default(),
            snapshot_path: "shapes_snapshot.json".to_string(),
            export_path: "shapes.png".to_string(),
            status: String::new(),
        }
    }

    fn apply(&mut self, action: Action) {
        if action == Action::Reset {
            self.session.reset_into(&mut self.sink);
            self.status = "Reset".to_string();
            return;
        }
        match self.session.dispatch(action) {
            Outcome::Undone(batch) => self.sink.erase_batch(&batch),
            Outcome::Restarted => self.sink.clear(),
            Outcome::Ignored => info!("{} ignored", action.name()),
            _ => {}
        }
    }

    fn save(&mut self) {
        let path = PathBuf::from(&self.snapshot_path);
        self.status = match save_snapshot(&self.session.snapshot(), &path) {
            Ok(()) => format!("Saved {:?}", path),
            Err(e) => {
                crate::log_error!(e, path = ?path);
                format!("Save failed: {}", e)
            }
        };
    }

    fn load(&mut self) {
        let path = PathBuf::from(&self.snapshot_path);
        self.status = match self.session.load_from(&path) {
            Ok(()) => {
                self.sink.clear();
                format!("Loaded {:?}", path)
            }
            Err(e) => {
                crate::log_error!(e, path = ?path);
                format!("Load failed: {}", e)
            }
        };
    }

    fn export(&mut self) {
        let path = PathBuf::from(&self.export_path);
        let options = ExportOptions {
            zoom: self.zoom,
            projection: self.projection,
            ..ExportOptions::default()
        };
        let playback = self.session.playback();
        let result = export_png(
            &path,
            playback.render_log(),
            playback.curve(),
            &self.session.view(),
            &options,
        );
        self.status = match result {
            Ok(()) => format!("Exported {:?}", path),
            Err(e) => {
                warn!("Export to {:?} failed: {}", path, e);
                format!("Export failed: {}", e)
            }
        };
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        let state = self.session.state().clone();

        ui.horizontal_wrapped(|ui| {
            if ui.button("NEXT PATTERN").clicked() {
                self.apply(Action::NextPattern);
            }
            if ui.selectable_label(state.lock_pattern, "LOCK PATTERN").clicked() {
                self.apply(Action::ToggleLock);
            }
            if ui.selectable_label(state.trace, "TRACE").clicked() {
                self.apply(Action::ToggleTrace);
            }
            let trail = if state.data_points { "Line Trail" } else { "Dot Trail" };
            if ui.button(trail).clicked() {
                self.apply(Action::ToggleDataPoints);
            }
            let playing = if state.playing { "STOP" } else { "RESUME" };
            if ui.button(playing).clicked() {
                self.apply(Action::TogglePlaying);
            }
            if ui.button("UNDO").clicked() {
                self.apply(Action::Undo);
            }
            if self.palette_swatch(ui).clicked() {
                self.apply(Action::ShufflePalette);
            }
            if ui.button("RESET").clicked() {
                self.apply(Action::Reset);
            }
            let switch = match state.dimension {
                Dimension::Two => "Switch to 3D",
                Dimension::Three => "Switch to 2D",
            };
            if ui.button(switch).clicked() {
                self.apply(Action::ToggleDimension);
            }
        });

        ui.horizontal_wrapped(|ui| {
            ui.label("Shape:");
            for shape in [ShapeInfluence::Square, ShapeInfluence::Circle, ShapeInfluence::Triangle] {
                if ui.radio(state.shape == shape, shape.name()).clicked() {
                    self.apply(Action::Shape(shape));
                }
            }
            ui.separator();
            ui.label("Axis:");
            for axis in AxisInfluence::ALL {
                if ui.radio(state.axis == axis, axis.name()).clicked() {
                    self.apply(Action::Axis(axis));
                }
            }
            ui.separator();
            let mut dark = state.dark_mode;
            if ui.checkbox(&mut dark, "Dark Mode").changed() {
                self.apply(Action::ToggleDarkMode);
            }
        });

        ui.horizontal_wrapped(|ui| {
            ui.add(egui::Slider::new(&mut self.zoom, ZOOM_RANGE.0..=ZOOM_RANGE.1).text("Zoom"));
            if state.dimension == Dimension::Three {
                ui.separator();
                ui.label("Rotate:");
                ui.add(egui::DragValue::new(&mut self.projection.yaw).speed(0.02).prefix("Yaw:"));
                ui.add(egui::DragValue::new(&mut self.projection.pitch).speed(0.02).prefix("Pitch:"));
                self.projection.pitch = self.projection.pitch.clamp(0.0, std::f64::consts::FRAC_PI_2);
            }
        });

        ui.horizontal_wrapped(|ui| {
            ui.label("Snapshot:");
            ui.text_edit_singleline(&mut self.snapshot_path);
            if ui.button("SAVE").clicked() {
                self.save();
            }
            if ui.button("LOAD").clicked() {
                self.load();
            }
            ui.separator();
            ui.label("Image:");
            ui.text_edit_singleline(&mut self.export_path);
            if ui.button("PNG").clicked() {
                self.export();
            }
        });

        let (done, total) = self.session.playback().progress();
        ui.horizontal(|ui| {
            ui.label(format!(
                "{:?} | {}/{} samples | {} batches",
                self.session.playback().state(),
                done,
                total,
                self.session.playback().render_log().len()
            ));
            if !self.status.is_empty() {
                ui.separator();
                ui.label(self.status.as_str());
            }
        });
    }

    /// Three stacked color patches; clicking draws a new palette
    fn palette_swatch(&self, ui: &mut egui::Ui) -> egui::Response {
        let (rect, response) = ui.allocate_exact_size(egui::vec2(40.0, 24.0), egui::Sense::click());
        if let Some(palette) = self.session.palette() {
            let h = rect.height() / 3.0;
            for (i, color) in palette.colors.iter().enumerate() {
                let patch = egui::Rect::from_min_size(
                    rect.min + egui::vec2(0.0, i as f32 * h),
                    egui::vec2(rect.width(), h),
                );
                ui.painter().rect_filled(patch, 0.0, to_color32(*color));
            }
        } else {
            ui.painter().rect_filled(rect, 0.0, egui::Color32::GRAY);
        }
        response.on_hover_text("New palette")
    }

    fn plot(&self, ui: &mut egui::Ui) {
        let view = self.session.view();
        let playback = self.session.playback();

        let framing: Vec<[f64; 2]> = playback
            .curve()
            .iter()
            .map(|p| self.projection.apply(p))
            .collect();
        let bounds = view_bounds(&framing, self.zoom);

        let plot = egui_plot::Plot::new("curve_plot")
            .data_aspect(1.0)
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show_axes(false)
            .show_grid(false);

        plot.show(ui, |plot_ui| {
            if let Some(b) = bounds {
                plot_ui.set_plot_bounds(egui_plot::PlotBounds::from_min_max(b.min, b.max));
            }

            for batch in playback.render_log() {
                let color = to_color32(batch.color);
                let points: Vec<[f64; 2]> = batch
                    .points
                    .iter()
                    .map(|p| self.projection.apply(p))
                    .collect();

                if view.state.data_points {
                    plot_ui.points(
                        egui_plot::Points::new(egui_plot::PlotPoints::from(points))
                            .color(color)
                            .radius(1.0),
                    );
                } else {
                    plot_ui.line(
                        egui_plot::Line::new(egui_plot::PlotPoints::from(points))
                            .color(color)
                            .width(1.5),
                    );
                }
            }

            if view.state.trace {
                if let Some(head) = self.sink.head {
                    plot_ui.points(
                        egui_plot::Points::new(egui_plot::PlotPoints::from(vec![self.projection.apply(&head)]))
                            .color(egui::Color32::RED)
                            .radius(4.0),
                    );
                }
            }
        });
    }
}

impl eframe::App for ShapesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.session.state().dark_mode {
            ctx.set_visuals(egui::Visuals::dark());
        } else {
            ctx.set_visuals(egui::Visuals::light());
        }

        // One batch per frame delay; this is the session's yield point
        let playing = self.session.playback().state() == PlaybackState::Playing;
        if playing {
            if self.last_step.elapsed() >= self.frame_delay {
                self.session.step(&mut self.sink);
                self.last_step = Instant::now();
            }
            ctx.request_repaint_after(self.frame_delay);
        }

        egui::TopBottomPanel::bottom("controls_panel").show(ctx, |ui| {
            self.controls(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.plot(ui);
        });
    }
}

fn to_color32(color: Rgb) -> egui::Color32 {
    let [r, g, b] = color.to_u8();
    egui::Color32::from_rgb(r, g, b)
}
