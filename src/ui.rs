use std::sync::Arc;
use std::time::Duration;

use egui::{self, Color32, ComboBox, Layout, Rounding, Stroke};

use crate::capture::{AudioCapture, list_input_device_names};
use crate::ring::SampleRing;
use crate::waveform::{self, DrawCommand};

/// Repaint period of the scope, roughly 30 Hz.
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const TRACE: Color32 = Color32::from_rgb(87, 209, 227);
const TRACE_WIDTH: f32 = 3.0;

pub struct ScopeApp {
    ring: Arc<SampleRing>,
    capture: AudioCapture,
    input_devices: Vec<String>,
    selected_device: Option<String>,
    capture_error: Option<String>,
}

impl ScopeApp {
    pub fn new(ring: Arc<SampleRing>, capture: AudioCapture) -> Self {
        let input_devices = list_input_device_names();
        let selected_device = Some(capture.device_name.clone());
        Self {
            ring,
            capture,
            input_devices,
            selected_device,
            capture_error: None,
        }
    }

    fn switch_input_device(&mut self) -> Result<(), String> {
        let target = self.selected_device.clone();
        let capture = AudioCapture::new_with_device(Arc::clone(&self.ring), target.as_deref())?;
        self.input_devices = list_input_device_names();
        self.selected_device = Some(capture.device_name.clone());
        // Replacing the handle drops the old stream, which stops it.
        self.capture = capture;
        Ok(())
    }
}

impl eframe::App for ScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(FRAME_INTERVAL);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_space(4.0);
            let mut device_changed = false;
            ui.horizontal(|ui| {
                ui.strong("Wave Scope");
                ui.separator();
                device_changed = input_selector(
                    ui,
                    &self.input_devices,
                    &mut self.selected_device,
                    &mut self.capture_error,
                );
                ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Listening: {}", self.capture.device_name));
                });
            });
            ui.add_space(6.0);

            draw_scope(ui, &self.ring);

            if device_changed {
                if let Err(err) = self.switch_input_device() {
                    self.capture_error = Some(err);
                }
            }

            if let Some(err) = &self.capture_error {
                ui.colored_label(Color32::RED, format!("Capture: {err}"));
            }
        });
    }
}

/// Paints one frame of the waveform: snapshots the ring once, then maps the
/// planned draw calls through the wrap-aware vertex mapping into the rect.
fn draw_scope(ui: &mut egui::Ui, ring: &SampleRing) {
    let desired = egui::vec2(
        ui.available_width().max(200.0),
        ui.available_height().max(140.0),
    );
    let (rect, _) = ui.allocate_exact_size(desired, egui::Sense::hover());
    let painter = ui.painter_at(rect);
    painter.rect(
        rect,
        Rounding::same(6.0),
        Color32::BLACK,
        Stroke::new(1.0, ui.visuals().weak_text_color()),
    );

    let (slots, cursor) = ring.snapshot();
    let capacity = slots.len();
    let stroke = Stroke::new(TRACE_WIDTH, TRACE);
    for command in waveform::plan_draws(cursor, capacity) {
        match command {
            DrawCommand::Strip { start, len } => {
                let points: Vec<egui::Pos2> = (start..start + len)
                    .map(|i| vertex_to_screen(i, slots[i], cursor, capacity, rect))
                    .collect();
                painter.add(egui::Shape::line(points, stroke));
            }
            DrawCommand::Bridge { from, to } => {
                painter.line_segment(
                    [
                        vertex_to_screen(from, slots[from], cursor, capacity, rect),
                        vertex_to_screen(to, slots[to], cursor, capacity, rect),
                    ],
                    stroke,
                );
            }
        }
    }
}

/// NDC (-1..1, +y up) to painter coordinates (+y down) inside `rect`.
fn vertex_to_screen(
    index: usize,
    amplitude: f32,
    cursor: usize,
    capacity: usize,
    rect: egui::Rect,
) -> egui::Pos2 {
    let (x, y) = waveform::vertex_ndc(index, amplitude, cursor, capacity);
    egui::pos2(
        egui::lerp(rect.x_range(), (x + 1.0) * 0.5),
        egui::lerp(rect.y_range(), (1.0 - y) * 0.5),
    )
}

fn input_selector(
    ui: &mut egui::Ui,
    devices: &[String],
    selected: &mut Option<String>,
    capture_error: &mut Option<String>,
) -> bool {
    let before = selected.clone();
    ComboBox::from_id_source("input_selector")
        .width(180.0)
        .selected_text(selected.as_deref().unwrap_or("Default input"))
        .show_ui(ui, |ui| {
            ui.selectable_value(selected, None, "Default input");
            for name in devices {
                ui.selectable_value(selected, Some(name.clone()), name);
            }
        });
    let changed = before != *selected;
    if changed {
        *capture_error = None;
    }
    changed
}
