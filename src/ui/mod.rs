use std::time::Duration;

use winit::window::Window;

use tracemon_core::Resolution;

pub struct EguiRenderOutput {
    pub primitives: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub screen_descriptor: egui_wgpu::ScreenDescriptor,
}

/// Everything the overlay shows, captured once per frame.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusSnapshot {
    pub counter: String,
    pub interval: Duration,
    pub current: Option<i64>,
    pub peak: Option<i64>,
    pub displayed: f64,
    pub polls: u64,
    pub failures: u32,
    pub last_poll_secs: f32,
    pub scale: f64,
    pub window_max: i64,
    pub resolution: Resolution,
}

/// Group digits in threes: `1234567` -> `1 234 567`.
pub fn group_digits(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}

fn value_or_dash(value: Option<i64>) -> String {
    value.map_or_else(|| "\u{2014}".to_string(), group_digits)
}

/// Passive status readout in the top-left corner. Never takes input focus.
pub struct StatusOverlay {
    pub ctx: egui::Context,
    winit_state: egui_winit::State,
    pub visible: bool,
}

impl StatusOverlay {
    pub fn new(window: &Window, visible: bool) -> Self {
        let ctx = egui::Context::default();
        let winit_state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            window.theme(),
            None,
        );

        Self {
            ctx,
            winit_state,
            visible,
        }
    }

    /// Feed a window event to egui for scale and size tracking. The overlay
    /// never consumes input and the loop redraws every frame anyway, so the
    /// response carries nothing to act on.
    pub fn on_event(&mut self, window: &Window, event: &winit::event::WindowEvent) {
        self.winit_state.on_window_event(window, event);
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        tracing::debug!(visible = self.visible, "overlay toggled");
    }

    pub fn run(&mut self, window: &Window, status: &StatusSnapshot) -> EguiRenderOutput {
        let raw_input = self.winit_state.take_egui_input(window);
        let ctx = self.ctx.clone();
        let fps = 1.0 / ctx.input(|i| i.predicted_dt);

        let full_output = ctx.run(raw_input, |egui_ctx| {
            egui::Area::new(egui::Id::new("status"))
                .fixed_pos(egui::pos2(8.0, 8.0))
                .interactable(false)
                .show(egui_ctx, |ui| {
                    egui::Frame::popup(ui.style())
                        .fill(egui::Color32::from_black_alpha(180))
                        .show(ui, |ui| status_grid(ui, status, fps));
                });
        });

        let egui::FullOutput {
            platform_output,
            shapes,
            pixels_per_point,
            textures_delta,
            ..
        } = full_output;
        self.winit_state
            .handle_platform_output(window, platform_output);
        tessellate_output(&self.ctx, window, shapes, pixels_per_point, textures_delta)
    }
}

fn status_grid(ui: &mut egui::Ui, status: &StatusSnapshot, fps: f32) {
    ui.label(egui::RichText::new(&status.counter).strong().monospace());
    egui::Grid::new("status_grid")
        .num_columns(2)
        .spacing([12.0, 2.0])
        .show(ui, |ui| {
            ui.label("current");
            ui.monospace(value_or_dash(status.current));
            ui.end_row();

            ui.label("peak");
            ui.monospace(value_or_dash(status.peak));
            ui.end_row();

            ui.label("displayed");
            ui.monospace(format!("{:.1}", status.displayed));
            ui.end_row();

            ui.label("interval");
            ui.monospace(format!("{} ms", status.interval.as_millis()));
            ui.end_row();

            ui.label("polls");
            ui.monospace(format!(
                "{} ({} failed, last {:.1} ms)",
                status.polls,
                status.failures,
                status.last_poll_secs * 1000.0
            ));
            ui.end_row();

            ui.label("scale");
            ui.monospace(format!(
                "\u{00d7}{:.3} (max {})",
                status.scale,
                group_digits(status.window_max)
            ));
            ui.end_row();

            ui.label("surface");
            ui.monospace(format!("{} @ {fps:.0} fps", status.resolution));
            ui.end_row();
        });
}

fn tessellate_output(
    ctx: &egui::Context,
    window: &Window,
    shapes: Vec<egui::epaint::ClippedShape>,
    pixels_per_point: f32,
    textures_delta: egui::TexturesDelta,
) -> EguiRenderOutput {
    let primitives = ctx.tessellate(shapes, pixels_per_point);
    let size = window.inner_size();
    EguiRenderOutput {
        primitives,
        textures_delta,
        screen_descriptor: egui_wgpu::ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point,
        },
    }
}
