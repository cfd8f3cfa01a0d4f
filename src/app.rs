use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use tracemon_core::{
    CancelToken, ChartModel, FrameClock, MetricSource, PollerShared, Resolution, spawn_poller,
};

use crate::config::Settings;
use crate::gpu::GpuState;
use crate::ui::StatusOverlay;

enum KeyAction {
    Quit,
    ShowDecorations,
    HideDecorations,
    ToggleOverlay,
}

fn key_action(event: &WindowEvent) -> Option<KeyAction> {
    let WindowEvent::KeyboardInput {
        event:
            KeyEvent {
                physical_key: PhysicalKey::Code(key_code),
                state: ElementState::Pressed,
                repeat: false,
                ..
            },
        ..
    } = event
    else {
        return None;
    };

    match key_code {
        KeyCode::Escape => Some(KeyAction::Quit),
        KeyCode::F1 => Some(KeyAction::ShowDecorations),
        KeyCode::F2 => Some(KeyAction::HideDecorations),
        KeyCode::F3 => Some(KeyAction::ToggleOverlay),
        _ => None,
    }
}

pub struct App {
    // Drop order matters: the surface inside `gpu` must go before the window
    // it was created from.
    gpu: Option<GpuState>,
    overlay: Option<StatusOverlay>,
    chart: Option<ChartModel>,
    window: Option<Arc<Window>>,
    settings: Settings,
    counter: String,
    interval: Duration,
    /// Handed to the poller thread once the window and GPU are up.
    source: Option<Box<dyn MetricSource>>,
    shared: PollerShared,
    clock: FrameClock,
    frame_interval: Duration,
    next_frame: Instant,
    fatal: Option<anyhow::Error>,
}

impl App {
    pub fn new(
        settings: Settings,
        source: Box<dyn MetricSource>,
        interval: Duration,
        cancel: CancelToken,
    ) -> Self {
        let frame_interval = settings.display.frame_interval();
        Self {
            gpu: None,
            overlay: None,
            chart: None,
            window: None,
            counter: source.identifier().to_string(),
            settings,
            interval,
            source: Some(source),
            shared: PollerShared::new(cancel),
            clock: FrameClock::new(frame_interval),
            frame_interval,
            next_frame: Instant::now(),
            fatal: None,
        }
    }

    /// The error that ended the event loop, if it did not end normally.
    pub fn into_result(self) -> anyhow::Result<()> {
        self.fatal.map_or(Ok(()), Err)
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        self.shared.cancel.cancel();
        event_loop.exit();
    }

    /// Stash `error` for `main` to report and stop the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        self.fatal = Some(error);
        self.shutdown(event_loop);
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let display = &self.settings.display;
        let attrs = Window::default_attributes()
            .with_title(display.title.as_str())
            .with_inner_size(PhysicalSize::new(display.width, display.height))
            .with_decorations(!display.borderless);

        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| anyhow!("failed to create window: {e}"))?,
        );
        let gpu = GpuState::new(window.clone())?;

        // A window that starts minimised reports zero; size the chart from the
        // config until the first real resize arrives.
        let size = window.inner_size();
        let mut resolution = Resolution::new(size.width, size.height);
        if resolution.is_empty() {
            resolution = Resolution::new(display.width, display.height);
        }
        let chart = ChartModel::new(resolution, &self.settings.chart)?;
        let overlay = StatusOverlay::new(&window, self.settings.overlay.visible);
        tracing::info!(%resolution, fps = self.settings.display.fps, "display ready");

        if let Some(source) = self.source.take() {
            // Fire and forget: the thread exits on its own once cancelled.
            spawn_poller(source, self.interval, self.shared.clone())
                .map_err(|e| anyhow!("failed to spawn poller thread: {e}"))?;
        }

        self.clock = FrameClock::new(self.frame_interval);
        self.next_frame = Instant::now();
        self.window = Some(window);
        self.gpu = Some(gpu);
        self.chart = Some(chart);
        self.overlay = Some(overlay);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, action: KeyAction) {
        match action {
            KeyAction::Quit => self.shutdown(event_loop),
            KeyAction::ShowDecorations | KeyAction::HideDecorations => {
                if let Some(window) = &self.window {
                    window.set_decorations(matches!(action, KeyAction::ShowDecorations));
                }
            }
            KeyAction::ToggleOverlay => {
                if let Some(overlay) = &mut self.overlay {
                    overlay.toggle();
                }
            }
        }
    }

    fn resize(&mut self, event_loop: &ActiveEventLoop, size: PhysicalSize<u32>) {
        let resolution = Resolution::new(size.width, size.height);
        if resolution.is_empty() {
            return;
        }
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(size.width, size.height);
        }
        if let Some(chart) = &mut self.chart
            && let Err(e) = chart.resize(resolution)
        {
            self.fail(event_loop, e.into());
            return;
        }
        tracing::debug!(%resolution, "surface resized");
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let dt = self.clock.tick();
        let Some(window) = &self.window else { return };
        let Some(gpu) = &mut self.gpu else { return };
        let Some(chart) = &mut self.chart else { return };
        let Some(overlay) = &mut self.overlay else {
            return;
        };

        let frame = crate::frame::step(chart, &self.shared, dt);

        let egui_output = overlay.visible.then(|| {
            let status = crate::frame::status(&self.counter, self.interval, &self.shared, chart);
            overlay.run(window, &status)
        });

        match gpu.render(&frame.segments, egui_output.as_ref()) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (w, h) = (gpu.surface_config.width, gpu.surface_config.height);
                gpu.resize(w, h);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, anyhow!("GPU out of memory"));
            }
            Err(e) => {
                tracing::warn!("Surface error: {e:?}");
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().is_none_or(|w| w.id() != window_id) {
            return;
        }

        if let Some(action) = key_action(&event) {
            self.handle_key(event_loop, action);
            return;
        }

        // The overlay is passive; egui only sees events for scale and size.
        if let Some(overlay) = &mut self.overlay
            && let Some(window) = &self.window
        {
            overlay.on_event(window, &event);
        }

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => self.resize(event_loop, size),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.shared.cancel.is_cancelled() {
            event_loop.exit();
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        self.next_frame += self.frame_interval;
        // If we fell behind (e.g. long frame), reset to avoid a burst of catch-up frames
        let now = Instant::now();
        if self.next_frame < now {
            self.next_frame = now + self.frame_interval;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shared.cancel.cancel();
        // GPU before window; see the field order note.
        self.overlay = None;
        self.gpu = None;
        tracing::info!(
            polls = self
                .shared
                .stats
                .polls
                .load(std::sync::atomic::Ordering::Relaxed),
            "display closed"
        );
    }
}
