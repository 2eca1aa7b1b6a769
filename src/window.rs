//! Window, event loop and per-frame driver.
//!
//! Each redraw banks the frame time into the fixed-step scheduler, runs
//! whatever steps are due, resolves a pending pick and renders.

use std::sync::Arc;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use crate::camera::Camera;
use crate::cloth::ClothState;
use crate::config::ClothConfig;
use crate::device::{DeviceLoop, IdleDevice};
use crate::error::SimulationError;
use crate::gpu::{Renderer, Scene};
use crate::input::{Input, KeyCode, MouseEvent};
use crate::interaction::Interaction;
use crate::network;
use crate::scheduler::FixedTimestep;
use crate::time::Time;

const TITLE: &str = "drape";

/// Frames between window title refreshes.
const TITLE_INTERVAL: u64 = 30;

/// Scroll lines to zoom-drag pixels.
const SCROLL_TO_ZOOM: f32 = 10.0;

/// Viewer settings that are not part of the physical model.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub show_points: bool,
    pub fullscreen: bool,
    /// Target rate of the device sampling loop.
    pub device_rate_hz: f32,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            show_points: false,
            fullscreen: false,
            device_rate_hz: 1000.0,
        }
    }
}

/// Open a window and run the simulator until the user quits.
pub fn run(config: ClothConfig, options: ViewerOptions) -> Result<(), SimulationError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(config, options)?;
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

pub struct App {
    config: ClothConfig,
    options: ViewerOptions,
    cloth: ClothState,
    scheduler: FixedTimestep,
    interaction: Interaction,
    camera: Camera,
    time: Time,
    input: Input,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    device: Option<DeviceLoop>,
    /// First startup failure; surfaced by [`run`] after the loop exits.
    error: Option<SimulationError>,
}

impl App {
    pub fn new(config: ClothConfig, options: ViewerOptions) -> Result<Self, SimulationError> {
        let cloth = network::build(&config)?;
        let scheduler =
            FixedTimestep::new(config.time_step).with_max_steps_per_tick(config.max_steps_per_tick);
        let interaction = Interaction::new(config.pick_radius);
        Ok(Self {
            config,
            options,
            cloth,
            scheduler,
            interaction,
            camera: Camera::new(),
            time: Time::new(),
            input: Input::new(),
            window: None,
            renderer: None,
            device: None,
            error: None,
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let mut window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        if self.options.fullscreen {
            window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let renderer = pollster::block_on(Renderer::new(
            window.clone(),
            self.cloth.point_count(),
            self.cloth.triangles().len(),
        ))?;
        let device = DeviceLoop::start(Box::new(IdleDevice::new()), self.options.device_rate_hz)?;

        window.request_redraw();
        self.window = Some(window);
        self.renderer = Some(renderer);
        self.device = Some(device);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: SimulationError) {
        log::error!("{}", error);
        self.error.get_or_insert(error);
        self.quit(event_loop);
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(device) = &mut self.device {
            device.shutdown();
        }
        event_loop.exit();
    }

    fn handle_mouse(&mut self, event: MouseEvent) {
        match event {
            MouseEvent::Pressed(button, cursor) => {
                self.interaction.press(button, cursor);
                if let Some(renderer) = &mut self.renderer {
                    renderer.request_depth_probe(cursor.x.max(0.0) as u32, cursor.y.max(0.0) as u32);
                }
            }
            MouseEvent::Released(_) => self.interaction.release(),
            MouseEvent::Dragged(cursor) => {
                self.interaction.drag(cursor, &mut self.cloth, &mut self.camera)
            }
            MouseEvent::Scrolled(lines) => self.camera.zoom(-lines * SCROLL_TO_ZOOM),
        }
    }

    fn handle_keys(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.key_pressed(KeyCode::Q) || self.input.key_pressed(KeyCode::Escape) {
            self.quit(event_loop);
            return;
        }
        if self.input.key_pressed(KeyCode::F) {
            if let Some(window) = &self.window {
                let next = match window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                window.set_fullscreen(next);
            }
        }
        if self.input.key_pressed(KeyCode::M) {
            self.options.show_points = !self.options.show_points;
        }
        if self.input.key_pressed(KeyCode::Space) {
            self.scheduler.toggle_pause();
            log::info!(
                "Physics {}",
                if self.scheduler.is_paused() { "paused" } else { "resumed" }
            );
        }
        if self.input.key_pressed(KeyCode::R) {
            self.interaction.release();
            self.cloth.reset();
            log::info!("Cloth reset ({} points)", self.config.point_count());
        }
        self.input.begin_frame();
    }

    fn advance(&mut self) {
        let dt = self.time.update();
        self.scheduler.accumulate(dt);

        let interaction = &self.interaction;
        let cloth = &mut self.cloth;
        self.scheduler.tick_with(|step| {
            interaction.hold_selected(cloth);
            cloth.step(step);
        });
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.handle_keys(event_loop);
        if event_loop.exiting() {
            return;
        }
        self.advance();

        let sample = self.device.as_mut().and_then(|d| d.latest());
        let Some(renderer) = &mut self.renderer else {
            return;
        };

        let scene = Scene {
            cloth: &self.cloth,
            view_proj: self.camera.view_proj(renderer.aspect()),
            selected: self.interaction.selected(),
            show_points: self.options.show_points,
            cursor: sample.map(|s| s.position),
        };
        let mut out_of_memory = false;
        match renderer.render(&scene) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                renderer.resize(winit::dpi::PhysicalSize {
                    width: renderer.config.width,
                    height: renderer.config.height,
                })
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Surface out of memory");
                out_of_memory = true;
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
        if out_of_memory {
            self.quit(event_loop);
            return;
        }

        if let Some(((x, y), depth)) = renderer.take_depth_probe() {
            // A release before the probe resolved cancels the pick.
            if self.input.any_mouse_held() {
                let world = self
                    .camera
                    .unproject(Vec2::new(x as f32, y as f32), depth, renderer.viewport());
                self.interaction.select_at(&self.cloth, world);
            }
        }

        if let Some(window) = &self.window {
            if self.time.frame() % TITLE_INTERVAL == 0 {
                let rate = sample.map_or(0.0, |s| s.rate_hz);
                window.set_title(&format!(
                    "{} | {:.0} fps | {:.2} ms | device {:.0} Hz",
                    TITLE,
                    self.time.fps(),
                    self.time.frame_ms(),
                    rate
                ));
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.quit(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            event => {
                if let Some(mouse) = self.input.handle_event(&event) {
                    self.handle_mouse(mouse);
                }
            }
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(device) = &mut self.device {
            device.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_hidden_at_startup() {
        let options = ViewerOptions::default();
        assert!(!options.show_points);
        assert!(!options.fullscreen);
        assert_eq!(options.device_rate_hz, 1000.0);
    }
}
