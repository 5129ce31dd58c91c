//! Preview window: rasterizes the gauge into a `pixels` surface on every
//! redraw, taking the newest value from a channel when one is attached.

use bon::Builder;
use pixels::{Pixels, SurfaceTexture};
use rusttype::Font;
use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};
use winit::dpi::LogicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::error::{GaugeError, Result};
use crate::gauge::GaugeChart;
use crate::raster::Canvas;

#[derive(Builder)]
pub struct PreviewOptions {
    #[builder(default = 300)]
    pub width: u32,
    #[builder(default = 300)]
    pub height: u32,
    #[builder(default = 30.0)]
    pub max_framerate: f64,
    pub font: Option<Font<'static>>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

fn window_error(err: impl std::fmt::Display) -> GaugeError {
    GaugeError::Window(err.to_string())
}

impl GaugeChart {
    /// Opens a window showing a single reading until it is closed.
    pub fn show(&self, options: PreviewOptions, value: Option<f64>) -> Result<()> {
        self.run_window(options, value, None)
    }

    /// Opens a window that follows readings sent on `receiver`.
    pub fn show_with_values(&self, options: PreviewOptions, receiver: Receiver<f64>) -> Result<()> {
        self.run_window(options, None, Some(receiver))
    }

    fn run_window(
        &self,
        options: PreviewOptions,
        initial: Option<f64>,
        receiver: Option<Receiver<f64>>,
    ) -> Result<()> {
        let title = if self.config().metric_name.is_empty() {
            "Gauge".to_string()
        } else {
            self.config().metric_name.clone()
        };

        let event_loop = EventLoop::new().map_err(window_error)?;
        let window = WindowBuilder::new()
            .with_title(&title)
            .with_inner_size(LogicalSize::new(options.width as f64, options.height as f64))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(window_error)?;
        let window = std::sync::Arc::new(window);
        let window_clone = window.clone();

        let size = window.inner_size();
        let mut fb_width = size.width;
        let mut fb_height = size.height;
        let surface_texture = SurfaceTexture::new(size.width, size.height, &window);
        let mut pixels =
            Pixels::new(size.width, size.height, surface_texture).map_err(window_error)?;

        let background = self.config().theme.background;
        let font = options.font;
        let mut value = initial;
        let frame_duration = Duration::from_secs_f64(1.0 / options.max_framerate.max(1.0));
        let mut last_frame = Instant::now();

        tracing::info!(width = fb_width, height = fb_height, %title, "opening preview window");

        event_loop
            .run(move |event, window_target| {
                window_target.set_control_flow(ControlFlow::Poll);
                match event {
                    Event::WindowEvent { event, .. } => match event {
                        WindowEvent::CloseRequested => {
                            window_target.exit();
                        }
                        WindowEvent::Resized(new_size) => {
                            fb_width = new_size.width;
                            fb_height = new_size.height;
                            let _ = pixels.resize_buffer(new_size.width, new_size.height);
                            let _ = pixels.resize_surface(new_size.width, new_size.height);
                        }
                        WindowEvent::RedrawRequested => {
                            if let Some(ref receiver) = receiver {
                                // Only the newest reading matters.
                                while let Ok(next) = receiver.try_recv() {
                                    value = Some(next);
                                }
                            }

                            match self.build_scene(fb_width, fb_height, value) {
                                Ok(scene) => {
                                    let mut canvas = Canvas::new(
                                        pixels.frame_mut(),
                                        fb_width as usize,
                                        fb_height as usize,
                                    );
                                    canvas.clear(background);
                                    canvas.render_scene(&scene, font.as_ref());
                                }
                                Err(err) => {
                                    tracing::warn!(error = %err, "skipping frame");
                                }
                            }

                            if let Err(err) = pixels.render() {
                                tracing::error!(error = %err, "failed to present frame");
                                window_target.exit();
                            }
                        }
                        _ => {}
                    },
                    Event::AboutToWait => {
                        if last_frame.elapsed() >= frame_duration {
                            window_clone.request_redraw();
                            last_frame = Instant::now();
                        }
                    }
                    _ => {}
                }
            })
            .map_err(window_error)?;

        Ok(())
    }
}
