//! Desktop window with an OpenGL context, built on [`winit`] and [`glutin`].

use std::{collections::VecDeque, fmt::Display, num::NonZeroU32, time::Duration};

use glutin::{
    config::{Config as GlConfig, ConfigTemplateBuilder, GlConfig as _},
    context::{
        ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext,
        PossiblyCurrentContext, PossiblyCurrentGlContext, Version,
    },
    display::{GetGlDisplay, GlDisplay},
    surface::{GlSurface, Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface},
};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window as WinitWindow, WindowId},
};

use crate::{
    config::WindowConfig,
    error::RenderError,
    frame::{Event, Window},
};

fn window_error(e: impl Display) -> RenderError {
    RenderError::Window(e.to_string())
}

/// Prefer the config with the most MSAA samples among those matching the
/// template.
///
/// # Panics
///
/// Panics if the display offers no config at all; `DisplayBuilder` reports
/// an error before calling the picker in that case.
fn pick_config(configs: Box<dyn Iterator<Item = GlConfig> + '_>) -> GlConfig {
    configs
        .reduce(|best, config| {
            if config.num_samples() > best.num_samples() {
                config
            } else {
                best
            }
        })
        .expect("display offered no GL configs")
}

/// A native window, its GL surface, and a context current on the thread
/// that opened it.
///
/// Events are collected by pumping the winit event loop with a zero
/// timeout, so [`poll_event`](Window::poll_event) never blocks.
pub struct DesktopWindow {
    // Field order is drop order: context before surface before window.
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    window: WinitWindow,
    event_loop: EventLoop<()>,
    pending: VecDeque<Event>,
    pumped: bool,
    exited: bool,
}

impl DesktopWindow {
    /// Open a window and create a current GL context for it.
    ///
    /// # Errors
    ///
    /// [`RenderError::Window`] if the event loop, window, GL config,
    /// context, or surface cannot be created.
    pub fn open(config: &WindowConfig) -> Result<Self, RenderError> {
        let event_loop = EventLoop::new().map_err(window_error)?;

        let attributes = WinitWindow::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(PhysicalSize::new(config.size[0], config.size[1]));

        let mut template = ConfigTemplateBuilder::new().with_depth_size(config.depth_bits);
        if config.msaa_samples > 0 {
            template = template.with_multisampling(config.msaa_samples);
        }

        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(&event_loop, template, pick_config)
            .map_err(window_error)?;
        let window = window
            .ok_or_else(|| RenderError::Window("display builder created no window".to_owned()))?;

        let raw_handle = window.window_handle().map_err(window_error)?.as_raw();
        let display = gl_config.display();
        let (major, minor) = config.gl_version;
        let context_attributes = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .build(Some(raw_handle));

        // SAFETY: the raw window handle stays valid for as long as `window`,
        // which outlives the context and surface (see field order).
        let not_current = unsafe { display.create_context(&gl_config, &context_attributes) }
            .map_err(window_error)?;
        let surface_attributes = window
            .build_surface_attributes(SurfaceAttributesBuilder::default())
            .map_err(window_error)?;
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
            .map_err(window_error)?;
        let context = not_current.make_current(&surface).map_err(window_error)?;

        if config.vsync {
            if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
                warn!("could not enable vsync: {0}", e);
            }
        }

        info!(
            "opened {0}x{1} window with GL {2}.{3} core context ({4} samples, {5}-bit depth)",
            config.size[0],
            config.size[1],
            major,
            minor,
            gl_config.num_samples(),
            gl_config.depth_size()
        );

        Ok(Self {
            context,
            surface,
            window,
            event_loop,
            pending: VecDeque::new(),
            pumped: false,
            exited: false,
        })
    }

    /// Load GL function pointers for this window's context.
    ///
    /// # Safety
    ///
    /// The context must be current on the calling thread (it is after
    /// [`open`](Self::open)), and the returned context must not be used
    /// after this window is dropped.
    #[must_use]
    pub unsafe fn load_gl(&self) -> glow::Context {
        let display = self.context.display();
        unsafe { glow::Context::from_loader_function_cstr(|symbol| display.get_proc_address(symbol)) }
    }

    /// Run the platform event loop once without waiting and queue whatever
    /// it delivered.
    fn pump(&mut self) {
        let mut collector = EventCollector {
            window_id: self.window.id(),
            pending: &mut self.pending,
            surface: &self.surface,
            context: &self.context,
        };
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut collector);

        if let PumpStatus::Exit(code) = status {
            if !self.exited {
                debug!("event loop exited with code {0}", code);
                self.exited = true;
                self.pending.push_back(Event::Closed);
            }
        }
    }
}

impl Window for DesktopWindow {
    fn poll_event(&mut self) -> Option<Event> {
        if self.pending.is_empty() && !self.pumped {
            self.pump();
            self.pumped = true;
        }

        let event = self.pending.pop_front();
        if event.is_none() {
            // Drained; the next call starts a new frame's pump.
            self.pumped = false;
        }
        event
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.surface
            .swap_buffers(&self.context)
            .map_err(window_error)
    }

    fn set_active(&mut self, active: bool) -> bool {
        let result = if active {
            self.context.make_current(&self.surface)
        } else {
            self.context.make_not_current_in_place()
        };

        match result {
            Ok(()) => true,
            Err(e) => {
                error!("failed to set GL context active={0}: {1}", active, e);
                false
            }
        }
    }
}

/// Translates winit window events into [`Event`]s for one pump.
struct EventCollector<'a> {
    window_id: WindowId,
    pending: &'a mut VecDeque<Event>,
    surface: &'a Surface<WindowSurface>,
    context: &'a PossiblyCurrentContext,
}

impl ApplicationHandler for EventCollector<'_> {
    fn resumed(&mut self, _event_loop: &ActiveEventLoop) {}

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if window_id != self.window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.pending.push_back(Event::Closed),
            WindowEvent::Resized(size) => {
                // A minimized window reports 0x0; the surface keeps its size.
                if let (Some(width), Some(height)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                {
                    self.surface.resize(self.context, width, height);
                }
                self.pending.push_back(Event::Resized {
                    width: size.width,
                    height: size.height,
                });
            }
            _ => {}
        }
    }
}
