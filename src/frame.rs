//! The frame loop and the window interface it drives.

use tracing::{debug, info, trace};

use crate::{backend::Backend, error::RenderError, gpu::Gpu, render::TriangleRenderer};

/// A window event the frame loop reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// The user asked to close the window.
    Closed,
    /// The drawable surface changed size, in physical pixels.
    Resized {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
}

/// The windowing side of the frame loop.
///
/// Implementations own the window and its GL context; everything is called
/// from the rendering thread.
pub trait Window {
    /// Return the next pending event without blocking.
    ///
    /// Within one frame, successive calls drain what was pending when the
    /// frame started and then return `None`; events arriving later are left
    /// for the next frame.
    fn poll_event(&mut self) -> Option<Event>;

    /// Swap the front and back buffers. May block on vertical sync.
    ///
    /// # Errors
    ///
    /// [`RenderError::Window`] if the surface cannot be presented.
    fn present(&mut self) -> Result<(), RenderError>;

    /// Make the GL context current (or not current) on the calling thread.
    /// Returns whether that succeeded.
    fn set_active(&mut self, active: bool) -> bool;
}

/// Frame loop state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    /// Frames are being produced.
    #[default]
    Running,
    /// A close was observed; terminal.
    Stopped,
}

/// Drives a [`TriangleRenderer`] until the window is closed.
#[derive(Debug, Default)]
pub struct FrameLoop {
    state: LoopState,
    frames: u64,
}

impl FrameLoop {
    /// A loop in the [`Running`](LoopState::Running) state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames presented so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// React to one event.
    ///
    /// `Closed` only schedules the stop: the current frame still finishes.
    /// `Resized` updates the viewport right away so the frame about to be
    /// drawn uses the new size.
    ///
    /// # Errors
    ///
    /// Propagates the viewport update's [`RenderError::Driver`].
    pub fn handle_event<B: Backend>(
        &mut self,
        event: Event,
        gpu: &mut Gpu<B>,
        renderer: &TriangleRenderer<B>,
    ) -> Result<(), RenderError> {
        trace!("event: {0:?}", event);
        match event {
            Event::Closed => {
                info!("window close requested");
                self.state = LoopState::Stopped;
            }
            Event::Resized { width, height } => {
                debug!("window resized to {0}x{1}", width, height);
                renderer.resize(gpu, width, height)?;
            }
        }
        Ok(())
    }

    /// Run one iteration: drain events, draw, present.
    ///
    /// Does nothing once the loop has stopped.
    ///
    /// # Errors
    ///
    /// Returns the first error from event handling, drawing, or presenting.
    /// The loop is left in its current state; the caller is expected to
    /// tear down and give up.
    pub fn iterate<W: Window, B: Backend>(
        &mut self,
        window: &mut W,
        gpu: &mut Gpu<B>,
        renderer: &TriangleRenderer<B>,
    ) -> Result<LoopState, RenderError> {
        if self.state == LoopState::Stopped {
            return Ok(LoopState::Stopped);
        }

        while let Some(event) = window.poll_event() {
            self.handle_event(event, gpu, renderer)?;
        }

        renderer.render(gpu)?;
        window.present()?;
        self.frames += 1;

        Ok(self.state)
    }

    /// Iterate until the loop stops. Returns the number of frames presented.
    ///
    /// # Errors
    ///
    /// See [`iterate`](Self::iterate).
    pub fn run<W: Window, B: Backend>(
        &mut self,
        window: &mut W,
        gpu: &mut Gpu<B>,
        renderer: &TriangleRenderer<B>,
    ) -> Result<u64, RenderError> {
        while self.iterate(window, gpu, renderer)? == LoopState::Running {}
        Ok(self.frames)
    }
}
