//! Startup, frame loop, and teardown in one call.

use tracing::{error, info};

use crate::{
    backend::Backend,
    config::Config,
    error::RenderError,
    frame::{FrameLoop, Window},
    gpu::Gpu,
    render::TriangleRenderer,
};

/// Activate the context, build the renderer, loop until the window closes,
/// then release the renderer's GPU objects. Returns the number of frames
/// presented.
///
/// Teardown also runs when the loop fails, so the error path leaks nothing
/// either.
///
/// # Errors
///
/// [`RenderError::Precondition`] if the context cannot be made current,
/// otherwise whatever renderer setup or the frame loop reports.
pub fn run<W: Window, B: Backend>(
    window: &mut W,
    gpu: &mut Gpu<B>,
    config: &Config,
) -> Result<u64, RenderError> {
    if !window.set_active(true) {
        error!("could not make the GL context current on this thread");
        return Err(RenderError::Precondition(
            "GL context activation failed".to_owned(),
        ));
    }

    let renderer = TriangleRenderer::new(gpu, config.clear_color)?;
    let result = FrameLoop::new().run(window, gpu, &renderer);
    renderer.destroy(gpu);

    let frames = result?;
    info!("rendered {0} frames", frames);
    Ok(frames)
}
