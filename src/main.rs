//! Opens a window and draws the triangle until it is closed.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use triangle_renderer_glow::{
    app,
    backend::GlowBackend,
    config::Config,
    gpu::Gpu,
    logging, note,
    window::DesktopWindow,
};

fn main() -> Result<()> {
    let config = Config::default();
    // Dropping the guard flushes the log file; keep it until `main` returns.
    let log = logging::init(&config.log).context("failed to initialize logging")?;

    info!("Hello {0}", 15);
    info!("log file: {0}", log.path().display());

    match run(&config) {
        Ok(frames) => {
            note!("shut down cleanly after {0} frames", frames);
            Ok(())
        }
        Err(e) => {
            error!("fatal: {0:#}", e);
            Err(e)
        }
    }
}

fn run(config: &Config) -> Result<u64> {
    let mut window = DesktopWindow::open(&config.window).context("failed to open window")?;

    // SAFETY: `open` leaves the context current on this thread, and `gpu`
    // is declared after `window`, so it drops first.
    let gl = unsafe { window.load_gl() };
    let backend = unsafe { GlowBackend::new(Arc::new(gl)) };
    let mut gpu = Gpu::new(backend, config.error_checks);

    let frames = app::run(&mut window, &mut gpu, config).context("rendering failed")?;
    Ok(frames)
}
