//! Top-level entry point for running tailplot as a native window.
//!
//! [`run_tailplot`] wires the pipeline together: the reader thread runs a
//! [`Tailer`] feeding a [`PointBuffer`], appends wake the egui context, and
//! the [`TailPlotApp`] flushes the buffer on the UI thread.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use eframe::egui;
use log::{debug, error};

use crate::buffer::PointBuffer;
use crate::config::TailPlotConfig;
use crate::controllers::TailController;
use crate::error::{RunError, TailError};
use crate::source::LineSource;
use crate::tail::Tailer;

use super::tail_app::TailPlotApp;

/// Open the plot window and follow `source` until the window is closed.
///
/// A fatal reader error closes the window and is returned once the event loop
/// has exited. The call blocks until then.
pub fn run_tailplot<S>(config: TailPlotConfig, source: S) -> Result<(), RunError>
where
    S: LineSource + 'static,
{
    let control = TailController::new(config.auto_restart);
    let failure: Arc<Mutex<Option<TailError>>> = Arc::default();

    let mut opts = eframe::NativeOptions::default();
    opts.viewport = egui::ViewportBuilder::default().with_inner_size(egui::vec2(1200.0, 800.0));

    let title = config.title.clone();
    let app_control = control.clone();
    let reader_failure = failure.clone();
    eframe::run_native(
        &title,
        opts,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let buffer = PointBuffer::new(Arc::new(ctx.clone()));
            let mut tailer = Tailer::new(
                source,
                config.parser(),
                buffer.clone(),
                app_control.clone(),
            )
            .with_poll_interval(config.poll_interval)
            .with_restart_inference(config.restart_inference);

            thread::Builder::new()
                .name("tail-reader".into())
                .spawn(move || {
                    if let Err(e) = tailer.run() {
                        error!("{e}");
                        *reader_failure
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner) = Some(e);
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    debug!("reader thread finished");
                })?;

            Ok(Box::new(TailPlotApp::new(&config, buffer, app_control)))
        }),
    )?;

    control.shutdown();
    let failure = failure
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
