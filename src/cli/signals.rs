//! Ctrl-C handling for the `train` command.
//!
//! The first interrupt asks the training loop to stop before its
//! next batch, so every completed epoch stays checkpointed and
//! `train --resume` can pick up from there. A second interrupt
//! exits immediately.

use std::future::Future;

use anyhow::{Context, Result};
use tokio::runtime::Runtime;

use crate::ml::trainer::StopSignal;

/// Start a background runtime that turns SIGINT into a stop request.
/// The handler lives as long as the returned runtime.
pub fn install_stop_handler(stop: StopSignal) -> Result<Runtime> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("signal-handler")
        .enable_all()
        .build()
        .context("Cannot start signal handler runtime")?;

    runtime.spawn(async move {
        forward_interrupt(stop, tokio::signal::ctrl_c()).await;
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Second interrupt, exiting without waiting for the batch");
            std::process::exit(130);
        }
    });
    Ok(runtime)
}

/// Wait for `interrupt`, then raise `stop`.
async fn forward_interrupt<F>(stop: StopSignal, interrupt: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match interrupt.await {
        Ok(()) => {
            tracing::warn!("Interrupt received, stopping after the current batch");
            stop.request_stop();
        },
        Err(e) => {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        },
    }
}
