//! Background host for the flush cycle.
//!
//! The pipeline itself never spawns tasks; the embedding application
//! schedules [`BufferedLogger::run_flush_cycle`] as a long-lived task.
//! `FlushDaemon` is the convenience host for std-thread environments: it
//! runs the cycle on a named thread and shuts it down cleanly when dropped.

use crate::logger::pipeline::BufferedLogger;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Thread host for the log pipeline's flush cycle.
///
/// The cycle checks the shutdown flag every second, so `shutdown()` (or
/// dropping the daemon) takes effect at the next sweep.
pub struct FlushDaemon {
    /// Handle to the daemon thread
    thread_handle: Option<JoinHandle<()>>,
    /// Shutdown signal
    shutdown: Arc<AtomicBool>,
}

impl FlushDaemon {
    /// Start the flush cycle on a dedicated thread.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use heapwarden::logger::FlushDaemon;
    ///
    /// let daemon = FlushDaemon::start(logger.clone());
    /// // Flushes run in the background...
    /// daemon.shutdown(); // or just drop it
    /// ```
    pub fn start(logger: Arc<BufferedLogger>) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);

        let thread_handle = thread::Builder::new()
            .name("log-flush".to_string())
            .spawn(move || {
                logger.run_flush_cycle(&shutdown_clone);
            })
            .expect("Failed to spawn log flush thread");

        info!("log flush daemon started");

        Self {
            thread_handle: Some(thread_handle),
            shutdown,
        }
    }

    /// Signal the daemon to stop.
    ///
    /// Non-blocking; the cycle exits at its next one-second sweep. Call
    /// `join()` afterwards to wait for the thread.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        debug!("log flush daemon shutdown requested");
    }

    /// Wait for the daemon thread to finish.
    pub fn join(&mut self) {
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                warn!("log flush thread panicked: {:?}", e);
            }
        }
    }

    /// Check whether the daemon thread is still running.
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for FlushDaemon {
    fn drop(&mut self) {
        self.shutdown();
        self.join();
    }
}
