//! # Tuner Worker
//!
//! Runs a [`Tuner`] on a dedicated thread. Frames arrive on a channel from the
//! audio analysis side; outputs leave on the tuner's own channel.
//!
//! ## Architecture
//! - **Producer**: whatever yields (frequency, amplitude) frames
//! - **Worker thread**: gate, smooth and classify each frame in arrival order
//! - **Consumer**: drains the output receiver, typically from a UI tick

use crossbeam_channel::{Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::TunerReading;
use crate::error::{Result, TunerError};
use crate::pitch::TunerOutput;
use crate::session::Tuner;

/// Handle to a running worker thread.
///
/// Dropping the handle without calling [`TunerWorker::stop`] still signals the
/// thread to finish, but does not wait for it.
#[derive(Debug)]
pub struct TunerWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<Tuner>>,
}

impl TunerWorker {
    /// Starts `tuner` and moves it onto a new thread fed by `readings`.
    ///
    /// The loop ends when [`stop`](Self::stop) is called or when every sender
    /// of `readings` has been dropped.
    ///
    /// # Returns
    /// * `Ok((worker, outputs))` - Worker handle and the output receiver
    /// * `Err(AlreadyRunning)` - The tuner was already started
    /// * `Err(WorkerSpawn)` - The thread could not be created
    pub fn spawn(
        mut tuner: Tuner,
        readings: Receiver<TunerReading>,
    ) -> Result<(Self, Receiver<TunerOutput>)> {
        let outputs = tuner.start()?;
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);

        let thread_handle = thread::Builder::new()
            .name("tuner-worker".to_string())
            .spawn(move || run(tuner, readings, shutdown_rx))?;

        info!("tuner worker started");
        Ok((
            Self {
                shutdown_tx,
                thread_handle: Some(thread_handle),
            },
            outputs,
        ))
    }

    /// Signals the thread to finish, waits for it and returns the stopped tuner.
    pub fn stop(mut self) -> Result<Tuner> {
        let _ = self.shutdown_tx.try_send(());
        let handle = self
            .thread_handle
            .take()
            .ok_or(TunerError::WorkerPanicked)?;
        let tuner = handle.join().map_err(|_| TunerError::WorkerPanicked)?;
        info!("tuner worker stopped");
        Ok(tuner)
    }

    /// Whether the worker thread is still running.
    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TunerWorker {
    fn drop(&mut self) {
        if self.thread_handle.is_some() {
            let _ = self.shutdown_tx.try_send(());
        }
    }
}

fn run(mut tuner: Tuner, readings: Receiver<TunerReading>, shutdown_rx: Receiver<()>) -> Tuner {
    debug!("entering tuner processing loop");
    loop {
        crossbeam_channel::select! {
            recv(readings) -> msg => match msg {
                Ok(reading) => {
                    // One bad frame is skipped; the session carries on.
                    if let Err(e) = tuner.process(reading) {
                        warn!("skipping frame: {}", e);
                    }
                },
                Err(_) => {
                    debug!("readings channel closed");
                    tuner.finish();
                    break;
                },
            },
            recv(shutdown_rx) -> _ => {
                debug!("received shutdown signal");
                tuner.stop();
                break;
            },
        }
    }
    tuner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TunerConfig;

    #[test]
    fn test_outputs_arrive_in_order() {
        let tuner = Tuner::new(TunerConfig::default()).unwrap();
        let (frames_tx, frames_rx) = crossbeam_channel::unbounded();
        let (worker, outputs) = TunerWorker::spawn(tuner, frames_rx).unwrap();

        let frequencies: Vec<f32> = (0..20).map(|i| 100.0 + 10.0 * i as f32).collect();
        for &f in &frequencies {
            frames_tx.send(TunerReading::new(f, 0.5)).unwrap();
        }

        let received: Vec<f32> = outputs
            .iter()
            .take(frequencies.len())
            .map(|output| output.frequency)
            .collect();
        assert_eq!(received, frequencies);

        let tuner = worker.stop().unwrap();
        assert!(!tuner.is_running());
    }

    #[test]
    fn test_spawn_rejects_running_tuner() {
        let mut tuner = Tuner::new(TunerConfig::default()).unwrap();
        let _rx = tuner.start().unwrap();
        let (_frames_tx, frames_rx) = crossbeam_channel::unbounded();
        assert!(matches!(
            TunerWorker::spawn(tuner, frames_rx),
            Err(TunerError::AlreadyRunning)
        ));
    }

    #[test]
    fn test_closed_readings_channel_ends_worker() {
        let tuner = Tuner::new(TunerConfig::default()).unwrap();
        let (frames_tx, frames_rx) = crossbeam_channel::unbounded::<TunerReading>();
        let (worker, outputs) = TunerWorker::spawn(tuner, frames_rx).unwrap();

        drop(frames_tx);
        // The worker finishes its tuner on exit, which closes the output channel.
        assert!(outputs.recv().is_err());
        let tuner = worker.stop().unwrap();
        assert!(!tuner.is_running());
    }
}
