//! # Tuning Session
//!
//! Drives the per-frame pipeline for one tuner:
//! amplitude gate -> smoothing -> classification -> delivery.
//!
//! Results are delivered on a crossbeam channel created by [`Tuner::start`].
//! The receiving side (usually a UI thread) drains it at its own pace and sees
//! outputs in the order the frames were processed. The queue holds at most
//! [`OUTPUT_QUEUE_CAPACITY`] outputs; a slow consumer loses the oldest ones.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, trace, warn};

use crate::TunerReading;
use crate::config::TunerConfig;
use crate::error::{Result, TunerError};
use crate::pitch::{self, TunerOutput};
use crate::smoothing::Smoother;

/// Maximum number of outputs waiting for the consumer.
///
/// When the consumer falls behind, the oldest queued output is dropped to make
/// room for the newest one.
pub const OUTPUT_QUEUE_CAPACITY: usize = 64;

/// State that only exists between `start` and `stop`.
#[derive(Debug)]
struct Session {
    smoother: Smoother,
    output_tx: Sender<TunerOutput>,
    // Kept so `stop` and a full queue can discard outputs the consumer has not
    // picked up yet.
    pending_rx: Receiver<TunerOutput>,
}

/// A tuner turns (frequency, amplitude) frames into [`TunerOutput`]s.
///
/// A single instance must be driven from one frame-producing context at a
/// time; wrap it in a lock or hand it to a [`TunerWorker`](crate::worker::TunerWorker)
/// otherwise.
#[derive(Debug)]
pub struct Tuner {
    config: TunerConfig,
    session: Option<Session>,
}

impl Tuner {
    /// Creates a stopped tuner.
    ///
    /// The config is normalized here; this is the only place a tuner can fail
    /// fatally.
    pub fn new(config: TunerConfig) -> Result<Self> {
        let config = config.normalized()?;
        debug!(
            threshold = config.threshold,
            smoothing = config.smoothing,
            history_capacity = config.history_capacity,
            "created tuner"
        );
        Ok(Self {
            config,
            session: None,
        })
    }

    /// Starts a session with empty smoothing history.
    ///
    /// # Returns
    /// * `Ok(receiver)` - Channel on which every accepted frame's output arrives
    /// * `Err(AlreadyRunning)` - A session is active; stop it first
    pub fn start(&mut self) -> Result<Receiver<TunerOutput>> {
        if self.session.is_some() {
            return Err(TunerError::AlreadyRunning);
        }

        let smoother = Smoother::new(self.config.smoothing, self.config.history_capacity)?;
        let (output_tx, output_rx) = crossbeam_channel::bounded(OUTPUT_QUEUE_CAPACITY);
        self.session = Some(Session {
            smoother,
            output_tx,
            pending_rx: output_rx.clone(),
        });
        debug!("tuner started");
        Ok(output_rx)
    }

    /// Stops the session.
    ///
    /// Outputs still queued on the channel are discarded and the channel is
    /// closed, so the consumer sees a disconnect instead of stale readings.
    /// Stopping a stopped tuner does nothing.
    pub fn stop(&mut self) {
        let Some(session) = self.session.take() else {
            trace!("stop on a stopped tuner ignored");
            return;
        };

        let discarded = session.pending_rx.try_iter().count();
        if discarded > 0 {
            debug!(discarded, "dropped undelivered outputs on stop");
        }
        debug!("tuner stopped");
    }

    /// Ends the session but leaves outputs already queued for the consumer.
    ///
    /// The channel reports a disconnect once those have been received. Used
    /// when the frame source runs dry rather than on cancellation.
    pub fn finish(&mut self) {
        if self.session.take().is_some() {
            debug!("tuner finished");
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    /// Smoothed frequencies of the running session, oldest first.
    ///
    /// Empty when stopped.
    pub fn history(&self) -> Vec<f32> {
        self.session
            .as_ref()
            .map(|s| s.smoother.history().collect())
            .unwrap_or_default()
    }

    /// Processes one analysis frame.
    ///
    /// # Returns
    /// * `Ok(Some(output))` - The frame was accepted; the same output was queued
    ///   on the session channel
    /// * `Ok(None)` - The frame was at or below the amplitude threshold and was
    ///   dropped without touching the smoothing history
    /// * `Err(InvalidFrequency)` - The frame was discarded; the session continues
    /// * `Err(NotRunning)` - `start` has not been called
    pub fn process(&mut self, reading: TunerReading) -> Result<Option<TunerOutput>> {
        let config = &self.config;
        let session = self.session.as_mut().ok_or(TunerError::NotRunning)?;

        if reading.amplitude.is_nan() || reading.amplitude <= config.threshold {
            trace!(amplitude = reading.amplitude, "frame below threshold");
            return Ok(None);
        }

        // Validate before smoothing so a bad frame cannot poison the history.
        if let Err(e) = pitch::normalize_frequency(reading.frequency) {
            warn!(frequency = reading.frequency, "rejected frame: {}", e);
            return Err(e);
        }

        let smoothed = session.smoother.smooth(reading.frequency);
        let frequency = if config.classify_smoothed {
            smoothed
        } else {
            reading.frequency
        };

        let output = pitch::classify_with(frequency, reading.amplitude, config.spelling)?;
        trace!(
            note = %output.note(),
            distance = output.distance,
            smoothed,
            "classified frame"
        );

        session.deliver(output.clone());
        Ok(Some(output))
    }
}

impl Session {
    /// Queues an output, evicting the oldest one when the queue is full.
    fn deliver(&self, output: TunerOutput) {
        match self.output_tx.try_send(output) {
            Ok(()) => {}
            Err(TrySendError::Full(output)) => {
                if self.pending_rx.try_recv().is_ok() {
                    trace!("output queue full, dropped oldest output");
                }
                if let Err(e) = self.output_tx.try_send(output) {
                    warn!("failed to deliver tuner output: {}", e);
                }
            }
            Err(TrySendError::Disconnected(_)) => {
                warn!("tuner output channel disconnected");
            }
        }
    }
}

impl Drop for Tuner {
    fn drop(&mut self) {
        self.stop();
    }
}
