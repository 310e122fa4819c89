//! Cyclic buffer exchange between the signal model and shared buffers.
//!
//! Two worker threads run at a fixed period: the input worker decodes the
//! input buffer into the model's input signals, the output worker encodes
//! the model's output signals into the output buffer. Buffers are plain
//! `Vec<u8>` behind a mutex so an external transport (fieldbus driver,
//! shared memory, test harness) can swap whole frames in and out between
//! cycles.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, error, info};

use crate::codec::{self, layout_bytes};
use crate::config::ExchangeConfig;
use crate::device::SignalRegistry;
use crate::signal::IoSignal;

/// Cyclic exchange loop over one input and one output buffer.
pub struct ExchangeRunner {
    config: ExchangeConfig,
    inputs: Vec<Arc<IoSignal>>,
    outputs: Vec<Arc<IoSignal>>,
    input_buffer: Arc<Mutex<Vec<u8>>>,
    output_buffer: Arc<Mutex<Vec<u8>>>,
    stop: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl ExchangeRunner {
    /// Build a runner for the registry's signals. Buffers are sized from
    /// the signal layout plus the configured byte offsets.
    pub fn new(registry: &SignalRegistry, config: ExchangeConfig) -> Self {
        let inputs = registry.inputs().to_vec();
        let outputs = registry.outputs().to_vec();
        let input_len = config.input_offset + layout_bytes(&inputs);
        let output_len = config.output_offset + layout_bytes(&outputs);

        Self {
            config,
            inputs,
            outputs,
            input_buffer: Arc::new(Mutex::new(vec![0u8; input_len])),
            output_buffer: Arc::new(Mutex::new(vec![0u8; output_len])),
            stop: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
        }
    }

    /// Shared handle to the input buffer. A transport writes received
    /// frames here; the input worker decodes them each cycle.
    pub fn input_buffer(&self) -> Arc<Mutex<Vec<u8>>> {
        self.input_buffer.clone()
    }

    /// Shared handle to the output buffer. The output worker encodes into
    /// it each cycle; a transport sends it on.
    pub fn output_buffer(&self) -> Arc<Mutex<Vec<u8>>> {
        self.output_buffer.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.workers.is_empty() && !self.stop.load(Ordering::Relaxed)
    }

    /// Spawn the two workers. Calling start twice is a no-op.
    pub fn start(&mut self) {
        if !self.workers.is_empty() {
            return;
        }
        self.stop.store(false, Ordering::Relaxed);

        info!(
            cycle_time_ms = self.config.cycle_time_ms,
            inputs = self.inputs.len(),
            outputs = self.outputs.len(),
            "starting exchange"
        );

        let period = Duration::from_millis(self.config.cycle_time_ms);

        let decode_worker = {
            let signals = self.inputs.clone();
            let buffer = self.input_buffer.clone();
            let stop = self.stop.clone();
            let offset = self.config.input_offset;
            std::thread::Builder::new()
                .name("eio-input".to_string())
                .spawn(move || {
                    run_cycle(stop, period, move || {
                        let frame = buffer.lock();
                        codec::decode(&signals, &frame, offset)
                    });
                })
        };

        let encode_worker = {
            let signals = self.outputs.clone();
            let buffer = self.output_buffer.clone();
            let stop = self.stop.clone();
            let offset = self.config.output_offset;
            std::thread::Builder::new()
                .name("eio-output".to_string())
                .spawn(move || {
                    run_cycle(stop, period, move || {
                        let mut frame = buffer.lock();
                        codec::encode(&signals, &mut frame, offset)
                    });
                })
        };

        for worker in [decode_worker, encode_worker] {
            match worker {
                Ok(handle) => self.workers.push(handle),
                Err(e) => {
                    error!("failed to spawn exchange worker: {e}");
                    self.stop.store(true, Ordering::Relaxed);
                }
            }
        }
    }

    /// Signal the workers to stop without waiting for them.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Stop the workers and wait for them to exit.
    pub fn stop(&mut self) {
        self.request_stop();
        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                error!("exchange worker panicked");
            }
        }
        info!("exchange stopped");
    }
}

impl Drop for ExchangeRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Fixed-period loop body. A codec error is fatal for the whole
/// exchange: it flips the shared stop flag so the paired worker also
/// winds down.
fn run_cycle<E, F>(stop: Arc<AtomicBool>, period: Duration, mut body: F)
where
    E: std::fmt::Display,
    F: FnMut() -> Result<(), E>,
{
    while !stop.load(Ordering::Relaxed) {
        let started = Instant::now();

        if let Err(e) = body() {
            error!("exchange cycle failed: {e}");
            stop.store(true, Ordering::Relaxed);
            break;
        }

        let elapsed = started.elapsed();
        if elapsed < period {
            std::thread::sleep(period - elapsed);
        } else {
            debug!(elapsed_us = elapsed.as_micros() as u64, "cycle overrun");
        }
    }
}
