use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::wavetable::PeriodicWave;

pub const ANALYSER_SIZE: usize = 1024;
pub const DEFAULT_GAIN: f32 = 0.5;
const DEFAULT_SAMPLE_RATE: f64 = 44_100.0;

pub type SharedGraph = Arc<Mutex<SignalGraph>>;

/// Locks the graph, recovering from a panicked holder. The graph only holds plain
/// numeric state, so a poisoned lock is still consistent enough to keep rendering.
pub fn lock_graph(graph: &SharedGraph) -> MutexGuard<'_, SignalGraph> {
    graph.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Free-running wavetable oscillator. Once built it is never stopped.
pub struct Oscillator {
    wave: PeriodicWave,
    frequency: f64,
    phase: f64,
}

impl Oscillator {
    pub fn new(wave: PeriodicWave, frequency: f64) -> Self {
        Self {
            wave,
            frequency,
            phase: 0.0,
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn set_frequency(&mut self, hz: f64) {
        self.frequency = hz.max(0.0);
    }

    fn next_sample(&mut self, sample_rate: f64) -> f32 {
        let value = self.wave.sample(self.phase);
        self.phase = (self.phase + self.frequency / sample_rate).fract();
        value
    }
}

pub struct Gain {
    level: f32,
}

impl Gain {
    pub fn new(level: f32) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    fn apply(&self, input: f32) -> f32 {
        input * self.level
    }
}

/// Keeps the most recent `ANALYSER_SIZE` samples that passed through it.
pub struct Analyser {
    buffer: Vec<f32>,
    cursor: usize,
}

impl Analyser {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            cursor: 0,
        }
    }

    fn push(&mut self, value: f32) {
        if let Some(slot) = self.buffer.get_mut(self.cursor) {
            *slot = value;
        }
        self.cursor = (self.cursor + 1) % self.buffer.len();
    }

    /// Copies the history oldest-first into `out`. If `out` is shorter than the
    /// history, only the newest samples are copied; any excess is zero-filled.
    pub fn time_domain(&self, out: &mut [f32]) {
        let len = self.buffer.len();
        let count = out.len().min(len);
        let start = (self.cursor + len - count) % len;
        for (offset, slot) in out.iter_mut().take(count).enumerate() {
            *slot = self.buffer[(start + offset) % len];
        }
        out[count..].fill(0.0);
    }
}

/// oscillator → gain → analyser → output
pub struct SignalGraph {
    oscillator: Oscillator,
    gain: Gain,
    analyser: Analyser,
    sample_rate: f64,
}

impl SignalGraph {
    pub fn new(wave: PeriodicWave, frequency: f64, gain: f32) -> Self {
        Self {
            oscillator: Oscillator::new(wave, frequency),
            gain: Gain::new(gain),
            analyser: Analyser::new(ANALYSER_SIZE),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    pub fn into_shared(self) -> SharedGraph {
        Arc::new(Mutex::new(self))
    }

    pub fn set_sample_rate(&mut self, rate: f64) {
        self.sample_rate = rate.max(1.0);
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn frequency(&self) -> f64 {
        self.oscillator.frequency()
    }

    pub fn set_frequency(&mut self, hz: f64) {
        self.oscillator.set_frequency(hz);
    }

    pub fn gain(&self) -> f32 {
        self.gain.level()
    }

    pub fn next_sample(&mut self) -> f32 {
        let source = self.oscillator.next_sample(self.sample_rate);
        let out = self.gain.apply(source);
        self.analyser.push(out);
        out
    }

    /// Fills a mono block. While suspended the oscillator does not advance and the
    /// analyser sees silence, as it would with a stopped audio clock.
    pub fn render(&mut self, out: &mut [f32], running: bool) {
        if running {
            for slot in out.iter_mut() {
                *slot = self.next_sample();
            }
        } else {
            for slot in out.iter_mut() {
                self.analyser.push(0.0);
                *slot = 0.0;
            }
        }
    }

    pub fn time_domain(&self, out: &mut [f32]) {
        self.analyser.time_domain(out);
    }
}
