use log::{debug, info};

use crate::graph::{ANALYSER_SIZE, SharedGraph, SignalGraph, lock_graph};
use crate::keymap::Note;
use crate::output::{AudioError, AudioHost, OutputDevice};
use crate::pitch::note_to_frequency;
use crate::wavetable::PeriodicWave;

pub type SampleBuffer = [f32; ANALYSER_SIZE];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Idle,
    Sounding,
}

struct Session<D> {
    graph: SharedGraph,
    device: D,
}

/// Owns the signal graph and the output device. The graph is built on first use and
/// kept for the rest of the session; audibility is toggled by suspending the output.
pub struct SynthEngine<H: AudioHost> {
    host: H,
    gain: f32,
    session: Option<Session<H::Device>>,
    state: EngineState,
    buffer: SampleBuffer,
}

impl<H: AudioHost> SynthEngine<H> {
    pub fn new(host: H, gain: f32) -> Self {
        Self {
            host,
            gain,
            session: None,
            state: EngineState::Uninitialized,
            buffer: [0.0; ANALYSER_SIZE],
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Builds the graph and opens the device if that has not happened yet. A failure
    /// leaves the engine uninitialized so a later call can retry.
    pub fn ensure_started(&mut self) -> Result<(), AudioError> {
        if self.session.is_some() {
            return Ok(());
        }
        let graph = SignalGraph::new(
            PeriodicWave::keyboard_timbre(),
            note_to_frequency(Note::REFERENCE),
            self.gain,
        )
        .into_shared();
        let device = self.host.open(graph.clone())?;
        info!(
            "signal graph built at {} Hz",
            lock_graph(&graph).sample_rate()
        );
        self.session = Some(Session { graph, device });
        self.state = EngineState::Idle;
        Ok(())
    }

    /// No-op before the graph exists.
    pub fn set_note(&mut self, note: Note) {
        if let Some(session) = &self.session {
            lock_graph(&session.graph).set_frequency(note_to_frequency(note));
        }
    }

    pub fn frequency(&self) -> Option<f64> {
        self.session
            .as_ref()
            .map(|session| lock_graph(&session.graph).frequency())
    }

    pub async fn resume_output(&mut self) -> Result<(), AudioError> {
        if self.state != EngineState::Idle {
            return Ok(());
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        session.device.resume().await?;
        debug!("output resumed");
        self.state = EngineState::Sounding;
        Ok(())
    }

    pub async fn suspend_output(&mut self) -> Result<(), AudioError> {
        if self.state != EngineState::Sounding {
            return Ok(());
        }
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };
        session.device.suspend().await?;
        debug!("output suspended");
        self.state = EngineState::Idle;
        Ok(())
    }

    /// Refreshes the snapshot from the analyser. Silence before the graph exists.
    pub fn sample(&mut self) -> &SampleBuffer {
        if let Some(session) = &self.session {
            lock_graph(&session.graph).time_domain(&mut self.buffer);
        }
        &self.buffer
    }

    /// The snapshot taken by the last `sample` call.
    pub fn last_buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    #[cfg(test)]
    pub(crate) fn graph(&self) -> Option<SharedGraph> {
        self.session.as_ref().map(|session| session.graph.clone())
    }
}
