use std::future::Future;

use cpal::{
    SampleFormat, Stream,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use log::{error, info};
use thiserror::Error;

use crate::graph::{SharedGraph, lock_graph};
use crate::transport::{TransportControl, TransportTap, transport};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no default audio output device")]
    NoOutputDevice,
    #[error("failed to query output config: {0}")]
    Config(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build output stream: {0}")]
    Build(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("unsupported sample format {0}")]
    UnsupportedFormat(String),
    #[error("audio stream failed: {0}")]
    StreamFailed(String),
    #[error("audio device disconnected")]
    Disconnected,
    #[error("audio device did not confirm the request")]
    Unresponsive,
}

/// Capability to turn a signal graph into audible output.
pub trait AudioHost {
    type Device: OutputDevice;

    fn open(&mut self, graph: SharedGraph) -> Result<Self::Device, AudioError>;
}

/// A running output path whose audibility can be toggled. Both operations resolve
/// once the device has confirmed the new state.
pub trait OutputDevice {
    fn resume(&mut self) -> impl Future<Output = Result<(), AudioError>>;
    fn suspend(&mut self) -> impl Future<Output = Result<(), AudioError>>;
}

#[derive(Default)]
pub struct CpalHost;

impl AudioHost for CpalHost {
    type Device = CpalDevice;

    fn open(&mut self, graph: SharedGraph) -> Result<CpalDevice, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let supported = device.default_output_config()?;
        let config = supported.config();
        let sample_rate = config.sample_rate.0 as f64;
        lock_graph(&graph).set_sample_rate(sample_rate);

        let (control, tap) = transport();
        let stream = match supported.sample_format() {
            SampleFormat::F32 => build_stream(&device, &config, graph, tap, |sample| sample)?,
            SampleFormat::I16 => build_stream(&device, &config, graph, tap, |sample: f32| {
                (sample * i16::MAX as f32) as i16
            })?,
            SampleFormat::U16 => build_stream(&device, &config, graph, tap, |sample: f32| {
                let scaled = (sample * 0.5 + 0.5).clamp(0.0, 1.0);
                (scaled * u16::MAX as f32) as u16
            })?,
            other => return Err(AudioError::UnsupportedFormat(format!("{other:?}"))),
        };
        stream.play()?;
        info!(
            "audio output on {} at {sample_rate} Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "unknown device".into()),
            config.channels
        );
        Ok(CpalDevice {
            _stream: stream,
            transport: control,
        })
    }
}

pub struct CpalDevice {
    _stream: Stream,
    transport: TransportControl,
}

impl OutputDevice for TransportControl {
    async fn resume(&mut self) -> Result<(), AudioError> {
        TransportControl::resume(self).await
    }

    async fn suspend(&mut self) -> Result<(), AudioError> {
        TransportControl::suspend(self).await
    }
}

impl OutputDevice for CpalDevice {
    async fn resume(&mut self) -> Result<(), AudioError> {
        self.transport.resume().await
    }

    async fn suspend(&mut self) -> Result<(), AudioError> {
        self.transport.suspend().await
    }
}

fn build_stream<T, F>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    graph: SharedGraph,
    tap: TransportTap,
    convert: F,
) -> Result<Stream, AudioError>
where
    T: cpal::SizedSample + Send + 'static,
    F: Fn(f32) -> T + Send + 'static,
{
    let channels = config.channels as usize;
    let error_tap = tap.clone();
    let mut scratch = Vec::new();
    let stream = device.build_output_stream(
        config,
        move |output: &mut [T], _| {
            fill_output_buffer(output, channels, &graph, &tap, &mut scratch, &convert);
        },
        move |err| {
            error!("audio stream error: {err}");
            error_tap.fail(err.to_string());
        },
        None,
    )?;
    Ok(stream)
}

fn fill_output_buffer<T, F>(
    output: &mut [T],
    channels: usize,
    graph: &SharedGraph,
    tap: &TransportTap,
    scratch: &mut Vec<f32>,
    convert: &F,
) where
    F: Fn(f32) -> T,
    T: Copy,
{
    let channels = channels.max(1);
    let frames = output.len() / channels;
    if scratch.len() < frames {
        scratch.resize(frames, 0.0);
    }
    let running = tap.poll();
    lock_graph(graph).render(&mut scratch[..frames], running);
    for (frame, &sample) in output.chunks_mut(channels).zip(scratch.iter()) {
        let value = convert(sample.clamp(-0.98, 0.98));
        for channel in frame {
            *channel = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SignalGraph;
    use crate::wavetable::PeriodicWave;

    fn shared_sine() -> SharedGraph {
        let wave = PeriodicWave::from_coefficients(&[0.0, 0.0], &[0.0, 1.0]);
        let mut graph = SignalGraph::new(wave, 12_000.0, 1.0);
        graph.set_sample_rate(48_000.0);
        graph.into_shared()
    }

    #[test]
    fn suspended_tap_writes_silence_to_every_channel() {
        let graph = shared_sine();
        let (_control, tap) = transport();
        let mut scratch = Vec::new();
        let mut output = [7.0f32; 8];
        fill_output_buffer(&mut output, 2, &graph, &tap, &mut scratch, &|s| s);
        assert!(output.iter().all(|s| *s == 0.0));
    }

    #[tokio::test]
    async fn running_tap_duplicates_mono_and_clamps() {
        let graph = shared_sine();
        let (mut control, tap) = transport();
        let mut scratch = Vec::new();
        let mut output = [0.0f32; 8];
        let mut resume = Box::pin(control.resume());
        let waker = std::task::Waker::noop();
        let mut cx = std::task::Context::from_waker(waker);
        assert!(resume.as_mut().poll(&mut cx).is_pending());
        fill_output_buffer(&mut output, 2, &graph, &tap, &mut scratch, &|s| s);
        resume.await.unwrap();

        // Frames step a quarter cycle: 0, +1, 0, -1, clamped to ±0.98.
        assert!(output[0].abs() < 1e-6);
        assert_eq!(output[2], 0.98);
        assert_eq!(output[3], 0.98);
        assert_eq!(output[6], -0.98);
        assert_eq!(output[7], -0.98);
    }

    #[test]
    fn integer_conversion_matches_full_scale() {
        let graph = shared_sine();
        let (_control, tap) = transport();
        let mut scratch = Vec::new();
        let mut output = [1i16; 4];
        fill_output_buffer(&mut output, 1, &graph, &tap, &mut scratch, &|s: f32| {
            (s * i16::MAX as f32) as i16
        });
        assert_eq!(output, [0; 4]);
    }
}
