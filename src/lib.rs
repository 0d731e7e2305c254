//! Virtual keyboard synth: held keys drive a single wavetable oscillator, and a
//! scope shows the signal after the gain stage.

pub mod config;
pub mod controller;
pub mod engine;
pub mod graph;
pub mod keymap;
pub mod notestack;
pub mod output;
pub mod pitch;
pub mod render_loop;
pub mod scope;
pub mod transport;
pub mod wavetable;
