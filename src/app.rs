use anyhow::{Context, Result};
use log::{error, warn};
use macroquad::input::utils::{register_input_subscriber, repeat_all_miniquad_input};
use macroquad::miniquad::{EventHandler, KeyMods};
use macroquad::prelude::*;
use tokio::runtime::Runtime;

use keyscope::controller::{Controller, InputEvent};
use keyscope::engine::SynthEngine;
use keyscope::keymap::KeyMap;
use keyscope::output::CpalHost;
use keyscope::scope::{Canvas, Oscilloscope, ScopeStyle, dash_segments};

/// Collects window events in arrival order. Auto-repeat key-downs are dropped.
struct WindowEvents {
    keymap: &'static KeyMap,
    events: Vec<InputEvent>,
}

impl WindowEvents {
    fn new(keymap: &'static KeyMap) -> Self {
        Self {
            keymap,
            events: Vec::new(),
        }
    }
}

impl EventHandler for WindowEvents {
    fn update(&mut self) {}

    fn draw(&mut self) {}

    fn key_down_event(&mut self, keycode: KeyCode, _keymods: KeyMods, repeat: bool) {
        if !repeat {
            self.events
                .push(InputEvent::KeyDown(key_name(self.keymap, keycode)));
        }
    }

    fn key_up_event(&mut self, keycode: KeyCode, _keymods: KeyMods) {
        self.events
            .push(InputEvent::KeyUp(key_name(self.keymap, keycode)));
    }

    fn window_minimized_event(&mut self) {
        self.events.push(InputEvent::Blur);
    }
}

struct InputPoller {
    window: WindowEvents,
    subscriber: usize,
    size: (f32, f32),
}

impl InputPoller {
    fn new() -> Self {
        Self {
            window: WindowEvents::new(KeyMap::global()),
            subscriber: register_input_subscriber(),
            size: (screen_width(), screen_height()),
        }
    }

    fn poll(&mut self) -> Vec<InputEvent> {
        repeat_all_miniquad_input(&mut self.window, self.subscriber);
        let mut events = std::mem::take(&mut self.window.events);

        let size = (screen_width(), screen_height());
        if size != self.size {
            self.size = size;
            events.push(InputEvent::Resize {
                width: size.0,
                height: size.1,
            });
        }
        events
    }
}

fn key_name(keymap: &KeyMap, keycode: KeyCode) -> String {
    match keymap.binding_for_code(keycode) {
        Some(binding) => binding.name.to_string(),
        None => format!("{keycode:?}"),
    }
}

fn present(canvas: &Canvas, background: Color) {
    clear_background(background);
    for stroke in canvas.strokes() {
        for (from, to) in dash_segments(&stroke.points, &stroke.style.dash) {
            draw_line(
                from.x,
                from.y,
                to.x,
                to.y,
                stroke.style.width,
                stroke.style.color,
            );
        }
    }
}

pub async fn run(style: ScopeStyle, gain: f32) {
    if let Err(err) = run_session(style, gain).await {
        error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run_session(style: ScopeStyle, gain: f32) -> Result<()> {
    let canvas =
        Canvas::new(screen_width(), screen_height()).context("creating the scope surface")?;
    let background = style.background;
    let scope = Oscilloscope::new(canvas, style);
    let mut controller = Controller::new(SynthEngine::new(CpalHost, gain), scope);
    let mut input = InputPoller::new();
    let runtime = Runtime::new().context("starting the tokio runtime")?;

    loop {
        for event in input.poll() {
            if let Err(err) = controller.dispatch(&runtime, event) {
                warn!("audio output unavailable, retrying on next key press: {err}");
            }
        }
        controller.frame(get_time());
        present(controller.scope().canvas(), background);
        next_frame().await;
    }
}
