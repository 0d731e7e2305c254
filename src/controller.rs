use std::time::Duration;

use tokio::runtime::Runtime;

use crate::engine::{EngineState, SynthEngine};
use crate::keymap::KeyMap;
use crate::notestack::NoteStack;
use crate::output::{AudioError, AudioHost};
use crate::render_loop::{FrameQueue, RenderLoop};
use crate::scope::Oscilloscope;

/// Far below a display refresh period, so every frame renders.
pub const RENDER_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(String),
    KeyUp(String),
    Blur,
    Resize { width: f32, height: f32 },
}

/// The keyboard session: held notes, the synth, the scope and the loop that feeds it.
pub struct Controller<H: AudioHost> {
    keymap: &'static KeyMap,
    notes: NoteStack,
    engine: SynthEngine<H>,
    scope: Oscilloscope,
    render_loop: RenderLoop,
    frames: FrameQueue,
}

impl<H: AudioHost> Controller<H> {
    pub fn new(engine: SynthEngine<H>, mut scope: Oscilloscope) -> Self {
        scope.draw(None);
        Self {
            keymap: KeyMap::global(),
            notes: NoteStack::new(),
            engine,
            scope,
            render_loop: RenderLoop::new(RENDER_INTERVAL),
            frames: FrameQueue::new(),
        }
    }

    pub fn notes(&self) -> &NoteStack {
        &self.notes
    }

    pub fn engine(&self) -> &SynthEngine<H> {
        &self.engine
    }

    pub fn scope(&self) -> &Oscilloscope {
        &self.scope
    }

    pub fn is_rendering(&self) -> bool {
        self.render_loop.is_running()
    }

    /// Returns `true` when the event was a mapped key whose default handling the
    /// host should suppress.
    pub async fn handle(&mut self, event: InputEvent) -> Result<bool, AudioError> {
        match event {
            InputEvent::KeyDown(key) => self.key_down(&key).await,
            InputEvent::KeyUp(key) => self.key_up(&key).await.map(|_| false),
            InputEvent::Blur => self.blur().await.map(|_| false),
            InputEvent::Resize { width, height } => {
                self.resize(width, height);
                Ok(false)
            }
        }
    }

    /// Handles one event to completion on `runtime`. Host confirmations wake the
    /// runtime's waker, so a caller inside another executor's frame never parks on
    /// the audio thread.
    pub fn dispatch(&mut self, runtime: &Runtime, event: InputEvent) -> Result<bool, AudioError> {
        runtime.block_on(self.handle(event))
    }

    pub async fn key_down(&mut self, key: &str) -> Result<bool, AudioError> {
        self.engine.ensure_started()?;
        let Some(note) = self.keymap.note_for(key) else {
            return Ok(false);
        };
        if !self.notes.press(note) {
            return Ok(true);
        }
        self.engine.set_note(note);
        self.engine.resume_output().await?;
        self.render_loop.resume(&mut self.frames);
        Ok(true)
    }

    pub async fn key_up(&mut self, key: &str) -> Result<(), AudioError> {
        if let Some(note) = self.keymap.note_for(key) {
            self.notes.release(note);
        }
        match self.notes.current_note() {
            Some(note) => {
                self.engine.set_note(note);
                Ok(())
            }
            None => {
                self.render_loop.suspend(&mut self.frames);
                self.engine.suspend_output().await
            }
        }
    }

    /// Abandons every held note; key-ups for them later find nothing to release.
    pub async fn blur(&mut self) -> Result<(), AudioError> {
        self.render_loop.suspend(&mut self.frames);
        self.redraw();
        self.notes.clear();
        self.engine.suspend_output().await
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.scope.resize(width, height);
        self.redraw();
    }

    /// Runs the frame requests due on this display refresh.
    pub fn frame(&mut self, timestamp: f64) {
        let engine = &mut self.engine;
        let scope = &mut self.scope;
        for request in self.frames.take_due() {
            self.render_loop
                .on_frame(request, timestamp, &mut self.frames, || {
                    scope.draw(Some(engine.sample().as_slice()));
                });
        }
    }

    fn redraw(&mut self) {
        let buffer = match self.engine.state() {
            EngineState::Uninitialized => None,
            EngineState::Idle | EngineState::Sounding => Some(&self.engine.last_buffer()[..]),
        };
        self.scope.draw(buffer);
    }
}
