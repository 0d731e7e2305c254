use std::collections::HashMap;
use std::sync::LazyLock;

use macroquad::prelude::KeyCode;

/// Signed semitone offset from the reference pitch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Note(pub i32);

impl Note {
    pub const REFERENCE: Note = Note(0);

    pub fn semitones(self) -> i32 {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct KeyBinding {
    pub name: &'static str,
    pub keycode: KeyCode,
    pub note: Note,
}

const fn bind(name: &'static str, keycode: KeyCode, semitones: i32) -> KeyBinding {
    KeyBinding {
        name,
        keycode,
        note: Note(semitones),
    }
}

// Bottom row runs C4..E5 with A4 on `n`; the top row starts again at C5 on `q`.
static BINDINGS: [KeyBinding; 38] = [
    bind("z", KeyCode::Z, -9),
    bind("s", KeyCode::S, -8),
    bind("x", KeyCode::X, -7),
    bind("d", KeyCode::D, -6),
    bind("c", KeyCode::C, -5),
    bind("v", KeyCode::V, -4),
    bind("g", KeyCode::G, -3),
    bind("b", KeyCode::B, -2),
    bind("h", KeyCode::H, -1),
    bind("n", KeyCode::N, 0),
    bind("j", KeyCode::J, 1),
    bind("m", KeyCode::M, 2),
    bind(",", KeyCode::Comma, 3),
    bind("l", KeyCode::L, 4),
    bind(".", KeyCode::Period, 5),
    bind(";", KeyCode::Semicolon, 6),
    bind("/", KeyCode::Slash, 7),
    bind("q", KeyCode::Q, 3),
    bind("2", KeyCode::Key2, 4),
    bind("w", KeyCode::W, 5),
    bind("3", KeyCode::Key3, 6),
    bind("e", KeyCode::E, 7),
    bind("r", KeyCode::R, 8),
    bind("5", KeyCode::Key5, 9),
    bind("t", KeyCode::T, 10),
    bind("6", KeyCode::Key6, 11),
    bind("y", KeyCode::Y, 12),
    bind("7", KeyCode::Key7, 13),
    bind("u", KeyCode::U, 14),
    bind("i", KeyCode::I, 15),
    bind("9", KeyCode::Key9, 16),
    bind("o", KeyCode::O, 17),
    bind("0", KeyCode::Key0, 18),
    bind("p", KeyCode::P, 19),
    bind("[", KeyCode::LeftBracket, 20),
    bind("=", KeyCode::Equal, 21),
    bind("]", KeyCode::RightBracket, 22),
    bind("\\", KeyCode::Backslash, 24),
];

static KEY_MAP: LazyLock<KeyMap> = LazyLock::new(KeyMap::build);

/// Read-only table from key names to notes.
pub struct KeyMap {
    by_name: HashMap<&'static str, Note>,
    by_code: HashMap<KeyCode, &'static KeyBinding>,
}

impl KeyMap {
    pub fn global() -> &'static KeyMap {
        &KEY_MAP
    }

    fn build() -> Self {
        let mut by_name = HashMap::with_capacity(BINDINGS.len());
        let mut by_code = HashMap::with_capacity(BINDINGS.len());
        for binding in BINDINGS.iter() {
            by_name.insert(binding.name, binding.note);
            by_code.insert(binding.keycode, binding);
        }
        Self { by_name, by_code }
    }

    /// `None` for unmapped keys; callers ignore those.
    pub fn note_for(&self, key: &str) -> Option<Note> {
        self.by_name.get(key).copied()
    }

    pub fn binding_for_code(&self, keycode: KeyCode) -> Option<&'static KeyBinding> {
        self.by_code.get(&keycode).copied()
    }

    pub fn bindings(&self) -> &'static [KeyBinding] {
        &BINDINGS
    }
}
