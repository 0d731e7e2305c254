use crate::keymap::Note;

/// Held notes in press order. The last entry is the audible one.
#[derive(Debug, Default, Clone)]
pub struct NoteStack {
    held: Vec<Note>,
}

impl NoteStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the note was already held (key repeat).
    pub fn press(&mut self, note: Note) -> bool {
        if self.held.contains(&note) {
            false
        } else {
            self.held.push(note);
            true
        }
    }

    pub fn release(&mut self, note: Note) -> bool {
        if let Some(index) = self.held.iter().position(|held| *held == note) {
            self.held.remove(index);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn current_note(&self) -> Option<Note> {
        self.held.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn contains(&self, note: Note) -> bool {
        self.held.contains(&note)
    }

    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        self.held.iter().copied()
    }
}
