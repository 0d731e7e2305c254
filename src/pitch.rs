use crate::keymap::Note;

/// Frequency of `Note::REFERENCE` (concert A).
pub const REFERENCE_FREQUENCY: f64 = 440.0;

/// Twelve-tone equal temperament around `REFERENCE_FREQUENCY`.
pub fn note_to_frequency(note: Note) -> f64 {
    REFERENCE_FREQUENCY * 2.0f64.powf(note.semitones() as f64 / 12.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn reference_note_is_reference_frequency() {
        assert!(close(note_to_frequency(Note(0)), REFERENCE_FREQUENCY));
    }

    #[test]
    fn octaves_double_and_halve() {
        assert!(close(note_to_frequency(Note(12)), 2.0 * REFERENCE_FREQUENCY));
        assert!(close(note_to_frequency(Note(-12)), REFERENCE_FREQUENCY / 2.0));
        assert!(close(note_to_frequency(Note(24)), 4.0 * REFERENCE_FREQUENCY));
    }

    #[test]
    fn semitone_step_is_twelfth_root_of_two() {
        let ratio = note_to_frequency(Note(1)) / note_to_frequency(Note(0));
        assert!(close(ratio, 2.0f64.powf(1.0 / 12.0)));
        assert!(close(note_to_frequency(Note(1)), 466.1637615180899));
    }
}
