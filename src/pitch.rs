//! Scientific pitch name to frequency conversion for the audio cues.

/// Semitone offset of a natural note letter within an octave (C = 0).
fn letter_semitone(letter: char) -> Option<i32> {
    match letter.to_ascii_uppercase() {
        'C' => Some(0),
        'D' => Some(2),
        'E' => Some(4),
        'F' => Some(5),
        'G' => Some(7),
        'A' => Some(9),
        'B' => Some(11),
        _ => None,
    }
}

/// Frequency in Hz of a pitch like "A4", "C#3" or "e3" (A4 = 440 Hz).
/// Returns `None` for anything that is not letter + optional '#' + octave.
pub fn frequency(pitch: &str) -> Option<f64> {
    let mut chars = pitch.chars();
    let mut semitone = letter_semitone(chars.next()?)?;
    let rest: &str = chars.as_str();
    let octave_str = if let Some(stripped) = rest.strip_prefix('#') {
        semitone += 1;
        stripped
    } else {
        rest
    };
    if octave_str.is_empty() {
        return None;
    }
    let octave: i32 = octave_str.parse().ok()?;
    // MIDI numbering: C-1 = 0, A4 = 69.
    let midi = (octave + 1) * 12 + semitone;
    Some(440.0 * 2f64.powf((midi - 69) as f64 / 12.0))
}
