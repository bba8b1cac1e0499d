//! Static game configuration: tuning constants and the piano key layout.
//!
//! Everything here is plain data so the simulation modules stay testable
//! without a browser.

// Canvas
pub const CANVAS_BG: &str = "#000";

// Notes
pub const NOTE_START_Y: f64 = 110.0;
pub const NOTE_RADIUS: f64 = 22.0;
pub const NOTE_BASE_SPEED: f64 = 1.5;

// Scoring
pub const WIN_SCORE: i64 = 1000;
pub const POINTS_PER_NOTE: i64 = 10;

// Tempo ramp (wall-clock driven)
pub const BPM_INCREASE_DELAY_MS: f64 = 60_000.0; // grace period before ramping
pub const BPM_INCREASE_INTERVAL_MS: f64 = 10_000.0;
pub const BPM_INCREASE_AMOUNT: f64 = 2.0;
/// Note fall speed is scaled by `bpm / REFERENCE_BPM`.
pub const REFERENCE_BPM: f64 = 65.0;

// Layout
pub const BASE_BOTTOM_OFFSET: f64 = 265.0;
pub const KEYBOARD_HEIGHT: f64 = 200.0;

// Hit judgement band around the base line: [base_line - 40, base_line + 20]
pub const TARGET_ZONE_ABOVE: f64 = 40.0;
pub const TARGET_ZONE_BELOW: f64 = 20.0;

/// Milliseconds between spawned notes at the given tempo.
pub fn spawn_interval_ms(bpm: f64) -> f64 {
    60_000.0 / bpm
}

/// Tempo after `elapsed_ms` of wall-clock time: the base tempo plus one
/// fixed step per full interval past the grace period. Monotone in
/// elapsed time, so a stalled frame loop can never slow the ramp down.
pub fn ramped_bpm(song_bpm: f64, elapsed_ms: f64) -> f64 {
    if elapsed_ms <= BPM_INCREASE_DELAY_MS {
        return song_bpm;
    }
    let past_grace = elapsed_ms - BPM_INCREASE_DELAY_MS;
    let steps = (past_grace / BPM_INCREASE_INTERVAL_MS).floor();
    song_bpm + steps * BPM_INCREASE_AMOUNT
}

// --- Piano key layout ---------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyKind {
    White,
    Black,
}

/// One key of the on-screen piano. `pitch` uses scientific notation
/// ("C#4"); `label` is what gets painted on the key and on falling notes.
pub struct PianoKey {
    pub pitch: &'static str,
    pub kind: KeyKind,
    pub label: &'static str,
}

/// The 18-key run the game is played on, low to high.
pub static PIANO_KEYS: &[PianoKey] = &[
    PianoKey { pitch: "B2", kind: KeyKind::White, label: "B" },
    PianoKey { pitch: "C3", kind: KeyKind::White, label: "C" },
    PianoKey { pitch: "C#3", kind: KeyKind::Black, label: "C#" },
    PianoKey { pitch: "D3", kind: KeyKind::White, label: "D" },
    PianoKey { pitch: "D#3", kind: KeyKind::Black, label: "D#" },
    PianoKey { pitch: "E3", kind: KeyKind::White, label: "E" },
    PianoKey { pitch: "F3", kind: KeyKind::White, label: "F" },
    PianoKey { pitch: "F#3", kind: KeyKind::Black, label: "F#" },
    PianoKey { pitch: "G3", kind: KeyKind::White, label: "G" },
    PianoKey { pitch: "G#3", kind: KeyKind::Black, label: "G#" },
    PianoKey { pitch: "A3", kind: KeyKind::White, label: "A" },
    PianoKey { pitch: "A#3", kind: KeyKind::Black, label: "A#" },
    PianoKey { pitch: "B3", kind: KeyKind::White, label: "B" },
    PianoKey { pitch: "C4", kind: KeyKind::White, label: "C" },
    PianoKey { pitch: "C#4", kind: KeyKind::Black, label: "C#" },
    PianoKey { pitch: "D4", kind: KeyKind::White, label: "D" },
    PianoKey { pitch: "D#4", kind: KeyKind::Black, label: "D#" },
    PianoKey { pitch: "E4", kind: KeyKind::White, label: "E" },
];

/// Case-insensitive lookup of a layout key by pitch name.
pub fn key_for_pitch(pitch: &str) -> Option<&'static PianoKey> {
    PIANO_KEYS.iter().find(|k| k.pitch.eq_ignore_ascii_case(pitch))
}
