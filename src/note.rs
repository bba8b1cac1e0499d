//! Falling notes and the hit judgement applied to key presses.

use crate::config::{
    self, NOTE_BASE_SPEED, NOTE_START_Y, POINTS_PER_NOTE, REFERENCE_BPM, TARGET_ZONE_ABOVE,
    TARGET_ZONE_BELOW,
};

/// A note descending toward the bases. `x` is fixed at spawn time from the
/// key layout; `y` advances every frame until the note is hit, reaches a
/// base, or falls off screen.
pub struct Note {
    pub pitch: String,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub active: bool,
}

impl Note {
    pub fn new(pitch: &str, x: f64) -> Self {
        let label = config::key_for_pitch(pitch)
            .map(|k| k.label.to_string())
            .unwrap_or_else(|| pitch.to_string());
        Self {
            pitch: pitch.to_string(),
            label,
            x,
            y: NOTE_START_Y,
            active: true,
        }
    }

    /// Advance one frame. The fall speed scales with the current tempo
    /// relative to the reference tempo.
    pub fn advance(&mut self, bpm: f64) {
        if !self.active {
            return;
        }
        self.y += NOTE_BASE_SPEED * (bpm / REFERENCE_BPM);
    }

    pub fn matches_pitch(&self, pitch: &str) -> bool {
        self.pitch.eq_ignore_ascii_case(pitch)
    }

    /// Whether the note sits inside the hit band near the base line.
    pub fn in_target_zone(&self, viewport_height: f64) -> bool {
        let base_line = viewport_height - config::BASE_BOTTOM_OFFSET;
        self.y >= base_line - TARGET_ZONE_ABOVE && self.y <= base_line + TARGET_ZONE_BELOW
    }

    pub fn off_screen(&self, viewport_height: f64) -> bool {
        self.y > viewport_height
    }
}

/// Colour for a note by queue position (0 = next to hit), as (fill, text).
pub fn queue_color(position: usize) -> (&'static str, &'static str) {
    match position {
        0 => ("#00ff00", "#000"),
        1 => ("#ffff00", "#000"),
        2 => ("#ff8800", "#000"),
        _ => ("#555555", "#fff"),
    }
}

/// Judge a key press against the note queue. Only the earliest active note
/// is eligible; it is consumed iff its pitch matches and it sits in the
/// target band. Returns the points awarded (0 on a miss).
pub fn judge_press(notes: &mut [Note], pitch: &str, viewport_height: f64) -> i64 {
    let Some(next) = notes.iter_mut().find(|n| n.active) else {
        return 0;
    };
    if next.matches_pitch(pitch) && next.in_target_zone(viewport_height) {
        next.active = false;
        POINTS_PER_NOTE
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT_H: f64 = 900.0;
    const BASE_LINE: f64 = VIEWPORT_H - 265.0;

    fn note_at(pitch: &str, y: f64) -> Note {
        let mut n = Note::new(pitch, 100.0);
        n.y = y;
        n
    }

    #[test]
    fn starts_at_spawn_row_and_falls_with_tempo() {
        let mut n = Note::new("E3", 50.0);
        assert_eq!(n.y, NOTE_START_Y);
        n.advance(65.0);
        assert!((n.y - (NOTE_START_Y + 1.5)).abs() < 1e-9);
        n.advance(130.0);
        assert!((n.y - (NOTE_START_Y + 1.5 + 3.0)).abs() < 1e-9);
    }

    #[test]
    fn inactive_note_does_not_move() {
        let mut n = Note::new("E3", 50.0);
        n.active = false;
        n.advance(65.0);
        assert_eq!(n.y, NOTE_START_Y);
    }

    #[test]
    fn target_zone_boundaries_are_inclusive() {
        assert!(note_at("E3", BASE_LINE - 40.0).in_target_zone(VIEWPORT_H));
        assert!(note_at("E3", BASE_LINE + 20.0).in_target_zone(VIEWPORT_H));
        assert!(note_at("E3", BASE_LINE).in_target_zone(VIEWPORT_H));
        assert!(!note_at("E3", BASE_LINE - 40.1).in_target_zone(VIEWPORT_H));
        assert!(!note_at("E3", BASE_LINE + 20.1).in_target_zone(VIEWPORT_H));
    }

    #[test]
    fn off_screen_below_viewport_only() {
        assert!(note_at("E3", VIEWPORT_H + 0.1).off_screen(VIEWPORT_H));
        assert!(!note_at("E3", VIEWPORT_H).off_screen(VIEWPORT_H));
    }

    #[test]
    fn unknown_pitch_falls_back_to_raw_label() {
        assert_eq!(Note::new("E3", 0.0).label, "E");
        assert_eq!(Note::new("Z9", 0.0).label, "Z9");
    }

    #[test]
    fn hit_requires_match_and_zone() {
        let mut notes = vec![note_at("E3", BASE_LINE)];
        assert_eq!(judge_press(&mut notes, "e3", VIEWPORT_H), POINTS_PER_NOTE);
        assert!(!notes[0].active);
    }

    #[test]
    fn wrong_pitch_scores_nothing_and_keeps_note() {
        let mut notes = vec![note_at("E3", BASE_LINE)];
        assert_eq!(judge_press(&mut notes, "F3", VIEWPORT_H), 0);
        assert!(notes[0].active);
    }

    #[test]
    fn out_of_zone_press_scores_nothing() {
        let mut notes = vec![note_at("E3", 200.0)];
        assert_eq!(judge_press(&mut notes, "E3", VIEWPORT_H), 0);
        assert!(notes[0].active);
    }

    #[test]
    fn only_the_earliest_active_note_is_eligible() {
        // Second note matches and is in the zone, but the first active note
        // is the only one considered.
        let mut notes = vec![note_at("C3", 200.0), note_at("E3", BASE_LINE)];
        assert_eq!(judge_press(&mut notes, "E3", VIEWPORT_H), 0);
        assert!(notes[1].active);

        // Once the first is gone, the second becomes eligible.
        notes[0].active = false;
        assert_eq!(judge_press(&mut notes, "E3", VIEWPORT_H), POINTS_PER_NOTE);
    }

    #[test]
    fn empty_queue_is_a_no_op() {
        let mut notes: Vec<Note> = Vec::new();
        assert_eq!(judge_press(&mut notes, "E3", VIEWPORT_H), 0);
    }

    #[test]
    fn queue_colors_saturate_at_gray() {
        assert_eq!(queue_color(0).0, "#00ff00");
        assert_eq!(queue_color(1).0, "#ffff00");
        assert_eq!(queue_color(2).0, "#ff8800");
        assert_eq!(queue_color(3).0, "#555555");
        assert_eq!(queue_color(42).0, "#555555");
    }
}
