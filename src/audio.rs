//! Audio cues on top of the Web Audio API.
//!
//! Every cue is fire-and-forget: an oscillator with a short gain envelope,
//! scheduled on the context clock. All failures are logged to the console
//! and swallowed so the game keeps running muted.

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType, console};

use crate::pitch;

const CUE_GAIN: f32 = 0.22;
const ATTACK_S: f64 = 0.02;

pub struct AudioManager {
    ctx: Option<AudioContext>,
}

impl AudioManager {
    pub fn new() -> Self {
        Self { ctx: None }
    }

    /// Create the audio context. Must happen inside a user gesture or the
    /// browser keeps it suspended; round start qualifies.
    pub fn init(&mut self) {
        if self.ctx.is_some() {
            return;
        }
        match AudioContext::new() {
            Ok(ctx) => self.ctx = Some(ctx),
            Err(e) => {
                console::error_2(&JsValue::from_str("audio init failed:"), &e);
            }
        }
    }

    /// Schedule one tone `offset_s` from now, lasting `duration_s`.
    fn schedule(&self, freq: f64, offset_s: f64, duration_s: f64) -> Result<(), JsValue> {
        let ctx = self
            .ctx
            .as_ref()
            .ok_or_else(|| JsValue::from_str("audio not initialized"))?;
        let osc = ctx.create_oscillator()?;
        let gain = ctx.create_gain()?;
        osc.set_type(OscillatorType::Triangle);
        osc.frequency().set_value(freq as f32);

        let t0 = ctx.current_time() + offset_s;
        // Short ramps at both ends so cues do not click.
        gain.gain().set_value_at_time(0.0, t0)?;
        gain.gain().linear_ramp_to_value_at_time(CUE_GAIN, t0 + ATTACK_S)?;
        gain.gain().linear_ramp_to_value_at_time(0.0, t0 + duration_s)?;

        osc.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&ctx.destination())?;
        osc.start_with_when(t0)?;
        osc.stop_with_when(t0 + duration_s)?;
        Ok(())
    }

    /// Play a sequence of (pitch, offset seconds, duration seconds) cues.
    fn cue(&self, tones: &[(&str, f64, f64)]) {
        for &(name, offset, duration) in tones {
            let Some(freq) = pitch::frequency(name) else {
                continue;
            };
            if let Err(e) = self.schedule(freq, offset, duration) {
                console::error_2(&JsValue::from_str("audio cue failed:"), &e);
            }
        }
    }

    /// The pressed key's own tone.
    pub fn play_note(&self, pitch_name: &str) {
        self.cue(&[(pitch_name, 0.0, 0.25)]);
    }

    pub fn play_hit(&self) {
        self.cue(&[("C5", 0.0, 0.08)]);
    }

    pub fn play_miss(&self) {
        self.cue(&[("C2", 0.0, 0.15)]);
    }

    /// Ascending victory fanfare.
    pub fn play_win(&self) {
        self.cue(&[
            ("C4", 0.0, 0.25),
            ("E4", 0.1, 0.25),
            ("G4", 0.2, 0.25),
            ("C5", 0.3, 0.25),
        ]);
    }

    /// Descending game-over phrase.
    pub fn play_game_over(&self) {
        self.cue(&[
            ("C4", 0.0, 0.25),
            ("B3", 0.15, 0.25),
            ("A3", 0.3, 0.25),
            ("G3", 0.45, 0.25),
        ]);
    }

    pub fn dispose(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            // close() returns a promise we do not need to await.
            let _ = ctx.close();
        }
    }
}
