//! Piano Invaders core crate.
//!
//! Falling notes descend toward four destructible bases; the player shoots
//! them down by pressing the matching on-screen piano keys in time. The
//! simulation modules (config, song, note, base, pitch) are pure Rust so
//! they test natively; the wasm modules (game, keyboard, audio) glue them
//! to the browser.

use wasm_bindgen::prelude::*;

pub mod base;
pub mod config;
pub mod note;
pub mod pitch;
pub mod song;

mod audio;
mod game;
mod keyboard;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Boot the game: build the play field and keyboard, load the song
/// library (falling back to the built-in song), and start the first round.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    game::boot()
}

/// Pick the song for the next round. Rejected while a round is running or
/// when the index is out of range.
#[wasm_bindgen]
pub fn select_song(index: usize) -> bool {
    game::select_song(index)
}

/// Start a round on a randomly chosen song.
#[wasm_bindgen]
pub fn start_random_game() {
    game::start_random_round();
}

/// Restart the current song from scratch; nothing from the previous round
/// survives.
#[wasm_bindgen]
pub fn restart_game() {
    game::restart_round();
}

/// JSON array of song names for a host-side song picker UI.
#[wasm_bindgen]
pub fn song_list_json() -> String {
    game::song_list_json()
}
