//! Game runtime: round lifecycle, the note spawner, the per-frame
//! update/collision step, input judging, and canvas rendering.
//!
//! Everything runs on the host's callback queue: one self-rescheduling
//! spawn timeout plus one requestAnimationFrame loop, both cancelled the
//! moment a round ends. All mutable state lives in a thread-local cell.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window, console, window};

use crate::audio::AudioManager;
use crate::base::{self, Base, PIXEL_SIZE};
use crate::config::{self, CANVAS_BG, NOTE_RADIUS, WIN_SCORE};
use crate::keyboard;
use crate::note::{self, Note};
use crate::song::{self, Song};

const SONG_LIBRARY_URL: &str = "song_library.json";

struct GameState {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    songs: Vec<Song>,
    song_index: usize,
    melody_cursor: usize,
    notes: Vec<Note>,
    bases: Vec<Base>,
    key_positions: HashMap<String, f64>,
    score: i64,
    bpm: f64,
    running: bool,
    won: bool,
    round_over: bool,
    started_at_ms: f64,
    audio: AudioManager,
    spawn_timer: Option<i32>,
    frame_handle: Option<i32>,
}

thread_local! {
    static GAME: RefCell<Option<GameState>> = RefCell::new(None);
    // Persistent closures for the spawn timer and the frame loop.
    static SPAWN_CALLBACK: RefCell<Option<Closure<dyn FnMut()>>> = RefCell::new(None);
    static FRAME_CALLBACK: RefCell<Option<Closure<dyn FnMut(f64)>>> = RefCell::new(None);
    static RNG_STATE: Cell<u64> = Cell::new(0);
}

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Uniform-ish index in 0..len. LCG seeded from performance.now on first
/// use; not crypto secure, which smashed pixels do not need.
fn rand_index(len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    let draw = RNG_STATE.with(|s| {
        let mut v = s.get();
        if v == 0 {
            v = (performance_now() as u64) | 1;
        }
        v = v
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        s.set(v);
        v
    });
    ((draw >> 33) as usize) % len
}

fn viewport_size(win: &Window) -> (f64, f64) {
    let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1280.0);
    let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
    (w, h)
}

// --- Boot --------------------------------------------------------------------

/// Build the play field (canvas, HUD, keyboard, listeners), load the song
/// library, then start the first round.
pub fn boot() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let (vw, vh) = viewport_size(&win);

    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id("pi-canvas") {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id("pi-canvas");
        c.set_attribute(
            "style",
            &format!("position:fixed; left:0; top:0; z-index:1; background:{CANVAS_BG};"),
        )?;
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    canvas.set_width(vw as u32);
    canvas.set_height(vh as u32);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    ensure_overlay(&doc, "pi-score", "SCORE: 0", "left:12px")?;
    ensure_overlay(&doc, "pi-bpm", "BPM: -", "left:150px")?;
    ensure_overlay(&doc, "pi-song", "Loading...", "right:12px")?;

    let key_positions = keyboard::build(&doc, vw)?;

    let state = GameState {
        canvas,
        ctx,
        songs: song::default_songs(),
        song_index: 0,
        melody_cursor: 0,
        notes: Vec::new(),
        bases: Vec::new(),
        key_positions,
        score: 0,
        bpm: config::REFERENCE_BPM,
        running: false,
        won: false,
        round_over: false,
        started_at_ms: 0.0,
        audio: AudioManager::new(),
        spawn_timer: None,
        frame_handle: None,
    };
    GAME.with(|cell| cell.replace(Some(state)));

    {
        let closure = Closure::wrap(Box::new(|| on_resize()) as Box<dyn FnMut()>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    wasm_bindgen_futures::spawn_local(async {
        let songs = load_song_library().await;
        GAME.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                state.songs = songs;
            }
        });
        start_round(0);
    });
    Ok(())
}

fn ensure_overlay(doc: &Document, id: &str, text: &str, anchor: &str) -> Result<(), JsValue> {
    if doc.get_element_by_id(id).is_some() {
        return Ok(());
    }
    let div = doc.create_element("div")?;
    div.set_id(id);
    div.set_text_content(Some(text));
    div.set_attribute(
        "style",
        &format!(
            "position:fixed; top:10px; {anchor}; font:bold 14px monospace; padding:4px 8px; \
             background:rgba(0,0,0,0.42); border:1px solid #0f0; border-radius:6px; \
             color:#0f0; z-index:45; letter-spacing:0.5px;"
        ),
    )?;
    doc.body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&div)?;
    Ok(())
}

async fn load_song_library() -> Vec<Song> {
    match fetch_song_library().await {
        Ok(songs) => songs,
        Err(e) => {
            console::error_2(&JsValue::from_str("song library load failed, using defaults:"), &e);
            song::default_songs()
        }
    }
}

async fn fetch_song_library() -> Result<Vec<Song>, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let resp_value = JsFuture::from(win.fetch_with_str(SONG_LIBRARY_URL)).await?;
    let resp: web_sys::Response = resp_value.dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("fetch status {}", resp.status())));
    }
    let text = JsFuture::from(resp.text()?)
        .await?
        .as_string()
        .ok_or_else(|| JsValue::from_str("song library is not text"))?;
    song::parse_song_library(&text).map_err(|e| JsValue::from_str(&e.to_string()))
}

// --- Round lifecycle -----------------------------------------------------------

fn cancel_pending(state: &mut GameState) {
    if let Some(win) = window() {
        if let Some(id) = state.spawn_timer.take() {
            win.clear_timeout_with_handle(id);
        }
        if let Some(id) = state.frame_handle.take() {
            let _ = win.cancel_animation_frame(id);
        }
    }
}

pub fn start_round(song_index: usize) {
    GAME.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(state) = borrow.as_mut() else { return };
        cancel_pending(state);
        if state.songs.is_empty() {
            return;
        }
        let idx = song_index.min(state.songs.len() - 1);
        let (vw, vh) = match window() {
            Some(w) => viewport_size(&w),
            None => return,
        };
        state.canvas.set_width(vw as u32);
        state.canvas.set_height(vh as u32);
        state.song_index = idx;
        state.bpm = state.songs[idx].bpm;
        state.score = 0;
        state.melody_cursor = 0;
        state.notes.clear();
        state.bases = base::build_bases(vw, vh);
        state.started_at_ms = performance_now();
        state.running = true;
        state.won = false;
        state.round_over = false;
        state.audio.init();
    });
    spawn_tick();
    start_frame_loop();
}

pub fn select_song(index: usize) -> bool {
    GAME.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(state) = borrow.as_mut() else {
            return false;
        };
        if state.running || index >= state.songs.len() {
            return false;
        }
        state.song_index = index;
        true
    })
}

pub fn start_random_round() {
    let pick = GAME.with(|cell| {
        cell.borrow()
            .as_ref()
            .map(|s| rand_index(s.songs.len()))
            .unwrap_or(0)
    });
    start_round(pick);
}

pub fn restart_round() {
    let idx = GAME.with(|cell| cell.borrow().as_ref().map(|s| s.song_index).unwrap_or(0));
    start_round(idx);
}

/// JSON array of song names, for a host-side song picker.
pub fn song_list_json() -> String {
    GAME.with(|cell| {
        let names: Vec<String> = cell
            .borrow()
            .as_ref()
            .map(|s| s.songs.iter().map(|song| song.name.clone()).collect())
            .unwrap_or_default();
        serde_json::to_string(&names).unwrap_or_else(|_| "[]".to_string())
    })
}

fn end_game(won: bool) {
    GAME.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(state) = borrow.as_mut() else { return };
        state.running = false;
        state.won = won;
        state.round_over = true;
        cancel_pending(state);
        if won {
            state.audio.play_win();
        } else {
            state.audio.play_game_over();
        }
        draw_round_over(state);
        update_hud(state);
    });
}

// --- Spawner -------------------------------------------------------------------

/// Spawn the melody entry under the cursor (rests and unknown key
/// positions emit nothing), advance the cursor with wrap-around, and
/// re-arm the timer from the current tempo.
fn spawn_tick() {
    let mut next_delay = None;
    GAME.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(state) = borrow.as_mut() else { return };
        if !state.running {
            state.spawn_timer = None;
            return;
        }
        let pitch = state.songs[state.song_index]
            .note_at(state.melody_cursor)
            .map(str::to_string);
        if let Some(pitch) = pitch {
            if let Some(&x) = state.key_positions.get(&pitch.to_ascii_lowercase()) {
                state.notes.push(Note::new(&pitch, x));
            }
        }
        state.melody_cursor = state.songs[state.song_index].next_cursor(state.melody_cursor);
        next_delay = Some(config::spawn_interval_ms(state.bpm));
    });
    if let Some(delay) = next_delay {
        arm_spawn_timer(delay);
    }
}

fn arm_spawn_timer(delay_ms: f64) {
    SPAWN_CALLBACK.with(|cb| {
        let mut cb = cb.borrow_mut();
        if cb.is_none() {
            *cb = Some(Closure::wrap(Box::new(spawn_tick) as Box<dyn FnMut()>));
        }
        let Some(win) = window() else { return };
        let closure = cb.as_ref().expect("spawn closure just installed");
        match win.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            delay_ms as i32,
        ) {
            Ok(id) => GAME.with(|g| {
                if let Some(state) = g.borrow_mut().as_mut() {
                    state.spawn_timer = Some(id);
                }
            }),
            Err(e) => console::error_2(&JsValue::from_str("spawn timer failed:"), &e),
        }
    });
}

// --- Frame loop ------------------------------------------------------------------

fn start_frame_loop() {
    FRAME_CALLBACK.with(|cb| {
        let mut cb = cb.borrow_mut();
        if cb.is_none() {
            *cb = Some(Closure::wrap(Box::new(|ts: f64| {
                if game_tick(ts) {
                    request_frame();
                }
            }) as Box<dyn FnMut(f64)>));
        }
    });
    request_frame();
}

fn request_frame() {
    let Some(win) = window() else { return };
    FRAME_CALLBACK.with(|cb| {
        if let Some(closure) = cb.borrow().as_ref() {
            if let Ok(id) = win.request_animation_frame(closure.as_ref().unchecked_ref()) {
                GAME.with(|g| {
                    if let Some(state) = g.borrow_mut().as_mut() {
                        state.frame_handle = Some(id);
                    }
                });
            }
        }
    });
}

/// One simulation frame. Returns whether the loop should re-arm.
fn game_tick(now: f64) -> bool {
    let mut loss = false;
    let keep_going = GAME.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(state) = borrow.as_mut() else {
            return false;
        };
        if !state.running {
            state.frame_handle = None;
            return false;
        }

        let vw = state.canvas.width() as f64;
        let vh = state.canvas.height() as f64;
        state.ctx.set_fill_style_str(CANVAS_BG);
        state.ctx.fill_rect(0.0, 0.0, vw, vh);

        // Tempo ramp, wall-clock driven so frame hitches cannot slow it.
        let song_bpm = state.songs[state.song_index].bpm;
        let target = config::ramped_bpm(song_bpm, now - state.started_at_ms);
        if target > state.bpm {
            state.bpm = target;
        }

        let bpm = state.bpm;
        for n in &mut state.notes {
            n.advance(bpm);
        }

        // A note grinding against a base knocks out one random pixel.
        for n in &mut state.notes {
            if !n.active {
                continue;
            }
            if base::in_collision_band(n.y, vh) {
                for b in &mut state.bases {
                    if !n.active {
                        break;
                    }
                    let alive = b.active_pixels();
                    if alive > 0 && b.overlaps_x(n.x) {
                        b.smash_pixel(rand_index(alive));
                        n.active = false;
                        state.audio.play_miss();
                    }
                }
            }
            if n.active && n.off_screen(vh) {
                n.active = false;
            }
        }

        if base::total_active_pixels(&state.bases) == 0 {
            loss = true;
            return false;
        }

        render(state);
        state.notes.retain(|n| n.active);
        update_hud(state);
        true
    });
    if loss {
        end_game(false);
    }
    keep_going
}

// --- Input ------------------------------------------------------------------------

/// Judge a pressed key. The key's own tone always plays; only the earliest
/// active note can be hit, and only inside the target band.
pub(crate) fn handle_key_press(pitch: &str) {
    let mut won = false;
    GAME.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(state) = borrow.as_mut() else { return };
        if !state.running {
            return;
        }
        state.audio.play_note(pitch);
        let vh = state.canvas.height() as f64;
        let points = note::judge_press(&mut state.notes, pitch, vh);
        if points > 0 {
            state.score += points;
            state.audio.play_hit();
            if state.score >= WIN_SCORE {
                won = true;
            }
        }
    });
    if won {
        end_game(true);
    }
}

fn on_resize() {
    let Some(win) = window() else { return };
    let Some(doc) = win.document() else { return };
    let (vw, vh) = viewport_size(&win);
    let positions = keyboard::build(&doc, vw).ok();
    GAME.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let Some(state) = borrow.as_mut() else { return };
        state.canvas.set_width(vw as u32);
        state.canvas.set_height(vh as u32);
        state.bases = base::build_bases(vw, vh);
        if let Some(p) = positions {
            state.key_positions = p;
        }
        if state.round_over {
            draw_round_over(state);
        }
    });
}

// --- Rendering ---------------------------------------------------------------------

fn render(state: &GameState) {
    // Bases
    state.ctx.set_fill_style_str("#0f0");
    for b in &state.bases {
        for p in &b.pixels {
            if p.active {
                state.ctx.fill_rect(p.x, p.y, PIXEL_SIZE, PIXEL_SIZE);
            }
        }
    }

    // Notes, coloured by queue position (0 = next to hit).
    state.ctx.set_font("bold 14px monospace");
    state.ctx.set_text_align("center");
    state.ctx.set_text_baseline("middle");
    for (idx, n) in state.notes.iter().filter(|n| n.active).enumerate() {
        let (fill, text) = note::queue_color(idx);
        state.ctx.begin_path();
        state
            .ctx
            .arc(n.x, n.y, NOTE_RADIUS, 0.0, std::f64::consts::TAU)
            .ok();
        state.ctx.set_fill_style_str(fill);
        state.ctx.fill();
        state.ctx.set_stroke_style_str("#000");
        state.ctx.set_line_width(2.0);
        state.ctx.stroke();
        state.ctx.set_fill_style_str(text);
        state.ctx.fill_text(&n.label, n.x, n.y).ok();
    }
}

fn update_hud(state: &GameState) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(el) = doc.get_element_by_id("pi-score") {
        el.set_text_content(Some(&format!("SCORE: {}", state.score)));
    }
    if let Some(el) = doc.get_element_by_id("pi-bpm") {
        el.set_text_content(Some(&format!("BPM: {:.0}", state.bpm)));
    }
    if let Some(el) = doc.get_element_by_id("pi-song") {
        el.set_text_content(Some(&state.songs[state.song_index].name));
    }
}

fn draw_round_over(state: &GameState) {
    let vw = state.canvas.width() as f64;
    let vh = state.canvas.height() as f64;
    state.ctx.set_fill_style_str("rgba(0,0,0,0.55)");
    state.ctx.fill_rect(0.0, 0.0, vw, vh);

    let (cx, cy) = (vw / 2.0, vh / 2.0);
    let headline = if state.won { "YOU WIN!" } else { "GAME OVER" };
    state.ctx.set_font("bold 64px monospace");
    state.ctx.set_text_align("center");
    state.ctx.set_text_baseline("middle");
    state.ctx.set_line_width(6.0);
    state.ctx.set_stroke_style_str("#000");
    state.ctx.stroke_text(headline, cx, cy).ok();
    state
        .ctx
        .set_fill_style_str(if state.won { "#0f0" } else { "#f00" });
    state.ctx.fill_text(headline, cx, cy).ok();

    state.ctx.set_font("bold 20px monospace");
    state.ctx.set_fill_style_str("#fff");
    state
        .ctx
        .fill_text(&format!("SCORE: {}", state.score), cx, cy + 48.0)
        .ok();
}
