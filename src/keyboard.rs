//! On-screen piano widget: DOM keys along the bottom of the viewport.
//!
//! Layout math is kept pure so spawn alignment can be tested natively; the
//! DOM build hands the game a pitch -> key-center-x table and wires pointer
//! presses to the input judge.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

use crate::config::{KEYBOARD_HEIGHT, KeyKind, PIANO_KEYS};

const BLACK_KEY_WIDTH_RATIO: f64 = 0.6;
const BLACK_KEY_HEIGHT_RATIO: f64 = 0.6;

pub struct KeyRect {
    pub pitch: String, // lowercased
    pub label: &'static str,
    pub kind: KeyKind,
    pub left: f64,
    pub width: f64,
    pub center: f64,
}

/// Compute key rectangles for the given viewport width. White keys split
/// the width evenly; each black key straddles the boundary right of the
/// white key it follows in the layout.
pub fn layout_keys(viewport_width: f64) -> Vec<KeyRect> {
    let whites = PIANO_KEYS.iter().filter(|k| k.kind == KeyKind::White).count();
    let white_w = viewport_width / whites as f64;
    let black_w = white_w * BLACK_KEY_WIDTH_RATIO;

    let mut rects = Vec::with_capacity(PIANO_KEYS.len());
    let mut white_idx = 0usize;
    for key in PIANO_KEYS {
        match key.kind {
            KeyKind::White => {
                let left = white_idx as f64 * white_w;
                rects.push(KeyRect {
                    pitch: key.pitch.to_ascii_lowercase(),
                    label: key.label,
                    kind: key.kind,
                    left,
                    width: white_w,
                    center: left + white_w / 2.0,
                });
                white_idx += 1;
            }
            KeyKind::Black => {
                // Boundary after the white key just placed.
                let boundary = white_idx as f64 * white_w;
                rects.push(KeyRect {
                    pitch: key.pitch.to_ascii_lowercase(),
                    label: key.label,
                    kind: key.kind,
                    left: boundary - black_w / 2.0,
                    width: black_w,
                    center: boundary,
                });
            }
        }
    }
    rects
}

fn centers_of(rects: &[KeyRect]) -> HashMap<String, f64> {
    rects.iter().map(|r| (r.pitch.clone(), r.center)).collect()
}

/// Key-center x positions by lowercased pitch, the table the spawner uses.
pub fn key_centers(viewport_width: f64) -> HashMap<String, f64> {
    centers_of(&layout_keys(viewport_width))
}

fn key_styles(rect: &KeyRect) -> (String, String) {
    let (height, idle_bg, pressed_bg, fg, extra) = match rect.kind {
        KeyKind::White => (KEYBOARD_HEIGHT, "#fff", "#9f9", "#000", "bottom:0;"),
        KeyKind::Black => (
            KEYBOARD_HEIGHT * BLACK_KEY_HEIGHT_RATIO,
            "#111",
            "#363",
            "#fff",
            "top:0; z-index:2;",
        ),
    };
    let common = format!(
        "position:absolute; left:{left}px; {extra} width:{w}px; height:{h}px; \
         border:2px solid #000; box-sizing:border-box; color:{fg}; \
         font:bold 13px monospace; display:flex; align-items:flex-end; \
         justify-content:center; padding-bottom:12px; user-select:none; touch-action:none;",
        left = rect.left,
        w = rect.width,
        h = height,
    );
    (
        format!("{common} background:{idle_bg};"),
        format!("{common} background:{pressed_bg};"),
    )
}

fn add_key(doc: &Document, container: &HtmlElement, rect: &KeyRect) -> Result<(), JsValue> {
    let el: HtmlElement = doc.create_element("div")?.dyn_into()?;
    el.set_text_content(Some(rect.label));
    el.set_attribute("data-pitch", &rect.pitch)?;
    let (idle, pressed) = key_styles(rect);
    el.set_attribute("style", &idle)?;

    {
        let pitch = rect.pitch.clone();
        let el_down = el.clone();
        let closure = Closure::wrap(Box::new(move |evt: web_sys::PointerEvent| {
            evt.prevent_default();
            el_down.set_attribute("style", &pressed).ok();
            crate::game::handle_key_press(&pitch);
        }) as Box<dyn FnMut(_)>);
        el.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    {
        let el_up = el.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::PointerEvent| {
            el_up.set_attribute("style", &idle).ok();
        }) as Box<dyn FnMut(_)>);
        el.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref())?;
        el.add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    container.append_child(&el)?;
    Ok(())
}

/// Build (or rebuild, on resize) the keyboard widget and return the spawn
/// position table.
pub fn build(doc: &Document, viewport_width: f64) -> Result<HashMap<String, f64>, JsValue> {
    if let Some(old) = doc.get_element_by_id("pi-keyboard") {
        old.remove();
    }
    let container: HtmlElement = doc.create_element("div")?.dyn_into()?;
    container.set_id("pi-keyboard");
    container.set_attribute(
        "style",
        &format!(
            "position:fixed; left:0; bottom:0; width:100%; height:{KEYBOARD_HEIGHT}px; \
             z-index:10; touch-action:none;"
        ),
    )?;
    doc.body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&container)?;

    let rects = layout_keys(viewport_width);
    // Whites first so the black keys render on top of the boundaries.
    for rect in rects.iter().filter(|r| r.kind == KeyKind::White) {
        add_key(doc, &container, rect)?;
    }
    for rect in rects.iter().filter(|r| r.kind == KeyKind::Black) {
        add_key(doc, &container, rect)?;
    }

    Ok(centers_of(&rects))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_layout_key_gets_a_rect() {
        let rects = layout_keys(1100.0);
        assert_eq!(rects.len(), PIANO_KEYS.len());
    }

    #[test]
    fn white_keys_split_the_width_evenly() {
        let rects = layout_keys(1100.0);
        let whites: Vec<&KeyRect> = rects.iter().filter(|r| r.kind == KeyKind::White).collect();
        assert_eq!(whites.len(), 11);
        let w = 1100.0 / 11.0;
        for (i, r) in whites.iter().enumerate() {
            assert!((r.left - i as f64 * w).abs() < 1e-9);
            assert!((r.center - (i as f64 * w + w / 2.0)).abs() < 1e-9);
        }
    }

    #[test]
    fn black_keys_sit_on_white_boundaries() {
        let centers = key_centers(1100.0);
        let w = 1100.0 / 11.0;
        // C#3 straddles the C3|D3 boundary: two whites (B2, C3) to its left.
        assert!((centers["c#3"] - 2.0 * w).abs() < 1e-9);
        // F#3: whites B2, C3, D3, E3, F3 to its left.
        assert!((centers["f#3"] - 5.0 * w).abs() < 1e-9);
    }

    #[test]
    fn centers_table_matches_the_layout_rects() {
        let rects = layout_keys(1100.0);
        let centers = key_centers(1100.0);
        assert_eq!(centers.len(), rects.len());
        for r in &rects {
            assert_eq!(centers[&r.pitch], r.center);
        }
    }

    #[test]
    fn centers_table_is_keyed_by_lowercase_pitch() {
        let centers = key_centers(1100.0);
        assert_eq!(centers.len(), 18);
        assert!(centers.contains_key("e3"));
        assert!(centers.contains_key("c#4"));
        assert!(!centers.contains_key("E3"));
    }
}
