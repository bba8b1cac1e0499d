//! Destructible bases the notes bombard at the bottom of the play field.

use crate::config::BASE_BOTTOM_OFFSET;

pub const BASE_WIDTH: f64 = 50.0;
pub const BASE_HEIGHT: f64 = 35.0;
/// Horizontal placement of the four bases, as fractions of viewport width.
pub const BASE_POSITIONS: [f64; 4] = [0.15, 0.38, 0.62, 0.85];
/// Painted size of one base pixel.
pub const PIXEL_SIZE: f64 = 5.0;

const PIXEL_STEP_X: f64 = 4.0;
const PIXEL_STEP_Y: f64 = 5.0;

// Invader silhouette; '#' cells become destructible pixels.
const PIXEL_PATTERN: [&str; 7] = [
    "  ########  ",
    " ########## ",
    "############",
    "############",
    "############",
    "###  ##  ###",
    "##   ##   ##",
];

pub struct BasePixel {
    pub x: f64,
    pub y: f64,
    pub active: bool,
}

pub struct Base {
    pub x: f64,
    pub y: f64,
    pub pixels: Vec<BasePixel>,
}

impl Base {
    pub fn new(x: f64, y: f64) -> Self {
        let mut pixels = Vec::new();
        for (row, line) in PIXEL_PATTERN.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == '#' {
                    pixels.push(BasePixel {
                        x: x + col as f64 * PIXEL_STEP_X,
                        y: y + row as f64 * PIXEL_STEP_Y,
                        active: true,
                    });
                }
            }
        }
        Self { x, y, pixels }
    }

    pub fn active_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| p.active).count()
    }

    /// Whether a note at `note_x` falls within this base's horizontal extent.
    pub fn overlaps_x(&self, note_x: f64) -> bool {
        note_x >= self.x && note_x <= self.x + BASE_WIDTH
    }

    /// Knock out the `pick`-th active pixel (callers supply the random
    /// index). Returns false when nothing is left to destroy.
    pub fn smash_pixel(&mut self, pick: usize) -> bool {
        let alive = self.active_pixels();
        if alive == 0 {
            return false;
        }
        let target = pick % alive;
        if let Some(pixel) = self.pixels.iter_mut().filter(|p| p.active).nth(target) {
            pixel.active = false;
        }
        true
    }
}

/// Place the four bases for the given viewport, just above the keyboard.
pub fn build_bases(viewport_width: f64, viewport_height: f64) -> Vec<Base> {
    let y = viewport_height - BASE_BOTTOM_OFFSET - BASE_HEIGHT;
    BASE_POSITIONS
        .iter()
        .map(|frac| Base::new(viewport_width * frac - BASE_WIDTH / 2.0, y))
        .collect()
}

pub fn total_active_pixels(bases: &[Base]) -> usize {
    bases.iter().map(Base::active_pixels).sum()
}

/// Vertical band in which a falling note grinds against the bases.
pub fn in_collision_band(note_y: f64, viewport_height: f64) -> bool {
    let base_line = viewport_height - BASE_BOTTOM_OFFSET;
    note_y >= base_line - BASE_HEIGHT && note_y <= base_line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_yields_68_pixels_per_base() {
        let base = Base::new(0.0, 0.0);
        assert_eq!(base.pixels.len(), 68);
        assert_eq!(base.active_pixels(), 68);
    }

    #[test]
    fn four_bases_hold_272_pixels() {
        let bases = build_bases(1280.0, 900.0);
        assert_eq!(bases.len(), 4);
        assert_eq!(total_active_pixels(&bases), 272);
    }

    #[test]
    fn smashing_only_ever_decreases_the_total() {
        let mut base = Base::new(0.0, 0.0);
        let mut remaining = base.active_pixels();
        let mut pick = 7usize;
        while base.smash_pixel(pick) {
            pick = pick.wrapping_mul(31).wrapping_add(11);
            let now = base.active_pixels();
            assert_eq!(now, remaining - 1);
            remaining = now;
        }
        assert_eq!(base.active_pixels(), 0);
        // Exhausted base refuses further smashes.
        assert!(!base.smash_pixel(0));
    }

    #[test]
    fn horizontal_extent_is_inclusive() {
        let base = Base::new(100.0, 0.0);
        assert!(base.overlaps_x(100.0));
        assert!(base.overlaps_x(150.0));
        assert!(base.overlaps_x(125.0));
        assert!(!base.overlaps_x(99.9));
        assert!(!base.overlaps_x(150.1));
    }

    #[test]
    fn collision_band_sits_on_the_base_line() {
        let h = 900.0;
        let base_line = h - BASE_BOTTOM_OFFSET;
        assert!(in_collision_band(base_line, h));
        assert!(in_collision_band(base_line - BASE_HEIGHT, h));
        assert!(!in_collision_band(base_line - BASE_HEIGHT - 0.1, h));
        assert!(!in_collision_band(base_line + 0.1, h));
    }

    #[test]
    fn bases_are_centered_on_their_fractions() {
        let bases = build_bases(1000.0, 900.0);
        assert!((bases[0].x - (150.0 - 25.0)).abs() < 1e-9);
        assert!((bases[3].x - (850.0 - 25.0)).abs() < 1e-9);
        for b in &bases {
            assert!((b.y - (900.0 - 265.0 - 35.0)).abs() < 1e-9);
        }
    }
}
