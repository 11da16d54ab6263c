use std::sync::{PoisonError, RwLock};

use crate::error::Result;

pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;

/// 64x32 monochrome pixels state, one byte (0 or 1) per pixel, row major.
///
/// The interpreter draws while a renderer may be reading, so the grid sits
/// behind a reader/writer lock and every method takes `&self`.
pub struct Framebuffer {
    gfx: RwLock<[u8; WIDTH * HEIGHT]>,
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            gfx: RwLock::new([0; WIDTH * HEIGHT]),
        }
    }

    pub fn clear(&self) {
        let mut gfx = self.gfx.write().unwrap_or_else(PoisonError::into_inner);
        *gfx = [0; WIDTH * HEIGHT];
    }

    /// XOR a sprite onto the screen at x,y, one byte per row with the MSB as the
    /// leftmost pixel. Coordinates wrap around both edges. Returns true if any
    /// lit sprite pixel landed on an already lit screen pixel.
    pub fn draw(&self, x: usize, y: usize, sprite: &[u8]) -> bool {
        let mut gfx = self.gfx.write().unwrap_or_else(PoisonError::into_inner);
        let mut collision = false;
        for (row, line) in sprite.iter().enumerate() {
            for p in 0..8 {
                // iter bit shift across sprite pixel from memory
                if line & (0x80 >> p) == 0 {
                    continue;
                }
                let offset = WIDTH * ((y + row) % HEIGHT) + (x + p) % WIDTH;
                if gfx[offset] == 1 {
                    collision = true;
                }
                gfx[offset] ^= 1;
            }
        }
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let gfx = self.gfx.read().unwrap_or_else(PoisonError::into_inner);
        gfx[WIDTH * (y % HEIGHT) + x % WIDTH] == 1
    }

    /// copy of the whole grid, for renderers
    pub fn snapshot(&self) -> [u8; WIDTH * HEIGHT] {
        *self.gfx.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns the framebuffer into something visible, once per run loop iteration.
pub trait Renderer {
    fn render(&mut self, frame: &Framebuffer) -> Result<()>;
}

/// Draws nothing; for tests and headless runs.
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Framebuffer) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_draw_sets_pixels_msb_first() {
        let fb = Framebuffer::new();
        assert!(!fb.draw(0, 0, &[0b1010_0000]));
        assert!(fb.pixel(0, 0));
        assert!(!fb.pixel(1, 0));
        assert!(fb.pixel(2, 0));
    }

    #[test]
    fn test_draw_twice_clears_and_collides() {
        let fb = Framebuffer::new();
        let sprite = [0xF0, 0x90, 0x90, 0x90, 0xF0]; // 0
        assert!(!fb.draw(10, 5, &sprite));
        assert!(fb.draw(10, 5, &sprite));
        assert!(fb.snapshot().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_no_collision_on_disjoint_sprites() {
        let fb = Framebuffer::new();
        assert!(!fb.draw(0, 0, &[0xF0]));
        assert!(!fb.draw(0, 0, &[0x0F]));
        assert!(fb.snapshot()[..8].iter().all(|&p| p == 1));
    }

    #[test]
    fn test_draw_wraps_around_edges() {
        let fb = Framebuffer::new();
        fb.draw(62, 31, &[0xF0, 0xF0]);
        assert!(fb.pixel(62, 31));
        assert!(fb.pixel(63, 31));
        assert!(fb.pixel(0, 31));
        assert!(fb.pixel(1, 31));
        assert!(fb.pixel(62, 0));
        assert!(fb.pixel(1, 0));
        assert!(!fb.pixel(2, 0));
    }

    #[test]
    fn test_clear() {
        let fb = Framebuffer::new();
        fb.draw(3, 3, &[0xFF; 8]);
        fb.clear();
        assert!(fb.snapshot().iter().all(|&p| p == 0));
    }

    #[test]
    fn test_concurrent_reader_sees_whole_draws() {
        let fb = Arc::new(Framebuffer::new());
        let reader = {
            let fb = Arc::clone(&fb);
            thread::spawn(move || {
                for _ in 0..200 {
                    // each draw flips a full row, so a torn read would show a partial row
                    let lit = fb.snapshot()[..8].iter().filter(|&&p| p == 1).count();
                    assert!(lit == 0 || lit == 8);
                }
            })
        };
        for _ in 0..200 {
            fb.draw(0, 0, &[0xFF]);
        }
        reader.join().unwrap();
    }
}
