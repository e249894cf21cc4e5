/// display geometry
pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;

/// packed size: one bit per pixel
pub const SCREEN_BUFFER_SIZE: usize = SCREEN_WIDTH * SCREEN_HEIGHT / 8;

/// 64x32 monochrome pixels. Each row is a u64 with bit 63 as the leftmost
/// pixel, so an 8-pixel sprite row wraps around the screen edge with a
/// single rotate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    rows: [u64; SCREEN_HEIGHT],
    dirty: bool,
}

impl Framebuffer {
    pub fn new() -> Self {
        Framebuffer {
            rows: [0; SCREEN_HEIGHT],
            dirty: false,
        }
    }

    /// blank the screen; marks it dirty so the host redraws
    pub fn clear(&mut self) {
        self.rows = [0; SCREEN_HEIGHT];
        self.dirty = true;
    }

    /// XOR a sprite onto the screen at (x, y), wrapping at the edges.
    /// returns true if any lit pixel was turned off
    pub fn draw_sprite(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let x = x as u32 % SCREEN_WIDTH as u32;
        let mut collision = false;
        for (r, &bits) in sprite.iter().enumerate() {
            let row = (y as usize + r) % SCREEN_HEIGHT;
            let mask = ((bits as u64) << 56).rotate_right(x);
            collision |= self.rows[row] & mask != 0;
            self.rows[row] ^= mask;
        }
        self.dirty = true;
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.rows[y % SCREEN_HEIGHT] & (1 << (63 - x % SCREEN_WIDTH)) != 0
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// checks and clears the dirty flag
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// row-major, 8 pixels per byte, MSB is leftmost
    pub fn to_bytes(&self) -> [u8; SCREEN_BUFFER_SIZE] {
        let mut out = [0u8; SCREEN_BUFFER_SIZE];
        for (chunk, row) in out.chunks_exact_mut(SCREEN_WIDTH / 8).zip(self.rows.iter()) {
            chunk.copy_from_slice(&row.to_be_bytes());
        }
        out
    }

    /// number of lit pixels
    pub fn lit(&self) -> u32 {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}
