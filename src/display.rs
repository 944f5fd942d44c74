pub const WIDTH: usize = 64;
pub const HEIGHT: usize = 32;
pub const BYTES_PER_PIXEL: usize = 4;
pub const FRAME_LEN: usize = WIDTH * HEIGHT * BYTES_PER_PIXEL;

const PIXEL_ON: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
const PIXEL_OFF: [u8; 4] = [0x00, 0x00, 0x00, 0xFF];

/// 64x32 monochrome screen. Each row is one `u64`, bit 63 being the leftmost
/// column. The RGBA raster handed to hosts is rebuilt from the bits on demand.
pub struct FrameBuffer {
    rows: [u64; HEIGHT],
    pixel_buffer: Vec<u8>,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            rows: [0; HEIGHT],
            pixel_buffer: vec![0; FRAME_LEN],
        }
    }

    pub fn clear_buffer(&mut self) {
        self.rows = [0; HEIGHT];
    }

    /// XOR `sprite` onto the screen with its top-left corner at (x, y).
    /// Coordinates and every pixel wrap around the edges. Returns true if any
    /// lit pixel was switched off.
    pub fn paint(&mut self, x: u8, y: u8, sprite: &[u8]) -> bool {
        let (x, y) = (x as usize % WIDTH, y as usize % HEIGHT);
        let mut collision = false;
        for (i, &row) in sprite.iter().enumerate() {
            let line = &mut self.rows[(y + i) % HEIGHT];
            let pixels = ((row as u64) << (WIDTH - 8)).rotate_right(x as u32);
            collision |= *line & pixels != 0;
            *line ^= pixels;
        }
        collision
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        let row = self.rows[y % HEIGHT];
        (row >> (WIDTH - 1 - x % WIDTH)) & 1 == 1
    }

    #[cfg(test)]
    fn lit_pixels(&self) -> u32 {
        self.rows.iter().map(|row| row.count_ones()).sum()
    }

    /// RGBA raster of the current screen, regenerated on every call.
    pub fn frame(&mut self) -> &[u8] {
        for (y, row) in self.rows.iter().enumerate() {
            for x in 0..WIDTH {
                let lit = (row >> (WIDTH - 1 - x)) & 1 == 1;
                let start = (y * WIDTH + x) * BYTES_PER_PIXEL;
                self.pixel_buffer[start..start + BYTES_PER_PIXEL]
                    .copy_from_slice(if lit { &PIXEL_ON } else { &PIXEL_OFF });
            }
        }
        &self.pixel_buffer
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn paint_places_msb_on_the_left() {
        let mut fb = FrameBuffer::new();
        assert!(!fb.paint(3, 4, &[0b1000_0001]));
        assert!(fb.pixel(3, 4));
        assert!(fb.pixel(10, 4));
        assert!(!fb.pixel(4, 4));
        assert_eq!(fb.lit_pixels(), 2);
    }

    #[test]
    fn sprite_wraps_both_axes() {
        let mut fb = FrameBuffer::new();
        fb.paint(62, 31, &[0xF0, 0xF0]);
        for (x, y) in [(62, 31), (63, 31), (0, 31), (1, 31), (62, 0), (1, 0)] {
            assert!(fb.pixel(x, y), "({x}, {y}) should be lit");
        }
        assert_eq!(fb.lit_pixels(), 8);
    }

    #[test]
    fn start_coordinates_are_taken_modulo_screen() {
        let mut a = FrameBuffer::new();
        let mut b = FrameBuffer::new();
        a.paint(70, 40, &[0xA5]);
        b.paint(6, 8, &[0xA5]);
        assert_eq!(a.rows, b.rows);
    }

    #[test]
    fn collision_only_when_lit_pixel_cleared() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[0b1100_0000]);
        assert!(!fb.paint(2, 0, &[0b1100_0000]));
        assert!(fb.paint(1, 0, &[0b1000_0000]));
        assert!(!fb.pixel(1, 0));
    }

    #[test]
    fn frame_is_opaque_monochrome_rgba() {
        let mut fb = FrameBuffer::new();
        fb.paint(1, 0, &[0x80]);
        let frame = fb.frame();
        assert_eq!(frame.len(), FRAME_LEN);
        assert_eq!(&frame[0..4], &PIXEL_OFF);
        assert_eq!(&frame[4..8], &PIXEL_ON);
        assert!(frame.chunks(4).all(|px| px[3] == 0xFF));
    }

    #[test]
    fn clear_blanks_the_frame() {
        let mut fb = FrameBuffer::new();
        fb.paint(0, 0, &[0xFF; 15]);
        fb.clear_buffer();
        assert_eq!(fb.lit_pixels(), 0);
        assert!(fb.frame().chunks(4).all(|px| px == PIXEL_OFF));
    }

    proptest! {
        #[test]
        fn drawing_twice_restores_the_screen(
            background in proptest::collection::vec(any::<u8>(), 1..16),
            sprite in proptest::collection::vec(any::<u8>(), 1..16),
            x in any::<u8>(),
            y in any::<u8>(),
        ) {
            let mut fb = FrameBuffer::new();
            fb.paint(5, 7, &background);
            let before = fb.rows;

            fb.paint(x, y, &sprite);
            let after_first = fb.rows;
            let second = fb.paint(x, y, &sprite);

            prop_assert_eq!(fb.rows, before);
            let first_lit_something = after_first
                .iter()
                .zip(before.iter())
                .any(|(after, prior)| after & !prior != 0);
            prop_assert_eq!(second, first_lit_something);
        }
    }
}
