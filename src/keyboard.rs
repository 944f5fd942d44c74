// Hex keypad, one bit per key in a u16: bit k set means key k is held.
//
//   1 2 3 C
//   4 5 6 D
//   7 8 9 E
//   A 0 B F

/// Pending FX0A: which register receives the key, and which keys were
/// already down when the wait began (those do not count as presses).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyWait {
    pub register: u8,
    held: u16,
}

#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    keys: u16,
    wait: Option<KeyWait>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops any pending wait. The host-owned key mask is kept.
    pub fn reset(&mut self) {
        self.wait = None;
    }

    pub fn set_keys(&mut self, keys: u16) {
        self.keys = keys;
        if let Some(wait) = &mut self.wait {
            // released keys can be pressed again to satisfy the wait
            wait.held &= keys;
        }
    }

    pub fn keys(&self) -> u16 {
        self.keys
    }

    pub fn get_key_status_from_num(&self, n: u8) -> bool {
        self.keys & (1 << (n & 0xF)) != 0
    }

    pub fn begin_wait(&mut self, register: u8) {
        self.wait = Some(KeyWait {
            register,
            held: self.keys,
        });
    }

    pub fn waiting(&self) -> Option<KeyWait> {
        self.wait
    }

    /// Resolves a pending wait if a key went down since it began. Yields the
    /// target register and the lowest newly pressed key.
    pub fn poll_wait(&mut self) -> Option<(u8, u8)> {
        let wait = self.wait?;
        let pressed = self.keys & !wait.held;
        if pressed == 0 {
            return None;
        }
        self.wait = None;
        Some((wait.register, pressed.trailing_zeros() as u8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_status_reads_mask_bits() {
        let mut kb = Keyboard::new();
        kb.set_keys(0b1000_0000_0000_0010);
        assert!(kb.get_key_status_from_num(0x1));
        assert!(kb.get_key_status_from_num(0xF));
        assert!(!kb.get_key_status_from_num(0x0));
        // only the low nibble selects a key
        assert!(kb.get_key_status_from_num(0x11));
    }

    #[test]
    fn wait_resolves_on_new_press_only() {
        let mut kb = Keyboard::new();
        kb.set_keys(1 << 4);
        kb.begin_wait(3);
        assert_eq!(kb.poll_wait(), None);

        kb.set_keys((1 << 4) | (1 << 9) | (1 << 7));
        assert_eq!(kb.poll_wait(), Some((3, 7)));
        assert!(kb.waiting().is_none());
    }

    #[test]
    fn released_key_counts_when_pressed_again() {
        let mut kb = Keyboard::new();
        kb.set_keys(1 << 2);
        kb.begin_wait(0);
        kb.set_keys(0);
        assert_eq!(kb.poll_wait(), None);
        kb.set_keys(1 << 2);
        assert_eq!(kb.poll_wait(), Some((0, 2)));
    }

    #[test]
    fn reset_drops_wait_but_keeps_mask() {
        let mut kb = Keyboard::new();
        kb.set_keys(0x00F0);
        kb.begin_wait(1);
        kb.reset();
        assert!(kb.waiting().is_none());
        assert_eq!(kb.keys(), 0x00F0);
    }
}
