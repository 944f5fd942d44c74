use crate::{
    error::{Chip8Error, Result},
    registers::{IndexRegister, ProgramCounter},
};

pub type TypeAddr = u16; // in reality u12
type FontBytes = [u8; 5 * 16];

pub const MEMORY_SIZE: usize = 4096;
pub const ADDR_MASK: TypeAddr = (MEMORY_SIZE - 1) as TypeAddr;
pub const PROGRAM_START: TypeAddr = 0x200;
pub const MAX_ROM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const FONT_START: TypeAddr = 0x50;
pub const FONT_GLYPH_LEN: TypeAddr = 5;
pub const STACK_DEPTH: usize = 16;

const DEFAULT_FONT: FontBytes = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Address of the built-in glyph for hex digit `digit` (low nibble only).
pub fn glyph_addr(digit: u8) -> TypeAddr {
    FONT_START + (digit & 0xF) as TypeAddr * FONT_GLYPH_LEN
}

pub struct Memory {
    // 4k bytes
    // 000 -> 04F empty, font 050 -> 09F, program from 200
    bytes: Box<[u8; MEMORY_SIZE]>,
    pub pc: ProgramCounter,
    pub index: IndexRegister,
    pub stack: Stack,
}

impl Memory {
    pub fn new() -> Self {
        let mut mem = Self {
            bytes: Box::new([0; MEMORY_SIZE]),
            pc: ProgramCounter::default(),
            index: IndexRegister::default(),
            stack: Stack::new(),
        };
        mem.load_font();
        mem
    }

    /// Program write. The reserved interpreter area below 0x200 is read-only
    /// to running code, so writes there are dropped.
    pub fn set(&mut self, addr: TypeAddr, val: u8) {
        let addr = addr & ADDR_MASK;
        if addr < PROGRAM_START {
            log::debug!("dropped write of {val:#04X} to reserved address {addr:#05X}");
            return;
        }
        self.bytes[addr as usize] = val;
    }

    pub fn get(&self, addr: TypeAddr) -> u8 {
        self.bytes[(addr & ADDR_MASK) as usize]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }

    pub fn next_instruction(&mut self) -> u16 {
        let (l, r) = (self.get(self.pc.0), self.get(self.pc.0.wrapping_add(1)));
        self.pc.increment();
        ((l as u16) << 8) | r as u16
    }

    pub fn increment_pc(&mut self) {
        self.pc.increment();
    }

    pub fn set_pc(&mut self, addr: TypeAddr) {
        self.pc.set_addr(addr);
    }

    pub fn set_index(&mut self, addr: TypeAddr) {
        self.index.set_addr(addr);
    }

    /// Power-on state with `bytes` in the program region. Nothing is touched
    /// if the ROM does not fit.
    pub fn load_rom(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: bytes.len(),
                max_size: MAX_ROM_SIZE,
            });
        }

        self.bytes.fill(0);
        self.load_font();
        let start_index = PROGRAM_START as usize;
        self.bytes[start_index..start_index + bytes.len()].copy_from_slice(bytes);

        self.pc = ProgramCounter::default();
        self.index = IndexRegister::default();
        self.stack.clear();
        log::debug!("loaded {} byte ROM at {PROGRAM_START:#05X}", bytes.len());
        Ok(())
    }

    fn load_font(&mut self) {
        let start_index = FONT_START as usize;
        self.bytes[start_index..start_index + DEFAULT_FONT.len()].copy_from_slice(&DEFAULT_FONT);
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Stack {
    addresses: Vec<TypeAddr>,
}

impl Stack {
    pub fn new() -> Self {
        Self {
            addresses: Vec::with_capacity(STACK_DEPTH),
        }
    }

    /// Returns `false` without pushing when the stack is full.
    #[must_use]
    pub fn push(&mut self, addr: TypeAddr) -> bool {
        if self.addresses.len() >= STACK_DEPTH {
            return false;
        }
        self.addresses.push(addr);
        true
    }

    pub fn pop(&mut self) -> Option<TypeAddr> {
        self.addresses.pop()
    }

    /// Stack pointer: number of live return addresses.
    pub fn sp(&self) -> u8 {
        self.addresses.len() as u8
    }

    pub fn clear(&mut self) {
        self.addresses.clear();
    }
}

impl Default for Stack {
    fn default() -> Self {
        Self::new()
    }
}

/// Host-side staging area for ROM bytes: allocate, fill, then hand the
/// contents to `Emulator::initialize` or `Instances::create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomBuffer {
    bytes: Box<[u8]>,
}

impl RomBuffer {
    pub fn alloc(len: usize) -> Result<Self> {
        if len > MAX_ROM_SIZE {
            return Err(Chip8Error::RomTooLarge {
                size: len,
                max_size: MAX_ROM_SIZE,
            });
        }
        Ok(Self {
            bytes: vec![0; len].into_boxed_slice(),
        })
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rom_lands_verbatim_at_program_start(
            rom in proptest::collection::vec(any::<u8>(), 0..=MAX_ROM_SIZE)
        ) {
            let mut mem = Memory::new();
            mem.load_rom(&rom).unwrap();
            let start = PROGRAM_START as usize;
            prop_assert_eq!(&mem.as_slice()[start..start + rom.len()], rom.as_slice());
            prop_assert_eq!(&mem.as_slice()[FONT_START as usize..FONT_START as usize + 80], &DEFAULT_FONT[..]);
        }
    }

    #[test]
    fn oversized_rom_leaves_memory_alone() {
        let mut mem = Memory::new();
        mem.load_rom(&[0xAB; 4]).unwrap();
        mem.set_pc(0x300);

        let err = mem.load_rom(&vec![0; MAX_ROM_SIZE + 1]).unwrap_err();
        assert_eq!(
            err,
            Chip8Error::RomTooLarge {
                size: MAX_ROM_SIZE + 1,
                max_size: MAX_ROM_SIZE
            }
        );
        assert_eq!(mem.get(PROGRAM_START), 0xAB);
        assert_eq!(mem.pc.0, 0x300);
    }

    #[test]
    fn reload_clears_previous_rom() {
        let mut mem = Memory::new();
        mem.load_rom(&[1, 2, 3, 4]).unwrap();
        mem.load_rom(&[9]).unwrap();
        assert_eq!(mem.get(PROGRAM_START), 9);
        assert_eq!(mem.get(PROGRAM_START + 1), 0);
    }

    #[test]
    fn reserved_region_is_write_protected() {
        let mut mem = Memory::new();
        mem.set(FONT_START, 0x00);
        assert_eq!(mem.get(FONT_START), 0xF0);
        mem.set(0x1000 + PROGRAM_START, 0x42);
        assert_eq!(mem.get(PROGRAM_START), 0x42);
    }

    #[test]
    fn fetch_is_big_endian_and_advances_pc() {
        let mut mem = Memory::new();
        mem.load_rom(&[0x12, 0x34, 0x56, 0x78]).unwrap();
        assert_eq!(mem.next_instruction(), 0x1234);
        assert_eq!(mem.next_instruction(), 0x5678);
        assert_eq!(mem.pc.0, PROGRAM_START + 4);
    }

    #[test]
    fn glyphs_are_five_bytes_apart() {
        assert_eq!(glyph_addr(0), FONT_START);
        assert_eq!(glyph_addr(0xA), FONT_START + 50);
        assert_eq!(glyph_addr(0x1F), glyph_addr(0xF));
    }

    #[test]
    fn stack_is_bounded() {
        let mut stack = Stack::new();
        for i in 0..STACK_DEPTH {
            assert!(stack.push(i as TypeAddr));
        }
        assert!(!stack.push(0xFFF));
        assert_eq!(stack.sp() as usize, STACK_DEPTH);
        assert_eq!(stack.pop(), Some(15));
    }

    #[test]
    fn rom_buffer_respects_program_region() {
        let mut buf = RomBuffer::alloc(MAX_ROM_SIZE).unwrap();
        buf.as_mut_slice()[0] = 0x60;
        assert_eq!(buf.len(), MAX_ROM_SIZE);
        assert_eq!(buf.as_slice()[0], 0x60);
        assert!(RomBuffer::alloc(MAX_ROM_SIZE + 1).is_err());
    }
}
