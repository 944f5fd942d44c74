use crate::memory::{TypeAddr, ADDR_MASK, PROGRAM_START};

pub const FLAG: u8 = 0xF;

pub struct Registers {
    registers: [u8; 16],
}

impl Registers {
    pub fn new() -> Self {
        Self { registers: [0; 16] }
    }

    pub fn reset(&mut self) {
        self.registers = [0; 16];
    }

    pub fn set_register(&mut self, reg_num: u8, value: u8) {
        self.registers[(reg_num & 0xF) as usize] = value;
    }

    // 7XNN never touches VF
    pub fn add_to_register(&mut self, reg_num: u8, value: u8) {
        let total = self.get(reg_num).wrapping_add(value);
        self.set_register(reg_num, total);
    }

    pub fn get(&self, reg_num: u8) -> u8 {
        self.registers[(reg_num & 0xF) as usize]
    }

    pub fn set_flag(&mut self, on: bool) {
        self.set_register(FLAG, on as u8);
    }

    pub fn flag(&self) -> u8 {
        self.get(FLAG)
    }

    pub fn as_slice(&self) -> &[u8; 16] {
        &self.registers
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

// Special registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramCounter(pub TypeAddr);

impl ProgramCounter {
    pub fn increment(&mut self) {
        self.0 = self.0.wrapping_add(2) & ADDR_MASK;
    }

    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr & ADDR_MASK;
    }
}

impl Default for ProgramCounter {
    fn default() -> Self {
        Self(PROGRAM_START)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IndexRegister(pub TypeAddr);

impl IndexRegister {
    pub fn set_addr(&mut self, addr: TypeAddr) {
        self.0 = addr;
    }

    /// Address `offset` bytes past I, wrapped into memory.
    pub fn offset(&self, offset: u16) -> TypeAddr {
        self.0.wrapping_add(offset) & ADDR_MASK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_to_register_wraps_without_flag() {
        let mut regs = Registers::new();
        regs.set_register(FLAG, 7);
        regs.set_register(2, 0xFF);
        regs.add_to_register(2, 2);
        assert_eq!(regs.get(2), 1);
        assert_eq!(regs.flag(), 7);
    }

    #[test]
    fn pc_wraps_inside_address_space() {
        let mut pc = ProgramCounter(0xFFE);
        pc.increment();
        assert_eq!(pc.0, 0x000);
        pc.set_addr(0x1234);
        assert_eq!(pc.0, 0x234);
    }

    #[test]
    fn index_offset_wraps() {
        let index = IndexRegister(0xFFF);
        assert_eq!(index.offset(1), 0x000);
        assert_eq!(index.offset(0), 0xFFF);
    }
}
