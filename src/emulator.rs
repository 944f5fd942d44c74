use std::time::Duration;

use crate::{
    config::{Config, TimerClock},
    decode::OpCodes,
    display::FrameBuffer,
    error::{Chip8Error, Result},
    keyboard::{KeyWait, Keyboard},
    memory::{self, Memory, TypeAddr, ADDR_MASK},
    registers::{Registers, FLAG},
    timer::Timers,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// What a call to [`Emulator::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Executed(OpCodes),
    /// FX0A is pending and no new key went down; nothing changed.
    AwaitingKey,
    /// A pending FX0A was satisfied by this key.
    KeyLatched(u8),
}

/// One complete CHIP-8 machine. Owns every piece of its state.
pub struct Emulator {
    fb: FrameBuffer,
    pub regs: Registers,
    pub mem: Memory,
    pub timers: Timers,
    keyboard: Keyboard,
    rng: StdRng,
    config: Config,
    fault: Option<Chip8Error>,
}

impl Emulator {
    pub fn new(rom: &[u8], config: Config) -> Result<Self> {
        let mut emu = Self {
            fb: FrameBuffer::new(),
            regs: Registers::new(),
            mem: Memory::new(),
            timers: Timers::new(),
            keyboard: Keyboard::new(),
            rng: Self::seed_rng(&config),
            config,
            fault: None,
        };
        emu.initialize(rom)?;
        Ok(emu)
    }

    fn seed_rng(config: &Config) -> StdRng {
        match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Back to power-on state with `rom` loaded at 0x200. On error the
    /// machine is left exactly as it was.
    pub fn initialize(&mut self, rom: &[u8]) -> Result<()> {
        self.mem.load_rom(rom)?;
        self.regs.reset();
        self.timers.reset();
        self.fb.clear_buffer();
        self.keyboard.reset();
        self.rng = Self::seed_rng(&self.config);
        self.fault = None;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The fatal condition that halted this machine, if any.
    pub fn fault(&self) -> Option<&Chip8Error> {
        self.fault.as_ref()
    }

    pub fn awaiting_key(&self) -> Option<KeyWait> {
        self.keyboard.waiting()
    }

    pub fn pc(&self) -> TypeAddr {
        self.mem.pc.0
    }

    pub fn index(&self) -> TypeAddr {
        self.mem.index.0
    }

    pub fn sp(&self) -> u8 {
        self.mem.stack.sp()
    }

    pub fn delay(&self) -> u8 {
        self.timers.delay.count
    }

    pub fn sound(&self) -> u8 {
        self.timers.sound.count
    }

    pub fn sound_active(&self) -> bool {
        self.timers.sound_active()
    }

    pub fn set_keys(&mut self, keys: u16) {
        self.keyboard.set_keys(keys);
    }

    pub fn keys(&self) -> u16 {
        self.keyboard.keys()
    }

    pub fn tick(&mut self) {
        self.timers.tick();
    }

    pub fn elapse(&mut self, elapsed: Duration) -> u32 {
        self.timers.elapse(elapsed)
    }

    pub fn pixel(&self, x: usize, y: usize) -> bool {
        self.fb.pixel(x, y)
    }

    /// RGBA raster of the screen; only valid until the next mutation.
    pub fn frame(&mut self) -> &[u8] {
        self.fb.frame()
    }

    pub fn fetch_decode(&mut self) -> OpCodes {
        let ins = self.mem.next_instruction();
        OpCodes::decode_raw(ins)
    }

    /// Run exactly one instruction. A halted machine keeps reporting the
    /// fault that stopped it and does nothing else.
    pub fn step(&mut self) -> Result<StepOutcome> {
        if let Some(fault) = &self.fault {
            return Err(fault.clone());
        }

        if let TimerClock::PerStep { hz } = self.config.timer_clock {
            self.timers.elapse(Duration::from_secs(1) / hz.max(1));
        }

        if self.keyboard.waiting().is_some() {
            return Ok(match self.keyboard.poll_wait() {
                Some((vx, key)) => {
                    self.regs.set_register(vx, key);
                    StepOutcome::KeyLatched(key)
                }
                None => StepOutcome::AwaitingKey,
            });
        }

        let pc = self.mem.pc.0;
        let operation = self.fetch_decode();
        log::trace!("{pc:#05X}: {operation:?}");

        match self.execute_ins(operation) {
            Ok(()) => Ok(StepOutcome::Executed(operation)),
            Err(err) => {
                log::error!("halting: {err}");
                self.fault = Some(err.clone());
                Err(err)
            }
        }
    }

    pub fn execute_ins(&mut self, ins: OpCodes) -> Result<()> {
        match ins {
            OpCodes::Jump(addr) => {
                self.mem.set_pc(addr);
            }
            OpCodes::SetRegister(vx, nn) => {
                self.regs.set_register(vx, nn);
            }
            OpCodes::AddToRegister(vx, nn) => {
                self.regs.add_to_register(vx, nn);
            }
            OpCodes::SetIndexRegister(addr) => self.mem.set_index(addr),
            OpCodes::ClearScreen => {
                self.fb.clear_buffer();
            }
            OpCodes::Display(reg_x, reg_y, height) => {
                let (x, y) = (self.regs.get(reg_x), self.regs.get(reg_y));
                let mut sprite = [0u8; 15];
                for (row, byte) in sprite.iter_mut().enumerate().take(height as usize) {
                    *byte = self.mem.get(self.mem.index.offset(row as u16));
                }

                let vf = self.fb.paint(x, y, &sprite[..height as usize]);
                self.regs.set_flag(vf);
            }
            OpCodes::PushSubroutine(addr) => {
                // return to the instruction after the call
                let ret = self.mem.pc.0;
                if !self.mem.stack.push(ret) {
                    return Err(Chip8Error::StackOverflow {
                        pc: ret.wrapping_sub(2) & ADDR_MASK,
                    });
                }
                self.mem.set_pc(addr);
            }
            OpCodes::PopSubroutine => {
                let addr = self.mem.stack.pop().ok_or(Chip8Error::StackUnderflow {
                    pc: self.mem.pc.0.wrapping_sub(2) & ADDR_MASK,
                })?;
                self.mem.set_pc(addr);
            }
            OpCodes::CopyRegister(vx, vy) => {
                self.regs.set_register(vx, self.regs.get(vy));
            }
            OpCodes::Or(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vy) | self.regs.get(vx));
            }
            OpCodes::And(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vy) & self.regs.get(vx));
            }
            OpCodes::XOr(vx, vy) => {
                self.regs
                    .set_register(vx, self.regs.get(vy) ^ self.regs.get(vx));
            }
            OpCodes::Add(vx, vy) => {
                let (z, carry) = self.regs.get(vx).overflowing_add(self.regs.get(vy));
                self.regs.set_register(vx, z);
                self.regs.set_flag(carry);
            }
            OpCodes::SubtractForward(vx, vy) => {
                let (z, borrow) = self.regs.get(vx).overflowing_sub(self.regs.get(vy));
                self.regs.set_register(vx, z);
                self.regs.set_flag(!borrow);
            }
            OpCodes::SubtractBackward(vx, vy) => {
                let (z, borrow) = self.regs.get(vy).overflowing_sub(self.regs.get(vx));
                self.regs.set_register(vx, z);
                self.regs.set_flag(!borrow);
            }
            OpCodes::LeftShift(vx, vy) => {
                let value = self.shift_source(vx, vy);
                self.regs.set_register(vx, value << 1);
                self.regs.set_register(FLAG, value >> 7);
            }
            OpCodes::RightShift(vx, vy) => {
                let value = self.shift_source(vx, vy);
                self.regs.set_register(vx, value >> 1);
                self.regs.set_register(FLAG, value & 1);
            }
            OpCodes::Random(vx, nn) => {
                let ransuu: u8 = self.rng.gen();
                self.regs.set_register(vx, nn & ransuu);
            }
            OpCodes::JumpWithOffset(addr) => {
                self.mem.set_pc(addr + self.regs.get(0) as u16);
            }
            OpCodes::AddToIndex(vx) => {
                let sum = self.mem.index.0.wrapping_add(self.regs.get(vx) as u16);
                self.mem.set_index(sum);
                if self.config.quirks.index_add_sets_vf {
                    self.regs.set_flag(sum > ADDR_MASK);
                }
            }
            OpCodes::SkipEqualConstant(vx, nn) => {
                if self.regs.get(vx) == nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualConstant(vx, nn) => {
                if self.regs.get(vx) != nn {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipEqualRegister(vx, vy) => {
                if self.regs.get(vx) == self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipNotEqualRegister(vx, vy) => {
                if self.regs.get(vx) != self.regs.get(vy) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::PointChar(vx) => {
                self.mem.set_index(memory::glyph_addr(self.regs.get(vx)));
            }
            OpCodes::ToDecimal(vx) => {
                let value = self.regs.get(vx);
                let digits = [value / 100, (value / 10) % 10, value % 10];
                for (i, digit) in digits.into_iter().enumerate() {
                    self.mem.set(self.mem.index.offset(i as u16), digit);
                }
            }
            OpCodes::SkipIfPressed(vx) => {
                if self.keyboard.get_key_status_from_num(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::SkipIfNotPressed(vx) => {
                if !self.keyboard.get_key_status_from_num(self.regs.get(vx)) {
                    self.mem.increment_pc();
                }
            }
            OpCodes::CopyDelayToRegister(vx) => self.regs.set_register(vx, self.timers.delay.count),
            OpCodes::CopyRegisterToDelay(vx) => self.timers.delay.set(self.regs.get(vx)),
            OpCodes::CopyRegisterToSound(vx) => self.timers.sound.set(self.regs.get(vx)),
            OpCodes::GetKey(vx) => {
                self.keyboard.begin_wait(vx);
            }
            OpCodes::LoadRegisterFromMemory(vx) => {
                for reg in 0..=vx {
                    let reg_val = self.mem.get(self.mem.index.offset(reg as u16));
                    self.regs.set_register(reg, reg_val);
                }
                self.advance_index_after_transfer(vx);
            }
            OpCodes::StoreRegisterToMemory(vx) => {
                for reg in 0..=vx {
                    let reg_val = self.regs.get(reg);
                    self.mem.set(self.mem.index.offset(reg as u16), reg_val);
                }
                self.advance_index_after_transfer(vx);
            }
            OpCodes::Unimplemented(word) => {
                log::warn!(
                    "unknown instruction {word:#06X} at {:#05X}, skipping",
                    self.mem.pc.0.wrapping_sub(2) & ADDR_MASK
                );
            }
        }
        Ok(())
    }

    fn shift_source(&self, vx: u8, vy: u8) -> u8 {
        if self.config.quirks.shift_uses_vy {
            self.regs.get(vy)
        } else {
            self.regs.get(vx)
        }
    }

    fn advance_index_after_transfer(&mut self, vx: u8) {
        if self.config.quirks.load_store_increments_index {
            let next = self.mem.index.0.wrapping_add(vx as u16 + 1);
            self.mem.set_index(next);
        }
    }
}
