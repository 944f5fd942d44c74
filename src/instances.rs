use std::time::Duration;

use crate::{
    config::Config,
    emulator::{Emulator, StepOutcome},
    error::{Chip8Error, Result},
};

/// Opaque reference to an emulator owned by [`Instances`]. A handle goes
/// stale once its emulator is disposed and never aliases a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

struct Slot {
    generation: u32,
    emulator: Option<Emulator>,
}

/// Arena of independent emulators. Slots are recycled, generations are not;
/// a slot whose generation runs out is retired.
#[derive(Default)]
pub struct Instances {
    slots: Vec<Slot>,
    free: Vec<u32>,
    config: Config,
}

impl Instances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config applied to emulators made by [`Instances::create`].
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn create(&mut self, rom: &[u8]) -> Result<Handle> {
        self.create_with(rom, self.config)
    }

    pub fn create_with(&mut self, rom: &[u8], config: Config) -> Result<Handle> {
        let emulator = Emulator::new(rom, config)?;
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.emulator = Some(emulator);
                Handle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    emulator: Some(emulator),
                });
                Handle {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        log::debug!("created emulator {handle:?}");
        Ok(handle)
    }

    /// Drop the emulator behind `handle` and hand it back to the caller.
    pub fn dispose(&mut self, handle: Handle) -> Result<Emulator> {
        let slot = self.slot_mut(handle)?;
        let emulator = slot.emulator.take().ok_or(Chip8Error::UnknownHandle(handle))?;
        match slot.generation.checked_add(1) {
            Some(next) => {
                slot.generation = next;
                self.free.push(handle.index);
            }
            // generations are exhausted: the slot stays empty for good
            None => log::debug!("retiring slot {}", handle.index),
        }
        log::debug!("disposed emulator {handle:?}");
        Ok(emulator)
    }

    pub fn get(&self, handle: Handle) -> Result<&Emulator> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.emulator.as_ref())
            .ok_or(Chip8Error::UnknownHandle(handle))
    }

    pub fn get_mut(&mut self, handle: Handle) -> Result<&mut Emulator> {
        self.slot_mut(handle)?
            .emulator
            .as_mut()
            .ok_or(Chip8Error::UnknownHandle(handle))
    }

    fn slot_mut(&mut self, handle: Handle) -> Result<&mut Slot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(Chip8Error::UnknownHandle(handle))
    }

    /// Swap in a new ROM without disturbing any other emulator.
    pub fn reload(&mut self, handle: Handle, rom: &[u8]) -> Result<()> {
        self.get_mut(handle)?.initialize(rom)
    }

    pub fn step(&mut self, handle: Handle) -> Result<StepOutcome> {
        self.get_mut(handle)?.step()
    }

    pub fn tick(&mut self, handle: Handle) -> Result<()> {
        self.get_mut(handle)?.tick();
        Ok(())
    }

    pub fn elapse(&mut self, handle: Handle, elapsed: Duration) -> Result<u32> {
        Ok(self.get_mut(handle)?.elapse(elapsed))
    }

    pub fn set_keys(&mut self, handle: Handle, keys: u16) -> Result<()> {
        self.get_mut(handle)?.set_keys(keys);
        Ok(())
    }

    pub fn frame(&mut self, handle: Handle) -> Result<&[u8]> {
        Ok(self.get_mut(handle)?.frame())
    }

    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.emulator.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
