use crate::{instances::Handle, memory::TypeAddr};

/// Everything that can go wrong while loading or running a ROM.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Chip8Error {
    #[error("ROM is too large ({size} bytes), max size is {max_size} bytes")]
    RomTooLarge { size: usize, max_size: usize },

    #[error("stack overflow: call at {pc:#05X} with a full call stack")]
    StackOverflow { pc: TypeAddr },

    #[error("stack underflow: return at {pc:#05X} with an empty call stack")]
    StackUnderflow { pc: TypeAddr },

    #[error("no live emulator for handle {0:?}")]
    UnknownHandle(Handle),
}

pub type Result<T> = std::result::Result<T, Chip8Error>;
