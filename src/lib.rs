// 16 8-bit data registers named V0 to VF
// I -> address register (12 bits)
//
// Stack of up to 16 return addresses
//
// Delay timer & Sound timer: Count down at 60 times / s until 0
// Sound is only reported as a flag, hosts decide whether to beep
//
// Display res: 64 width, 32 height
//
// 35 opcodes, each are 2 bytes (big-endian)
//      NNN: address
//      NN: 8-bit constant
//      N: 4-bit constant
//      X and Y: 4-bit register identifier
//
// The core never sleeps or reads the clock. Hosts decide how many `step`s
// to run per frame and call `tick` at 60 Hz (or `elapse` with real time).

pub mod config;
pub mod decode;
pub mod display;
pub mod emulator;
pub mod error;
pub mod instances;
pub mod keyboard;
pub mod memory;
pub mod registers;
pub mod timer;

pub use config::{Config, Quirks, TimerClock};
pub use decode::OpCodes;
pub use emulator::{Emulator, StepOutcome};
pub use error::Chip8Error;
pub use instances::{Handle, Instances};
pub use memory::RomBuffer;
