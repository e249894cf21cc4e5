//! A CHIP-8 virtual machine.
//!
//! ## Design
//!
//! * the machine is one owned value, `Chip8Interpreter`; no globals, so
//!   several can run side by side
//! * the host drives it a cycle at a time and separately ticks the timers
//!   at 60Hz; timer decay never depends on how fast instructions run
//! * instructions decode into an exhaustive enum, with anything the
//!   machine doesn't implement landing in `Instruction::Unknown`
//! * unknown opcodes are skipped and counted by default, or halt the
//!   machine under the strict policy; every other error halts it
//! * Fx0A (wait for key) parks the machine instead of blocking, so the
//!   host keeps ticking timers and redrawing while it waits
//! * sprites wrap around the screen edges
//! * display, input and sound are traits so the core doesn't need to know
//!   what kind of screen, keyboard or speaker is on the other end
//!
//! Model
//!
//! Environment
//!  |-- display, input, sound
//!  |-- interpreter(config)
//!  |    |-- memory (font at 0x000, program at 0x200)
//!  |    |-- registers, call stack, timers, framebuffer, keypad
//!  |    `-- instruction decoder
//!  `-- main loop
//!       |-- poll input -> set_key
//!       |-- run the cycles owed at the instruction rate
//!       |-- tick the timers owed at 60Hz
//!       |-- redraw if the framebuffer is dirty
//!       `-- beep while the sound timer is running
pub mod config;
pub mod display;
pub mod environment;
pub mod errors;
pub mod framebuffer;
pub mod input;
pub mod instruction;
pub mod interpreter;
pub mod keypad;
pub mod memory;
pub mod registers;
pub mod sound;
pub mod stack;
pub mod timers;

pub use config::{Config, UnknownOpcodePolicy};
pub use errors::{EnvError, Fault, VmError};
pub use instruction::{AluOp, Instruction};
pub use interpreter::{Chip8Interpreter, Cycle};
pub use memory::MemoryMap;
