//! CHIP-8 interpreter.
//!
//! [`Cpu`] owns the machine: 4K of [`Memory`] with the hex font at 0x000 and
//! the program at 0x200, a 64x32 [`Framebuffer`], a [`DelayTimer`] ticking on
//! its own thread, and a [`Keypad`] fed by some [`HostInput`]. [`Cpu::run`]
//! loops fetch, decode, execute, advance, handing the screen to a
//! [`Renderer`] after every instruction until the host asks to quit.
//!
//! The `sdl` feature adds an SDL2 window and keyboard, and the `chip8-vm`
//! binary.

pub mod config;
pub mod cpu;
pub mod display;
pub mod error;
pub mod instruction;
pub mod keypad;
pub mod memory;
#[cfg(feature = "sdl")]
pub mod sdl;
pub mod timer;

pub use config::Config;
pub use cpu::{Cpu, Exit};
pub use display::{Framebuffer, NullRenderer, Renderer};
pub use error::{Error, Result};
pub use instruction::Instruction;
pub use keypad::{HostEvent, HostInput, Keypad, ScriptedInput};
pub use memory::Memory;
pub use timer::DelayTimer;
