use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop the interpreter. None of these are retried; the
/// run loop hands them straight back to its caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("memory access out of bounds at address {address:#06X}")]
    OutOfBounds { address: u16 },

    #[error("handler for {expected} received mismatched opcode {opcode:#06X}")]
    InvalidInstruction { opcode: u16, expected: &'static str },

    #[error("stack overflow: more than 16 nested calls")]
    StackOverflow,

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("invalid key {key:#04X}, keypad only has keys 0x0-0xF")]
    InvalidKey { key: u8 },

    #[error("no font glyph for {index:#04X}")]
    InvalidGlyphIndex { index: u8 },

    #[error("program is {size} bytes, at most {max} bytes fit in memory")]
    ProgramTooLarge { size: usize, max: usize },

    #[error("render failed: {0}")]
    Render(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
