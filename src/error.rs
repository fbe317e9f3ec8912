use thiserror::Error;

pub type Result<T> = std::result::Result<T, Chip8Error>;

/// Everything that can abort a load or a single `step()`.
#[derive(Debug, Error)]
pub enum Chip8Error {
    #[error("memory access out of range at address {address:#06X}")]
    OutOfRange { address: usize },

    #[error("stack overflow: call with all {depth} return slots in use")]
    StackOverflow { depth: usize },

    #[error("stack underflow: return with an empty call stack")]
    StackUnderflow,

    #[error("program is too large ({size} bytes), {capacity} bytes available")]
    ProgramTooLarge { size: usize, capacity: usize },

    #[error("failed to read program: {0}")]
    Io(#[from] std::io::Error),

    #[error("usage: {0}")]
    Usage(String),
}
