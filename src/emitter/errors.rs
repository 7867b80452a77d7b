use crate::leb128::Leb128Error;
use thiserror::Error;

/// An error in emitting a WebAssembly module in the binary format.
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("an IO error occurred")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Int(#[from] Leb128Error),
    #[error("invalid opcode in the module: {0:#06x}")]
    InvalidOpcode(u32),
    #[error("arguments do not match the shape of opcode {0:#06x}")]
    MismatchedArgs(u32),
}
