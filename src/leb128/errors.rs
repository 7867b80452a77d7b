/// An error in LEB128 encoding or decoding.
#[derive(thiserror::Error, Debug)]
pub enum Leb128Error {
    #[error("unexpected end of input in the middle of an integer")]
    UnexpectedEnd,
    #[error("integer representation too long; at most {0} bytes are allowed")]
    TooLong(usize),
    #[error("integer too large for {0} bits")]
    TooLarge(usize),
    #[error("failed to write to the given output")]
    Write(#[from] std::io::Error),
}
