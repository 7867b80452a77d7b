use crate::leb128::Leb128Error;
use nom::error::ErrorKind;
use thiserror::Error;

/// An error in decoding a WebAssembly module from the binary format.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("unexpected end of section or function")]
    UnexpectedEnd,
    #[error("magic header not detected")]
    BadMagic,
    #[error("unsupported binary format version")]
    BadVersion,
    #[error("malformed section id: {0}")]
    MalformedSectionId(u8),
    #[error("section out of order: id {id} after id {previous}")]
    SectionOutOfOrder { id: u8, previous: u8 },
    #[error("section size mismatch, id {id}: declared {declared} bytes, consumed {consumed}")]
    SectionSizeMismatch {
        id: u8,
        declared: usize,
        consumed: usize,
    },
    #[error("junk after last section")]
    JunkAfterLastSection,
    #[error("malformed value type: {0:#04x}")]
    MalformedValType(u8),
    #[error("malformed block type: {0}")]
    MalformedBlockType(i64),
    #[error("malformed mutability: {0}")]
    MalformedMutability(u8),
    #[error("malformed limits tag: {0}")]
    BadLimitsTag(u8),
    #[error("invalid function type tag: {0:#04x}")]
    BadFuncTypeTag(u8),
    #[error("invalid table element type: {0:#04x}")]
    BadElemType(u8),
    #[error("unsupported element segment kind: {0}")]
    BadElemKind(u32),
    #[error("unsupported data segment kind: {0}")]
    BadDataKind(u32),
    #[error("invalid import descriptor tag: {0}")]
    BadImportTag(u8),
    #[error("invalid export descriptor tag: {0}")]
    BadExportTag(u8),
    #[error("undefined opcode: {0:#06x}")]
    UndefinedOpcode(u32),
    #[error("zero flag expected, got {0}")]
    BadZeroFlag(u8),
    #[error("invalid expression end: {0:#04x}")]
    InvalidExprEnd(u32),
    #[error("malformed UTF-8 encoding")]
    MalformedUtf8,
    #[error("function and code section have inconsistent lengths: {functions} vs {bodies}")]
    InconsistentFuncCode { functions: usize, bodies: usize },
    #[error("too many locals: {0}")]
    TooManyLocals(u64),
    #[error("malformed name subsection: {0}")]
    MalformedNameSubsection(u8),
    #[error(transparent)]
    Int(#[from] Leb128Error),
    #[error("failed to read the module")]
    Io(#[from] std::io::Error),
    #[error("malformed binary")]
    Malformed,
}

impl<'a> nom::error::ParseError<&'a [u8]> for ParseError {
    fn from_error_kind(input: &'a [u8], kind: ErrorKind) -> Self {
        if input.is_empty() || kind == ErrorKind::Eof {
            ParseError::UnexpectedEnd
        } else {
            ParseError::Malformed
        }
    }

    fn append(_input: &'a [u8], _kind: ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<ParseError>> for ParseError {
    fn from(error: nom::Err<ParseError>) -> Self {
        match error {
            nom::Err::Incomplete(_) => ParseError::UnexpectedEnd,
            nom::Err::Error(error) | nom::Err::Failure(error) => error,
        }
    }
}

/// Raises the given error as a terminal parse failure.
pub(crate) fn fail(error: ParseError) -> nom::Err<ParseError> {
    nom::Err::Failure(error)
}
