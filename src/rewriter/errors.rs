use thiserror::Error;

/// An error raised by the section or semantics rewriters.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("selector matched {0} rows where exactly one was required")]
    AmbiguousSelector(usize),
    #[error("selector matched no rows")]
    NoMatch,
    #[error("function index {0} refers to an import, which has no editable body")]
    ImportNotEditable(u32),
    #[error("descriptor is missing the required field `{0}`")]
    MissingField(&'static str),
    #[error("cannot delete {entity} {index}: an instruction still references it")]
    DanglingReference { entity: &'static str, index: u32 },
    #[error("unmatched `end` in a flat instruction sequence")]
    UnmatchedEnd,
    #[error("`else` outside of an `if` in a flat instruction sequence")]
    UnexpectedElse,
    #[error("flat instruction sequence ended inside a block")]
    MissingEnd,
    #[error("the module defines no memory")]
    NoMemory,
    #[error("instruction offset {0} is out of bounds")]
    OffsetOutOfBounds(usize),
}
