use crate::Code;
use thiserror::Error;

/// An error in the coded data itself.
///
/// None of these are recoverable. Once returned, the coder that produced it should be dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzwError {
    /// The input holds a byte without a literal code.
    #[error("input byte {byte:#04x} has no literal code")]
    UnsupportedByte { byte: u8 },

    /// A code that is neither known nor the next code to be assigned.
    ///
    /// Either the stream is corrupt or it was produced under different code assignment rules.
    #[error("protocol violation: code {code} is unknown, the next assignable code is {expected}")]
    ProtocolViolation { code: Code, expected: Code },

    /// The code stream ended in the middle of a code.
    #[error("code stream ends with {trailing} bytes of an incomplete code")]
    TruncatedCode { trailing: usize },
}

/// An error while driving a coder from a reader into a writer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lzw(#[from] LzwError),
}

impl Error {
    /// The coding error, if this was not an IO failure.
    pub fn lzw(&self) -> Option<LzwError> {
        match self {
            Error::Lzw(err) => Some(*err),
            Error::Io(_) => None,
        }
    }
}
