use std::fmt;
use std::io;

use crate::error::DecodeError;

use super::package::PackageKind;

/// Failure constructing a `Package` from raw bytes or from an object.
#[derive(Debug)]
pub enum PackageCreationError {
    /// The raw bytes were empty (no header byte).
    Empty,
    /// The lower 7 bits of the header byte did not name a known kind.
    UnknownKind(u8),
}

impl fmt::Display for PackageCreationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageCreationError::Empty => write!(f, "package has no header byte"),
            PackageCreationError::UnknownKind(k) => write!(f, "unknown package kind {k:#x}"),
        }
    }
}

impl std::error::Error for PackageCreationError {}

/// Failure dispatching a package to a registered handler.
#[derive(Debug)]
pub enum PackageHandleError {
    /// The raw bytes could not be parsed into a package at all.
    Creation(PackageCreationError),
    /// The package's direction bit did not match the direction this
    /// handler accepts.
    DirectionMismatch,
    /// No handler was registered for this package's kind.
    NoHandler(PackageKind),
    /// The payload did not decode into the shape the handler expected.
    Decode(DecodeError),
    /// The handler itself failed.
    Handler(String),
}

impl fmt::Display for PackageHandleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageHandleError::Creation(e) => write!(f, "{e}"),
            PackageHandleError::DirectionMismatch => write!(f, "package direction mismatch"),
            PackageHandleError::NoHandler(kind) => write!(f, "no handler registered for {kind:?}"),
            PackageHandleError::Decode(e) => write!(f, "{e}"),
            PackageHandleError::Handler(msg) => write!(f, "handler failed: {msg}"),
        }
    }
}

impl std::error::Error for PackageHandleError {}

impl From<PackageCreationError> for PackageHandleError {
    fn from(e: PackageCreationError) -> Self {
        PackageHandleError::Creation(e)
    }
}

impl From<DecodeError> for PackageHandleError {
    fn from(e: DecodeError) -> Self {
        PackageHandleError::Decode(e)
    }
}

/// Failure reading or writing a length-prefixed frame.
#[derive(Debug)]
pub enum FramingError {
    Io(io::Error),
    /// The outbound payload exceeds the 65,535-byte maximum message size.
    Overflow,
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingError::Io(e) => write!(f, "framing i/o error: {e}"),
            FramingError::Overflow => write!(f, "package exceeds maximum frame size"),
        }
    }
}

impl std::error::Error for FramingError {}

impl From<io::Error> for FramingError {
    fn from(e: io::Error) -> Self {
        FramingError::Io(e)
    }
}
