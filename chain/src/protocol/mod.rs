//! The length-prefixed, typed wire protocol: packages, the factory that
//! builds them, the handler that dispatches them, payload encodings, and
//! frame-level I/O.

mod error;
mod framing;
mod handler;
mod package;
mod payload;

pub use error::{FramingError, PackageCreationError, PackageHandleError};
pub use framing::{MAX_FRAME_LEN, read_frame, write_frame};
pub use handler::PackageHandler;
pub use package::{ClientBound, Direction, DirectionTag, Package, PackageFactory, PackageKind, ServerBound};
pub use payload::{LogLevel, LogText, decode_block_list, decode_file_hash, encode_block_list, encode_file_hash};
