//! A key-value store kept in a single JSON or MessagePack file

pub use codec::{Codec, JsonCodec, Mapping, MsgpackCodec};
pub use error::{Error, Result};
pub use format::{Format, Registry};
pub use fs::{Filesystem, LocalFs};
pub use kv::KeyValueFile;

mod codec;
mod error;
mod format;
mod fs;
mod kv;
