use crate::codec::{Codec, JsonCodec, MsgpackCodec};
use crate::{Error, Result};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// A storage format: an id, the file extension it expects and its codec.
#[derive(Clone)]
pub struct Format {
    id: String,
    extension: String,
    codec: Arc<dyn Codec>,
}

impl Format {
    /// `extension` is the canonical suffix (`".json"`, `"json"` and
    /// `".tar.gz"` all work; a missing leading dot is added), or `""` for a
    /// format that leaves paths untouched.
    pub fn new(id: impl Into<String>, extension: impl Into<String>, codec: impl Codec + 'static) -> Self {
        let mut extension = extension.into();
        if !extension.is_empty() && !extension.starts_with('.') {
            extension.insert(0, '.');
        }
        Format {
            id: id.into(),
            extension,
            codec: Arc::new(codec),
        }
    }

    pub fn json() -> Self {
        Format::new("json", ".json", JsonCodec)
    }

    pub fn msgpack() -> Self {
        Format::new("msgpack", ".msgpack", MsgpackCodec)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// Returns `path` if it already ends with this format's extension,
    /// otherwise `path` with the extension appended.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        if self.extension.is_empty() || path.to_string_lossy().ends_with(&self.extension) {
            return path.to_path_buf();
        }
        let mut raw = OsString::from(path.as_os_str());
        raw.push(&self.extension);
        PathBuf::from(raw)
    }
}

impl fmt::Debug for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Format")
            .field("id", &self.id)
            .field("extension", &self.extension)
            .finish()
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(id: &str) -> Result<Self> {
        Registry::default().lookup(id)
    }
}

/// Format id -> [`Format`] table. The default registry knows `json` and `msgpack`.
#[derive(Debug, Clone)]
pub struct Registry {
    formats: HashMap<String, Format>,
}

impl Registry {
    /// A registry with no formats at all.
    pub fn empty() -> Self {
        Registry {
            formats: HashMap::new(),
        }
    }

    /// Adds `format`, replacing any format registered under the same id.
    pub fn register(&mut self, format: Format) -> &mut Self {
        self.formats.insert(format.id.clone(), format);
        self
    }

    pub fn lookup(&self, id: &str) -> Result<Format> {
        self.formats
            .get(id)
            .cloned()
            .ok_or_else(|| Error::UnknownFormat(id.to_owned()))
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.formats.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry::empty();
        registry.register(Format::json()).register(Format::msgpack());
        registry
    }
}
