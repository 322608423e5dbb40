use crate::codec::Mapping;
use crate::format::Format;
use crate::fs::{Filesystem, LocalFs};
use crate::{Error, Result};
use log::{debug, trace};
use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// The `KeyValueFile` stores key/value pairs in a single file.
///
/// The whole mapping is decoded on every read and re-encoded on every write;
/// nothing is cached between calls. Keys may be anything with a string form
/// and are always compared as strings.
///
/// # Example
///
/// ```rust
/// use kvfile::{Format, KeyValueFile};
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = KeyValueFile::open(dir.path().join("db"), Format::json());
/// assert!(store.path().ends_with("db.json"));
///
/// store.set("key", "value").unwrap();
/// assert_eq!(store.load("key").unwrap(), Some("value".into()));
/// assert_eq!(store.load("other").unwrap(), None);
/// ```
pub struct KeyValueFile<F: Filesystem = LocalFs> {
    path: PathBuf,
    format: Format,
    fs: F,
}

impl KeyValueFile {
    /// Open a store on the local disk.
    ///
    /// `path` gets the format's extension appended unless it already has it.
    /// The file itself is not touched until the first write.
    pub fn open(path: impl AsRef<Path>, format: Format) -> KeyValueFile {
        KeyValueFile::with_fs(path, format, LocalFs)
    }
}

impl<F: Filesystem> KeyValueFile<F> {
    /// Open a store backed by a custom [`Filesystem`].
    pub fn with_fs(path: impl AsRef<Path>, format: Format, fs: F) -> Self {
        let path = format.resolve_path(path);
        debug!("open {} as {}", path.display(), format.id());
        KeyValueFile { path, format, fs }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn exists(&self) -> bool {
        self.fs.exists(&self.path)
    }

    /// Inserts a key-value pair, rewriting the whole file.
    ///
    /// If the key is already present, its value is replaced. A missing file
    /// is created.
    ///
    /// Floats must be finite: NaN and infinities have no JSON form.
    ///
    /// # Errors
    ///
    /// It returns `Error::NonFiniteFloat`, leaving the file untouched, if
    /// `value` holds NaN or an infinity.
    ///
    /// It propagates I/O and codec errors, including a corrupt existing file.
    pub fn set(&self, key: impl ToString, value: impl Serialize) -> Result<()> {
        let key = key.to_string();
        if !all_floats_finite(&value)? {
            return Err(Error::NonFiniteFloat(key));
        }
        let value = serde_json::to_value(value)?;
        let mut mapping = self.read()?;
        trace!("set {:?} in {}", key, self.path.display());
        mapping.insert(key, value);
        self.write(&mapping)
    }

    /// Removes a key, rewriting the whole file.
    ///
    /// # Errors
    ///
    /// It returns `Error::NotFound` if the file or the key does not exist.
    pub fn remove(&self, key: impl ToString) -> Result<()> {
        let key = key.to_string();
        let mut mapping = self.read_required()?;
        if mapping.remove(&key).is_none() {
            return Err(self.not_found(Some(key)));
        }
        trace!("remove {:?} from {}", key, self.path.display());
        self.write(&mapping)
    }

    /// The full mapping, or an empty one if the file does not exist.
    pub fn read(&self) -> Result<Mapping> {
        Ok(self.decode_file()?.unwrap_or_default())
    }

    /// The full mapping.
    ///
    /// # Errors
    ///
    /// It returns `Error::NotFound` if the file does not exist.
    pub fn read_required(&self) -> Result<Mapping> {
        self.decode_file()?.ok_or_else(|| self.not_found(None))
    }

    /// The value stored under `key`.
    ///
    /// Returns `Ok(None)` if the file or the key does not exist.
    pub fn load(&self, key: impl ToString) -> Result<Option<Value>> {
        let key = key.to_string();
        Ok(self.decode_file()?.and_then(|mut mapping| mapping.remove(&key)))
    }

    /// The value stored under `key`.
    ///
    /// # Errors
    ///
    /// It returns `Error::NotFound` if the file or the key does not exist.
    pub fn load_required(&self, key: impl ToString) -> Result<Value> {
        let key = key.to_string();
        let mut mapping = self.read_required()?;
        mapping.remove(&key).ok_or_else(|| self.not_found(Some(key)))
    }

    /// Indexed lookup, same as [`load_required`](Self::load_required).
    pub fn get(&self, key: impl ToString) -> Result<Value> {
        self.load_required(key)
    }

    /// The value stored under `key`, deserialized into `T`.
    pub fn load_as<T: DeserializeOwned>(&self, key: impl ToString) -> Result<T> {
        Ok(serde_json::from_value(self.load_required(key)?)?)
    }

    /// All keys, sorted.
    ///
    /// # Errors
    ///
    /// It returns `Error::NotFound` if the file does not exist.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.read_required()?.into_iter().map(|(k, _)| k).collect();
        keys.sort_unstable();
        Ok(keys)
    }

    /// Deletes the file. Does nothing if it is already gone.
    pub fn truncate(&self) -> Result<()> {
        debug!("truncate {}", self.path.display());
        self.fs.delete(&self.path)
    }

    /// `None` if the file does not exist.
    fn decode_file(&self) -> Result<Option<Mapping>> {
        if !self.fs.exists(&self.path) {
            trace!("{} does not exist", self.path.display());
            return Ok(None);
        }
        let bytes = self.fs.read_all(&self.path)?;
        self.format.codec().decode(&bytes).map(Some)
    }

    fn write(&self, mapping: &Mapping) -> Result<()> {
        let bytes = self.format.codec().encode(mapping)?;
        trace!("write {} bytes to {}", bytes.len(), self.path.display());
        self.fs.write_all(&self.path, &bytes)
    }

    fn not_found(&self, key: Option<String>) -> Error {
        Error::NotFound {
            path: self.path.clone(),
            key,
        }
    }
}

/// `serde_json::to_value` maps NaN and infinities to `null` without an error,
/// so walk a MessagePack rendering of `value` looking for them first.
fn all_floats_finite(value: &impl Serialize) -> Result<bool> {
    let bytes = rmp_serde::to_vec(value)?;
    Ok(rmp_serde::from_slice::<Finite>(&bytes)?.0)
}

struct Finite(bool);

impl<'de> Deserialize<'de> for Finite {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(FiniteVisitor)
    }
}

struct FiniteVisitor;

impl<'de> Visitor<'de> for FiniteVisitor {
    type Value = Finite;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any MessagePack value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> std::result::Result<Finite, E> {
        Ok(Finite(true))
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> std::result::Result<Finite, E> {
        Ok(Finite(true))
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> std::result::Result<Finite, E> {
        Ok(Finite(true))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Finite, E> {
        Ok(Finite(v.is_finite()))
    }

    fn visit_str<E: de::Error>(self, _: &str) -> std::result::Result<Finite, E> {
        Ok(Finite(true))
    }

    fn visit_bytes<E: de::Error>(self, _: &[u8]) -> std::result::Result<Finite, E> {
        Ok(Finite(true))
    }

    fn visit_unit<E: de::Error>(self) -> std::result::Result<Finite, E> {
        Ok(Finite(true))
    }

    fn visit_none<E: de::Error>(self) -> std::result::Result<Finite, E> {
        Ok(Finite(true))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Finite, D::Error> {
        Finite::deserialize(deserializer)
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> std::result::Result<Finite, D::Error> {
        Finite::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Finite, A::Error> {
        let mut finite = true;
        while let Some(Finite(f)) = seq.next_element()? {
            finite &= f;
        }
        Ok(Finite(finite))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Finite, A::Error> {
        let mut finite = true;
        while let Some((Finite(k), Finite(v))) = map.next_entry()? {
            finite &= k && v;
        }
        Ok(Finite(finite))
    }
}
