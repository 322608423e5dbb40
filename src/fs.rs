use crate::Result;
use std::fs;
use std::io;
use std::path::Path;

/// Whole-file primitives a [`KeyValueFile`](crate::KeyValueFile) needs.
pub trait Filesystem {
    fn exists(&self, path: &Path) -> bool;

    fn read_all(&self, path: &Path) -> Result<Vec<u8>>;

    /// Creates the file, or truncates and replaces its content.
    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Removes the file. A missing file is not an error.
    fn delete(&self, path: &Path) -> Result<()>;
}

/// The local disk, through `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

impl Filesystem for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_all(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }

    fn write_all(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => Ok(other?),
        }
    }
}
