//! Key-value namespaces backing the flat store.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A string-valued key-value namespace.
pub trait KeyValueStore {
    /// Read a value. A missing key is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value exists but cannot be read.
    fn get(&self, key: &str) -> io::Result<Option<String>>;

    /// Replace a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be durably written.
    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;

    /// Make sure the namespace exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be created.
    fn ensure(&self) -> io::Result<()> {
        Ok(())
    }

    /// Human-readable location for logs and errors.
    fn describe(&self) -> String;
}

/// One file per key inside a directory.
///
/// Writes go to `<key>.tmp`, are fsynced, then renamed over `<key>`, so a
/// reader never observes a half-written value.
#[derive(Debug, Clone)]
pub struct FileKv {
    dir: PathBuf,
}

impl FileKv {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.ensure()?;

        let target = self.path_for(key);
        let temp_path = self.dir.join(format!("{key}.tmp"));

        let mut file = File::create(&temp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &target)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&target, fs::Permissions::from_mode(0o600));
        }

        Ok(())
    }

    fn ensure(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// In-process namespace; nothing survives the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    values: HashMap<String, String>,
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        ":memory:".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_kv_missing_key_is_none() {
        let temp = TempDir::new().unwrap();
        let kv = FileKv::new(temp.path().join("kv"));
        assert_eq!(kv.get("todos").unwrap(), None);
    }

    #[test]
    fn file_kv_set_creates_dir_and_replaces() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileKv::new(temp.path().join("kv"));

        kv.set("todos_counter", "1").unwrap();
        kv.set("todos_counter", "2").unwrap();
        assert_eq!(kv.get("todos_counter").unwrap().as_deref(), Some("2"));

        let leftovers: Vec<_> = fs::read_dir(kv.dir())
            .unwrap()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files should be renamed away");
    }

    #[test]
    fn file_kv_invalid_utf8_is_invalid_data() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("todos"), [0xff, 0xfe, 0x00]).unwrap();
        let kv = FileKv::new(temp.path());
        let err = kv.get("todos").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn memory_kv_roundtrip() {
        let mut kv = MemoryKv::new();
        assert_eq!(kv.get("a").unwrap(), None);
        kv.set("a", "1").unwrap();
        assert_eq!(kv.get("a").unwrap().as_deref(), Some("1"));
        kv.set("a", "2").unwrap();
        assert_eq!(kv.get("a").unwrap().as_deref(), Some("2"));
    }
}
