//! Zip archive access for plugin and WAR files

use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::manifest::MANIFEST_PATH;
use crate::{Error, Result};

/// An opened zip archive, labelled for error messages.
pub struct Archive<R> {
    label: PathBuf,
    zip: ZipArchive<R>,
}

impl Archive<File> {
    /// Open an archive on disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| jpr_fs::Error::io(path, e))?;
        Self::new(path, file)
    }
}

impl Archive<Cursor<Vec<u8>>> {
    /// Open an archive held in memory, such as one nested in another.
    pub fn from_bytes(label: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self> {
        Self::new(label, Cursor::new(bytes))
    }
}

impl<R: Read + Seek> Archive<R> {
    fn new(label: impl Into<PathBuf>, reader: R) -> Result<Self> {
        let label = label.into();
        let zip = ZipArchive::new(reader).map_err(|e| Error::InvalidArchive {
            path: label.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self { label, zip })
    }

    pub fn label(&self) -> &Path {
        &self.label
    }

    /// Names of every entry in the archive.
    pub fn entry_names(&self) -> Vec<String> {
        self.zip.file_names().map(str::to_string).collect()
    }

    /// Read one entry fully.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = self.zip.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => Error::MissingEntry {
                path: self.label.clone(),
                entry: name.to_string(),
            },
            other => Error::InvalidArchive {
                path: self.label.clone(),
                reason: other.to_string(),
            },
        })?;

        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(|e| jpr_fs::Error::io(self.label.join(name), e))?;
        Ok(content)
    }

    /// The archive's `META-INF/MANIFEST.MF` as text.
    pub fn read_manifest(&mut self) -> Result<String> {
        let bytes = self.read_entry(MANIFEST_PATH)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_manifest() {
        let bytes = zip_with(&[(MANIFEST_PATH, "Short-Name: git\n")]);
        let mut archive = Archive::from_bytes("git.hpi", bytes).unwrap();
        assert_eq!(archive.read_manifest().unwrap(), "Short-Name: git\n");
        assert_eq!(archive.entry_names(), vec![MANIFEST_PATH.to_string()]);
    }

    #[test]
    fn missing_entry_is_reported() {
        let bytes = zip_with(&[("index.jelly", "<div/>")]);
        let mut archive = Archive::from_bytes("git.hpi", bytes).unwrap();
        let err = archive.read_manifest().unwrap_err();
        assert!(matches!(err, Error::MissingEntry { entry, .. } if entry == MANIFEST_PATH));
    }

    #[test]
    fn garbage_is_not_an_archive() {
        let err = Archive::from_bytes("broken.hpi", b"<html>404</html>".to_vec()).err();
        assert!(matches!(err, Some(Error::InvalidArchive { .. })));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Archive::open(&dir.path().join("absent.jpi")).err().unwrap();
        assert!(err.is_not_found());
    }
}
