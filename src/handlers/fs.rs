//! Filesystem seam for static content.
//!
//! Paths are absolute within the filesystem (`/www/index.htm`).

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;

/// Read-only view of a filesystem.
pub trait FileSystem: Send + Sync {
    /// Returns true if `path` names a regular file.
    fn exists(&self, path: &str) -> bool;

    /// Size of the file in bytes.
    fn size(&self, path: &str) -> io::Result<u64>;

    /// Read into `buf` starting at `offset`. Returns the number of bytes read.
    fn read_at(&self, path: &str, offset: u64, buf: &mut [u8]) -> io::Result<usize>;
}

/// In-memory filesystem, e.g. for assets compiled into the image.
#[derive(Debug, Default, Clone)]
pub struct MemoryFs {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    fn file(&self, path: &str) -> io::Result<&[u8]> {
        self.files
            .get(path)
            .map(Vec::as_slice)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.to_string()))
    }
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    fn size(&self, path: &str) -> io::Result<u64> {
        Ok(self.file(path)?.len() as u64)
    }

    fn read_at(&self, path: &str, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.file(path)?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }
}

/// Filesystem rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskFs {
    root: PathBuf,
}

impl DiskFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = path.trim_start_matches('/');
        if relative.split('/').any(|part| part == "..") {
            return None;
        }
        Some(self.root.join(relative))
    }

    fn open(&self, path: &str) -> io::Result<File> {
        let full = self
            .resolve(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::PermissionDenied, path.to_string()))?;
        File::open(full)
    }
}

impl FileSystem for DiskFs {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.is_file())
    }

    fn size(&self, path: &str) -> io::Result<u64> {
        Ok(self.open(path)?.metadata()?.len())
    }

    fn read_at(&self, path: &str, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let mut file = self.open(path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_fs_read_at() {
        let fs = MemoryFs::new().with_file("/a.txt", "hello world");
        assert!(fs.exists("/a.txt"));
        assert!(!fs.exists("/b.txt"));
        assert_eq!(fs.size("/a.txt").unwrap(), 11);

        let mut buf = [0u8; 5];
        assert_eq!(fs.read_at("/a.txt", 6, &mut buf).unwrap(), 5);
        assert_eq!(&buf, b"world");
        assert_eq!(fs.read_at("/a.txt", 20, &mut buf).unwrap(), 0);
        assert!(fs.read_at("/b.txt", 0, &mut buf).is_err());
    }

    #[test]
    fn test_disk_fs_rejects_parent_segments() {
        let dir = std::env::temp_dir().join(format!("dispatch-fs-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.htm"), b"<html>").unwrap();

        let fs = DiskFs::new(&dir);
        assert!(fs.exists("/index.htm"));
        assert_eq!(fs.size("/index.htm").unwrap(), 6);
        assert!(!fs.exists("/../index.htm"));
        assert!(fs.size("/../etc/passwd").is_err());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
