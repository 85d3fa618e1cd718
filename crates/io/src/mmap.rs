#[derive(Debug)]
pub struct MmapFile {
    _file: std::fs::File,
    mmap: Option<memmap2::Mmap>,
}

impl MmapFile {
    /// # Errors
    ///
    /// - `std::io::Error` if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;

        // memmap2::Mmap::map rejects a zero-length file (mmap(2) returns
        // EINVAL for a zero-length mapping on Linux), so an empty file is
        // represented as no mapping at all rather than attempting one.
        let mmap = if file.metadata()?.len() == 0 {
            None
        } else {
            // SAFETY:
            // - File is opened read-only
            // - We keep the file handle alive in struct
            // - Caller only gets immutable &[u8]
            Some(unsafe { memmap2::Mmap::map(&file)? })
        };

        Ok(Self { _file: file, mmap })
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_a_nonempty_file_maps_its_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "hello").unwrap();

        let mapped = MmapFile::open(&path).unwrap();
        assert_eq!(mapped.as_slice(), b"hello");
    }

    #[test]
    fn opening_an_empty_file_does_not_attempt_a_zero_length_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        std::fs::write(&path, "").unwrap();

        let mapped = MmapFile::open(&path).unwrap();
        assert_eq!(mapped.as_slice(), b"");
    }
}
