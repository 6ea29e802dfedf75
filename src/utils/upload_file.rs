use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

/// A file part spooled to disk for the lifetime of one request.
///
/// The temp file is removed when the handle is dropped; [`UploadedFile::remove`]
/// does the same but reports failures so they can be logged.
#[derive(Debug)]
pub struct UploadedFile {
    file: NamedTempFile,
    file_name: Option<String>,
    content_type: Option<String>,
    size: usize,
}

impl UploadedFile {
    pub fn new(
        file: NamedTempFile,
        file_name: Option<String>,
        content_type: Option<String>,
        size: usize,
    ) -> Self {
        Self {
            file,
            file_name,
            content_type,
            size,
        }
    }

    /// Client-supplied name, if it is non-empty. Untrusted.
    pub fn original_filename(&self) -> Option<&str> {
        self.file_name.as_deref().filter(|name| !name.is_empty())
    }

    /// Declared content type of the part, parameters stripped.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn read(&self) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path()).await
    }

    pub fn remove(self) -> io::Result<()> {
        self.file.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn spooled(dir: &Path, name: Option<&str>, content: &[u8]) -> UploadedFile {
        let mut file = NamedTempFile::new_in(dir).unwrap();
        file.write_all(content).unwrap();
        UploadedFile::new(file, name.map(str::to_string), None, content.len())
    }

    #[test]
    fn empty_filename_counts_as_missing() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(spooled(dir.path(), Some("a.jpg"), b"x").original_filename(), Some("a.jpg"));
        assert_eq!(spooled(dir.path(), Some(""), b"x").original_filename(), None);
        assert_eq!(spooled(dir.path(), None, b"x").original_filename(), None);
    }

    #[tokio::test]
    async fn read_returns_spooled_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let upload = spooled(dir.path(), None, &[0, 159, 146, 150]);

        assert_eq!(upload.read().await.unwrap(), vec![0, 159, 146, 150]);
        assert_eq!(upload.size(), 4);
    }

    #[test]
    fn remove_and_drop_both_delete_the_file() {
        let dir = tempfile::tempdir().unwrap();

        let removed = spooled(dir.path(), None, b"one");
        let removed_path = removed.path().to_path_buf();
        removed.remove().unwrap();
        assert!(!removed_path.exists());

        let dropped = spooled(dir.path(), None, b"two");
        let dropped_path = dropped.path().to_path_buf();
        drop(dropped);
        assert!(!dropped_path.exists());
    }

    #[test]
    fn remove_reports_a_file_deleted_behind_its_back() {
        let dir = tempfile::tempdir().unwrap();
        let upload = spooled(dir.path(), Some("a.jpg"), b"gone");
        std::fs::remove_file(upload.path()).unwrap();

        let err = upload.remove().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn content_type_and_size_are_exposed_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = NamedTempFile::new_in(dir.path()).unwrap();
        file.write_all(b"png!").unwrap();
        let upload = UploadedFile::new(file, None, Some("image/png".to_string()), 4);

        assert_eq!(upload.content_type(), Some("image/png"));
        assert_eq!(upload.size(), 4);
    }
}
