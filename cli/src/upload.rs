//! Upload intake: accept `.pdf`/`.txt` files and store them under the uploads directory.

use std::io;
use std::path::{Path, PathBuf};

use docqa_pdf_process::DocumentKind;

/// Rejected uploads.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The path has no usable file name.
    #[error("'{0}' does not name a file")]
    NoFileName(PathBuf),
    /// The extension is neither `.pdf` nor `.txt`.
    #[error("only PDF and TXT files are supported (got '{0}')")]
    Unsupported(String),
    /// Reading the source or writing the copy failed.
    #[error("failed to store upload '{filename}': {source}")]
    Io {
        /// File being stored.
        filename: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

/// A document copied into the uploads directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Original file name; chunks are attributed to it.
    pub filename: String,
    /// Location of the copy.
    pub path: PathBuf,
    /// Detected format.
    pub kind: DocumentKind,
}

/// Checks that `path` names a supported document and returns its file name and kind.
///
/// # Errors
/// Returns [`UploadError::NoFileName`] or [`UploadError::Unsupported`].
pub fn validate(path: &Path) -> Result<(String, DocumentKind), UploadError> {
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| UploadError::NoFileName(path.to_path_buf()))?;
    let kind = DocumentKind::from_path(filename)
        .ok_or_else(|| UploadError::Unsupported(filename.to_owned()))?;
    Ok((filename.to_owned(), kind))
}

/// Validates `source` and copies it to `uploads_dir/<filename>`, replacing an older copy.
///
/// A source that already is the stored copy is left untouched.
///
/// # Errors
/// Fails on validation or I/O errors; nothing is copied if validation fails.
pub fn store(source: &Path, uploads_dir: &Path) -> Result<StoredUpload, UploadError> {
    let (filename, kind) = validate(source)?;
    let io_err = |source| UploadError::Io {
        filename: filename.clone(),
        source,
    };

    std::fs::create_dir_all(uploads_dir).map_err(io_err)?;
    let path = uploads_dir.join(&filename);
    if is_same_file(source, &path) {
        tracing::info!(file = %filename, path = %path.display(), "upload already stored");
    } else {
        std::fs::copy(source, &path).map_err(io_err)?;
        tracing::info!(file = %filename, path = %path.display(), "upload stored");
    }

    Ok(StoredUpload {
        filename,
        path,
        kind,
    })
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn accepts_pdf_and_txt_in_any_case() {
        assert_eq!(
            validate(Path::new("/tmp/Report.PDF")).unwrap(),
            ("Report.PDF".to_owned(), DocumentKind::Pdf)
        );
        assert_eq!(
            validate(Path::new("notes.txt")).unwrap().1,
            DocumentKind::Text
        );
    }

    #[test]
    fn rejects_other_formats() {
        assert!(matches!(
            validate(Path::new("slides.docx")),
            Err(UploadError::Unsupported(name)) if name == "slides.docx"
        ));
        assert!(matches!(validate(Path::new("README")), Err(UploadError::Unsupported(_))));
        assert!(matches!(validate(Path::new("/")), Err(UploadError::NoFileName(_))));
    }

    #[test]
    fn copies_into_uploads() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("handbook.txt");
        std::fs::write(&source, "refunds within 30 days").unwrap();
        let uploads = dir.path().join("data/uploads");

        let stored = store(&source, &uploads).unwrap();
        assert_eq!(stored.filename, "handbook.txt");
        assert_eq!(stored.path, uploads.join("handbook.txt"));
        assert_eq!(std::fs::read_to_string(&stored.path).unwrap(), "refunds within 30 days");

        std::fs::write(&source, "updated").unwrap();
        store(&source, &uploads).unwrap();
        assert_eq!(std::fs::read_to_string(&stored.path).unwrap(), "updated");
    }

    #[test]
    fn storing_existing_upload_keeps_content() {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        std::fs::create_dir_all(&uploads).unwrap();
        let stored_path = uploads.join("handbook.txt");
        std::fs::write(&stored_path, "refunds within 30 days").unwrap();

        let stored = store(&stored_path, &uploads).unwrap();
        assert_eq!(stored.path, stored_path);
        assert_eq!(
            std::fs::read_to_string(&stored_path).unwrap(),
            "refunds within 30 days"
        );

        let relative = uploads.join(".").join("handbook.txt");
        store(&relative, &uploads).unwrap();
        assert_eq!(
            std::fs::read_to_string(&stored_path).unwrap(),
            "refunds within 30 days"
        );
    }

    #[test]
    fn unsupported_upload_is_not_copied() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("image.png");
        std::fs::write(&source, [0u8; 4]).unwrap();
        let uploads = dir.path().join("uploads");

        assert!(store(&source, &uploads).is_err());
        assert!(!uploads.exists());
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = tempdir().unwrap();
        let err = store(&dir.path().join("gone.pdf"), &dir.path().join("uploads")).unwrap_err();
        assert!(matches!(err, UploadError::Io { filename, .. } if filename == "gone.pdf"));
    }
}
