//! Checks run once, before any converter is attempted.
//!
//! Failures here are not part of the fallback policy: they abort the
//! conversion immediately.

use std::fs::{self, File};
use std::path::Path;

use tempfile::NamedTempFile;
use webpconv_common::{Error, Result, SourceFormat};

/// Validate the source and make sure the destination folder exists.
///
/// - the source must be a readable file with a jpg, jpeg or png extension
/// - the destination must not be the source or an existing directory
/// - the destination's parent directory is created when missing and must
///   accept new files
pub fn prepare_destination(source: &Path, destination: &Path) -> Result<()> {
    if SourceFormat::from_path(source).is_none() {
        return Err(Error::invalid_input(format!(
            "unsupported source type (expected jpg, jpeg or png): {}",
            source.display()
        )));
    }

    let meta = fs::metadata(source).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            Error::invalid_input(format!("source file does not exist: {}", source.display()))
        }
        _ => Error::Io(e),
    })?;
    if !meta.is_file() {
        return Err(Error::invalid_input(format!(
            "source is not a file: {}",
            source.display()
        )));
    }
    File::open(source)?;

    if destination == source {
        return Err(Error::invalid_input("destination must differ from the source"));
    }
    if destination.is_dir() {
        return Err(Error::invalid_input(format!(
            "destination is a directory: {}",
            destination.display()
        )));
    }

    let folder = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if !folder.exists() {
        fs::create_dir_all(folder)?;
        tracing::debug!(folder = %folder.display(), "created destination folder");
    } else if !folder.is_dir() {
        return Err(Error::invalid_input(format!(
            "destination folder is not a directory: {}",
            folder.display()
        )));
    }

    // Mode bits miss ACLs and read-only mounts, so create a real file.
    if let Err(e) = NamedTempFile::new_in(folder) {
        return Err(Error::invalid_input(format!(
            "destination folder is not writable: {} ({e})",
            folder.display()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn creates_missing_destination_folder() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"jpeg").unwrap();
        let destination = dir.path().join("nested/deeper/a.webp");

        prepare_destination(&source, &destination).unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
    }

    #[test]
    fn missing_source_is_invalid_input() {
        let dir = tempdir().unwrap();
        let err = prepare_destination(&dir.path().join("a.png"), &dir.path().join("a.webp"))
            .unwrap_err();
        assert_matches!(err, Error::InvalidInput(_));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn unsupported_extension_is_invalid_input() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.gif");
        fs::write(&source, b"gif").unwrap();
        assert_matches!(
            prepare_destination(&source, &dir.path().join("a.webp")),
            Err(Error::InvalidInput(_))
        );
    }

    #[test]
    fn destination_equal_to_source_is_rejected() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.png");
        fs::write(&source, b"png").unwrap();
        assert_matches!(
            prepare_destination(&source, &source),
            Err(Error::InvalidInput(_))
        );
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_destination_folder_is_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let source = dir.path().join("a.jpg");
        fs::write(&source, b"jpeg").unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        // Privileged users write regardless of mode bits.
        let writable = fs::write(locked.join("check"), b"").is_ok();

        let result = prepare_destination(&source, &locked.join("a.webp"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        if writable {
            assert!(result.is_ok());
        } else {
            let err = result.unwrap_err();
            assert_matches!(err, Error::InvalidInput(_));
            assert!(err.to_string().contains("not writable"));
        }
    }

    #[test]
    fn writability_check_leaves_no_files() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.png");
        fs::write(&source, b"png").unwrap();
        let out = dir.path().join("out");

        prepare_destination(&source, &out.join("a.webp")).unwrap();
        assert_eq!(fs::read_dir(&out).unwrap().count(), 0);
    }

    #[test]
    fn destination_directory_is_rejected() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("a.png");
        fs::write(&source, b"png").unwrap();
        assert_matches!(
            prepare_destination(&source, dir.path()),
            Err(Error::InvalidInput(_))
        );
    }
}
