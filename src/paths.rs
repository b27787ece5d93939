//! Output path synthesis
//!
//! Pure functions over explicit arguments; no process-wide state.
//! Encryption writes `<outdir>/<filename>.enc`; decryption requires a
//! `*.enc` input and strips the extension.

use crate::error::{ErrorCategory, Result, EncboxError};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to encrypted file names.
pub const ENCRYPTED_EXTENSION: &str = "enc";

fn file_name(path: &Path) -> Result<&std::ffi::OsStr> {
    path.file_name().ok_or_else(|| {
        EncboxError::new(
            ErrorCategory::User,
            format!("input path {} has no file name", path.display()),
        )
    })
}

/// Returns `<out_dir>/<input file name>.enc`.
pub fn encrypt_output_path(input: &Path, out_dir: &Path) -> Result<PathBuf> {
    let mut name = OsString::from(file_name(input)?);
    name.push(".");
    name.push(ENCRYPTED_EXTENSION);
    Ok(out_dir.join(name))
}

/// Returns `<out_dir>/<input file name without .enc>`.
///
/// Fails when the input file name does not end in `.enc`, or when
/// stripping the extension would leave nothing.
pub fn decrypt_output_path(input: &Path, out_dir: &Path) -> Result<PathBuf> {
    let name = file_name(input)?;
    let stripped = Path::new(name)
        .file_stem()
        .filter(|_| Path::new(name).extension().is_some_and(|e| e == ENCRYPTED_EXTENSION))
        .ok_or_else(|| {
            EncboxError::new(
                ErrorCategory::User,
                format!(
                    "input file name {:?} does not end in .{}",
                    name, ENCRYPTED_EXTENSION
                ),
            )
        })?;
    Ok(out_dir.join(stripped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_path_appends_extension() {
        let path = encrypt_output_path(Path::new("/some/dir/report.txt"), Path::new("/out")).unwrap();
        assert_eq!(path, PathBuf::from("/out/report.txt.enc"));
    }

    #[test]
    fn test_encrypt_path_uses_file_name_only() {
        let path = encrypt_output_path(Path::new("deep/nested/data.bin"), Path::new("elsewhere")).unwrap();
        assert_eq!(path, PathBuf::from("elsewhere/data.bin.enc"));
    }

    #[test]
    fn test_encrypt_path_rejects_bare_directory() {
        assert!(encrypt_output_path(Path::new("/"), Path::new("/out")).is_err());
    }

    #[test]
    fn test_decrypt_path_strips_extension() {
        let path = decrypt_output_path(Path::new("/in/report.txt.enc"), Path::new("/out")).unwrap();
        assert_eq!(path, PathBuf::from("/out/report.txt"));
    }

    #[test]
    fn test_decrypt_path_requires_enc_extension() {
        let err = decrypt_output_path(Path::new("/in/report.txt"), Path::new("/out"))
            .expect_err("expected extension rejection");
        assert_eq!(err.category, ErrorCategory::User);
    }

    #[test]
    fn test_decrypt_path_rejects_extension_only_name() {
        assert!(decrypt_output_path(Path::new("/in/.enc"), Path::new("/out")).is_err());
    }
}
