//! File encryption/decryption operations
//!
//! High-level operations tying the container codec and the stream engine
//! to real files: open handles, frame the container, run the cipher pass,
//! and verify integrity. Output files are created with mode 0o600
//! (read/write for owner only) on Unix systems.
//!
//! No rollback is performed on failure: a partially written output file is
//! left as-is for the caller to report and clean up.

use crate::container::Header;
use crate::engine;
use crate::error::{ErrorCategory, ErrorKind, Result, EncboxError};
use crate::passkey::{self, KeyReader};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Outcome of a completed cipher pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassSummary {
    /// Plaintext length in bytes.
    pub length: u64,
    /// Rolling checksum of the plaintext.
    pub checksum: u32,
}

/// Encrypt a file with a key password.
///
/// Reads plaintext from `input_path`, encrypts it using a key from
/// `key_reader`, and writes an encbox container to `output_path`. The
/// header is written as an all-zero placeholder first and rewritten in
/// place once the pass has produced the length and checksum.
pub fn encrypt_file(
    input_path: &Path,
    output_path: &Path,
    key_reader: &mut dyn KeyReader,
) -> Result<PassSummary> {
    let mut input = File::open(input_path).map_err(|e| read_error(input_path, e))?;
    let length = input
        .metadata()
        .map_err(|e| read_error(input_path, e))?
        .len();

    let password = key_reader.read_key()?;
    let key = passkey::derive_key(&password);

    let mut output = create_output(output_path)?;
    Header::write_placeholder(&mut output)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    let (written, checksum) = engine::encrypt_stream(&mut input, &mut output, length, &key)
        .map_err(|e| e.with_context("encryption failed"))?;

    Header { length, checksum }
        .finalize(&mut output)
        .map_err(|e| e.with_context(format!("failed to write to {}", output_path.display())))?;

    Ok(PassSummary {
        length: written,
        checksum,
    })
}

/// Decrypt a file with a key password.
///
/// Reads an encbox container from `input_path`, validates the header
/// before any cipher work, decrypts the body using a key from
/// `key_reader`, and writes the plaintext to `output_path`.
///
/// A checksum mismatch (wrong key, or corrupted/tampered ciphertext) is
/// only detectable after the full pass, so the incorrect plaintext has
/// already been written to `output_path` when the `Integrity` error is
/// returned; the caller decides whether to delete it.
pub fn decrypt_file(
    input_path: &Path,
    output_path: &Path,
    key_reader: &mut dyn KeyReader,
) -> Result<PassSummary> {
    let mut input = File::open(input_path).map_err(|e| read_error(input_path, e))?;
    let header = Header::read(&mut input)
        .map_err(|e| e.with_context(format!("failed to read header of {}", input_path.display())))?;

    let password = key_reader.read_key()?;
    let key = passkey::derive_key(&password);

    let mut output = create_output(output_path)?;
    let (written, checksum) = engine::decrypt_stream(&mut input, &mut output, header.length, &key)
        .map_err(|e| e.with_context("decryption failed"))?;

    reject_trailing_data(&mut input)?;

    if checksum != header.checksum {
        return Err(EncboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::Integrity,
            "checksum mismatch: wrong key, or corrupted/tampered input",
        ));
    }

    Ok(PassSummary {
        length: written,
        checksum,
    })
}

/// Fails when bytes remain after the declared cipher body.
fn reject_trailing_data(input: &mut impl Read) -> Result<()> {
    let mut probe = [0u8; 1];
    match input.read(&mut probe) {
        Ok(0) => Ok(()),
        Ok(_) => Err(EncboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::TrailingData,
            "invalid input: unexpected data after cipher body",
        )),
        Err(e) => Err(EncboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to probe for trailing data",
            e,
        )),
    }
}

/// Create the output file with secure permissions (0o600 on Unix).
fn create_output(path: &Path) -> Result<File> {
    #[cfg(unix)]
    {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .map_err(|e| {
                EncboxError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })
    }

    #[cfg(not(unix))]
    {
        use std::fs::OpenOptions;

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| {
                EncboxError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Io,
                    format!("failed to open {}", path.display()),
                    e,
                )
            })
    }
}

fn read_error(path: &Path, err: io::Error) -> EncboxError {
    let category = if err.kind() == io::ErrorKind::NotFound {
        ErrorCategory::User
    } else {
        ErrorCategory::Internal
    };
    EncboxError::with_kind_and_source(
        category,
        ErrorKind::Io,
        format!("failed to read from {}", path.display()),
        err,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passkey::ConstantKeyReader;
    use std::fs;
    use tempfile::TempDir;

    #[cfg(unix)]
    use std::os::unix::fs::PermissionsExt;

    fn reader(key: &[u8]) -> ConstantKeyReader {
        ConstantKeyReader::new(key.to_vec())
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.enc");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        let plaintext = b"Hello, encbox!";
        fs::write(&plain_path, plaintext).unwrap();

        let summary = encrypt_file(&plain_path, &crypt_path, &mut reader(b"test key")).unwrap();
        assert_eq!(summary.length, plaintext.len() as u64);
        assert_eq!(
            fs::metadata(&crypt_path).unwrap().len(),
            16 + plaintext.len() as u64
        );

        let summary2 = decrypt_file(&crypt_path, &decrypted_path, &mut reader(b"test key")).unwrap();
        assert_eq!(summary2, summary);
        assert_eq!(fs::read(&decrypted_path).unwrap(), plaintext);
    }

    #[test]
    fn test_decrypt_wrong_key_reports_integrity() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.enc");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&plain_path, b"secret contents").unwrap();
        encrypt_file(&plain_path, &crypt_path, &mut reader(b"correct")).unwrap();

        let err = decrypt_file(&crypt_path, &decrypted_path, &mut reader(b"wrong"))
            .expect_err("expected integrity failure");
        assert_eq!(err.kind, Some(ErrorKind::Integrity));
        // The (incorrect) plaintext was still written before the error.
        assert!(decrypted_path.exists());
        assert_eq!(
            fs::metadata(&decrypted_path).unwrap().len(),
            b"secret contents".len() as u64
        );
    }

    #[test]
    fn test_decrypt_corrupted_body_reports_integrity() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.enc");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&plain_path, vec![0x77u8; 300]).unwrap();
        encrypt_file(&plain_path, &crypt_path, &mut reader(b"key")).unwrap();

        let mut container = fs::read(&crypt_path).unwrap();
        container[16 + 120] ^= 0x01;
        fs::write(&crypt_path, &container).unwrap();

        let err = decrypt_file(&crypt_path, &decrypted_path, &mut reader(b"key"))
            .expect_err("expected integrity failure");
        assert_eq!(err.kind, Some(ErrorKind::Integrity));
    }

    #[test]
    fn test_decrypt_rejects_unrecognized_input() {
        let temp_dir = TempDir::new().unwrap();
        let not_container = temp_dir.path().join("junk.enc");
        let decrypted_path = temp_dir.path().join("junk");

        fs::write(&not_container, b"this is not an encbox container at all").unwrap();

        let err = decrypt_file(&not_container, &decrypted_path, &mut reader(b"key"))
            .expect_err("expected format failure");
        assert_eq!(err.kind, Some(ErrorKind::Format));
        // Rejected before any cipher work: no output file was created.
        assert!(!decrypted_path.exists());
    }

    #[test]
    fn test_decrypt_rejects_truncated_header() {
        let temp_dir = TempDir::new().unwrap();
        let short = temp_dir.path().join("short.enc");
        let decrypted_path = temp_dir.path().join("short");

        fs::write(&short, &[0xBEu8; 10]).unwrap();

        let err = decrypt_file(&short, &decrypted_path, &mut reader(b"key"))
            .expect_err("expected truncation failure");
        assert_eq!(err.kind, Some(ErrorKind::Truncated));
    }

    #[test]
    fn test_decrypt_rejects_truncated_body() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.enc");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&plain_path, vec![0x55u8; 100]).unwrap();
        encrypt_file(&plain_path, &crypt_path, &mut reader(b"key")).unwrap();

        let container = fs::read(&crypt_path).unwrap();
        fs::write(&crypt_path, &container[..container.len() - 10]).unwrap();

        let err = decrypt_file(&crypt_path, &decrypted_path, &mut reader(b"key"))
            .expect_err("expected length failure");
        assert_eq!(err.kind, Some(ErrorKind::Length));
    }

    #[test]
    fn test_decrypt_rejects_trailing_data() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.enc");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&plain_path, b"payload").unwrap();
        encrypt_file(&plain_path, &crypt_path, &mut reader(b"key")).unwrap();

        let mut container = fs::read(&crypt_path).unwrap();
        container.push(0xFF);
        fs::write(&crypt_path, &container).unwrap();

        let err = decrypt_file(&crypt_path, &decrypted_path, &mut reader(b"key"))
            .expect_err("expected trailing-data failure");
        assert_eq!(err.kind, Some(ErrorKind::TrailingData));
    }

    #[test]
    fn test_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("empty.txt");
        let crypt_path = temp_dir.path().join("empty.txt.enc");
        let decrypted_path = temp_dir.path().join("decrypted.txt");

        fs::write(&plain_path, b"").unwrap();

        let summary = encrypt_file(&plain_path, &crypt_path, &mut reader(b"key")).unwrap();
        assert_eq!(summary.length, 0);
        assert_eq!(fs::metadata(&crypt_path).unwrap().len(), 16);

        decrypt_file(&crypt_path, &decrypted_path, &mut reader(b"key")).unwrap();
        assert_eq!(fs::read(&decrypted_path).unwrap(), b"");
    }

    #[test]
    #[cfg(unix)]
    fn test_file_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let plain_path = temp_dir.path().join("plain.txt");
        let crypt_path = temp_dir.path().join("plain.txt.enc");

        fs::write(&plain_path, b"test").unwrap();
        encrypt_file(&plain_path, &crypt_path, &mut reader(b"key")).unwrap();

        let permissions = fs::metadata(&crypt_path).unwrap().permissions();
        assert_eq!(permissions.mode() & 0o777, 0o600);
    }

    #[test]
    fn test_encrypt_nonexistent_input_is_user_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.txt");
        let crypt_path = temp_dir.path().join("missing.txt.enc");

        let err = encrypt_file(&missing, &crypt_path, &mut reader(b"key"))
            .expect_err("expected read failure");
        assert_eq!(err.kind, Some(ErrorKind::Io));
        assert_eq!(err.category, ErrorCategory::User);
    }
}
