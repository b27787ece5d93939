//! Password-to-key derivation and key reading
//!
//! The key derivation here is deliberately primitive and preserved for
//! container compatibility: the 32-byte key starts zero-filled and byte
//! `i % 32` is overwritten with byte `i` of the password, consuming every
//! password byte. There is no hashing, no salt, and no stretching, so the
//! effective key space is exactly the password space. Do not rely on this
//! scheme for real secrecy; it only decides which keystream a file gets.
//!
//! Key readers follow the same shape as passphrase reading in comparable
//! tools: a small trait with terminal, stream, and constant
//! implementations, all returning `Zeroizing` buffers so key material is
//! wiped when dropped.

use crate::aes::KEY_LEN;
use crate::error::{ErrorCategory, ErrorKind, Result, EncboxError};
use std::io::{self, IsTerminal, Read, Write};
use zeroize::Zeroizing;

/// Derives the 32-byte cipher key from a password by cyclic overwrite.
///
/// A password shorter than 32 bytes leaves the tail of the key zero; a
/// longer one wraps around and overwrites earlier positions. Empty
/// passwords are rejected by the [`KeyReader`] implementations rather
/// than here, so the derivation itself stays total.
pub fn derive_key(password: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    for (i, &byte) in password.iter().enumerate() {
        key[i % KEY_LEN] = byte;
    }
    key
}

/// Trait for reading the key password from various sources.
pub trait KeyReader {
    /// Read the key password as arbitrary bytes (not necessarily UTF-8).
    ///
    /// Returns the password wrapped in `Zeroizing` so it is securely
    /// wiped from memory when dropped. Implementations must reject empty
    /// passwords.
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>>;
}

fn reject_empty(password: Zeroizing<Vec<u8>>) -> Result<Zeroizing<Vec<u8>>> {
    if password.is_empty() {
        return Err(EncboxError::with_kind(
            ErrorCategory::User,
            ErrorKind::KeyUnavailable,
            "key must not be empty",
        ));
    }
    Ok(password)
}

/// Returns a fixed key password (for tests and `--key`).
pub struct ConstantKeyReader {
    password: Zeroizing<Vec<u8>>,
}

impl ConstantKeyReader {
    pub fn new(password: Vec<u8>) -> Self {
        Self {
            password: Zeroizing::new(password),
        }
    }
}

impl KeyReader for ConstantKeyReader {
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        reject_empty(Zeroizing::new((*self.password).clone()))
    }
}

/// Reads the key password from any `io::Read` source.
pub struct ReaderKeyReader {
    reader: Box<dyn Read>,
}

impl ReaderKeyReader {
    pub fn new(reader: Box<dyn Read>) -> Self {
        Self { reader }
    }
}

impl KeyReader for ReaderKeyReader {
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        let mut data = Zeroizing::new(Vec::new());
        self.reader.read_to_end(&mut data).map_err(|e| {
            EncboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("error reading key: {}", e),
                e,
            )
        })?;
        reject_empty(data)
    }
}

/// Reads the key password from the terminal with no echo.
pub struct TerminalKeyReader;

impl TerminalKeyReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalKeyReader {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyReader for TerminalKeyReader {
    /// Read the key from the terminal.
    ///
    /// Note: terminal input is limited to UTF-8 due to rpassword library
    /// constraints. For non-UTF-8 keys, use --key-stdin instead.
    fn read_key(&mut self) -> Result<Zeroizing<Vec<u8>>> {
        if !io::stdin().is_terminal() {
            return Err(EncboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::KeyUnavailable,
                "cannot read key from terminal - stdin is not a terminal",
            ));
        }

        io::stderr().write_all(b"Key (encbox): ").map_err(|e| {
            EncboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to write prompt: {}", e),
                e,
            )
        })?;
        io::stderr().flush().map_err(|e| {
            EncboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                format!("failed to flush prompt: {}", e),
                e,
            )
        })?;

        // Read without echo; rpassword returns String (UTF-8 only).
        let password = rpassword::read_password().map_err(|e| {
            EncboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::KeyUnavailable,
                format!("failure reading key: {}", e),
                e,
            )
        })?;

        reject_empty(Zeroizing::new(password.into_bytes()))
    }
}
