//! Container header codec
//!
//! Every encrypted file starts with a fixed 16-byte little-endian header:
//!
//! - magic number: 4 bytes, `0xBEBEBEBE`
//! - plaintext length: 8 bytes
//! - plaintext checksum: 4 bytes
//!
//! The cipher body follows immediately and is exactly as long as the
//! plaintext (no padding). The header carries no nonce or salt; see the
//! crate docs for the determinism consequence.
//!
//! Encoding writes an all-zero placeholder first so the body offset is
//! stable, then seeks back and rewrites the header once the length and
//! checksum are known. The sink must therefore support seeking to the
//! start once; [`Header::finalize`] states that capability requirement.

use crate::error::{ErrorCategory, ErrorKind, Result, EncboxError};
use std::io::{Read, Seek, SeekFrom, Write};

/// Magic number identifying an encbox container.
pub const MAGIC: u32 = 0xBEBE_BEBE;

/// Encoded header size in bytes.
pub const HEADER_LEN: usize = 16;

/// The decoded container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Exact plaintext length in bytes.
    pub length: u64,
    /// Rolling checksum of the plaintext.
    pub checksum: u32,
}

impl Header {
    /// Serializes the header into its fixed little-endian layout.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[0..4].copy_from_slice(&MAGIC.to_le_bytes());
        bytes[4..12].copy_from_slice(&self.length.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.checksum.to_le_bytes());
        bytes
    }

    /// Deserializes a header, validating the magic number.
    pub fn decode(bytes: &[u8; HEADER_LEN]) -> Result<Self> {
        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != MAGIC {
            return Err(EncboxError::with_kind(
                ErrorCategory::User,
                ErrorKind::Format,
                "input unrecognized as an encbox container",
            ));
        }
        let length = u64::from_le_bytes([
            bytes[4], bytes[5], bytes[6], bytes[7], bytes[8], bytes[9], bytes[10], bytes[11],
        ]);
        let checksum = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
        Ok(Self { length, checksum })
    }

    /// Reads and decodes a header from the start of `input`.
    ///
    /// Fails with a `Truncated` kind if fewer than 16 bytes are available
    /// and with a `Format` kind on a magic mismatch, in both cases before
    /// any cipher work happens.
    pub fn read(input: &mut impl Read) -> Result<Self> {
        let mut bytes = [0u8; HEADER_LEN];
        input.read_exact(&mut bytes).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                EncboxError::with_kind_and_source(
                    ErrorCategory::User,
                    ErrorKind::Truncated,
                    "input ended before the container header could be read",
                    e,
                )
            } else {
                EncboxError::with_kind_and_source(
                    ErrorCategory::Internal,
                    ErrorKind::Io,
                    "failed to read container header",
                    e,
                )
            }
        })?;
        Self::decode(&bytes)
    }

    /// Writes an all-zero placeholder header so the body offset is stable
    /// before the length and checksum are known.
    pub fn write_placeholder(output: &mut impl Write) -> Result<()> {
        output.write_all(&[0u8; HEADER_LEN]).map_err(|e| {
            EncboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to write placeholder header",
                e,
            )
        })
    }

    /// Seeks back to the start of `output` and replaces the placeholder
    /// with the finalized header.
    ///
    /// The sink must support seeking to its start once; a plain `File`
    /// does. For non-seekable sinks the caller has to buffer the body or
    /// know length and checksum up front.
    pub fn finalize(&self, output: &mut (impl Write + Seek)) -> Result<()> {
        output.seek(SeekFrom::Start(0)).map_err(|e| {
            EncboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to seek to container start",
                e,
            )
        })?;
        output.write_all(&self.encode()).map_err(|e| {
            EncboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to rewrite container header",
                e,
            )
        })
    }
}
