//! Stream cipher driver
//!
//! Drives the AES-256 block transform in counter mode across an input of
//! known total length, in bounded chunks of [`CHUNK_SIZE`] bytes. Each
//! 16-byte unit of the stream is XORed with the encryption of a 128-bit
//! big-endian counter block; the final partial unit takes only the leading
//! keystream bytes, so no padding is ever required and the plaintext
//! length is preserved exactly.
//!
//! The counter starts at zero for every pass and the container carries no
//! nonce, so encrypting the same plaintext under the same key twice yields
//! byte-identical ciphertext - including identical prefixes across files
//! sharing a key and a plaintext prefix. This determinism is preserved
//! container-format behavior, not an accident; see the crate docs.
//!
//! The checksum is always computed over the plaintext side of the XOR,
//! whichever direction the pass runs, so the value stored at encryption
//! time and the value recomputed at decryption time are directly
//! comparable.

use crate::aes::{self, RoundKeys, BLOCK_LEN, KEY_LEN};
use crate::checksum::Checksum;
use crate::error::{ErrorCategory, ErrorKind, Result, EncboxError};
use std::io::{Read, Write};

/// I/O chunk size for one read/transform/write step; a multiple of the
/// cipher block size, so only the final chunk of a pass can end on a
/// partial block.
pub const CHUNK_SIZE: usize = 4096;

/// Which side of the XOR carries the plaintext.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Encrypt,
    Decrypt,
}

/// Keystream generator: one block-encrypt of the counter per 16-byte unit,
/// advancing the counter by exactly one per unit including the final
/// partial one.
struct Keystream<'a> {
    keys: &'a RoundKeys,
    counter: u128,
}

impl<'a> Keystream<'a> {
    fn new(keys: &'a RoundKeys) -> Self {
        Self { keys, counter: 0 }
    }

    /// XORs the next `data.len()` keystream bytes into `data`.
    ///
    /// All calls but the last in a pass must cover whole 16-byte units;
    /// the driver guarantees that by chunking in multiples of the block
    /// size. A trailing partial unit discards the unused keystream tail.
    fn xor_into(&mut self, data: &mut [u8]) {
        for unit in data.chunks_mut(BLOCK_LEN) {
            let mut block = self.counter.to_be_bytes();
            aes::encrypt_block(&mut block, self.keys);
            self.counter = self.counter.wrapping_add(1);
            for (byte, key_byte) in unit.iter_mut().zip(block.iter()) {
                *byte ^= key_byte;
            }
        }
    }
}

/// Encrypts exactly `length` bytes from `input` into `output`.
///
/// Returns the number of bytes written and the plaintext checksum, to be
/// stored in the container header by the caller.
pub fn encrypt_stream(
    input: &mut impl Read,
    output: &mut impl Write,
    length: u64,
    key: &[u8; KEY_LEN],
) -> Result<(u64, u32)> {
    process(Direction::Encrypt, input, output, length, key)
}

/// Decrypts exactly `length` cipher-body bytes from `input` into `output`.
///
/// Returns the number of bytes written and the recomputed plaintext
/// checksum; the caller compares it against the stored one. No
/// cryptographic failure is possible mid-stream - corruption and
/// wrong-key detection are deferred entirely to that comparison.
pub fn decrypt_stream(
    input: &mut impl Read,
    output: &mut impl Write,
    length: u64,
    key: &[u8; KEY_LEN],
) -> Result<(u64, u32)> {
    process(Direction::Decrypt, input, output, length, key)
}

fn process(
    direction: Direction,
    input: &mut impl Read,
    output: &mut impl Write,
    length: u64,
    key: &[u8; KEY_LEN],
) -> Result<(u64, u32)> {
    let keys = RoundKeys::expand(key);
    let mut keystream = Keystream::new(&keys);
    let mut checksum = Checksum::new();

    let mut buf = [0u8; CHUNK_SIZE];
    let mut remaining = length;

    while remaining > 0 {
        let want = remaining.min(CHUNK_SIZE as u64) as usize;
        let chunk = &mut buf[..want];

        input.read_exact(chunk).map_err(|e| read_error(e, length))?;

        if direction == Direction::Encrypt {
            checksum.absorb(chunk);
        }
        keystream.xor_into(chunk);
        if direction == Direction::Decrypt {
            checksum.absorb(chunk);
        }

        output.write_all(chunk).map_err(|e| {
            EncboxError::with_kind_and_source(
                ErrorCategory::Internal,
                ErrorKind::Io,
                "failed to write cipher stream",
                e,
            )
        })?;

        remaining -= want as u64;
    }

    Ok((length, checksum.finalize()))
}

fn read_error(err: std::io::Error, length: u64) -> EncboxError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        EncboxError::with_kind_and_source(
            ErrorCategory::User,
            ErrorKind::Length,
            format!("input ended before the declared length of {} bytes", length),
            err,
        )
    } else {
        EncboxError::with_kind_and_source(
            ErrorCategory::Internal,
            ErrorKind::Io,
            "failed to read cipher stream",
            err,
        )
    }
}
