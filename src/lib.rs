//! encbox - password-based file encryption with a from-scratch AES-256
//! keystream cipher and a small self-describing container format.
//!
//! A container is a 16-byte little-endian header (magic number, plaintext
//! length, plaintext checksum) followed by a cipher body exactly as long
//! as the plaintext. The checksum detects corruption and wrong keys; it is
//! not a MAC and the format provides no authenticity.
//!
//! # Security caveats
//!
//! Two properties of the format are preserved, documented behavior and
//! make this tool unsuitable where real secrecy is required:
//!
//! - The container carries no nonce and the keystream counter always
//!   starts at zero, so the same key and plaintext produce byte-identical
//!   ciphertext, and files sharing a key and a plaintext prefix share a
//!   ciphertext prefix.
//! - The password-to-key derivation is a cyclic byte overwrite with no
//!   hashing, salting, or stretching.

#![forbid(unsafe_code)]

pub mod aes;
pub mod checksum;
pub mod container;
pub mod engine;
pub mod error;
pub mod file_ops;
pub mod passkey;
pub mod paths;
