//! Content hashing for content-addressed destination names.

use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Digest algorithm used in content-hash naming mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
    Sha512,
    Md5,
    Blake3,
}

impl HashAlgorithm {
    /// Parse an algorithm identifier (case-insensitive, dashes ignored).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "").as_str() {
            "sha1" => Some(Self::Sha1),
            "sha256" => Some(Self::Sha256),
            "sha512" => Some(Self::Sha512),
            "md5" => Some(Self::Md5),
            "blake3" => Some(Self::Blake3),
            _ => None,
        }
    }
}

/// Running digest state for one of the supported algorithms.
enum DigestState {
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
    Md5(md5::Context),
    Blake3(Box<blake3::Hasher>),
}

impl DigestState {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            HashAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => Self::Sha512(Sha512::new()),
            HashAlgorithm::Md5 => Self::Md5(md5::Context::new()),
            HashAlgorithm::Blake3 => Self::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha1(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
            Self::Md5(c) => c.consume(data),
            Self::Blake3(h) => {
                h.update(data);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Self::Sha1(h) => format!("{:x}", h.finalize()),
            Self::Sha256(h) => format!("{:x}", h.finalize()),
            Self::Sha512(h) => format!("{:x}", h.finalize()),
            Self::Md5(c) => format!("{:x}", c.compute()),
            Self::Blake3(h) => h.finalize().to_hex().to_string(),
        }
    }
}

/// Computes hex digests of file contents.
pub struct Hasher;

impl Hasher {
    /// Hash a file's contents with the given algorithm.
    ///
    /// Streams the file in 64KB chunks so large sources are never held in
    /// memory at once.
    pub fn content_hash(path: &Path, algorithm: HashAlgorithm) -> std::io::Result<String> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut state = DigestState::new(algorithm);

        let mut buffer = [0u8; 65536];
        loop {
            let bytes_read = reader.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            state.update(&buffer[..bytes_read]);
        }

        Ok(state.finalize_hex())
    }

    /// Hash an in-memory byte buffer.
    pub fn content_hash_from_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
        let mut state = DigestState::new(algorithm);
        state.update(data);
        state.finalize_hex()
    }
}
