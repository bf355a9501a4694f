//! Content digests used to disambiguate file names.

use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Matches the layout produced by earlier imports.
    #[default]
    Sha1,
    Blake3,
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(HashAlgorithm::Sha1),
            "blake3" => Ok(HashAlgorithm::Blake3),
            other => Err(format!("unknown hash algorithm: {other}")),
        }
    }
}

impl HashAlgorithm {
    /// Lower-case hex digest of the whole file.
    pub fn hex_digest(self, path: &Path) -> std::io::Result<String> {
        match self {
            HashAlgorithm::Sha1 => {
                let mut hasher = Sha1::new();
                stream(path, |chunk| hasher.update(chunk))?;
                Ok(format!("{:x}", hasher.finalize()))
            }
            HashAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                stream(path, |chunk| {
                    hasher.update(chunk);
                })?;
                Ok(hasher.finalize().to_hex().to_string())
            }
        }
    }
}

fn stream(path: &Path, mut update: impl FnMut(&[u8])) -> std::io::Result<()> {
    let mut file = fs::File::open(path)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        update(&buf[..n]);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_matches_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.bin");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            HashAlgorithm::Sha1.hex_digest(&path).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn blake3_streams_large_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        let data: Vec<u8> = (0..50_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();
        assert_eq!(
            HashAlgorithm::Blake3.hex_digest(&path).unwrap(),
            blake3::hash(&data).to_hex().to_string()
        );
    }

    #[test]
    fn parses_names() {
        assert_eq!("SHA1".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha1));
        assert_eq!("blake3".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Blake3));
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }

    #[test]
    fn missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(HashAlgorithm::Sha1.hex_digest(&dir.path().join("nope")).is_err());
    }
}
