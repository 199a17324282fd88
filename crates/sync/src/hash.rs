//! Content hashing for installed command files.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Computes SHA-256 of `data` and returns the hex-encoded digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Computes SHA-256 of an entire file and returns the hex-encoded digest.
pub fn file_checksum(path: &Path) -> Result<String, std::io::Error> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_bytes_deterministic() {
        let c1 = checksum_bytes(b"echo hello");
        let c2 = checksum_bytes(b"echo hello");
        assert_eq!(c1, c2);
        assert_eq!(c1.len(), 64); // SHA-256 = 64 hex chars.
    }

    #[test]
    fn checksum_bytes_different_data() {
        assert_ne!(checksum_bytes(b"echo a"), checksum_bytes(b"echo b"));
    }

    #[test]
    fn file_checksum_matches_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("cmd.sh");
        std::fs::write(&path, b"#!/bin/sh\necho hi\n").unwrap();

        let file_cs = file_checksum(&path).unwrap();
        let mem_cs = checksum_bytes(b"#!/bin/sh\necho hi\n");
        assert_eq!(file_cs, mem_cs);
    }

    #[test]
    fn file_checksum_missing_file_errors() {
        assert!(file_checksum(Path::new("/nonexistent/cmd.sh")).is_err());
    }
}
