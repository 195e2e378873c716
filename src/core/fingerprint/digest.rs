//! Streaming SHA-256 content digests.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read buffer size; files are never loaded whole
const BUFFER_SIZE: usize = 64 * 1024;

/// Hash a file's bytes and return the lower-case hex digest
pub fn digest_file(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    digest_reader(file)
}

/// Hash everything `reader` yields
pub fn digest_reader<R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn digest_of_empty_input() {
        assert_eq!(digest_reader(io::empty()).unwrap(), EMPTY_SHA256);
    }

    #[test]
    fn digest_is_lower_case_hex() {
        let digest = digest_reader(&b"abc"[..]).unwrap();
        assert_eq!(digest, ABC_SHA256);
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn digest_spans_multiple_buffers() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("big.bin");
        let content = vec![7u8; BUFFER_SIZE * 3 + 17];
        File::create(&path).unwrap().write_all(&content).unwrap();

        let streamed = digest_file(&path).unwrap();
        let whole = format!("{:x}", Sha256::digest(&content));

        assert_eq!(streamed, whole);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(digest_file(Path::new("/nonexistent/file.mp4")).is_err());
    }
}
