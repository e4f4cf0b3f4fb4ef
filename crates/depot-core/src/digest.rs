use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

/// `sha256:<hex>` of a file's contents, streamed.
pub(crate) fn sha256_file(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut chunk = vec![0_u8; 64 * 1024];

    loop {
        match reader.read(&mut chunk)? {
            0 => break,
            n => hasher.update(&chunk[..n]),
        }
    }

    Ok(format!("sha256:{}", hex::encode(hasher.finalize())))
}
