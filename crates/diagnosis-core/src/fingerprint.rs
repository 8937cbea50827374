//! Content fingerprints for loaded artifacts, logged at startup so an operator
//! can tell which fitted model a running server is using.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of a file as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    let data = std::fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let hash = Sha256::digest(&data);
    Ok(format!("{:x}", hash))
}
