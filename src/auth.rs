use sha2::{Digest, Sha256};

/// Checks admin passwords against a configured SHA-256 digest.
#[derive(Clone)]
pub struct AccessGate {
    password_hash: Option<String>,
}

impl AccessGate {
    pub fn new(password_hash: Option<String>) -> Self {
        Self {
            password_hash: password_hash
                .map(|hash| hash.trim().to_ascii_lowercase())
                .filter(|hash| !hash.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.password_hash.is_some()
    }

    /// True when `candidate` hashes to the configured digest. Always false
    /// if no digest was configured.
    pub fn authenticate(&self, candidate: &str) -> bool {
        match &self.password_hash {
            Some(expected) => sha256_hex(candidate.as_bytes()) == *expected,
            None => false,
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
