//! Client order id generation.

use std::sync::Arc;

use rand::TryRngCore;
use rand::rngs::OsRng;

use super::IdError;
use crate::config::CLIENT_ORDER_SUFFIX_LEN;
use crate::domain::ClientOrderId;

/// Suffix alphabet: uppercase letters and digits.
const CHARSET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Largest multiple of the alphabet size that fits a byte. Bytes at or above it are discarded.
const ACCEPT_BELOW: u8 = (256 / CHARSET.len() * CHARSET.len()) as u8;

/// Entropy refills attempted before giving up.
const MAX_FILLS: usize = 8;

/// EntropySource supplies random bytes for identifiers.
pub trait EntropySource: Send + Sync {
    fn fill(&self, buf: &mut [u8]) -> Result<(), IdError>;
}

/// Operating system randomness.
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<(), IdError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| IdError::Entropy(e.to_string()))
    }
}

/// Produces `prefix + 7 random [A-Z0-9]` identifiers.
pub struct ClientOrderIdGenerator {
    prefix: String,
    entropy: Arc<dyn EntropySource>,
}

impl ClientOrderIdGenerator {
    /// Creates a generator backed by OS randomness.
    pub fn new(prefix: impl Into<String>) -> Result<Self, IdError> {
        Self::with_entropy(prefix, Arc::new(OsEntropy))
    }

    pub fn with_entropy(
        prefix: impl Into<String>,
        entropy: Arc<dyn EntropySource>,
    ) -> Result<Self, IdError> {
        let prefix = prefix.into();

        if !ClientOrderId::is_valid_charset(&prefix)
            || prefix.len() + CLIENT_ORDER_SUFFIX_LEN > ClientOrderId::MAX_LEN
        {
            return Err(IdError::InvalidPrefix(prefix));
        }

        Ok(Self { prefix, entropy })
    }

    /// Generates a fresh identifier.
    pub fn generate(&self) -> Result<ClientOrderId, IdError> {
        let mut id = String::with_capacity(self.prefix.len() + CLIENT_ORDER_SUFFIX_LEN);
        id.push_str(&self.prefix);

        let mut remaining = CLIENT_ORDER_SUFFIX_LEN;
        let mut buf = [0u8; 16];

        for _ in 0..MAX_FILLS {
            self.entropy.fill(&mut buf)?;

            for &byte in buf.iter().filter(|&&b| b < ACCEPT_BELOW) {
                id.push(CHARSET[byte as usize % CHARSET.len()] as char);
                remaining -= 1;
                if remaining == 0 {
                    return Ok(ClientOrderId::new(id));
                }
            }
        }

        Err(IdError::Entropy(
            "entropy source kept producing out-of-range bytes".into(),
        ))
    }
}
