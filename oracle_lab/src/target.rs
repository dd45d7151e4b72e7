//! A local AES-128-CBC service that leaks padding validity.

use std::thread;
use std::time::Duration;

use padding_oracle::{pkcs7, OracleError, PaddingOracle};
use rand::Rng;

use crate::cbc::{self, BLOCK_SIZE};
use crate::error::LabError;

#[derive(Debug, Clone)]
pub struct CbcTarget {
    key: [u8; BLOCK_SIZE],
    iv: [u8; BLOCK_SIZE],
    delay: Duration,
}

impl CbcTarget {
    pub fn new(key: [u8; BLOCK_SIZE], iv: [u8; BLOCK_SIZE]) -> Self {
        CbcTarget {
            key,
            iv,
            delay: Duration::ZERO,
        }
    }

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::new(rng.gen(), rng.gen())
    }

    /// Sleep this long on every query to imitate a network round trip.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn iv(&self) -> &[u8; BLOCK_SIZE] {
        &self.iv
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, LabError> {
        Ok(cbc::encrypt(plaintext, &self.key, &self.iv)?)
    }

    /// Whether `ciphertext` decrypts to correctly padded plaintext.
    pub fn padding_is_valid(&self, ciphertext: &[u8]) -> Result<bool, LabError> {
        let plain = cbc::decrypt_raw(ciphertext, &self.key, &self.iv)?;
        Ok(pkcs7::is_valid(&plain, BLOCK_SIZE))
    }
}

impl PaddingOracle for CbcTarget {
    fn query(&self, candidate: &[u8]) -> Result<bool, OracleError> {
        if candidate.len() != 2 * BLOCK_SIZE {
            return Err(OracleError::Rejected {
                expected: 2 * BLOCK_SIZE,
                actual: candidate.len(),
            });
        }
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        self.padding_is_valid(candidate)
            .map_err(|e| OracleError::transport(e.to_string()))
    }
}
