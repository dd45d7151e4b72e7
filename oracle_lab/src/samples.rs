//! Sample plaintexts and a process-wide target to encrypt them under.

use base64::Engine;
use lazy_static::lazy_static;
use rand::Rng;

use crate::error::LabError;
use crate::target::CbcTarget;

lazy_static! {
    static ref SESSION_TARGET: CbcTarget = CbcTarget::random();
}

const POSSIBLE_TEXTS: [&str; 10] = [
    "MDAwMDAwTm93IHRoYXQgdGhlIHBhcnR5IGlzIGp1bXBpbmc=",
    "MDAwMDAxV2l0aCB0aGUgYmFzcyBraWNrZWQgaW4gYW5kIHRoZSBWZWdhJ3MgYXJlIHB1bXBpbic=",
    "MDAwMDAyUXVpY2sgdG8gdGhlIHBvaW50LCB0byB0aGUgcG9pbnQsIG5vIGZha2luZw==",
    "MDAwMDAzQ29va2luZyBNQydzIGxpa2UgYSBwb3VuZCBvZiBiYWNvbg==",
    "MDAwMDA0QnVybmluZyAnZW0sIGlmIHlvdSBhaW4ndCBxdWljayBhbmQgbmltYmxl",
    "MDAwMDA1SSBnbyBjcmF6eSB3aGVuIEkgaGVhciBhIGN5bWJhbA==",
    "MDAwMDA2QW5kIGEgaGlnaCBoYXQgd2l0aCBhIHNvdXBlZCB1cCB0ZW1wbw==",
    "MDAwMDA3SSdtIG9uIGEgcm9sbCwgaXQncyB0aW1lIHRvIGdvIHNvbG8=",
    "MDAwMDA4b2xsaW4nIGluIG15IGZpdmUgcG9pbnQgb2g=",
    "MDAwMDA5aXRoIG15IHJhZy10b3AgZG93biBzbyBteSBoYWlyIGNhbiBibG93",
];

pub const SAMPLE_COUNT: usize = POSSIBLE_TEXTS.len();

pub fn sample(index: usize) -> Result<Vec<u8>, LabError> {
    let encoded = POSSIBLE_TEXTS[index % SAMPLE_COUNT];
    Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
}

pub fn random_sample() -> Result<Vec<u8>, LabError> {
    sample(rand::thread_rng().gen_range(0..SAMPLE_COUNT))
}

/// The target every sample in this process is encrypted under. Only its
/// padding verdicts are meant to reach the attack.
pub fn session_target() -> &'static CbcTarget {
    &SESSION_TARGET
}

/// A ciphertext as handed to an attacker. Shown to the user in hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub ciphertext: Vec<u8>,
    pub iv: Vec<u8>,
}

impl Sample {
    pub fn ciphertext_hex(&self) -> String {
        hex::encode(&self.ciphertext)
    }

    pub fn iv_hex(&self) -> String {
        hex::encode(&self.iv)
    }
}

pub fn encrypt_sample(plaintext: &[u8]) -> Result<Sample, LabError> {
    let target = session_target();
    Ok(Sample {
        ciphertext: target.encrypt(plaintext)?,
        iv: target.iv().to_vec(),
    })
}
