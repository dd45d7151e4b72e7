//! A keyed, invertible byte transform standing in for a block cipher so the
//! engine can be tested without one. It has no cryptographic value.

use crate::oracle::{predicate, PaddingOracle};
use crate::pkcs7;

pub(crate) struct ToyCbc {
    key: Vec<u8>,
}

impl ToyCbc {
    pub(crate) fn new(key: &[u8]) -> Self {
        ToyCbc { key: key.to_vec() }
    }

    pub(crate) fn block_size(&self) -> usize {
        self.key.len()
    }

    fn encrypt_block(&self, block: &[u8]) -> Vec<u8> {
        block
            .iter()
            .zip(&self.key)
            .map(|(b, k)| (b ^ k).rotate_left(3))
            .collect()
    }

    pub(crate) fn decrypt_block(&self, block: &[u8]) -> Vec<u8> {
        block
            .iter()
            .zip(&self.key)
            .map(|(b, k)| b.rotate_right(3) ^ k)
            .collect()
    }

    /// PKCS#7 pads then CBC-encrypts.
    pub(crate) fn encrypt(&self, iv: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let mut previous = iv.to_vec();
        let mut out = Vec::new();
        for block in pkcs7::pad(plaintext, self.block_size()).unwrap().chunks(self.block_size()) {
            let mixed: Vec<u8> = block.iter().zip(&previous).map(|(a, b)| a ^ b).collect();
            previous = self.encrypt_block(&mixed);
            out.extend_from_slice(&previous);
        }
        out
    }

    /// Answers whether the last block of `prev || curr` is correctly padded.
    pub(crate) fn oracle(&self) -> impl PaddingOracle + '_ {
        predicate(move |candidate: &[u8]| {
            let (prev, curr) = candidate.split_at(self.block_size());
            let plain: Vec<u8> = self
                .decrypt_block(curr)
                .iter()
                .zip(prev)
                .map(|(a, b)| a ^ b)
                .collect();
            pkcs7::is_valid(&plain, self.block_size())
        })
    }
}

#[test]
fn test_toy_round_trip() {
    let toy = ToyCbc::new(b"YELLOW SUBMARINE");
    let iv = [7u8; 16];
    let ciphertext = toy.encrypt(&iv, b"hello");
    assert_eq!(ciphertext.len(), 16);

    let plain: Vec<u8> = toy
        .decrypt_block(&ciphertext)
        .iter()
        .zip(&iv)
        .map(|(a, b)| a ^ b)
        .collect();
    assert_eq!(pkcs7::strip(&plain, 16), Ok(&b"hello"[..]));
}
