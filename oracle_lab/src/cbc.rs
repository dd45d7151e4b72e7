//! AES-128-CBC helpers on top of OpenSSL.

use openssl::error::ErrorStack;
use openssl::symm::{encrypt as openssl_encrypt, Cipher, Crypter, Mode};

pub const BLOCK_SIZE: usize = 16;

/// Encrypts with PKCS#7 padding.
pub fn encrypt(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>, ErrorStack> {
    openssl_encrypt(Cipher::aes_128_cbc(), key, Some(iv), plaintext)
}

/// Decrypts without touching the padding, so callers can inspect it.
pub fn decrypt_raw(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>, ErrorStack> {
    let cipher = Cipher::aes_128_cbc();
    let mut crypter = Crypter::new(cipher, Mode::Decrypt, key, Some(iv))?;
    crypter.pad(false);

    let mut output = vec![0; ciphertext.len() + cipher.block_size()];
    let mut count = crypter.update(ciphertext, &mut output)?;
    count += crypter.finalize(&mut output[count..])?;
    output.truncate(count);
    Ok(output)
}
