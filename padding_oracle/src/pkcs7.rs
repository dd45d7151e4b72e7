use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaddingError {
    #[error("block size {0} does not fit in one padding byte")]
    BlockSize(usize),

    #[error("no content")]
    Empty,

    #[error("declared padding length {0} is out of range")]
    BadLength(u8),

    #[error("padding bytes are inconsistent")]
    Inconsistent,
}

/// Pads `input` to a multiple of `block_size`. A full block of padding is
/// appended when the input is already aligned.
pub fn pad(input: &[u8], block_size: usize) -> Result<Vec<u8>, PaddingError> {
    if !(1..=255).contains(&block_size) {
        return Err(PaddingError::BlockSize(block_size));
    }
    let padding_len = block_size - input.len() % block_size;

    let mut padded = Vec::with_capacity(input.len() + padding_len);
    padded.extend_from_slice(input);
    padded.resize(input.len() + padding_len, padding_len as u8);
    Ok(padded)
}

/// Returns `input` without its trailing padding, or the reason the padding is
/// malformed. The last byte is the declared length and must lie in
/// `[1, block_size]`.
pub fn strip(input: &[u8], block_size: usize) -> Result<&[u8], PaddingError> {
    let padding_len = match input.last() {
        None => return Err(PaddingError::Empty),
        Some(&x) => x,
    };
    let n = padding_len as usize;
    if n == 0 || n > block_size || n > input.len() {
        return Err(PaddingError::BadLength(padding_len));
    }

    let (content, padding) = input.split_at(input.len() - n);
    if padding.iter().any(|&b| b != padding_len) {
        return Err(PaddingError::Inconsistent);
    }
    Ok(content)
}

/// Convenience check for oracle implementations.
pub fn is_valid(input: &[u8], block_size: usize) -> bool {
    strip(input, block_size).is_ok()
}
