use padding_oracle::AttackError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabError {
    #[error("openssl error: {0}")]
    Openssl(#[from] openssl::error::ErrorStack),

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("attack error: {0}")]
    Attack(#[from] AttackError),

    #[error("logging setup failed: {0}")]
    Logging(String),
}
