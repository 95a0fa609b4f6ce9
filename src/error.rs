use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("secret cannot be empty")]
    EmptySecret,
    #[error("secret must be a valid base32 string (A-Z, 2-7)")]
    InvalidSecret,
    #[error("digits must be 6 or 8, got {0}")]
    InvalidDigits(u8),
    #[error("period must be a positive number, got {0}")]
    InvalidPeriod(u32),
    #[error("algorithm must be SHA1, SHA256, or SHA512, got {0}")]
    InvalidAlgorithm(String),
    #[error("unknown encryption type: {0} (use WPA, WEP, or nopass)")]
    InvalidEncryption(String),
    #[error("invalid error correction level: {0} (use L, M, Q, or H)")]
    InvalidLevel(String),
    #[error("no content provided")]
    EmptyContent,
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
    #[error("failed to generate QR code: {0}")]
    Qr(#[from] qrcode::types::QrError),
    #[error("failed to encode image: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("otp error: {0}")]
    Totp(String),
    #[error("config error: {0}")]
    Config(String),
}
