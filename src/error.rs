use thiserror::Error;

/// Process exit codes, one per error family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Unknown = 1,
    Usage = 2,
    Aborted = 3,
    AlreadyInitialized = 5,
    NotInitialized = 6,
    NoName = 9,
    NotFound = 10,
    Decrypt = 11,
    Encrypt = 12,
    Config = 16,
    Io = 18,
}

#[derive(Error, Debug)]
pub enum Error {
    // Cryptographic errors
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed - incorrect master password or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // Vault errors
    #[error("Vault not found at path: {0}")]
    VaultNotFound(String),

    #[error("Vault already exists at path: {0}")]
    VaultAlreadyExists(String),

    #[error("Invalid secret file format")]
    InvalidFileFormat,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // Secret errors
    #[error("Secret not found: {0}")]
    SecretNotFound(String),

    #[error("Invalid secret name: {0}")]
    InvalidName(String),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    // Generation flow errors
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Aborted(String),

    #[error("{0}")]
    NoName(String),

    #[error("{message}")]
    Storage { name: String, message: String },

    #[error("{0}")]
    Generation(String),

    #[error("{0}")]
    Unknown(String),

    // Collaborator errors
    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Config error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] bincode::Error),

    // Argon2 errors
    #[error("Argon2 error: {0}")]
    Argon2Error(String),
}

impl Error {
    /// Shorthand for the usage error family.
    pub fn usage(message: impl Into<String>) -> Self {
        Error::Usage(message.into())
    }

    /// Wraps a store failure for `name` as an encryption/storage error.
    pub fn storage(name: &str, message: impl Into<String>) -> Self {
        Error::Storage {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::Usage(_) | Error::InvalidName(_) | Error::InvalidField { .. } => {
                ExitCode::Usage
            }
            Error::Aborted(_) => ExitCode::Aborted,
            Error::NoName(_) => ExitCode::NoName,
            Error::VaultAlreadyExists(_) => ExitCode::AlreadyInitialized,
            Error::VaultNotFound(_) => ExitCode::NotInitialized,
            Error::SecretNotFound(_) => ExitCode::NotFound,
            Error::DecryptionFailed | Error::InvalidFileFormat => ExitCode::Decrypt,
            Error::Storage { .. }
            | Error::EncryptionFailed
            | Error::KeyDerivationFailed(_)
            | Error::Argon2Error(_)
            | Error::SerializationError(_) => ExitCode::Encrypt,
            Error::Config(_) => ExitCode::Config,
            Error::IoError(_) | Error::ClipboardError(_) => ExitCode::Io,
            Error::Generation(_) | Error::Unknown(_) | Error::Template(_) => ExitCode::Unknown,
        }
    }
}

// Implement From for argon2::Error
impl From<argon2::Error> for Error {
    fn from(err: argon2::Error) -> Self {
        Error::Argon2Error(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::usage("bad").exit_code(), ExitCode::Usage);
        assert_eq!(Error::Aborted("no".into()).exit_code(), ExitCode::Aborted);
        assert_eq!(
            Error::storage("a/b", "failed").exit_code(),
            ExitCode::Encrypt
        );
        assert_eq!(ExitCode::NoName as u8, 9);
    }

    #[test]
    fn test_storage_message() {
        let err = Error::storage("web/a.example.com", "failed to create \"web/a.example.com\"");
        assert_eq!(err.to_string(), "failed to create \"web/a.example.com\"");
    }
}
