use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::EncryptedData;
use crate::error::{Error, Result};
use crate::models::secret::SecretRecord;

/// On-disk envelope of a single encrypted secret
#[derive(Serialize, Deserialize)]
pub struct SecretFile {
    /// File format version for future compatibility
    pub version: u32,
    /// Salt for Argon2 key derivation (256 bits)
    pub salt: [u8; 32],
    /// Encrypted history (contains nonce + ciphertext + auth tag)
    pub encrypted_data: EncryptedData,
}

impl SecretFile {
    pub const CURRENT_VERSION: u32 = 1;
    pub const MAGIC_BYTES: &'static [u8; 4] = b"GSEC";
    const HEADER_LEN: usize = 56;

    pub fn new(salt: [u8; 32], encrypted_data: EncryptedData) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            salt,
            encrypted_data,
        }
    }

    /// Binary format:
    /// [0-3]   Magic bytes: "GSEC"
    /// [4-7]   Version: u32 (little-endian)
    /// [8-39]  Salt: 32 bytes
    /// [40-51] Nonce: 12 bytes
    /// [52-55] Ciphertext length: u32 (little-endian)
    /// [56-n]  Ciphertext + 16-byte auth tag
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let ct_len = u32::try_from(self.encrypted_data.ciphertext.len())
            .map_err(|_| Error::InvalidFileFormat)?;

        let mut bytes = Vec::with_capacity(Self::HEADER_LEN + ct_len as usize);
        bytes.extend_from_slice(Self::MAGIC_BYTES);
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.encrypted_data.nonce);
        bytes.extend_from_slice(&ct_len.to_le_bytes());
        bytes.extend_from_slice(&self.encrypted_data.ciphertext);

        Ok(bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::HEADER_LEN {
            return Err(Error::InvalidFileFormat);
        }

        if &bytes[0..4] != Self::MAGIC_BYTES {
            return Err(Error::InvalidFileFormat);
        }

        let version = u32::from_le_bytes(
            bytes[4..8]
                .try_into()
                .map_err(|_| Error::InvalidFileFormat)?,
        );
        if version != Self::CURRENT_VERSION {
            return Err(Error::InvalidFileFormat);
        }

        let salt: [u8; 32] = bytes[8..40]
            .try_into()
            .map_err(|_| Error::InvalidFileFormat)?;

        let nonce: [u8; 12] = bytes[40..52]
            .try_into()
            .map_err(|_| Error::InvalidFileFormat)?;

        let ct_len = u32::from_le_bytes(
            bytes[52..56]
                .try_into()
                .map_err(|_| Error::InvalidFileFormat)?,
        ) as usize;

        if bytes.len() < Self::HEADER_LEN + ct_len {
            return Err(Error::InvalidFileFormat);
        }

        let ciphertext = bytes[Self::HEADER_LEN..Self::HEADER_LEN + ct_len].to_vec();

        Ok(Self {
            version,
            salt,
            encrypted_data: EncryptedData { nonce, ciphertext },
        })
    }
}

/// All stored versions of one secret, oldest first
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SecretHistory {
    pub revisions: Vec<Revision>,
}

/// One version of a secret together with the reason it was written
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Revision {
    pub record: SecretRecord,
    pub annotation: String,
    pub created_at: DateTime<Utc>,
}

impl SecretHistory {
    pub fn latest(&self) -> Option<&SecretRecord> {
        self.revisions.last().map(|r| &r.record)
    }

    pub fn latest_annotation(&self) -> Option<&str> {
        self.revisions.last().map(|r| r.annotation.as_str())
    }

    pub fn push(&mut self, record: SecretRecord, annotation: &str) {
        self.revisions.push(Revision {
            record,
            annotation: annotation.to_string(),
            created_at: Utc::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::SecureString;

    #[test]
    fn test_secret_file_layout() {
        let salt = [42u8; 32];
        let encrypted_data = EncryptedData {
            nonce: [1u8; 12],
            ciphertext: vec![1, 2, 3, 4, 5],
        };

        let bytes = SecretFile::new(salt, encrypted_data).to_bytes().unwrap();
        assert_eq!(&bytes[0..4], b"GSEC");
        assert_eq!(bytes.len(), 56 + 5);

        let parsed = SecretFile::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.version, SecretFile::CURRENT_VERSION);
        assert_eq!(parsed.salt, salt);
        assert_eq!(parsed.encrypted_data.ciphertext, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_truncated_file_rejected() {
        let bytes = SecretFile::new(
            [0u8; 32],
            EncryptedData {
                nonce: [0u8; 12],
                ciphertext: vec![9; 10],
            },
        )
        .to_bytes()
        .unwrap();

        assert!(SecretFile::from_bytes(&bytes[..60]).is_err());
        assert!(SecretFile::from_bytes(b"PWDB").is_err());
    }

    #[test]
    fn test_history_latest() {
        let mut history = SecretHistory::default();
        assert!(history.latest().is_none());

        let mut first = SecretRecord::new();
        first.set_password(SecureString::from("one"));
        let mut second = SecretRecord::new();
        second.set_password(SecureString::from("two"));

        history.push(first, "Generated Password");
        history.push(second, "Generated password for YAML key");

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().password().as_bytes(), b"two");
        assert_eq!(history.revisions[0].annotation, "Generated Password");
    }
}
