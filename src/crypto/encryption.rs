use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::utils::MasterKey;

/// Nonce and ciphertext of one sealed secret
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EncryptedData {
    /// 96-bit (12-byte) nonce for AES-GCM
    pub nonce: [u8; 12],
    /// Ciphertext including 128-bit authentication tag
    pub ciphertext: Vec<u8>,
}

/// AES-256-GCM sealing bound to the secret name.
///
/// The secret name is passed as associated data, so a file copied or renamed
/// to another path inside the vault no longer decrypts.
pub struct Encryptor {
    cipher: Aes256Gcm,
}

impl Encryptor {
    pub fn new(key: &MasterKey) -> Self {
        let cipher = Aes256Gcm::new(key.as_bytes().into());
        Self { cipher }
    }

    /// Encrypt `plaintext` for secret `name` with a fresh random nonce.
    pub fn seal(&self, name: &str, plaintext: &[u8]) -> Result<EncryptedData> {
        let mut nonce_bytes = [0u8; 12];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad: name.as_bytes(),
                },
            )
            .map_err(|_| Error::EncryptionFailed)?;

        Ok(EncryptedData {
            nonce: nonce_bytes,
            ciphertext,
        })
    }

    /// Decrypt data sealed for secret `name`. Fails on a wrong key, a
    /// tampered ciphertext or a name mismatch.
    pub fn open(&self, name: &str, encrypted: &EncryptedData) -> Result<Vec<u8>> {
        let nonce = Nonce::from_slice(&encrypted.nonce);

        self.cipher
            .decrypt(
                nonce,
                Payload {
                    msg: encrypted.ciphertext.as_ref(),
                    aad: name.as_bytes(),
                },
            )
            .map_err(|_| Error::DecryptionFailed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> MasterKey {
        MasterKey::new([0u8; 32])
    }

    #[test]
    fn test_seal_open() {
        let encryptor = Encryptor::new(&test_key());

        let sealed = encryptor.seal("web/example.com", b"history").unwrap();
        let opened = encryptor.open("web/example.com", &sealed).unwrap();

        assert_eq!(opened, b"history");
    }

    #[test]
    fn test_name_is_bound() {
        let encryptor = Encryptor::new(&test_key());

        let sealed = encryptor.seal("web/example.com", b"history").unwrap();
        assert!(matches!(
            encryptor.open("web/other.com", &sealed),
            Err(Error::DecryptionFailed)
        ));
    }

    #[test]
    fn test_authentication_failure() {
        let encryptor = Encryptor::new(&test_key());

        let mut sealed = encryptor.seal("a", b"test").unwrap();
        sealed.ciphertext[0] ^= 1;

        assert!(encryptor.open("a", &sealed).is_err());
    }

    #[test]
    fn test_wrong_key() {
        let sealed = Encryptor::new(&MasterKey::new([0u8; 32]))
            .seal("a", b"test")
            .unwrap();

        assert!(Encryptor::new(&MasterKey::new([1u8; 32]))
            .open("a", &sealed)
            .is_err());
    }
}
