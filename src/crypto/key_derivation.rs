use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::Result;
use crate::utils::MasterKey;

/// Argon2id derivation of per-file keys from the vault master password
#[derive(Clone)]
pub struct KeyDerivation {
    params: Params,
}

impl KeyDerivation {
    /// OWASP 2023 parameters: 19 MiB memory, 2 iterations, parallelism 1.
    pub fn new() -> Result<Self> {
        Self::with_cost(19456, 2, 1)
    }

    /// Custom cost parameters (memory in KiB). Output is always 256 bits.
    pub fn with_cost(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, Some(32))?;
        Ok(Self { params })
    }

    pub fn derive_key(&self, password: &[u8], salt: &[u8; 32]) -> Result<MasterKey> {
        let mut key = [0u8; 32];

        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
            .hash_password_into(password, salt, &mut key)?;

        Ok(MasterKey::new(key))
    }
}
