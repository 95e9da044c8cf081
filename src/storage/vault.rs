use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::RngCore;
use tempfile::NamedTempFile;

use crate::context::Context;
use crate::crypto::{Encryptor, KeyDerivation};
use crate::error::{Error, Result};
use crate::models::{SecretFile, SecretHistory, SecretRecord};
use crate::storage::{validate_name, within_depth, Store};
use crate::utils::SecureString;

const SECRET_EXTENSION: &str = "gsv";
const MARKER_FILE: &str = ".gensecret-vault";
const MARKER_NAME: &str = ".vault";
const MARKER_PLAINTEXT: &[u8] = b"gensecret vault v1";

/// Directory of encrypted secrets, one `<name>.gsv` file per secret.
///
/// Names and the directory tree are visible on disk so that `exists` and
/// `list` work without the master password; every file content is sealed
/// with a key derived from the master password and a per-file salt.
pub struct VaultStore {
    root: PathBuf,
    master_password: SecureString,
    kdf: KeyDerivation,
}

impl VaultStore {
    pub fn new<P: AsRef<Path>>(root: P, master_password: SecureString) -> Result<Self> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            master_password,
            kdf: KeyDerivation::new()?,
        })
    }

    /// Use different Argon2 cost parameters
    pub fn with_kdf(mut self, kdf: KeyDerivation) -> Self {
        self.kdf = kdf;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.root.join(MARKER_FILE).exists()
    }

    /// Create the vault directory and its password verifier.
    ///
    /// Returns an error if the vault already exists.
    pub fn init(&self) -> Result<()> {
        if self.is_initialized() {
            return Err(Error::VaultAlreadyExists(self.root.display().to_string()));
        }

        fs::create_dir_all(&self.root)?;
        self.write_sealed(&self.root.join(MARKER_FILE), MARKER_NAME, MARKER_PLAINTEXT)?;
        tracing::info!(root = %self.root.display(), "initialized vault");

        Ok(())
    }

    /// Check that the vault exists and the master password opens it.
    pub fn unlock(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(Error::VaultNotFound(self.root.display().to_string()));
        }

        let plaintext = self.read_sealed(&self.root.join(MARKER_FILE), MARKER_NAME)?;
        if plaintext != MARKER_PLAINTEXT {
            return Err(Error::DecryptionFailed);
        }
        Ok(())
    }

    /// Every stored version of `name`
    pub fn history(&self, ctx: &Context, name: &str) -> Result<SecretHistory> {
        ctx.check_cancelled()?;
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(Error::SecretNotFound(name.to_string()));
        }

        let plaintext = self.read_sealed(&path, name)?;
        Ok(bincode::deserialize(&plaintext)?)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(format!("{}.{}", name, SECRET_EXTENSION)))
    }

    fn read_sealed(&self, path: &Path, name: &str) -> Result<Vec<u8>> {
        let bytes = fs::read(path)?;
        let file = SecretFile::from_bytes(&bytes)?;

        let key = self
            .kdf
            .derive_key(self.master_password.as_bytes(), &file.salt)?;
        Encryptor::new(&key).open(name, &file.encrypted_data)
    }

    /// Seal `plaintext` under a fresh salt and atomically replace `path`.
    fn write_sealed(&self, path: &Path, name: &str, plaintext: &[u8]) -> Result<()> {
        let mut salt = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut salt);

        let key = self.kdf.derive_key(self.master_password.as_bytes(), &salt)?;
        let encrypted_data = Encryptor::new(&key).seal(name, plaintext)?;
        let bytes = SecretFile::new(salt, encrypted_data).to_bytes()?;

        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;

        // Set file permissions to 0600 (user read/write only) on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))?;
        }

        tmp.persist(path).map_err(|e| Error::IoError(e.error))?;
        Ok(())
    }

    fn collect_names(&self, dir: &Path, prefix: &str, names: &mut Vec<String>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let file_name = match file_name.to_str() {
                Some(n) if !n.starts_with('.') => n.to_string(),
                _ => continue,
            };

            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                let sub_prefix = format!("{}{}/", prefix, file_name);
                self.collect_names(&entry.path(), &sub_prefix, names)?;
            } else if let Some(stem) = file_name.strip_suffix(&format!(".{}", SECRET_EXTENSION)) {
                names.push(format!("{}{}", prefix, stem));
            }
        }
        Ok(())
    }
}

impl Store for VaultStore {
    fn exists(&self, _ctx: &Context, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_file()).unwrap_or(false)
    }

    fn get(&self, ctx: &Context, name: &str) -> Result<SecretRecord> {
        self.history(ctx, name)?
            .latest()
            .cloned()
            .ok_or_else(|| Error::SecretNotFound(name.to_string()))
    }

    fn set(
        &mut self,
        ctx: &Context,
        name: &str,
        record: SecretRecord,
        annotation: &str,
    ) -> Result<()> {
        ctx.check_cancelled()?;
        let path = self.path_for(name)?;

        let mut history = if path.exists() {
            match self.history(ctx, name) {
                Ok(history) => history,
                Err(e) => {
                    tracing::warn!(secret = name, error = %e, "unreadable history, starting anew");
                    SecretHistory::default()
                }
            }
        } else {
            SecretHistory::default()
        };
        history.push(record, annotation);

        let plaintext = bincode::serialize(&history)?;
        self.write_sealed(&path, name, &plaintext)?;

        tracing::debug!(secret = name, revisions = history.len(), annotation, "stored secret");
        Ok(())
    }

    fn list(&self, ctx: &Context, max_depth: Option<usize>) -> Result<Vec<String>> {
        ctx.check_cancelled()?;
        if !self.is_initialized() {
            return Err(Error::VaultNotFound(self.root.display().to_string()));
        }

        let mut names = Vec::new();
        self.collect_names(&self.root, "", &mut names)?;
        names.retain(|name| within_depth(name, max_depth));
        names.sort();
        Ok(names)
    }
}
