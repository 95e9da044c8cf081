use std::collections::BTreeMap;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::models::{SecretHistory, SecretRecord};
use crate::storage::{validate_name, within_depth, Store};

/// In-process store keeping every version of every secret
#[derive(Default)]
pub struct MemoryStore {
    secrets: BTreeMap<String, SecretHistory>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self, name: &str) -> Option<&SecretHistory> {
        self.secrets.get(name)
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl Store for MemoryStore {
    fn exists(&self, _ctx: &Context, name: &str) -> bool {
        self.secrets.contains_key(name)
    }

    fn get(&self, ctx: &Context, name: &str) -> Result<SecretRecord> {
        ctx.check_cancelled()?;
        self.secrets
            .get(name)
            .and_then(SecretHistory::latest)
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
        validate_name(name)?;
        self.secrets
            .entry(name.to_string())
            .or_default()
            .push(record, annotation);
        Ok(())
    }

    fn list(&self, ctx: &Context, max_depth: Option<usize>) -> Result<Vec<String>> {
        ctx.check_cancelled()?;
        Ok(self
            .secrets
            .keys()
            .filter(|name| within_depth(name, max_depth))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancellationToken;
    use crate::utils::SecureString;

    fn record(password: &str) -> SecretRecord {
        let mut record = SecretRecord::new();
        record.set_password(SecureString::from(password));
        record
    }

    #[test]
    fn test_set_get_versions() {
        let ctx = Context::default();
        let mut store = MemoryStore::new();

        assert!(!store.exists(&ctx, "web/a.com"));
        assert!(matches!(
            store.get(&ctx, "web/a.com"),
            Err(Error::SecretNotFound(_))
        ));

        store.set(&ctx, "web/a.com", record("one"), "first").unwrap();
        store.set(&ctx, "web/a.com", record("two"), "second").unwrap();

        assert!(store.exists(&ctx, "web/a.com"));
        assert_eq!(
            store.get(&ctx, "web/a.com").unwrap().password().as_bytes(),
            b"two"
        );
        assert_eq!(store.history("web/a.com").unwrap().len(), 2);
    }

    #[test]
    fn test_list_depth() {
        let ctx = Context::default();
        let mut store = MemoryStore::new();
        for name in ["top", "web/a.com", "web/shop/b.com"] {
            store.set(&ctx, name, record("x"), "init").unwrap();
        }

        assert_eq!(store.list(&ctx, None).unwrap().len(), 3);
        assert_eq!(store.list(&ctx, Some(0)).unwrap(), vec!["top"]);
        assert_eq!(store.list(&ctx, Some(1)).unwrap(), vec!["top", "web/a.com"]);
    }

    #[test]
    fn test_cancelled_calls_fail() {
        let token = CancellationToken::new();
        let ctx = Context::new(token.clone());
        let mut store = MemoryStore::new();
        token.cancel();

        assert!(store.set(&ctx, "a", record("x"), "init").is_err());
        assert!(store.list(&ctx, None).is_err());
        assert!(store.is_empty());
    }
}
