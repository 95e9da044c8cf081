pub mod memory;
pub mod vault;

pub use memory::MemoryStore;
pub use vault::VaultStore;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::models::SecretRecord;

/// Versioned secret store addressed by hierarchical names (`dir/sub/leaf`)
pub trait Store {
    fn exists(&self, ctx: &Context, name: &str) -> bool;

    /// Latest version of `name`
    fn get(&self, ctx: &Context, name: &str) -> Result<SecretRecord>;

    /// Write a new version of `name`, recording why it changed
    fn set(
        &mut self,
        ctx: &Context,
        name: &str,
        record: SecretRecord,
        annotation: &str,
    ) -> Result<()>;

    /// Names at most `max_depth` directories deep, sorted; `None` lists all
    fn list(&self, ctx: &Context, max_depth: Option<usize>) -> Result<Vec<String>>;
}

/// Reject names that are empty, absolute or contain `.`/`..` or empty segments.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidName("name must not be empty".to_string()));
    }
    if name.contains('\\') || name.contains('\0') {
        return Err(Error::InvalidName(name.to_string()));
    }
    if name
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

fn within_depth(name: &str, max_depth: Option<usize>) -> bool {
    match max_depth {
        Some(depth) => name.matches('/').count() <= depth,
        None => true,
    }
}
