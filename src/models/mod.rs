pub mod secret;
pub mod secret_file;

pub use secret::{parse_like, parse_structured, FlatSecret, SecretRecord, StructuredSecret, PASSWORD_KEY};
pub use secret_file::{Revision, SecretFile, SecretHistory};
