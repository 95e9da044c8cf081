pub mod clipboard;
pub mod secure_string;

pub use secure_string::{MasterKey, SecureString};
