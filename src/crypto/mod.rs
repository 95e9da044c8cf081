pub mod encryption;
pub mod generator;
pub mod key_derivation;

pub use encryption::{EncryptedData, Encryptor};
pub use generator::{Generators, RandomGenerators};
pub use key_derivation::KeyDerivation;
