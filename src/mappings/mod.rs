pub mod key_name_to_keysym;

pub use key_name_to_keysym::KeyNameToKeysym;
