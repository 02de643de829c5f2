pub mod format;
pub mod hash;
