pub mod hash;
pub mod sanitize;
