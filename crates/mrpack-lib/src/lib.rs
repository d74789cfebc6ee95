pub mod error;
pub mod game;
pub mod utils;

pub use error::{ModpackError, Result};
