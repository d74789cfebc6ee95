pub mod types;
pub mod parser;
pub mod overrides;
pub mod info;

pub use types::*;
pub use parser::*;
pub use overrides::*;
pub use info::*;
