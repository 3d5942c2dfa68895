pub mod config;
pub mod error;
pub mod progress;
pub mod types;

pub use config::*;
pub use error::*;
pub use progress::*;
pub use types::*;
