pub mod config;
pub mod error;
pub mod error_utils;
pub mod traits;
pub mod types;

#[cfg(feature = "test-support")]
pub mod testing;

pub use config::*;
pub use error::*;
pub use error_utils::*;
pub use traits::*;
pub use types::*;
