pub mod aggregate;
pub mod handlers;
pub mod types;

pub use aggregate::*;
pub use handlers::*;
pub use types::*;
