//! Domain vocabulary
//!
//! Shared between store-server and its clients (via API).
//! Pure value types and pricing rules; persistence shapes live in the server.

pub mod order;
pub mod product;
pub mod stats;
pub mod testimonial;

// Re-exports
pub use order::*;
pub use product::*;
pub use stats::*;
pub use testimonial::*;
