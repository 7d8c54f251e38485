//! pluridesk-core: Shared infrastructure for the PluriDesk service.
pub mod error;
pub mod observability;

pub use axum;
pub use serde;
pub use serde_json;
pub use tracing;
pub use validator;
