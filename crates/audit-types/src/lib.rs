//! Core types and traits for the Audit Pro compliance dashboard.
//!
//! Request/response DTOs keep the French field names of the REST backend
//! (`titre`, `domaine`, `conformite`, ...) for JSON compatibility.

mod badge;
mod dto;
mod edit;
mod traits;

pub use badge::*;
pub use dto::*;
pub use edit::*;
pub use traits::*;
