//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod auth;
pub mod catalog;
pub mod directory;
pub mod comments;
pub mod users;
pub mod pagination;
pub mod rate_limit;
pub mod storage;
#[cfg(test)]
pub mod test_support;
