//! Storage abstractions for service layer
//!
//! The media store keeps uploaded objects on disk below one root; the HTTP
//! layer serves that root publicly.

pub mod media_store;

pub use media_store::MediaStore;
