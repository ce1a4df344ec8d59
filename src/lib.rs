//! Auto-organizer for downloaded TV episodes and movies
//!
//! Files dropped into watch folders are parsed, matched against the media
//! library (or a remote metadata provider), named with configurable patterns
//! and moved or copied into place. Every attempt is logged so failures can be
//! corrected and replayed.

pub mod config;
pub mod db;
pub mod error;
pub mod services;

pub use error::{OrganizeError, Result};
