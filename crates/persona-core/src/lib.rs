//! Persona Core: profile data model, content sources, and errors.
//!
//! This crate has no internal Persona dependencies. Everything else in the
//! workspace builds on the types defined here.
//!
//! # Modules
//!
//! - [`error`]: [`FetchError`], the general [`Error`] and `Result` alias
//! - [`profile`]: [`ProfileInfo`] and styled text fragments
//! - [`source`]: the [`ContentSource`] trait with HTTP, retrying and mock sources
//! - [`props`]: server-side pre-render fetch

#![doc = include_str!("../README.md")]

pub mod error;
pub mod profile;
pub mod props;
pub mod source;

// Re-export key types at crate root for convenience
pub use error::{Error, FetchError, Result};
pub use profile::{Annotations, Links, ProfileInfo, RichText, StyledTextFragment};
pub use props::{PageProps, fetch_profile, static_props};
pub use source::ContentSource;
