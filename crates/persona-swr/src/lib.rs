//! Stale-while-revalidate loading for Persona.
//!
//! - [`cache`]: [`SwrCache`], a keyed cache holding `{data, error, last_updated}`
//!   with one in-flight read per key
//! - [`state`]: [`PageState`] and [`PageView`], the page-level state machine

#![doc = include_str!("../README.md")]

pub mod cache;
pub mod state;

pub use cache::{LoadOptions, LoadResult, SwrCache};
pub use state::{PageState, PageView};
