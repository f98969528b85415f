//! Rendering for Persona.
//!
//! - [`richtext`]: styled fragments to [`Inline`] nodes and HTML
//! - [`page`]: the profile, loader and error views

#![doc = include_str!("../README.md")]

pub mod page;
pub mod richtext;

pub use page::{SiteMeta, link_target, render_error, render_loading, render_profile, render_state};
pub use richtext::{Inline, format_fragment, format_rich_text, render_inlines, rich_text_html};
