//! Persona CLI: configuration, logging and the `persona` commands.
//!
//! # Modules
//!
//! - [`cli`]: clap argument types
//! - [`config`]: [`PersonaConfig`] loading via `confyg`
//! - [`config_handlers`]: `persona config …` subcommands
//! - [`app`]: [`PersonaCli`] and command dispatch

#![doc = include_str!("../README.md")]

pub mod app;
pub mod cli;
pub mod config;
pub mod config_handlers;

pub use app::{PersonaCli, run};
pub use cli::{CliArgs, Command, ConfigAction, ConfigCommand};
pub use config::PersonaConfig;
