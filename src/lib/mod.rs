//! Env file loading library.
//!
//! This library parses `.env` text into a key/value mapping and merges it
//! into an environment-like destination under configurable override rules.
//! It's designed for seeding configuration at process startup from one or
//! more dotenv files.
//!
//! # Features
//!
//! - **Tolerant parsing**: malformed lines are skipped, never fatal
//! - **Three quote styles**: single-, double-, and backtick-quoted values,
//!   including values spanning multiple lines
//! - **Predictable overrides**: existing variables are kept unless
//!   overriding is requested
//! - **Optional tracing**: detailed logging when the `tracing` feature is
//!   enabled
//!
//! # Example
//!
//! ```rust,no_run
//! use env_seed::load::{EnvLoad, EnvLoadOptions};
//! use std::path::PathBuf;
//!
//! let options = EnvLoadOptions {
//!   paths: vec![PathBuf::from(".env")],
//!   override_existing: false,
//! };
//!
//! // SAFETY: no other thread touches the process environment here.
//! let result = unsafe { EnvLoad::load_with_options(options) }.unwrap();
//! println!("loaded {} keys", result.parsed.len());
//! ```

pub mod env;
pub mod load;
pub mod merge;
pub mod parse;
