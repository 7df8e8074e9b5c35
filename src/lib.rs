//! Blocksmith: Project Scaffolding from Versioned Block Templates
//!
//! Fetches a versioned collection of file templates ("blocks") from a remote
//! git source and materializes a parameterized copy of a chosen block into a
//! target directory, substituting a caller-supplied data model into both
//! file names and file contents.
//!
//! The core is the template rendering engine: [`pattern`] resolves glob
//! patterns against a template base, [`tree`] builds the compiled Node
//! collection, [`engine`] caches it for cheap re-rendering against new
//! models, and [`output`] materializes a rendered snapshot with
//! parent-before-child ordering.

pub mod block;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod pattern;
pub mod sync;
pub mod template;
pub mod tree;

pub use engine::{render, RenderConfig, TemplateEngine};
pub use error::RenderError;
