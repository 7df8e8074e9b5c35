//! Template compilation.
//!
//! Two grammars share one contract: `compile(raw)` produces a reusable
//! compiled template whose `render(model)` is a pure function of the data
//! model — deterministic and free of I/O. Names use a deliberately narrow
//! bracket grammar; file contents use the full tag grammar with
//! interpolation, conditionals and loops.

pub mod content;
pub mod name;

pub use content::ContentTemplate;
pub use name::NameTemplate;
