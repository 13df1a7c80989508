//! `docsmith_core` is the library behind the [docsmith](https://github.com/openzipkin/docsmith)
//! documentation tooling. It extracts marker-delimited sections from source
//! files into reStructuredText documents, reads the project release from a
//! build file, and generates a static HTML site from markdown pages.
//!
//! ## Processing Pipeline
//!
//! ```text
//! .rst document
//!   → Directive parser (finds `.. includecode::` calls and their options)
//!   → Include (reads the file, scans section markers, filters, de-indents)
//!   → Renderer (replaces each call with a literal block or a warning)
//!
//! markdown page
//!   → Fetcher (local file or remote download into a temporary file)
//!   → Markdown renderer (builtin or external command)
//!   → Site generator (header + body + footer → <page>.html)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `docsmith.toml`.
//! - [`directive`]: Include directive parsing, document expansion and link
//!   shortcuts.
//! - [`site`]: Static site generation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docsmith_core::ExpandSettings;
//! use docsmith_core::IncludeOptions;
//! use docsmith_core::IncludeOutcome;
//! use docsmith_core::Dependencies;
//! use docsmith_core::include_file;
//! use std::path::Path;
//!
//! let mut dependencies = Dependencies::default();
//! let options = IncludeOptions::default();
//! match include_file(Path::new("docs"), "../src/Span.java#builder", &options, &mut dependencies) {
//!     IncludeOutcome::Block(block) => println!("{}", block.text),
//!     IncludeOutcome::Warning(warning) => eprintln!("{}", warning.message),
//! }
//!
//! let settings = ExpandSettings::default();
//! let expansion = docsmith_core::expand_document(
//!     Path::new("docs/index.rst"),
//!     ".. includecode:: ../src/Span.java#builder\n",
//!     &settings,
//! );
//! println!("{}", expansion.content);
//! ```

pub use config::*;
pub use directive::*;
pub use encoding::*;
pub use error::*;
pub use include::*;
pub use site::*;
pub use version::*;

pub mod config;
pub mod directive;
mod encoding;
#[allow(unused_assignments)]
mod error;
mod include;
pub mod site;
mod version;
