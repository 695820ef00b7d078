//! A CSL processor that formats citations and bibliography entries.
//!
//! A [`Processor`] is created from a CSL style and a [`LocaleFetcher`] that
//! supplies locale XML on demand. It then formats CSL-JSON references one
//! at a time:
//!
//! ```
//! use citeberg::{OutputFormat, PredefinedLocales, Processor};
//!
//! let style = r#"<style version="1.0" class="note">
//!     <citation><layout><text variable="title" font-style="italic"/></layout></citation>
//! </style>"#;
//!
//! let mut processor =
//!     Processor::new(style.as_bytes(), PredefinedLocales::new(), OutputFormat::Html)?;
//! let output = processor.format_one(br#"{"id": "item", "type": "book", "title": "Title"}"#)?;
//! assert_eq!(output.as_str(), "<i>Title</i>");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod locale;
pub mod output;
pub mod reference;
pub mod render;
pub mod resolver;
pub mod style;
pub mod taxonomy;

mod error;
mod processor;
mod util;
mod xml;

pub use error::{LocaleError, LocaleFetchError, RefError, StyleError};
pub use locale::{Locale, LocaleCode};
pub use output::{Fragment, OutputFormat};
pub use processor::{FormattedOutput, Processor, ProcessorOptions};
pub use reference::Reference;
pub use resolver::{LocaleFetcher, LocaleResolver, PredefinedLocales};
pub use style::StyleDocument;
