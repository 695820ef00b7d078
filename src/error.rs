//! Error types of the processor.

use thiserror::Error;

use crate::locale::LocaleCode;
use crate::xml::XmlError;

/// Errors that occur while loading a style. All of them are fatal to
/// constructing a [`Processor`](crate::Processor).
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum StyleError {
    /// The document is not a well-formed CSL style.
    #[error("malformed style: {0}")]
    Malformed(String),

    /// A `<text macro="...">` names a macro that is not defined.
    #[error("macro '{name}' is not defined")]
    UnresolvedMacro {
        /// Name of the missing macro.
        name: String,
    },

    /// Macros call each other in a cycle.
    #[error("circular macro reference: {}", chain.join(" -> "))]
    CircularMacro {
        /// Macro names along the cycle, starting and ending with the same one.
        chain: Vec<String>,
    },

    /// The style uses a construct this processor does not support.
    #[error("unsupported style feature: {0}")]
    UnsupportedFeature(String),
}

impl From<XmlError> for StyleError {
    fn from(err: XmlError) -> Self {
        Self::Malformed(err.0)
    }
}

/// An error that occurred while reading a reference. It fails that one call
/// and leaves the processor usable.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RefError {
    /// The CSL-JSON input is not a valid reference.
    #[error("malformed reference at '{path}': {message}")]
    Malformed {
        /// JSON path of the offending value, `.` for the document itself.
        path: String,
        /// What is wrong with it.
        message: String,
    },
}

/// Errors of locale resolution. The processor absorbs these and degrades to
/// less specific locale data.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum LocaleError {
    /// A locale document could not be parsed.
    #[error("malformed locale: {0}")]
    Malformed(String),

    /// No link of the fallback chain produced locale data.
    #[error("no locale data available for '{0}'")]
    Unresolvable(LocaleCode),
}

impl From<XmlError> for LocaleError {
    fn from(err: XmlError) -> Self {
        Self::Malformed(err.0)
    }
}

/// An error reported by a [`LocaleFetcher`](crate::LocaleFetcher).
#[derive(Debug, Error)]
pub enum LocaleFetchError {
    /// Reading the locale data failed.
    #[error("failed to read locale: {0}")]
    Io(#[from] std::io::Error),

    /// Any other failure of the fetcher.
    #[error("{0}")]
    Other(String),
}
