use std::fmt;

use tracing::debug;

use crate::error::{RefError, StyleError};
use crate::locale::LocaleCode;
use crate::output::OutputFormat;
use crate::reference::Reference;
use crate::render::render_layout;
use crate::resolver::{LocaleFetcher, LocaleResolver};
use crate::style::{Layout, StyleDocument};

/// Options for creating a [`Processor`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProcessorOptions {
    /// The encoding of formatted output.
    pub format: OutputFormat,
    /// The locale to format with. Defaults to the style's `default-locale`,
    /// then `en-US`.
    pub locale: Option<LocaleCode>,
    /// Whether the bundled `en-US` locale backs every resolved locale.
    pub builtin_locale: bool,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self { format: OutputFormat::default(), locale: None, builtin_locale: true }
    }
}

/// A formatted citation or bibliography entry, owned by the caller.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct FormattedOutput(String);

impl FormattedOutput {
    /// The formatted text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The length of the text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the output is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take the text out of the output.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Release the output. Equivalent to dropping it.
    pub fn release(self) {}
}

impl fmt::Display for FormattedOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for FormattedOutput {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Formats references with one style.
///
/// The processor owns the parsed style and a locale cache. Locales are
/// fetched on first use, and each tag is fetched at most once.
pub struct Processor {
    style: StyleDocument,
    resolver: LocaleResolver,
    format: OutputFormat,
    locale: LocaleCode,
}

impl Processor {
    /// Create a processor for a CSL style with default options and the
    /// given output format.
    pub fn new(
        style: &[u8],
        fetcher: impl LocaleFetcher + 'static,
        format: OutputFormat,
    ) -> Result<Self, StyleError> {
        Self::with_options(style, fetcher, ProcessorOptions { format, ..Default::default() })
    }

    /// Create a processor for a CSL style.
    pub fn with_options(
        style: &[u8],
        fetcher: impl LocaleFetcher + 'static,
        options: ProcessorOptions,
    ) -> Result<Self, StyleError> {
        let style = StyleDocument::parse(style)?;
        let locale = options
            .locale
            .or_else(|| style.default_locale.clone())
            .unwrap_or_else(LocaleCode::en_us);
        let resolver = LocaleResolver::new(Box::new(fetcher), &style, options.builtin_locale);
        debug!(style = style.info.id.as_deref(), %locale, "created processor");
        Ok(Self { style, resolver, format: options.format, locale })
    }

    /// Format a CSL-JSON reference with the citation layout.
    ///
    /// A malformed reference fails this call only.
    pub fn format_one(&mut self, reference: &[u8]) -> Result<FormattedOutput, RefError> {
        let reference = Reference::from_json(reference)?;
        Ok(self.format_with(|style| &style.citation, &reference))
    }

    /// Format a CSL-JSON reference with the bibliography layout. Returns
    /// `None` if the style has no bibliography.
    pub fn format_bibliography_entry(
        &mut self,
        reference: &[u8],
    ) -> Result<Option<FormattedOutput>, RefError> {
        let reference = Reference::from_json(reference)?;
        if self.style.bibliography.is_none() {
            return Ok(None);
        }
        Ok(Some(self.format_with(
            |style| style.bibliography.as_ref().unwrap_or(&style.citation),
            &reference,
        )))
    }

    fn format_with(
        &mut self,
        layout: impl FnOnce(&StyleDocument) -> &Layout,
        reference: &Reference,
    ) -> FormattedOutput {
        let locale = self.resolver.resolve_or_default(&self.locale);
        let fragments = render_layout(&self.style, layout(&self.style), reference, &locale);
        debug!(id = %reference.id, "formatted reference");
        FormattedOutput(self.format.render(&fragments))
    }

    /// The tag of the locale the processor formats with.
    pub fn locale_tag(&self) -> &LocaleCode {
        &self.locale
    }

    /// The tags consulted when resolving the processor's locale, most
    /// specific first.
    pub fn fallback_chain(&self) -> Vec<LocaleCode> {
        self.resolver.fallback_chain(&self.locale)
    }

    /// Whether locale data for exactly `tag` has been fetched and cached.
    pub fn has_cached_locale(&self, tag: &LocaleCode) -> bool {
        self.resolver.has_cached_locale(tag)
    }

    /// The parsed style.
    pub fn style(&self) -> &StyleDocument {
        &self.style
    }

    /// The output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Release the processor with its style and locale cache. Equivalent to
    /// dropping it.
    pub fn release(self) {}
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processor")
            .field("style", &self.style.info)
            .field("class", &self.style.class)
            .field("format", &self.format)
            .field("locale", &self.locale)
            .finish_non_exhaustive()
    }
}
