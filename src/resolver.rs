//! On-demand locale resolution.
//!
//! The resolver asks a [`LocaleFetcher`] for the raw XML of each tag on the
//! fallback chain, parses what it gets, and layers the results from the least
//! to the most specific tag. Fetch results are cached, including absence, so
//! the fetcher sees every tag at most once.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{LocaleError, LocaleFetchError};
use crate::locale::{Locale, LocaleCode, builtin_locale};
use crate::style::StyleDocument;

/// Supplies raw locale XML for a tag.
pub trait LocaleFetcher: Send {
    /// Return the locale document for `code`, or `Ok(None)` if there is none.
    fn fetch(&mut self, code: &LocaleCode) -> Result<Option<String>, LocaleFetchError>;
}

impl<F> LocaleFetcher for F
where
    F: FnMut(&LocaleCode) -> Option<String> + Send,
{
    fn fetch(&mut self, code: &LocaleCode) -> Result<Option<String>, LocaleFetchError> {
        Ok(self(code))
    }
}

/// A fetcher backed by locale documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct PredefinedLocales(pub HashMap<LocaleCode, String>);

impl PredefinedLocales {
    /// A fetcher that knows no locales.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the document for `code`.
    pub fn with(mut self, code: impl Into<LocaleCode>, xml: impl Into<String>) -> Self {
        self.0.insert(code.into(), xml.into());
        self
    }
}

impl LocaleFetcher for PredefinedLocales {
    fn fetch(&mut self, code: &LocaleCode) -> Result<Option<String>, LocaleFetchError> {
        Ok(self.0.get(code).cloned())
    }
}

/// Resolves tags into merged locales and caches the results.
pub struct LocaleResolver {
    fetcher: Box<dyn LocaleFetcher>,
    default_locale: Option<LocaleCode>,
    overrides: Vec<Locale>,
    builtin: bool,
    fetched: HashMap<LocaleCode, Option<Locale>>,
    resolved: HashMap<LocaleCode, Arc<Locale>>,
}

impl LocaleResolver {
    /// Create a resolver for `style`. With `builtin` set, the bundled `en-US`
    /// locale forms the bottom layer of every resolved locale.
    pub fn new(fetcher: Box<dyn LocaleFetcher>, style: &StyleDocument, builtin: bool) -> Self {
        Self {
            fetcher,
            default_locale: style.default_locale.clone(),
            overrides: style.locales.clone(),
            builtin,
            fetched: HashMap::new(),
            resolved: HashMap::new(),
        }
    }

    /// The tags consulted for `tag`, most specific first.
    pub fn fallback_chain(&self, tag: &LocaleCode) -> Vec<LocaleCode> {
        tag.fallback_chain(self.default_locale.as_ref())
    }

    /// Whether locale data fetched for exactly `tag` is cached.
    pub fn has_cached_locale(&self, tag: &LocaleCode) -> bool {
        self.fetched.get(tag).is_some_and(Option::is_some)
    }

    /// Resolve `tag` into a locale with the style's embedded overrides
    /// applied.
    pub fn resolve(&mut self, tag: &LocaleCode) -> Result<Arc<Locale>, LocaleError> {
        if let Some(locale) = self.resolved.get(tag) {
            return Ok(Arc::clone(locale));
        }

        let mut found = false;
        let mut locale = match builtin_locale().filter(|_| self.builtin) {
            Some(builtin) => {
                found = true;
                builtin.clone()
            }
            None => Locale::empty(None),
        };

        for code in self.fallback_chain(tag).iter().rev() {
            if let Some(fetched) = self.fetch(code) {
                locale.merge(fetched);
                found = true;
            }
        }

        if !found {
            return Err(LocaleError::Unresolvable(tag.clone()));
        }

        self.apply_overrides(&mut locale, tag);
        locale.lang = Some(tag.clone());
        let locale = Arc::new(locale);
        self.resolved.insert(tag.clone(), Arc::clone(&locale));
        debug!(%tag, "resolved locale");
        Ok(locale)
    }

    /// Resolve `tag`, degrading to an empty locale with only the style's
    /// overrides when nothing on the chain has data.
    pub fn resolve_or_default(&mut self, tag: &LocaleCode) -> Arc<Locale> {
        match self.resolve(tag) {
            Ok(locale) => locale,
            Err(err) => {
                warn!(%err, "falling back to an empty locale");
                let mut locale = Locale::empty(Some(tag.clone()));
                self.apply_overrides(&mut locale, tag);
                let locale = Arc::new(locale);
                self.resolved.insert(tag.clone(), Arc::clone(&locale));
                locale
            }
        }
    }

    /// Layer the style's embedded locales onto `locale`: first the ones
    /// without a language, then the base language, then the exact tag.
    fn apply_overrides(&self, locale: &mut Locale, tag: &LocaleCode) {
        let base = tag.base_language();
        let layers = [None, Some(&base), Some(tag)];
        for (i, layer) in layers.into_iter().enumerate() {
            if i == 2 && !tag.has_region() {
                break;
            }
            for over in self.overrides.iter().filter(|o| o.lang.as_ref() == layer) {
                let lang = locale.lang.take();
                locale.merge(over);
                locale.lang = lang;
            }
        }
    }

    /// Fetch and parse the locale for exactly `code`, at most once.
    fn fetch(&mut self, code: &LocaleCode) -> Option<&Locale> {
        if !self.fetched.contains_key(code) {
            let loaded = self.load(code);
            self.fetched.insert(code.clone(), loaded);
        }
        self.fetched.get(code)?.as_ref()
    }

    fn load(&mut self, code: &LocaleCode) -> Option<Locale> {
        match self.fetcher.fetch(code) {
            Ok(Some(xml)) => match Locale::parse(&xml) {
                Ok(locale) => Some(locale),
                Err(err) => {
                    warn!(%code, %err, "ignoring unparseable locale");
                    None
                }
            },
            Ok(None) => {
                debug!(%code, "no locale data");
                None
            }
            Err(err) => {
                warn!(%code, %err, "locale fetch failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::locale::TermForm;
    use crate::taxonomy::{NumberVariable, OtherTerm, Term};

    const STYLE: &str = r#"<style version="1.0" default-locale="fr-FR">
        <locale><terms><term name="and">und</term></terms></locale>
        <locale xml:lang="de-AT"><terms><term name="edition">Aufl. AT</term></terms></locale>
        <citation><layout><text variable="title"/></layout></citation>
    </style>"#;

    fn locale_xml(lang: &str, and: &str) -> String {
        format!(
            r#"<locale xml:lang="{lang}"><terms>
                 <term name="and">{and}</term>
                 <term name="edition">{lang} edition</term>
               </terms></locale>"#
        )
    }

    fn style() -> StyleDocument {
        StyleDocument::parse(STYLE.as_bytes()).unwrap()
    }

    fn term(locale: &Locale, name: OtherTerm) -> Option<&str> {
        locale.term(Term::Other(name), TermForm::Long, false)
    }

    fn edition(locale: &Locale) -> Option<&str> {
        locale.term(Term::NumberVariable(NumberVariable::Edition), TermForm::Long, false)
    }

    #[test]
    fn test_fetches_once_per_tag() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let fetcher = move |code: &LocaleCode| {
            counter.fetch_add(1, Ordering::SeqCst);
            (code.as_str() == "de").then(|| locale_xml("de", "und"))
        };

        let mut resolver = LocaleResolver::new(Box::new(fetcher), &style(), true);
        let tag = LocaleCode::new("de-CH");
        resolver.resolve(&tag).unwrap();
        resolver.resolve(&tag).unwrap();
        resolver.resolve(&LocaleCode::new("de-AT")).unwrap();

        // de-CH, de, fr-FR, en-US, then only de-AT is new.
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert!(resolver.has_cached_locale(&LocaleCode::new("de")));
        assert!(!resolver.has_cached_locale(&LocaleCode::new("de-CH")));
    }

    #[test]
    fn test_layering_and_overrides() {
        let fetcher = PredefinedLocales::new()
            .with("de", locale_xml("de", "und (de)"))
            .with("de-AT", locale_xml("de-AT", "und (AT)"));
        let mut resolver = LocaleResolver::new(Box::new(fetcher), &style(), true);

        let locale = resolver.resolve(&LocaleCode::new("de-AT")).unwrap();
        assert_eq!(locale.lang, Some(LocaleCode::new("de-AT")));
        // The language-less style override beats every fetched layer.
        assert_eq!(term(&locale, OtherTerm::And), Some("und"));
        assert_eq!(edition(&locale), Some("Aufl. AT"));
        // Terms nobody overrides come from the builtin base.
        assert_eq!(term(&locale, OtherTerm::Anonymous), Some("anonymous"));

        let locale = resolver.resolve(&LocaleCode::new("de-DE")).unwrap();
        assert_eq!(edition(&locale), Some("de edition"));
    }

    #[test]
    fn test_unresolvable() {
        let mut resolver = LocaleResolver::new(Box::new(PredefinedLocales::new()), &style(), false);
        let tag = LocaleCode::new("xx-YY");
        assert_eq!(resolver.resolve(&tag), Err(LocaleError::Unresolvable(tag.clone())));

        let locale = resolver.resolve_or_default(&tag);
        assert_eq!(term(&locale, OtherTerm::And), Some("und"));
        assert_eq!(term(&locale, OtherTerm::Anonymous), None);
    }

    #[test]
    fn test_bad_locale_is_absence() {
        let fetcher = |code: &LocaleCode| match code.as_str() {
            "de" => Some("<locale><terms><term".to_string()),
            _ => None,
        };
        let mut resolver = LocaleResolver::new(Box::new(fetcher), &style(), true);
        let locale = resolver.resolve(&LocaleCode::new("de")).unwrap();
        assert_eq!(edition(&locale), Some("edition"));
        assert!(!resolver.has_cached_locale(&LocaleCode::new("de")));
    }
}
