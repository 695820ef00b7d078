//! Locale data: localized terms, date formats and locale options.
//!
//! A [`Locale`] is built from a `<locale>` document or from a `<locale>` block
//! embedded in a style. Locales are layered with [`Locale::merge`], where the
//! more specific locale wins for every entry it defines.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Deserialize;
use tracing::{trace, warn};

use crate::error::LocaleError;
use crate::style::{DateForm, DatePart, parse_date_part};
use crate::taxonomy::{OtherTerm, Term};
use crate::xml::{self, Element, XmlError};

/// An RFC 1766 language code such as `en-US` or `de`.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LocaleCode(pub String);

impl LocaleCode {
    /// Create a code from a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The code of the locale bundled with the crate.
    pub fn en_us() -> Self {
        Self::new("en-US")
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary language subtag, e.g. `de` for `de-AT`.
    pub fn base_language(&self) -> LocaleCode {
        let base = self.0.split(['-', '_']).next().unwrap_or_default();
        Self::new(base)
    }

    /// Whether this code carries a region or script after the language.
    pub fn has_region(&self) -> bool {
        self.base_language() != *self
    }

    /// The ordered lookup chain for this code: the exact tag, its base
    /// language, the style's default locale and finally `en-US`.
    ///
    /// The chain contains no duplicates and holds at most five entries.
    pub fn fallback_chain(&self, style_default: Option<&LocaleCode>) -> Vec<LocaleCode> {
        let candidates = [
            Some(self.clone()),
            Some(self.base_language()),
            style_default.cloned(),
            Some(Self::en_us()),
        ];

        let mut chain: Vec<LocaleCode> = Vec::with_capacity(candidates.len());
        for code in candidates.into_iter().flatten() {
            if !code.0.is_empty() && !chain.contains(&code) {
                chain.push(code);
            }
        }
        chain.truncate(5);
        chain
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocaleCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The variant of a term translation.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TermForm {
    /// The default variant.
    #[default]
    Long,
    /// The short noun variant.
    Short,
    /// The related verb.
    Verb,
    /// The related verb (short form).
    VerbShort,
    /// The symbol variant.
    Symbol,
}

impl TermForm {
    /// Which form is the next fallback if this form is not available.
    pub const fn fallback(self) -> Self {
        match self {
            Self::Long => Self::Long,
            Self::Short => Self::Long,
            Self::Verb => Self::Long,
            Self::VerbShort => Self::Verb,
            Self::Symbol => Self::Short,
        }
    }
}

/// Specify when which ordinal term is used.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrdinalMatch {
    /// Match the last digit.
    LastDigit,
    /// Match the last two digits.
    LastTwoDigits,
    /// Match on the exact number.
    WholeNumber,
}

/// A grammatical gender. `None` is used for neuter.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GrammarGender {
    Feminine,
    Masculine,
}

/// Options for the locale. Unset entries fall through when merging.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct LocaleOptions {
    /// Only use ordinals for the first day in a month.
    pub limit_day_ordinals_to_day_1: Option<bool>,
    /// Whether to place punctuation inside of quotation marks.
    pub punctuation_in_quote: Option<bool>,
}

impl LocaleOptions {
    fn merge(&mut self, other: &Self) {
        if other.limit_day_ordinals_to_day_1.is_some() {
            self.limit_day_ordinals_to_day_1 = other.limit_day_ordinals_to_day_1;
        }
        if other.punctuation_in_quote.is_some() {
            self.punctuation_in_quote = other.punctuation_in_quote;
        }
    }
}

/// Identifies one localized term within a locale.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TermKey {
    /// The term.
    pub term: Term,
    /// Its variant.
    pub form: TermForm,
    /// For ordinals: the gender of the noun this variant agrees with.
    pub gender_form: Option<GrammarGender>,
}

/// A localized term with an optional plural.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct LocalizedTerm {
    /// The singular form, or the only form.
    pub single: String,
    /// The plural form.
    pub multiple: Option<String>,
    /// The grammatical gender of a noun term.
    pub gender: Option<GrammarGender>,
    /// How an ordinal term is matched against a number.
    pub match_: Option<OrdinalMatch>,
}

impl LocalizedTerm {
    /// The singular or plural form. Falls back to the singular.
    pub fn get(&self, plural: bool) -> &str {
        match (&self.multiple, plural) {
            (Some(multiple), true) => multiple,
            _ => &self.single,
        }
    }
}

/// A localized date format.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct LocaleDate {
    /// The date parts in display order.
    pub parts: Vec<DatePart>,
    /// Delimiter between the parts.
    pub delimiter: Option<String>,
}

/// Parsed locale data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Locale {
    /// Which language this data applies to. `None` for an embedded style
    /// locale that applies to every language.
    pub lang: Option<LocaleCode>,
    terms: HashMap<TermKey, LocalizedTerm>,
    dates: HashMap<DateForm, LocaleDate>,
    /// Locale options.
    pub options: LocaleOptions,
}

impl Locale {
    /// An empty locale for `lang`.
    pub fn empty(lang: Option<LocaleCode>) -> Self {
        Self { lang, ..Self::default() }
    }

    /// Parse a standalone locale document.
    pub fn parse(text: &str) -> Result<Self, LocaleError> {
        let root = xml::parse_document(text)?;
        if root.name != "locale" {
            return Err(LocaleError::Malformed(format!(
                "expected <locale> root element, found <{}>",
                root.name
            )));
        }
        Ok(Self::from_element(&root)?)
    }

    /// Read a `<locale>` element, either a document root or a block embedded
    /// in a style.
    pub(crate) fn from_element(element: &Element) -> Result<Self, XmlError> {
        let mut locale = Self::empty(element.attr("xml:lang").map(LocaleCode::from));

        for child in &element.children {
            match child.name.as_str() {
                "terms" => {
                    for term in child.children_named("term") {
                        locale.read_term(term)?;
                    }
                }
                "date" => {
                    let form: DateForm = child
                        .keyword("form")?
                        .ok_or_else(|| XmlError::new("locale <date> requires a `form`"))?;
                    let parts = child
                        .children_named("date-part")
                        .map(parse_date_part)
                        .collect::<Result<_, _>>()?;
                    let delimiter = child.string_attr("delimiter");
                    locale.dates.insert(form, LocaleDate { parts, delimiter });
                }
                "style-options" => {
                    locale.options = LocaleOptions {
                        limit_day_ordinals_to_day_1: child
                            .opt_bool_attr("limit-day-ordinals-to-day-1")?,
                        punctuation_in_quote: child.opt_bool_attr("punctuation-in-quote")?,
                    };
                }
                _ => {}
            }
        }

        Ok(locale)
    }

    fn read_term(&mut self, element: &Element) -> Result<(), XmlError> {
        let Some(name) = element.attr("name") else {
            return Err(XmlError::new("<term> requires a `name`"));
        };
        // Locale files carry terms for newer CSL revisions. Unknown ones are
        // not an error.
        let Ok(Some(term)) = element.keyword::<Term>("name") else {
            trace!(term = name, "skipping unknown locale term");
            return Ok(());
        };

        let key = TermKey {
            term,
            form: element.keyword("form")?.unwrap_or_default(),
            gender_form: element.keyword("gender-form")?,
        };

        let (single, multiple) = match (element.child("single"), element.child("multiple")) {
            (None, None) => (element.text.clone(), None),
            (single, multiple) => (
                single.map(|s| s.text.clone()).unwrap_or_default(),
                multiple.map(|m| m.text.clone()),
            ),
        };

        self.terms.insert(key, LocalizedTerm {
            single,
            multiple,
            gender: element.keyword("gender")?,
            match_: element.keyword("match")?,
        });
        Ok(())
    }

    /// Layer `other` on top of this locale. Entries defined in `other` replace
    /// the ones here; everything else is kept.
    pub fn merge(&mut self, other: &Locale) {
        for (key, term) in &other.terms {
            self.terms.insert(*key, term.clone());
        }
        for (form, date) in &other.dates {
            self.dates.insert(*form, date.clone());
        }
        self.options.merge(&other.options);
        if other.lang.is_some() {
            self.lang.clone_from(&other.lang);
        }
    }

    /// Whether the locale defines no data at all.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
            && self.dates.is_empty()
            && self.options == LocaleOptions::default()
    }

    /// The localized term exactly as defined, without form fallback.
    pub fn localized_term(&self, term: Term, form: TermForm) -> Option<&LocalizedTerm> {
        self.terms.get(&TermKey { term, form, gender_form: None })
    }

    /// Look up a term, falling back through the less specific forms.
    pub fn term(&self, term: Term, form: TermForm, plural: bool) -> Option<&str> {
        let mut form = form;
        loop {
            if let Some(found) = self.localized_term(term, form) {
                return Some(found.get(plural));
            }
            let next = form.fallback();
            if next == form {
                break;
            }
            form = next;
        }

        let fallback = term.term_fallback();
        if fallback != term {
            return self.term(fallback, TermForm::Long, plural);
        }
        None
    }

    /// The grammatical gender of a noun term, used to pick agreeing ordinals.
    pub fn gender(&self, term: Term) -> Option<GrammarGender> {
        self.localized_term(term, TermForm::Long).and_then(|t| t.gender)
    }

    /// The suffix that turns `n` into an ordinal, e.g. `"nd"` for 2.
    pub fn ordinal_suffix(&self, n: i64, gender: Option<GrammarGender>) -> &str {
        let n = n.unsigned_abs();
        let last_two = (n % 100) as u8;
        let last = (n % 10) as u8;

        let matches = |term: &LocalizedTerm, suffix: u8| {
            let default = if suffix >= 10 {
                OrdinalMatch::LastTwoDigits
            } else {
                OrdinalMatch::LastDigit
            };
            match term.match_.unwrap_or(default) {
                OrdinalMatch::LastDigit => u64::from(suffix) == n % 10,
                OrdinalMatch::LastTwoDigits => u64::from(suffix) == n % 100,
                OrdinalMatch::WholeNumber => u64::from(suffix) == n,
            }
        };

        let mut candidates = vec![last_two];
        if last_two != last {
            candidates.push(last);
        }

        for suffix in candidates {
            let term = Term::Other(OtherTerm::OrdinalN(suffix));
            if let Some(found) = self.gendered(term, gender).filter(|t| matches(t, suffix)) {
                return &found.single;
            }
        }

        self.gendered(Term::Other(OtherTerm::Ordinal), gender)
            .map(|t| t.single.as_str())
            .unwrap_or_default()
    }

    /// The long ordinal word for `n`, such as "second". Only defined for 1 to
    /// 10.
    pub fn long_ordinal(&self, n: i64, gender: Option<GrammarGender>) -> Option<&str> {
        let n = u8::try_from(n).ok().filter(|n| (1..=10).contains(n))?;
        self.gendered(Term::Other(OtherTerm::LongOrdinal(n)), gender)
            .map(|t| t.single.as_str())
    }

    fn gendered(&self, term: Term, gender: Option<GrammarGender>) -> Option<&LocalizedTerm> {
        let key = |gender_form| TermKey { term, form: TermForm::Long, gender_form };
        gender
            .and_then(|g| self.terms.get(&key(Some(g))))
            .or_else(|| self.terms.get(&key(None)))
    }

    /// The localized date format for `form`.
    pub fn date_format(&self, form: DateForm) -> Option<&LocaleDate> {
        self.dates.get(&form)
    }

    /// Whether punctuation moves inside closing quotes.
    pub fn punctuation_in_quote(&self) -> bool {
        self.options.punctuation_in_quote.unwrap_or(false)
    }

    /// Whether only the first day of a month gets an ordinal.
    pub fn limit_day_ordinals_to_day_1(&self) -> bool {
        self.options.limit_day_ordinals_to_day_1.unwrap_or(false)
    }
}

const EN_US: &str = include_str!("../assets/locales-en-US.xml");

static BUILTIN: Lazy<Option<Locale>> = Lazy::new(|| match Locale::parse(EN_US) {
    Ok(locale) => Some(locale),
    Err(err) => {
        warn!(%err, "failed to parse the bundled en-US locale");
        None
    }
});

/// The `en-US` locale bundled with the crate. Parsed on first use and shared
/// by every processor.
pub fn builtin_locale() -> Option<&'static Locale> {
    BUILTIN.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::NumberVariable;

    fn locale(terms: &str) -> Locale {
        Locale::parse(&format!(
            r#"<locale xmlns="http://purl.org/net/xbiblio/csl" version="1.0" xml:lang="en-US">
                 <terms>{terms}</terms>
               </locale>"#
        ))
        .unwrap()
    }

    #[test]
    fn test_fallback_chain() {
        let tag = LocaleCode::new("de-AT");
        let chain = tag.fallback_chain(Some(&LocaleCode::new("fr-FR")));
        assert_eq!(chain, ["de-AT", "de", "fr-FR", "en-US"].map(LocaleCode::from));

        let chain = LocaleCode::en_us().fallback_chain(Some(&LocaleCode::en_us()));
        assert_eq!(chain, ["en-US", "en"].map(LocaleCode::from));

        let chain = LocaleCode::new("en").fallback_chain(None);
        assert_eq!(chain, ["en", "en-US"].map(LocaleCode::from));
    }

    #[test]
    fn test_term_forms() {
        let locale = locale(
            r#"<term name="page"><single>page</single><multiple>pages</multiple></term>
               <term name="page" form="short"><single>p.</single><multiple>pp.</multiple></term>
               <term name="and">and</term>
               <term name="some-future-term">ignored</term>"#,
        );
        let page = Term::NumberVariable(NumberVariable::Page);
        assert_eq!(locale.term(page, TermForm::Short, true), Some("pp."));
        assert_eq!(locale.term(page, TermForm::Long, false), Some("page"));
        assert_eq!(locale.term(page, TermForm::Symbol, false), Some("p."));
        let and = Term::Other(OtherTerm::And);
        assert_eq!(locale.term(and, TermForm::VerbShort, true), Some("and"));
    }

    #[test]
    fn test_merge_precedence() {
        let mut base = locale(
            r#"<term name="and">and</term><term name="et-al">et al.</term>"#,
        );
        let mut over = locale(r#"<term name="and">&amp;</term>"#);
        over.options.punctuation_in_quote = Some(true);
        base.merge(&over);

        assert_eq!(base.term(Term::Other(OtherTerm::And), TermForm::Long, false), Some("&"));
        assert_eq!(
            base.term(Term::Other(OtherTerm::EtAl), TermForm::Long, false),
            Some("et al.")
        );
        assert!(base.punctuation_in_quote());
    }

    #[test]
    fn test_ordinals() {
        let locale = builtin_locale().unwrap();
        let suffix = |n| locale.ordinal_suffix(n, None).to_string();
        assert_eq!(suffix(1), "st");
        assert_eq!(suffix(2), "nd");
        assert_eq!(suffix(3), "rd");
        assert_eq!(suffix(4), "th");
        assert_eq!(suffix(11), "th");
        assert_eq!(suffix(12), "th");
        assert_eq!(suffix(22), "nd");
        assert_eq!(suffix(101), "st");
        assert_eq!(suffix(111), "th");
        assert_eq!(locale.long_ordinal(2, None), Some("second"));
        assert_eq!(locale.long_ordinal(11, None), None);
    }

    #[test]
    fn test_builtin_dates() {
        let locale = builtin_locale().unwrap();
        assert_eq!(locale.lang, Some(LocaleCode::en_us()));
        assert_eq!(locale.date_format(DateForm::Text).unwrap().parts.len(), 3);
        assert!(locale.punctuation_in_quote());
    }

    #[test]
    fn test_rejects_non_locale_root() {
        assert!(matches!(Locale::parse("<style/>"), Err(LocaleError::Malformed(_))));
        assert!(matches!(Locale::parse("<locale>"), Err(LocaleError::Malformed(_))));
    }
}
