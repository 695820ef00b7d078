//! Bibliographic references read from CSL-JSON.
//!
//! A [`Reference`] holds one item's variables in typed maps. Unknown keys are
//! ignored. A known variable whose value has the wrong shape is dropped with a
//! warning instead of failing the whole reference.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::{trace, warn};
use unscanny::Scanner;

use crate::error::RefError;
use crate::locale::LocaleCode;
use crate::taxonomy::{
    DateVariable, Kind, NameVariable, NumberVariable, StandardVariable, Variable,
};
use crate::util::from_keyword;

/// A bibliographic item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The item's ID.
    pub id: String,
    /// The item type.
    pub kind: Kind,
    standard: HashMap<StandardVariable, String>,
    number: HashMap<NumberVariable, NumberValue>,
    names: HashMap<NameVariable, Vec<Name>>,
    dates: HashMap<DateVariable, DateValue>,
}

/// The fields every CSL-JSON item must carry, plus everything else.
#[derive(Deserialize)]
struct RawReference {
    id: NumberOrString,
    #[serde(rename = "type")]
    kind: Kind,
    #[serde(flatten)]
    fields: BTreeMap<String, serde_json::Value>,
}

impl Reference {
    /// Parse a single CSL-JSON object.
    pub fn from_json(bytes: &[u8]) -> Result<Self, RefError> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        let raw: RawReference =
            serde_path_to_error::deserialize(&mut de).map_err(|err| RefError::Malformed {
                path: err.path().to_string(),
                message: err.inner().to_string(),
            })?;
        de.end().map_err(|err| RefError::Malformed {
            path: ".".into(),
            message: err.to_string(),
        })?;

        let mut reference = Self {
            id: raw.id.into_string(),
            kind: raw.kind,
            standard: HashMap::new(),
            number: HashMap::new(),
            names: HashMap::new(),
            dates: HashMap::new(),
        };

        for (key, value) in raw.fields {
            if value.is_null() {
                continue;
            }
            let Ok(variable) = from_keyword::<Variable>(&key) else {
                trace!(key, "ignoring unknown CSL-JSON key");
                continue;
            };
            if let Err(err) = reference.insert(variable, value) {
                warn!(id = reference.id, key, %err, "dropping malformed variable");
            }
        }

        Ok(reference)
    }

    fn insert(&mut self, variable: Variable, value: serde_json::Value) -> serde_json::Result<()> {
        match variable {
            Variable::Standard(var) => {
                let value = NumberOrString::deserialize(value)?.into_string();
                if !value.is_empty() {
                    self.standard.insert(var, value);
                }
            }
            Variable::Number(var) => {
                let value = NumberValue::deserialize(value)?;
                if !value.is_empty() {
                    self.number.insert(var, value);
                }
            }
            Variable::Name(var) => {
                let value = Vec::<Name>::deserialize(value)?;
                if !value.is_empty() {
                    self.names.insert(var, value);
                }
            }
            Variable::Date(var) => {
                self.dates.insert(var, DateValue::deserialize(value)?);
            }
        }
        Ok(())
    }

    /// The item's language, from the `language` variable.
    pub fn language(&self) -> Option<LocaleCode> {
        self.standard(StandardVariable::Language).map(LocaleCode::from)
    }

    /// The value of a standard variable.
    pub fn standard(&self, var: StandardVariable) -> Option<&str> {
        self.standard.get(&var).map(String::as_str)
    }

    /// The value of a number variable. `page-first` is derived from `page`.
    pub fn number(&self, var: NumberVariable) -> Option<NumberValue> {
        match var {
            NumberVariable::PageFirst => self
                .number
                .get(&var)
                .cloned()
                .or_else(|| self.number.get(&NumberVariable::Page)?.first()),
            _ => self.number.get(&var).cloned(),
        }
    }

    /// The names of a name variable.
    pub fn names(&self, var: NameVariable) -> Option<&[Name]> {
        self.names.get(&var).map(Vec::as_slice)
    }

    /// The value of a date variable.
    pub fn date(&self, var: DateVariable) -> Option<&DateValue> {
        self.dates.get(&var)
    }

    /// Whether the variable is present and non-empty.
    pub fn has_variable(&self, var: Variable) -> bool {
        match var {
            Variable::Standard(v) => self.standard.contains_key(&v),
            Variable::Number(v) => self.number(v).is_some(),
            Variable::Name(v) => self.names.contains_key(&v),
            Variable::Date(v) => self.dates.contains_key(&v),
        }
    }

    /// Whether the variable holds numeric content.
    pub fn is_numeric(&self, var: Variable) -> bool {
        match var {
            Variable::Number(v) => self.number(v).is_some_and(|n| n.is_numeric()),
            Variable::Standard(v) => {
                self.standard(v).is_some_and(|s| NumberValue::Str(s.into()).is_numeric())
            }
            Variable::Name(_) | Variable::Date(_) => false,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    Float(f64),
    String(String),
}

impl NumberOrString {
    fn into_string(self) -> String {
        match self {
            NumberOrString::Number(n) => n.to_string(),
            NumberOrString::Float(n) => n.to_string(),
            NumberOrString::String(s) => s,
        }
    }
}

/// The value of a number variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NumberValue {
    /// A plain integer.
    Int(i64),
    /// Free text such as `"12-14"`, `"2nd"` or `"XIV"`.
    Str(String),
}

impl NumberValue {
    /// Whether the value is empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Str(s) if s.trim().is_empty())
    }

    /// Whether the value is numeric: numbers with optional letter affixes,
    /// joined by `-`, `,` or `&`.
    pub fn is_numeric(&self) -> bool {
        match self {
            Self::Int(_) => true,
            Self::Str(s) => {
                let mut tokens = s.split(is_number_separator).map(str::trim).peekable();
                tokens.peek().is_some() && tokens.all(is_numeric_token)
            }
        }
    }

    /// The value as a single integer, if it is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
        }
    }

    /// Whether the value names more than one number, such as a range.
    pub fn is_plural(&self) -> bool {
        match self {
            Self::Int(_) => false,
            Self::Str(s) => {
                s.split(is_number_separator).filter(|t| !t.trim().is_empty()).count() > 1
            }
        }
    }

    /// Split the value into numeric runs and the text between them. The
    /// second element of each pair tells whether the piece is a number.
    pub fn segments(&self) -> Vec<(String, bool)> {
        let text = self.to_string();
        let mut segments: Vec<(String, bool)> = Vec::new();
        for c in text.chars() {
            let digit = c.is_ascii_digit();
            match segments.last_mut() {
                Some((segment, is_digit)) if *is_digit == digit => segment.push(c),
                _ => segments.push((c.to_string(), digit)),
            }
        }
        segments
    }

    fn first(&self) -> Option<NumberValue> {
        match self {
            Self::Int(_) => Some(self.clone()),
            Self::Str(s) => s
                .split(is_number_separator)
                .map(str::trim)
                .find(|t| !t.is_empty())
                .map(|t| Self::Str(t.to_string())),
        }
    }
}

fn is_number_separator(c: char) -> bool {
    matches!(c, '-' | '–' | ',' | '&')
}

fn is_numeric_token(token: &str) -> bool {
    let core = token.trim_matches(|c: char| c.is_alphabetic());
    !core.is_empty() && core.chars().all(|c| c.is_ascii_digit())
}

impl fmt::Display for NumberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for NumberValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => Self::Int(n),
            other => Self::Str(other.into_string()),
        })
    }
}

/// The representation of a name.
#[derive(Debug, Clone, Deserialize, Hash, PartialEq, Eq)]
#[serde(untagged)]
pub enum Name {
    /// A name that is printed as given, e.g. an institution.
    Literal(LiteralName),
    /// A personal name defined by its parts.
    Person(PersonName),
}

/// A name that is printed as given.
#[derive(Debug, Clone, Deserialize, Hash, PartialEq, Eq)]
pub struct LiteralName {
    /// The literal name.
    pub literal: String,
}

/// A name that is defined by a collection of parts.
#[derive(Debug, Default, Clone, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct PersonName {
    /// The family name.
    pub family: Option<String>,
    /// The given name.
    pub given: Option<String>,
    /// A name particle like `"de las"` that stays with the family name.
    pub non_dropping_particle: Option<String>,
    /// A name particle like `"van"` that moves with the given name.
    pub dropping_particle: Option<String>,
    /// A name suffix like `"Jr."`.
    pub suffix: Option<String>,
    /// Whether a comma precedes the suffix.
    #[serde(default)]
    pub comma_suffix: bool,
}

/// The representation of a date: a single date or a range, optionally
/// uncertain, or a literal string.
#[derive(Debug, Clone, Default, Hash, PartialEq, Eq)]
pub struct DateValue {
    /// The first date.
    pub start: Option<FixedDate>,
    /// The end of a range.
    pub end: Option<FixedDate>,
    /// A season, either a number between 1 and 4 or free text.
    pub season: Option<String>,
    /// Whether the date is approximate.
    pub circa: bool,
    /// A date that is printed verbatim.
    pub literal: Option<String>,
}

impl<'de> Deserialize<'de> for DateValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum DateRepr {
            String(String),
            Object(DateObject),
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "kebab-case")]
        struct DateObject {
            date_parts: Option<Vec<VecDate>>,
            raw: Option<String>,
            literal: Option<String>,
            season: Option<NumberOrString>,
            circa: Option<Flag>,
        }

        let object = match DateRepr::deserialize(deserializer)? {
            DateRepr::String(raw) => DateObject {
                date_parts: None,
                raw: Some(raw),
                literal: None,
                season: None,
                circa: None,
            },
            DateRepr::Object(object) => object,
        };

        let mut value = DateValue {
            season: object.season.map(NumberOrString::into_string),
            circa: object.circa.is_some_and(Flag::is_set),
            literal: object.literal,
            ..DateValue::default()
        };

        if let Some(parts) = object.date_parts {
            let parts: Vec<FixedDate> =
                parts.into_iter().filter_map(|p| value.read_parts(p)).collect();
            let mut parts = parts.into_iter();
            value.start = parts.next();
            value.end = parts.next();
        } else if let Some(raw) = object.raw {
            match FixedDateRange::from_str(&raw) {
                Ok(range) => {
                    value.start = Some(range.start);
                    value.end = range.end;
                    value.circa |= range.circa;
                }
                Err(()) => value.literal = value.literal.or(Some(raw)),
            }
        }

        if value.end == value.start {
            value.end = None;
        }
        if value.start.is_none() && value.literal.is_none() {
            return Err(serde::de::Error::custom("date has neither parts nor a literal"));
        }
        Ok(value)
    }
}

impl DateValue {
    /// Turn `[year, month, day]` into a date. Months 13 to 16 name the
    /// seasons.
    fn read_parts(&mut self, parts: VecDate) -> Option<FixedDate> {
        let mut parts = parts.0.into_iter();
        let year = parts.next()?;
        let month = parts.next().filter(|&m| m > 0);
        let day = parts.next().filter(|&d| (1..=31).contains(&d));

        let month = match month {
            Some(m @ 1..=12) => Some((m - 1) as u8),
            Some(m @ 13..=16) => {
                self.season.get_or_insert_with(|| (m - 12).to_string());
                None
            }
            _ => None,
        };

        Some(FixedDate { year, month, day: month.and(day).map(|d| (d - 1) as u8) })
    }

    /// Whether the date is approximate.
    pub fn is_uncertain(&self) -> bool {
        self.circa
    }
}

/// A date defined by an arbitrary sequence of integer components.
struct VecDate(Vec<i32>);

impl<'de> Deserialize<'de> for VecDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let v = Vec::<NumberOrString>::deserialize(deserializer)?;
        Ok(VecDate(
            v.into_iter()
                .filter_map(|v| match v {
                    NumberOrString::Number(n) => Some(i32::try_from(n).map_err(|_| {
                        serde::de::Error::custom(format!("date part out of range: {n}"))
                    })),
                    NumberOrString::Float(n) => Some(Ok(n as i32)),
                    NumberOrString::String(s) if s.trim().is_empty() => None,
                    NumberOrString::String(s) => Some(s.trim().parse().map_err(|_| {
                        serde::de::Error::custom(format!("invalid number: {s}"))
                    })),
                })
                .collect::<Result<_, _>>()?,
        ))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Number(i64),
    String(String),
}

impl Flag {
    fn is_set(self) -> bool {
        match self {
            Flag::Bool(b) => b,
            Flag::Number(n) => n != 0,
            Flag::String(s) => !s.is_empty() && s != "0" && s != "false",
        }
    }
}

/// A date defined by fixed components. Month and day count from zero.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct FixedDate {
    /// The year. Negative years are BC.
    pub year: i32,
    /// The month, `0` being January.
    pub month: Option<u8>,
    /// The day, `0` being the first of the month.
    pub day: Option<u8>,
}

/// A range of dates read from an EDTF-like string such as `2021-09-10/2022`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
struct FixedDateRange {
    start: FixedDate,
    end: Option<FixedDate>,
    circa: bool,
}

impl FromStr for FixedDateRange {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut s = Scanner::new(s.trim());
        let (start, mut circa) = parse_date(&mut s).ok_or(())?;
        let end = if s.eat_if('/') {
            let (end, end_circa) = parse_date(&mut s).ok_or(())?;
            circa |= end_circa;
            Some(end)
        } else {
            None
        };

        if !s.done() {
            return Err(());
        }
        Ok(FixedDateRange { start, end, circa })
    }
}

fn parse_date(s: &mut Scanner<'_>) -> Option<(FixedDate, bool)> {
    let negative = s.eat_if('-');
    let year = s.eat_while(char::is_ascii_digit);
    if year.is_empty() {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let year = if negative { -year } else { year };

    let mut date = FixedDate { year, month: None, day: None };
    if s.eat_if('-') {
        let month = s.eat_while(char::is_ascii_digit).parse::<u8>().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        date.month = Some(month - 1);

        if s.eat_if('-') {
            let day = s.eat_while(char::is_ascii_digit).parse::<u8>().ok()?;
            if !(1..=31).contains(&day) {
                return None;
            }
            date.day = Some(day - 1);
        }
    }

    let circa = s.eat_if('~') | s.eat_if('?');
    Some((date, circa))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference() {
        let reference = Reference::from_json(
            br#"{
                "id": 7,
                "type": "article-journal",
                "title": "The Title",
                "volume": "12",
                "page": "100-120",
                "ISBN": 9780000000000,
                "language": "de-AT",
                "custom-key": {"ignored": true},
                "author": [{"family": "Doe", "given": "Jane"}, {"literal": "ACME Corp."}],
                "issued": {"date-parts": [[2021, 9, 10], [2022]]}
            }"#,
        )
        .unwrap();

        assert_eq!(reference.id, "7");
        assert_eq!(reference.kind, Kind::ArticleJournal);
        assert_eq!(reference.standard(StandardVariable::Title), Some("The Title"));
        assert_eq!(reference.standard(StandardVariable::Isbn), Some("9780000000000"));
        assert_eq!(reference.language(), Some(LocaleCode::new("de-AT")));
        assert_eq!(
            reference.number(NumberVariable::PageFirst),
            Some(NumberValue::Str("100".into()))
        );

        let names = reference.names(NameVariable::Author).unwrap();
        assert_eq!(names.len(), 2);
        assert!(matches!(&names[1], Name::Literal(l) if l.literal == "ACME Corp."));

        let issued = reference.date(DateVariable::Issued).unwrap();
        assert_eq!(issued.start, Some(FixedDate { year: 2021, month: Some(8), day: Some(9) }));
        assert_eq!(issued.end, Some(FixedDate { year: 2022, month: None, day: None }));
    }

    #[test]
    fn test_malformed_reference() {
        let err = Reference::from_json(br#"{"id": "a", "type": "bo"#).unwrap_err();
        assert!(matches!(err, RefError::Malformed { .. }));

        let err = Reference::from_json(br#"{"id": "a", "type": "no-such-type"}"#).unwrap_err();
        assert!(matches!(err, RefError::Malformed { ref path, .. } if path == "type"));

        let err = Reference::from_json(br#"{"type": "book"}"#).unwrap_err();
        assert!(matches!(err, RefError::Malformed { .. }));

        assert!(Reference::from_json(br#"["not", "an", "object"]"#).is_err());
        assert!(Reference::from_json(br#"{"id": "a", "type": "book"} trailing"#).is_err());
    }

    #[test]
    fn test_drops_malformed_variables() {
        let reference = Reference::from_json(
            br#"{"id": "a", "type": "book", "title": "Kept", "author": "not a list",
                 "issued": {"date-parts": "nope"}, "edition": null}"#,
        )
        .unwrap();
        assert_eq!(reference.standard(StandardVariable::Title), Some("Kept"));
        assert!(!reference.has_variable(Variable::Name(NameVariable::Author)));
        assert!(!reference.has_variable(Variable::Date(DateVariable::Issued)));
        assert!(!reference.has_variable(Variable::Number(NumberVariable::Edition)));
    }

    #[test]
    fn test_dates() {
        let parse = |json: &str| {
            let item = format!(r#"{{"id": "a", "type": "book", "issued": {json}}}"#);
            Reference::from_json(item.as_bytes())
                .unwrap()
                .date(DateVariable::Issued)
                .cloned()
        };

        let raw = parse(r#"{"raw": "2004-03/2004-05"}"#).unwrap();
        assert_eq!(raw.start, Some(FixedDate { year: 2004, month: Some(2), day: None }));
        assert_eq!(raw.end, Some(FixedDate { year: 2004, month: Some(4), day: None }));

        let range = parse(r#"{"date-parts": [[2020, 5, 3], [2020, 6, 5]]}"#).unwrap();
        assert_eq!(range.start, Some(FixedDate { year: 2020, month: Some(4), day: Some(2) }));
        assert_eq!(range.end, Some(FixedDate { year: 2020, month: Some(5), day: Some(4) }));

        let circa = parse(r#"{"date-parts": [["1850"]], "circa": 1}"#).unwrap();
        assert!(circa.is_uncertain());
        assert!(parse(r#""1850~""#).unwrap().is_uncertain());

        let season = parse(r#"{"date-parts": [[1999, 14]]}"#).unwrap();
        assert_eq!(season.season.as_deref(), Some("2"));
        assert_eq!(season.start, Some(FixedDate { year: 1999, month: None, day: None }));

        let bc = parse(r#""-0044""#).unwrap();
        assert_eq!(bc.start.unwrap().year, -44);

        let literal = parse(r#"{"literal": "Ides of March"}"#).unwrap();
        assert_eq!(literal.literal.as_deref(), Some("Ides of March"));
        assert_eq!(parse(r#""sometime""#).unwrap().literal.as_deref(), Some("sometime"));
    }

    #[test]
    fn test_numeric() {
        let numeric = |s: &str| NumberValue::Str(s.into()).is_numeric();
        assert!(numeric("12"));
        assert!(numeric("2nd"));
        assert!(numeric("L2"));
        assert!(numeric("12-14"));
        assert!(numeric("2, 3 & 5"));
        assert!(!numeric("second"));
        assert!(!numeric("12 14"));
        assert!(!numeric("A-"));
        assert!(NumberValue::Int(3).is_numeric());
        assert!(NumberValue::Str("1-3".into()).is_plural());
        assert!(!NumberValue::Int(3).is_plural());
    }
}
