use serde::de::value::Error as KeywordError;
use serde::de::{DeserializeOwned, IntoDeserializer};

use crate::style::TextCase;

/// Parse a CSL keyword such as `"article-journal"` or `"month-03"` through the
/// type's serde spelling.
pub(crate) fn from_keyword<T: DeserializeOwned>(value: &str) -> Result<T, KeywordError> {
    T::deserialize(value.into_deserializer())
}

/// Parse an XML boolean attribute.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Words that stay lowercase in English title case unless they open or close
/// the string.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "down", "for", "from", "in", "into", "nor",
    "of", "on", "onto", "or", "over", "so", "the", "till", "to", "up", "via", "with", "yet",
];

pub(crate) fn apply_text_case(text: &str, case: TextCase) -> String {
    match case {
        TextCase::Lowercase => text.to_lowercase(),
        TextCase::Uppercase => text.to_uppercase(),
        TextCase::CapitalizeFirst => capitalize_first(text),
        TextCase::CapitalizeAll => map_words(text, |_, word, _| capitalize_first(word)),
        TextCase::SentenceCase => {
            if is_all_uppercase(text) {
                capitalize_first(&text.to_lowercase())
            } else {
                capitalize_first(text)
            }
        }
        TextCase::TitleCase => {
            let owned;
            let text = if is_all_uppercase(text) {
                owned = text.to_lowercase();
                owned.as_str()
            } else {
                text
            };
            map_words(text, |first, word, last| {
                let lower = word.to_lowercase();
                if word != lower {
                    // Words with capitals carry intentional casing.
                    word.to_string()
                } else if !first && !last && STOP_WORDS.contains(&lower.as_str()) {
                    lower
                } else {
                    capitalize_first(word)
                }
            })
        }
    }
}

/// Uppercase the first alphabetic character.
pub(crate) fn capitalize_first(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut done = false;
    for c in text.chars() {
        if !done && c.is_alphabetic() {
            out.extend(c.to_uppercase());
            done = true;
        } else {
            out.push(c);
        }
    }
    out
}

pub(crate) fn strip_periods(text: &str) -> String {
    text.chars().filter(|&c| c != '.').collect()
}

fn is_all_uppercase(text: &str) -> bool {
    let mut letters = text.chars().filter(|c| c.is_alphabetic()).peekable();
    letters.peek().is_some() && letters.all(char::is_uppercase)
}

/// Rewrite each whitespace-separated word, preserving the whitespace.
///
/// The callback receives whether the word is the first and last one.
fn map_words<F>(text: &str, mut f: F) -> String
where
    F: FnMut(bool, &str, bool) -> String,
{
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    for (i, word) in words.iter().enumerate() {
        let Some(start) = rest.find(word) else { break };
        out.push_str(&rest[..start]);
        out.push_str(&f(i == 0, word, i + 1 == words.len()));
        rest = &rest[start + word.len()..];
    }
    out.push_str(rest);
    out
}

/// Convert a positive number to lowercase roman numerals. Numbers outside
/// `1..4000` are returned in arabic digits.
pub(crate) fn to_roman(mut n: i64) -> String {
    if !(1..4000).contains(&n) {
        return n.to_string();
    }
    const TABLE: [(i64, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut out = String::new();
    for (value, numeral) in TABLE {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(
            apply_text_case("the lord of the rings", TextCase::TitleCase),
            "The Lord of the Rings"
        );
        assert_eq!(
            apply_text_case("THE WAR OF THE WORLDS", TextCase::TitleCase),
            "The War of the Worlds"
        );
        assert_eq!(apply_text_case("an iPhone story", TextCase::TitleCase), "An iPhone Story");
    }

    #[test]
    fn test_other_cases() {
        assert_eq!(apply_text_case("hello world", TextCase::CapitalizeAll), "Hello World");
        assert_eq!(apply_text_case("hello  world", TextCase::CapitalizeFirst), "Hello  world");
        assert_eq!(apply_text_case("SHOUTING TITLE", TextCase::SentenceCase), "Shouting title");
        assert_eq!(apply_text_case("Mixed Case", TextCase::Uppercase), "MIXED CASE");
        assert_eq!(capitalize_first("“quoted”"), "“Quoted”");
    }

    #[test]
    fn test_roman() {
        assert_eq!(to_roman(4), "iv");
        assert_eq!(to_roman(1994), "mcmxciv");
        assert_eq!(to_roman(0), "0");
    }

    #[test]
    fn test_bool() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("false"), Some(false));
        assert_eq!(parse_bool("yes"), None);
    }
}
