use super::{Context, Decor, Rendered, Usage};
use crate::output::Fragment;
use crate::style::{Number, NumberForm, PageRangeFormat};
use crate::taxonomy::Term;
use crate::util::to_roman;

impl Context<'_> {
    pub(super) fn render_number(&mut self, number: &Number) -> Rendered {
        let var = number.variable;
        let Some(value) = self.reference.number(var).filter(|_| !self.is_suppressed(var.into()))
        else {
            return Rendered::empty();
        };

        let text = if !value.is_numeric() {
            value.to_string()
        } else {
            let gender = self.locale.gender(Term::NumberVariable(var));
            let segments = value.segments();
            let mut out = String::new();
            for (i, (segment, is_digit)) in segments.iter().enumerate() {
                // Numbers with letter affixes like `2nd` or `L2` are kept as written.
                let affixed = i.checked_sub(1).is_some_and(|j| ends_alphabetic(&segments[j].0))
                    || segments.get(i + 1).is_some_and(|(next, _)| starts_alphabetic(next));
                match (*is_digit && !affixed, segment.parse::<i64>()) {
                    (true, Ok(n)) => out.push_str(&self.format_int(n, number.form, gender)),
                    // Hyphens between numbers read as ranges.
                    (false, _) if segment.trim() == "-" => out.push('–'),
                    _ => out.push_str(segment),
                }
            }
            out
        };

        self.rendered_vars.push(var.into());
        let decor = Decor {
            text_case: number.text_case,
            display: number.display,
            ..Decor::new(&number.formatting, &number.affixes)
        };
        Rendered::new(self.decorate(vec![Fragment::Text(text)], &decor), Usage::Used)
    }

    fn format_int(
        &self,
        n: i64,
        form: NumberForm,
        gender: Option<crate::locale::GrammarGender>,
    ) -> String {
        match form {
            NumberForm::Numeric => n.to_string(),
            NumberForm::Ordinal => format!("{n}{}", self.locale.ordinal_suffix(n, gender)),
            NumberForm::LongOrdinal => match self.locale.long_ordinal(n, gender) {
                Some(word) => word.to_string(),
                None => format!("{n}{}", self.locale.ordinal_suffix(n, gender)),
            },
            NumberForm::Roman if (1..4000).contains(&n) => to_roman(n),
            NumberForm::Roman => n.to_string(),
        }
    }
}

fn ends_alphabetic(text: &str) -> bool {
    text.chars().next_back().is_some_and(char::is_alphabetic)
}

fn starts_alphabetic(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_alphabetic)
}

/// Reformat every `start-end` range in a page list.
pub(super) fn format_page_range(pages: &str, format: PageRangeFormat, delimiter: &str) -> String {
    pages
        .split(',')
        .map(|part| {
            let trimmed = part.trim();
            let lead = &part[..part.len() - part.trim_start().len()];
            let Some((start, end)) = trimmed.split_once(['-', '–']) else {
                return part.to_string();
            };
            let (start, end) = (start.trim(), end.trim().trim_start_matches(['-', '–']));
            let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
            if !digits(start) || !digits(end) {
                return format!("{lead}{start}{delimiter}{end}");
            }
            format!("{lead}{start}{delimiter}{}", collapse_range(start, end, format))
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// The end of a numeric page range in the given format.
fn collapse_range(start: &str, end: &str, format: PageRangeFormat) -> String {
    // Abbreviated ends like 321-8 are expanded to 328 first.
    let end = if end.len() < start.len() {
        format!("{}{end}", &start[..start.len() - end.len()])
    } else {
        end.to_string()
    };
    if start.len() != end.len() {
        return end;
    }

    let minimal = |keep: usize| {
        let common = start.bytes().zip(end.bytes()).take_while(|(a, b)| a == b).count();
        let cut = common.min(end.len().saturating_sub(keep));
        end[cut..].to_string()
    };

    let n: u32 = start.parse().unwrap_or(0);
    match format {
        PageRangeFormat::Expanded => end,
        PageRangeFormat::Minimal => minimal(1),
        PageRangeFormat::MinimalTwo => minimal(2),
        PageRangeFormat::Chicago | PageRangeFormat::Chicago16 if n < 100 || n % 100 == 0 => end,
        PageRangeFormat::Chicago | PageRangeFormat::Chicago16 if n % 100 < 10 => minimal(1),
        PageRangeFormat::Chicago16 => minimal(2),
        PageRangeFormat::Chicago => {
            let collapsed = minimal(2);
            if start.len() == 4 && collapsed.len() > 2 { end } else { collapsed }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{render, render_with};
    use super::*;

    #[test]
    fn test_number_forms() {
        let item = r#"{"id": "a", "type": "book", "edition": 2, "volume": "4", "issue": "1-3",
                       "number": "A12", "section": "twelve"}"#;
        assert_eq!(render(r#"<number variable="edition" form="ordinal"/>"#, item), "2nd");
        assert_eq!(render(r#"<number variable="edition" form="long-ordinal"/>"#, item), "second");
        assert_eq!(render(r#"<number variable="volume" form="roman"/>"#, item), "iv");
        assert_eq!(render(r#"<number variable="issue" form="ordinal"/>"#, item), "1st–3rd");
        assert_eq!(render(r#"<number variable="number"/>"#, item), "A12");
        assert_eq!(render(r#"<number variable="section" form="ordinal"/>"#, item), "twelve");
        assert_eq!(render(r#"<number variable="page"/>"#, item), "");
    }

    #[test]
    fn test_affixed_numbers_kept() {
        let item = r#"{"id": "a", "type": "book", "edition": "2nd", "volume": "L2"}"#;
        assert_eq!(render(r#"<number variable="edition" form="ordinal"/>"#, item), "2nd");
        assert_eq!(render(r#"<number variable="edition" form="long-ordinal"/>"#, item), "2nd");
        assert_eq!(render(r#"<number variable="volume" form="roman"/>"#, item), "L2");
    }

    #[test]
    fn test_page_range_formats() {
        let range = |pages, format| format_page_range(pages, format, "–");
        assert_eq!(range("321-28", PageRangeFormat::Expanded), "321–328");
        assert_eq!(range("321-328", PageRangeFormat::Minimal), "321–8");
        assert_eq!(range("321-328", PageRangeFormat::MinimalTwo), "321–28");
        assert_eq!(range("42-45", PageRangeFormat::MinimalTwo), "42–45");
        assert_eq!(range("71-72", PageRangeFormat::Chicago16), "71–72");
        assert_eq!(range("100-104", PageRangeFormat::Chicago16), "100–104");
        assert_eq!(range("101-108", PageRangeFormat::Chicago16), "101–8");
        assert_eq!(range("321-328", PageRangeFormat::Chicago16), "321–28");
        assert_eq!(range("1536-1538", PageRangeFormat::Chicago16), "1536–38");
        assert_eq!(range("1496-1504", PageRangeFormat::Chicago), "1496–1504");
        assert_eq!(range("1, 5-7, xi-xiv", PageRangeFormat::Expanded), "1, 5–7, xi–xiv");
    }

    #[test]
    fn test_page_range_in_text() {
        let style = r#"<style version="1.0" page-range-format="minimal">
            <citation><layout><text variable="page"/></layout></citation></style>"#;
        let item = r#"{"id": "a", "type": "book", "page": "1234-1239"}"#;
        assert_eq!(render_with(style, item), "1234–9");
    }
}
