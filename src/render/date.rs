use super::{Context, Decor, Rendered, Usage, apply_case, map_text};
use crate::output::Fragment;
use crate::reference::{DateValue, FixedDate};
use crate::style::{
    Affixes, Date, DateDayForm, DateMonthForm, DatePart, DatePartName, DateYearForm,
};
use crate::taxonomy::{OtherTerm, Term};
use crate::util::strip_periods;

/// The most significant field in which the ends of a range differ.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum RangeDiff {
    Year,
    Month,
    Day,
}

impl RangeDiff {
    fn between(start: &FixedDate, end: &FixedDate) -> Option<Self> {
        if start.year != end.year {
            Some(Self::Year)
        } else if start.month != end.month {
            Some(Self::Month)
        } else if start.day != end.day {
            Some(Self::Day)
        } else {
            None
        }
    }

    /// Whether a part shows a field that differs within the range.
    fn covers(self, name: &DatePartName) -> bool {
        match (self, name) {
            (Self::Year, _) => true,
            (Self::Month, DatePartName::Month { .. } | DatePartName::Day { .. }) => true,
            (Self::Day, DatePartName::Day { .. }) => true,
            _ => false,
        }
    }

    /// Whether a part makes the difference visible.
    fn visible_in(self, name: &DatePartName) -> bool {
        match self {
            Self::Year => self.is_field(name),
            Self::Month | Self::Day => self.covers(name),
        }
    }

    fn is_field(self, name: &DatePartName) -> bool {
        matches!(
            (self, name),
            (Self::Year, DatePartName::Year { .. })
                | (Self::Month, DatePartName::Month { .. })
                | (Self::Day, DatePartName::Day { .. })
        )
    }
}

impl Context<'_> {
    pub(super) fn render_date(&mut self, date: &Date) -> Rendered {
        let var = date.variable;
        let Some(value) = self.reference.date(var).filter(|_| !self.is_suppressed(var.into()))
        else {
            return Rendered::empty();
        };

        let (parts, delimiter) = self.date_parts(date);
        let fragments = match &value.start {
            Some(start) => self.render_date_value(value, start, &parts, delimiter.as_deref()),
            None => value.literal.iter().map(Fragment::text).collect(),
        };
        if fragments.iter().all(Fragment::is_empty) {
            return Rendered::empty();
        }

        self.rendered_vars.push(var.into());
        let decor = Decor {
            text_case: date.text_case,
            display: date.display,
            ..Decor::new(&date.formatting, &date.affixes)
        };
        Rendered::new(self.decorate(fragments, &decor), Usage::Used)
    }

    /// The parts to render and their delimiter. Localized dates take the
    /// locale's format and let the style override part attributes except the
    /// affixes.
    fn date_parts(&self, date: &Date) -> (Vec<DatePart>, Option<String>) {
        let Some(form) = date.form else {
            return (date.date_parts.clone(), date.delimiter.clone());
        };
        let Some(localized) = self.locale.date_format(form) else {
            let year = DatePart {
                name: DatePartName::Year { form: None },
                range_delimiter: None,
                formatting: Default::default(),
                affixes: Affixes::default(),
                strip_periods: false,
                text_case: None,
            };
            return (vec![year], None);
        };

        let parts = localized
            .parts
            .iter()
            .filter(|part| date.parts.includes(&part.name))
            .map(|part| {
                let Some(over) = date.date_parts.iter().find(|o| o.name.same_field(&part.name))
                else {
                    return part.clone();
                };
                DatePart {
                    name: merge_name(part.name, over.name),
                    range_delimiter: over.range_delimiter.clone().or(part.range_delimiter.clone()),
                    formatting: if over.formatting.is_empty() {
                        part.formatting
                    } else {
                        over.formatting
                    },
                    affixes: part.affixes.clone(),
                    strip_periods: part.strip_periods || over.strip_periods,
                    text_case: over.text_case.or(part.text_case),
                }
            })
            .collect();
        (parts, localized.delimiter.clone())
    }

    fn render_date_value(
        &self,
        value: &DateValue,
        start: &FixedDate,
        parts: &[DatePart],
        delimiter: Option<&str>,
    ) -> Vec<Fragment> {
        let season = value.season.as_deref();
        let diff = value.end.as_ref().and_then(|end| {
            let diff = RangeDiff::between(start, end)?;
            // Ranges in fields the format does not show collapse.
            parts.iter().any(|p| diff.visible_in(&p.name)).then_some((end, diff))
        });

        let Some((end, diff)) = diff else {
            let rendered: Vec<_> = parts.iter().map(|p| self.render_part(p, start, season)).collect();
            return self.join(rendered, delimiter.unwrap_or_default());
        };

        let range_delimiter = parts
            .iter()
            .find(|p| diff.is_field(&p.name))
            .and_then(|p| p.range_delimiter.as_deref())
            .unwrap_or(DatePart::DEFAULT_DELIMITER);

        if diff == RangeDiff::Year {
            let first: Vec<_> = parts.iter().map(|p| self.render_part(p, start, season)).collect();
            let second: Vec<_> = parts.iter().map(|p| self.render_part(p, end, None)).collect();
            let mut out = self.join(first, delimiter.unwrap_or_default());
            self.append(&mut out, range_delimiter);
            out.extend(self.join(second, delimiter.unwrap_or_default()));
            return out;
        }

        // Shared fields are printed once around the differing run.
        let first_diff = parts.iter().position(|p| diff.covers(&p.name)).unwrap_or(0);
        let last_diff = parts.iter().rposition(|p| diff.covers(&p.name)).unwrap_or(0);
        let run = &parts[first_diff..=last_diff];

        let mut pieces: Vec<Vec<Fragment>> = Vec::new();
        for part in &parts[..first_diff] {
            pieces.push(self.render_part(part, start, season));
        }

        let mut range = self.render_run(run, start, season, delimiter, Side::Start);
        self.append(&mut range, range_delimiter);
        range.extend(self.render_run(run, end, None, delimiter, Side::End));
        pieces.push(range);

        for part in &parts[last_diff + 1..] {
            pieces.push(self.render_part(part, start, season));
        }
        self.join(pieces, delimiter.unwrap_or_default())
    }

    /// Render a run of parts on one side of a range. The affixes facing the
    /// range delimiter are dropped.
    fn render_run(
        &self,
        run: &[DatePart],
        date: &FixedDate,
        season: Option<&str>,
        delimiter: Option<&str>,
        side: Side,
    ) -> Vec<Fragment> {
        let last = run.len().saturating_sub(1);
        let rendered = run
            .iter()
            .enumerate()
            .map(|(i, part)| {
                let mut part = part.clone();
                match side {
                    Side::Start if i == last => part.affixes.suffix = None,
                    Side::End if i == 0 => part.affixes.prefix = None,
                    _ => {}
                }
                self.render_part(&part, date, season)
            })
            .collect();
        self.join(rendered, delimiter.unwrap_or_default())
    }

    fn render_part(&self, part: &DatePart, date: &FixedDate, season: Option<&str>) -> Vec<Fragment> {
        let Some(text) = self.part_text(part, date, season) else {
            return Vec::new();
        };

        let mut content = vec![Fragment::Text(text)];
        if part.strip_periods {
            map_text(&mut content, &mut |text: &str| strip_periods(text));
        }
        if let Some(case) = part.text_case {
            apply_case(&mut content, case);
        }
        self.decorate(content, &Decor::new(&part.formatting, &part.affixes))
    }

    fn part_text(&self, part: &DatePart, date: &FixedDate, season: Option<&str>) -> Option<String> {
        match part.name {
            DatePartName::Year { form } => Some(self.year_text(date.year, form)),
            DatePartName::Month { form } => match date.month {
                Some(month) => self.month_text(month, form),
                None => season.and_then(|season| self.season_text(season)),
            },
            DatePartName::Day { form } => {
                let month = date.month?;
                let day = i64::from(date.day?) + 1;
                Some(match form.unwrap_or(DateDayForm::Numeric) {
                    DateDayForm::Numeric => day.to_string(),
                    DateDayForm::NumericLeadingZeros => format!("{day:02}"),
                    DateDayForm::Ordinal
                        if self.locale.limit_day_ordinals_to_day_1() && day != 1 =>
                    {
                        day.to_string()
                    }
                    DateDayForm::Ordinal => {
                        let gender = OtherTerm::month(month)
                            .and_then(|m| self.locale.gender(Term::Other(m)));
                        format!("{day}{}", self.locale.ordinal_suffix(day, gender))
                    }
                })
            }
        }
    }

    fn year_text(&self, year: i32, form: Option<DateYearForm>) -> String {
        let digits = match form.unwrap_or(DateYearForm::Long) {
            DateYearForm::Long => year.unsigned_abs().to_string(),
            DateYearForm::Short => format!("{:02}", year.unsigned_abs() % 100),
        };
        let era = |term| self.locale.term(Term::Other(term), Default::default(), false);
        match year {
            ..=-1 => format!("{digits}{}", era(OtherTerm::Bc).unwrap_or("BC")),
            // Negative years count BC, so zero belongs to neither era.
            0 => digits,
            1..=999 => format!("{digits}{}", era(OtherTerm::Ad).unwrap_or("AD")),
            _ => digits,
        }
    }

    fn month_text(&self, month: u8, form: Option<DateMonthForm>) -> Option<String> {
        let number = u32::from(month) + 1;
        match form.unwrap_or(DateMonthForm::Long) {
            DateMonthForm::Numeric => Some(number.to_string()),
            DateMonthForm::NumericLeadingZeros => Some(format!("{number:02}")),
            DateMonthForm::Long | DateMonthForm::Short => {
                let term = Term::Other(OtherTerm::month(month)?);
                let term_form = match form {
                    Some(DateMonthForm::Short) => crate::locale::TermForm::Short,
                    _ => crate::locale::TermForm::Long,
                };
                Some(self.locale.term(term, term_form, false).map_or_else(
                    || number.to_string(),
                    str::to_string,
                ))
            }
        }
    }

    /// Seasons given as 1 to 4 use the locale's season terms; anything else
    /// is printed as is.
    fn season_text(&self, season: &str) -> Option<String> {
        let term = season
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|n| OtherTerm::season(n.checked_sub(1)?));
        let text = match term {
            Some(term) => self.locale.term(Term::Other(term), Default::default(), false),
            None => Some(season),
        };
        text.map(str::to_string)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Side {
    Start,
    End,
}

/// Combine a localized part with a style override of the same field. The
/// override's form wins where it sets one.
fn merge_name(base: DatePartName, over: DatePartName) -> DatePartName {
    match (base, over) {
        (DatePartName::Day { form }, DatePartName::Day { form: over }) => {
            DatePartName::Day { form: over.or(form) }
        }
        (DatePartName::Month { form }, DatePartName::Month { form: over }) => {
            DatePartName::Month { form: over.or(form) }
        }
        (DatePartName::Year { form }, DatePartName::Year { form: over }) => {
            DatePartName::Year { form: over.or(form) }
        }
        (base, _) => base,
    }
}
