//! Rendering of a layout against a single reference.
//!
//! Every node renders into fragments plus a record of whether it called
//! variables and whether any of them had content. Groups use that record to
//! suppress themselves when all the variables they call are empty.

mod date;
mod names;
mod number;

use tracing::trace;

use crate::locale::Locale;
use crate::output::Fragment;
use crate::reference::Reference;
use crate::style::{
    Affixes, Choose, ChooseTest, Display, Formatting, Group, Label, LabelPluralize, Layout,
    RenderNode, StyleDocument, TestPosition, Text, TextCase, TextTarget, VariableForm,
    VariablelessLabel,
};
use crate::taxonomy::{NumberVariable, OtherTerm, Term, Variable};
use crate::util::{apply_text_case, capitalize_first, strip_periods};

/// Render `layout` for `reference`.
///
/// Missing data never fails: absent variables render nothing and groups that
/// only call absent variables vanish. The layout's children are concatenated;
/// its delimiter only separates cites from each other.
pub fn render_layout(
    style: &StyleDocument,
    layout: &Layout,
    reference: &Reference,
    locale: &Locale,
) -> Vec<Fragment> {
    let mut ctx = Context::new(style, layout, reference, locale);
    let rendered = ctx.render_children(&layout.children, None);
    ctx.decorate(rendered.fragments, &Decor::new(&layout.formatting, &layout.affixes))
}

/// Whether a subtree called variables, and whether any of them had content.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
enum Usage {
    /// No variable was called.
    #[default]
    None,
    /// Variables were called and all of them were empty.
    Empty,
    /// At least one called variable had content.
    Used,
}

impl Usage {
    fn of(present: bool) -> Self {
        if present { Self::Used } else { Self::Empty }
    }
}

/// The output of one node.
#[derive(Debug, Default)]
struct Rendered {
    fragments: Vec<Fragment>,
    usage: Usage,
}

impl Rendered {
    fn new(fragments: Vec<Fragment>, usage: Usage) -> Self {
        Self { fragments, usage }
    }

    /// A node that called a variable without content.
    fn empty() -> Self {
        Self::new(Vec::new(), Usage::Empty)
    }

    fn is_empty(&self) -> bool {
        self.fragments.iter().all(Fragment::is_empty)
    }
}

/// Presentation attributes shared by most rendering elements.
struct Decor<'a> {
    formatting: &'a Formatting,
    affixes: &'a Affixes,
    text_case: Option<TextCase>,
    strip_periods: bool,
    quotes: bool,
    display: Option<Display>,
}

impl<'a> Decor<'a> {
    fn new(formatting: &'a Formatting, affixes: &'a Affixes) -> Self {
        Self {
            formatting,
            affixes,
            text_case: None,
            strip_periods: false,
            quotes: false,
            display: None,
        }
    }
}

struct Context<'a> {
    style: &'a StyleDocument,
    layout: &'a Layout,
    reference: &'a Reference,
    locale: &'a Locale,
    /// Variables already consumed by a `<substitute>`.
    suppressed: Vec<Variable>,
    /// Variables with content rendered so far.
    rendered_vars: Vec<Variable>,
    /// Children that names inside a `<substitute>` inherit.
    inherited: Option<names::NamesChildren>,
}

impl<'a> Context<'a> {
    fn new(
        style: &'a StyleDocument,
        layout: &'a Layout,
        reference: &'a Reference,
        locale: &'a Locale,
    ) -> Self {
        Self {
            style,
            layout,
            reference,
            locale,
            suppressed: Vec::new(),
            rendered_vars: Vec::new(),
            inherited: None,
        }
    }

    fn render_children(&mut self, children: &[RenderNode], delimiter: Option<&str>) -> Rendered {
        let mut parts = Vec::with_capacity(children.len());
        let mut usage = Usage::None;
        for child in children {
            let rendered = self.render_node(child);
            usage = usage.max(rendered.usage);
            parts.push(rendered.fragments);
        }
        Rendered::new(self.join(parts, delimiter.unwrap_or_default()), usage)
    }

    fn render_node(&mut self, node: &RenderNode) -> Rendered {
        match node {
            RenderNode::Text(text) => self.render_text(text),
            RenderNode::Group(group) => self.render_group(group),
            RenderNode::Choose(choose) => self.render_choose(choose),
            RenderNode::Date(date) => self.render_date(date),
            RenderNode::Names(names) => self.render_names(names),
            RenderNode::Number(number) => self.render_number(number),
            RenderNode::Label(label) => self.render_label(label),
        }
    }

    fn render_text(&mut self, text: &Text) -> Rendered {
        let rendered = match &text.target {
            TextTarget::Value(value) => Rendered::new(vec![Fragment::text(value)], Usage::None),
            TextTarget::Term { term, form, plural } => {
                let value = self.locale.term(*term, *form, *plural).unwrap_or_default();
                Rendered::new(vec![Fragment::text(value)], Usage::None)
            }
            TextTarget::Macro(id) => match self.style.get_macro(*id) {
                Some(mac) => self.render_children(&mac.children, None),
                None => Rendered::default(),
            },
            TextTarget::Variable { var, form } => self.render_variable(*var, *form),
        };

        let decor = Decor {
            text_case: text.text_case,
            strip_periods: text.strip_periods,
            quotes: text.quotes,
            display: text.display,
            ..Decor::new(&text.formatting, &text.affixes)
        };
        Rendered::new(self.decorate(rendered.fragments, &decor), rendered.usage)
    }

    fn render_variable(&mut self, var: Variable, form: VariableForm) -> Rendered {
        if self.is_suppressed(var) {
            return Rendered::empty();
        }

        let value = match var {
            Variable::Standard(standard) => {
                let short = match form {
                    VariableForm::Short => standard
                        .short_form()
                        .and_then(|short| self.reference.standard(short)),
                    VariableForm::Long => None,
                };
                short.or_else(|| self.reference.standard(standard)).map(str::to_string)
            }
            Variable::Number(number) => self.reference.number(number).map(|value| {
                let text = value.to_string();
                match (number, self.style.page_range_format) {
                    (NumberVariable::Page, Some(format)) => {
                        number::format_page_range(&text, format, self.page_range_delimiter())
                    }
                    _ => text,
                }
            }),
            Variable::Date(_) | Variable::Name(_) => {
                trace!(?var, "variable cannot be rendered as text");
                None
            }
        };

        match value {
            Some(value) if !value.is_empty() => {
                self.rendered_vars.push(var);
                Rendered::new(vec![Fragment::Text(value)], Usage::Used)
            }
            _ => Rendered::empty(),
        }
    }

    fn render_group(&mut self, group: &Group) -> Rendered {
        let rendered = self.render_children(&group.children, group.delimiter.as_deref());
        if rendered.usage == Usage::Empty || rendered.is_empty() {
            // A suppressed group counts as an empty variable for its parent.
            let usage = if rendered.usage == Usage::None { Usage::None } else { Usage::Empty };
            return Rendered::new(Vec::new(), usage);
        }

        let decor = Decor {
            display: group.display,
            ..Decor::new(&group.formatting, &group.affixes)
        };
        Rendered::new(self.decorate(rendered.fragments, &decor), rendered.usage)
    }

    fn render_choose(&mut self, choose: &Choose) -> Rendered {
        for branch in &choose.branches {
            let results = branch.tests.iter().flat_map(|test| self.evaluate(test));
            if branch.match_.test(results.collect::<Vec<_>>().into_iter()) {
                return self.render_children(&branch.children, None);
            }
        }
        match &choose.otherwise {
            Some(children) => self.render_children(children, None),
            None => Rendered::default(),
        }
    }

    /// Evaluate one condition attribute. Each of its values is a separate
    /// condition.
    fn evaluate(&self, test: &ChooseTest) -> Vec<bool> {
        let reference = self.reference;
        match test {
            ChooseTest::Variable(vars) => {
                vars.iter().map(|&v| !self.is_suppressed(v) && reference.has_variable(v)).collect()
            }
            ChooseTest::Type(kinds) => kinds.iter().map(|&k| reference.kind == k).collect(),
            ChooseTest::IsNumeric(vars) => vars.iter().map(|&v| reference.is_numeric(v)).collect(),
            ChooseTest::IsUncertainDate(vars) => vars
                .iter()
                .map(|&v| reference.date(v).is_some_and(|d| d.is_uncertain()))
                .collect(),
            // A single reference is always cited first, without a locator.
            ChooseTest::Position(positions) => {
                positions.iter().map(|&p| p == TestPosition::First).collect()
            }
            ChooseTest::Locator(locators) => vec![false; locators.len()],
            ChooseTest::Disambiguate(value) => vec![!value],
        }
    }

    fn render_label(&mut self, label: &Label) -> Rendered {
        let var = label.variable;
        let Some(value) = self.reference.number(var).filter(|_| !self.is_suppressed(var.into()))
        else {
            return Rendered::empty();
        };

        let plural = match label.label.plural {
            LabelPluralize::Always => true,
            LabelPluralize::Never => false,
            LabelPluralize::Contextual if Variable::from(var).is_number_of_variable() => {
                value.as_int().is_some_and(|n| n > 1)
            }
            LabelPluralize::Contextual => value.is_plural(),
        };

        let fragments = self.render_term_label(Term::NumberVariable(var), plural, &label.label);
        Rendered::new(fragments, Usage::Used)
    }

    /// Render the term that labels a variable.
    fn render_term_label(
        &self,
        term: Term,
        plural: bool,
        label: &VariablelessLabel,
    ) -> Vec<Fragment> {
        let Some(text) = self.locale.term(term, label.form.into(), plural) else {
            return Vec::new();
        };
        let decor = Decor {
            text_case: label.text_case,
            strip_periods: label.strip_periods,
            ..Decor::new(&label.formatting, &label.affixes)
        };
        self.decorate(vec![Fragment::text(text)], &decor)
    }

    fn is_suppressed(&self, var: Variable) -> bool {
        self.suppressed.contains(&var)
    }

    fn page_range_delimiter(&self) -> &str {
        self.locale
            .term(Term::Other(OtherTerm::PageRangeDelimiter), Default::default(), false)
            .unwrap_or("–")
    }

    /// Apply text case, periods, quotes, formatting, affixes and display, in
    /// this order from the inside out.
    fn decorate(&self, mut content: Vec<Fragment>, decor: &Decor) -> Vec<Fragment> {
        if content.iter().all(Fragment::is_empty) {
            return Vec::new();
        }

        if decor.strip_periods {
            map_text(&mut content, &mut |text: &str| strip_periods(text));
        }
        if let Some(case) = decor.text_case {
            apply_case(&mut content, case);
        }
        if decor.quotes {
            content = vec![self.quote(content)];
        }
        if !decor.formatting.is_empty() {
            content = vec![Fragment::Formatted { formatting: *decor.formatting, children: content }];
        }

        let mut out = Vec::with_capacity(content.len() + 2);
        if let Some(prefix) = decor.affixes.prefix.as_deref().filter(|p| !p.is_empty()) {
            out.push(Fragment::text(prefix));
        }
        out.extend(content);
        if let Some(suffix) = decor.affixes.suffix.as_deref() {
            self.append(&mut out, suffix);
        }

        match decor.display {
            Some(display) => vec![Fragment::Block { display, children: out }],
            None => out,
        }
    }

    /// Wrap `children` in quotation marks. Quotes already inside alternate
    /// between the inner and outer marks.
    fn quote(&self, mut children: Vec<Fragment>) -> Fragment {
        self.nest_quotes(&mut children, 1);
        let (open, close) = self.quote_marks(0);
        Fragment::Quoted { open, close, children }
    }

    fn nest_quotes(&self, fragments: &mut [Fragment], depth: usize) {
        for fragment in fragments {
            match fragment {
                Fragment::Quoted { open, close, children } => {
                    (*open, *close) = self.quote_marks(depth);
                    self.nest_quotes(children, depth + 1);
                }
                Fragment::Formatted { children, .. } | Fragment::Block { children, .. } => {
                    self.nest_quotes(children, depth)
                }
                Fragment::Text(_) => {}
            }
        }
    }

    fn quote_marks(&self, depth: usize) -> (String, String) {
        let (open, close, defaults) = if depth % 2 == 0 {
            (OtherTerm::OpenQuote, OtherTerm::CloseQuote, ("“", "”"))
        } else {
            (OtherTerm::OpenInnerQuote, OtherTerm::CloseInnerQuote, ("‘", "’"))
        };
        let term = |t, default| {
            self.locale.term(Term::Other(t), Default::default(), false).unwrap_or(default)
        };
        (term(open, defaults.0).to_string(), term(close, defaults.1).to_string())
    }

    /// Join non-empty parts with `delimiter`.
    fn join(&self, parts: Vec<Vec<Fragment>>, delimiter: &str) -> Vec<Fragment> {
        let mut out = Vec::new();
        for part in parts.into_iter().filter(|p| !p.iter().all(Fragment::is_empty)) {
            if !out.is_empty() {
                self.append(&mut out, delimiter);
            }
            out.extend(part);
        }
        out
    }

    /// Append trailing punctuation or delimiters. Commas and periods move into
    /// a preceding closing quote if the locale asks for it, and a period never
    /// doubles up another terminal mark.
    fn append(&self, out: &mut Vec<Fragment>, text: &str) {
        if text.is_empty() {
            return;
        }

        let mut text = text;
        if text.starts_with('.')
            && out.iter().rev().find_map(Fragment::last_char).is_some_and(|c| {
                matches!(c, '.' | '?' | '!')
            })
        {
            text = &text[1..];
        }

        if self.locale.punctuation_in_quote() && (text.starts_with(',') || text.starts_with('.'))
        {
            if let Some(last) = out.iter_mut().rev().find(|f| !f.is_empty()) {
                if last.ends_with_quote() {
                    let (mark, rest) = text.split_at(1);
                    last.push_into_quote(mark);
                    text = rest;
                }
            }
        }

        if !text.is_empty() {
            out.push(Fragment::text(text));
        }
    }
}

/// Apply `f` to every text fragment.
fn map_text(fragments: &mut [Fragment], f: &mut dyn FnMut(&str) -> String) {
    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => *text = f(text),
            Fragment::Formatted { children, .. }
            | Fragment::Quoted { children, .. }
            | Fragment::Block { children, .. } => map_text(children, f),
        }
    }
}

/// Apply a text case. Cases that only touch the start of the text change the
/// first non-empty text fragment.
fn apply_case(fragments: &mut [Fragment], case: TextCase) {
    match case {
        TextCase::CapitalizeFirst | TextCase::SentenceCase => {
            let mut done = false;
            map_text(fragments, &mut |text: &str| {
                if done || text.trim().is_empty() {
                    return text.to_string();
                }
                done = true;
                match case {
                    TextCase::CapitalizeFirst => capitalize_first(text),
                    _ => apply_text_case(text, case),
                }
            });
        }
        _ => map_text(fragments, &mut |text: &str| apply_text_case(text, case)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::builtin_locale;
    use crate::output::plain_text;

    pub(super) fn render_with(style: &str, reference: &str) -> String {
        let style = StyleDocument::parse(style.as_bytes()).unwrap();
        let reference = Reference::from_json(reference.as_bytes()).unwrap();
        let locale = builtin_locale().unwrap();
        plain_text(&render_layout(&style, &style.citation, &reference, locale))
    }

    pub(super) fn render(layout: &str, reference: &str) -> String {
        render_with(
            &format!(r#"<style version="1.0"><citation><layout>{layout}</layout></citation></style>"#),
            reference,
        )
    }

    const BOOK: &str = r#"{"id": "a", "type": "book", "title": "the title",
        "publisher": "Pub", "page": "10-12", "volume": 3}"#;

    #[test]
    fn test_text() {
        assert_eq!(render(r#"<text variable="title"/>"#, BOOK), "the title");
        assert_eq!(
            render(r#"<text variable="title" text-case="capitalize-all" prefix="[" suffix="]"/>"#, BOOK),
            "[The Title]"
        );
        assert_eq!(render(r#"<text value="Dr. No" strip-periods="true"/>"#, BOOK), "Dr No");
        assert_eq!(render(r#"<text term="edition" plural="true"/>"#, BOOK), "editions");
        assert_eq!(render(r#"<text variable="edition" prefix="x"/>"#, BOOK), "");
    }

    #[test]
    fn test_short_form_falls_back() {
        let item = r#"{"id": "a", "type": "book", "title": "Long", "container-title": "Journal",
                       "container-title-short": "J."}"#;
        assert_eq!(render(r#"<text variable="title" form="short"/>"#, item), "Long");
        assert_eq!(render(r#"<text variable="container-title" form="short"/>"#, item), "J.");
    }

    #[test]
    fn test_group_suppression() {
        let layout = r#"<group delimiter=" "><text value="Vol."/><text variable="edition"/></group>"#;
        assert_eq!(render(layout, BOOK), "");

        let layout = r#"<group delimiter=" "><text value="Vol."/><text variable="volume"/></group>"#;
        assert_eq!(render(layout, BOOK), "Vol. 3");

        let layout = r#"<group delimiter=", "><text term="in"/><text value="always"/></group>"#;
        assert_eq!(render(layout, BOOK), "in, always");

        let nested = r#"<group delimiter=": ">
            <text value="Outer"/>
            <group><text value="inner"/><text variable="edition"/></group>
        </group>"#;
        assert_eq!(render(nested, BOOK), "");
    }

    #[test]
    fn test_choose() {
        let layout = r#"<choose>
            <if type="article-journal chapter" match="any"><text value="a"/></if>
            <else-if variable="title edition" match="all"><text value="b"/></else-if>
            <else-if variable="title edition" match="none"><text value="c"/></else-if>
            <else-if position="first" is-numeric="volume"><text value="d"/></else-if>
            <else><text value="e"/></else>
        </choose>"#;
        assert_eq!(render(layout, BOOK), "d");

        let layout = r#"<choose><if locator="page"><text value="x"/></if>
            <else-if disambiguate="true"><text value="y"/></else-if></choose>"#;
        assert_eq!(render(layout, BOOK), "");
    }

    #[test]
    fn test_quotes_and_punctuation() {
        let layout = r#"<text variable="title" quotes="true" suffix=","/><text value=" next"/>"#;
        assert_eq!(render(layout, BOOK), "“the title,” next");

        let layout = r#"<group delimiter=". "><text variable="title" quotes="true"/>
            <text variable="publisher"/></group>"#;
        assert_eq!(render(layout, BOOK), "“the title.” Pub");

        let layout = r#"<text value="Inc." suffix="."/>"#;
        assert_eq!(render(layout, BOOK), "Inc.");
    }

    #[test]
    fn test_macros_and_layout_affixes() {
        let style = r#"<style version="1.0">
            <macro name="title"><text variable="title" font-style="italic"/></macro>
            <citation><layout prefix="(" suffix=")">
                <group delimiter="; ">
                  <text macro="title" text-case="uppercase"/>
                  <text variable="publisher"/>
                </group>
            </layout></citation>
        </style>"#;
        assert_eq!(render_with(style, BOOK), "(THE TITLE; Pub)");
    }

    #[test]
    fn test_layout_delimiter_separates_cites_only() {
        let style = r#"<style version="1.0"><citation><layout delimiter="; ">
            <text variable="title"/><text variable="publisher" prefix=" "/>
        </layout></citation></style>"#;
        let item = r#"{"id": "a", "type": "book", "title": "T", "publisher": "P"}"#;
        assert_eq!(render_with(style, item), "T P");
    }

    #[test]
    fn test_label() {
        assert_eq!(render(r#"<label variable="page" form="short" suffix=" "/><text variable="page"/>"#, BOOK), "pp. 10-12");
        let item = r#"{"id": "a", "type": "book", "number-of-pages": 1}"#;
        assert_eq!(render(r#"<label variable="number-of-pages"/>"#, item), "page");
        assert_eq!(render(r#"<label variable="volume" plural="always"/>"#, BOOK), "volumes");
    }
}
