//! The style model.
//!
//! A CSL style is parsed once into a [`StyleDocument`]: the citation and
//! bibliography layouts, the macro table, and the style's locale overrides.
//! Macro references are linked to [`MacroId`]s while parsing, so rendering
//! never looks a macro up by name.

mod macros;
mod parse;

use serde::Deserialize;

pub(crate) use parse::parse_date_part;

use crate::error::StyleError;
use crate::locale::{Locale, LocaleCode, TermForm};
use crate::taxonomy::{
    DateVariable, Kind, Locator, NameVariable, NumberVariable, OtherTerm, Term, Variable,
};

/// A parsed independent CSL style.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDocument {
    /// Metadata from `<info>`.
    pub info: StyleInfo,
    /// How the citations are displayed.
    pub class: StyleClass,
    /// The locale the style asks for when the caller does not override it.
    pub default_locale: Option<LocaleCode>,
    /// The layout for citations.
    pub citation: Layout,
    /// The layout for bibliography entries, if the style has one.
    pub bibliography: Option<Layout>,
    /// Macros, addressed by [`MacroId`].
    pub macros: Vec<Macro>,
    /// `<locale>` blocks embedded in the style.
    pub locales: Vec<Locale>,
    /// Name options set on `<style>`.
    pub name_options: InheritableNameOptions,
    /// How to reformat page ranges.
    pub page_range_format: Option<PageRangeFormat>,
    /// How to treat the non-dropping particle of names.
    pub demote_non_dropping_particle: DemoteNonDroppingParticle,
    /// Whether to keep hyphens in initialized given names.
    pub initialize_with_hyphen: bool,
}

impl StyleDocument {
    /// Parse a CSL style from UTF-8 XML.
    pub fn parse(bytes: &[u8]) -> Result<Self, StyleError> {
        parse::parse_style(bytes)
    }

    /// Get a macro by its linked id.
    pub fn get_macro(&self, id: MacroId) -> Option<&Macro> {
        self.macros.get(id.0)
    }

    /// Find the id of a macro by name.
    pub fn macro_id(&self, name: &str) -> Option<MacroId> {
        self.macros.iter().position(|m| m.name == name).map(MacroId)
    }
}

/// Style metadata.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct StyleInfo {
    /// The style's URI.
    pub id: Option<String>,
    /// The human-readable name.
    pub title: Option<String>,
}

/// Index of a macro in [`StyleDocument::macros`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MacroId(pub(crate) usize);

impl MacroId {
    /// The position of the macro in the macro table.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A reusable set of formatting instructions.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Macro {
    /// The name of the macro.
    pub name: String,
    /// The formatting instructions.
    pub children: Vec<RenderNode>,
}

/// How the citations are displayed.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleClass {
    /// Citations are inlined in the text.
    #[default]
    InText,
    /// Citations are displayed in foot- or endnotes.
    Note,
}

/// How to reformat page ranges.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageRangeFormat {
    /// “321–28”
    #[serde(alias = "chicago-15")]
    Chicago,
    /// “321–28”, with the 2017 rules for four digit numbers.
    #[serde(rename = "chicago-16")]
    Chicago16,
    /// “321–328”
    Expanded,
    /// “321–8”
    Minimal,
    /// “321–28”
    MinimalTwo,
}

/// How to treat the non-dropping name particle.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DemoteNonDroppingParticle {
    /// Treat as part of the family name.
    Never,
    /// Treat as part of the family name except when sorting.
    SortOnly,
    /// Treat as part of the given name when the name is inverted.
    #[default]
    DisplayAndSort,
}

/// A formatting rule for citations or bibliography entries.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct Layout {
    /// Parts of the rule.
    pub children: Vec<RenderNode>,
    /// Override formatting style.
    pub formatting: Formatting,
    /// Add prefix and suffix.
    pub affixes: Affixes,
    /// Separates cites in a citation. Never used within a single cite.
    pub delimiter: Option<String>,
    /// Name options of `<style>` combined with those of the enclosing
    /// `<citation>` or `<bibliography>`.
    pub name_options: InheritableNameOptions,
}

/// A node of a layout.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum RenderNode {
    /// Print a term, variable, value or macro.
    Text(Text),
    /// A group that disappears when its variables are empty.
    Group(Group),
    /// A conditional.
    Choose(Choose),
    /// Format a date variable.
    Date(Date),
    /// Format name variables.
    Names(Names),
    /// Format a number variable.
    Number(Number),
    /// Print the term for a number variable.
    Label(Label),
}

/// Print a term or variable.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Text {
    /// The term or variable to print.
    pub target: TextTarget,
    /// Override formatting style.
    pub formatting: Formatting,
    /// Add prefix and suffix.
    pub affixes: Affixes,
    /// Set layout level.
    pub display: Option<Display>,
    /// Whether to wrap this text in quotes.
    pub quotes: bool,
    /// Remove periods from the output.
    pub strip_periods: bool,
    /// Transform the text case.
    pub text_case: Option<TextCase>,
}

/// Various kinds of text targets.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum TextTarget {
    /// Prints the value of a variable.
    Variable {
        /// The variable.
        var: Variable,
        /// Whether to print the short form.
        form: VariableForm,
    },
    /// Prints the text output of a macro.
    Macro(MacroId),
    /// Prints a localized term.
    Term {
        /// The term.
        term: Term,
        /// Its variant.
        form: TermForm,
        /// Whether to print the plural.
        plural: bool,
    },
    /// Prints a given string.
    Value(String),
}

/// Which form of a variable to print.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariableForm {
    /// The full value.
    #[default]
    Long,
    /// The abbreviated value, falling back to the full one.
    Short,
}

/// Formats a date.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Date {
    /// The date to format.
    pub variable: DateVariable,
    /// Use a localized date format.
    pub form: Option<DateForm>,
    /// Which parts of the localized date should be included.
    pub parts: DateParts,
    /// Parts in display order for custom dates; overrides of the localized
    /// parts otherwise.
    pub date_parts: Vec<DatePart>,
    /// Override formatting style.
    pub formatting: Formatting,
    /// Add prefix and suffix.
    pub affixes: Affixes,
    /// Delimit the parts of a custom date.
    pub delimiter: Option<String>,
    /// Set layout level.
    pub display: Option<Display>,
    /// Transform the text case.
    pub text_case: Option<TextCase>,
}

/// Localized date formats.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateForm {
    /// “12-15-2005”
    Numeric,
    /// “December 15, 2005”
    Text,
}

/// Which parts of a date should be included.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[allow(missing_docs)]
#[serde(rename_all = "kebab-case")]
pub enum DateParts {
    Year,
    YearMonth,
    #[default]
    YearMonthDay,
}

impl DateParts {
    /// Whether a part of this name is shown.
    pub fn includes(self, name: &DatePartName) -> bool {
        match name {
            DatePartName::Year { .. } => true,
            DatePartName::Month { .. } => self != Self::Year,
            DatePartName::Day { .. } => self == Self::YearMonthDay,
        }
    }
}

/// One part of a date.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DatePart {
    /// Kind of the date part.
    pub name: DatePartName,
    /// The string used to delimit two date parts in a range.
    pub range_delimiter: Option<String>,
    /// Override formatting style.
    pub formatting: Formatting,
    /// Add prefix and suffix.
    pub affixes: Affixes,
    /// Remove periods from the date part.
    pub strip_periods: bool,
    /// Transform the text case.
    pub text_case: Option<TextCase>,
}

impl DatePart {
    /// The range delimiter when none is set.
    pub const DEFAULT_DELIMITER: &str = "–";
}

/// The kind of a date part with its `form` attribute.
#[allow(missing_docs)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DatePartName {
    Day { form: Option<DateDayForm> },
    Month { form: Option<DateMonthForm> },
    Year { form: Option<DateYearForm> },
}

impl DatePartName {
    /// Whether two parts format the same field.
    pub fn same_field(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// How a day is formatted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateDayForm {
    /// “1”
    Numeric,
    /// “01”
    NumericLeadingZeros,
    /// “1st”
    Ordinal,
}

/// How a month is formatted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateMonthForm {
    /// “January”
    Long,
    /// “Jan.”
    Short,
    /// “1”
    Numeric,
    /// “01”
    NumericLeadingZeros,
}

/// How a year is formatted.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateYearForm {
    /// “2005”
    Long,
    /// “05”
    Short,
}

/// Renders a number.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Number {
    /// The variable whose value is used.
    pub variable: NumberVariable,
    /// How the number is formatted.
    pub form: NumberForm,
    /// Override formatting style.
    pub formatting: Formatting,
    /// Add prefix and suffix.
    pub affixes: Affixes,
    /// Set layout level.
    pub display: Option<Display>,
    /// Transform the text case.
    pub text_case: Option<TextCase>,
}

/// How a number is formatted.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NumberForm {
    /// “1”
    #[default]
    Numeric,
    /// “1st”
    Ordinal,
    /// “first”
    LongOrdinal,
    /// “i”
    Roman,
}

/// Renders a list of names.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Names {
    /// The variables whose values are used.
    pub variables: Vec<NameVariable>,
    /// How the names are formatted. `None` inside `<substitute>` means the
    /// settings of the substituted `<names>` apply.
    pub name: Option<Name>,
    /// Configuration of the et al. abbreviation.
    pub et_al: Option<EtAl>,
    /// Substitutions in case all variables are empty.
    pub substitute: Option<Vec<RenderNode>>,
    /// Label for the names.
    pub label: Option<NamesLabel>,
    /// Delimiter between the lists of different variables.
    pub delimiter: Option<String>,
    /// Override formatting style.
    pub formatting: Formatting,
    /// Add prefix and suffix.
    pub affixes: Affixes,
    /// Set layout level.
    pub display: Option<Display>,
}

/// The label of a `<names>` element.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct NamesLabel {
    /// How the label is printed.
    pub label: VariablelessLabel,
    /// Whether the label follows the names instead of preceding them.
    pub after_name: bool,
}

/// Configuration of how to print names.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct Name {
    /// Options for this name. Unset options are inherited.
    pub options: InheritableNameOptions,
    /// Formatting of the given name part.
    pub given: NamePart,
    /// Formatting of the family name part.
    pub family: NamePart,
    /// Override formatting style.
    pub formatting: Formatting,
    /// Add prefix and suffix.
    pub affixes: Affixes,
}

/// Name options that `<style>`, `<citation>` and `<bibliography>` pass down
/// to `<name>`. Every field is optional so that levels can be layered.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct InheritableNameOptions {
    /// Delimiter between second-to-last and last name.
    pub and: Option<NameAnd>,
    /// Delimiter between names.
    pub delimiter: Option<String>,
    /// Delimiter between name lists of different variables.
    pub names_delimiter: Option<String>,
    /// Delimiter before et al.
    pub delimiter_precedes_et_al: Option<DelimiterBehavior>,
    /// Whether to use the delimiter before the last name.
    pub delimiter_precedes_last: Option<DelimiterBehavior>,
    /// Minimum number of names to use et al.
    pub et_al_min: Option<usize>,
    /// Number of names shown before et al.
    pub et_al_use_first: Option<usize>,
    /// Minimum number of names to use et al. for repeated citations.
    pub et_al_subsequent_min: Option<usize>,
    /// Number of names shown before et al. for repeated citations.
    pub et_al_subsequent_use_first: Option<usize>,
    /// Whether to end a truncated list with the last name.
    pub et_al_use_last: Option<bool>,
    /// Which name parts to display for personal names.
    pub form: Option<NameForm>,
    /// Whether to initialize given names when `initialize_with` is set.
    pub initialize: Option<bool>,
    /// String to follow each initial with.
    pub initialize_with: Option<String>,
    /// Whether to turn names around.
    pub name_as_sort_order: Option<NameAsSortOrder>,
    /// Delimiter between the inverted name parts.
    pub sort_separator: Option<String>,
}

impl InheritableNameOptions {
    /// Layer `child` on top of these options. Options set in `child` win.
    pub fn apply(&self, child: &Self) -> Self {
        fn pick<T: Clone>(parent: &Option<T>, child: &Option<T>) -> Option<T> {
            child.clone().or_else(|| parent.clone())
        }

        Self {
            and: pick(&self.and, &child.and),
            delimiter: pick(&self.delimiter, &child.delimiter),
            names_delimiter: pick(&self.names_delimiter, &child.names_delimiter),
            delimiter_precedes_et_al: pick(
                &self.delimiter_precedes_et_al,
                &child.delimiter_precedes_et_al,
            ),
            delimiter_precedes_last: pick(
                &self.delimiter_precedes_last,
                &child.delimiter_precedes_last,
            ),
            et_al_min: pick(&self.et_al_min, &child.et_al_min),
            et_al_use_first: pick(&self.et_al_use_first, &child.et_al_use_first),
            et_al_subsequent_min: pick(&self.et_al_subsequent_min, &child.et_al_subsequent_min),
            et_al_subsequent_use_first: pick(
                &self.et_al_subsequent_use_first,
                &child.et_al_subsequent_use_first,
            ),
            et_al_use_last: pick(&self.et_al_use_last, &child.et_al_use_last),
            form: pick(&self.form, &child.form),
            initialize: pick(&self.initialize, &child.initialize),
            initialize_with: pick(&self.initialize_with, &child.initialize_with),
            name_as_sort_order: pick(&self.name_as_sort_order, &child.name_as_sort_order),
            sort_separator: pick(&self.sort_separator, &child.sort_separator),
        }
    }
}

/// How to render the delimiter before the last name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameAnd {
    /// Use the localized "and" term.
    Text,
    /// Use the ampersand character.
    Symbol,
}

/// When delimiters shall be inserted.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DelimiterBehavior {
    /// Only used for lists with more than one (`-precedes-et-al`) or two
    /// (`-precedes-last`) names.
    #[default]
    Contextual,
    /// Only use if the preceding name is inverted (per `name-as-sort-order`).
    AfterInvertedName,
    /// Always use the delimiter for this condition.
    Always,
    /// Never use the delimiter for this condition.
    Never,
}

/// How many name parts to print.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameForm {
    /// Print all name parts
    #[default]
    Long,
    /// Print only the family name part and non-dropping-particle.
    Short,
    /// Count the total number of names.
    Count,
}

/// In which order to print the names.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameAsSortOrder {
    /// Only the first name is turned around.
    First,
    /// All names are turned around.
    All,
}

/// How to format a given name part.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct NamePart {
    /// Override formatting style.
    pub formatting: Formatting,
    /// Add prefix and suffix.
    pub affixes: Affixes,
    /// Transform the text case.
    pub text_case: Option<TextCase>,
}

/// Configure the et al. abbreviation.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct EtAl {
    /// Which term to use.
    pub term: EtAlTerm,
    /// Override formatting style.
    pub formatting: Formatting,
}

/// Which term to use for et al.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
pub enum EtAlTerm {
    /// “et al.”
    #[default]
    #[serde(rename = "et-al", alias = "et al")]
    EtAl,
    /// “and others”
    #[serde(rename = "and others", alias = "and-others")]
    AndOthers,
}

impl From<EtAlTerm> for Term {
    fn from(term: EtAlTerm) -> Self {
        match term {
            EtAlTerm::EtAl => Term::Other(OtherTerm::EtAl),
            EtAlTerm::AndOthers => Term::Other(OtherTerm::AndOthers),
        }
    }
}

/// Print a label for a number variable.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Label {
    /// The variable for which to print the label.
    pub variable: NumberVariable,
    /// The form of the label.
    pub label: VariablelessLabel,
}

/// A label without its variable.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct VariablelessLabel {
    /// What variant of label is chosen.
    pub form: LabelForm,
    /// How to pluralize the label.
    pub plural: LabelPluralize,
    /// Override formatting style.
    pub formatting: Formatting,
    /// Add prefix and suffix.
    pub affixes: Affixes,
    /// Transform the text case.
    pub text_case: Option<TextCase>,
    /// Remove periods from the output.
    pub strip_periods: bool,
}

/// Which variant of a label to use.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelForm {
    /// “page”
    #[default]
    Long,
    /// “p.”
    Short,
    /// “§”/”§§” for `section`
    Symbol,
    /// “edited by”
    Verb,
    /// “ed. by”
    VerbShort,
}

impl From<LabelForm> for TermForm {
    fn from(form: LabelForm) -> Self {
        match form {
            LabelForm::Long => TermForm::Long,
            LabelForm::Short => TermForm::Short,
            LabelForm::Symbol => TermForm::Symbol,
            LabelForm::Verb => TermForm::Verb,
            LabelForm::VerbShort => TermForm::VerbShort,
        }
    }
}

/// How to pluralize a label.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPluralize {
    /// Match plurality of the variable.
    #[default]
    Contextual,
    /// Always use the plural form.
    Always,
    /// Always use the singular form.
    Never,
}

/// A group of formatting instructions that is only shown if no variable is
/// referenced or at least one referenced variable is populated.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct Group {
    /// The formatting instructions.
    pub children: Vec<RenderNode>,
    /// Override formatting style.
    pub formatting: Formatting,
    /// Add prefix and suffix.
    pub affixes: Affixes,
    /// Delimit pieces of the output.
    pub delimiter: Option<String>,
    /// Set layout level.
    pub display: Option<Display>,
}

/// A conditional group of formatting instructions.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct Choose {
    /// The `<if>` and `<else-if>` branches. The first matching branch is used.
    pub branches: Vec<ChooseBranch>,
    /// The formatting instructions to use if no branch matches.
    pub otherwise: Option<Vec<RenderNode>>,
}

/// A single branch of a conditional group.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ChooseBranch {
    /// The conditions of the branch.
    pub tests: Vec<ChooseTest>,
    /// How to combine the conditions.
    pub match_: ChooseMatch,
    /// The formatting instructions to use if the condition matches.
    pub children: Vec<RenderNode>,
}

/// A single test in a conditional group. A test with several values counts
/// as one condition per value.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ChooseTest {
    /// Whether the element would disambiguate otherwise identical cites.
    Disambiguate(bool),
    /// The variable contains numeric data.
    IsNumeric(Vec<Variable>),
    /// The variable contains an approximate date.
    IsUncertainDate(Vec<DateVariable>),
    /// The locator matches the given type.
    Locator(Vec<Locator>),
    /// Tests the position of this citation in the citations to the same item.
    Position(Vec<TestPosition>),
    /// Tests whether the item is of a certain type.
    Type(Vec<Kind>),
    /// Tests whether the default form of this variable is non-empty.
    Variable(Vec<Variable>),
}

/// Possible positions of a citation in the citations to the same item.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestPosition {
    /// The first citation to the item.
    First,
    /// Previously cited.
    Subsequent,
    /// Directly following a citation to the same item, locators may differ.
    IbidWithLocator,
    /// Directly following a citation to the same item with the same locator.
    Ibid,
    /// Other citation within `near-note-distance` of the same item.
    NearNote,
}

/// How to handle the set of tests in a conditional group.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChooseMatch {
    /// All tests must match.
    #[default]
    All,
    /// At least one test must match.
    Any,
    /// No test must match.
    None,
}

impl ChooseMatch {
    /// Combine the results of the individual tests.
    pub fn test(self, mut results: impl Iterator<Item = bool>) -> bool {
        match self {
            Self::All => results.all(|r| r),
            Self::Any => results.any(|r| r),
            Self::None => !results.any(|r| r),
        }
    }
}

/// Formatting properties.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Formatting {
    /// Set the font style.
    pub font_style: Option<FontStyle>,
    /// Choose normal or small caps.
    pub font_variant: Option<FontVariant>,
    /// Set the font weight.
    pub font_weight: Option<FontWeight>,
    /// Choose underlining.
    pub text_decoration: Option<TextDecoration>,
    /// Choose vertical alignment.
    pub vertical_align: Option<VerticalAlign>,
}

impl Formatting {
    /// Whether no property is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Font style.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Normal font style.
    #[default]
    Normal,
    /// Italic font style.
    Italic,
    /// Oblique font style.
    Oblique,
}

/// Font variant.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontVariant {
    /// Normal font variant.
    #[default]
    Normal,
    /// Small caps font variant.
    SmallCaps,
}

/// Font weight.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Normal font weight.
    #[default]
    Normal,
    /// Bold font weight.
    Bold,
    /// Light font weight.
    Light,
}

/// Text decoration.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDecoration {
    /// No text decoration.
    #[default]
    None,
    /// Underline text decoration.
    Underline,
}

/// Vertical alignment.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    /// Baseline alignment.
    #[default]
    Baseline,
    /// Superscript vertical alignment.
    Sup,
    /// Subscript vertical alignment.
    Sub,
}

/// Prefixes and suffixes.
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct Affixes {
    /// The prefix.
    pub prefix: Option<String>,
    /// The suffix.
    pub suffix: Option<String>,
}

/// On which layout level to display the citation.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Display {
    /// Block stretching from margin to margin.
    Block,
    /// Put in the left margin.
    LeftMargin,
    /// Align on page after `LeftMargin`.
    RightInline,
    /// `Block` and indented.
    Indent,
}

/// How to format text.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextCase {
    /// lowercase.
    Lowercase,
    /// UPPERCASE.
    Uppercase,
    /// Capitalize the first word.
    CapitalizeFirst,
    /// Capitalize All Words.
    CapitalizeAll,
    /// Sentence case. *Deprecated*.
    #[serde(rename = "sentence")]
    SentenceCase,
    /// Title case. Only applies to English.
    #[serde(rename = "title")]
    TitleCase,
}
