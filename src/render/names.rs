use super::{Context, Decor, Rendered, Usage};
use crate::locale::TermForm;
use crate::output::Fragment;
use crate::reference::{Name, PersonName};
use crate::style::{
    DelimiterBehavior, DemoteNonDroppingParticle, EtAl, InheritableNameOptions, LabelPluralize,
    Name as NameStyle, NameAnd, NameAsSortOrder, NameForm, NamePart, Names, NamesLabel,
    RenderNode,
};
use crate::taxonomy::{NameVariable, OtherTerm, Term, Variable};

/// The `cs:name`, `cs:et-al` and `cs:label` of a `cs:names` element. Names
/// inside `cs:substitute` without children of their own inherit these.
#[derive(Debug, Clone, Default)]
pub(super) struct NamesChildren {
    name: Option<NameStyle>,
    et_al: Option<EtAl>,
    label: Option<NamesLabel>,
}

impl NamesChildren {
    fn of(names: &Names) -> Self {
        Self { name: names.name.clone(), et_al: names.et_al.clone(), label: names.label.clone() }
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.et_al.is_none() && self.label.is_none()
    }
}

impl<'a> Context<'a> {
    pub(super) fn render_names(&mut self, names: &Names) -> Rendered {
        let own = NamesChildren::of(names);
        let children = match &self.inherited {
            Some(parent) if own.is_empty() => parent.clone(),
            _ => own,
        };

        let default_name = NameStyle::default();
        let name_style = children.name.as_ref().unwrap_or(&default_name);
        let options = self.layout.name_options.apply(&name_style.options);

        let lists = self.name_lists(&names.variables);
        if lists.is_empty() {
            return match &names.substitute {
                Some(substitute) => self.substitute(substitute, children),
                None => Rendered::empty(),
            };
        }

        let fragments = if options.form == Some(NameForm::Count) {
            let count: usize = lists.iter().map(|(_, list)| shown_count(list.len(), &options)).sum();
            vec![Fragment::Text(count.to_string())]
        } else {
            let mut parts = Vec::with_capacity(lists.len());
            for (var, list) in &lists {
                let mut rendered =
                    self.render_name_list(list, &options, name_style, children.et_al.as_ref());
                if let Some(label) = &children.label {
                    let plural = match label.label.plural {
                        LabelPluralize::Always => true,
                        LabelPluralize::Never => false,
                        LabelPluralize::Contextual => list.len() > 1,
                    };
                    let term = self.render_term_label(Term::NameVariable(*var), plural, &label.label);
                    if label.after_name {
                        rendered.extend(term);
                    } else {
                        rendered.splice(0..0, term);
                    }
                }
                parts.push(rendered);
            }
            let delimiter = names.delimiter.as_deref().or(options.names_delimiter.as_deref());
            self.join(parts, delimiter.unwrap_or_default())
        };

        for (var, _) in &lists {
            match var {
                NameVariable::EditorTranslator => {
                    self.rendered_vars.push(NameVariable::Editor.into());
                    self.rendered_vars.push(NameVariable::Translator.into());
                }
                var => self.rendered_vars.push((*var).into()),
            }
        }

        let decor = Decor {
            display: names.display,
            ..Decor::new(&names.formatting, &names.affixes)
        };
        Rendered::new(self.decorate(fragments, &decor), Usage::Used)
    }

    /// The non-empty name lists of `variables`. Identical editor and
    /// translator lists merge into one `editortranslator` list.
    fn name_lists(&self, variables: &[NameVariable]) -> Vec<(NameVariable, &'a [Name])> {
        let reference = self.reference;
        let get = |var: NameVariable| {
            if self.is_suppressed(var.into()) { None } else { reference.names(var) }
        };

        let merged = variables.contains(&NameVariable::Editor)
            && variables.contains(&NameVariable::Translator)
            && get(NameVariable::Editor).is_some()
            && get(NameVariable::Editor) == get(NameVariable::Translator);

        let mut lists = Vec::new();
        for &var in variables {
            match var {
                NameVariable::Editor | NameVariable::Translator if merged => {
                    if let Some(list) = get(var).filter(|_| var == NameVariable::Editor) {
                        lists.push((NameVariable::EditorTranslator, list));
                    }
                }
                _ => {
                    if let Some(list) = get(var) {
                        lists.push((var, list));
                    }
                }
            }
        }
        lists
    }

    /// Render the first substitute that produces output and suppress the
    /// variables it used for the rest of the reference.
    fn substitute(&mut self, substitute: &[RenderNode], children: NamesChildren) -> Rendered {
        let outer = self.inherited.replace(children);
        let mut result = Rendered::empty();
        for node in substitute {
            let checkpoint = self.rendered_vars.len();
            let rendered = self.render_node(node);
            if !rendered.is_empty() {
                let used: Vec<Variable> = self.rendered_vars[checkpoint..].to_vec();
                self.suppressed.extend(used);
                result = rendered;
                break;
            }
        }
        self.inherited = outer;
        result
    }

    fn render_name_list(
        &self,
        list: &[Name],
        options: &InheritableNameOptions,
        style: &NameStyle,
        et_al: Option<&EtAl>,
    ) -> Vec<Fragment> {
        let shown = shown_count(list.len(), options);
        let truncated = shown < list.len();
        let delimiter = options.delimiter.as_deref().unwrap_or(", ");
        let inverted = |i: usize| match options.name_as_sort_order {
            Some(NameAsSortOrder::All) => true,
            Some(NameAsSortOrder::First) => i == 0,
            None => false,
        };

        let and = match options.and {
            Some(NameAnd::Text) => self.locale.term(Term::Other(OtherTerm::And), TermForm::Long, false),
            Some(NameAnd::Symbol) => Some("&"),
            None => None,
        };

        let mut out = Vec::new();
        for (i, name) in list.iter().take(shown).enumerate() {
            let rendered = self.render_name(name, options, style, inverted(i));
            if rendered.is_empty() {
                continue;
            }
            if !out.is_empty() {
                match and.filter(|_| i + 1 == shown && !truncated) {
                    Some(and) => {
                        let behavior = options.delimiter_precedes_last.unwrap_or_default();
                        let sep = if precedes(behavior, shown >= 3, inverted(i - 1)) {
                            format!("{delimiter}{and} ")
                        } else {
                            format!(" {and} ")
                        };
                        self.append(&mut out, &sep);
                    }
                    None => self.append(&mut out, delimiter),
                }
            }
            out.extend(rendered);
        }

        if !truncated || out.is_empty() {
            return out;
        }

        let use_last = options.et_al_use_last == Some(true) && shown + 2 <= list.len();
        if let Some(last) = list.last().filter(|_| use_last) {
            self.append(&mut out, &format!("{delimiter}… "));
            out.extend(self.render_name(last, options, style, inverted(list.len() - 1)));
            return out;
        }

        let et_al = et_al.cloned().unwrap_or_default();
        let Some(term) = self.locale.term(et_al.term.into(), TermForm::Long, false) else {
            return out;
        };
        if term.is_empty() {
            return out;
        }

        let behavior = options.delimiter_precedes_et_al.unwrap_or_default();
        let sep = if precedes(behavior, shown >= 2, inverted(shown - 1)) { delimiter } else { " " };
        self.append(&mut out, sep);
        let term = vec![Fragment::text(term)];
        out.extend(self.decorate(term, &Decor::new(&et_al.formatting, &Default::default())));
        out
    }

    fn render_name(
        &self,
        name: &Name,
        options: &InheritableNameOptions,
        style: &NameStyle,
        inverted: bool,
    ) -> Vec<Fragment> {
        let content = match name {
            Name::Literal(literal) => self.name_part(&literal.literal, &style.family),
            Name::Person(person) => self.render_person(person, options, style, inverted),
        };
        self.decorate(content, &Decor::new(&style.formatting, &style.affixes))
    }

    fn render_person(
        &self,
        person: &PersonName,
        options: &InheritableNameOptions,
        style: &NameStyle,
        inverted: bool,
    ) -> Vec<Fragment> {
        let given = person.given.as_deref().map(|given| {
            match (&options.initialize_with, options.initialize) {
                (Some(with), None | Some(true)) => {
                    initialize(given, with, self.style.initialize_with_hyphen)
                }
                _ => given.to_string(),
            }
        });
        let dropping = person.dropping_particle.as_deref();
        let non_dropping = person.non_dropping_particle.as_deref();

        let Some(family) = person.family.as_deref() else {
            return match given {
                Some(given) => self.name_part(&given, &style.given),
                None => Vec::new(),
            };
        };

        if options.form == Some(NameForm::Short) {
            return self.name_part(&join_particle(non_dropping, family), &style.family);
        }

        let demote = inverted
            && self.style.demote_non_dropping_particle == DemoteNonDroppingParticle::DisplayAndSort;
        let (given_block, family_block) = if demote {
            let particles = join_words([dropping, non_dropping]);
            (join_words([given.as_deref(), particles.as_deref()]), family.to_string())
        } else {
            (
                join_words([given.as_deref(), dropping]),
                join_particle(non_dropping, family),
            )
        };

        let family_part = self.name_part(&family_block, &style.family);
        let given_part = given_block
            .map(|given| self.name_part(&given, &style.given))
            .unwrap_or_default();

        let mut out = Vec::new();
        if inverted {
            let sort_separator = options.sort_separator.as_deref().unwrap_or(", ");
            out.extend(family_part);
            if !given_part.is_empty() {
                self.append(&mut out, sort_separator);
                out.extend(given_part);
            }
            if let Some(suffix) = &person.suffix {
                self.append(&mut out, sort_separator);
                out.push(Fragment::text(suffix));
            }
        } else {
            out.extend(given_part);
            if !out.is_empty() {
                out.push(Fragment::text(" "));
            }
            out.extend(family_part);
            if let Some(suffix) = &person.suffix {
                self.append(&mut out, if person.comma_suffix { ", " } else { " " });
                out.push(Fragment::text(suffix));
            }
        }
        out
    }

    fn name_part(&self, text: &str, part: &NamePart) -> Vec<Fragment> {
        let decor = Decor {
            text_case: part.text_case,
            ..Decor::new(&part.formatting, &part.affixes)
        };
        self.decorate(vec![Fragment::text(text)], &decor)
    }
}

/// How many names of a list of `len` are shown before et-al.
fn shown_count(len: usize, options: &InheritableNameOptions) -> usize {
    match (options.et_al_min, options.et_al_use_first) {
        (Some(min), Some(first)) if len >= min && first < len => first,
        _ => len,
    }
}

/// Whether the list delimiter precedes the final `and` or the et-al term.
/// `contextual` is the count condition for the contextual behavior.
fn precedes(behavior: DelimiterBehavior, contextual: bool, after_inverted: bool) -> bool {
    match behavior {
        DelimiterBehavior::Contextual => contextual,
        DelimiterBehavior::AfterInvertedName => after_inverted,
        DelimiterBehavior::Always => true,
        DelimiterBehavior::Never => false,
    }
}

fn join_words<'a>(words: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    let words: Vec<&str> = words.into_iter().flatten().filter(|w| !w.is_empty()).collect();
    (!words.is_empty()).then(|| words.join(" "))
}

/// Join a particle with the family name. Particles ending in an apostrophe
/// or hyphen attach without a space.
fn join_particle(particle: Option<&str>, family: &str) -> String {
    match particle.filter(|p| !p.is_empty()) {
        Some(p) if p.ends_with(['\'', '’', '-']) => format!("{p}{family}"),
        Some(p) => format!("{p} {family}"),
        None => family.to_string(),
    }
}

/// Reduce given names to initials, e.g. `Jean-Paul Marie` to `J.-P. M.` with
/// `". "`.
fn initialize(given: &str, with: &str, hyphen: bool) -> String {
    let mark = with.trim_end();
    let spacing = &with[mark.len()..];
    let initial = |part: &str| part.chars().find(|c| c.is_alphabetic()).map(|c| {
        let mut s: String = c.to_uppercase().collect();
        s.push_str(mark);
        s
    });

    let words: Vec<String> = given
        .split_whitespace()
        .filter_map(|word| {
            if hyphen {
                let parts: Vec<String> = word.split('-').filter_map(initial).collect();
                (!parts.is_empty()).then(|| parts.join("-"))
            } else {
                initial(word)
            }
        })
        .collect();
    words.join(spacing)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{render, render_with};
    use super::*;

    const ITEM: &str = r#"{"id": "a", "type": "book",
        "author": [
            {"family": "Doe", "given": "Jane Ann"},
            {"family": "Beethoven", "given": "Ludwig", "dropping-particle": "van"},
            {"family": "Smith", "given": "John", "suffix": "Jr."},
            {"literal": "ACME Corp."}
        ],
        "editor": [{"family": "Roe", "given": "Rick"}],
        "translator": [{"family": "Roe", "given": "Rick"}]}"#;

    #[test]
    fn test_name_list() {
        let layout = r#"<names variable="author"><name and="text"/></names>"#;
        assert_eq!(
            render(layout, ITEM),
            "Jane Ann Doe, Ludwig van Beethoven, John Smith Jr., and ACME Corp."
        );

        let layout = r#"<names variable="author">
            <name and="symbol" delimiter-precedes-last="never" initialize-with=". "
                  name-as-sort-order="first"/></names>"#;
        assert_eq!(
            render(layout, ITEM),
            "Doe, J. A., L. van Beethoven, J. Smith Jr. & ACME Corp."
        );
    }

    #[test]
    fn test_et_al() {
        let layout = r#"<names variable="author">
            <name et-al-min="3" et-al-use-first="2" form="short"/>
            <et-al font-style="italic"/></names>"#;
        assert_eq!(render(layout, ITEM), "Doe, Beethoven, et al.");

        let layout = r#"<names variable="author">
            <name et-al-min="3" et-al-use-first="1" delimiter-precedes-et-al="never"/></names>"#;
        assert_eq!(render(layout, ITEM), "Jane Ann Doe et al.");

        let layout = r#"<names variable="author">
            <name et-al-min="3" et-al-use-first="1" et-al-use-last="true" form="short"/></names>"#;
        assert_eq!(render(layout, ITEM), "Doe, … ACME Corp.");

        let layout = r#"<names variable="author"><name form="count" et-al-min="3" et-al-use-first="2"/></names>"#;
        assert_eq!(render(layout, ITEM), "2");
    }

    #[test]
    fn test_sort_order_and_particles() {
        let item = r#"{"id": "a", "type": "book", "author": [
            {"family": "Gogh", "given": "Vincent", "non-dropping-particle": "van"},
            {"family": "Arco", "given": "Jeanne", "non-dropping-particle": "d'"}]}"#;
        let layout = r#"<names variable="author"><name name-as-sort-order="all" delimiter="; "/></names>"#;
        assert_eq!(render(layout, item), "Gogh, Vincent van; Arco, Jeanne d'");

        let style = r#"<style version="1.0" demote-non-dropping-particle="never">
            <citation><layout><names variable="author">
              <name name-as-sort-order="all" delimiter="; "/>
            </names></layout></citation></style>"#;
        assert_eq!(render_with(style, item), "van Gogh, Vincent; d'Arco, Jeanne");

        let layout = r#"<names variable="author"><name form="short" and="text"/></names>"#;
        assert_eq!(render(layout, item), "van Gogh and d'Arco");
    }

    #[test]
    fn test_labels_and_editor_translator() {
        let layout = r#"<names variable="editor translator" delimiter="; ">
            <name/><label form="short" prefix=" (" suffix=")"/></names>"#;
        assert_eq!(render(layout, ITEM), "Rick Roe (ed. & tran.)");

        let layout = r#"<names variable="editor"><label form="verb" suffix=" "/><name/></names>"#;
        assert_eq!(render(layout, ITEM), "edited by Rick Roe");

        let layout = r#"<names variable="author">
            <name et-al-min="2" et-al-use-first="1"/><label prefix=", "/></names>"#;
        // The bundled locale has no term for authors.
        assert_eq!(render(layout, ITEM), "Jane Ann Doe et al.");
    }

    #[test]
    fn test_substitute() {
        let style = r#"<style version="1.0">
            <citation><layout><group delimiter=" / ">
              <names variable="author">
                <name form="short"/>
                <substitute><names variable="editor"/><text variable="title"/></substitute>
              </names>
              <names variable="editor"/>
              <text variable="title"/>
            </group></layout></citation></style>"#;
        let item = r#"{"id": "a", "type": "book", "title": "Title",
                       "editor": [{"family": "Roe", "given": "Rick"}]}"#;
        assert_eq!(render_with(style, item), "Roe / Title");

        let item = r#"{"id": "a", "type": "book", "title": "Title"}"#;
        assert_eq!(render_with(style, item), "Title");
    }

    #[test]
    fn test_initialize() {
        assert_eq!(initialize("Jean-Paul Marie", ". ", true), "J.-P. M.");
        assert_eq!(initialize("Jean-Paul Marie", ".", false), "J.M.");
        assert_eq!(initialize("john", "", true), "J");
    }
}
