use std::collections::HashMap;

use tracing::debug;

use super::*;
use crate::xml::{self, Element, XmlError};

/// Attributes `<if>` and `<else-if>` test on.
const CONDITIONS: &[&str] = &[
    "disambiguate",
    "is-numeric",
    "is-uncertain-date",
    "locator",
    "position",
    "type",
    "variable",
    "match",
];

/// Attributes of `<citation>` and `<bibliography>` that only affect how
/// several cites or entries relate to each other.
const CROSS_REFERENCE_OPTIONS: &[&str] = &[
    "after-collapse-delimiter",
    "cite-group-delimiter",
    "collapse",
    "disambiguate-add-givenname",
    "disambiguate-add-names",
    "disambiguate-add-year-suffix",
    "givenname-disambiguation-rule",
    "near-note-distance",
    "subsequent-author-substitute",
    "subsequent-author-substitute-rule",
    "year-suffix-delimiter",
];

pub(super) fn parse_style(bytes: &[u8]) -> Result<StyleDocument, StyleError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| StyleError::Malformed(format!("style is not valid UTF-8: {e}")))?;
    let root = xml::parse_document(text)?;
    if root.name != "style" {
        return Err(StyleError::Malformed(format!(
            "expected <style> root element, found <{}>",
            root.name
        )));
    }

    check_version(&root)?;
    for child in &root.children {
        if !matches!(
            child.name.as_str(),
            "info" | "citation" | "bibliography" | "macro" | "locale"
        ) {
            return Err(StyleError::UnsupportedFeature(format!("<{}> in <style>", child.name)));
        }
    }

    let info = root.child("info");
    let Some(citation) = root.child("citation") else {
        let dependent = info.is_some_and(|info| {
            info.children_named("link")
                .any(|link| link.attr("rel") == Some("independent-parent"))
        });
        return Err(if dependent {
            StyleError::UnsupportedFeature("dependent styles".into())
        } else {
            StyleError::Malformed("style has no <citation>".into())
        });
    };

    let mut macro_ids = HashMap::new();
    for (i, element) in root.children_named("macro").enumerate() {
        let name = element
            .attr("name")
            .ok_or_else(|| StyleError::Malformed("<macro> requires a `name`".into()))?;
        if macro_ids.insert(name.to_string(), MacroId(i)).is_some() {
            return Err(StyleError::Malformed(format!("macro '{name}' is defined twice")));
        }
    }

    let parser = Parser { macros: &macro_ids };
    let macros = root
        .children_named("macro")
        .map(|element| {
            Ok(Macro {
                name: element.attr("name").unwrap_or_default().to_string(),
                children: parser.children(element)?,
            })
        })
        .collect::<Result<Vec<_>, StyleError>>()?;
    macros::check_cycles(&macros)?;

    let name_options = name_options(&root, true)?;
    let citation = parser.layout(citation, &name_options)?;
    let bibliography = root
        .child("bibliography")
        .map(|bib| parser.layout(bib, &name_options))
        .transpose()?;

    let locales = root
        .children_named("locale")
        .map(Locale::from_element)
        .collect::<Result<Vec<_>, _>>()?;

    let info = StyleInfo {
        id: info.and_then(|i| i.child("id")).map(|e| e.text.clone()),
        title: info.and_then(|i| i.child("title")).map(|e| e.text.clone()),
    };
    debug!(id = ?info.id, macros = macros.len(), "parsed style");

    Ok(StyleDocument {
        info,
        class: root.keyword("class")?.unwrap_or_default(),
        default_locale: root.attr("default-locale").map(LocaleCode::from),
        citation,
        bibliography,
        macros,
        locales,
        name_options,
        page_range_format: root.keyword("page-range-format")?,
        demote_non_dropping_particle: root
            .keyword("demote-non-dropping-particle")?
            .unwrap_or_default(),
        initialize_with_hyphen: root.bool_attr("initialize-with-hyphen", true)?,
    })
}

fn check_version(root: &Element) -> Result<(), StyleError> {
    let version = root
        .attr("version")
        .ok_or_else(|| StyleError::Malformed("<style> requires a `version`".into()))?;
    if version == "1.0" || version.starts_with("1.0.") {
        Ok(())
    } else {
        Err(StyleError::UnsupportedFeature(format!("CSL version {version}")))
    }
}

struct Parser<'a> {
    macros: &'a HashMap<String, MacroId>,
}

impl Parser<'_> {
    fn layout(
        &self,
        parent: &Element,
        inherited: &InheritableNameOptions,
    ) -> Result<Layout, StyleError> {
        for child in &parent.children {
            match child.name.as_str() {
                "layout" => {}
                // Each call formats one reference, so there is nothing to sort.
                "sort" => debug!(parent = %parent.name, "ignoring <sort> for single references"),
                other => {
                    return Err(StyleError::UnsupportedFeature(format!(
                        "<{other}> in <{}>",
                        parent.name
                    )));
                }
            }
        }
        for (key, _) in &parent.attrs {
            if CROSS_REFERENCE_OPTIONS.contains(&key.as_str()) {
                debug!(parent = %parent.name, option = %key, "ignoring option for single references");
            }
        }

        let mut layouts = parent.children_named("layout");
        let Some(layout) = layouts.next() else {
            return Err(StyleError::Malformed(format!(
                "<{}> requires a <layout>",
                parent.name
            )));
        };
        if layouts.next().is_some() {
            return Err(StyleError::UnsupportedFeature(format!(
                "multiple layouts in <{}>",
                parent.name
            )));
        }
        if layout.attr("locale").is_some() {
            return Err(StyleError::UnsupportedFeature("localized <layout>".into()));
        }

        Ok(Layout {
            children: self.children(layout)?,
            formatting: formatting(layout)?,
            affixes: affixes(layout),
            delimiter: layout.string_attr("delimiter"),
            name_options: inherited.apply(&name_options(parent, true)?),
        })
    }

    fn children(&self, parent: &Element) -> Result<Vec<RenderNode>, StyleError> {
        parent.children.iter().map(|child| self.node(child)).collect()
    }

    fn node(&self, element: &Element) -> Result<RenderNode, StyleError> {
        Ok(match element.name.as_str() {
            "text" => RenderNode::Text(self.text(element)?),
            "group" => RenderNode::Group(Group {
                children: self.children(element)?,
                formatting: formatting(element)?,
                affixes: affixes(element),
                delimiter: element.string_attr("delimiter"),
                display: element.keyword("display")?,
            }),
            "choose" => RenderNode::Choose(self.choose(element)?),
            "date" => RenderNode::Date(date(element)?),
            "names" => RenderNode::Names(self.names(element)?),
            "number" => RenderNode::Number(Number {
                variable: required_keyword(element, "variable")?,
                form: element.keyword("form")?.unwrap_or_default(),
                formatting: formatting(element)?,
                affixes: affixes(element),
                display: element.keyword("display")?,
                text_case: element.keyword("text-case")?,
            }),
            "label" => RenderNode::Label(Label {
                variable: required_keyword(element, "variable")?,
                label: variableless_label(element)?,
            }),
            other => {
                return Err(StyleError::UnsupportedFeature(format!("<{other}> element")));
            }
        })
    }

    fn text(&self, element: &Element) -> Result<Text, StyleError> {
        let target = if let Some(var) = element.keyword("variable")? {
            TextTarget::Variable { var, form: element.keyword("form")?.unwrap_or_default() }
        } else if let Some(name) = element.attr("macro") {
            let id = self
                .macros
                .get(name)
                .copied()
                .ok_or_else(|| StyleError::UnresolvedMacro { name: name.to_string() })?;
            TextTarget::Macro(id)
        } else if let Some(term) = element.keyword("term")? {
            TextTarget::Term {
                term,
                form: element.keyword("form")?.unwrap_or_default(),
                plural: element.bool_attr("plural", false)?,
            }
        } else if let Some(value) = element.attr("value") {
            TextTarget::Value(value.to_string())
        } else {
            return Err(StyleError::Malformed(
                "<text> requires one of `variable`, `macro`, `term` or `value`".into(),
            ));
        };

        Ok(Text {
            target,
            formatting: formatting(element)?,
            affixes: affixes(element),
            display: element.keyword("display")?,
            quotes: element.bool_attr("quotes", false)?,
            strip_periods: element.bool_attr("strip-periods", false)?,
            text_case: element.keyword("text-case")?,
        })
    }

    fn choose(&self, element: &Element) -> Result<Choose, StyleError> {
        let mut choose = Choose::default();
        for child in &element.children {
            match child.name.as_str() {
                "if" if choose.branches.is_empty() => choose.branches.push(self.branch(child)?),
                "else-if" if !choose.branches.is_empty() && choose.otherwise.is_none() => {
                    choose.branches.push(self.branch(child)?)
                }
                "else" if !choose.branches.is_empty() && choose.otherwise.is_none() => {
                    choose.otherwise = Some(self.children(child)?)
                }
                other => {
                    return Err(StyleError::Malformed(format!(
                        "unexpected <{other}> in <choose>"
                    )));
                }
            }
        }

        if choose.branches.is_empty() {
            return Err(StyleError::Malformed("<choose> requires an <if>".into()));
        }
        Ok(choose)
    }

    fn branch(&self, element: &Element) -> Result<ChooseBranch, StyleError> {
        if let Some((key, _)) =
            element.attrs.iter().find(|(key, _)| !CONDITIONS.contains(&key.as_str()))
        {
            return Err(StyleError::UnsupportedFeature(format!("condition `{key}`")));
        }

        let mut tests = Vec::new();
        if element.has_attr("disambiguate") {
            tests.push(ChooseTest::Disambiguate(element.bool_attr("disambiguate", false)?));
        }
        if element.has_attr("is-numeric") {
            tests.push(ChooseTest::IsNumeric(element.keyword_list("is-numeric")?));
        }
        if element.has_attr("is-uncertain-date") {
            tests.push(ChooseTest::IsUncertainDate(element.keyword_list("is-uncertain-date")?));
        }
        if element.has_attr("locator") {
            tests.push(ChooseTest::Locator(element.keyword_list("locator")?));
        }
        if element.has_attr("position") {
            tests.push(ChooseTest::Position(element.keyword_list("position")?));
        }
        if element.has_attr("type") {
            tests.push(ChooseTest::Type(element.keyword_list("type")?));
        }
        if element.has_attr("variable") {
            tests.push(ChooseTest::Variable(element.keyword_list("variable")?));
        }

        if tests.is_empty() {
            return Err(StyleError::Malformed(format!(
                "<{}> requires a condition",
                element.name
            )));
        }

        Ok(ChooseBranch {
            tests,
            match_: element.keyword("match")?.unwrap_or_default(),
            children: self.children(element)?,
        })
    }

    fn names(&self, element: &Element) -> Result<Names, StyleError> {
        let variables: Vec<NameVariable> = element.keyword_list("variable")?;
        if variables.is_empty() {
            return Err(StyleError::Malformed("<names> requires a `variable`".into()));
        }

        let mut names = Names {
            variables,
            name: None,
            et_al: None,
            substitute: None,
            label: None,
            delimiter: element.string_attr("delimiter"),
            formatting: formatting(element)?,
            affixes: affixes(element),
            display: element.keyword("display")?,
        };

        for child in &element.children {
            match child.name.as_str() {
                "name" => names.name = Some(name(child)?),
                "et-al" => {
                    names.et_al = Some(EtAl {
                        term: child.keyword("term")?.unwrap_or_default(),
                        formatting: formatting(child)?,
                    })
                }
                "label" => {
                    names.label = Some(NamesLabel {
                        label: variableless_label(child)?,
                        after_name: names.name.is_some(),
                    })
                }
                "substitute" => names.substitute = Some(self.children(child)?),
                other => {
                    return Err(StyleError::UnsupportedFeature(format!(
                        "<{other}> in <names>"
                    )));
                }
            }
        }

        Ok(names)
    }
}

fn required_keyword<T: serde::de::DeserializeOwned>(
    element: &Element,
    key: &str,
) -> Result<T, XmlError> {
    element.keyword(key)?.ok_or_else(|| {
        XmlError::new(format!("<{}> requires a `{key}`", element.name))
    })
}

fn date(element: &Element) -> Result<Date, XmlError> {
    Ok(Date {
        variable: required_keyword(element, "variable")?,
        form: element.keyword("form")?,
        parts: element.keyword("date-parts")?.unwrap_or_default(),
        date_parts: element
            .children_named("date-part")
            .map(parse_date_part)
            .collect::<Result<_, _>>()?,
        formatting: formatting(element)?,
        affixes: affixes(element),
        delimiter: element.string_attr("delimiter"),
        display: element.keyword("display")?,
        text_case: element.keyword("text-case")?,
    })
}

/// Read a `<date-part>` of a style or locale date.
pub(crate) fn parse_date_part(element: &Element) -> Result<DatePart, XmlError> {
    let name = match element.attr("name") {
        Some("day") => DatePartName::Day { form: element.keyword("form")? },
        Some("month") => DatePartName::Month { form: element.keyword("form")? },
        Some("year") => DatePartName::Year { form: element.keyword("form")? },
        Some(other) => {
            return Err(XmlError::new(format!("unknown date part `{other}`")));
        }
        None => return Err(XmlError::new("<date-part> requires a `name`")),
    };

    Ok(DatePart {
        name,
        range_delimiter: element.string_attr("range-delimiter"),
        formatting: formatting(element)?,
        affixes: affixes(element),
        strip_periods: element.bool_attr("strip-periods", false)?,
        text_case: element.keyword("text-case")?,
    })
}

fn name(element: &Element) -> Result<Name, XmlError> {
    let mut name = Name {
        options: name_options(element, false)?,
        formatting: formatting(element)?,
        affixes: affixes(element),
        ..Name::default()
    };

    for part in element.children_named("name-part") {
        let parsed = NamePart {
            formatting: formatting(part)?,
            affixes: affixes(part),
            text_case: part.keyword("text-case")?,
        };
        match part.attr("name") {
            Some("given") => name.given = parsed,
            Some("family") => name.family = parsed,
            other => {
                return Err(XmlError::new(format!(
                    "invalid name part `{}`",
                    other.unwrap_or_default()
                )));
            }
        }
    }

    Ok(name)
}

/// Read name options. On `<name>` the delimiter and form carry no prefix; on
/// the inheriting elements they are spelled `name-delimiter` and `name-form`.
fn name_options(element: &Element, inheritable: bool) -> Result<InheritableNameOptions, XmlError> {
    let (delimiter, form) =
        if inheritable { ("name-delimiter", "name-form") } else { ("delimiter", "form") };

    Ok(InheritableNameOptions {
        and: element.keyword("and")?,
        delimiter: element.string_attr(delimiter),
        names_delimiter: if inheritable { element.string_attr("names-delimiter") } else { None },
        delimiter_precedes_et_al: element.keyword("delimiter-precedes-et-al")?,
        delimiter_precedes_last: element.keyword("delimiter-precedes-last")?,
        et_al_min: element.int_attr("et-al-min")?,
        et_al_use_first: element.int_attr("et-al-use-first")?,
        et_al_subsequent_min: element.int_attr("et-al-subsequent-min")?,
        et_al_subsequent_use_first: element.int_attr("et-al-subsequent-use-first")?,
        et_al_use_last: element.opt_bool_attr("et-al-use-last")?,
        form: element.keyword(form)?,
        initialize: element.opt_bool_attr("initialize")?,
        initialize_with: element.string_attr("initialize-with"),
        name_as_sort_order: element.keyword("name-as-sort-order")?,
        sort_separator: element.string_attr("sort-separator"),
    })
}

fn variableless_label(element: &Element) -> Result<VariablelessLabel, XmlError> {
    Ok(VariablelessLabel {
        form: element.keyword("form")?.unwrap_or_default(),
        plural: element.keyword("plural")?.unwrap_or_default(),
        formatting: formatting(element)?,
        affixes: affixes(element),
        text_case: element.keyword("text-case")?,
        strip_periods: element.bool_attr("strip-periods", false)?,
    })
}

fn formatting(element: &Element) -> Result<Formatting, XmlError> {
    Ok(Formatting {
        font_style: element.keyword("font-style")?,
        font_variant: element.keyword("font-variant")?,
        font_weight: element.keyword("font-weight")?,
        text_decoration: element.keyword("text-decoration")?,
        vertical_align: element.keyword("vertical-align")?,
    })
}

fn affixes(element: &Element) -> Affixes {
    Affixes { prefix: element.string_attr("prefix"), suffix: element.string_attr("suffix") }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(body: &str) -> Result<StyleDocument, StyleError> {
        StyleDocument::parse(
            format!(
                r#"<style xmlns="http://purl.org/net/xbiblio/csl" class="in-text" version="1.0">
                     {body}
                   </style>"#
            )
            .as_bytes(),
        )
    }

    #[test]
    fn test_parse_layout() {
        let style = style(
            r#"<macro name="title"><text variable="title" font-style="italic"/></macro>
               <citation et-al-min="3">
                 <layout prefix="(" suffix=")" delimiter="; ">
                   <group delimiter=", ">
                     <names variable="author editor">
                       <name and="symbol" initialize-with=". "/>
                       <label form="short" prefix=" (" suffix=")"/>
                     </names>
                     <text macro="title"/>
                     <date variable="issued"><date-part name="year"/></date>
                   </group>
                 </layout>
               </citation>"#,
        )
        .unwrap();

        let layout = &style.citation;
        assert_eq!(layout.affixes.prefix.as_deref(), Some("("));
        assert_eq!(layout.delimiter.as_deref(), Some("; "));
        assert_eq!(layout.name_options.et_al_min, Some(3));
        assert!(style.bibliography.is_none());

        let RenderNode::Group(group) = &layout.children[0] else { panic!("expected group") };
        let RenderNode::Names(names) = &group.children[0] else { panic!("expected names") };
        assert_eq!(names.variables, [NameVariable::Author, NameVariable::Editor]);
        let name = names.name.as_ref().unwrap();
        assert_eq!(name.options.and, Some(NameAnd::Symbol));
        assert_eq!(name.options.initialize_with.as_deref(), Some(". "));
        assert!(names.label.as_ref().unwrap().after_name);

        let RenderNode::Text(text) = &group.children[1] else { panic!("expected text") };
        assert_eq!(text.target, TextTarget::Macro(MacroId(0)));
        assert_eq!(style.macro_id("title"), Some(MacroId(0)));

        let RenderNode::Date(date) = &group.children[2] else { panic!("expected date") };
        assert_eq!(date.variable, DateVariable::Issued);
        assert_eq!(date.date_parts[0].name, DatePartName::Year { form: None });
    }

    #[test]
    fn test_parse_choose() {
        let style = style(
            r#"<citation><layout>
                 <choose>
                   <if type="book thesis" match="any"><text variable="title"/></if>
                   <else-if variable="URL" is-numeric="volume"><text variable="URL"/></else-if>
                   <else><text value="none"/></else>
                 </choose>
               </layout></citation>"#,
        )
        .unwrap();

        let RenderNode::Choose(choose) = &style.citation.children[0] else {
            panic!("expected choose")
        };
        assert_eq!(choose.branches.len(), 2);
        assert_eq!(choose.branches[0].match_, ChooseMatch::Any);
        assert_eq!(choose.branches[0].tests, [ChooseTest::Type(vec![Kind::Book, Kind::Thesis])]);
        assert_eq!(choose.branches[1].tests.len(), 2);
        assert!(choose.otherwise.is_some());
    }

    #[test]
    fn test_inherited_name_options() {
        let style = style(
            r#"<citation name-delimiter="; " et-al-min="4"><layout><text value="x"/></layout></citation>
               <bibliography et-al-min="6"><layout><text value="x"/></layout></bibliography>"#,
        );
        let style = style.unwrap();
        assert_eq!(style.citation.name_options.et_al_min, Some(4));
        assert_eq!(style.citation.name_options.delimiter.as_deref(), Some("; "));
        assert_eq!(style.bibliography.unwrap().name_options.et_al_min, Some(6));
    }

    #[test]
    fn test_style_errors() {
        assert!(matches!(
            style(r#"<citation><layout><text macro="missing"/></layout></citation>"#),
            Err(StyleError::UnresolvedMacro { name }) if name == "missing"
        ));
        assert!(matches!(
            style(r#"<citation><layout><text variable="not-a-var"/></layout></citation>"#),
            Err(StyleError::Malformed(_))
        ));
        assert!(matches!(
            style(r#"<citation><layout><sort/></layout></citation>"#),
            Err(StyleError::UnsupportedFeature(_))
        ));
        assert!(matches!(
            style(r#"<citation><layout><text/></layout></citation>"#),
            Err(StyleError::Malformed(_))
        ));
        assert!(matches!(
            style(r#"<citation><layout><choose><else/></choose></layout></citation>"#),
            Err(StyleError::Malformed(_))
        ));
        assert!(matches!(style(""), Err(StyleError::Malformed(_))));
        assert!(matches!(
            StyleDocument::parse(b"<locale version=\"1.0\"/>"),
            Err(StyleError::Malformed(_))
        ));
        assert!(matches!(
            StyleDocument::parse(b"<style version=\"1.1\"><citation/></style>"),
            Err(StyleError::UnsupportedFeature(_))
        ));
        assert!(matches!(
            StyleDocument::parse(&[0xff, 0xfe]),
            Err(StyleError::Malformed(_))
        ));
    }

    #[test]
    fn test_unsupported_constructs() {
        let unsupported = |body: &str| matches!(style(body), Err(StyleError::UnsupportedFeature(_)));
        assert!(unsupported(
            r#"<citation><layout><text value="x"/></layout></citation><bogus-element/>"#
        ));
        assert!(unsupported(
            r#"<citation><layout locale="de"><text value="x"/></layout></citation>"#
        ));
        assert!(unsupported(
            r#"<citation><layout><text value="x"/></layout><extra/></citation>"#
        ));

        // Sorting and disambiguation have no effect on a single reference.
        let style = style(
            r#"<citation disambiguate-add-names="true" collapse="year">
                 <sort><key variable="issued"/></sort>
                 <layout><text value="x"/></layout>
               </citation>
               <bibliography subsequent-author-substitute="---">
                 <sort><key variable="author"/></sort>
                 <layout><text value="y"/></layout>
               </bibliography>"#,
        )
        .unwrap();
        assert_eq!(style.citation.children.len(), 1);
        assert!(style.bibliography.is_some());
    }

    #[test]
    fn test_dependent_style() {
        let err = style(
            r#"<info><link href="http://www.zotero.org/styles/apa" rel="independent-parent"/></info>"#,
        )
        .unwrap_err();
        assert!(matches!(err, StyleError::UnsupportedFeature(_)));
    }
}
