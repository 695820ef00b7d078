//! Rendered output and its concrete encodings.
//!
//! The renderer produces a tree of [`Fragment`]s. An [`OutputFormat`] turns
//! that tree into a string: plain text drops all formatting, HTML and RTF
//! encode it with their own markup.

use std::fmt::Write;

use crate::style::{
    Display, FontStyle, FontVariant, FontWeight, Formatting, TextDecoration, VerticalAlign,
};

/// A piece of rendered output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Literal text.
    Text(String),
    /// Children with formatting applied.
    Formatted {
        /// The formatting to apply.
        formatting: Formatting,
        /// The formatted content.
        children: Vec<Fragment>,
    },
    /// Children wrapped in localized quotation marks.
    Quoted {
        /// The opening mark.
        open: String,
        /// The closing mark.
        close: String,
        /// The quoted content.
        children: Vec<Fragment>,
    },
    /// Children laid out as a block.
    Block {
        /// How the block is displayed.
        display: Display,
        /// The block's content.
        children: Vec<Fragment>,
    },
}

impl Fragment {
    /// A text fragment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Whether the fragment renders nothing.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Formatted { children, .. } | Self::Block { children, .. } => {
                children.iter().all(Fragment::is_empty)
            }
            Self::Quoted { .. } => false,
        }
    }

    /// The fragment's text without any markup.
    pub fn plain(&self) -> String {
        let mut buf = String::new();
        self.write_plain(&mut buf);
        buf
    }

    fn write_plain(&self, buf: &mut String) {
        match self {
            Self::Text(text) => buf.push_str(text),
            Self::Formatted { children, .. } | Self::Block { children, .. } => {
                children.iter().for_each(|c| c.write_plain(buf));
            }
            Self::Quoted { open, close, children } => {
                buf.push_str(open);
                children.iter().for_each(|c| c.write_plain(buf));
                buf.push_str(close);
            }
        }
    }

    /// The last character this fragment renders, ignoring markup.
    pub fn last_char(&self) -> Option<char> {
        match self {
            Self::Text(text) => text.chars().next_back(),
            Self::Formatted { children, .. } | Self::Block { children, .. } => {
                children.iter().rev().find_map(Fragment::last_char)
            }
            Self::Quoted { close, .. } => close.chars().next_back(),
        }
    }

    /// Whether the fragment ends with a closing quotation mark.
    pub fn ends_with_quote(&self) -> bool {
        match self {
            Self::Quoted { .. } => true,
            Self::Formatted { children, .. } | Self::Block { children, .. } => children
                .iter()
                .rev()
                .find(|c| !c.is_empty())
                .is_some_and(Fragment::ends_with_quote),
            Self::Text(_) => false,
        }
    }

    /// Insert `text` just before the final closing quotation mark. Returns
    /// `false` if the fragment does not end with a quotation.
    pub fn push_into_quote(&mut self, text: &str) -> bool {
        match self {
            Self::Quoted { children, .. } => {
                if let Some(inner) = children.iter_mut().rev().find(|c| !c.is_empty()) {
                    if inner.ends_with_quote() {
                        return inner.push_into_quote(text);
                    }
                }
                children.push(Fragment::text(text));
                true
            }
            Self::Formatted { children, .. } | Self::Block { children, .. } => children
                .iter_mut()
                .rev()
                .find(|c| !c.is_empty())
                .is_some_and(|c| c.push_into_quote(text)),
            Self::Text(_) => false,
        }
    }
}

/// The plain text of a fragment sequence.
pub fn plain_text(fragments: &[Fragment]) -> String {
    OutputFormat::Plain.render(fragments)
}

/// A concrete text encoding for rendered output.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OutputFormat {
    /// HTML markup.
    #[default]
    Html,
    /// Rich Text Format control words.
    Rtf,
    /// Text without any markup.
    Plain,
}

impl OutputFormat {
    /// Encode `fragments` as a string.
    pub fn render(self, fragments: &[Fragment]) -> String {
        let mut buf = String::new();
        for fragment in fragments {
            match self {
                Self::Plain => fragment.write_plain(&mut buf),
                Self::Html => write_html(fragment, &mut buf),
                Self::Rtf => write_rtf(fragment, &mut buf),
            }
        }
        buf
    }
}

fn write_html(fragment: &Fragment, buf: &mut String) {
    match fragment {
        Fragment::Text(text) => escape_html(text, buf),
        Fragment::Formatted { formatting, children } => {
            let tags = html_tags(formatting);
            for (open, _) in &tags {
                buf.push_str(open);
            }
            children.iter().for_each(|c| write_html(c, buf));
            for (_, close) in tags.iter().rev() {
                buf.push_str(close);
            }
        }
        Fragment::Quoted { open, close, children } => {
            escape_html(open, buf);
            children.iter().for_each(|c| write_html(c, buf));
            escape_html(close, buf);
        }
        Fragment::Block { display, children } => {
            let class = match display {
                Display::Block => "csl-block",
                Display::LeftMargin => "csl-left-margin",
                Display::RightInline => "csl-right-inline",
                Display::Indent => "csl-indent",
            };
            let _ = write!(buf, r#"<div class="{class}">"#);
            children.iter().for_each(|c| write_html(c, buf));
            buf.push_str("</div>");
        }
    }
}

fn html_tags(formatting: &Formatting) -> Vec<(&'static str, &'static str)> {
    const SPAN: &str = "</span>";
    let mut tags = Vec::new();
    match formatting.font_style {
        Some(FontStyle::Italic) => tags.push(("<i>", "</i>")),
        Some(FontStyle::Oblique) => tags.push((r#"<span style="font-style:oblique;">"#, SPAN)),
        Some(FontStyle::Normal) => tags.push((r#"<span style="font-style:normal;">"#, SPAN)),
        None => {}
    }
    match formatting.font_variant {
        Some(FontVariant::SmallCaps) => {
            tags.push((r#"<span style="font-variant:small-caps;">"#, SPAN))
        }
        Some(FontVariant::Normal) => tags.push((r#"<span style="font-variant:normal;">"#, SPAN)),
        None => {}
    }
    match formatting.font_weight {
        Some(FontWeight::Bold) => tags.push(("<b>", "</b>")),
        Some(FontWeight::Light) => tags.push((r#"<span style="font-weight:lighter;">"#, SPAN)),
        Some(FontWeight::Normal) => tags.push((r#"<span style="font-weight:normal;">"#, SPAN)),
        None => {}
    }
    match formatting.text_decoration {
        Some(TextDecoration::Underline) => {
            tags.push((r#"<span style="text-decoration:underline;">"#, SPAN))
        }
        Some(TextDecoration::None) => {
            tags.push((r#"<span style="text-decoration:none;">"#, SPAN))
        }
        None => {}
    }
    match formatting.vertical_align {
        Some(VerticalAlign::Sup) => tags.push(("<sup>", "</sup>")),
        Some(VerticalAlign::Sub) => tags.push(("<sub>", "</sub>")),
        Some(VerticalAlign::Baseline) => {
            tags.push((r#"<span style="vertical-align:baseline;">"#, SPAN))
        }
        None => {}
    }
    tags
}

fn escape_html(text: &str, buf: &mut String) {
    for c in text.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            c => buf.push(c),
        }
    }
}

fn write_rtf(fragment: &Fragment, buf: &mut String) {
    match fragment {
        Fragment::Text(text) => escape_rtf(text, buf),
        Fragment::Formatted { formatting, children } => {
            let words = rtf_control_words(formatting);
            if words.is_empty() {
                children.iter().for_each(|c| write_rtf(c, buf));
                return;
            }
            buf.push('{');
            for word in words {
                buf.push_str(word);
            }
            buf.push(' ');
            children.iter().for_each(|c| write_rtf(c, buf));
            buf.push('}');
        }
        Fragment::Quoted { open, close, children } => {
            escape_rtf(open, buf);
            children.iter().for_each(|c| write_rtf(c, buf));
            escape_rtf(close, buf);
        }
        Fragment::Block { children, .. } => children.iter().for_each(|c| write_rtf(c, buf)),
    }
}

fn rtf_control_words(formatting: &Formatting) -> Vec<&'static str> {
    let mut words = Vec::new();
    match formatting.font_style {
        Some(FontStyle::Italic | FontStyle::Oblique) => words.push(r"\i"),
        Some(FontStyle::Normal) => words.push(r"\i0"),
        None => {}
    }
    match formatting.font_variant {
        Some(FontVariant::SmallCaps) => words.push(r"\scaps"),
        Some(FontVariant::Normal) => words.push(r"\scaps0"),
        None => {}
    }
    match formatting.font_weight {
        Some(FontWeight::Bold) => words.push(r"\b"),
        Some(FontWeight::Normal | FontWeight::Light) => words.push(r"\b0"),
        None => {}
    }
    match formatting.text_decoration {
        Some(TextDecoration::Underline) => words.push(r"\ul"),
        Some(TextDecoration::None) => words.push(r"\ulnone"),
        None => {}
    }
    match formatting.vertical_align {
        Some(VerticalAlign::Sup) => words.push(r"\super"),
        Some(VerticalAlign::Sub) => words.push(r"\sub"),
        Some(VerticalAlign::Baseline) => words.push(r"\nosupersub"),
        None => {}
    }
    words
}

/// Escape RTF specials. Characters outside ASCII become `\uN?` with `N` the
/// signed 16-bit code unit.
fn escape_rtf(text: &str, buf: &mut String) {
    for c in text.chars() {
        match c {
            '\\' => buf.push_str(r"\\"),
            '{' => buf.push_str(r"\{"),
            '}' => buf.push_str(r"\}"),
            '\n' => buf.push_str(r"\line "),
            c if c.is_ascii() => buf.push(c),
            c => {
                let mut units = [0; 2];
                for unit in c.encode_utf16(&mut units) {
                    let _ = write!(buf, r"\u{}?", *unit as i16);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn italic(children: Vec<Fragment>) -> Fragment {
        Fragment::Formatted {
            formatting: Formatting { font_style: Some(FontStyle::Italic), ..Default::default() },
            children,
        }
    }

    #[test]
    fn test_plain() {
        let fragments = [
            italic(vec![Fragment::text("Title")]),
            Fragment::text(", "),
            Fragment::Quoted {
                open: "“".into(),
                close: "”".into(),
                children: vec![Fragment::text("Chapter")],
            },
        ];
        assert_eq!(OutputFormat::Plain.render(&fragments), "Title, “Chapter”");
    }

    #[test]
    fn test_html() {
        let fragments = [
            italic(vec![Fragment::text("Tom & Jerry <3>")]),
            Fragment::Formatted {
                formatting: Formatting {
                    font_weight: Some(FontWeight::Bold),
                    vertical_align: Some(VerticalAlign::Sup),
                    ..Default::default()
                },
                children: vec![Fragment::text("1")],
            },
            Fragment::Block { display: Display::Block, children: vec![Fragment::text("x")] },
        ];
        assert_eq!(
            OutputFormat::Html.render(&fragments),
            r#"<i>Tom &amp; Jerry &lt;3&gt;</i><b><sup>1</sup></b><div class="csl-block">x</div>"#
        );
    }

    #[test]
    fn test_rtf() {
        let fragments = [
            italic(vec![Fragment::text("Titel {ä}")]),
            Fragment::text(r" C:\ 😀"),
        ];
        assert_eq!(
            OutputFormat::Rtf.render(&fragments),
            r"{\i Titel \{\u228?\}} C:\\ \u-10179?\u-8704?"
        );
    }

    #[test]
    fn test_push_into_quote() {
        let mut fragment = italic(vec![Fragment::Quoted {
            open: "“".into(),
            close: "”".into(),
            children: vec![Fragment::text("Title")],
        }]);
        assert!(fragment.ends_with_quote());
        assert!(fragment.push_into_quote(","));
        assert_eq!(fragment.plain(), "“Title,”");
        assert!(!Fragment::text("x").push_into_quote(","));
    }
}
