use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use citeberg::{
    LocaleCode, OutputFormat, PredefinedLocales, Processor, ProcessorOptions, RefError,
    StyleError,
};

const TITLE_STYLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<style xmlns="http://purl.org/net/xbiblio/csl" class="note" version="1.0">
  <info><id>title-only</id><title>Title only</title></info>
  <citation><layout><text variable="title"/></layout></citation>
</style>"#;

const AUTHOR_DATE: &str = r#"<style version="1.0" class="in-text">
  <macro name="author">
    <names variable="author">
      <name name-as-sort-order="all" and="symbol" initialize-with=". " delimiter=", "/>
      <substitute><text variable="title"/></substitute>
    </names>
  </macro>
  <citation>
    <layout prefix="(" suffix=")" delimiter="; ">
      <group delimiter=", ">
        <text macro="author"/>
        <date variable="issued"><date-part name="year"/></date>
      </group>
    </layout>
  </citation>
  <bibliography>
    <layout suffix=".">
      <group delimiter=". ">
        <text macro="author"/>
        <date variable="issued" prefix="(" suffix=")"><date-part name="year"/></date>
        <text variable="title" font-style="italic"/>
      </group>
    </layout>
  </bibliography>
</style>"#;

const ITEM: &[u8] = br#"{"id": "item", "type": "book", "title": "the title"}"#;

const ARTICLE: &[u8] = br#"{
    "id": "doe2021",
    "type": "article-journal",
    "title": "A Title",
    "author": [{"family": "Doe", "given": "John"}, {"family": "Roe", "given": "Rick"}],
    "issued": {"date-parts": [[2021, 4, 1]]}
}"#;

fn processor(style: &str, format: OutputFormat) -> Processor {
    Processor::new(style.as_bytes(), PredefinedLocales::new(), format).unwrap()
}

#[test]
fn test_title_only() {
    let mut plain = processor(TITLE_STYLE, OutputFormat::Plain);
    assert_eq!(plain.format_one(ITEM).unwrap().as_str(), "the title");

    let mut html = processor(TITLE_STYLE, OutputFormat::Html);
    let output = html.format_one(ITEM).unwrap();
    assert_eq!(output.to_string(), "the title");
    assert_eq!(output.len(), 9);
    assert_eq!(html.style().info.id.as_deref(), Some("title-only"));
}

#[test]
fn test_minimal_locale_for_every_tag() {
    let style = concat!(
        r#"<style xmlns="http://purl.org/net/xbiblio/csl" class="note" version="1.0" default-locale="en-GB">"#,
        r#"<info><id>id</id><title>title</title><updated>2015-10-10T23:31:02+00:00</updated></info>"#,
        r#"<citation><layout><text variable="title" /></layout></citation></style>"#,
    );
    let en_us = "<locale version=\"1.0\" xml:lang=\"en-US\">\n\
                 <info> <updated>2015-10-10T23:31:02+00:00</updated> </info>\
                 <terms> </terms>\
                 </locale>";

    for format in [OutputFormat::Plain, OutputFormat::Html] {
        let fetcher = move |_: &LocaleCode| Some(en_us.to_string());
        let mut processor = Processor::new(style.as_bytes(), fetcher, format).unwrap();
        assert_eq!(processor.locale_tag().as_str(), "en-GB");
        let output = processor.format_one(ITEM).unwrap();
        assert_eq!(output.as_str(), "the title");
        output.release();
        assert!(processor.has_cached_locale(&LocaleCode::new("en-GB")));
        processor.release();
    }
}

#[test]
fn test_missing_variable_renders_nothing() {
    let mut processor = processor(TITLE_STYLE, OutputFormat::Plain);
    let output = processor.format_one(br#"{"id": "item", "type": "book"}"#).unwrap();
    assert!(output.is_empty());
}

#[test]
fn test_malformed_reference_fails_one_call() {
    let mut processor = processor(TITLE_STYLE, OutputFormat::Plain);
    let err = processor.format_one(br#"{"id": "item", "type": "bo"#).unwrap_err();
    assert!(matches!(err, RefError::Malformed { .. }));

    let err = processor.format_one(br#"{"id": "item", "type": "spaceship"}"#).unwrap_err();
    assert!(matches!(err, RefError::Malformed { .. }));

    assert_eq!(processor.format_one(ITEM).unwrap().as_str(), "the title");
}

#[test]
fn test_idempotent() {
    let mut processor = processor(AUTHOR_DATE, OutputFormat::Html);
    let first = processor.format_one(ARTICLE).unwrap();
    let second = processor.format_one(ARTICLE).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_author_date() {
    let mut processor = processor(AUTHOR_DATE, OutputFormat::Html);
    assert_eq!(processor.format_one(ARTICLE).unwrap().as_str(), "(Doe, J. &amp; Roe, R., 2021)");
    assert_eq!(
        processor.format_bibliography_entry(ARTICLE).unwrap().unwrap().into_string(),
        "Doe, J. &amp; Roe, R. (2021). <i>A Title</i>."
    );

    let anonymous = br#"{"id": "x", "type": "book", "title": "Anon", "issued": "1999"}"#;
    assert_eq!(processor.format_one(anonymous).unwrap().as_str(), "(Anon, 1999)");
}

#[test]
fn test_rtf() {
    let mut processor = processor(AUTHOR_DATE, OutputFormat::Rtf);
    let item = r#"{"id": "x", "type": "book", "title": "Straße", "issued": "2001"}"#.as_bytes();
    assert_eq!(
        processor.format_bibliography_entry(item).unwrap().unwrap().as_str(),
        r"Stra\u223?e. (2001)."
    );

    let item = r#"{"id": "x", "type": "book", "title": "Title", "author": [{"family": "Müller"}]}"#.as_bytes();
    assert_eq!(
        processor.format_bibliography_entry(item).unwrap().unwrap().as_str(),
        r"M\u252?ller. {\i Title}."
    );
}

#[test]
fn test_group_suppression() {
    let style = r#"<style version="1.0"><citation><layout><group delimiter="; ">
        <group delimiter=" "><text value="vol."/><number variable="volume"/></group>
        <text variable="title"/>
    </group></layout></citation></style>"#;
    let mut processor = processor(style, OutputFormat::Plain);
    assert_eq!(processor.format_one(ITEM).unwrap().as_str(), "the title");

    let item = br#"{"id": "item", "type": "book", "title": "the title", "volume": "2"}"#;
    assert_eq!(processor.format_one(item).unwrap().as_str(), "vol. 2; the title");
}

#[test]
fn test_locale_precedence() {
    let style = r#"<style version="1.0" default-locale="de-AT">
      <locale xml:lang="de"><terms><term name="and">und</term></terms></locale>
      <citation><layout><group delimiter="|">
        <text term="and"/><text term="anonymous"/><text term="edition"/>
      </group></layout></citation>
    </style>"#;
    let fetcher = PredefinedLocales::new().with(
        "de",
        r#"<locale xml:lang="de"><terms>
             <term name="and">UND</term>
             <term name="anonymous">anonym</term>
           </terms></locale>"#,
    );
    let mut processor = Processor::new(style.as_bytes(), fetcher, OutputFormat::Plain).unwrap();
    assert_eq!(processor.format_one(ITEM).unwrap().as_str(), "und|anonym|edition");
    assert!(processor.has_cached_locale(&LocaleCode::new("de")));
    assert!(!processor.has_cached_locale(&LocaleCode::new("de-AT")));
}

#[test]
fn test_fallback_chain() {
    let style = r#"<style version="1.0" default-locale="fr-FR">
        <citation><layout><text variable="title"/></layout></citation></style>"#;
    let options = ProcessorOptions {
        format: OutputFormat::Plain,
        locale: Some(LocaleCode::new("de-CH")),
        ..Default::default()
    };
    let processor =
        Processor::with_options(style.as_bytes(), PredefinedLocales::new(), options).unwrap();

    let chain = processor.fallback_chain();
    assert!(chain.len() <= 5);
    assert_eq!(chain, ["de-CH", "de", "fr-FR", "en-US"].map(LocaleCode::from).to_vec());
    assert_eq!(chain.last(), Some(&LocaleCode::en_us()));
}

#[test]
fn test_fetches_once_per_tag() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let fetcher = move |_: &LocaleCode| {
        counter.fetch_add(1, Ordering::SeqCst);
        None::<String>
    };

    let options = ProcessorOptions {
        locale: Some(LocaleCode::new("de-CH")),
        ..Default::default()
    };
    let mut processor =
        Processor::with_options(TITLE_STYLE.as_bytes(), fetcher, options).unwrap();
    for _ in 0..3 {
        processor.format_one(ITEM).unwrap();
    }

    // de-CH, de and en-US.
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_unresolvable_locale_degrades() {
    let style = r#"<style version="1.0"><citation><layout>
        <group delimiter=" "><text term="and"/><text variable="title"/></group>
    </layout></citation></style>"#;
    let options = ProcessorOptions {
        format: OutputFormat::Plain,
        locale: Some(LocaleCode::new("xx-YY")),
        builtin_locale: false,
    };
    let mut processor =
        Processor::with_options(style.as_bytes(), PredefinedLocales::new(), options).unwrap();
    assert_eq!(processor.format_one(ITEM).unwrap().as_str(), "the title");
}

#[test]
fn test_style_errors() {
    let new = |style: &str| {
        Processor::new(style.as_bytes(), PredefinedLocales::new(), OutputFormat::Plain)
            .unwrap_err()
    };

    assert!(matches!(new("<style version=\"1.0\"><citation>"), StyleError::Malformed(_)));
    assert!(matches!(new("<locale/>"), StyleError::Malformed(_)));
    assert_eq!(
        new(r#"<style version="1.0"><citation><layout><text macro="nope"/></layout></citation></style>"#),
        StyleError::UnresolvedMacro { name: "nope".into() }
    );
}
