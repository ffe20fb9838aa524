//! Integration tests for reading whole feed documents through the
//! namespace normalizer: real-world RSS, Atom, RDF and OPML shapes, plus
//! config-driven registry entries and options.

use std::path::PathBuf;

use feedns::feed::{canonicalize, detect_format, CanonicalEvent, FeedFormat, ReadOptions};
use feedns::{Config, NamespaceRegistry};
use pretty_assertions::assert_eq;

fn read(content: &str) -> Vec<CanonicalEvent> {
    canonicalize(content, &NamespaceRegistry::builtin(), &ReadOptions::default())
        .expect("Failed to canonicalize document")
}

fn open_names(events: &[CanonicalEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|event| match event {
            CanonicalEvent::Open { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect()
}

fn attribute_names(events: &[CanonicalEvent], element: &str) -> Vec<String> {
    events
        .iter()
        .find_map(|event| match event {
            CanonicalEvent::Open {
                name, attributes, ..
            } if name == element => Some(attributes.iter().map(|a| a.name.clone()).collect()),
            _ => None,
        })
        .unwrap_or_default()
}

fn temp_config(name: &str, contents: &str) -> (PathBuf, PathBuf) {
    let dir = std::env::temp_dir().join(format!(
        "feedns_feed_documents_{}_{}",
        name,
        std::process::id()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}

// ============================================================================
// RSS
// ============================================================================

const PODCAST_RSS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"
     xmlns:itunes1="http://www.itunes.com/dtds/podcast-1.0.dtd"
     xmlns:dublin="http://purl.org/dc/elements/1.1/"
     xmlns:encoded="http://purl.org/rss/1.0/modules/content/"
     xmlns:m="http://search.yahoo.com/mrss/">
  <channel>
    <title>Example Cast</title>
    <itunes1:author>Jane Doe</itunes1:author>
    <itunes1:image href="https://example.com/cover.jpg"/>
    <item>
      <title>Episode 1</title>
      <dublin:creator>Jane Doe</dublin:creator>
      <encoded:encoded><![CDATA[<p>Show notes</p>]]></encoded:encoded>
      <m:content url="https://example.com/ep1.mp3" m:medium="audio"/>
    </item>
  </channel>
</rss>"#;

#[test]
fn test_podcast_rss_prefixes_are_canonical() {
    let events = read(PODCAST_RSS);

    assert_eq!(
        open_names(&events),
        vec![
            "rss",
            "channel",
            "title",
            "itunes:author",
            "itunes:image",
            "item",
            "title",
            "dc:creator",
            "content:encoded",
            "media:content",
        ]
    );
    assert_eq!(attribute_names(&events, "media:content"), vec!["@url", "@media:medium"]);
}

#[test]
fn test_rss_declarations_pass_through_verbatim() {
    let events = read(PODCAST_RSS);
    let attributes = attribute_names(&events, "rss");

    assert!(attributes.contains(&"@version".to_string()));
    assert!(attributes.contains(&"@xmlns:itunes1".to_string()));
    assert!(attributes.contains(&"@xmlns:dublin".to_string()));
}

#[test]
fn test_rss_text_and_cdata_survive() {
    let events = read(PODCAST_RSS);
    let texts: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            CanonicalEvent::Text { content } => Some(content.as_str()),
            _ => None,
        })
        .collect();

    assert!(texts.contains(&"Jane Doe"));
    assert!(texts.contains(&"<p>Show notes</p>"));
}

#[test]
fn test_rss_closes_balance_opens() {
    let events = read(PODCAST_RSS);
    let opens = events
        .iter()
        .filter(|e| matches!(e, CanonicalEvent::Open { self_closing: false, .. }))
        .count();
    let closes = events
        .iter()
        .filter(|e| matches!(e, CanonicalEvent::Close { .. }))
        .count();
    assert_eq!(opens, closes);
}

// ============================================================================
// Atom
// ============================================================================

const ATOM_FEED: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:t="http://purl.org/syndication/thread/1.0">
  <title>Example Blog</title>
  <link href="https://example.com/" rel="alternate"/>
  <entry>
    <title>Hello</title>
    <t:total>3</t:total>
    <content type="xhtml">
      <div xmlns="http://www.w3.org/1999/xhtml"><p>Hi</p></div>
    </content>
  </entry>
</feed>"#;

#[test]
fn test_atom_default_namespace_applies_below_root() {
    let events = read(ATOM_FEED);

    // The root's own declaration governs its children, not its own name.
    assert_eq!(
        open_names(&events)[..5],
        ["feed", "atom:title", "atom:link", "atom:entry", "atom:title"]
    );
    assert!(open_names(&events).contains(&"thr:total"));
}

#[test]
fn test_atom_attributes_do_not_take_default_namespace() {
    let events = read(ATOM_FEED);
    assert_eq!(attribute_names(&events, "atom:link"), vec!["@href", "@rel"]);
}

#[test]
fn test_atom_unknown_inner_default_keeps_inherited() {
    let events = read(ATOM_FEED);

    // XHTML is not a feed vocabulary; the Atom default stays in effect.
    assert!(open_names(&events).contains(&"atom:div"));
    assert!(open_names(&events).contains(&"atom:p"));
}

#[test]
fn test_atom_feed_detected_with_self_scoped_root() {
    let registry = NamespaceRegistry::builtin();
    let format = detect_format(ATOM_FEED, &registry, &ReadOptions::default()).unwrap();
    assert_eq!(format, Some(FeedFormat::Atom));
}

// ============================================================================
// RDF and OPML
// ============================================================================

#[test]
fn test_rdf_feed_with_custom_prefixes() {
    let doc = r#"<r:RDF xmlns:r="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
                       xmlns="http://purl.org/rss/1.0/"
                       xmlns:d="http://purl.org/dc/elements/1.1/">
      <channel r:about="https://example.com/">
        <title>RDF Channel</title>
        <d:date>2024-01-01</d:date>
      </channel>
    </r:RDF>"#;

    let registry = NamespaceRegistry::builtin();
    let events = canonicalize(doc, &registry, &ReadOptions::default()).unwrap();

    // The root is named before its own declarations apply; the RSS 1.0
    // default is not a registered vocabulary, so `channel` stays bare.
    assert_eq!(open_names(&events), vec!["r:RDF", "channel", "title", "dc:date"]);
    assert_eq!(attribute_names(&events, "channel"), vec!["@rdf:about"]);

    let format = detect_format(doc, &registry, &ReadOptions::default()).unwrap();
    assert_eq!(format, Some(FeedFormat::Rdf));
}

#[test]
fn test_opml_detected() {
    let doc = r#"<opml version="2.0"><head/><body><outline text="x"/></body></opml>"#;
    let format =
        detect_format(doc, &NamespaceRegistry::builtin(), &ReadOptions::default()).unwrap();
    assert_eq!(format, Some(FeedFormat::Opml));
}

#[test]
fn test_html_document_not_a_feed() {
    let doc = "<html><body><p>Not a feed</p></body></html>";
    let format =
        detect_format(doc, &NamespaceRegistry::builtin(), &ReadOptions::default()).unwrap();
    assert_eq!(format, None);
}

// ============================================================================
// Config-driven reading
// ============================================================================

#[test]
fn test_config_namespace_entries_extend_registry() {
    let (dir, path) = temp_config(
        "extend",
        r#"
[namespaces]
"http://example.com/ns/custom" = "custom"
"#,
    );
    let config = Config::load(&path).unwrap();
    let doc = r#"<rss xmlns:x="http://example.com/ns/custom"><channel><x:rating>5</x:rating></channel></rss>"#;

    let events = canonicalize(doc, &config.registry(), &ReadOptions::default()).unwrap();
    assert!(open_names(&events).contains(&"custom:rating"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_config_fold_case_lowercases_names() {
    let (dir, path) = temp_config("fold", "fold_case = true\n");
    let config = Config::load(&path).unwrap();
    let options = ReadOptions {
        normalizer: config.normalizer_options(),
        max_depth: config.max_depth,
    };
    let doc = r#"<RSS xmlns:DC="http://purl.org/dc/elements/1.1/"><Channel><DC:Creator>A</DC:Creator></Channel></RSS>"#;

    let events = canonicalize(doc, &config.registry(), &options).unwrap();
    assert_eq!(open_names(&events), vec!["rss", "channel", "dc:creator"]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn test_config_max_depth_enforced() {
    let (dir, path) = temp_config("depth", "max_depth = 3\n");
    let config = Config::load(&path).unwrap();
    let options = ReadOptions {
        normalizer: config.normalizer_options(),
        max_depth: config.max_depth,
    };
    let doc = "<a><b><c><d/></c></b></a>";
    assert!(canonicalize(doc, &config.registry(), &options).is_ok());

    let doc = "<a><b><c><d></d></c></b></a>";
    assert!(canonicalize(doc, &config.registry(), &options).is_err());

    std::fs::remove_dir_all(&dir).ok();
}
