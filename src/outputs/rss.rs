//! RSS 2.0 rendering.
//!
//! Produces the whole document in memory, so nothing touches disk until the
//! feed is known to be complete.
//!
//! # Document Shape
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
//!   <channel>
//!     <title/> <link/> <description/> <language/>
//!     <atom:link href="…" rel="self" type="application/rss+xml"/>
//!     <lastBuildDate/>
//!     <item>
//!       <title/> <link/> <description/> <pubDate/>
//!       <guid isPermaLink="true"/>
//!     </item>
//!     …
//!   </channel>
//! </rss>
//! ```

use crate::error::FeedError;
use crate::models::{ArticleRecord, ChannelMeta};
use crate::utils::{RFC822_FORMAT, RunClock};
use chrono::NaiveDate;
use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::fmt::Display;
use std::io::Write;
use tracing::{info, warn};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Render `records` into a complete RSS document.
///
/// # Arguments
///
/// * `records` - Items, written in this order
/// * `channel` - Channel title, link, description, language and self URL
/// * `clock` - Source of `lastBuildDate` and of fallback publication dates
///
/// # Returns
///
/// The full document, ending in a newline. Text is escaped and stripped of
/// characters XML cannot carry, so the result is well-formed for any input.
pub fn render_feed(
    records: &[ArticleRecord],
    channel: &ChannelMeta,
    clock: &RunClock,
) -> Result<String, FeedError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let rss = BytesStart::new("rss").with_attributes([("version", "2.0"), ("xmlns:atom", ATOM_NS)]);
    emit(&mut writer, Event::Start(rss))?;
    emit(&mut writer, Event::Start(BytesStart::new("channel")))?;

    write_text_element(&mut writer, "title", &channel.title)?;
    write_text_element(&mut writer, "link", &channel.link)?;
    write_text_element(&mut writer, "description", &channel.description)?;
    write_text_element(&mut writer, "language", &channel.language)?;
    let self_url = sanitize_text(&channel.self_url);
    let self_link = BytesStart::new("atom:link").with_attributes([
        ("href", self_url.as_str()),
        ("rel", "self"),
        ("type", "application/rss+xml"),
    ]);
    emit(&mut writer, Event::Empty(self_link))?;
    write_text_element(&mut writer, "lastBuildDate", &clock.now_rfc822())?;

    for record in records {
        write_item(&mut writer, record, clock)?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("channel")))?;
    emit(&mut writer, Event::End(BytesEnd::new("rss")))?;

    let mut out = String::from_utf8(writer.into_inner()).map_err(render_err)?;
    out.push('\n');
    info!(items = records.len(), bytes = out.len(), "Rendered RSS feed");
    Ok(out)
}

fn write_item<W: Write>(
    writer: &mut Writer<W>,
    record: &ArticleRecord,
    clock: &RunClock,
) -> Result<(), FeedError> {
    emit(writer, Event::Start(BytesStart::new("item")))?;
    write_text_element(writer, "title", &record.title)?;
    write_text_element(writer, "link", &record.link)?;
    write_text_element(writer, "description", &record.description)?;
    write_text_element(writer, "pubDate", &format_pub_date(&record.pub_date, clock))?;

    let guid = BytesStart::new("guid").with_attributes([("isPermaLink", "true")]);
    emit(writer, Event::Start(guid))?;
    emit(writer, Event::Text(BytesText::from_escaped(escape(&sanitize_text(&record.link)))))?;
    emit(writer, Event::End(BytesEnd::new("guid")))?;

    emit(writer, Event::End(BytesEnd::new("item")))
}

fn write_text_element<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), FeedError> {
    emit(writer, Event::Start(BytesStart::new(name)))?;
    emit(writer, Event::Text(BytesText::from_escaped(escape(&sanitize_text(text)))))?;
    emit(writer, Event::End(BytesEnd::new(name)))
}

/// Drop characters XML 1.0 does not allow in a document.
///
/// Escaping cannot represent them, and the HTML parser happily decodes
/// references such as `&#1;` into anchor text.
fn sanitize_text(input: &str) -> String {
    input
        .chars()
        .filter(|&c| {
            matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && c != '\u{FFFE}' && c != '\u{FFFF}')
        })
        .collect()
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), FeedError> {
    writer.write_event(event).map_err(render_err)
}

fn render_err(e: impl Display) -> FeedError {
    FeedError::Render(e.to_string())
}

/// Format a `YYYY-MM-DD` publication date as noon UTC on that day.
///
/// Anything that doesn't parse falls back to the clock's current time, so a
/// single odd date never sinks the feed.
pub fn format_pub_date(raw: &str, clock: &RunClock) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(12, 0, 0)
            .map(|noon| noon.and_utc().format(RFC822_FORMAT).to_string())
            .unwrap_or_else(|| clock.now_rfc822()),
        Err(e) => {
            warn!(pub_date = %raw, error = %e, "Unparseable publication date; using current time");
            clock.now_rfc822()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use quick_xml::Reader;
    use quick_xml::escape::unescape;

    fn clock() -> RunClock {
        RunClock::fixed(Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap())
    }

    fn record(title: &str, link: &str, pub_date: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            link: link.to_string(),
            pub_date: pub_date.to_string(),
            description: title.to_string(),
        }
    }

    /// Parse the document and return the `<item>` count, failing on malformed XML.
    fn count_items(xml: &str) -> usize {
        let mut reader = Reader::from_str(xml);
        let mut items = 0;
        loop {
            match reader.read_event().expect("feed is well-formed") {
                Event::Start(e) if e.name().as_ref() == b"item" => items += 1,
                Event::Eof => break,
                _ => {}
            }
        }
        items
    }

    fn inner<'a>(xml: &'a str, open: &str, close: &str) -> Vec<&'a str> {
        xml.match_indices(open)
            .filter_map(|(start, _)| {
                let from = start + open.len();
                xml[from..].find(close).map(|len| &xml[from..from + len])
            })
            .collect()
    }

    #[test]
    fn test_pub_date_is_noon_utc() {
        assert_eq!(
            format_pub_date("2024-03-15", &clock()),
            "Fri, 15 Mar 2024 12:00:00 +0000"
        );
    }

    #[test]
    fn test_bad_pub_date_falls_back_to_now() {
        assert_eq!(
            format_pub_date("not-a-date", &clock()),
            "Sun, 01 Jun 2025 09:30:00 +0000"
        );
        assert_eq!(
            format_pub_date("2024-13-45", &clock()),
            "Sun, 01 Jun 2025 09:30:00 +0000"
        );
    }

    #[test]
    fn test_empty_feed_is_valid_with_channel_only() {
        let xml = render_feed(&[], &ChannelMeta::default(), &clock()).unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">"#));
        assert!(xml.contains("<title>Orange News - Commentaries</title>"));
        assert!(xml.contains("<language>zh-cn</language>"));
        assert!(xml.contains(
            r#"<atom:link href="https://totrphbm.manus.space/feed.xml" rel="self" type="application/rss+xml"/>"#
        ));
        assert!(xml.contains("<lastBuildDate>Sun, 01 Jun 2025 09:30:00 +0000</lastBuildDate>"));
        assert!(xml.trim_end().ends_with("</rss>"));
        assert_eq!(count_items(&xml), 0);
    }

    #[test]
    fn test_items_follow_input_order() {
        let records = vec![
            record("Second story title", "https://e.com/2", "2024-01-02"),
            record("First story title", "https://e.com/1", "2024-01-01"),
        ];
        let xml = render_feed(&records, &ChannelMeta::default(), &clock()).unwrap();
        assert_eq!(count_items(&xml), 2);
        assert_eq!(
            inner(&xml, "<guid isPermaLink=\"true\">", "</guid>"),
            vec!["https://e.com/2", "https://e.com/1"]
        );
        assert_eq!(
            inner(&xml, "<pubDate>", "</pubDate>"),
            vec!["Tue, 02 Jan 2024 12:00:00 +0000", "Mon, 01 Jan 2024 12:00:00 +0000"]
        );
    }

    #[test]
    fn test_special_characters_are_escaped() {
        let title = r#"Tom & Jerry <say> "hi""#;
        let link = "https://e.com/a?x=1&y=2";
        let xml = render_feed(&[record(title, link, "2024-03-15")], &ChannelMeta::default(), &clock())
            .unwrap();

        assert!(!xml.contains("<say>"));
        assert!(xml.contains("Tom &amp; Jerry &lt;say&gt; &quot;hi&quot;"));
        assert!(xml.contains("https://e.com/a?x=1&amp;y=2"));
        assert_eq!(count_items(&xml), 1);

        let titles = inner(&xml, "<title>", "</title>");
        assert_eq!(unescape(titles[1]).unwrap(), title);
        let descriptions = inner(&xml, "<description>", "</description>");
        assert_eq!(unescape(descriptions[1]).unwrap(), title);
        let links = inner(&xml, "<link>", "</link>");
        assert_eq!(unescape(links[1]).unwrap(), link);
    }

    #[test]
    fn test_bad_date_does_not_abort_batch() {
        let records = vec![
            record("Good date article", "https://e.com/good", "2024-03-15"),
            record("Bad date article", "https://e.com/bad", "not-a-date"),
        ];
        let xml = render_feed(&records, &ChannelMeta::default(), &clock()).unwrap();
        assert_eq!(
            inner(&xml, "<pubDate>", "</pubDate>"),
            vec!["Fri, 15 Mar 2024 12:00:00 +0000", "Sun, 01 Jun 2025 09:30:00 +0000"]
        );
    }

    #[test]
    fn test_sanitize_text_keeps_whitespace_drops_controls() {
        assert_eq!(sanitize_text("a\tb\nc\rd"), "a\tb\nc\rd");
        assert_eq!(sanitize_text("x\u{1}y\u{8}z\u{1F}"), "xyz");
        assert_eq!(sanitize_text("香港\u{FFFE}\u{FFFF}新聞"), "香港新聞");
    }

    #[test]
    fn test_xml_illegal_characters_never_reach_document() {
        let title = "Bad \u{1} title\u{B} here";
        let link = "https://e.com/a\u{2}b";
        let xml = render_feed(&[record(title, link, "2024-03-15")], &ChannelMeta::default(), &clock())
            .unwrap();

        let illegal: Vec<u32> = xml
            .chars()
            .filter(|&c| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r'))
            .map(u32::from)
            .collect();
        assert_eq!(illegal, Vec::<u32>::new());
        assert!(xml.contains("<title>Bad  title here</title>"));
        assert!(xml.contains("<description>Bad  title here</description>"));
        assert!(xml.contains("<guid isPermaLink=\"true\">https://e.com/ab</guid>"));
        assert_eq!(count_items(&xml), 1);
    }

    #[test]
    fn test_channel_fields_are_escaped() {
        let channel = ChannelMeta {
            title: "News & Views".to_string(),
            self_url: "https://e.com/feed.xml?a=1&b=2".to_string(),
            ..ChannelMeta::default()
        };
        let xml = render_feed(&[], &channel, &clock()).unwrap();
        assert!(xml.contains("<title>News &amp; Views</title>"));
        assert!(xml.contains(r#"href="https://e.com/feed.xml?a=1&amp;b=2""#));
        assert_eq!(count_items(&xml), 0);
    }
}
