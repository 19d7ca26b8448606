//! XSPF playlists, read as a stream of quick-xml events.
//!
//! Only two leaves matter: `/playlist/trackList/track/location` (one URL per
//! track) and `/playlist/title`. Everything else is walked for
//! well-formedness and otherwise ignored; no schema validation is done.

use std::io::{self, BufRead};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{Playlist, PlaylistParser};
use crate::error::FetchError;

const TRACK_LOCATION: [&str; 4] = ["playlist", "trackList", "track", "location"];
const PLAYLIST_TITLE: [&str; 2] = ["playlist", "title"];

#[derive(Debug, Clone, Copy, Default)]
pub struct XspfParser;

/// Open-element stack and the text collected since the last element opened.
#[derive(Debug, Default)]
struct ParserState {
    path: Vec<String>,
    text: String,
    saw_root: bool,
}

impl ParserState {
    fn at(&self, target: &[&str]) -> bool {
        self.path.iter().map(String::as_str).eq(target.iter().copied())
    }

    fn after_root(&self) -> bool {
        self.path.is_empty() && self.saw_root
    }

    fn open(&mut self, name: &[u8]) -> Result<(), String> {
        if self.after_root() {
            return Err("content after the document element".to_string());
        }
        let name = std::str::from_utf8(name).map_err(|e| e.to_string())?;
        self.path.push(name.to_string());
        self.saw_root = true;
        self.text.clear();
        Ok(())
    }

    /// Character data; only whitespace may follow the document element.
    fn push_text(&mut self, text: &str) -> Result<(), String> {
        if self.after_root() && !text.trim().is_empty() {
            return Err("content after the document element".to_string());
        }
        self.text.push_str(text);
        Ok(())
    }

    fn close(&mut self, playlist: &mut Playlist) -> Result<(), String> {
        if self.at(&TRACK_LOCATION) {
            playlist.urls.push(self.text.trim().to_string());
        } else if self.at(&PLAYLIST_TITLE) {
            playlist.title = Some(self.text.trim().to_string());
        }
        self.path
            .pop()
            .map(|_| ())
            .ok_or_else(|| "closing tag without matching opening tag".to_string())
    }
}

impl XspfParser {
    /// Parse an XSPF document. Malformed markup fails the whole parse.
    pub fn parse_reader<R: BufRead>(reader: R) -> Result<Playlist, String> {
        let mut reader = Reader::from_reader(reader);
        reader.config_mut().check_end_names = true;

        let mut state = ParserState::default();
        let mut playlist = Playlist::default();
        let mut buf = Vec::new();

        loop {
            let event = reader
                .read_event_into(&mut buf)
                .map_err(|e| format!("at byte {}: {}", reader.buffer_position(), e))?;
            match event {
                Event::Start(e) => state.open(e.local_name().as_ref())?,
                Event::End(_) => state.close(&mut playlist)?,
                Event::Empty(e) => {
                    state.open(e.local_name().as_ref())?;
                    state.close(&mut playlist)?;
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(|e| e.to_string())?;
                    state.push_text(&text)?;
                }
                Event::CData(e) => {
                    if state.after_root() {
                        return Err("content after the document element".to_string());
                    }
                    let text = std::str::from_utf8(&e).map_err(|e| e.to_string())?;
                    state.push_text(text)?;
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !state.saw_root {
            return Err("no element found".to_string());
        }
        if let Some(open) = state.path.last() {
            return Err(format!("unclosed element <{}> at end of document", open));
        }
        Ok(playlist)
    }
}

impl PlaylistParser for XspfParser {
    fn parse(&self, source: io::Result<Box<dyn BufRead>>) -> Result<Playlist, FetchError> {
        let reader = source.map_err(|e| FetchError::Parse(e.to_string()))?;
        Self::parse_reader(reader).map_err(FetchError::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(doc: &str) -> Result<Playlist, String> {
        XspfParser::parse_reader(doc.as_bytes())
    }

    const MIX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<playlist version="1" xmlns="http://xspf.org/ns/0/">
  <title>Test Mix</title>
  <trackList>
    <track>
      <title>Song A</title>
      <location>http://example.com/music/A.mp3</location>
    </track>
    <track>
      <location>
        http://example.com/music/B.mp3
      </location>
      <image>http://example.com/cover.jpg</image>
    </track>
  </trackList>
</playlist>"#;

    #[test]
    fn extracts_title_and_locations_in_order() {
        let pl = parse(MIX).unwrap();
        assert_eq!(pl.title.as_deref(), Some("Test Mix"));
        assert_eq!(
            pl.urls,
            vec![
                "http://example.com/music/A.mp3",
                "http://example.com/music/B.mp3"
            ]
        );
    }

    #[test]
    fn track_title_is_not_playlist_title() {
        let pl = parse(
            "<playlist><trackList><track><title>Only a track</title>\
             <location>u1</location></track></trackList></playlist>",
        )
        .unwrap();
        assert_eq!(pl.title, None);
        assert_eq!(pl.urls, vec!["u1"]);
    }

    #[test]
    fn last_title_wins() {
        let pl = parse("<playlist><title>first</title><title>second</title></playlist>").unwrap();
        assert_eq!(pl.title.as_deref(), Some("second"));
    }

    #[test]
    fn location_outside_track_list_ignored() {
        let pl = parse(
            "<playlist><location>nope</location><trackList><location>nope2</location>\
             <track><location>yes</location></track></trackList></playlist>",
        )
        .unwrap();
        assert_eq!(pl.urls, vec!["yes"]);
    }

    #[test]
    fn entities_and_cdata_are_decoded() {
        let pl = parse(
            "<playlist><trackList>\
             <track><location>http://h/a.mp3?x=1&amp;y=2</location></track>\
             <track><location><![CDATA[http://h/b&c.mp3]]></location></track>\
             </trackList></playlist>",
        )
        .unwrap();
        assert_eq!(pl.urls, vec!["http://h/a.mp3?x=1&y=2", "http://h/b&c.mp3"]);
    }

    #[test]
    fn namespace_prefix_ignored() {
        let pl = parse(
            "<x:playlist xmlns:x=\"http://xspf.org/ns/0/\"><x:title>NS</x:title>\
             <x:trackList><x:track><x:location>u</x:location></x:track></x:trackList></x:playlist>",
        )
        .unwrap();
        assert_eq!(pl.title.as_deref(), Some("NS"));
        assert_eq!(pl.urls, vec!["u"]);
    }

    #[test]
    fn empty_location_element_yields_empty_url() {
        let pl = parse("<playlist><trackList><track><location/></track></trackList></playlist>")
            .unwrap();
        assert_eq!(pl.urls, vec![""]);
    }

    #[test]
    fn duplicates_preserved() {
        let pl = parse(
            "<playlist><trackList><track><location>a</location></track>\
             <track><location>a</location></track></trackList></playlist>",
        )
        .unwrap();
        assert_eq!(pl.urls, vec!["a", "a"]);
    }

    #[test]
    fn mismatched_end_tag_fails() {
        assert!(parse("<playlist><trackList></track></playlist>").is_err());
    }

    #[test]
    fn unclosed_document_fails() {
        assert!(parse("<playlist><trackList><track><location>a</location></track>").is_err());
    }

    #[test]
    fn empty_document_fails() {
        assert!(parse("").is_err());
        assert!(parse("just some text").is_err());
    }

    #[test]
    fn second_root_fails() {
        assert!(parse("<playlist></playlist><playlist></playlist>").is_err());
    }

    #[test]
    fn text_after_root_fails() {
        assert!(parse(
            "<playlist><trackList><track><location>u</location></track></trackList></playlist>\
             trailing junk"
        )
        .is_err());
        assert!(parse("<playlist></playlist><![CDATA[x]]>").is_err());
    }

    #[test]
    fn whitespace_after_root_is_fine() {
        let pl = parse("<playlist><title>T</title></playlist>\n\n  ").unwrap();
        assert_eq!(pl.title.as_deref(), Some("T"));
    }

    #[test]
    fn unknown_entity_fails() {
        assert!(parse("<playlist><title>&bogus;</title></playlist>").is_err());
    }

    #[test]
    fn malformed_never_returns_partial_model() {
        let err = XspfParser
            .parse(Ok(Box::new(
                "<playlist><trackList><track><location>a</location></track><oops></trackList>"
                    .as_bytes(),
            )))
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }
}
