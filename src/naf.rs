//! Minimal NAF document handling.
//!
//! The server treats NAF as a mostly opaque format. It needs to answer
//! three questions about an inbound payload: is it well-formed NAF, does it
//! already carry dependency annotations, and what is its raw text layer.
//! Going the other way, it wraps parse results into a NAF document with a
//! raw layer and a deps layer.

use std::fmt::Write;

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

use crate::pipeline::ResultMap;

#[derive(Error, Debug)]
pub enum NafError {
    #[error("not a well-formed NAF document: {0}")]
    Malformed(String),
}

pub struct NafDocument {
    bytes: Vec<u8>,
    has_dependencies: bool,
    raw_text: String,
}

impl NafDocument {
    /// Probe `bytes` as a NAF/KAF document. Anything that is not
    /// well-formed XML with a NAF or KAF root is `Malformed`; the caller
    /// decides whether that means "treat as raw text".
    pub fn try_parse(bytes: &[u8]) -> Result<Self, NafError> {
        let mut reader = Reader::from_reader(bytes);
        let mut has_dependencies = false;
        let mut raw_text = String::new();
        let mut in_raw = false;
        let mut saw_root = false;
        let mut depth = 0usize;

        loop {
            match reader.read_event() {
                Err(e) => return Err(NafError::Malformed(e.to_string())),
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    let name = e.local_name();
                    check_root(&mut saw_root, name.as_ref())?;
                    depth += 1;
                    match name.as_ref() {
                        b"dep" => has_dependencies = true,
                        b"raw" => in_raw = true,
                        _ => {}
                    }
                }
                Ok(Event::Empty(e)) => {
                    let name = e.local_name();
                    check_root(&mut saw_root, name.as_ref())?;
                    if name.as_ref() == b"dep" {
                        has_dependencies = true;
                    }
                }
                Ok(Event::End(e)) => {
                    if e.local_name().as_ref() == b"raw" {
                        in_raw = false;
                    }
                    depth = depth.saturating_sub(1);
                }
                Ok(Event::Text(t)) if in_raw => {
                    let text = t
                        .unescape()
                        .map_err(|e| NafError::Malformed(e.to_string()))?;
                    raw_text.push_str(&text);
                }
                Ok(_) => {}
            }
        }
        if !saw_root {
            return Err(NafError::Malformed("no root element".into()));
        }
        if depth != 0 {
            return Err(NafError::Malformed("unclosed element".into()));
        }

        Ok(Self {
            bytes: bytes.to_vec(),
            has_dependencies,
            raw_text,
        })
    }

    pub fn has_dependencies(&self) -> bool {
        self.has_dependencies
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

fn check_root(saw_root: &mut bool, name: &[u8]) -> Result<(), NafError> {
    if !*saw_root {
        if name != b"NAF" && name != b"KAF" {
            return Err(NafError::Malformed(
                "root element is neither NAF nor KAF".into(),
            ));
        }
        *saw_root = true;
    }
    Ok(())
}

/// Wrap parse results into a NAF document. Each dependency triple becomes
/// one `<dep>` element; the triple's first field is taken as the dependent,
/// the last as the head and whatever sits between them as the relation.
pub fn build(text: &str, result: &ResultMap) -> NafDocument {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<NAF xml:lang=\"nl\" version=\"v3\">\n");
    xml.push_str("  <nafHeader>\n");
    xml.push_str("    <linguisticProcessors layer=\"deps\">\n");
    xml.push_str("      <lp name=\"alpino\"/>\n");
    xml.push_str("    </linguisticProcessors>\n");
    xml.push_str("  </nafHeader>\n");
    let _ = writeln!(xml, "  <raw>{}</raw>", escape(text));
    xml.push_str("  <deps>\n");

    let mut has_dependencies = false;
    for (id, sentence) in result {
        for triple in &sentence.triples {
            let Some(from) = triple.first() else { continue };
            let Some(to) = triple.last() else { continue };
            let rfunc = if triple.len() > 2 {
                triple[1..triple.len() - 1].join("|")
            } else {
                String::new()
            };
            let _ = writeln!(
                xml,
                "    <dep sent=\"{}\" from=\"{}\" rfunc=\"{}\" to=\"{}\"/>",
                escape(id),
                escape(from),
                escape(&rfunc),
                escape(to),
            );
            has_dependencies = true;
        }
    }

    xml.push_str("  </deps>\n");
    xml.push_str("</NAF>\n");

    NafDocument {
        bytes: xml.into_bytes(),
        has_dependencies,
        raw_text: text.to_string(),
    }
}
