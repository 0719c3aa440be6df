/*!
 * XLIFF 1.2 serialization of interchange documents.
 *
 * Text inside `<source>`, `<target>` and `<note>` is written and read back
 * verbatim (`xml:space="preserve"`); only the whitespace between elements is
 * pretty-printed.
 */

use log::{debug, warn};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::{InterchangeError, ReassemblyError};

use super::model::{DocumentMetadata, InterchangeDocument, Segment, SegmentId, TargetState};

pub const XLIFF_NAMESPACE: &str = "urn:oasis:names:tc:xliff:document:1.2";
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const SCHEMA_LOCATION: &str = "urn:oasis:names:tc:xliff:document:1.2 xliff-core-1.2-strict.xsd";

/// Origin attribute of reviewer notes.
pub const NOTE_ORIGIN: &str = "reviewer";

const DATATYPE: &str = "plaintext";

/// A document read back from XLIFF, plus the units that had to be dropped.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub document: InterchangeDocument,

    /// Units whose id could not be turned into a `SegmentId`
    pub rejected: Vec<ReassemblyError>,
}

/// Serialize a document to an XLIFF 1.2 string.
pub fn write_document(document: &InterchangeDocument) -> Result<String, InterchangeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("xliff");
    root.push_attribute(("xmlns", XLIFF_NAMESPACE));
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("version", "1.2"));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    writer.write_event(Event::Start(root))?;

    let metadata = &document.metadata;
    let mut file = BytesStart::new("file");
    file.push_attribute(("original", metadata.original.as_str()));
    file.push_attribute(("datatype", DATATYPE));
    file.push_attribute(("source-language", metadata.source_language.as_str()));
    file.push_attribute(("target-language", metadata.target_language.as_str()));
    writer.write_event(Event::Start(file))?;
    writer.write_event(Event::Start(BytesStart::new("body")))?;

    for segment in &document.segments {
        write_unit(&mut writer, segment)?;
    }

    writer.write_event(Event::End(BytesEnd::new("body")))?;
    writer.write_event(Event::End(BytesEnd::new("file")))?;
    writer.write_event(Event::End(BytesEnd::new("xliff")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(String::from_utf8(bytes)?)
}

fn write_unit(writer: &mut Writer<Vec<u8>>, segment: &Segment) -> Result<(), InterchangeError> {
    let id = segment.id.to_string();
    let mut unit = BytesStart::new("trans-unit");
    unit.push_attribute(("id", id.as_str()));
    unit.push_attribute(("datatype", DATATYPE));
    writer.write_event(Event::Start(unit))?;

    let mut source = BytesStart::new("source");
    source.push_attribute(("xml:space", "preserve"));
    write_text_element(writer, source, "source", &segment.source_text)?;

    let mut target = BytesStart::new("target");
    target.push_attribute(("state", segment.state.as_str()));
    target.push_attribute(("xml:space", "preserve"));
    write_text_element(writer, target, "target", &segment.target_text)?;

    if let Some(comment) = &segment.comment {
        let mut note = BytesStart::new("note");
        note.push_attribute(("from", NOTE_ORIGIN));
        note.push_attribute(("annotates", "general"));
        note.push_attribute(("priority", "1"));
        write_text_element(writer, note, "note", comment)?;
    }

    writer.write_event(Event::End(BytesEnd::new("trans-unit")))?;
    Ok(())
}

/// Write `<name …>text</name>`. The text event is always emitted, even when
/// empty, so the indenting writer never puts a line break inside the element.
fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    start: BytesStart<'_>,
    name: &str,
    text: &str,
) -> Result<(), InterchangeError> {
    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Source,
    Target,
    Note,
}

#[derive(Debug, Default)]
struct UnitBuilder {
    ordinal: usize,
    id: Option<String>,
    source: String,
    target: String,
    state: Option<String>,
    note: Option<String>,
}

impl UnitBuilder {
    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Source => &mut self.source,
            Field::Target => &mut self.target,
            Field::Note => self.note.get_or_insert_with(String::new),
        }
    }

    fn finish(self, segments: &mut Vec<Segment>, rejected: &mut Vec<ReassemblyError>) {
        let Some(raw_id) = self.id else {
            warn!("Translation unit #{} has no id, skipped", self.ordinal);
            rejected.push(ReassemblyError::MissingId(self.ordinal));
            return;
        };

        match raw_id.parse::<SegmentId>() {
            Ok(id) => segments.push(Segment {
                id,
                source_text: self.source,
                target_text: self.target,
                state: self.state.as_deref().map(TargetState::parse).unwrap_or_default(),
                comment: self.note,
            }),
            Err(e) => {
                warn!("{}", e);
                rejected.push(e);
            }
        }
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, InterchangeError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

fn read_metadata(e: &BytesStart<'_>) -> Result<DocumentMetadata, InterchangeError> {
    Ok(DocumentMetadata {
        source_language: attribute(e, b"source-language")?.unwrap_or_default(),
        target_language: attribute(e, b"target-language")?.unwrap_or_default(),
        original: attribute(e, b"original")?.unwrap_or_default(),
    })
}

/// Parse an XLIFF 1.2 string.
///
/// Units with a malformed or missing id are reported in
/// [`ParsedDocument::rejected`] instead of failing the whole document. Inline
/// elements and CDATA inside `<source>`/`<target>` contribute their text.
pub fn read_document(xml: &str) -> Result<ParsedDocument, InterchangeError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut root_seen = false;
    let mut metadata: Option<DocumentMetadata> = None;
    let mut segments = Vec::new();
    let mut rejected = Vec::new();
    let mut unit: Option<UnitBuilder> = None;
    let mut capture: Option<Field> = None;
    let mut inline_depth = 0usize;
    let mut ordinal = 0usize;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) => {
                let name = e.local_name();
                if !root_seen {
                    if name.as_ref() != b"xliff" {
                        return Err(InterchangeError::UnexpectedRoot(
                            String::from_utf8_lossy(name.as_ref()).into_owned(),
                        ));
                    }
                    root_seen = true;
                    continue;
                }
                if capture.is_some() {
                    inline_depth += 1;
                    continue;
                }
                match name.as_ref() {
                    b"file" => {
                        if metadata.is_none() {
                            metadata = Some(read_metadata(&e)?);
                        } else {
                            debug!("Additional <file> element, units are merged into one document");
                        }
                    }
                    b"trans-unit" => {
                        ordinal += 1;
                        unit = Some(UnitBuilder {
                            ordinal,
                            id: attribute(&e, b"id")?,
                            ..UnitBuilder::default()
                        });
                    }
                    b"source" if unit.is_some() => capture = Some(Field::Source),
                    b"target" => {
                        if let Some(u) = unit.as_mut() {
                            u.state = attribute(&e, b"state")?;
                            capture = Some(Field::Target);
                        }
                    }
                    b"note" if unit.is_some() => capture = Some(Field::Note),
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if !root_seen {
                    return Err(InterchangeError::UnexpectedRoot(
                        String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                    ));
                }
                if capture.is_some() {
                    continue;
                }
                match e.local_name().as_ref() {
                    b"file" if metadata.is_none() => metadata = Some(read_metadata(&e)?),
                    b"trans-unit" => {
                        ordinal += 1;
                        let empty = UnitBuilder {
                            ordinal,
                            id: attribute(&e, b"id")?,
                            ..UnitBuilder::default()
                        };
                        empty.finish(&mut segments, &mut rejected);
                    }
                    b"target" => {
                        if let Some(u) = unit.as_mut() {
                            u.state = attribute(&e, b"state")?;
                        }
                    }
                    _ => {}
                }
            }
            Event::Text(e) => {
                if let (Some(field), Some(u)) = (capture, unit.as_mut()) {
                    u.field_mut(field).push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let (Some(field), Some(u)) = (capture, unit.as_mut()) {
                    u.field_mut(field).push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(e) => {
                if capture.is_some() {
                    if inline_depth > 0 {
                        inline_depth -= 1;
                    } else {
                        capture = None;
                    }
                    continue;
                }
                if e.local_name().as_ref() == b"trans-unit" {
                    if let Some(u) = unit.take() {
                        u.finish(&mut segments, &mut rejected);
                    }
                }
            }
            _ => {}
        }
    }

    if !root_seen {
        return Err(InterchangeError::Xml("document is empty".to_string()));
    }
    let metadata = metadata.ok_or(InterchangeError::MissingFile)?;

    debug!(
        "Read {} unit(s) for {} ({} rejected)",
        segments.len(),
        metadata.target_language,
        rejected.len()
    );

    Ok(ParsedDocument {
        document: InterchangeDocument { metadata, segments },
        rejected,
    })
}
