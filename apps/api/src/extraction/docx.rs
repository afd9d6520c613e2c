//! DOCX text extraction: read `word/document.xml` out of the OOXML zip container
//! and flatten its runs into lines.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

pub(super) fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| {
        ExtractionError::Failed(format!("file is not a valid DOCX document: {e}"))
    })?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Failed(format!("DOCX has no {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Failed(format!("failed to read {DOCUMENT_PART}: {e}")))?;

    document_text(&xml)
}

/// Flattens WordprocessingML body text: `w:t` runs are concatenated, every `w:p`
/// ends a line, `w:tab` becomes a tab and `w:br` a line break.
fn document_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ExtractionError::Failed(format!("malformed document XML: {e}")))?;

        match event {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" | b"w:cr" => out.push('\n'),
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractionError::Failed(format!("bad text run: {e}")))?;
                out.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}
