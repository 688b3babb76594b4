//! PDF and DOCX text extraction.

use std::io::{Cursor, Read};
use std::panic::{self, AssertUnwindSafe};

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::error::DocumentError;

use super::loader::{DocumentFormat, TextExtractor, decode_text};

/// Main body part inside a DOCX package.
const DOCX_BODY_PART: &str = "word/document.xml";

/// Reads every upload format: PDF via `pdf-extract`, DOCX by walking the
/// WordprocessingML body, TXT like [`PlainTextExtractor`](super::PlainTextExtractor).
#[derive(Debug, Clone, Copy, Default)]
pub struct OfficeTextExtractor;

impl TextExtractor for OfficeTextExtractor {
    fn extract_text(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, DocumentError> {
        let text = match format {
            DocumentFormat::Pdf => pdf_text(bytes)?,
            DocumentFormat::Docx => docx_text(bytes)?,
            DocumentFormat::Txt => return Ok(decode_text(bytes)),
        };
        Ok(text.trim().to_string())
    }
}

fn pdf_text(bytes: &[u8]) -> Result<String, DocumentError> {
    // pdf-extract panics on some malformed files instead of returning an error.
    match panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(DocumentError::Extraction(format!("unreadable PDF: {e}"))),
        Err(_) => Err(DocumentError::Extraction("unreadable PDF".to_string())),
    }
}

fn docx_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| DocumentError::Extraction(format!("not a DOCX package: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| DocumentError::Extraction(format!("{DOCX_BODY_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Extraction(format!("{DOCX_BODY_PART}: {e}")))?;

    body_text(&xml)
}

/// Collect `w:t` runs, one line per paragraph.
fn body_text(xml: &str) -> Result<String, DocumentError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => in_text = true,
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => out.push_str(&unescape_fragment(&t)?),
            Ok(Event::GeneralRef(r)) if in_text => {
                let name = utf8(&r)?;
                out.push_str(&unescape_fragment(format!("&{name};").as_bytes())?);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(DocumentError::Extraction(format!(
                    "malformed {DOCX_BODY_PART} at byte {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    Ok(out)
}

fn utf8(raw: &[u8]) -> Result<&str, DocumentError> {
    std::str::from_utf8(raw)
        .map_err(|e| DocumentError::Extraction(format!("{DOCX_BODY_PART} is not UTF-8: {e}")))
}

fn unescape_fragment(raw: &[u8]) -> Result<String, DocumentError> {
    let text = utf8(raw)?;
    unescape(text)
        .map(|s| s.into_owned())
        .map_err(|e| DocumentError::Extraction(format!("{DOCX_BODY_PART}: {e}")))
}
