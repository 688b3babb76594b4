//! File-format detection and text extraction.

use std::fmt;

use crate::error::DocumentError;

/// Upload formats we know how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Detect the format from the file extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Result<Self, DocumentError> {
        let lower = file_name.trim().to_lowercase();
        let format = match lower.rsplit_once('.').map(|(_, ext)| ext) {
            Some("pdf") => Self::Pdf,
            Some("docx") => Self::Docx,
            Some("txt") => Self::Txt,
            _ => {
                return Err(DocumentError::UnsupportedFormat {
                    file_name: file_name.to_string(),
                });
            }
        };
        Ok(format)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Txt => "txt",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turns raw file bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, DocumentError>;
}

/// Handles `.txt` only. Binary formats need a dedicated extractor.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_text(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, DocumentError> {
        match format {
            DocumentFormat::Txt => Ok(decode_text(bytes)),
            other => Err(DocumentError::ExtractorUnavailable {
                format: other.to_string(),
            }),
        }
    }
}

/// Decode as UTF-8, falling back to Latin-1 (every byte maps to a char).
pub fn decode_text(bytes: &[u8]) -> String {
    let text = match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    };
    text.trim_start_matches('\u{feff}').trim().to_string()
}

/// Detect, extract and reject uploads that yield no text.
pub fn load_document(
    extractor: &dyn TextExtractor,
    file_name: &str,
    bytes: &[u8],
) -> Result<String, DocumentError> {
    let format = DocumentFormat::from_file_name(file_name)?;
    let text = extractor.extract_text(bytes, format)?;
    if text.trim().is_empty() {
        return Err(DocumentError::EmptyText {
            file_name: file_name.to_string(),
        });
    }
    Ok(text)
}
