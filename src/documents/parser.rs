//! Turning uploaded resumes and job descriptions into structured JSON.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::loader::{TextExtractor, load_document};
use super::schema::{ParsedJobDescription, ParsedResume};
use crate::error::{DocumentError, LlmError};
use crate::llm::{LlmProvider, complete_json};

/// Upload body: file name plus base64 content.
#[derive(Debug, Clone, Deserialize)]
pub struct FileUpload {
    #[serde(rename = "fileName")]
    pub file_name: String,
    #[serde(rename = "fileContent")]
    pub file_content: String,
}

/// Configuration for the document parser.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub max_tokens: u32,
    /// Longest document text (in chars) passed to the model.
    pub max_text_chars: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            max_text_chars: 24_000,
        }
    }
}

pub struct DocumentParser {
    llm: Arc<dyn LlmProvider>,
    extractor: Arc<dyn TextExtractor>,
    config: ParserConfig,
}

impl DocumentParser {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        extractor: Arc<dyn TextExtractor>,
        config: ParserConfig,
    ) -> Self {
        Self {
            llm,
            extractor,
            config,
        }
    }

    /// Decode the upload and pull out its text.
    pub fn read_upload(&self, upload: &FileUpload) -> Result<String, DocumentError> {
        let bytes = decode_base64(&upload.file_content)?;
        let text = load_document(self.extractor.as_ref(), &upload.file_name, &bytes)?;
        debug!(file = %upload.file_name, chars = text.len(), "Extracted document text");
        Ok(text)
    }

    pub async fn parse_resume(&self, upload: &FileUpload) -> Result<ParsedResume, DocumentError> {
        let text = self.read_upload(upload)?;
        let parsed: ParsedResume = self.parse_as(&resume_prompt(self.clip(&text))).await?;
        info!(file = %upload.file_name, skills = parsed.skills.len(), "Parsed resume");
        Ok(parsed)
    }

    pub async fn parse_job_description(
        &self,
        upload: &FileUpload,
    ) -> Result<ParsedJobDescription, DocumentError> {
        let text = self.read_upload(upload)?;
        let parsed: ParsedJobDescription =
            self.parse_as(&job_description_prompt(self.clip(&text))).await?;
        info!(
            file = %upload.file_name,
            skills = parsed.required_skills.len(),
            "Parsed job description"
        );
        Ok(parsed)
    }

    async fn parse_as<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, DocumentError> {
        let map = complete_json(self.llm.as_ref(), prompt, self.config.max_tokens).await?;
        serde_json::from_value(Value::Object(map))
            .map_err(|e| DocumentError::Llm(LlmError::Json(e)))
    }

    fn clip<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.config.max_text_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        }
    }
}

/// Decode standard base64, tolerating a `data:...;base64,` prefix and
/// line breaks.
pub fn decode_base64(content: &str) -> Result<Vec<u8>, DocumentError> {
    let payload = match content.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => content,
    };
    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64_STANDARD
        .decode(cleaned)
        .map_err(|e| DocumentError::InvalidEncoding(e.to_string()))
}

pub fn resume_prompt(resume_text: &str) -> String {
    format!(
        "\
You are an expert HR assistant. Extract information from the following resume text and return ONLY a valid JSON object.

Resume Text:
{resume_text}

Extract the following information and return as JSON:

{{
    \"personal_detail\": {{
        \"full_name\": \"string\",
        \"email\": \"string\",
        \"contact_no\": \"string\",
        \"gender\": \"string or null\",
        \"nationality\": \"string or null\"
    }},
    \"address\": {{
        \"address\": \"string or null\",
        \"city\": \"string or null\",
        \"state\": \"string or null\",
        \"country\": \"string or null\",
        \"zip_code\": \"string or null\"
    }},
    \"education\": [
        {{
            \"degree\": \"string\",
            \"school\": \"string\",
            \"start_date\": \"string or null\",
            \"end_date\": \"string or null\"
        }}
    ],
    \"experience\": [
        {{
            \"job_title\": \"string\",
            \"company_name\": \"string\",
            \"start_date\": \"string or null\",
            \"end_date\": \"string or null\",
            \"projects\": \"string or null\"
        }}
    ],
    \"skills\": [\"string\"],
    \"certifications\": [\"string\"]
}}

Important:
- Return ONLY valid JSON, no additional text
- If information is not found, use null
- For lists, return empty array [] if no items found
- Dates should be in string format"
    )
}

pub fn job_description_prompt(jd_text: &str) -> String {
    format!(
        "\
You are an expert HR assistant. Extract information from the following job description text and return ONLY a valid JSON object.

Job Description Text:
{jd_text}

Extract the following information and return as JSON:

{{
    \"job_detail\": {{
        \"job_position\": \"string\",
        \"job_type\": \"string or null\",
        \"job_shift\": \"string or null\",
        \"job_industry\": \"string or null\",
        \"closing_date\": \"string or null\",
        \"min_experience\": \"number or null\",
        \"max_experience\": \"number or null\",
        \"no_of_openings\": \"number or null\",
        \"required_education\": [\"string\"],
        \"job_description\": \"string\"
    }},
    \"salary_range\": {{
        \"min_amount\": \"number or null\",
        \"max_amount\": \"number or null\"
    }},
    \"job_location\": {{
        \"city\": \"string or null\",
        \"state\": \"string or null\",
        \"country\": \"string or null\",
        \"zip_code\": \"string or null\"
    }},
    \"required_skills\": [\"string\"]
}}

Important:
- Return ONLY valid JSON, no additional text
- If information is not found, use null
- For lists, return empty array [] if no items found
- Experience should be in years (numbers)
- Salary amounts should be numbers"
    )
}
