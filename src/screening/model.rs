//! Candidate record and technical question set.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::lenient::lenient_string;

/// The seven fields collected during screening, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateField {
    FullName,
    Email,
    Phone,
    YearsOfExperience,
    DesiredPosition,
    CurrentLocation,
    TechStack,
}

impl CandidateField {
    pub const ALL: [CandidateField; 7] = [
        Self::FullName,
        Self::Email,
        Self::Phone,
        Self::YearsOfExperience,
        Self::DesiredPosition,
        Self::CurrentLocation,
        Self::TechStack,
    ];

    /// Key used in snapshots and extraction output.
    pub fn key(&self) -> &'static str {
        match self {
            Self::FullName => "full_name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::YearsOfExperience => "years_of_experience",
            Self::DesiredPosition => "desired_position",
            Self::CurrentLocation => "current_location",
            Self::TechStack => "tech_stack",
        }
    }

    /// Human-readable label used when asking for missing information.
    pub fn label(&self) -> &'static str {
        match self {
            Self::FullName => "full name",
            Self::Email => "email address",
            Self::Phone => "phone number",
            Self::YearsOfExperience => "years of experience",
            Self::DesiredPosition => "desired position",
            Self::CurrentLocation => "current location",
            Self::TechStack => "tech stack",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }
}

impl fmt::Display for CandidateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Professional experience as reported by the candidate.
///
/// Models usually return a number, but free text ("5+") is kept rather
/// than dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Experience {
    Years(Number),
    Text(String),
}

impl Experience {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(Self::Years(n.clone())),
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else if let Ok(n) = s.parse::<Number>() {
                    Some(Self::Years(n))
                } else {
                    Some(Self::Text(s.to_string()))
                }
            }
            _ => None,
        }
    }

    fn is_set(&self) -> bool {
        match self {
            Self::Years(_) => true,
            Self::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Years(n) => write!(f, "{n} years"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Structured facts collected about a candidate.
///
/// Extraction only ever adds information: a populated field is replaced
/// only by another non-empty value, and `tech_stack` grows by set union.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecord {
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "deserialize_experience")]
    pub years_of_experience: Option<Experience>,
    #[serde(deserialize_with = "lenient_string")]
    pub desired_position: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub current_location: Option<String>,
    #[serde(deserialize_with = "deserialize_tech_stack")]
    pub tech_stack: BTreeSet<String>,
}

impl CandidateRecord {
    /// Fold an extraction result into the record.
    ///
    /// Null, empty and unknown entries are skipped. Returns the fields that
    /// changed.
    pub fn merge(&mut self, extracted: &Map<String, Value>) -> Vec<CandidateField> {
        let mut changed = Vec::new();

        for (key, value) in extracted {
            let Some(field) = CandidateField::from_key(key) else {
                continue;
            };

            let updated = match field {
                CandidateField::FullName => set_text(&mut self.full_name, value),
                CandidateField::Email => set_text(&mut self.email, value),
                CandidateField::Phone => set_text(&mut self.phone, value),
                CandidateField::DesiredPosition => set_text(&mut self.desired_position, value),
                CandidateField::CurrentLocation => set_text(&mut self.current_location, value),
                CandidateField::YearsOfExperience => match Experience::from_value(value) {
                    Some(exp) if self.years_of_experience.as_ref() != Some(&exp) => {
                        self.years_of_experience = Some(exp);
                        true
                    }
                    _ => false,
                },
                CandidateField::TechStack => {
                    let before = self.tech_stack.len();
                    self.tech_stack.extend(tech_entries(value));
                    self.tech_stack.len() != before
                }
            };

            if updated {
                changed.push(field);
            }
        }

        changed
    }

    /// Whether a single field holds a usable value.
    pub fn has(&self, field: CandidateField) -> bool {
        let text_set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        match field {
            CandidateField::FullName => text_set(&self.full_name),
            CandidateField::Email => text_set(&self.email),
            CandidateField::Phone => text_set(&self.phone),
            CandidateField::YearsOfExperience => {
                self.years_of_experience.as_ref().is_some_and(Experience::is_set)
            }
            CandidateField::DesiredPosition => text_set(&self.desired_position),
            CandidateField::CurrentLocation => text_set(&self.current_location),
            CandidateField::TechStack => !self.tech_stack.is_empty(),
        }
    }

    /// True once all seven fields are populated.
    pub fn is_complete(&self) -> bool {
        CandidateField::ALL.iter().all(|f| self.has(*f))
    }

    /// Labels of the fields still missing, in canonical order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        CandidateField::ALL
            .iter()
            .filter(|f| !self.has(**f))
            .map(|f| f.label())
            .collect()
    }

    /// Tech stack as a display list.
    pub fn tech_stack_list(&self) -> Vec<String> {
        self.tech_stack.iter().cloned().collect()
    }

    /// Render the populated fields as a markdown list.
    pub fn to_display_section(&self) -> String {
        let mut parts = vec!["**Collected Information:**".to_string()];

        if let Some(ref name) = self.full_name {
            parts.push(format!("- **Name:** {name}"));
        }
        if let Some(ref email) = self.email {
            parts.push(format!("- **Email:** {email}"));
        }
        if let Some(ref phone) = self.phone {
            parts.push(format!("- **Phone:** {phone}"));
        }
        if let Some(ref exp) = self.years_of_experience {
            parts.push(format!("- **Experience:** {exp}"));
        }
        if let Some(ref position) = self.desired_position {
            parts.push(format!("- **Position:** {position}"));
        }
        if let Some(ref location) = self.current_location {
            parts.push(format!("- **Location:** {location}"));
        }
        if !self.tech_stack.is_empty() {
            parts.push(format!("- **Tech Stack:** {}", self.tech_stack_list().join(", ")));
        }

        if parts.len() == 1 {
            parts.push("- (nothing yet)".to_string());
        }
        parts.join("\n")
    }
}

fn set_text(slot: &mut Option<String>, value: &Value) -> bool {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return false,
    };
    if text.is_empty() || slot.as_deref() == Some(text.as_str()) {
        return false;
    }
    *slot = Some(text);
    true
}

/// Technology names in an extracted value. A bare string counts as one entry.
fn tech_entries(value: &Value) -> Vec<String> {
    let one = |v: &Value| match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    };
    match value {
        Value::Array(items) => items.iter().filter_map(one).collect(),
        other => one(other).into_iter().collect(),
    }
}

fn deserialize_experience<'de, D>(deserializer: D) -> Result<Option<Experience>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Experience::from_value(&value))
}

fn deserialize_tech_stack<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(tech_entries(&value).into_iter().collect())
}

/// Generated interview questions, keyed by technology.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TechQuestionSet(BTreeMap<String, Vec<String>>);

impl TechQuestionSet {
    /// Build a question set from model output, keeping technologies that
    /// came with at least one non-empty question.
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let questions = map
            .iter()
            .filter_map(|(tech, value)| {
                let list: Vec<String> = match value {
                    Value::Array(items) => items
                        .iter()
                        .filter_map(|q| q.as_str())
                        .map(str::trim)
                        .filter(|q| !q.is_empty())
                        .map(String::from)
                        .collect(),
                    Value::String(q) if !q.trim().is_empty() => vec![q.trim().to_string()],
                    _ => Vec::new(),
                };
                (!list.is_empty()).then(|| (tech.trim().to_string(), list))
            })
            .collect();
        Self(questions)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, tech: &str) -> Option<&[String]> {
        self.0.get(tech).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Render as a markdown block with questions numbered from 1.
    pub fn to_display(&self) -> String {
        if self.0.is_empty() {
            return String::new();
        }

        let mut lines = vec!["**Technical Questions:**".to_string()];
        for (tech, questions) in &self.0 {
            lines.push(format!("\n**{tech}:**"));
            for (i, question) in questions.iter().enumerate() {
                lines.push(format!("{}. {question}", i + 1));
            }
        }
        lines.join("\n")
    }
}

impl<const N: usize> From<[(&str, Vec<&str>); N]> for TechQuestionSet {
    fn from(entries: [(&str, Vec<&str>); N]) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(tech, qs)| (tech.to_string(), qs.into_iter().map(String::from).collect()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn complete_record() -> CandidateRecord {
        let mut record = CandidateRecord::default();
        record.merge(&obj(json!({
            "full_name": "Sarah Johnson",
            "email": "sarah@example.com",
            "phone": "+1-555-123-4567",
            "years_of_experience": 7,
            "desired_position": "Senior Full Stack Developer",
            "current_location": "Austin, Texas",
            "tech_stack": ["Python", "React"]
        })));
        record
    }

    #[test]
    fn default_record_is_empty() {
        let record = CandidateRecord::default();
        assert!(!record.is_complete());
        assert_eq!(
            record.missing_fields(),
            vec![
                "full name",
                "email address",
                "phone number",
                "years of experience",
                "desired position",
                "current location",
                "tech stack"
            ]
        );
    }

    #[test]
    fn merge_sets_known_fields_and_ignores_unknown() {
        let mut record = CandidateRecord::default();
        let changed = record.merge(&obj(json!({
            "full_name": "Ada Lovelace",
            "favourite_colour": "green",
            "email": null
        })));
        assert_eq!(changed, vec![CandidateField::FullName]);
        assert_eq!(record.full_name.as_deref(), Some("Ada Lovelace"));
        assert!(record.email.is_none());
    }

    #[test]
    fn null_never_overwrites() {
        let mut record = CandidateRecord::default();
        record.merge(&obj(json!({"email": "ada@example.com"})));
        record.merge(&obj(json!({"email": null})));
        assert_eq!(record.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn empty_string_never_overwrites() {
        let mut record = CandidateRecord::default();
        record.merge(&obj(json!({"phone": "555-0100"})));
        let changed = record.merge(&obj(json!({"phone": "   "})));
        assert!(changed.is_empty());
        assert_eq!(record.phone.as_deref(), Some("555-0100"));
    }

    #[test]
    fn non_null_value_replaces() {
        let mut record = CandidateRecord::default();
        record.merge(&obj(json!({"current_location": "Austin"})));
        record.merge(&obj(json!({"current_location": "Denver"})));
        assert_eq!(record.current_location.as_deref(), Some("Denver"));
    }

    #[test]
    fn tech_stack_unions() {
        let mut record = CandidateRecord::default();
        record.merge(&obj(json!({"tech_stack": ["A", "B"]})));
        record.merge(&obj(json!({"tech_stack": ["B", "C"]})));
        assert_eq!(record.tech_stack_list(), vec!["A", "B", "C"]);
    }

    #[test]
    fn tech_stack_merge_is_idempotent() {
        let mut once = CandidateRecord::default();
        once.merge(&obj(json!({"tech_stack": ["Rust", "Go"]})));
        let mut twice = once.clone();
        let changed = twice.merge(&obj(json!({"tech_stack": ["Go", "Rust"]})));
        assert!(changed.is_empty());
        assert_eq!(once.tech_stack, twice.tech_stack);
    }

    #[test]
    fn tech_stack_merge_is_commutative() {
        let mut ab = CandidateRecord::default();
        ab.merge(&obj(json!({"tech_stack": ["A"]})));
        ab.merge(&obj(json!({"tech_stack": ["B", "C"]})));
        let mut ba = CandidateRecord::default();
        ba.merge(&obj(json!({"tech_stack": ["B", "C"]})));
        ba.merge(&obj(json!({"tech_stack": ["A"]})));
        assert_eq!(ab.tech_stack, ba.tech_stack);
    }

    #[test]
    fn scalar_tech_stack_is_single_entry() {
        let mut record = CandidateRecord::default();
        record.merge(&obj(json!({"tech_stack": ["Python"]})));
        record.merge(&obj(json!({"tech_stack": "Kubernetes"})));
        assert_eq!(record.tech_stack_list(), vec!["Kubernetes", "Python"]);
    }

    #[test]
    fn experience_accepts_numbers_and_text() {
        let mut record = CandidateRecord::default();
        record.merge(&obj(json!({"years_of_experience": "5"})));
        assert_eq!(record.years_of_experience.as_ref().unwrap().to_string(), "5 years");

        record.merge(&obj(json!({"years_of_experience": "about a decade"})));
        assert_eq!(
            record.years_of_experience,
            Some(Experience::Text("about a decade".to_string()))
        );
    }

    #[test]
    fn numeric_phone_is_kept_as_text() {
        let mut record = CandidateRecord::default();
        record.merge(&obj(json!({"phone": 5551234567u64})));
        assert_eq!(record.phone.as_deref(), Some("5551234567"));
    }

    #[test]
    fn completeness_tracks_missing_fields() {
        let mut record = complete_record();
        assert!(record.is_complete());
        assert!(record.missing_fields().is_empty());

        record.tech_stack.clear();
        record.email = None;
        assert!(!record.is_complete());
        assert_eq!(record.missing_fields(), vec!["email address", "tech stack"]);
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = complete_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["years_of_experience"], 7);
        assert_eq!(json["tech_stack"], json!(["Python", "React"]));

        let parsed: CandidateRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn record_deserializes_nulls_and_missing_keys() {
        let parsed: CandidateRecord = serde_json::from_value(json!({
            "full_name": "Sam",
            "tech_stack": null
        }))
        .unwrap();
        assert_eq!(parsed.full_name.as_deref(), Some("Sam"));
        assert!(parsed.tech_stack.is_empty());
        assert!(parsed.email.is_none());
    }

    #[test]
    fn record_restores_raw_model_values() {
        let parsed: CandidateRecord = serde_json::from_value(json!({
            "full_name": "Sam",
            "phone": 5551234567u64,
            "years_of_experience": "5+",
            "current_location": ["Berlin"],
            "tech_stack": "Rust"
        }))
        .unwrap();
        assert_eq!(parsed.phone.as_deref(), Some("5551234567"));
        assert_eq!(parsed.years_of_experience, Some(Experience::Text("5+".into())));
        assert!(parsed.current_location.is_none());
        assert_eq!(parsed.tech_stack_list(), vec!["Rust"]);
    }

    #[test]
    fn display_section_lists_populated_fields_only() {
        let mut record = CandidateRecord::default();
        record.merge(&obj(json!({"full_name": "Bob", "years_of_experience": 4})));
        let section = record.to_display_section();
        assert!(section.contains("Bob"));
        assert!(section.contains("4 years"));
        assert!(!section.contains("Email"));
    }

    #[test]
    fn question_set_filters_malformed_entries() {
        let set = TechQuestionSet::from_json_map(&obj(json!({
            "Python": ["What is the GIL?", "  ", 3],
            "Go": "Explain goroutines.",
            "Rust": [],
            "Java": null
        })));
        assert_eq!(set.len(), 2);
        assert_eq!(set.get("Python").unwrap(), ["What is the GIL?".to_string()]);
        assert_eq!(set.get("Go").unwrap(), ["Explain goroutines.".to_string()]);
        assert!(set.get("Rust").is_none());
    }

    #[test]
    fn question_display_is_numbered() {
        let set = TechQuestionSet::from([("Go", vec!["First?", "Second?"])]);
        let display = set.to_display();
        assert!(display.contains("**Go:**"));
        assert!(display.contains("1. First?"));
        assert!(display.contains("2. Second?"));
        assert!(TechQuestionSet::default().to_display().is_empty());
    }
}
