//! Typed resume and job-description structures.
//!
//! Model output is loosely typed, so every field tolerates `null`, numbers
//! where text was asked for, and numeric strings where numbers were.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::lenient::{lenient_number, lenient_string, lenient_string_list, null_as_default};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedResume {
    #[serde(deserialize_with = "null_as_default")]
    pub personal_detail: PersonalDetail,
    #[serde(deserialize_with = "null_as_default")]
    pub address: Address,
    #[serde(deserialize_with = "null_as_default")]
    pub education: Vec<Education>,
    #[serde(deserialize_with = "null_as_default")]
    pub experience: Vec<WorkExperience>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalDetail {
    #[serde(deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub contact_no: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub nationality: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    #[serde(deserialize_with = "lenient_string")]
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(deserialize_with = "lenient_string")]
    pub degree: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub school: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkExperience {
    #[serde(deserialize_with = "lenient_string")]
    pub job_title: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub company_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub projects: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedJobDescription {
    #[serde(deserialize_with = "null_as_default")]
    pub job_detail: JobDetail,
    #[serde(deserialize_with = "null_as_default")]
    pub salary_range: SalaryRange,
    #[serde(deserialize_with = "null_as_default")]
    pub job_location: JobLocation,
    #[serde(deserialize_with = "lenient_string_list")]
    pub required_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDetail {
    #[serde(deserialize_with = "lenient_string")]
    pub job_position: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub job_type: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub job_shift: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub job_industry: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub closing_date: Option<String>,
    #[serde(deserialize_with = "lenient_number")]
    pub min_experience: Option<Number>,
    #[serde(deserialize_with = "lenient_number")]
    pub max_experience: Option<Number>,
    #[serde(deserialize_with = "lenient_number")]
    pub no_of_openings: Option<Number>,
    #[serde(deserialize_with = "lenient_string_list")]
    pub required_education: Vec<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub job_description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalaryRange {
    #[serde(deserialize_with = "lenient_number")]
    pub min_amount: Option<Number>,
    #[serde(deserialize_with = "lenient_number")]
    pub max_amount: Option<Number>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobLocation {
    #[serde(deserialize_with = "lenient_string")]
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub state: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub country: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub zip_code: Option<String>,
}
