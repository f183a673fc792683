//! Row validation and normalization
//!
//! Pure functions over one raw row plus the batch's defaults. A row that
//! passes always has a cleaned non-empty name and a validated lowercase
//! email; nothing else in the pipeline re-checks those invariants.

use crate::core::models::{BatchConfig, ConfigInfo, ErrorType, ProcessedTrainee, RowError, TraineeInfo};
use crate::utils::password::{DEFAULT_PASSWORD_LENGTH, generate_secure_password};
use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Fields consumed into named `ProcessedTrainee` slots; everything else in
/// a row is folded into `other_info`.
const ESSENTIAL_FIELDS: &[&str] = &[
    "name",
    "email",
    "password",
    "nationality",
    "gender",
    "date_of_birth",
    "vulnerable",
    "bio",
    "city_of_residence",
    "status",
    "other_info",
];

/// Batch-level defaults applied to every row
#[derive(Debug, Clone)]
pub struct RowDefaults {
    pub role: String,
    pub batch: String,
    pub group_id: Option<String>,
    pub is_mock: bool,
}

impl From<&BatchConfig> for RowDefaults {
    fn from(config: &BatchConfig) -> Self {
        Self {
            role: config.role.clone(),
            batch: config.batch.clone(),
            group_id: config.group_id.clone(),
            is_mock: config.is_mock,
        }
    }
}

impl From<&ConfigInfo> for RowDefaults {
    fn from(config: &ConfigInfo) -> Self {
        Self {
            role: config.role.clone(),
            batch: config.batch.clone(),
            group_id: config.group_id.clone(),
            is_mock: config.is_mock,
        }
    }
}

/// Clean and title-case a name.
///
/// Trims, title-cases, strips `-` and `.`, and collapses repeated spaces.
/// Fails when nothing alphabetic remains.
pub fn clean_name(raw: &str) -> Result<String, RowError> {
    let titled = title_case(raw.trim());
    let stripped: String = titled.chars().filter(|c| !matches!(c, '-' | '.')).collect();
    let cleaned = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    if cleaned.is_empty() || !cleaned.chars().any(char::is_alphabetic) {
        return Err(RowError::validation(
            "name",
            "Name must contain at least one alphabetic character",
        ));
    }
    Ok(cleaned)
}

/// Trim, lowercase, and validate an email address.
pub fn normalize_email(raw: &str) -> Result<String, RowError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(RowError::validation("email", "Email is required"));
    }

    let pattern = Regex::new(EMAIL_PATTERN).map_err(|e| {
        RowError::new(ErrorType::UnexpectedError, format!("Email pattern error: {}", e))
    })?;
    if !pattern.is_match(&email) {
        return Err(RowError::validation(
            "email",
            format!("Invalid email format: {}", email),
        ));
    }
    Ok(email)
}

/// Normalize one CSV row into a [`ProcessedTrainee`].
pub fn process_row(
    row: &HashMap<String, String>,
    defaults: &RowDefaults,
) -> Result<ProcessedTrainee, RowError> {
    let name = clean_name(row.get("name").map(String::as_str).unwrap_or_default())?;
    let email = normalize_email(row.get("email").map(String::as_str).unwrap_or_default())?;

    let field = |key: &str| -> String {
        row.get(key)
            .map(|value| value.trim().to_string())
            .unwrap_or_default()
    };

    let mut other_info = parse_other_info_column(row.get("other_info").map(String::as_str));
    for (key, value) in row {
        let trimmed = value.trim();
        if !ESSENTIAL_FIELDS.contains(&key.as_str()) && !trimmed.is_empty() {
            other_info.insert(key.clone(), Value::String(trimmed.to_string()));
        }
    }

    Ok(ProcessedTrainee {
        name,
        email,
        password: resolve_password(row.get("password").map(String::as_str)),
        status: default_status(&field("status")),
        nationality: field("nationality"),
        gender: field("gender"),
        date_of_birth: parse_date_of_birth(&field("date_of_birth"))?,
        vulnerable: field("vulnerable"),
        city_of_residence: field("city_of_residence"),
        bio: field("bio"),
        role: defaults.role.clone(),
        batch: defaults.batch.clone(),
        groups: defaults.group_id.iter().cloned().collect(),
        is_mock: defaults.is_mock,
        other_info,
    })
}

/// Normalize a single-submission payload into a [`ProcessedTrainee`].
pub fn process_single(
    trainee: &TraineeInfo,
    config: &ConfigInfo,
) -> Result<ProcessedTrainee, RowError> {
    let defaults = RowDefaults::from(config);

    let name = clean_name(&trainee.name)?;
    let email = normalize_email(&trainee.email)?;

    let other_info = match &trainee.other_info {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(raw)) => parse_other_info_column(Some(raw)),
        _ => Map::new(),
    };

    Ok(ProcessedTrainee {
        name,
        email,
        password: resolve_password(trainee.password.as_deref()),
        status: default_status(trainee.status.as_deref().unwrap_or_default()),
        nationality: trainee.nationality.trim().to_string(),
        gender: trainee.gender.trim().to_string(),
        date_of_birth: trainee.date_of_birth,
        vulnerable: trainee.vulnerable.trim().to_string(),
        city_of_residence: trainee.city_of_residence.trim().to_string(),
        bio: trainee.bio.trim().to_string(),
        role: defaults.role,
        batch: defaults.batch,
        groups: defaults.group_id.iter().cloned().collect(),
        is_mock: defaults.is_mock,
        other_info,
    })
}

/// A supplied non-blank password is used verbatim; otherwise a strong
/// random one is generated server-side. One policy, both modes.
fn resolve_password(supplied: Option<&str>) -> String {
    match supplied {
        Some(password) if !password.trim().is_empty() => password.trim().to_string(),
        _ => generate_secure_password(DEFAULT_PASSWORD_LENGTH),
    }
}

fn default_status(raw: &str) -> String {
    if raw.trim().is_empty() {
        "Accepted".to_string()
    } else {
        raw.trim().to_string()
    }
}

fn parse_date_of_birth(raw: &str) -> Result<Option<NaiveDate>, RowError> {
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            RowError::validation(
                "date_of_birth",
                format!("Invalid date_of_birth (expected YYYY-MM-DD): {}", raw),
            )
        })
}

/// A textual `other_info` column is parsed as JSON, `{}` on failure.
fn parse_other_info_column(raw: Option<&str>) -> Map<String, Value> {
    raw.and_then(|text| serde_json::from_str::<Value>(text).ok())
        .and_then(|value| match value {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default()
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alphabetic = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alphabetic {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(c);
            prev_alphabetic = false;
        }
    }
    out
}
