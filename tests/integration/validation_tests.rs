//! Row validation and normalization properties

use std::collections::HashMap;
use trainee_gateway::ErrorType;
use trainee_gateway::core::processing::validator::{clean_name, normalize_email};
use trainee_gateway::core::processing::{RowDefaults, process_row};

fn defaults() -> RowDefaults {
    RowDefaults {
        role: "trainee".to_string(),
        batch: "7".to_string(),
        group_id: None,
        is_mock: false,
    }
}

fn row(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_normalization_is_idempotent() {
    // Re-running the validator on its own output yields the same output
    let first = process_row(
        &row(&[
            ("name", "  jane   doe "),
            ("email", " JANE@Example.COM "),
            ("nationality", " Kenya "),
            ("status", ""),
        ]),
        &defaults(),
    )
    .unwrap();

    let second = process_row(
        &row(&[
            ("name", &first.name),
            ("email", &first.email),
            ("password", &first.password),
            ("nationality", &first.nationality),
            ("status", &first.status),
        ]),
        &defaults(),
    )
    .unwrap();

    assert_eq!(second.name, first.name);
    assert_eq!(second.email, first.email);
    assert_eq!(second.password, first.password);
    assert_eq!(second.status, first.status);
    assert_eq!(second.nationality, first.nationality);
}

#[test]
fn test_email_validation_matrix() {
    let valid = [
        ("jane@example.com", "jane@example.com"),
        ("  JANE.DOE+tag@Example.COM ", "jane.doe+tag@example.com"),
        ("a_b-c%d@sub.domain.org", "a_b-c%d@sub.domain.org"),
    ];
    for (input, expected) in valid {
        assert_eq!(normalize_email(input).unwrap(), expected, "case: {:?}", input);
    }

    let invalid = [
        "",
        "   ",
        "plainaddress",
        "@example.com",
        "jane@",
        "jane@example",
        "jane doe@example.com",
        "jane@exa mple.com",
    ];
    for input in invalid {
        let err = normalize_email(input).unwrap_err();
        assert_eq!(err.error_type, ErrorType::ValidationError, "case: {:?}", input);
    }
}

#[test]
fn test_name_cleaning_rules() {
    assert_eq!(clean_name("jane doe").unwrap(), "Jane Doe");
    assert_eq!(clean_name("  JANE   DOE  ").unwrap(), "Jane Doe");
    assert_eq!(clean_name("mary-jane").unwrap(), "MaryJane");
    assert_eq!(clean_name("j. r. tolkien").unwrap(), "J R Tolkien");
    assert!(clean_name("...").is_err());
    assert!(clean_name("123 456").is_err());
}

#[test]
fn test_generated_password_strength() {
    let processed = process_row(
        &row(&[("name", "jane doe"), ("email", "jane@example.com")]),
        &defaults(),
    )
    .unwrap();

    let password = &processed.password;
    assert_eq!(password.len(), 12);
    assert!(password.chars().any(|c| c.is_ascii_uppercase()));
    assert!(password.chars().any(|c| c.is_ascii_lowercase()));
    assert!(password.chars().any(|c| c.is_ascii_digit()));
    assert!(password.chars().any(|c| !c.is_ascii_alphanumeric()));
}

#[test]
fn test_row_defaults_applied() {
    let defaults = RowDefaults {
        role: "mentor".to_string(),
        batch: "9".to_string(),
        group_id: Some("g-1".to_string()),
        is_mock: true,
    };
    let processed = process_row(
        &row(&[("name", "jane doe"), ("email", "jane@example.com")]),
        &defaults,
    )
    .unwrap();

    assert_eq!(processed.role, "mentor");
    assert_eq!(processed.batch, "9");
    assert_eq!(processed.groups, vec!["g-1".to_string()]);
    assert!(processed.is_mock);
    assert_eq!(processed.status, "Accepted");
}

#[test]
fn test_supplied_status_preserved() {
    let processed = process_row(
        &row(&[
            ("name", "jane doe"),
            ("email", "jane@example.com"),
            ("status", "Waitlisted"),
        ]),
        &defaults(),
    )
    .unwrap();
    assert_eq!(processed.status, "Waitlisted");
}

#[test]
fn test_extra_columns_preserved_as_metadata() {
    let processed = process_row(
        &row(&[
            ("name", "jane doe"),
            ("email", "jane@example.com"),
            ("university", "Addis Ababa University"),
            ("quiz_score", "87"),
        ]),
        &defaults(),
    )
    .unwrap();

    assert_eq!(
        processed.other_info.get("university").and_then(|v| v.as_str()),
        Some("Addis Ababa University")
    );
    assert_eq!(
        processed.other_info.get("quiz_score").and_then(|v| v.as_str()),
        Some("87")
    );
}
