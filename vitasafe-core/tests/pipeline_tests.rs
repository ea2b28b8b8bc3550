// vitasafe-core/tests/pipeline_tests.rs
//! End-to-end runs of the validation pipeline on realistic documents.

use serde_json::{json, Value};
use test_log::test;

use vitasafe_core::{
    headless_sanitize, ErrorCode, Severity, ValidationLevel, Validator, ValidatorConfig,
};

fn resume() -> Value {
    json!({
        "personalInfo": {
            "name": "Jane Doe",
            "email": " Jane.Doe@Example.COM ",
            "phone": "+1 555 123 4567",
            "linkedin": "linkedin.com/in/janedoe"
        },
        "summary": "Engineer focused on R&D, shipping 100% of \\textbf{critical} work.",
        "experience": [
            {
                "position": "Lead",
                "company": "Acme_Corp",
                "startDate": "March 2019",
                "endDate": "Present",
                "achievements": ["Cut costs by $2M", "Led team #1"]
            },
            {
                "position": "Engineer",
                "company": "Widgets",
                "startDate": "2016-2",
                "endDate": {"year": 2019, "month": 2}
            }
        ],
        "education": [
            {"degree": "BSc", "institution": "State U", "graduationDate": "05/15/2016"}
        ],
        "skills": ["Rust", "C++", "LaTeX ~ typesetting"]
    })
}

#[test]
fn full_resume_normalizes_and_escapes() {
    let validator = Validator::new(&ValidatorConfig::default()).unwrap();
    let result = validator.validate_with_level(&resume(), ValidationLevel::Strict).unwrap();

    assert!(result.is_valid, "{:?}", result.errors);
    let data = &result.normalized_data;
    assert_eq!(data["personalInfo"]["email"], "jane.doe@example.com");
    assert_eq!(data["personalInfo"]["phone"], "+1 (555) 123-4567");
    assert_eq!(data["personalInfo"]["linkedin"], "https://linkedin.com/in/janedoe");
    assert_eq!(data["summary"], r"Engineer focused on R\&D, shipping 100\% of \textbf{critical} work.");
    assert_eq!(data["experience"][0]["company"], r"Acme\_Corp");
    assert_eq!(data["experience"][0]["startDate"], "2019-03");
    assert_eq!(data["experience"][0]["achievements"][0], r"Cut costs by \$2M");
    assert_eq!(data["experience"][1]["startDate"], "2016-02");
    assert_eq!(data["experience"][1]["endDate"], "2019-02");
    assert_eq!(data["education"][0]["graduationDate"], "2016-05-15");
    assert_eq!(data["skills"][2], r"LaTeX \textasciitilde{} typesetting");

    assert!(result.info.iter().all(|d| d.severity() == Severity::Info));
    assert_eq!(result.metadata.counts.info, result.info.len());
    assert!(result.find(ErrorCode::PhoneNormalized, "personalInfo.phone").is_some());
}

#[test]
fn one_bad_field_does_not_hide_others() {
    let mut doc = resume();
    doc["personalInfo"]["email"] = json!("not an email");
    doc["personalInfo"]["linkedin"] = json!("javascript:alert(1)");
    doc["experience"][1]["startDate"] = json!("Spring 2016");

    let validator = Validator::new(&ValidatorConfig::default()).unwrap();
    let result = validator.validate(&doc).unwrap();
    assert!(!result.is_valid);
    let codes: Vec<ErrorCode> = result.errors.iter().map(|e| e.code()).collect();
    assert!(codes.contains(&ErrorCode::InvalidEmail));
    assert!(codes.contains(&ErrorCode::UrlSchemeNotAllowed));
    assert!(codes.contains(&ErrorCode::InvalidDateFormat));
    assert_eq!(result.metadata.counts.errors, 3);
}

#[test]
fn security_rejection_wins_over_other_problems() {
    let mut doc = resume();
    doc["personalInfo"]["email"] = json!("bad");
    doc["experience"][0]["achievements"][1] = json!("\\input|\"cat /etc/passwd\"");

    let validator = Validator::new(&ValidatorConfig::default()).unwrap();
    for level in [ValidationLevel::Strict, ValidationLevel::Lenient, ValidationLevel::Permissive] {
        let violation = validator.validate_with_level(&doc, level).unwrap_err();
        assert_eq!(violation.code, ErrorCode::ShellExecution);
        assert_eq!(violation.pattern, "pipe_input");
        assert_eq!(violation.field_path, "experience[0].achievements[1]");
    }
}

#[test]
fn revalidating_normalized_data_changes_nothing_typed() {
    let validator = Validator::new(&ValidatorConfig { allow_basic_formatting: false, ..ValidatorConfig::default() })
        .unwrap();
    let mut doc = resume();
    doc["summary"] = json!("Plain summary");
    doc["skills"] = json!(["Rust"]);
    doc["experience"][0]["company"] = json!("Acme");
    doc["experience"][0]["achievements"] = json!(["Shipped"]);

    let first = validator.validate(&doc).unwrap();
    let second = validator.validate(&first.normalized_data).unwrap();
    assert_eq!(first.normalized_data, second.normalized_data);
    assert!(second.info.is_empty(), "{:?}", second.info);
}

#[test]
fn sanitizer_is_usable_alone() {
    assert_eq!(headless_sanitize("a_b", false).unwrap(), r"a\_b");
    let err = headless_sanitize("\\csname foo\\endcsname", true).unwrap_err();
    assert_eq!(err.code, ErrorCode::ExpansionPrimitive);
    assert!(err.field_path.is_empty());
}
