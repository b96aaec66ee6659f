use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    #[default]
    Full,
    C1Accidental,
}

impl ReportType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "c1" | "c1_accidental" | "c1-accidental" => Some(Self::C1Accidental),
            _ => None,
        }
    }
}

/// Incident details printed on every page of the exported report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportMetadata {
    pub incident_number: String,
    pub location: String,
    pub postal_code: String,
    pub evidence_bag_number: String,
    pub report_type: ReportType,
}

impl ReportMetadata {
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.incident_number.trim().is_empty() {
            missing.push("incident_number");
        }
        if self.location.trim().is_empty() {
            missing.push("location");
        }
        missing
    }

    /// Format checks for the optional-format fields. Blank values pass; a
    /// blank required field is reported by `missing_required_fields` instead.
    pub fn validate(&self) -> FieldErrors {
        let checks: [(&str, &str, fn(&str) -> bool, &str); 3] = [
            (
                "incident_number",
                self.incident_number.trim(),
                is_incident_number,
                "Please use the format YYYYMMDD/XXXX",
            ),
            (
                "evidence_bag_number",
                self.evidence_bag_number.trim(),
                |value| is_digits(value, 4),
                "Please ensure that it is a 4 digit number",
            ),
            (
                "postal_code",
                self.postal_code.trim(),
                |value| is_digits(value, 6),
                "Please ensure that it is a 6 digit number",
            ),
        ];

        checks
            .into_iter()
            .map(|(field, value, valid, message)| {
                let message = if value.is_empty() || valid(value) {
                    ""
                } else {
                    message
                };
                (field.to_string(), message.to_string())
            })
            .collect()
    }

    /// Default export file stem, e.g. `20240101-0001-location`.
    pub fn file_stem(&self) -> String {
        format!("{}-location", self.incident_number.trim().replace('/', "-"))
    }
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|byte| byte.is_ascii_digit())
}

/// `20YYMMDD/XXXX` with a plausible calendar date.
fn is_incident_number(value: &str) -> bool {
    let Some((date, serial)) = value.split_once('/') else {
        return false;
    };
    if !is_digits(date, 8) || !is_digits(serial, 4) || !date.starts_with("20") {
        return false;
    }
    let month: u32 = date[4..6].parse().unwrap_or_default();
    let day: u32 = date[6..8].parse().unwrap_or_default();
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub metadata: ReportMetadata,
    pub page_size: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            metadata: ReportMetadata::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Field name to the message the form currently shows for it. An empty
/// message means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn message(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn has_errors(&self) -> bool {
        self.0.values().any(|message| !message.is_empty())
    }

    pub fn failing_fields(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, message)| !message.is_empty())
            .map(|(field, _)| field.as_str())
            .collect()
    }
}

impl FromIterator<(String, String)> for FieldErrors {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_full_report_and_ten_rows() {
        let settings = ReportSettings::default();
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(settings.metadata.report_type, ReportType::Full);
    }

    #[test]
    fn missing_fields_lists_blank_incident_and_location() {
        let metadata = ReportMetadata {
            incident_number: "20240101/0001".to_string(),
            location: "   ".to_string(),
            ..ReportMetadata::default()
        };
        assert_eq!(metadata.missing_required_fields(), vec!["location"]);
        assert_eq!(metadata.file_stem(), "20240101-0001-location");
    }

    #[test]
    fn settings_tolerate_partial_json() {
        let settings: ReportSettings =
            serde_json::from_str(r#"{"metadata":{"location":"Block 5"}}"#).expect("json");
        assert_eq!(settings.metadata.location, "Block 5");
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn empty_messages_are_not_errors() {
        let mut errors = FieldErrors::new();
        errors.set("location", "");
        assert!(!errors.has_errors());
        errors.set("incident_number", "Please use the format YYYYMMDD/XXXX");
        assert!(errors.has_errors());
        assert_eq!(errors.failing_fields(), vec!["incident_number"]);
        assert_eq!(errors.message("postal_code"), "");
    }

    #[test]
    fn validate_checks_formats_and_skips_blanks() {
        let mut metadata = ReportMetadata {
            incident_number: "20241301/0001".to_string(),
            postal_code: "12345".to_string(),
            evidence_bag_number: "0042".to_string(),
            ..ReportMetadata::default()
        };
        let errors = metadata.validate();
        assert_eq!(errors.failing_fields(), vec!["incident_number", "postal_code"]);
        assert_eq!(
            errors.message("postal_code"),
            "Please ensure that it is a 6 digit number"
        );

        metadata.incident_number = "20241231/0001".to_string();
        metadata.postal_code = String::new();
        assert!(!metadata.validate().has_errors());
    }

    #[test]
    fn report_type_parsing() {
        assert_eq!(ReportType::parse("C1"), Some(ReportType::C1Accidental));
        assert_eq!(ReportType::parse("full"), Some(ReportType::Full));
        assert_eq!(ReportType::parse("summary"), None);
    }
}
