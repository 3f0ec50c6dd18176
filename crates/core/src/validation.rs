//! Input validation utilities.
//!
//! Structural checks that do not need the database: required text present and non-blank,
//! time ranges ordered. Foreign-key existence is checked by the services at write time.

use crate::models::{
    NewCondition, NewEncounter, NewObservation, NewOrganization, NewPatient, NewPractitioner,
};
use crate::{CoreError, CoreResult};

/// Longest value accepted for any free-text column.
const MAX_TEXT_LEN: usize = 1024;

/// Payloads that can be checked before they reach the database.
pub trait Validate {
    /// # Errors
    ///
    /// Returns `CoreError::InvalidInput` naming the first offending field.
    fn validate(&self) -> CoreResult<()>;
}

/// Validates that a required text field is present and not just whitespace.
///
/// # Errors
///
/// Returns a `CoreError::InvalidInput` if the value is blank or longer than 1024 characters.
pub fn require_text(field: &str, value: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput(format!("{field} cannot be empty")));
    }
    optional_text(field, Some(value))
}

fn optional_text(field: &str, value: Option<&str>) -> CoreResult<()> {
    match value {
        Some(v) if v.chars().count() > MAX_TEXT_LEN => Err(CoreError::InvalidInput(format!(
            "{field} exceeds maximum length of {MAX_TEXT_LEN} characters"
        ))),
        _ => Ok(()),
    }
}

impl Validate for NewOrganization {
    fn validate(&self) -> CoreResult<()> {
        require_text("identifier", &self.identifier)?;
        require_text("name", &self.name)?;
        optional_text("email", self.email.as_deref())?;
        optional_text("address_line", self.address_line.as_deref())
    }
}

impl Validate for NewPatient {
    fn validate(&self) -> CoreResult<()> {
        require_text("identifier", &self.identifier)?;
        require_text("first_name", &self.first_name)?;
        require_text("last_name", &self.last_name)?;
        optional_text("email", self.email.as_deref())?;
        optional_text("address_line", self.address_line.as_deref())
    }
}

impl Validate for NewPractitioner {
    fn validate(&self) -> CoreResult<()> {
        require_text("name", &self.name)
    }
}

impl Validate for NewEncounter {
    fn validate(&self) -> CoreResult<()> {
        require_text("status", &self.status)?;

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err(CoreError::InvalidInput(
                    "end_time cannot be earlier than start_time".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Validate for NewCondition {
    fn validate(&self) -> CoreResult<()> {
        require_text("code", &self.code)
    }
}

impl Validate for NewObservation {
    fn validate(&self) -> CoreResult<()> {
        require_text("status", &self.status)?;
        require_text("code", &self.code)?;

        if let Some(value) = self.value_quantity {
            if !value.is_finite() {
                return Err(CoreError::InvalidInput(
                    "value_quantity must be a finite number".into(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn test_require_text_rejects_blank() {
        assert!(require_text("name", "Dr Who").is_ok());
        let err = require_text("name", "   ").expect_err("blank should be rejected");
        assert_eq!(err.to_string(), "invalid input: name cannot be empty");
    }

    #[test]
    fn test_patient_requires_names() {
        let birth_date = NaiveDate::from_ymd_opt(1990, 5, 15).expect("valid date");
        let mut patient = NewPatient::new("MRN-1", "Ada", "Lovelace", birth_date);
        assert!(patient.validate().is_ok());

        patient.last_name = String::new();
        let err = patient.validate().expect_err("missing last name should fail");
        assert!(err.to_string().contains("last_name"));
    }

    #[test]
    fn test_encounter_end_before_start_rejected() {
        let encounter = NewEncounter {
            patient_id: 1,
            status: "finished".into(),
            start_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
            ..Default::default()
        };
        let err = encounter.validate().expect_err("reversed range should fail");
        assert!(err.to_string().contains("end_time"));
    }

    #[test]
    fn test_text_limit_counts_characters() {
        let accented = "é".repeat(MAX_TEXT_LEN);
        assert!(accented.len() > MAX_TEXT_LEN);
        assert!(require_text("name", &accented).is_ok());

        let err = require_text("name", &"a".repeat(MAX_TEXT_LEN + 1))
            .expect_err("overlong value should be rejected");
        assert_eq!(
            err.to_string(),
            "invalid input: name exceeds maximum length of 1024 characters"
        );
    }
}
