//! Field rules for the profile and password forms.
//!
//! Everything here is pure: forms pass field values in and render the
//! returned messages themselves.

use regex::Regex;

pub const DATE_FIELDS: [&str; 3] = ["birthday", "hrmis_joining_date", "hrmis_commission_date"];

pub const REQUIRED_FIELDS: [&str; 10] = [
    "hrmis_employee_id",
    "hrmis_cnic",
    "hrmis_father_name",
    "birthday",
    "gender",
    "hrmis_cadre",
    "hrmis_designation",
    "hrmis_bps",
    "district_id",
    "facility_id",
];

/// Fields checked while the user types.
pub const LIVE_FIELDS: [&str; 6] = [
    "hrmis_cnic",
    "hrmis_bps",
    "hrmis_leaves_taken",
    "hrmis_father_name",
    "hrmis_employee_id",
    "hrmis_contact_info",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

pub struct ProfileRules {
    cnic: Regex,
    father_name: Regex,
    employee_id: Regex,
    contact: Regex,
}

impl ProfileRules {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            cnic: Regex::new(r"^(\d{5}-\d{7}-\d{1}|\d{13})$")?,
            father_name: Regex::new(r"^[a-zA-Z\s]+$")?,
            employee_id: Regex::new(r"^[A-Za-z0-9\-/]+$")?,
            contact: Regex::new(r"^[0-9+\-\s()@.]+$")?,
        })
    }

    /// Message for a live `input` check, `None` when the value is acceptable
    /// (or empty; emptiness is only enforced on submit).
    pub fn check_field(&self, field: &str, value: &str) -> Option<&'static str> {
        match field {
            "hrmis_cnic" => {
                let value = value.trim();
                (!value.is_empty() && !self.cnic.is_match(value))
                    .then_some("CNIC format: xxxxx-xxxxxxx-x or xxxxxxxxxxxxx")
            }
            "hrmis_bps" => match value.trim().parse::<i64>() {
                Ok(bps) if !(1..=22).contains(&bps) => Some("BPS must be between 1 and 22"),
                _ => None,
            },
            "hrmis_leaves_taken" => match value.trim().parse::<f64>() {
                Ok(taken) if taken < 0.0 => Some("Leaves taken cannot be negative"),
                Ok(taken) if taken > 365.0 => Some("Leaves taken looks unrealistic"),
                _ => None,
            },
            "hrmis_father_name" => (!value.is_empty() && !self.father_name.is_match(value))
                .then_some("Only alphabets and spaces allowed"),
            "hrmis_employee_id" => (!value.is_empty() && !self.employee_id.is_match(value))
                .then_some("Only letters, numbers, - and / allowed"),
            "hrmis_contact_info" => (!value.is_empty() && !self.contact.is_match(value))
                .then_some("Invalid phone or email format"),
            _ => None,
        }
    }

    /// Submit-time checks. `value` returns `None` for fields missing from the
    /// form; `today` is `YYYY-MM-DD`. Errors come in render order, so a later
    /// error for the same field replaces an earlier one.
    pub fn validate_submit(
        &self,
        value: impl Fn(&str) -> Option<String>,
        today: &str,
    ) -> Vec<FieldError> {
        let mut errors = Vec::new();

        for field in REQUIRED_FIELDS {
            if value(field).is_some_and(|text| text.trim().is_empty()) {
                errors.push(FieldError::new(field, "This field is required"));
            }
        }

        if let Some(cnic) = value("hrmis_cnic")
            && !self.cnic.is_match(cnic.trim())
        {
            errors.push(FieldError::new("hrmis_cnic", "Invalid CNIC format"));
        }

        for field in DATE_FIELDS {
            if value(field).is_some_and(|date| !date.is_empty() && date.as_str() > today) {
                errors.push(FieldError::new(field, "Future dates are not allowed"));
            }
        }

        if let Some(error) = date_order_error(&value) {
            errors.push(error);
        }
        errors
    }
}

/// Commission must not precede birth, joining must not precede commission.
/// Only the first violation is reported.
fn date_order_error(value: &impl Fn(&str) -> Option<String>) -> Option<FieldError> {
    let present = |field: &str| value(field).filter(|date| !date.is_empty());
    let birthday = present("birthday");
    let commission = present("hrmis_commission_date");
    let joining = present("hrmis_joining_date");

    if let (Some(birthday), Some(commission)) = (&birthday, &commission)
        && commission < birthday
    {
        return Some(FieldError::new(
            "hrmis_commission_date",
            "Commission date cannot be before Date of Birth",
        ));
    }
    if let (Some(commission), Some(joining)) = (&commission, &joining)
        && joining < commission
    {
        return Some(FieldError::new(
            "hrmis_joining_date",
            "Joining date cannot be before Commission date",
        ));
    }
    None
}

// ===== PASSWORD =====

pub const PASSWORD_RULE_MESSAGE: &str =
    "Password must be 8+ chars with uppercase, lowercase and a number.";

/// At least 8 characters with an uppercase letter, a lowercase letter and a digit.
pub fn password_is_strong(password: &str) -> bool {
    password.chars().count() >= 8
        && password.chars().any(|ch| ch.is_ascii_digit())
        && password.chars().any(|ch| ch.is_ascii_lowercase())
        && password.chars().any(|ch| ch.is_ascii_uppercase())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchFeedback {
    pub message: &'static str,
    pub class_name: &'static str,
}

/// Live feedback under the confirmation field.
pub fn password_match_feedback(new_password: &str, confirmation: &str) -> MatchFeedback {
    if confirmation.is_empty() {
        MatchFeedback {
            message: "",
            class_name: "small",
        }
    } else if confirmation != new_password {
        MatchFeedback {
            message: "Doesn't match the new password",
            class_name: "text-danger small",
        }
    } else {
        MatchFeedback {
            message: "Passwords match",
            class_name: "text-success small",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PasswordField {
    New,
    Confirmation,
}

/// Reason to block the password form, with the field to focus.
pub fn password_submit_error(
    new_password: &str,
    confirmation: &str,
) -> Option<(PasswordField, &'static str)> {
    if !password_is_strong(new_password) {
        Some((PasswordField::New, PASSWORD_RULE_MESSAGE))
    } else if new_password != confirmation {
        Some((PasswordField::Confirmation, "Passwords do not match"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn form(values: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |field: &str| values.get(field).cloned()
    }

    fn complete_profile() -> Vec<(&'static str, &'static str)> {
        vec![
            ("hrmis_employee_id", "EMP-12/3"),
            ("hrmis_cnic", "35202-1234567-1"),
            ("hrmis_father_name", "Muhammad Aslam"),
            ("birthday", "1990-04-01"),
            ("gender", "male"),
            ("hrmis_cadre", "medical"),
            ("hrmis_designation", "Medical Officer"),
            ("hrmis_bps", "17"),
            ("district_id", "1"),
            ("facility_id", "10"),
            ("hrmis_commission_date", "2015-01-01"),
            ("hrmis_joining_date", "2015-02-01"),
        ]
    }

    #[test]
    fn live_checks_match_field_formats() {
        let rules = ProfileRules::new().unwrap();
        assert_eq!(rules.check_field("hrmis_cnic", "3520212345671"), None);
        assert_eq!(rules.check_field("hrmis_cnic", " 35202-1234567-1 "), None);
        assert!(rules.check_field("hrmis_cnic", "35202-123").is_some());
        assert_eq!(rules.check_field("hrmis_cnic", ""), None);

        assert_eq!(
            rules.check_field("hrmis_bps", "23"),
            Some("BPS must be between 1 and 22")
        );
        assert_eq!(rules.check_field("hrmis_bps", "abc"), None);
        assert_eq!(
            rules.check_field("hrmis_leaves_taken", "-1"),
            Some("Leaves taken cannot be negative")
        );
        assert_eq!(
            rules.check_field("hrmis_leaves_taken", "400"),
            Some("Leaves taken looks unrealistic")
        );
        assert!(rules.check_field("hrmis_father_name", "Aslam2").is_some());
        assert_eq!(rules.check_field("hrmis_employee_id", "A-1/2"), None);
        assert_eq!(rules.check_field("hrmis_contact_info", "+92 (300) 1234567"), None);
        assert!(rules.check_field("hrmis_contact_info", "call me").is_some());
    }

    #[test]
    fn complete_profile_passes_submit() {
        let rules = ProfileRules::new().unwrap();
        let errors = rules.validate_submit(form(&complete_profile()), "2026-10-17");
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn submit_reports_required_future_and_order_errors() {
        let rules = ProfileRules::new().unwrap();
        let mut values = complete_profile();
        values.retain(|(key, _)| *key != "hrmis_designation");
        values.push(("hrmis_designation", "  "));
        values.retain(|(key, _)| *key != "birthday" && *key != "hrmis_joining_date");
        values.push(("birthday", "2030-01-01"));
        values.push(("hrmis_joining_date", "2014-12-31"));

        let errors = rules.validate_submit(form(&values), "2026-10-17");
        assert_eq!(
            errors,
            vec![
                FieldError::new("hrmis_designation", "This field is required"),
                FieldError::new("birthday", "Future dates are not allowed"),
                FieldError::new(
                    "hrmis_commission_date",
                    "Commission date cannot be before Date of Birth"
                ),
            ]
        );
    }

    #[test]
    fn absent_fields_are_not_required() {
        let rules = ProfileRules::new().unwrap();
        let errors = rules.validate_submit(form(&[("hrmis_cnic", "3520212345671")]), "2026-10-17");
        assert!(errors.is_empty());
    }

    #[test]
    fn password_rules() {
        assert!(password_is_strong("Secret123"));
        assert!(!password_is_strong("secret123"));
        assert!(!password_is_strong("SECRET123"));
        assert!(!password_is_strong("Sec1234"));

        assert_eq!(password_match_feedback("Secret123", "").message, "");
        assert_eq!(
            password_match_feedback("Secret123", "Secret12").class_name,
            "text-danger small"
        );
        assert_eq!(
            password_match_feedback("Secret123", "Secret123").message,
            "Passwords match"
        );

        assert_eq!(
            password_submit_error("weak", "weak"),
            Some((PasswordField::New, PASSWORD_RULE_MESSAGE))
        );
        assert_eq!(
            password_submit_error("Secret123", "Secret124"),
            Some((PasswordField::Confirmation, "Passwords do not match"))
        );
        assert_eq!(password_submit_error("Secret123", "Secret123"), None);
    }
}
