//! Step-1 form: the candidate payload a visitor submits and the checks
//! that turn it into an accepted submission.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::FieldErrors;

/// Candidate payload from the rating + contact form. Everything is
/// optional or defaulted so validation can report missing fields instead
/// of failing to deserialize.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewForm {
    /// Star rating, 1 to 5. `None` when nothing was selected.
    pub rating: Option<u8>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Marketplace country code, e.g. "us". Not validated here; unknown
    /// codes degrade to the default marketplace at redirect time.
    #[serde(default)]
    pub country: String,
}

/// A submission that passed validation. Field shapes are guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSubmission {
    pub rating: u8,
    pub name: String,
    pub email: String,
    pub phone_number: Option<String>,
    /// Lowercased country code as captured.
    pub country: String,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?[\d\s\-()]{7,15}$").unwrap())
}

/// Validate a candidate form. Returns an empty map when the form is
/// acceptable; otherwise one message per offending field, all at once.
pub fn validate(form: &ReviewForm) -> FieldErrors {
    let mut errors = FieldErrors::new();

    match form.rating {
        None => {
            errors.insert("rating".into(), "Please select a rating".into());
        }
        Some(r) if !(1..=5).contains(&r) => {
            errors.insert("rating".into(), "Rating must be between 1 and 5".into());
        }
        Some(_) => {}
    }

    if form.name.trim().is_empty() {
        errors.insert("name".into(), "Name is required".into());
    }

    if form.email.trim().is_empty() {
        errors.insert("email".into(), "Email is required".into());
    } else if !email_regex().is_match(form.email.trim()) {
        errors.insert(
            "email".into(),
            "Please enter a valid email address".into(),
        );
    }

    if let Some(phone) = &form.phone_number
        && !phone.is_empty()
        && !phone_regex().is_match(phone)
    {
        errors.insert(
            "phone_number".into(),
            "Please enter a valid phone number".into(),
        );
    }

    errors
}

impl ReviewForm {
    /// Convert into a typed submission, or return every validation error.
    pub fn validated(self) -> Result<ReviewSubmission, FieldErrors> {
        let errors = validate(&self);
        if !errors.is_empty() {
            return Err(errors);
        }
        // rating presence is guaranteed by validate()
        let rating = self.rating.unwrap_or(1);
        Ok(ReviewSubmission {
            rating,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone_number: self.phone_number.filter(|p| !p.is_empty()),
            country: self.country.trim().to_ascii_lowercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ReviewForm {
        ReviewForm {
            rating: Some(5),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            phone_number: None,
            country: "us".into(),
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(validate(&valid_form()).is_empty());
    }

    #[test]
    fn missing_rating_reported() {
        let form = ReviewForm {
            rating: None,
            ..valid_form()
        };
        let errors = validate(&form);
        assert_eq!(errors.get("rating").unwrap(), "Please select a rating");
    }

    #[test]
    fn out_of_range_rating_reported() {
        for rating in [0u8, 6] {
            let form = ReviewForm {
                rating: Some(rating),
                ..valid_form()
            };
            assert!(validate(&form).contains_key("rating"), "rating {rating}");
        }
    }

    #[test]
    fn blank_name_reported() {
        let form = ReviewForm {
            name: "   ".into(),
            ..valid_form()
        };
        let errors = validate(&form);
        assert_eq!(errors.get("name").unwrap(), "Name is required");
    }

    #[test]
    fn email_shapes() {
        let cases = [
            ("", false),
            ("plainaddress", false),
            ("a b@example.com", false),
            ("a@b", false),
            ("a@b.c", true),
            ("alice@example.com", true),
        ];
        for (email, ok) in cases {
            let form = ReviewForm {
                email: email.into(),
                ..valid_form()
            };
            let errors = validate(&form);
            assert_eq!(!errors.contains_key("email"), ok, "email {email:?}");
        }
    }

    #[test]
    fn phone_is_optional_but_checked_when_present() {
        let absent = ReviewForm {
            phone_number: None,
            ..valid_form()
        };
        assert!(validate(&absent).is_empty());

        let cases = [
            ("+1 (555) 123-4567", true),
            ("5551234", true),
            ("123456", false),           // too short
            ("1234567890123456", false), // too long
            ("555-ABC-1234", false),     // letters
        ];
        for (phone, ok) in cases {
            let form = ReviewForm {
                phone_number: Some(phone.into()),
                ..valid_form()
            };
            let errors = validate(&form);
            assert_eq!(!errors.contains_key("phone_number"), ok, "phone {phone:?}");
        }
    }

    #[test]
    fn all_errors_reported_at_once() {
        let form = ReviewForm {
            rating: None,
            name: "".into(),
            email: "not-an-email".into(),
            phone_number: Some("abc".into()),
            country: "us".into(),
        };
        let errors = validate(&form);
        assert_eq!(errors.len(), 4);
        assert!(errors.contains_key("rating"));
        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("phone_number"));
    }

    #[test]
    fn unknown_country_is_not_an_error() {
        let form = ReviewForm {
            country: "atlantis".into(),
            ..valid_form()
        };
        assert!(validate(&form).is_empty());
    }

    #[test]
    fn validated_normalizes() {
        let form = ReviewForm {
            rating: Some(4),
            name: "  Bob  ".into(),
            email: " bob@example.com ".into(),
            phone_number: Some(String::new()),
            country: "UK".into(),
        };
        let submission = form.validated().unwrap();
        assert_eq!(submission.name, "Bob");
        assert_eq!(submission.email, "bob@example.com");
        assert_eq!(submission.phone_number, None);
        assert_eq!(submission.country, "uk");
    }

    #[test]
    fn validated_returns_all_errors() {
        let form = ReviewForm::default();
        let errors = form.validated().unwrap_err();
        assert!(errors.len() >= 3);
    }
}
