use thiserror::Error;

use crate::form::ContactDetails;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    #[error("Required fields missing: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("E-mail address is malformed")]
    MalformedEmail,
}

/// Gatekeeper for the contact form: required fields present, e-mail roughly shaped.
pub struct ContactGuard;

impl ContactGuard {
    pub fn new() -> Self {
        Self
    }

    /// Returns a trimmed copy when the details may be submitted.
    pub fn check(&self, contact: &ContactDetails) -> Result<ContactDetails, GuardError> {
        let trimmed = ContactDetails {
            first_name: contact.first_name.trim().to_string(),
            last_name: contact.last_name.trim().to_string(),
            email: contact.email.trim().to_string(),
            phone: contact.phone.trim().to_string(),
        };

        let missing: Vec<&'static str> = [
            ("firstName", &trimmed.first_name),
            ("lastName", &trimmed.last_name),
            ("email", &trimmed.email),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(GuardError::MissingFields(missing));
        }
        if !looks_like_email(&trimmed.email) {
            return Err(GuardError::MalformedEmail);
        }
        Ok(trimmed)
    }
}

impl Default for ContactGuard {
    fn default() -> Self {
        Self::new()
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(first: &str, last: &str, email: &str) -> ContactDetails {
        ContactDetails {
            first_name: first.into(),
            last_name: last.into(),
            email: email.into(),
            phone: String::new(),
        }
    }

    #[test]
    fn phone_is_optional() {
        let checked = ContactGuard::new()
            .check(&contact(" Jan ", "de Vries", "jan@voorbeeld.nl"))
            .unwrap();
        assert_eq!(checked.first_name, "Jan");
        assert!(checked.phone.is_empty());
    }

    #[test]
    fn blank_required_fields_are_reported_together() {
        let err = ContactGuard::new()
            .check(&contact("  ", "", "jan@voorbeeld.nl"))
            .unwrap_err();
        assert_eq!(err, GuardError::MissingFields(vec!["firstName", "lastName"]));
    }

    #[test]
    fn email_needs_local_and_domain() {
        let guard = ContactGuard::new();
        for bad in ["jan", "@voorbeeld.nl", "jan@", "jan@a@b", "j an@x.nl"] {
            assert_eq!(
                guard.check(&contact("Jan", "de Vries", bad)),
                Err(GuardError::MalformedEmail),
                "{bad}"
            );
        }
    }
}
