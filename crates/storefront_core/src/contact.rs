use std::collections::BTreeMap;

use shared::domain::ContactField;
use tracing::info;

use crate::error::ContactError;

pub const CONTACT_CONFIRMATION: &str =
    "Thank you for your message! We will get back to you shortly.";

pub const DEFAULT_CONTACT_FIELDS: [&str; 4] = ["name", "email", "organization", "message"];

pub type ContactSubmission = BTreeMap<String, String>;

/// Receives submitted contact forms.
pub trait ContactSink: Send + Sync {
    fn submit(&self, submission: &ContactSubmission) -> Result<(), ContactError>;
}

#[derive(Debug, Clone, Default)]
pub struct LoggingContactSink;

impl ContactSink for LoggingContactSink {
    fn submit(&self, submission: &ContactSubmission) -> Result<(), ContactError> {
        info!(fields = ?submission, "contact form submitted");
        Ok(())
    }
}

/// Named text fields in display order. The set of names is fixed at construction.
#[derive(Debug, Clone)]
pub struct ContactForm {
    fields: Vec<ContactField>,
}

impl ContactForm {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: names
                .into_iter()
                .map(|name| ContactField {
                    name: name.into(),
                    value: String::new(),
                })
                .collect(),
        }
    }

    /// Updates a known field. Returns `false` and changes nothing for unknown names.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn fields(&self) -> &[ContactField] {
        &self.fields
    }

    /// Every named field, blank ones included.
    pub fn collect(&self) -> ContactSubmission {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect()
    }

    /// Current values overlaid with `posted`. Posted names the form does not know
    /// are carried in the submission only.
    pub fn submission_with(&self, posted: &[ContactField]) -> ContactSubmission {
        let mut submission = self.collect();
        for field in posted {
            submission.insert(field.name.clone(), field.value.clone());
        }
        submission
    }

    pub fn reset(&mut self) {
        for field in &mut self.fields {
            field.value.clear();
        }
    }
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::new(DEFAULT_CONTACT_FIELDS)
    }
}

#[cfg(test)]
#[path = "tests/contact_tests.rs"]
mod tests;
