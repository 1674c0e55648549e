use std::time::Duration;

use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::timeline::Timeline;

/// How long the success toast stays on screen.
pub const NOTICE_LIFETIME: Duration = Duration::from_millis(3000);

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());
// German numbers: +49 or a leading 0, then 9 to 12 digits
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\+49|0)[1-9]\d{8,11}$").unwrap());

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormConfig {
    pub form_selector: String,
    pub submit_selector: String,
    pub field_selector: String,
    pub busy_label: String,
    pub success_message: String,
    /// Simulated round trip before the form resets.
    pub delay_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            form_selector: ".contact-form form, form.contact-form".to_string(),
            submit_selector: "button[type=\"submit\"], .submit-button".to_string(),
            field_selector: "input, textarea".to_string(),
            busy_label: "Sending...".to_string(),
            success_message: "Thank you! We will get back to you within one business day.".to_string(),
            delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
}

impl FieldKind {
    /// From an input's `type` attribute.
    pub fn from_input_type(kind: &str) -> Self {
        match kind.to_ascii_lowercase().as_str() {
            "email" => FieldKind::Email,
            "tel" => FieldKind::Tel,
            _ => FieldKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInput {
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("This field is required")]
    Required,
    #[error("Please enter a valid email address")]
    Email,
    #[error("Please enter a valid phone number")]
    Phone,
}

pub fn validate_field(field: &FieldInput) -> Result<(), FieldError> {
    let value = field.value.trim();
    if value.is_empty() {
        return if field.required {
            Err(FieldError::Required)
        } else {
            Ok(())
        };
    }
    match field.kind {
        FieldKind::Email if !EMAIL_RE.is_match(value) => Err(FieldError::Email),
        FieldKind::Tel => {
            let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
            if PHONE_RE.is_match(&compact) {
                Ok(())
            } else {
                Err(FieldError::Phone)
            }
        }
        _ => Ok(()),
    }
}

pub trait FormSurface {
    fn fields(&self) -> Vec<FieldInput>;
    fn mark_field(&mut self, index: usize, error: Option<&FieldError>);
    fn submit_label(&self) -> String;
    fn set_submit(&mut self, enabled: bool, label: &str);
    fn reset_form(&mut self);
    fn notify(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Number of fields that failed validation.
    Invalid(usize),
    Sending,
    /// A submission is already in flight.
    Ignored,
}

#[derive(Debug)]
enum FormState {
    Idle,
    Sending { original_label: String },
}

#[derive(Debug)]
enum FormStep {
    Finish,
}

/// Stands in for a real submission: locks the button, waits, then resets.
pub struct ContactForm<S: FormSurface> {
    config: FormConfig,
    surface: S,
    state: FormState,
    timeline: Timeline<FormStep>,
}

impl<S: FormSurface> ContactForm<S> {
    pub fn new(config: FormConfig, surface: S) -> Self {
        Self {
            config,
            surface,
            state: FormState::Idle,
            timeline: Timeline::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.state, FormState::Sending { .. })
    }

    /// Validates a single field, e.g. when it loses focus.
    pub fn check_field(&mut self, index: usize) -> bool {
        let Some(field) = self.surface.fields().into_iter().nth(index) else {
            return true;
        };
        let result = validate_field(&field);
        self.surface.mark_field(index, result.as_ref().err());
        result.is_ok()
    }

    /// Clears a field's error while the visitor edits it.
    pub fn clear_field(&mut self, index: usize) {
        self.surface.mark_field(index, None);
    }

    pub fn submit(&mut self, now: Duration) -> SubmitOutcome {
        if self.is_sending() {
            return SubmitOutcome::Ignored;
        }

        let mut invalid = 0;
        for (i, field) in self.surface.fields().iter().enumerate() {
            if !field.required {
                continue;
            }
            let result = validate_field(field);
            if result.is_err() {
                invalid += 1;
            }
            self.surface.mark_field(i, result.as_ref().err());
        }
        if invalid > 0 {
            debug!("contact form rejected: {} invalid fields", invalid);
            return SubmitOutcome::Invalid(invalid);
        }

        let original_label = self.surface.submit_label();
        self.surface.set_submit(false, &self.config.busy_label);
        self.state = FormState::Sending { original_label };
        self.timeline
            .schedule(now + Duration::from_millis(self.config.delay_ms), FormStep::Finish);
        SubmitOutcome::Sending
    }

    pub fn tick(&mut self, now: Duration) {
        while let Some((_, step)) = self.timeline.pop_due(now) {
            match step {
                FormStep::Finish => {
                    let state = std::mem::replace(&mut self.state, FormState::Idle);
                    if let FormState::Sending { original_label } = state {
                        self.surface.set_submit(true, &original_label);
                        self.surface.reset_form();
                        self.surface.notify(&self.config.success_message);
                        info!("contact form submission simulated");
                    }
                }
            }
        }
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timeline.next_deadline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn field(kind: FieldKind, required: bool, value: &str) -> FieldInput {
        FieldInput {
            kind,
            required,
            value: value.to_string(),
        }
    }

    #[derive(Default)]
    struct FakeForm {
        fields: Vec<FieldInput>,
        errors: Vec<Option<FieldError>>,
        enabled: bool,
        label: String,
        resets: usize,
        notices: Vec<String>,
    }

    impl FakeForm {
        fn with(fields: Vec<FieldInput>) -> Self {
            Self {
                errors: vec![None; fields.len()],
                fields,
                enabled: true,
                label: "Send".to_string(),
                ..Default::default()
            }
        }
    }

    impl FormSurface for FakeForm {
        fn fields(&self) -> Vec<FieldInput> {
            self.fields.clone()
        }
        fn mark_field(&mut self, index: usize, error: Option<&FieldError>) {
            self.errors[index] = error.cloned();
        }
        fn submit_label(&self) -> String {
            self.label.clone()
        }
        fn set_submit(&mut self, enabled: bool, label: &str) {
            self.enabled = enabled;
            self.label = label.to_string();
        }
        fn reset_form(&mut self) {
            self.resets += 1;
            for f in &mut self.fields {
                f.value.clear();
            }
        }
        fn notify(&mut self, message: &str) {
            self.notices.push(message.to_string());
        }
    }

    #[test]
    fn field_rules() {
        assert_eq!(validate_field(&field(FieldKind::Text, true, "  ")), Err(FieldError::Required));
        assert_eq!(validate_field(&field(FieldKind::Text, false, "")), Ok(()));
        assert_eq!(validate_field(&field(FieldKind::Email, true, "a@b.de")), Ok(()));
        assert_eq!(validate_field(&field(FieldKind::Email, false, "a@b")), Err(FieldError::Email));
        assert_eq!(validate_field(&field(FieldKind::Email, true, "a b@c.de")), Err(FieldError::Email));
        assert_eq!(validate_field(&field(FieldKind::Tel, true, "+49 151 2345 6789")), Ok(()));
        assert_eq!(validate_field(&field(FieldKind::Tel, true, "030 12345678")), Ok(()));
        assert_eq!(validate_field(&field(FieldKind::Tel, true, "12345")), Err(FieldError::Phone));
        assert_eq!(validate_field(&field(FieldKind::Tel, true, "+4901512345678")), Err(FieldError::Phone));
        assert_eq!(FieldKind::from_input_type("EMAIL"), FieldKind::Email);
        assert_eq!(FieldKind::from_input_type("search"), FieldKind::Text);
    }

    #[test]
    fn busy_lifecycle() {
        let mut form = ContactForm::new(
            FormConfig::default(),
            FakeForm::with(vec![
                field(FieldKind::Text, true, "Ada"),
                field(FieldKind::Email, true, "ada@example.org"),
            ]),
        );

        assert_eq!(form.submit(ms(0)), SubmitOutcome::Sending);
        assert!(!form.surface().enabled);
        assert_eq!(form.surface().label, "Sending...");
        assert_eq!(form.submit(ms(500)), SubmitOutcome::Ignored);

        form.tick(ms(1999));
        assert!(form.is_sending());
        form.tick(ms(2000));
        let s = form.surface();
        assert!(s.enabled);
        assert_eq!(s.label, "Send");
        assert_eq!(s.resets, 1);
        assert_eq!(s.notices.len(), 1);
        assert!(!form.is_sending());
        assert_eq!(form.next_deadline(), None);
    }

    #[test]
    fn invalid_form_is_not_submitted() {
        let mut form = ContactForm::new(
            FormConfig::default(),
            FakeForm::with(vec![
                field(FieldKind::Text, true, ""),
                field(FieldKind::Email, true, "nope"),
                field(FieldKind::Tel, false, "x"),
            ]),
        );
        assert_eq!(form.submit(ms(0)), SubmitOutcome::Invalid(2));
        let s = form.surface();
        assert_eq!(s.errors[0], Some(FieldError::Required));
        assert_eq!(s.errors[1], Some(FieldError::Email));
        assert_eq!(s.errors[2], None, "optional fields are only checked on blur");
        assert!(s.enabled);
        assert_eq!(form.next_deadline(), None);
    }

    #[test]
    fn blur_checks_and_input_clears() {
        let mut form = ContactForm::new(
            FormConfig::default(),
            FakeForm::with(vec![field(FieldKind::Tel, false, "x")]),
        );
        assert!(!form.check_field(0));
        assert_eq!(form.surface().errors[0], Some(FieldError::Phone));
        form.clear_field(0);
        assert_eq!(form.surface().errors[0], None);
        assert!(form.check_field(5));
    }
}
