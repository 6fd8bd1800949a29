//! Contact form submissions: validation, sanitizing and delivery

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ContactLimits;
use crate::helpers::{clip, html_escape};

lazy_static! {
    /// Deliberately loose: something@something.tld, no spaces
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

/// Why a submission was refused
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContactError {
    #[error("field `{0}` is required")]
    Missing(&'static str),

    #[error("invalid email address")]
    InvalidEmail,

    /// The honeypot field was filled in
    #[error("submission looks automated")]
    Spam,
}

/// Contact form payload as posted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    /// Honeypot; hidden from humans, bots tend to fill it
    pub website: String,
}

/// A validated, escaped submission ready for delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Validate and sanitize the submission
    pub fn validate(&self, limits: &ContactLimits) -> Result<ContactMessage, ContactError> {
        if !self.website.trim().is_empty() {
            return Err(ContactError::Spam);
        }

        let name = clip(&self.name, limits.name_max);
        let email = clip(&self.email, limits.email_max);
        let subject = clip(&self.subject, limits.subject_max);
        let message = clip(&self.message, limits.message_max);

        if name.is_empty() {
            return Err(ContactError::Missing("name"));
        }
        if email.is_empty() {
            return Err(ContactError::Missing("email"));
        }
        if message.is_empty() {
            return Err(ContactError::Missing("message"));
        }
        if !EMAIL_RE.is_match(&email) {
            return Err(ContactError::InvalidEmail);
        }

        Ok(ContactMessage {
            name: html_escape(&name),
            email: html_escape(&email),
            subject: html_escape(&subject),
            message: html_escape(&message),
        })
    }
}

/// Where accepted submissions go
pub trait ContactSink: Send + Sync {
    fn deliver(&self, message: &ContactMessage) -> Result<()>;
}

/// Writes submissions to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl ContactSink for LogSink {
    fn deliver(&self, message: &ContactMessage) -> Result<()> {
        tracing::info!(
            name = %message.name,
            email = %message.email,
            subject = %message.subject,
            "Contact message received ({} chars)",
            message.message.chars().count()
        );
        Ok(())
    }
}
