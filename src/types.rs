//! Core types shared by the parser, extractor and classifier

use serde::{Deserialize, Serialize};
use std::fmt;

/// Feature names in the order the classifier was fit against
pub const FEATURE_NAMES: [&str; 5] = [
    "body_length",
    "subject_length",
    "suspicious_keyword_count",
    "url_count",
    "special_char_count",
];

/// Plain-text view of a raw email
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedEmail {
    /// Decoded Subject header, if present
    pub subject: Option<String>,

    /// Visible body text with markup removed
    pub body: String,
}

impl ParsedEmail {
    /// Subject text, treating a missing header as empty
    #[must_use]
    pub fn subject_text(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }
}

/// Fixed-schema classifier input
///
/// Field order matches [`FEATURE_NAMES`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Character count of the body
    pub body_length: u64,

    /// Character count of the subject
    pub subject_length: u64,

    /// Number of distinct suspicious keywords present in the body
    pub suspicious_keyword_count: u64,

    /// Number of `http://` / `https://` prefixes in the body
    pub url_count: u64,

    /// Number of `!$%^&*()` characters in the body
    pub special_char_count: u64,
}

impl FeatureVector {
    /// Values in classifier order
    #[must_use]
    pub const fn to_array(&self) -> [u64; 5] {
        [
            self.body_length,
            self.subject_length,
            self.suspicious_keyword_count,
            self.url_count,
            self.special_char_count,
        ]
    }

    /// Values as model input
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_model_input(&self) -> [f64; 5] {
        self.to_array().map(|v| v as f64)
    }

    /// Named values in classifier order
    pub fn named(&self) -> impl Iterator<Item = (&'static str, u64)> {
        FEATURE_NAMES.into_iter().zip(self.to_array())
    }
}

/// Predicted class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Class 0
    Safe,
    /// Class 1
    Phishing,
}

impl Label {
    /// Map a classifier class index, where 1 means phishing
    #[must_use]
    pub const fn from_class(class: usize) -> Self {
        if class == 1 { Self::Phishing } else { Self::Safe }
    }

    /// Class index used by the classifier
    #[must_use]
    pub const fn class(self) -> usize {
        match self {
            Self::Safe => 0,
            Self::Phishing => 1,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Phishing => write!(f, "Phishing"),
        }
    }
}

/// Classifier output for a single email
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: Label,

    /// Probability of `label`, in `[0, 1]`
    pub confidence: f64,
}

impl PredictionResult {
    /// Build a result from class probabilities `[p(safe), p(phishing)]`
    #[must_use]
    pub fn from_proba(label: Label, proba: [f64; 2]) -> Self {
        Self {
            label,
            confidence: proba[label.class()].clamp(0.0, 1.0),
        }
    }

    #[must_use]
    pub fn is_phishing(&self) -> bool {
        self.label == Label::Phishing
    }

    /// Confidence as a percentage with two decimals, e.g. `97.25%`
    #[must_use]
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.confidence_percent())
    }
}
