// Enforce at crate level
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! Phishing Email Detector
//!
//! Turns raw email source into a phishing/safe verdict using a pre-trained
//! classifier over five hand-engineered features.
//!
//! # Pipeline
//!
//! - [`parse_email`] reduces raw source to a plain-text subject and body
//! - [`FeatureVector::extract`] derives the fixed-order feature vector
//! - a [`Classifier`] turns the vector into a [`PredictionResult`]
//! - [`check_email`] runs the whole chain and returns a renderable [`Report`]
//!
//! # Example
//!
//! ```rust
//! use phish_detect::{FeatureVector, parse_email};
//!
//! let raw = "From: sender@example.com\r\nSubject: Hello\r\n\r\nPlease verify your login!";
//! let parsed = parse_email(raw);
//! let features = FeatureVector::extract(&parsed);
//!
//! assert_eq!(parsed.subject.as_deref(), Some("Hello"));
//! assert_eq!(features.suspicious_keyword_count, 2);
//! assert_eq!(features.special_char_count, 1);
//! ```

mod detector;
mod error;
mod features;
mod model;
mod parser;
mod types;

pub use detector::{EMPTY_INPUT_WARNING, Report, check_email};
pub use error::{ModelError, Result};
pub use features::SUSPICIOUS_KEYWORDS;
pub use model::{
    Classifier, DecisionTree, LogisticRegression, MODEL_PATH, Model, RandomForest, shared_model,
};
pub use parser::{parse_email, strip_html};
pub use types::*;
