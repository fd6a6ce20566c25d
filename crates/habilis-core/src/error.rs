//! Core error types for habilis-core.
//!
//! Every failure the library can report is a variant of one of the enums
//! below. [`CoreError`] wraps them all for callers that do not care which
//! layer failed.

use std::path::PathBuf;
use thiserror::Error;

use crate::profile::ProfileLabel;

/// Core error type for habilis-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Profile resolution errors
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Wizard transition errors
    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    /// Checkout planning errors
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Catalog (backend API) errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Profile resolution errors.
///
/// None of these are recoverable locally: each one means either the caller
/// broke a precondition or the configuration is incomplete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Resolution was invoked before any question was answered
    #[error("cannot resolve a profile from zero answers")]
    IncompleteInput,

    /// A tie could not be broken because no tied label is in the priority order
    #[error("tie between {winners:?} has no entry in the tie-break priority")]
    PriorityGap { winners: Vec<ProfileLabel> },

    /// The winning profile has no product mapped to it
    #[error("no product mapped for profile '{0}'")]
    MissingMapping(ProfileLabel),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The same label appears twice in the tie-break priority
    #[error("Profile '{0}' appears more than once in the tie-break priority")]
    DuplicatePriority(ProfileLabel),

    /// A label is prioritized (or answerable) but has no product
    #[error("Profile '{0}' has no product mapping")]
    Unmapped(ProfileLabel),

    /// A label has a product but no place in the tie-break priority
    #[error("Profile '{0}' is missing from the tie-break priority")]
    Unprioritized(ProfileLabel),
}

/// Wizard transition errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// Child name blank or age out of range
    #[error("invalid child info: {0}")]
    InvalidChildInfo(String),

    /// The chosen letter is not an option of the current question
    #[error("question {question} has no option '{letter}'")]
    UnknownOption { question: usize, letter: String },

    /// The event is not accepted in the current state
    #[error("cannot apply {event} while in {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    /// Resolution failed after the last answer
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Checkout planning errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// Anonymous checkout without an email address
    #[error("an email address is required to continue")]
    MissingEmail,

    /// The supplied email address is malformed
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    /// Checkout requested before the wizard reached its checkout step
    #[error("checkout is not available while in {0}")]
    NotAtCheckout(&'static str),

    /// A saved checkout no longer matches the quiz configuration
    #[error("saved checkout is not valid: {0}")]
    InvalidPending(String),
}

/// Errors raised by a [`crate::catalog::Catalog`] implementation.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The product id is not in the catalog
    #[error("product {0} not found")]
    ProductNotFound(u64),

    /// The backend answered with an unexpected status
    #[error("backend returned HTTP {status} for {endpoint}")]
    Status { endpoint: String, status: u16 },

    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The base URL could not be joined with an endpoint path
    #[error("invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
