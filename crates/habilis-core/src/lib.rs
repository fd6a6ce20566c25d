//! # Habilis Core Library
//!
//! This library provides the business logic behind the Habilis kit quiz: a
//! short personality quiz about a child whose answers pick the monthly
//! educational kit to recommend. The `habilis` CLI is a thin layer over it.
//!
//! ## Architecture
//!
//! - **Profile Resolver**: Pure tally-and-tie-break over quiz answers
//! - **Wizard**: Immutable state machine for the four quiz steps
//! - **Checkout**: Routing to payment, login or registration
//! - **Catalog**: Backend collaborator for products and accounts
//! - **Storage**: TOML-based quiz configuration
//!
//! ## Key Components
//!
//! - [`ProfileResolver`]: Validated tie-break priority and product mapping
//! - [`Wizard`]: Transition function over [`WizardState`]
//! - [`QuizConfig`]: Configuration management
//! - [`Catalog`]: Trait for product and account lookups

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod profile;
pub mod quiz;
pub mod storage;
pub mod wizard;

pub use catalog::{Account, Catalog, HttpCatalog, Product, StaticCatalog};
pub use checkout::{CheckoutRoute, CheckoutSession, PaymentDraft, PendingCheckout};
pub use error::{CatalogError, CheckoutError, ConfigError, CoreError, ResolveError, WizardError};
pub use profile::{
    map_to_recommendation, resolve, ProductRef, ProfileLabel, ProfileMapping, ProfileResolver,
    ProfileTally, Resolution, TieBreakPriority,
};
pub use quiz::{AnswerOption, Question, QuestionBank};
pub use storage::{ProfileInfo, QuizConfig};
pub use wizard::{ChildInfo, Wizard, WizardEvent, WizardState};
