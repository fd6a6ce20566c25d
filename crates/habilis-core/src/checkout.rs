//! Checkout hand-off.
//!
//! Decides where the "continue to payment" action leads:
//! - logged in: straight to payment with a [`PaymentDraft`]
//! - anonymous with a known email: login, then resume
//! - anonymous with a new email: registration, then resume
//!
//! Anonymous users get a [`PendingCheckout`] record to persist across the
//! login/registration detour; [`PendingCheckout::resume`] rebuilds the
//! checkout step from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Account, Product};
use crate::error::CheckoutError;
use crate::profile::{ProfileLabel, ProfileResolver, Resolution};
use crate::wizard::{ChildInfo, WizardState};

/// Everything needed to check out one recommended kit.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutSession {
    pub child: ChildInfo,
    pub resolution: Resolution,
    pub product: Product,
}

impl CheckoutSession {
    /// Build from a wizard in the `Checkout` state.
    pub fn from_state(state: &WizardState, product: Product) -> Result<Self, CheckoutError> {
        match state {
            WizardState::Checkout { child, resolution } => Ok(Self {
                child: child.clone(),
                resolution: resolution.clone(),
                product,
            }),
            other => Err(CheckoutError::NotAtCheckout(other.name())),
        }
    }

    pub fn payment(&self, account: &Account) -> PaymentDraft {
        PaymentDraft {
            user_id: account.id,
            user_email: account.email.clone(),
            product_id: self.product.id,
            product_name: self.product.name.clone(),
            product_price: self.product.price,
            child_name: self.child.name.clone(),
            child_age: self.child.age,
            profile: self.resolution.profile.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn pending(&self, email: &str) -> PendingCheckout {
        PendingCheckout {
            id: Uuid::new_v4(),
            child_name: self.child.name.clone(),
            child_age: self.child.age,
            resolution: self.resolution.clone(),
            product_id: self.product.id,
            product_name: self.product.name.clone(),
            product_price: self.product.price,
            email: email.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Decide the next step of checkout.
    ///
    /// `email_exists` is the backend's answer for `email`; `None` means the
    /// check failed, in which case registration is the fallback.
    ///
    /// # Errors
    ///
    /// Anonymous users must provide a well-formed email:
    /// [`CheckoutError::MissingEmail`] / [`CheckoutError::InvalidEmail`].
    pub fn plan(
        &self,
        account: Option<&Account>,
        email: Option<&str>,
        email_exists: Option<bool>,
    ) -> Result<CheckoutRoute, CheckoutError> {
        if let Some(account) = account {
            return Ok(CheckoutRoute::Payment(self.payment(account)));
        }

        let email = validate_email(email)?;
        let pending = self.pending(email);

        let route = match email_exists {
            Some(true) => CheckoutRoute::Login {
                email: email.to_string(),
                pending,
            },
            Some(false) => CheckoutRoute::Register {
                email: Some(email.to_string()),
                pending,
            },
            None => CheckoutRoute::Register {
                email: None,
                pending,
            },
        };
        Ok(route)
    }
}

/// Where checkout continues.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum CheckoutRoute {
    Payment(PaymentDraft),
    Login {
        email: String,
        pending: PendingCheckout,
    },
    Register {
        email: Option<String>,
        pending: PendingCheckout,
    },
}

/// Payload handed to the payment step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDraft {
    pub user_id: u64,
    pub user_email: String,
    pub product_id: u64,
    pub product_name: String,
    pub product_price: f64,
    pub child_name: String,
    pub child_age: u8,
    pub profile: ProfileLabel,
    pub timestamp: DateTime<Utc>,
}

/// Quiz outcome saved while an anonymous user logs in or registers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCheckout {
    pub id: Uuid,
    pub child_name: String,
    pub child_age: u8,
    pub resolution: Resolution,
    pub product_id: u64,
    pub product_name: String,
    pub product_price: f64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl PendingCheckout {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Rebuild the checkout step and its product.
    ///
    /// The record comes back from outside the process, so it is checked
    /// against `resolver` the same way a live quiz would be: the child info
    /// must parse, the tally must resolve to the saved profile, and the
    /// product must be the one mapped to it.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InvalidPending`] when any of those checks fails.
    pub fn resume(
        self,
        resolver: &ProfileResolver,
    ) -> Result<(WizardState, Product), CheckoutError> {
        let invalid = |message: String| CheckoutError::InvalidPending(message);

        let child = ChildInfo::parse(&self.child_name, self.child_age)
            .map_err(|e| invalid(e.to_string()))?;

        let resolution = self.resolution;
        let winner = resolver
            .resolve_tally(&resolution.tally)
            .map_err(|e| invalid(e.to_string()))?;
        if winner != resolution.profile {
            return Err(invalid(format!(
                "answers resolve to '{winner}', not '{}'",
                resolution.profile
            )));
        }

        let mapped = resolver
            .recommend(&resolution.profile)
            .map_err(|e| invalid(e.to_string()))?;
        if mapped != resolution.product || self.product_id != mapped.0 {
            return Err(invalid(format!(
                "profile '{}' maps to product {mapped}, record has {} and {}",
                resolution.profile, resolution.product, self.product_id
            )));
        }

        let product = Product {
            id: self.product_id,
            name: self.product_name,
            description: None,
            price: self.product_price,
        };
        Ok((WizardState::Checkout { child, resolution }, product))
    }
}

/// Trim and minimally validate an email address.
pub fn validate_email(email: Option<&str>) -> Result<&str, CheckoutError> {
    let email = email.map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return Err(CheckoutError::MissingEmail);
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(CheckoutError::InvalidEmail(email.to_string()))
    }
}
