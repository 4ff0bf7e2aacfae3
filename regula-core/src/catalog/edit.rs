//! Paid edits

use serde::{Deserialize, Serialize};
use std::fmt;

use super::package::{Category, Package};
use crate::config::CatalogConfig;
use crate::types::{self, Timestamp};

/// Fields an edit may change; `None` leaves the field alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub icon: Option<String>,
    /// Major edits are billed at the premium tier
    pub major_edit: bool,
}

impl EditRequest {
    pub(crate) fn apply_to(&self, package: &mut Package) {
        if let Some(name) = &self.name {
            package.name = name.clone();
        }
        if let Some(version) = &self.version {
            package.version = version.clone();
        }
        if let Some(description) = &self.description {
            package.description = description.clone();
        }
        if let Some(category) = self.category {
            package.category = category;
        }
        if let Some(icon) = &self.icon {
            package.icon = Some(icon.clone());
        }
    }
}

/// Billing tier of an edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditTier {
    Basic,
    Premium,
}

impl EditTier {
    pub fn for_request(request: &EditRequest) -> Self {
        if request.major_edit {
            EditTier::Premium
        } else {
            EditTier::Basic
        }
    }

    pub fn price(self, config: &CatalogConfig) -> u64 {
        match self {
            EditTier::Basic => config.basic_edit_price,
            EditTier::Premium => config.premium_edit_price,
        }
    }
}

impl fmt::Display for EditTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EditTier::Basic => "basic",
            EditTier::Premium => "premium",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Card,
    PayPal,
    Multicaixa,
    Transfer,
}

/// Proof of payment handed over with an edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub amount: u64,
    pub currency: String,
    pub method: PaymentMethod,
    pub transaction_id: String,
}

impl PaymentInfo {
    /// Payment with a fresh `TXN-<millis>` transaction id
    pub fn new(amount: u64, currency: impl Into<String>, method: PaymentMethod) -> Self {
        Self {
            amount,
            currency: currency.into(),
            method,
            transaction_id: format!("TXN-{}", types::now_millis()),
        }
    }
}

/// One applied edit, kept forever in the package's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditEntry {
    pub timestamp: Timestamp,
    /// Display name of whoever was logged in, if anyone
    pub editor: Option<String>,
    pub changes: EditRequest,
    pub tier: EditTier,
    pub amount_paid: u64,
    pub transaction_id: String,
}
