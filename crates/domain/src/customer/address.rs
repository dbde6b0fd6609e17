//! A single postal address owned by one customer record.

use chrono::{DateTime, Utc};
use common::AddressId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::validation::Violations;

use super::AddressType;

/// Country recorded when the caller leaves it out.
pub const DEFAULT_COUNTRY: &str = "India";

/// A validated postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub address_type: AddressType,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Unvalidated address input as supplied by a caller.
///
/// Every field is optional so that validation can report all missing
/// fields at once instead of failing on the first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDraft {
    pub address_type: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
    pub is_default: Option<bool>,
}

impl AddressDraft {
    /// Creates a draft with the four required fields set.
    pub fn new(
        address_line1: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        pincode: impl Into<String>,
    ) -> Self {
        Self {
            address_line1: Some(address_line1.into()),
            city: Some(city.into()),
            state: Some(state.into()),
            pincode: Some(pincode.into()),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, address_type: impl Into<String>) -> Self {
        self.address_type = Some(address_type.into());
        self
    }

    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = Some(is_default);
        self
    }
}

/// Field overwrites for an existing address. Absent fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressPatch {
    pub address_type: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub country: Option<String>,
    pub is_default: Option<bool>,
}

impl Address {
    /// Validates a draft and builds a new address with a fresh id.
    ///
    /// The draft's `is_default` is taken as given; default selection is the
    /// owning [`AddressSet`](super::AddressSet)'s concern.
    pub fn from_draft(draft: AddressDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let mut v = Violations::new();

        let address_type = match non_blank(draft.address_type.as_deref()) {
            Some(t) => v.parse::<AddressType>(
                "addressType",
                t,
                "Address type must be one of home, work, billing, shipping",
            ),
            None => Some(AddressType::default()),
        };
        let line1 = v.required(
            "addressLine1",
            draft.address_line1.as_deref(),
            "Address line 1 is required",
        );
        let city = v.required("city", draft.city.as_deref(), "City is required");
        let state = v.required("state", draft.state.as_deref(), "State is required");
        let pincode = v
            .required("pincode", draft.pincode.as_deref(), "Pincode is required")
            .and_then(|p| v.pincode("pincode", p));

        v.into_result()?;

        // into_result succeeded, so every required value above is Some
        match (address_type, line1, city, state, pincode) {
            (Some(address_type), Some(line1), Some(city), Some(state), Some(pincode)) => Ok(Self {
                id: AddressId::new(),
                address_type,
                address_line1: line1.to_string(),
                address_line2: non_blank(draft.address_line2.as_deref()).map(str::to_string),
                city: city.to_string(),
                state: state.to_string(),
                pincode,
                country: country_or_default(draft.country.as_deref()),
                is_default: draft.is_default.unwrap_or(false),
                created_at: now,
                updated_at: now,
            }),
            _ => Err(DomainError::invalid("address", "Address is incomplete")),
        }
    }

    /// Overwrites the fields present in `patch`.
    ///
    /// Each present field is checked before anything is written, so a
    /// rejected patch leaves the address unchanged. Fields the patch does
    /// not mention are not re-validated.
    pub fn apply_patch(&mut self, patch: AddressPatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut v = Violations::new();

        let address_type = patch.address_type.as_deref().and_then(|t| {
            v.parse::<AddressType>(
                "addressType",
                t,
                "Address type must be one of home, work, billing, shipping",
            )
        });
        let line1 = patch.address_line1.as_deref().and_then(|l| {
            v.required("addressLine1", Some(l), "Address line 1 is required")
                .map(str::to_string)
        });
        let city = patch
            .city
            .as_deref()
            .and_then(|c| v.required("city", Some(c), "City is required").map(str::to_string));
        let state = patch
            .state
            .as_deref()
            .and_then(|s| v.required("state", Some(s), "State is required").map(str::to_string));
        let pincode = patch.pincode.as_deref().and_then(|p| v.pincode("pincode", p));

        v.into_result()?;

        if let Some(address_type) = address_type {
            self.address_type = address_type;
        }
        if let Some(line1) = line1 {
            self.address_line1 = line1;
        }
        if let Some(line2) = patch.address_line2.as_deref() {
            self.address_line2 = non_blank(Some(line2)).map(str::to_string);
        }
        if let Some(city) = city {
            self.city = city;
        }
        if let Some(state) = state {
            self.state = state;
        }
        if let Some(pincode) = pincode {
            self.pincode = pincode;
        }
        if let Some(country) = patch.country.as_deref() {
            self.country = country_or_default(Some(country));
        }
        if let Some(is_default) = patch.is_default {
            self.is_default = is_default;
        }
        self.updated_at = now;
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn country_or_default(value: Option<&str>) -> String {
    non_blank(value).unwrap_or(DEFAULT_COUNTRY).to_string()
}
