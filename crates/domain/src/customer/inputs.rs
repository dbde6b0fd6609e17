//! Caller-supplied customer input, before validation.

use serde::{Deserialize, Serialize};

use super::AddressDraft;

/// Registration input. Fields are optional so that every missing or
/// malformed field can be reported together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    #[serde(alias = "fname")]
    pub first_name: Option<String>,
    #[serde(alias = "lname")]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub gender: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "profile")]
    pub profile_picture_ref: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub addresses: Vec<AddressDraft>,
}

impl NewCustomer {
    /// Creates an input with every required field set and status left to
    /// its default.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        mobile: impl Into<String>,
        gender: impl Into<String>,
        profile_picture_ref: impl Into<String>,
    ) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            email: Some(email.into()),
            mobile: Some(mobile.into()),
            gender: Some(gender.into()),
            profile_picture_ref: Some(profile_picture_ref.into()),
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: AddressDraft) -> Self {
        self.addresses.push(address);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_date_of_birth(mut self, date_of_birth: impl Into<String>) -> Self {
        self.date_of_birth = Some(date_of_birth.into());
        self
    }
}

/// Partial profile update. Only present fields are written.
///
/// A blank value for a required field counts as absent, as blank form
/// inputs do. A blank `location` or `date_of_birth` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPatch {
    #[serde(alias = "fname")]
    pub first_name: Option<String>,
    #[serde(alias = "lname")]
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub gender: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "profile", alias = "user_profile")]
    pub profile_picture_ref: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<String>,
}

impl CustomerPatch {
    /// The email this patch would store, normalised the way the record
    /// stores it.
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
    }

    pub fn normalized_mobile(&self) -> Option<String> {
        self.mobile
            .as_deref()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
