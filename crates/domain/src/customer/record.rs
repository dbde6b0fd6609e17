//! Customer aggregate root.

use chrono::{DateTime, NaiveDate, Utc};
use common::{Actor, AddressId, CustomerId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::validation::Violations;

use super::{
    Address, AddressDraft, AddressOutcome, AddressPatch, AddressSet, CustomerPatch,
    CustomerStatus, Gender, NewCustomer,
};

/// Customer aggregate root.
///
/// Owns identity and profile fields, one [`AddressSet`], and the audit
/// stamps. Every mutation refreshes `updated_at`/`updated_by`; address
/// mutations also refresh `is_single_address`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    id: CustomerId,
    first_name: String,
    last_name: String,
    email: String,
    mobile: String,
    gender: Gender,
    status: CustomerStatus,
    profile_picture_ref: String,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    addresses: AddressSet,
    #[serde(default)]
    is_single_address: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: String,
    updated_by: String,
}

// Query methods
impl CustomerRecord {
    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// "First Last".
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Always lower-cased.
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn mobile(&self) -> &str {
        &self.mobile
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn status(&self) -> CustomerStatus {
        self.status
    }

    pub fn profile_picture_ref(&self) -> &str {
        &self.profile_picture_ref
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn date_of_birth(&self) -> Option<NaiveDate> {
        self.date_of_birth
    }

    pub fn addresses(&self) -> &AddressSet {
        &self.addresses
    }

    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.default_address()
    }

    pub fn is_single_address(&self) -> bool {
        self.is_single_address
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn updated_by(&self) -> &str {
        &self.updated_by
    }
}

// Command methods
impl CustomerRecord {
    /// Validates registration input and builds a new record.
    ///
    /// All violations, including those of nested addresses, are reported
    /// together. Addresses are installed one by one through
    /// [`AddressSet::add`], so the first becomes the default; if the caller
    /// explicitly marked one as default, that one wins instead.
    pub fn register(input: NewCustomer, actor: &Actor, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let mut v = Violations::new();
        let today = now.date_naive();

        let first_name = v
            .required("firstName", input.first_name.as_deref(), "First name is required")
            .and_then(|n| v.name("firstName", "First name", n));
        let last_name = v
            .required("lastName", input.last_name.as_deref(), "Last name is required")
            .and_then(|n| v.name("lastName", "Last name", n));
        let email = v
            .required("email", input.email.as_deref(), "Email is required")
            .and_then(|e| v.email("email", e));
        let mobile = v
            .required("mobile", input.mobile.as_deref(), "Mobile number is required")
            .and_then(|m| v.mobile("mobile", m));
        let gender = v
            .required("gender", input.gender.as_deref(), "Gender is required")
            .and_then(|g| v.parse::<Gender>("gender", g, "Gender must be one of Male, Female, Other"));
        let status = match non_blank(input.status.as_deref()) {
            Some(s) => v.parse::<CustomerStatus>("status", s, "Status must be Active or InActive"),
            None => Some(CustomerStatus::default()),
        };
        let profile_picture_ref = v
            .required(
                "profilePictureRef",
                input.profile_picture_ref.as_deref(),
                "Profile picture is required",
            )
            .map(str::to_string);
        let date_of_birth = non_blank(input.date_of_birth.as_deref())
            .and_then(|d| v.date_of_birth("dateOfBirth", d, today));

        let explicit_default = input
            .addresses
            .iter()
            .position(|a| a.is_default == Some(true));
        let mut addresses = AddressSet::new();
        let mut installed = Vec::with_capacity(input.addresses.len());
        for (i, draft) in input.addresses.into_iter().enumerate() {
            match addresses.add(draft, now) {
                Ok(outcome) => installed.push((i, outcome.address_id)),
                Err(e) => v.absorb(&format!("addresses[{i}]"), e),
            }
        }

        v.into_result()?;

        if let Some(marked) = explicit_default
            && let Some(&(_, id)) = installed.iter().find(|(i, _)| *i == marked)
        {
            addresses.set_default(id)?;
        }

        match (first_name, last_name, email, mobile, gender, status, profile_picture_ref) {
            (
                Some(first_name),
                Some(last_name),
                Some(email),
                Some(mobile),
                Some(gender),
                Some(status),
                Some(profile_picture_ref),
            ) => {
                let is_single_address = addresses.is_single_address();
                Ok(Self {
                    id: CustomerId::new(),
                    first_name,
                    last_name,
                    email,
                    mobile,
                    gender,
                    status,
                    profile_picture_ref,
                    location: non_blank(input.location.as_deref()).map(str::to_string),
                    date_of_birth,
                    addresses,
                    is_single_address,
                    created_at: now,
                    updated_at: now,
                    created_by: actor.stamp().to_string(),
                    updated_by: actor.stamp().to_string(),
                })
            }
            _ => Err(DomainError::invalid("customer", "Customer is incomplete")),
        }
    }

    /// Overwrites the fields present in `patch` after validating them.
    /// A rejected patch leaves the record unchanged.
    pub fn apply_patch(
        &mut self,
        patch: CustomerPatch,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let mut v = Violations::new();
        let today = now.date_naive();

        let first_name = non_blank(patch.first_name.as_deref())
            .and_then(|n| v.name("firstName", "First name", n));
        let last_name = non_blank(patch.last_name.as_deref())
            .and_then(|n| v.name("lastName", "Last name", n));
        let email = non_blank(patch.email.as_deref()).and_then(|e| v.email("email", e));
        let mobile = non_blank(patch.mobile.as_deref()).and_then(|m| v.mobile("mobile", m));
        let gender = non_blank(patch.gender.as_deref())
            .and_then(|g| v.parse::<Gender>("gender", g, "Gender must be one of Male, Female, Other"));
        let status = non_blank(patch.status.as_deref())
            .and_then(|s| v.parse::<CustomerStatus>("status", s, "Status must be Active or InActive"));
        let date_of_birth = non_blank(patch.date_of_birth.as_deref())
            .and_then(|d| v.date_of_birth("dateOfBirth", d, today));

        v.into_result()?;

        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(mobile) = mobile {
            self.mobile = mobile;
        }
        if let Some(gender) = gender {
            self.gender = gender;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(profile) = non_blank(patch.profile_picture_ref.as_deref()) {
            self.profile_picture_ref = profile.to_string();
        }
        if let Some(location) = patch.location.as_deref() {
            self.location = non_blank(Some(location)).map(str::to_string);
        }
        if let Some(raw) = patch.date_of_birth.as_deref() {
            self.date_of_birth = if raw.trim().is_empty() {
                None
            } else {
                date_of_birth
            };
        }

        self.touch(actor, now);
        Ok(())
    }

    pub fn change_status(&mut self, status: CustomerStatus, actor: &Actor, now: DateTime<Utc>) {
        self.status = status;
        self.touch(actor, now);
    }

    pub fn add_address(
        &mut self,
        draft: AddressDraft,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<AddressOutcome, DomainError> {
        let outcome = self.addresses.add(draft, now)?;
        self.after_address_change(actor, now);
        Ok(outcome)
    }

    pub fn update_address(
        &mut self,
        id: AddressId,
        patch: AddressPatch,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<AddressOutcome, DomainError> {
        let outcome = self.addresses.update(id, patch, now)?;
        self.after_address_change(actor, now);
        Ok(outcome)
    }

    pub fn remove_address(
        &mut self,
        id: AddressId,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<AddressOutcome, DomainError> {
        let outcome = self.addresses.remove(id)?;
        self.after_address_change(actor, now);
        Ok(outcome)
    }

    pub fn set_default_address(
        &mut self,
        id: AddressId,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<AddressOutcome, DomainError> {
        let outcome = self.addresses.set_default(id)?;
        self.after_address_change(actor, now);
        Ok(outcome)
    }

    fn after_address_change(&mut self, actor: &Actor, now: DateTime<Utc>) {
        self.is_single_address = self.addresses.is_single_address();
        self.touch(actor, now);
    }

    fn touch(&mut self, actor: &Actor, now: DateTime<Utc>) {
        self.updated_at = now;
        self.updated_by = actor.stamp().to_string();
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
