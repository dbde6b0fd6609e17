//! Enumerated value objects for the customer domain.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string is not one of an enum's accepted spellings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl FromStr for Gender {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            _ => Err(ParseEnumError {
                kind: "gender",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account status of a customer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum CustomerStatus {
    #[default]
    Active,
    InActive,
}

impl CustomerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "Active",
            CustomerStatus::InActive => "InActive",
        }
    }
}

impl FromStr for CustomerStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(CustomerStatus::Active),
            "InActive" => Ok(CustomerStatus::InActive),
            _ => Err(ParseEnumError {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purpose of a postal address.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    #[default]
    Home,
    Work,
    Billing,
    Shipping,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::Home => "home",
            AddressType::Work => "work",
            AddressType::Billing => "billing",
            AddressType::Shipping => "shipping",
        }
    }
}

impl FromStr for AddressType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(AddressType::Home),
            "work" => Ok(AddressType::Work),
            "billing" => Ok(AddressType::Billing),
            "shipping" => Ok(AddressType::Shipping),
            _ => Err(ParseEnumError {
                kind: "address type",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AddressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_round_trips_through_strings() {
        for g in [Gender::Male, Gender::Female, Gender::Other] {
            assert_eq!(g.as_str().parse::<Gender>().unwrap(), g);
        }
        assert!("male".parse::<Gender>().is_err());
    }

    #[test]
    fn status_defaults_to_active() {
        assert_eq!(CustomerStatus::default(), CustomerStatus::Active);
        assert_eq!("InActive".parse::<CustomerStatus>(), Ok(CustomerStatus::InActive));
        assert!("Inactive".parse::<CustomerStatus>().is_err());
    }

    #[test]
    fn address_type_serializes_lowercase() {
        let json = serde_json::to_string(&AddressType::Shipping).unwrap();
        assert_eq!(json, "\"shipping\"");
        assert_eq!(AddressType::default(), AddressType::Home);
    }
}
