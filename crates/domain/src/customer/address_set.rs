//! The ordered address collection owned by one customer record.
//!
//! Invariants:
//! - a non-empty set has exactly one address with `is_default == true`.
//! - `is_single_address()` is true iff the set holds exactly one address
//!   (an empty set reports `false`, the same as "multiple").
//! - every stored address passed field validation.
//!
//! Only [`AddressSet::set_default`] restores the single default
//! unconditionally. `add` forces the default for the first address,
//! `remove` promotes the first remaining address when the default is gone,
//! and `update` never repairs. Each operation reports which of these
//! applied through [`DefaultState`].

use chrono::{DateTime, Utc};
use common::AddressId;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::{Address, AddressDraft, AddressPatch};

/// How an address operation relates to the single-default invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultState {
    /// The set was empty, so the new address was made the default.
    Established,
    /// The operation ran default repair itself.
    Repaired,
    /// Caller-supplied flags were applied as given; keeping a single
    /// default is up to the caller.
    CallerResponsibility,
}

impl DefaultState {
    /// True when the operation itself leaves exactly one default in place
    /// (given a valid set going in).
    pub fn is_guaranteed(&self) -> bool {
        matches!(self, DefaultState::Established | DefaultState::Repaired)
    }
}

/// Result of an address operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressOutcome {
    /// The address the operation targeted (or created).
    pub address_id: AddressId,
    pub default_state: DefaultState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressSet {
    addresses: Vec<Address>,
}

// Query methods
impl AddressSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.addresses.iter()
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.addresses
    }

    pub fn get(&self, id: AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == id)
    }

    /// Derived classification flag. Zero addresses reports `false`.
    pub fn is_single_address(&self) -> bool {
        self.addresses.len() == 1
    }

    /// The flagged default, falling back to the first address.
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses
            .iter()
            .find(|a| a.is_default)
            .or_else(|| self.addresses.first())
    }

    pub fn default_count(&self) -> usize {
        self.addresses.iter().filter(|a| a.is_default).count()
    }

    /// True when exactly one address is the default, or the set is empty.
    pub fn has_single_default(&self) -> bool {
        self.addresses.is_empty() || self.default_count() == 1
    }
}

// Mutations
impl AddressSet {
    /// Validates and appends a new address.
    ///
    /// The first address in an empty set always becomes the default,
    /// whatever the draft says. Later drafts keep their own flag.
    pub fn add(&mut self, draft: AddressDraft, now: DateTime<Utc>) -> Result<AddressOutcome, DomainError> {
        let mut address = Address::from_draft(draft, now)?;

        let default_state = if self.addresses.is_empty() {
            address.is_default = true;
            DefaultState::Established
        } else {
            DefaultState::CallerResponsibility
        };

        let address_id = address.id;
        self.addresses.push(address);
        Ok(AddressOutcome {
            address_id,
            default_state,
        })
    }

    /// Shallow-merges `patch` onto one address. Never repairs the default.
    pub fn update(
        &mut self,
        id: AddressId,
        patch: AddressPatch,
        now: DateTime<Utc>,
    ) -> Result<AddressOutcome, DomainError> {
        let address = self
            .addresses
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(DomainError::AddressNotFound(id))?;
        address.apply_patch(patch, now)?;

        Ok(AddressOutcome {
            address_id: id,
            default_state: DefaultState::CallerResponsibility,
        })
    }

    /// Removes one address; if no default remains, the first remaining
    /// address (by position) becomes the default.
    pub fn remove(&mut self, id: AddressId) -> Result<AddressOutcome, DomainError> {
        let index = self
            .addresses
            .iter()
            .position(|a| a.id == id)
            .ok_or(DomainError::AddressNotFound(id))?;
        self.addresses.remove(index);

        if !self.addresses.iter().any(|a| a.is_default)
            && let Some(first) = self.addresses.first_mut()
        {
            first.is_default = true;
        }

        Ok(AddressOutcome {
            address_id: id,
            default_state: DefaultState::Repaired,
        })
    }

    /// Makes `id` the only default. Idempotent.
    pub fn set_default(&mut self, id: AddressId) -> Result<AddressOutcome, DomainError> {
        if self.get(id).is_none() {
            return Err(DomainError::AddressNotFound(id));
        }

        for address in &mut self.addresses {
            address.is_default = address.id == id;
        }

        Ok(AddressOutcome {
            address_id: id,
            default_state: DefaultState::Repaired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(pincode: &str) -> AddressDraft {
        AddressDraft::new("1 Main Street", "Pune", "MH", pincode)
    }

    fn set_with(n: usize) -> (AddressSet, Vec<AddressId>) {
        let mut set = AddressSet::new();
        let ids = (0..n)
            .map(|i| {
                set.add(draft(&format!("41100{i}")), Utc::now())
                    .unwrap()
                    .address_id
            })
            .collect();
        (set, ids)
    }

    #[test]
    fn first_address_is_forced_default() {
        let mut set = AddressSet::new();
        let outcome = set.add(draft("411001").with_default(false), Utc::now()).unwrap();

        assert_eq!(outcome.default_state, DefaultState::Established);
        assert!(set.get(outcome.address_id).unwrap().is_default);
        assert!(set.is_single_address());
    }

    #[test]
    fn later_address_keeps_caller_flag() {
        let (mut set, ids) = set_with(1);
        let outcome = set.add(draft("411002"), Utc::now()).unwrap();

        assert_eq!(outcome.default_state, DefaultState::CallerResponsibility);
        assert!(!outcome.default_state.is_guaranteed());
        assert!(set.get(ids[0]).unwrap().is_default);
        assert!(!set.get(outcome.address_id).unwrap().is_default);
        assert!(!set.is_single_address());
    }

    #[test]
    fn explicit_second_default_is_honoured_literally() {
        let (mut set, _) = set_with(1);
        set.add(draft("411002").with_default(true), Utc::now()).unwrap();

        assert_eq!(set.default_count(), 2);
        assert!(!set.has_single_default());
    }

    #[test]
    fn invalid_draft_leaves_set_unchanged() {
        let (mut set, _) = set_with(1);
        let result = set.add(AddressDraft::new("", "Pune", "MH", "12"), Utc::now());

        assert!(matches!(result, Err(DomainError::Validation { .. })));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn removing_default_promotes_first_remaining() {
        let (mut set, ids) = set_with(3);
        let outcome = set.remove(ids[0]).unwrap();

        assert_eq!(outcome.default_state, DefaultState::Repaired);
        assert!(set.get(ids[1]).unwrap().is_default);
        assert!(set.has_single_default());
    }

    #[test]
    fn removing_non_default_keeps_existing_default() {
        let (mut set, ids) = set_with(3);
        set.set_default(ids[2]).unwrap();
        set.remove(ids[0]).unwrap();

        assert!(!set.get(ids[1]).unwrap().is_default);
        assert!(set.get(ids[2]).unwrap().is_default);
    }

    #[test]
    fn removing_last_address_leaves_flag_false() {
        let (mut set, ids) = set_with(1);
        set.remove(ids[0]).unwrap();

        assert!(set.is_empty());
        assert!(!set.is_single_address());
        assert!(set.default_address().is_none());
    }

    #[test]
    fn set_default_is_exclusive_and_idempotent() {
        let (mut set, ids) = set_with(3);
        set.set_default(ids[1]).unwrap();
        let once = set.clone();
        set.set_default(ids[1]).unwrap();

        assert_eq!(set, once);
        assert_eq!(set.default_count(), 1);
        assert_eq!(set.default_address().unwrap().id, ids[1]);
    }

    #[test]
    fn set_default_repairs_double_default() {
        let (mut set, ids) = set_with(1);
        set.add(draft("411002").with_default(true), Utc::now()).unwrap();
        set.set_default(ids[0]).unwrap();

        assert!(set.has_single_default());
    }

    #[test]
    fn update_does_not_repair_default() {
        let (mut set, ids) = set_with(1);
        let patch = AddressPatch {
            is_default: Some(false),
            ..Default::default()
        };
        let outcome = set.update(ids[0], patch, Utc::now()).unwrap();

        assert_eq!(outcome.default_state, DefaultState::CallerResponsibility);
        assert_eq!(set.default_count(), 0);
        // the fallback still yields an address
        assert_eq!(set.default_address().unwrap().id, ids[0]);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let (mut set, _) = set_with(2);
        let missing = AddressId::new();

        assert!(matches!(set.remove(missing), Err(DomainError::AddressNotFound(id)) if id == missing));
        assert!(set.set_default(missing).is_err());
        assert!(set.update(missing, AddressPatch::default(), Utc::now()).is_err());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn serializes_as_plain_array() {
        let (set, _) = set_with(2);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
        assert_eq!(json[0]["isDefault"], true);
        assert_eq!(json[0]["addressLine1"], "1 Main Street");
    }
}
