use std::cmp::Ordering;

use domain::{Address, AddressType, CustomerRecord, CustomerStatus, Gender};

/// Fields a customer listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    FirstName,
    LastName,
    Email,
    Mobile,
    Gender,
    Status,
    Location,
    DateOfBirth,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::FirstName => "firstName",
            SortField::LastName => "lastName",
            SortField::Email => "email",
            SortField::Mobile => "mobile",
            SortField::Gender => "gender",
            SortField::Status => "status",
            SortField::Location => "location",
            SortField::DateOfBirth => "dateOfBirth",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Sort order. Defaults to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

/// Predicate over a single address. Every set criterion must hold for the
/// same address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressFilter {
    /// Case-insensitive substring.
    pub city: Option<String>,
    /// Case-insensitive substring.
    pub state: Option<String>,
    /// Exact match.
    pub pincode: Option<String>,
    pub address_type: Option<AddressType>,
}

impl AddressFilter {
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.state.is_none()
            && self.pincode.is_none()
            && self.address_type.is_none()
    }

    pub fn matches(&self, address: &Address) -> bool {
        if let Some(ref city) = self.city
            && !contains_ignore_case(&address.city, city)
        {
            return false;
        }
        if let Some(ref state) = self.state
            && !contains_ignore_case(&address.state, state)
        {
            return false;
        }
        if let Some(ref pincode) = self.pincode
            && &address.pincode != pincode
        {
            return false;
        }
        if let Some(address_type) = self.address_type
            && address.address_type != address_type
        {
            return false;
        }
        true
    }
}

/// Restriction on how many addresses a customer holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressCount {
    /// Exactly one address.
    Single,
    /// More than one address.
    Multiple,
}

impl AddressCount {
    pub fn matches(&self, count: usize) -> bool {
        match self {
            AddressCount::Single => count == 1,
            AddressCount::Multiple => count > 1,
        }
    }
}

/// Query plan for customer listings.
///
/// Criteria across categories are combined with AND. `search` matches if
/// any of first name, last name, email, mobile or location contains it,
/// ignoring case. The address filter uses "some address satisfies every
/// criterion" semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerQuery {
    pub search: Option<String>,
    pub gender: Option<Gender>,
    pub status: Option<CustomerStatus>,
    pub address: AddressFilter,
    pub address_count: Option<AddressCount>,
    pub sort: Sort,
    /// Number of matches to skip.
    pub offset: usize,
    /// Maximum number of matches to return; `None` returns all.
    pub limit: Option<usize>,
}

impl CustomerQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn status(mut self, status: CustomerStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.address.city = Some(city.into());
        self
    }

    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.address.state = Some(state.into());
        self
    }

    pub fn pincode(mut self, pincode: impl Into<String>) -> Self {
        self.address.pincode = Some(pincode.into());
        self
    }

    pub fn address_type(mut self, address_type: AddressType) -> Self {
        self.address.address_type = Some(address_type);
        self
    }

    pub fn address_count(mut self, count: AddressCount) -> Self {
        self.address_count = Some(count);
        self
    }

    pub fn sort(mut self, field: SortField, direction: SortDirection) -> Self {
        self.sort = Sort::new(field, direction);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluates the filter part of the plan against one record.
    pub fn matches(&self, record: &CustomerRecord) -> bool {
        if let Some(ref text) = self.search
            && !matches_search(record, text)
        {
            return false;
        }
        if let Some(gender) = self.gender
            && record.gender() != gender
        {
            return false;
        }
        if let Some(status) = self.status
            && record.status() != status
        {
            return false;
        }
        if !self.address.is_empty() && !record.addresses().iter().any(|a| self.address.matches(a)) {
            return false;
        }
        if let Some(count) = self.address_count
            && !count.matches(record.addresses().len())
        {
            return false;
        }
        true
    }

    /// Orders two records per the plan's sort.
    ///
    /// Ties fall back to creation time, then id, in the same direction.
    /// Missing optional values order before present ones when ascending.
    pub fn compare(&self, a: &CustomerRecord, b: &CustomerRecord) -> Ordering {
        let primary = match self.sort.field {
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
            SortField::FirstName => a.first_name().cmp(b.first_name()),
            SortField::LastName => a.last_name().cmp(b.last_name()),
            SortField::Email => a.email().cmp(b.email()),
            SortField::Mobile => a.mobile().cmp(b.mobile()),
            SortField::Gender => a.gender().as_str().cmp(b.gender().as_str()),
            SortField::Status => a.status().as_str().cmp(b.status().as_str()),
            SortField::Location => a.location().cmp(&b.location()),
            SortField::DateOfBirth => a.date_of_birth().cmp(&b.date_of_birth()),
        };
        let ordering = primary
            .then_with(|| a.created_at().cmp(&b.created_at()))
            .then_with(|| a.id().cmp(&b.id()));

        match self.sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// One window of query matches.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub records: Vec<CustomerRecord>,
    /// Number of matches before windowing.
    pub total: usize,
}

fn matches_search(record: &CustomerRecord, text: &str) -> bool {
    [
        Some(record.first_name()),
        Some(record.last_name()),
        Some(record.email()),
        Some(record.mobile()),
        record.location(),
    ]
    .into_iter()
    .flatten()
    .any(|field| contains_ignore_case(field, text))
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
