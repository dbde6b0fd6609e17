use customer_store::{AddressCount, CustomerQuery};

/// Fixed listings exposed alongside the general query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedView {
    /// Customers with more than one address.
    MultipleAddresses,
    /// Customers with exactly one address.
    SingleAddresses,
}

impl NamedView {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamedView::MultipleAddresses => "multiple_addresses",
            NamedView::SingleAddresses => "single_addresses",
        }
    }

    /// The general query plan this view stands for, newest first.
    pub fn query(&self) -> CustomerQuery {
        let count = match self {
            NamedView::MultipleAddresses => AddressCount::Multiple,
            NamedView::SingleAddresses => AddressCount::Single,
        };
        CustomerQuery::new().address_count(count)
    }
}
