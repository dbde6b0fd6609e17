//! Raw listing parameters and their interpretation.
//!
//! Every parameter arrives as an optional string. Blank values count as
//! absent; `All` means "no filter" for gender, status and address type.
//! Values that cannot be understood fall back to the defaults instead of
//! failing the request.

use customer_store::{AddressCount, CustomerQuery, Sort, SortDirection, SortField};
use domain::{AddressType, CustomerStatus, Gender};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

const MATCH_ALL: &str = "All";

/// Query-string parameters accepted by the customer listing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub search: Option<String>,
    pub gender: Option<String>,
    pub status: Option<String>,
    /// Legacy order switch: `old` lists oldest first.
    pub sort: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub address_type: Option<String>,
    pub is_single_address: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Parameters of the location search.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationParams {
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

impl LocationParams {
    pub fn is_empty(&self) -> bool {
        non_blank(&self.city).is_none()
            && non_blank(&self.state).is_none()
            && non_blank(&self.pincode).is_none()
    }

    pub fn to_query(&self) -> CustomerQuery {
        let mut query = CustomerQuery::new();
        query.address.city = non_blank(&self.city).map(str::to_string);
        query.address.state = non_blank(&self.state).map(str::to_string);
        query.address.pincode = non_blank(&self.pincode).map(str::to_string);
        query
    }
}

/// The filters a listing actually applied, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    pub search: String,
    pub gender: String,
    pub status: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub address_type: String,
    pub is_single_address: String,
    pub sort_by: String,
    pub sort_order: String,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parses an enumerated filter; `All`, blank and unknown values mean no
/// filter.
fn enum_filter<T: std::str::FromStr>(value: &Option<String>) -> Option<T> {
    non_blank(value)
        .filter(|v| *v != MATCH_ALL)
        .and_then(|v| v.parse().ok())
}

fn parse_sort_field(value: &str) -> Option<SortField> {
    let field = match value {
        "createdAt" | "datecreated" => SortField::CreatedAt,
        "updatedAt" | "dateUpdated" => SortField::UpdatedAt,
        "firstName" | "fname" | "name" => SortField::FirstName,
        "lastName" | "lname" => SortField::LastName,
        "email" => SortField::Email,
        "mobile" => SortField::Mobile,
        "gender" => SortField::Gender,
        "status" => SortField::Status,
        "location" => SortField::Location,
        "dateOfBirth" => SortField::DateOfBirth,
        _ => return None,
    };
    Some(field)
}

fn parse_direction(value: &str) -> Option<SortDirection> {
    match value.to_ascii_lowercase().as_str() {
        "asc" | "ascending" => Some(SortDirection::Asc),
        "desc" | "descending" => Some(SortDirection::Desc),
        _ => None,
    }
}

impl ListParams {
    /// 1-based page number, at least 1.
    pub fn page(&self) -> usize {
        non_blank(&self.page)
            .and_then(|p| p.parse::<i64>().ok())
            .map(|p| p.max(1) as usize)
            .unwrap_or(1)
    }

    /// Page size in `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> usize {
        match non_blank(&self.limit).and_then(|l| l.parse::<i64>().ok()) {
            Some(l) if l >= 1 => (l as usize).min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        }
    }

    pub fn sort_order(&self) -> Sort {
        let legacy_oldest = non_blank(&self.sort) == Some("old");

        let field = non_blank(&self.sort_by).and_then(parse_sort_field);
        let direction = non_blank(&self.sort_order).and_then(parse_direction);

        match (field, direction) {
            (None, None) if legacy_oldest => Sort::new(SortField::CreatedAt, SortDirection::Asc),
            (field, direction) => Sort::new(field.unwrap_or_default(), direction.unwrap_or_default()),
        }
    }

    pub fn address_count(&self) -> Option<AddressCount> {
        match non_blank(&self.is_single_address) {
            Some("true") => Some(AddressCount::Single),
            Some("false") => Some(AddressCount::Multiple),
            _ => None,
        }
    }

    /// Builds the filter and sort part of the plan. Windowing is left to
    /// the caller.
    pub fn to_query(&self) -> CustomerQuery {
        let mut query = CustomerQuery {
            search: non_blank(&self.search).map(str::to_string),
            gender: enum_filter::<Gender>(&self.gender),
            status: enum_filter::<CustomerStatus>(&self.status),
            address_count: self.address_count(),
            sort: self.sort_order(),
            ..Default::default()
        };
        query.address.city = non_blank(&self.city).map(str::to_string);
        query.address.state = non_blank(&self.state).map(str::to_string);
        query.address.pincode = non_blank(&self.pincode).map(str::to_string);
        query.address.address_type = enum_filter::<AddressType>(&self.address_type);
        query
    }

    /// Describes the filters `to_query` applies.
    pub fn applied_filters(&self) -> AppliedFilters {
        let query = self.to_query();
        let text = |v: Option<&str>| v.unwrap_or_default().to_string();

        AppliedFilters {
            search: text(query.search.as_deref()),
            gender: query.gender.map_or(MATCH_ALL, |g| g.as_str()).to_string(),
            status: query.status.map_or(MATCH_ALL, |s| s.as_str()).to_string(),
            city: text(query.address.city.as_deref()),
            state: text(query.address.state.as_deref()),
            pincode: text(query.address.pincode.as_deref()),
            address_type: query
                .address
                .address_type
                .map_or(MATCH_ALL, |t| t.as_str())
                .to_string(),
            is_single_address: match query.address_count {
                Some(AddressCount::Single) => "true".to_string(),
                Some(AddressCount::Multiple) => "false".to_string(),
                None => String::new(),
            },
            sort_by: query.sort.field.as_str().to_string(),
            sort_order: query.sort.direction.as_str().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let json: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(json)).unwrap()
    }

    #[test]
    fn defaults_are_first_page_of_ten_newest_first() {
        let p = ListParams::default();
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(p.sort_order(), Sort::new(SortField::CreatedAt, SortDirection::Desc));
        assert_eq!(p.to_query(), CustomerQuery::new());
    }

    #[test]
    fn page_and_limit_fall_back_and_clamp() {
        assert_eq!(params(&[("page", "0")]).page(), 1);
        assert_eq!(params(&[("page", "-3")]).page(), 1);
        assert_eq!(params(&[("page", "abc")]).page(), 1);
        assert_eq!(params(&[("page", "4")]).page(), 4);
        assert_eq!(params(&[("limit", "0")]).limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(params(&[("limit", "x")]).limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(params(&[("limit", "5000")]).limit(), MAX_PAGE_SIZE);
        assert_eq!(params(&[("limit", "25")]).limit(), 25);
    }

    #[test]
    fn all_sentinel_and_unknown_values_mean_no_filter() {
        let query = params(&[("gender", "All"), ("status", "Retired"), ("addressType", "All")]).to_query();
        assert!(query.gender.is_none());
        assert!(query.status.is_none());
        assert!(query.address.address_type.is_none());

        let query = params(&[("gender", "Female"), ("addressType", "work")]).to_query();
        assert_eq!(query.gender, Some(Gender::Female));
        assert_eq!(query.address.address_type, Some(AddressType::Work));
    }

    #[test]
    fn sort_aliases() {
        let by_name = params(&[("sortBy", "name"), ("sortOrder", "asc")]).sort_order();
        assert_eq!(by_name, Sort::new(SortField::FirstName, SortDirection::Asc));

        let by_updated = params(&[("sortBy", "dateUpdated")]).sort_order();
        assert_eq!(by_updated, Sort::new(SortField::UpdatedAt, SortDirection::Desc));

        let legacy = params(&[("sort", "old")]).sort_order();
        assert_eq!(legacy, Sort::new(SortField::CreatedAt, SortDirection::Asc));

        let unknown = params(&[("sortBy", "shoeSize"), ("sortOrder", "sideways")]).sort_order();
        assert_eq!(unknown, Sort::default());
    }

    #[test]
    fn single_address_flag_is_tri_state() {
        assert_eq!(params(&[("isSingleAddress", "true")]).address_count(), Some(AddressCount::Single));
        assert_eq!(params(&[("isSingleAddress", "false")]).address_count(), Some(AddressCount::Multiple));
        assert_eq!(params(&[("isSingleAddress", "maybe")]).address_count(), None);
        assert_eq!(params(&[("isSingleAddress", "")]).address_count(), None);
    }

    #[test]
    fn applied_filters_echo_effective_values() {
        let filters = params(&[("search", " asha "), ("gender", "Male"), ("pincode", "411001")])
            .applied_filters();

        assert_eq!(filters.search, "asha");
        assert_eq!(filters.gender, "Male");
        assert_eq!(filters.status, "All");
        assert_eq!(filters.pincode, "411001");
        assert_eq!(filters.sort_by, "createdAt");
        assert_eq!(filters.sort_order, "desc");
    }

    #[test]
    fn location_params_need_one_value() {
        assert!(LocationParams::default().is_empty());
        let p = LocationParams {
            city: Some(" ".to_string()),
            pincode: Some("411001".to_string()),
            ..Default::default()
        };
        assert!(!p.is_empty());
        assert_eq!(p.to_query().address.pincode.as_deref(), Some("411001"));
        assert!(p.to_query().address.city.is_none());
    }
}
