//! Runs listing plans against a customer store.

use std::time::Instant;

use customer_store::{CustomerQuery, CustomerStore};
use domain::CustomerRecord;

use crate::error::{QueryError, Result};
use crate::page::{Page, Pagination};
use crate::params::{ListParams, LocationParams};
use crate::views::NamedView;

/// Answers customer listings.
///
/// Stateless per call: each method maps its parameters to a
/// [`CustomerQuery`] and hands it to the store. Named views and the
/// location search go through the same path as the general listing.
pub struct QueryEngine<S: CustomerStore> {
    store: S,
}

impl<S: CustomerStore> QueryEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Filtered, sorted and paginated listing. The applied filters are
    /// echoed in the page.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, params: &ListParams) -> Result<Page<CustomerRecord>> {
        let mut page = self
            .run_page("details", params.to_query(), params.page(), params.limit())
            .await?;
        page.filters = Some(params.applied_filters());
        Ok(page)
    }

    /// Unfiltered listing, newest first. Only `page` and `limit` are read.
    #[tracing::instrument(skip(self))]
    pub async fn clear_filters(&self, params: &ListParams) -> Result<Page<CustomerRecord>> {
        self.run_page("clear_filters", CustomerQuery::new(), params.page(), params.limit())
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn named_view(&self, view: NamedView) -> Result<Vec<CustomerRecord>> {
        self.run_all(view.as_str(), view.query()).await
    }

    /// Customers with an address matching every given location field.
    /// At least one of city, state and pincode is required.
    #[tracing::instrument(skip(self))]
    pub async fn search_by_location(&self, params: &LocationParams) -> Result<Vec<CustomerRecord>> {
        if params.is_empty() {
            return Err(QueryError::InvalidRequest(
                "At least one location parameter (city, state, pincode) is required",
            ));
        }
        self.run_all("location", params.to_query()).await
    }

    async fn run_page(
        &self,
        view: &'static str,
        query: CustomerQuery,
        page: usize,
        per_page: usize,
    ) -> Result<Page<CustomerRecord>> {
        let query = query
            .offset(Pagination::offset(page, per_page))
            .limit(per_page);
        let result = self.timed(view, &query).await?;

        Ok(Page {
            users: result.records,
            pagination: Pagination::new(page, per_page, result.total),
            filters: None,
        })
    }

    async fn run_all(&self, view: &'static str, query: CustomerQuery) -> Result<Vec<CustomerRecord>> {
        Ok(self.timed(view, &query).await?.records)
    }

    async fn timed(
        &self,
        view: &'static str,
        query: &CustomerQuery,
    ) -> Result<customer_store::QueryResult> {
        let start = Instant::now();
        let result = self.store.query(query).await;
        let elapsed = start.elapsed().as_secs_f64();

        metrics::counter!("customer_queries_total", "view" => view).increment(1);
        metrics::histogram!("customer_query_duration_seconds", "view" => view).record(elapsed);

        match result {
            Ok(result) => {
                tracing::debug!(view, total = result.total, returned = result.records.len(), "query answered");
                Ok(result)
            }
            Err(e) => {
                tracing::error!(view, error = %e, "customer query failed");
                Err(e.into())
            }
        }
    }
}
