use async_trait::async_trait;
use domain::CustomerRecord;
use sqlx::{PgPool, Row, postgres::PgRow, types::Json};
use uuid::Uuid;

use crate::{
    AddressCount, ContactField, CustomerId, CustomerQuery, QueryResult, Result, SortDirection,
    SortField, StoreError, Version,
    store::{CustomerStore, Stored},
};

/// PostgreSQL-backed customer store.
///
/// Each record is one row: the full record as a JSONB document, plus the
/// columns that carry unique constraints and the CAS version.
#[derive(Clone)]
pub struct PostgresCustomerStore {
    pool: PgPool,
}

impl PostgresCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_stored(row: PgRow) -> Result<Stored> {
        let Json(record): Json<CustomerRecord> = row.try_get("document")?;
        Ok(Stored {
            record,
            version: Version::new(row.try_get("version")?),
        })
    }

    async fn current_version(&self, id: CustomerId) -> Result<Option<Version>> {
        let version: Option<i64> = sqlx::query_scalar("SELECT version FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        Ok(version.map(Version::new))
    }
}

/// Maps unique constraint violations to `UniqueViolation`.
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e
        && let Some(field) = db_err.constraint().and_then(ContactField::from_constraint)
    {
        return StoreError::UniqueViolation { field };
    }
    StoreError::Database(e)
}

/// Escapes LIKE wildcards so the value matches literally.
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// LIMIT/OFFSET value; anything past `i64::MAX` is clamped rather than wrapped.
fn sql_bound(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn sort_expression(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "(document->>'updatedAt')::timestamptz",
        SortField::FirstName => "(document->>'firstName') COLLATE \"C\"",
        SortField::LastName => "(document->>'lastName') COLLATE \"C\"",
        SortField::Email => "email COLLATE \"C\"",
        SortField::Mobile => "mobile COLLATE \"C\"",
        SortField::Gender => "(document->>'gender') COLLATE \"C\"",
        SortField::Status => "(document->>'status') COLLATE \"C\"",
        SortField::Location => "(document->>'location') COLLATE \"C\"",
        SortField::DateOfBirth => "(document->>'dateOfBirth')::date",
    }
}

/// Builds the WHERE clause for a query plan. All parameters are text and
/// are numbered from `$1` in the order returned.
fn filter_clause(query: &CustomerQuery) -> (String, Vec<String>) {
    let mut sql = String::from(" WHERE 1=1");
    let mut params = Vec::new();
    let mut param_count = 0;

    if let Some(ref text) = query.search {
        param_count += 1;
        let p = param_count;
        sql.push_str(&format!(
            " AND (document->>'firstName' ILIKE ${p} OR document->>'lastName' ILIKE ${p} \
             OR email ILIKE ${p} OR mobile ILIKE ${p} OR document->>'location' ILIKE ${p})"
        ));
        params.push(like_pattern(text));
    }
    if let Some(gender) = query.gender {
        param_count += 1;
        sql.push_str(&format!(" AND document->>'gender' = ${param_count}"));
        params.push(gender.as_str().to_string());
    }
    if let Some(status) = query.status {
        param_count += 1;
        sql.push_str(&format!(" AND document->>'status' = ${param_count}"));
        params.push(status.as_str().to_string());
    }

    if !query.address.is_empty() {
        let mut predicates = Vec::new();
        if let Some(ref city) = query.address.city {
            param_count += 1;
            predicates.push(format!("a->>'city' ILIKE ${param_count}"));
            params.push(like_pattern(city));
        }
        if let Some(ref state) = query.address.state {
            param_count += 1;
            predicates.push(format!("a->>'state' ILIKE ${param_count}"));
            params.push(like_pattern(state));
        }
        if let Some(ref pincode) = query.address.pincode {
            param_count += 1;
            predicates.push(format!("a->>'pincode' = ${param_count}"));
            params.push(pincode.clone());
        }
        if let Some(address_type) = query.address.address_type {
            param_count += 1;
            predicates.push(format!("a->>'addressType' = ${param_count}"));
            params.push(address_type.as_str().to_string());
        }
        sql.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM jsonb_array_elements(document->'addresses') a WHERE {})",
            predicates.join(" AND ")
        ));
    }

    match query.address_count {
        Some(AddressCount::Single) => {
            sql.push_str(" AND jsonb_array_length(document->'addresses') = 1");
        }
        Some(AddressCount::Multiple) => {
            sql.push_str(" AND jsonb_array_length(document->'addresses') > 1");
        }
        None => {}
    }

    (sql, params)
}

fn order_clause(query: &CustomerQuery) -> String {
    let (dir, nulls) = match query.sort.direction {
        SortDirection::Asc => ("ASC", "NULLS FIRST"),
        SortDirection::Desc => ("DESC", "NULLS LAST"),
    };
    format!(
        " ORDER BY {} {dir} {nulls}, created_at {dir}, id {dir}",
        sort_expression(query.sort.field)
    )
}

#[async_trait]
impl CustomerStore for PostgresCustomerStore {
    async fn insert(&self, record: CustomerRecord) -> Result<Version> {
        let version = Version::first();

        sqlx::query(
            r#"
            INSERT INTO customers (id, email, mobile, version, created_at, document)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id().as_uuid())
        .bind(record.email())
        .bind(record.mobile())
        .bind(version.as_i64())
        .bind(record.created_at())
        .bind(Json(&record))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(version)
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Stored>> {
        let row = sqlx::query("SELECT document, version FROM customers WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_stored).transpose()
    }

    async fn contact_in_use(
        &self,
        field: ContactField,
        value: &str,
        exclude: Option<CustomerId>,
    ) -> Result<bool> {
        let column = match field {
            ContactField::Email => "email",
            ContactField::Mobile => "mobile",
        };
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM customers WHERE {column} = $1 AND ($2::uuid IS NULL OR id <> $2))"
        );

        let in_use: bool = sqlx::query_scalar(&sql)
            .bind(value)
            .bind(exclude.map(Uuid::from))
            .fetch_one(&self.pool)
            .await?;
        Ok(in_use)
    }

    async fn update(&self, record: CustomerRecord, expected: Version) -> Result<Version> {
        let customer_id = record.id();
        let version = expected.next();

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET email = $3, mobile = $4, version = $5, document = $6
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(customer_id.as_uuid())
        .bind(expected.as_i64())
        .bind(record.email())
        .bind(record.mobile())
        .bind(version.as_i64())
        .bind(Json(&record))
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return match self.current_version(customer_id).await? {
                Some(actual) => {
                    tracing::debug!(%customer_id, %expected, %actual, "stale customer write");
                    Err(StoreError::VersionConflict {
                        customer_id,
                        expected,
                        actual,
                    })
                }
                None => Err(StoreError::NotFound(customer_id)),
            };
        }

        Ok(version)
    }

    async fn delete(&self, id: CustomerId) -> Result<Option<CustomerRecord>> {
        let document: Option<Json<CustomerRecord>> =
            sqlx::query_scalar("DELETE FROM customers WHERE id = $1 RETURNING document")
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

        Ok(document.map(|Json(record)| record))
    }

    async fn query(&self, query: &CustomerQuery) -> Result<QueryResult> {
        let (filter, params) = filter_clause(query);

        let count_sql = format!("SELECT COUNT(*) FROM customers{filter}");
        let mut count_query = sqlx::query_scalar(&count_sql);
        for param in &params {
            count_query = count_query.bind(param);
        }
        let total: i64 = count_query.fetch_one(&self.pool).await?;

        let mut sql = format!(
            "SELECT document, version FROM customers{filter}{}",
            order_clause(query)
        );
        let mut param_count = params.len();
        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        param_count += 1;
        sql.push_str(&format!(" OFFSET ${param_count}"));

        let mut page_query = sqlx::query(&sql);
        for param in &params {
            page_query = page_query.bind(param);
        }
        if let Some(limit) = query.limit {
            page_query = page_query.bind(sql_bound(limit));
        }
        page_query = page_query.bind(sql_bound(query.offset));

        let rows = page_query.fetch_all(&self.pool).await?;
        let records = rows
            .into_iter()
            .map(|row| Self::row_to_stored(row).map(|s| s.record))
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryResult {
            records,
            total: total as usize,
        })
    }
}
