//! Listing query engine
//!
//! Builds the paired count/data SurrealQL queries behind every listing
//! endpoint. All listings share the same shape: optional prefix search,
//! optional equality filters, one ORDER BY column, LIMIT/START paging.
//! The count query ignores paging so callers always get the full total.

use serde::de::DeserializeOwned;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::repository::RepoResult;

/// Sort direction, selected on listing endpoints via `filter=atoz|ztoa`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// `"ztoa"` selects descending; anything else ascending
    pub fn from_selector(selector: &str) -> Self {
        if selector.eq_ignore_ascii_case("ztoa") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Filter operand for [`ListQuery::filter`]
#[derive(Debug, Clone)]
pub enum FilterValue {
    /// Record link equality, bound as a native record id
    Record(RecordId),
    /// Plain value equality
    Text(String),
    /// Field must be absent (`IS NONE`)
    Missing,
}

/// One page of results plus the unpaged total
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Builder for a paginated listing over one table
pub struct ListQuery {
    table: &'static str,
    projection: String,
    conditions: Vec<String>,
    binds: Vec<(String, BindValue)>,
    order_field: String,
    direction: SortDirection,
    page: u32,
    limit: u32,
}

enum BindValue {
    Record(RecordId),
    Text(String),
}

impl ListQuery {
    /// New listing over `table`, newest first, first page of ten
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            projection: "*".to_string(),
            conditions: Vec::new(),
            binds: Vec::new(),
            order_field: "created_at".to_string(),
            direction: SortDirection::Desc,
            page: 1,
            limit: 10,
        }
    }

    pub fn projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = projection.into();
        self
    }

    /// Case-insensitive prefix match on `field`; blank terms are ignored
    pub fn search_prefix(mut self, field: &str, term: &str) -> Self {
        let term = term.trim();
        if !term.is_empty() {
            self.conditions.push(format!(
                "string::starts_with(string::lowercase({field}), $search)"
            ));
            self.binds
                .push(("search".to_string(), BindValue::Text(term.to_lowercase())));
        }
        self
    }

    /// Equality filter on `field`
    pub fn filter(mut self, field: &str, value: FilterValue) -> Self {
        let bind_name = format!("f_{}", self.binds.len());
        match value {
            FilterValue::Record(id) => {
                self.conditions.push(format!("{field} = ${bind_name}"));
                self.binds.push((bind_name, BindValue::Record(id)));
            }
            FilterValue::Text(text) => {
                self.conditions.push(format!("{field} = ${bind_name}"));
                self.binds.push((bind_name, BindValue::Text(text)));
            }
            FilterValue::Missing => {
                self.conditions.push(format!("{field} IS NONE"));
            }
        }
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_field = field.into();
        self.direction = direction;
        self
    }

    /// Page is 1-based; pages past the end yield an empty item list
    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = page.max(1);
        self.limit = limit.max(1);
        self
    }

    /// Run the count and data queries in one round trip
    pub async fn run<T: DeserializeOwned>(self, db: &Surreal<Db>) -> RepoResult<Page<T>> {
        let where_clause = if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        };

        let count_sql = format!(
            "SELECT count() AS count FROM {}{} GROUP ALL",
            self.table, where_clause
        );
        let data_sql = format!(
            "SELECT {} FROM {}{} ORDER BY {} {} LIMIT $limit START $start",
            self.projection,
            self.table,
            where_clause,
            self.order_field,
            self.direction.keyword()
        );

        let start = (self.page - 1) as i64 * self.limit as i64;
        let mut query = db
            .query(count_sql)
            .query(data_sql)
            .bind(("limit", self.limit as i64))
            .bind(("start", start));
        for (name, value) in self.binds {
            query = match value {
                BindValue::Record(id) => query.bind((name, id)),
                BindValue::Text(text) => query.bind((name, text)),
            };
        }

        let mut response = query.await?;
        let total: Option<i64> = response.take((0, "count"))?;
        let items: Vec<T> = response.take(1)?;
        Ok(Page {
            items,
            total: total.unwrap_or(0).max(0) as u64,
        })
    }
}
