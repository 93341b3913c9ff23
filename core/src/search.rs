//! Paginated, searchable, sortable listings.
//!
//! One `Facet` stage runs over the filtered snapshot and yields both the
//! requested page and the exact total, so `total` always agrees with the
//! data the page was cut from.

use crate::{
    config::PaginationConfig,
    dataset::{EntityStore, Snapshot},
    employee::Employee,
    error::WorkforceResult,
    pipeline::{from_documents, to_documents, Document, Pipeline, Predicate, SortKey, SortOrder},
    skill::Skill,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

const TIE_BREAK_FIELD: &str = "_id";

/// Raw listing parameters as a caller sends them. Nothing here is
/// trusted; `paginate` normalizes every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: i64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>) -> Self {
        self.sort_by = Some(field.into());
        self
    }

    pub fn sort_order(mut self, order: impl Into<String>) -> Self {
        self.sort_order = Some(order.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub sort_by: String,
    pub sort_order: SortOrder,
    pub data: Vec<T>,
}

/// An entity kind that can be listed through `paginate`.
pub trait Searchable: Serialize + DeserializeOwned {
    const KIND: &'static str;
    /// Field matched by the free-text `search` term.
    const SEARCH_FIELD: &'static str = "name";
    /// Fields a caller may sort by. Anything else falls back to
    /// `DEFAULT_SORT`.
    const SORTABLE: &'static [&'static str];
    const DEFAULT_SORT: &'static str;

    fn collection(snapshot: &Snapshot) -> &[Self];
}

impl Searchable for Employee {
    const KIND: &'static str = "employee";
    const SORTABLE: &'static [&'static str] = &[
        "name",
        "empNumber",
        "email",
        "position",
        "hireDate",
        "role",
        "engagementScore",
        "_id",
    ];
    const DEFAULT_SORT: &'static str = "empNumber";

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.employees
    }
}

impl Searchable for Skill {
    const KIND: &'static str = "skill";
    const SORTABLE: &'static [&'static str] = &["name", "description", "_id"];
    const DEFAULT_SORT: &'static str = "name";

    fn collection(snapshot: &Snapshot) -> &[Self] {
        &snapshot.skills
    }
}

/// Normalized form of a `PageRequest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u64,
    pub limit: u64,
    pub search: Option<String>,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl PageQuery {
    pub fn resolve<T: Searchable>(request: &PageRequest, cfg: &PaginationConfig) -> Self {
        let page = match request.page {
            Some(p) if p >= 1 => p as u64,
            _ => 1,
        };
        let max_limit = cfg.max_limit.max(1);
        let limit = match request.limit {
            None | Some(0) => cfg.default_limit.clamp(1, max_limit),
            Some(n) if n < 0 => 1,
            Some(n) => (n as u64).min(max_limit),
        };
        let sort_by = match request.sort_by.as_deref() {
            Some(field) if T::SORTABLE.contains(&field) => field.to_string(),
            Some(field) => {
                log::warn!(
                    "{} listing: sortBy '{field}' not allowed, using '{}'",
                    T::KIND,
                    T::DEFAULT_SORT
                );
                T::DEFAULT_SORT.to_string()
            }
            None => T::DEFAULT_SORT.to_string(),
        };
        let sort_order = match request.sort_order.as_deref() {
            None => SortOrder::Asc,
            Some(raw) => SortOrder::parse(raw).unwrap_or_else(|| {
                log::warn!("{} listing: sortOrder '{raw}' not recognised, using asc", T::KIND);
                SortOrder::Asc
            }),
        };
        // Blank terms are ignored; anything else is matched as given.
        let search = request
            .search
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string);
        Self {
            page,
            limit,
            search,
            sort_by,
            sort_order,
        }
    }

    fn offset(&self) -> usize {
        let skip = (self.page - 1).saturating_mul(self.limit);
        usize::try_from(skip).unwrap_or(usize::MAX)
    }

    fn sort_keys(&self) -> Vec<SortKey> {
        let mut keys = vec![SortKey::new(self.sort_by.clone(), self.sort_order)];
        if self.sort_by != TIE_BREAK_FIELD {
            keys.push(SortKey::asc(TIE_BREAK_FIELD));
        }
        keys
    }

    fn pipeline<T: Searchable>(&self) -> Pipeline {
        let limit = usize::try_from(self.limit).unwrap_or(usize::MAX);
        let mut pipeline = Pipeline::new();
        if let Some(term) = &self.search {
            pipeline = pipeline.filter(Predicate::contains_ignore_case(T::SEARCH_FIELD, term.clone()));
        }
        pipeline.facet(vec![
            (
                "data",
                Pipeline::new()
                    .sort_by(self.sort_keys())
                    .slice(self.offset(), Some(limit)),
            ),
            ("totalCount", Pipeline::new().count("count")),
        ])
    }
}

/// One page of `T` from a fresh snapshot of `store`.
///
/// Pages past the end come back with empty `data` and accurate totals.
pub fn paginate<T: Searchable>(
    store: &impl EntityStore,
    request: &PageRequest,
    cfg: &PaginationConfig,
) -> WorkforceResult<Page<T>> {
    let snapshot = store.snapshot()?;
    let docs = to_documents(T::collection(&snapshot))?;
    let query = PageQuery::resolve::<T>(request, cfg);

    let mut row = query
        .pipeline::<T>()
        .run(&docs)
        .into_iter()
        .next()
        .unwrap_or_default();
    let data: Vec<Document> = match row.remove("data") {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(doc) => Some(doc),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    let total = row
        .get("totalCount")
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("count"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    Ok(Page {
        page: query.page,
        limit: query.limit,
        total,
        total_pages: total.div_ceil(query.limit),
        sort_by: query.sort_by,
        sort_order: query.sort_order,
        data: from_documents(data)?,
    })
}
