use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::sites::SiteId;
use crate::storage::{Row, SqlValue};

/// Name of the computed byte-size column attached to every candidate row.
pub const SIZE_COLUMN: &str = "size";

/// Name of the injected site column, sortable like a real one.
pub const SITE_ID_COLUMN: &str = "site_id";

/// A trusted SQL boolean expression over the `main` alias, with the values it
/// binds in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl Predicate {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// `(self) AND (sql)`, appending `params`.
    #[must_use]
    pub fn and(mut self, sql: &str, params: impl IntoIterator<Item = SqlValue>) -> Self {
        self.sql = format!("({}) AND ({})", self.sql, sql);
        self.params.extend(params);
        self
    }
}

/// How the generic delete path treats a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStrategy {
    /// One `DELETE ... WHERE pk = ?` per item. With `recheck`, the handler's
    /// predicate is part of the statement so rows that stopped qualifying
    /// since they were listed are left alone.
    PrimaryKey { recheck: bool },
    /// The handler overrides `delete()`; the generic path refuses to run.
    Custom,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("Unknown sort direction '{}'. Use asc or desc", s)),
        }
    }
}

/// Parameters of a candidate listing. Pages are 1-based.
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    pub sort_column: Option<String>,
    pub direction: SortDirection,
    pub page: u32,
    pub page_size: u32,
    pub site_id: Option<SiteId>,
    pub older_than: Option<NaiveDateTime>,
}

impl Default for FindQuery {
    fn default() -> Self {
        Self {
            sort_column: None,
            direction: SortDirection::Asc,
            page: 1,
            page_size: 20,
            site_id: None,
            older_than: None,
        }
    }
}

impl FindQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn sorted_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_column = Some(column.into());
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn for_site(mut self, site_id: SiteId) -> Self {
        self.site_id = Some(site_id);
        self
    }

    #[must_use]
    pub fn older_than(mut self, cutoff: NaiveDateTime) -> Self {
        self.older_than = Some(cutoff);
        self
    }
}

/// Identity of one candidate row, round-tripped from a listing back into a
/// delete request. `term_taxonomy_id` is set only by handlers whose rows are
/// keyed by `(id, term_taxonomy_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeId {
    pub items_type: String,
    pub site_id: SiteId,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_taxonomy_id: Option<i64>,
}

impl CompositeId {
    pub fn new(items_type: impl Into<String>, site_id: SiteId, id: i64) -> Self {
        Self {
            items_type: items_type.into(),
            site_id,
            id,
            term_taxonomy_id: None,
        }
    }

    #[must_use]
    pub fn with_term_taxonomy(mut self, term_taxonomy_id: i64) -> Self {
        self.term_taxonomy_id = Some(term_taxonomy_id);
        self
    }

    /// Parse `SITE:ID` or `SITE:ID:TERM_TAXONOMY_ID`.
    pub fn parse(items_type: &str, spec: &str) -> Result<Self, String> {
        let parts: Vec<&str> = spec.split(':').collect();
        let number = |part: &str, what: &str| {
            part.trim()
                .parse::<i64>()
                .map_err(|_| format!("Invalid {} '{}' in item '{}'", what, part, spec))
        };

        match parts.as_slice() {
            [site, id] => Ok(Self::new(items_type, number(site, "site id")?, number(id, "id")?)),
            [site, id, tt] => Ok(Self::new(items_type, number(site, "site id")?, number(id, "id")?)
                .with_term_taxonomy(number(tt, "term taxonomy id")?)),
            _ => Err(format!(
                "Invalid item '{}'. Expected SITE:ID or SITE:ID:TERM_TAXONOMY_ID",
                spec
            )),
        }
    }
}

/// One row found by a handler, tagged with the site it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRow {
    pub site_id: SiteId,
    pub columns: Row,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite_id: Option<CompositeId>,
}

impl CandidateRow {
    pub fn new(site_id: SiteId, columns: Row) -> Self {
        Self {
            site_id,
            columns,
            composite_id: None,
        }
    }

    /// Value used when ordering by `column`, including the injected `site_id`.
    pub fn sort_value(&self, column: &str) -> SqlValue {
        if column == SITE_ID_COLUMN {
            return SqlValue::Integer(self.site_id);
        }
        self.columns.get(column).cloned().unwrap_or(SqlValue::Null)
    }

    pub fn size(&self) -> i64 {
        self.columns.get_i64(SIZE_COLUMN).unwrap_or(0)
    }
}

/// One page of candidates plus the cross-site total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindResult {
    pub rows: Vec<CandidateRow>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Result of one site's share of a delete or purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteOutcome {
    pub site_id: SiteId,
    pub affected: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-site results of a delete or purge, in the order sites were visited.
///
/// A failed site contributes zero: its statements run as one unit and are
/// rolled back on error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub sites: Vec<SiteOutcome>,
}

impl SweepReport {
    /// Total rows affected across all sites.
    pub fn affected(&self) -> u64 {
        self.sites.iter().map(|s| s.affected).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SiteOutcome> {
        self.sites.iter().filter(|s| s.error.is_some())
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn record_success(&mut self, site_id: SiteId, affected: u64) {
        self.sites.push(SiteOutcome {
            site_id,
            affected,
            error: None,
        });
    }

    pub fn record_failure(&mut self, site_id: SiteId, error: impl Into<String>) {
        self.sites.push(SiteOutcome {
            site_id,
            affected: 0,
            error: Some(error.into()),
        });
    }
}
