use serde::Serialize;

use dbsweep_core::{FindResult, SweepReport};

/// Listing output (used by the list command).
#[derive(Serialize)]
pub struct ListOutput<'a> {
    pub category: &'a str,
    pub pages: u64,
    #[serde(flatten)]
    pub result: &'a FindResult,
}

/// Delete and purge output.
#[derive(Serialize)]
pub struct SweepOutput<'a> {
    pub category: &'a str,
    pub operation: &'a str,
    pub affected: u64,
    pub complete: bool,
    #[serde(flatten)]
    pub report: &'a SweepReport,
}

/// One registered category (used by the types command).
#[derive(Serialize)]
pub struct CategoryInfo<'a> {
    pub category: &'a str,
    pub table: &'a str,
    pub primary_key: &'a str,
    pub sortable_columns: &'a [&'a str],
    pub date_column: Option<&'a str>,
    pub all_sites_sortable: bool,
}
