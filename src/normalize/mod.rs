// src/normalize/mod.rs

pub mod coerce;
pub mod roles;

use crate::extract::RawTable;
pub use roles::{ColumnRole, RoleBindings};
use std::fmt;
use tracing::{debug, warn};

/// One cleaned row. Fields for unbound roles are always `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedRecord {
    pub rank: Option<i64>,
    pub title: Option<String>,
    pub year: Option<i32>,
    pub gross_billions: Option<f64>,
    pub peak: Option<i64>,
}

/// Columns that can feed a correlation or a chart axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    Rank,
    Year,
    Gross,
    Peak,
}

impl NumericColumn {
    pub fn role(&self) -> ColumnRole {
        match self {
            NumericColumn::Rank => ColumnRole::Rank,
            NumericColumn::Year => ColumnRole::Year,
            NumericColumn::Gross => ColumnRole::Gross,
            NumericColumn::Peak => ColumnRole::Peak,
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.role().as_str())
    }
}

impl NormalizedRecord {
    pub fn value(&self, col: NumericColumn) -> Option<f64> {
        match col {
            NumericColumn::Rank => self.rank.map(|v| v as f64),
            NumericColumn::Year => self.year.map(f64::from),
            NumericColumn::Gross => self.gross_billions,
            NumericColumn::Peak => self.peak.map(|v| v as f64),
        }
    }

    fn has(&self, role: ColumnRole) -> bool {
        match role {
            ColumnRole::Rank => self.rank.is_some(),
            ColumnRole::Title => self.title.is_some(),
            ColumnRole::Year => self.year.is_some(),
            ColumnRole::Gross => self.gross_billions.is_some(),
            ColumnRole::Peak => self.peak.is_some(),
            ColumnRole::Unmapped => true,
        }
    }
}

/// The cleaned dataset: complete records in source row order, plus which roles the
/// header row supplied.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    bindings: RoleBindings,
    records: Vec<NormalizedRecord>,
}

impl NormalizedTable {
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn bindings(&self) -> &RoleBindings {
        &self.bindings
    }

    pub fn is_bound(&self, role: ColumnRole) -> bool {
        self.bindings.is_bound(role)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(x, y)` for every record where both values are present and finite.
    pub fn pairs(&self, x: NumericColumn, y: NumericColumn) -> Vec<(f64, f64)> {
        self.records
            .iter()
            .filter_map(|r| Some((r.value(x)?, r.value(y)?)))
            .filter(|(a, b)| a.is_finite() && b.is_finite())
            .collect()
    }
}

/// Bind header roles, coerce every cell and keep only rows with a value in every bound
/// role. A table that lacks some role is not an error; that field just stays `None`.
pub fn normalize(table: &RawTable) -> NormalizedTable {
    let bindings = RoleBindings::bind(&table.headers);
    let cols: Vec<(usize, ColumnRole)> = bindings
        .roles()
        .iter()
        .enumerate()
        .filter(|(_, r)| **r != ColumnRole::Unmapped)
        .map(|(i, r)| (i, *r))
        .collect();

    for role in [
        ColumnRole::Rank,
        ColumnRole::Title,
        ColumnRole::Year,
        ColumnRole::Gross,
        ColumnRole::Peak,
    ] {
        if !bindings.is_bound(role) {
            warn!(%role, headers = ?table.headers, "no header for role");
        }
    }

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let mut rec = NormalizedRecord::default();
        for &(i, role) in &cols {
            let Some(cell) = row.get(i) else { continue };
            match role {
                ColumnRole::Rank => rec.rank = coerce::leading_integer(cell),
                ColumnRole::Title => rec.title = coerce::title(cell),
                ColumnRole::Year => rec.year = coerce::year(cell),
                ColumnRole::Gross => rec.gross_billions = coerce::gross_billions(cell),
                ColumnRole::Peak => rec.peak = coerce::leading_integer(cell),
                ColumnRole::Unmapped => {}
            }
        }
        if cols.iter().all(|(_, role)| rec.has(*role)) {
            records.push(rec);
        }
    }

    debug!(
        raw_rows = table.rows.len(),
        kept = records.len(),
        "normalized table"
    );
    NormalizedTable { bindings, records }
}
