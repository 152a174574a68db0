// src/analyze/mod.rs
//! Read-only statistics over a `NormalizedTable`. None of these fail: gaps in the data
//! come back as zero or a sentinel.

use crate::normalize::{ColumnRole, NormalizedTable, NumericColumn};
use std::fmt;
use tracing::{info, warn};

/// Outcome of [`earliest_over_threshold`].
#[derive(Debug, Clone, PartialEq)]
pub enum Earliest {
    Found(String),
    /// No records, or the table lacks the gross/year/title columns.
    NoData,
    /// Data present but nothing reaches the threshold.
    NoneQualifying,
}

impl Earliest {
    pub fn as_answer(&self) -> &str {
        match self {
            Earliest::Found(title) => title,
            Earliest::NoData => "Unknown",
            Earliest::NoneQualifying => "None found",
        }
    }
}

impl fmt::Display for Earliest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_answer())
    }
}

/// Records grossing at least `threshold_billions` released strictly before `before_year`.
pub fn count_over_threshold(
    table: &NormalizedTable,
    threshold_billions: f64,
    before_year: i32,
) -> usize {
    if !table.is_bound(ColumnRole::Gross) || !table.is_bound(ColumnRole::Year) {
        warn!("gross or year column missing; counting nothing");
        return 0;
    }

    let count = table
        .records()
        .iter()
        .filter(|r| match (r.gross_billions, r.year) {
            (Some(gross), Some(year)) => gross >= threshold_billions && year < before_year,
            _ => false,
        })
        .count();
    info!(count, threshold_billions, before_year, "films over threshold");
    count
}

/// Title of the earliest-released record grossing at least `threshold_billions`. Equal
/// years resolve to whichever record comes first in the table.
pub fn earliest_over_threshold(table: &NormalizedTable, threshold_billions: f64) -> Earliest {
    if table.is_empty()
        || !table.is_bound(ColumnRole::Gross)
        || !table.is_bound(ColumnRole::Year)
    {
        warn!("no gross/year data for earliest-film search");
        return Earliest::NoData;
    }

    let mut best: Option<(i32, Option<&str>)> = None;
    for r in table.records() {
        let (Some(gross), Some(year)) = (r.gross_billions, r.year) else {
            continue;
        };
        if gross < threshold_billions {
            continue;
        }
        // strict `<` keeps the first of equal years
        if best.map_or(true, |(y, _)| year < y) {
            best = Some((year, r.title.as_deref()));
        }
    }

    let result = match best {
        None => Earliest::NoneQualifying,
        Some((_, Some(title))) => Earliest::Found(title.to_string()),
        Some((_, None)) => Earliest::NoData,
    };
    info!(threshold_billions, earliest = %result, "earliest film over threshold");
    result
}

/// Pearson correlation of two columns over records that have both. Fewer than two
/// pairs, or a column with no variance, gives 0.0.
pub fn correlation(table: &NormalizedTable, a: NumericColumn, b: NumericColumn) -> f64 {
    let pairs = table.pairs(a, b);
    if pairs.len() < 2 {
        warn!(%a, %b, pairs = pairs.len(), "insufficient data for correlation");
        return 0.0;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let (dx, dy) = (x - mean_a, y - mean_b);
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        warn!(%a, %b, "zero variance; correlation undefined");
        return 0.0;
    }
    let r = cov / denom;
    info!(%a, %b, r, "correlation");
    r
}

/// Ordinary least-squares `(slope, intercept)` over the pairs where neither side is
/// missing or NaN. Fewer than two pairs gives `(0.0, 0.0)`; identical x values give a
/// flat line through the mean of y.
pub fn linear_regression(x: &[Option<f64>], y: &[Option<f64>]) -> (f64, f64) {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .filter(|(a, b)| !a.is_nan() && !b.is_nan())
        .collect();
    fit_line(&pairs)
}

/// Least-squares fit over already-clean pairs.
pub fn fit_line(pairs: &[(f64, f64)]) -> (f64, f64) {
    if pairs.len() < 2 {
        return (0.0, 0.0);
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for &(px, py) in pairs {
        sxy += (px - mean_x) * (py - mean_y);
        sxx += (px - mean_x) * (px - mean_x);
    }

    if sxx == 0.0 {
        return (0.0, mean_y);
    }
    let slope = sxy / sxx;
    (slope, mean_y - slope * mean_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{normalize, tests::raw, tests::FILM_HEADERS};

    fn films() -> NormalizedTable {
        normalize(&raw(
            FILM_HEADERS,
            &[
                &["1", "Avatar", "2009", "$2,923,706,026", "1"],
                &["2", "Avengers: Endgame", "2019", "$2,797,501,328", "1"],
                &["3", "Avatar: The Way of Water", "2022", "$2,320,250,281", "3"],
                &["4", "Titanic", "1997", "$2,264,750,694", "1"],
                &["5", "Star Wars: The Force Awakens", "2015", "$2,071,310,218", "3"],
                &["6", "Jurassic World", "2015", "$1,671,537,444", "3"],
                &["7", "The Lion King", "2019", "$1,656,943,394", "7"],
            ],
        ))
    }

    #[test]
    fn counts_two_billion_before_2020() {
        let t = normalize(&raw(
            FILM_HEADERS,
            &[
                &["1", "A", "2009", "$2,500,000,000", "1"],
                &["2", "B", "2019", "$2,000,000,000", "1"],
                &["3", "C", "2021", "$2,100,000,000", "2"],
                &["4", "D", "2010", "$1,999,999,999", "4"],
            ],
        ));
        assert_eq!(count_over_threshold(&t, 2.0, 2020), 2);
    }

    #[test]
    fn count_is_monotonic() {
        let t = films();
        let mut last = usize::MAX;
        for threshold in [0.0, 1.0, 1.66, 2.0, 2.3, 2.8, 3.0] {
            let c = count_over_threshold(&t, threshold, 2020);
            assert!(c <= last, "threshold {threshold}: {c} > {last}");
            last = c;
        }
        let mut last = 0;
        for year in [1990, 1998, 2010, 2016, 2020, 2023] {
            let c = count_over_threshold(&t, 1.5, year);
            assert!(c >= last, "year {year}: {c} < {last}");
            last = c;
        }
    }

    #[test]
    fn count_without_year_column_is_zero() {
        let t = normalize(&raw(
            &["Title", "Worldwide gross"],
            &[&["Avatar", "$2,923,706,026"]],
        ));
        assert_eq!(count_over_threshold(&t, 1.0, 2100), 0);
    }

    #[test]
    fn earliest_over_one_and_a_half_billion() {
        assert_eq!(
            earliest_over_threshold(&films(), 1.5),
            Earliest::Found("Titanic".into())
        );
    }

    #[test]
    fn earliest_ties_keep_table_order() {
        let t = normalize(&raw(
            FILM_HEADERS,
            &[
                &["1", "Later", "2015", "$2,000,000,000", "1"],
                &["2", "First 2012", "2012", "$1,600,000,000", "1"],
                &["3", "Second 2012", "2012", "$1,900,000,000", "1"],
            ],
        ));
        assert_eq!(
            earliest_over_threshold(&t, 1.5),
            Earliest::Found("First 2012".into())
        );
    }

    #[test]
    fn earliest_sentinels_differ() {
        assert_eq!(earliest_over_threshold(&films(), 10.0), Earliest::NoneQualifying);
        assert_eq!(earliest_over_threshold(&films(), 10.0).as_answer(), "None found");

        let empty = normalize(&raw(FILM_HEADERS, &[]));
        assert_eq!(earliest_over_threshold(&empty, 1.5), Earliest::NoData);
        assert_eq!(earliest_over_threshold(&empty, 1.5).as_answer(), "Unknown");
    }

    #[test]
    fn correlation_is_symmetric() {
        let t = films();
        let ab = correlation(&t, NumericColumn::Rank, NumericColumn::Peak);
        let ba = correlation(&t, NumericColumn::Peak, NumericColumn::Rank);
        assert!((ab - ba).abs() < 1e-12);
        assert!(ab > 0.0 && ab <= 1.0);
    }

    #[test]
    fn correlation_of_identical_columns_is_one() {
        let r = correlation(&films(), NumericColumn::Rank, NumericColumn::Rank);
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correlation_degenerate_cases_are_zero() {
        let one = normalize(&raw(FILM_HEADERS, &[&["1", "Avatar", "2009", "$2,923,706,026", "1"]]));
        assert_eq!(correlation(&one, NumericColumn::Rank, NumericColumn::Peak), 0.0);

        let no_peak = normalize(&raw(
            &["Rank", "Title"],
            &[&["1", "A"], &["2", "B"], &["3", "C"]],
        ));
        assert_eq!(correlation(&no_peak, NumericColumn::Rank, NumericColumn::Peak), 0.0);

        let flat = normalize(&raw(
            &["Rank", "Peak"],
            &[&["1", "1"], &["2", "1"], &["3", "1"]],
        ));
        assert_eq!(correlation(&flat, NumericColumn::Rank, NumericColumn::Peak), 0.0);
    }

    #[test]
    fn regression_on_collinear_points() {
        let (slope, intercept) = linear_regression(
            &[Some(1.0), Some(2.0), Some(3.0)],
            &[Some(2.0), Some(4.0), Some(6.0)],
        );
        assert!((slope - 2.0).abs() < 1e-9);
        assert!(intercept.abs() < 1e-9);
    }

    #[test]
    fn regression_drops_missing_and_nan() {
        let (slope, intercept) = linear_regression(
            &[Some(1.0), None, Some(2.0), Some(f64::NAN), Some(3.0)],
            &[Some(3.0), Some(100.0), Some(5.0), Some(1.0), Some(7.0)],
        );
        assert!((slope - 2.0).abs() < 1e-9);
        assert!((intercept - 1.0).abs() < 1e-9);
    }

    #[test]
    fn regression_needs_two_points() {
        assert_eq!(linear_regression(&[Some(1.0)], &[Some(1.0)]), (0.0, 0.0));
        assert_eq!(linear_regression(&[], &[]), (0.0, 0.0));
    }
}
