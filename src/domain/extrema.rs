//! Local extrema detection and reconciliation.
//!
//! Detection runs in passes over an arena of per-bar tags (`Vec<Option<ExtremaKind>>`,
//! one slot per bar):
//! 1. [`mark_extrema`] tags strict local maxima of `high` and minima of `low`
//!    within `order` bars on each side (window clipped at the series edges)
//! 2. [`reconcile`] collapses runs of same-kind tags to their most extreme bar,
//!    so retained tags strictly alternate
//! 3. [`close_trailing_maximum`] promotes the lowest recent low to a minimum
//!    when the series ends on a maximum
//! 4. [`annotate`] turns the tags into [`ExtremaPoint`]s with rise/fall labels

use std::fmt;

use serde::Serialize;

use super::ohlcv::OhlcvBar;
use super::round2;

pub const DEFAULT_ORDER: usize = 30;
pub const DEFAULT_TRAILING_WINDOW: usize = 3;

/// A fall of at least this many percent is labelled severe.
pub const SEVERE_FALL_PCT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtremaKind {
    Minimum,
    Maximum,
}

impl fmt::Display for ExtremaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtremaKind::Minimum => write!(f, "minimum"),
            ExtremaKind::Maximum => write!(f, "maximum"),
        }
    }
}

/// Label attached to a retained extremum. Percentages and prices are rounded
/// to 2 decimals.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// First retained point: its raw price.
    Price(f64),
    /// Maximum after a minimum, rise of at most 100%.
    Rise { pct: f64, price: f64 },
    /// Maximum after a minimum, rise above 100%, as a multiple of the minimum.
    MultiBagger { multiple: f64, price: f64 },
    /// Minimum after a maximum.
    Fall { pct: f64, price: f64, severe: bool },
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Price(price) => write!(f, "${}", price),
            Annotation::Rise { pct, price } => write!(f, "🚀{}% ${}", pct, price),
            Annotation::MultiBagger { multiple, price } => write!(f, "🚀🌌{}x ${}", multiple, price),
            Annotation::Fall {
                pct,
                price,
                severe: true,
            } => write!(f, "😭💔{}% ${}", pct, price),
            Annotation::Fall { pct, price, .. } => write!(f, "💸{}% ${}", pct, price),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtremaPoint {
    pub index: usize,
    pub kind: ExtremaKind,
    /// `low` for a minimum, `high` for a maximum.
    pub price: f64,
    pub annotation: Annotation,
}

/// Run every pass and return the annotated, alternating extrema.
///
/// Returns an empty list when nothing qualifies; the bars are never modified.
pub fn detect_extrema(bars: &[OhlcvBar], order: usize, trailing_window: usize) -> Vec<ExtremaPoint> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let mut tags = mark_extrema(&highs, &lows, order);
    reconcile(&mut tags, &highs, &lows);
    close_trailing_maximum(&mut tags, &lows, trailing_window);
    annotate(&tags, &highs, &lows)
}

/// Tag bar `i` as a maximum when `highs[i]` is strictly greater than every
/// other high in `[i - order, i + order]`, and as a minimum for the symmetric
/// test on `lows`. Neighbour indices are clipped to the series, so the first
/// and last bars are never tagged. A bar passing both tests is a maximum.
pub fn mark_extrema(highs: &[f64], lows: &[f64], order: usize) -> Vec<Option<ExtremaKind>> {
    let n = highs.len().min(lows.len());
    let mut tags = vec![None; n];
    if order == 0 || n == 0 {
        return tags;
    }
    // neighbours past either end clip to the edge bars, so a wider window adds nothing
    let order = order.min(n);

    let strict_over = |values: &[f64], i: usize, cmp: fn(f64, f64) -> bool| {
        (1..=order).all(|k| {
            let before = i.saturating_sub(k);
            let after = (i + k).min(n - 1);
            cmp(values[i], values[before]) && cmp(values[i], values[after])
        })
    };

    for (i, tag) in tags.iter_mut().enumerate() {
        if strict_over(highs, i, |a, b| a > b) {
            *tag = Some(ExtremaKind::Maximum);
        } else if strict_over(lows, i, |a, b| a < b) {
            *tag = Some(ExtremaKind::Minimum);
        }
    }

    tags
}

/// Collapse every run of consecutive same-kind tags to a single tag on the
/// most extreme bar of the run (highest high / lowest low, earliest on ties).
pub fn reconcile(tags: &mut [Option<ExtremaKind>], highs: &[f64], lows: &[f64]) {
    let marked: Vec<(usize, ExtremaKind)> = tags
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.map(|k| (i, k)))
        .collect();

    for run in marked.chunk_by(|a, b| a.1 == b.1) {
        if run.len() < 2 {
            continue;
        }
        let kind = run[0].1;
        let keep = match kind {
            ExtremaKind::Maximum => extreme_index(run, highs, |candidate, best| candidate > best),
            ExtremaKind::Minimum => extreme_index(run, lows, |candidate, best| candidate < best),
        };
        for &(i, _) in run {
            if i != keep {
                tags[i] = None;
            }
        }
    }
}

fn extreme_index(run: &[(usize, ExtremaKind)], values: &[f64], better: fn(f64, f64) -> bool) -> usize {
    let mut best = run[0].0;
    for &(i, _) in &run[1..] {
        if better(values[i], values[best]) {
            best = i;
        }
    }
    best
}

/// If the last tag is a maximum, tag the lowest low of the final
/// `trailing_window` bars as a minimum so the series ends on a matching
/// reference point. Only bars after that maximum are eligible; when none
/// qualifies the tags are left as they are.
pub fn close_trailing_maximum(tags: &mut [Option<ExtremaKind>], lows: &[f64], trailing_window: usize) {
    let Some(last) = tags.iter().rposition(|t| t.is_some()) else {
        return;
    };
    if tags[last] != Some(ExtremaKind::Maximum) {
        return;
    }

    let n = tags.len().min(lows.len());
    let start = n.saturating_sub(trailing_window).max(last + 1);
    let mut lowest: Option<usize> = None;
    for i in start..n {
        if !lows[i].is_finite() {
            continue;
        }
        if lowest.is_none_or(|j| lows[i] < lows[j]) {
            lowest = Some(i);
        }
    }

    if let Some(i) = lowest {
        tags[i] = Some(ExtremaKind::Minimum);
    }
}

/// Build annotated points from alternating tags.
pub fn annotate(tags: &[Option<ExtremaKind>], highs: &[f64], lows: &[f64]) -> Vec<ExtremaPoint> {
    let marked: Vec<(usize, ExtremaKind)> = tags
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.map(|k| (i, k)))
        .collect();

    let price_of = |i: usize, kind: ExtremaKind| match kind {
        ExtremaKind::Minimum => lows[i],
        ExtremaKind::Maximum => highs[i],
    };

    let mut points = Vec::with_capacity(marked.len());
    for (pos, &(index, kind)) in marked.iter().enumerate() {
        let price = price_of(index, kind);
        let annotation = if pos == 0 {
            Annotation::Price(round2(price))
        } else {
            let prev = marked[pos - 1].0;
            match kind {
                ExtremaKind::Maximum => {
                    let rise = (highs[index] / lows[prev] - 1.0) * 100.0;
                    if rise > 100.0 {
                        Annotation::MultiBagger {
                            multiple: round2((rise + 100.0) / 100.0),
                            price: round2(price),
                        }
                    } else {
                        Annotation::Rise {
                            pct: round2(rise),
                            price: round2(price),
                        }
                    }
                }
                ExtremaKind::Minimum => {
                    let fall = round2((1.0 - lows[index] / highs[prev]) * 100.0);
                    Annotation::Fall {
                        pct: fall,
                        price: round2(price),
                        severe: fall >= SEVERE_FALL_PCT,
                    }
                }
            }
        };
        points.push(ExtremaPoint {
            index,
            kind,
            price,
            annotation,
        });
    }

    points
}
