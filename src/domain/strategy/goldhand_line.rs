//! Goldhand line: a ribbon of four SMMA lines over hl2.
//!
//! Windows 15/19/25/29 (v1..v4). Colour per bar:
//! - gold: v4 < v3 < v2 < v1 (short lines on top, uptrend)
//! - blue: v1 < v2 < v3 < v4 (downtrend)
//! - grey: anything else
//!
//! A bar where any line is undefined has no colour and never signals. The
//! lines and colour are feature columns; the strategy only reads them.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::{ExitSignal, SignalStrategy};
use crate::domain::features::FeatureRow;

pub const RIBBON_WINDOWS: [usize; 4] = [15, 19, 25, 29];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RibbonColor {
    Gold,
    Blue,
    Grey,
}

impl fmt::Display for RibbonColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RibbonColor::Gold => write!(f, "gold"),
            RibbonColor::Blue => write!(f, "blue"),
            RibbonColor::Grey => write!(f, "grey"),
        }
    }
}

impl FromStr for RibbonColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gold" => Ok(RibbonColor::Gold),
            "blue" => Ok(RibbonColor::Blue),
            "grey" | "gray" => Ok(RibbonColor::Grey),
            other => Err(format!("unknown ribbon colour '{}' (expected gold, blue or grey)", other)),
        }
    }
}

/// Colour of one bar from its four line values, shortest window first.
pub fn ribbon_color(lines: [f64; 4]) -> Option<RibbonColor> {
    if lines.iter().any(|v| !v.is_finite()) {
        return None;
    }
    let [v1, v2, v3, v4] = lines;
    if v4 < v3 && v3 < v2 && v2 < v1 {
        Some(RibbonColor::Gold)
    } else if v1 < v2 && v2 < v3 && v3 < v4 {
        Some(RibbonColor::Blue)
    } else {
        Some(RibbonColor::Grey)
    }
}

/// The ribbon colour column.
pub fn ribbon_colors(rows: &[FeatureRow]) -> Vec<Option<RibbonColor>> {
    rows.iter().map(|r| r.ribbon_color).collect()
}

/// A run of consecutive bars sharing one colour, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSegment {
    pub start: usize,
    pub end: usize,
    pub color: RibbonColor,
}

/// Split the colour series into runs. Uncoloured bars end a run and belong to none.
/// The feature export numbers rows by the run they fall in.
pub fn color_segments(colors: &[Option<RibbonColor>]) -> Vec<ColorSegment> {
    let mut segments: Vec<ColorSegment> = Vec::new();
    for (i, color) in colors.iter().enumerate() {
        let Some(color) = *color else {
            continue;
        };
        match segments.last_mut() {
            Some(seg) if seg.color == color && seg.end + 1 == i => seg.end = i,
            _ => segments.push(ColorSegment { start: i, end: i, color }),
        }
    }
    segments
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoldhandLineParams {
    pub buy_at: RibbonColor,
    pub sell_at: RibbonColor,
}

impl Default for GoldhandLineParams {
    fn default() -> Self {
        Self {
            buy_at: RibbonColor::Gold,
            sell_at: RibbonColor::Grey,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoldhandLine {
    params: GoldhandLineParams,
}

impl GoldhandLine {
    pub fn new(params: GoldhandLineParams) -> Self {
        Self { params }
    }
}

fn color_at(rows: &[FeatureRow], i: usize) -> Option<RibbonColor> {
    rows.get(i).and_then(|r| r.ribbon_color)
}

impl SignalStrategy for GoldhandLine {
    fn name(&self) -> &'static str {
        "goldhand_line"
    }

    fn parameters(&self) -> Vec<(String, String)> {
        vec![
            ("buy_at".into(), self.params.buy_at.to_string()),
            ("sell_at".into(), self.params.sell_at.to_string()),
        ]
    }

    fn prepare(&mut self, _rows: &[FeatureRow]) {}

    fn should_enter(&self, rows: &[FeatureRow], i: usize) -> bool {
        color_at(rows, i) == Some(self.params.buy_at)
    }

    fn should_exit(&mut self, rows: &[FeatureRow], i: usize, _entry_price: f64) -> ExitSignal {
        if color_at(rows, i) == Some(self.params.sell_at) {
            ExitSignal::NextOpen
        } else {
            ExitSignal::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::features::test_rows;

    #[test]
    fn color_ordering() {
        assert_eq!(ribbon_color([4.0, 3.0, 2.0, 1.0]), Some(RibbonColor::Gold));
        assert_eq!(ribbon_color([1.0, 2.0, 3.0, 4.0]), Some(RibbonColor::Blue));
        assert_eq!(ribbon_color([2.0, 3.0, 1.0, 4.0]), Some(RibbonColor::Grey));
        // ties are not ordered
        assert_eq!(ribbon_color([1.0, 1.0, 1.0, 1.0]), Some(RibbonColor::Grey));
    }

    #[test]
    fn undefined_line_has_no_color() {
        assert_eq!(ribbon_color([4.0, f64::NAN, 2.0, 1.0]), None);
    }

    #[test]
    fn parse_color() {
        assert_eq!("Gold".parse::<RibbonColor>().unwrap(), RibbonColor::Gold);
        assert_eq!(" gray ".parse::<RibbonColor>().unwrap(), RibbonColor::Grey);
        assert!("green".parse::<RibbonColor>().is_err());
    }

    #[test]
    fn jump_turns_ribbon_gold_then_plunge_turns_it_blue() {
        let mut closes = vec![100.0; 20];
        closes.extend(vec![200.0; 20]);
        closes.extend(vec![10.0; 20]);
        let rows = test_rows(&closes);
        let colors = ribbon_colors(&rows);

        assert_eq!(colors[19], Some(RibbonColor::Grey));
        assert_eq!(colors[20], Some(RibbonColor::Gold));
        assert_eq!(colors[39], Some(RibbonColor::Gold));
        assert_eq!(colors[59], Some(RibbonColor::Blue));
    }

    #[test]
    fn segments_split_on_change_and_gaps() {
        use RibbonColor::*;
        let colors = [Some(Grey), Some(Grey), Some(Gold), None, Some(Gold), Some(Blue)];
        let segments = color_segments(&colors);
        assert_eq!(
            segments,
            vec![
                ColorSegment { start: 0, end: 1, color: Grey },
                ColorSegment { start: 2, end: 2, color: Gold },
                ColorSegment { start: 4, end: 4, color: Gold },
                ColorSegment { start: 5, end: 5, color: Blue },
            ]
        );
    }

    #[test]
    fn signals_follow_colors() {
        let mut closes = vec![100.0; 20];
        closes.extend(vec![200.0; 5]);
        let rows = test_rows(&closes);
        let mut strategy = GoldhandLine::new(GoldhandLineParams::default());

        assert!(!strategy.should_enter(&rows, 19));
        assert!(strategy.should_enter(&rows, 20));
        assert_eq!(strategy.should_exit(&rows, 10, 100.0), ExitSignal::NextOpen);
        assert_eq!(strategy.should_exit(&rows, 22, 100.0), ExitSignal::Hold);
    }

    #[test]
    fn signals_read_the_color_column() {
        let mut rows = test_rows(&[100.0; 6]);
        rows[3].ribbon_color = Some(RibbonColor::Blue);
        rows[4].ribbon_color = None;
        let mut strategy = GoldhandLine::new(GoldhandLineParams {
            buy_at: RibbonColor::Blue,
            sell_at: RibbonColor::Grey,
        });

        assert!(strategy.should_enter(&rows, 3));
        assert!(!strategy.should_enter(&rows, 4));
        assert_eq!(strategy.should_exit(&rows, 4, 100.0), ExitSignal::Hold);
        assert_eq!(strategy.should_exit(&rows, 5, 100.0), ExitSignal::NextOpen);
    }

    #[test]
    fn out_of_range_index_never_signals() {
        let strategy = GoldhandLine::new(GoldhandLineParams::default());
        assert!(!strategy.should_enter(&[], 3));
    }
}
