// Visible index window of the main chart and its brush rectangle
use super::sample::Series;
use chrono::Duration;

/// Inclusive index range `[min_index, max_index]` into the current series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub min_index: usize,
    pub max_index: usize,
}

impl Viewport {
    pub fn new(min_index: usize, max_index: usize) -> Self {
        Self {
            min_index: min_index.min(max_index),
            max_index,
        }
    }

    /// The whole series, or `None` when there is nothing to show.
    pub fn full(len: usize) -> Option<Self> {
        len.checked_sub(1).map(|last| Self::new(0, last))
    }

    /// Fit a viewport taken from an older series into one of `len` samples.
    pub fn clamp_to(self, len: usize) -> Option<Self> {
        let last = len.checked_sub(1)?;
        let max_index = self.max_index.min(last);
        Some(Self::new(self.min_index.min(max_index), max_index))
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.min_index..=self.max_index).contains(&index)
    }
}

/// Brush rectangle over the minimap track, in percent of the track width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushGeometry {
    pub left_pct: f64,
    pub width_pct: f64,
}

impl BrushGeometry {
    pub const FULL: BrushGeometry = BrushGeometry {
        left_pct: 0.0,
        width_pct: 100.0,
    };

    pub fn right_pct(&self) -> f64 {
        self.left_pct + self.width_pct
    }
}

/// Window the chart opens on: everything within `lookback` of the newest sample.
///
/// Falls back to the full series when the window would hold one sample or
/// fewer, or when the newest timestamp cannot be read.
pub fn compute_default_viewport(series: &Series, lookback: Duration) -> Option<Viewport> {
    let last = series.len().checked_sub(1)?;
    let Some(latest) = series.latest().and_then(|s| s.instant()) else {
        return Viewport::full(series.len());
    };
    let cutoff = latest - lookback;

    let mut min_index = 0;
    for (index, sample) in series.samples().iter().enumerate().rev() {
        // Unreadable timestamps never end the window.
        if sample.instant().is_some_and(|t| t < cutoff) {
            min_index = index + 1;
            break;
        }
    }

    if min_index >= last {
        min_index = 0;
    }

    Some(Viewport::new(min_index, last))
}

/// Derive the brush rectangle from the chart's viewport.
///
/// `None` means the chart shows everything. The width floor never exceeds
/// one sample's span, so long series still map back to the same indices.
pub fn viewport_to_brush_geometry(
    viewport: Option<Viewport>,
    len: usize,
    minimum_width_pct: f64,
) -> BrushGeometry {
    if len < 2 {
        return BrushGeometry::FULL;
    }
    let last = len - 1;
    let viewport = viewport
        .and_then(|v| v.clamp_to(len))
        .unwrap_or(Viewport::new(0, last));

    let left_pct = viewport.min_index as f64 / last as f64 * 100.0;
    let right_pct = viewport.max_index as f64 / last as f64 * 100.0;
    let floor_pct = minimum_width_pct.min(100.0 / last as f64);
    let width_pct = (right_pct - left_pct).max(floor_pct).min(100.0);

    BrushGeometry {
        left_pct: left_pct.min(100.0 - width_pct).max(0.0),
        width_pct,
    }
}

/// Derive the chart's viewport from the brush rectangle, rounding to the
/// nearest sample index on both edges.
pub fn brush_geometry_to_viewport(geometry: BrushGeometry, len: usize) -> Option<Viewport> {
    if len < 2 {
        return None;
    }
    let last = len - 1;
    let to_index = |pct: f64| -> usize {
        let index = (pct / 100.0 * last as f64).round();
        (index.max(0.0) as usize).min(last)
    };

    let min_index = to_index(geometry.left_pct);
    let max_index = to_index(geometry.right_pct()).max(min_index);
    Some(Viewport::new(min_index, max_index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::Sample;
    use chrono::{NaiveDate, TimeDelta};

    fn minute_series(minutes: i64) -> Series {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let samples = (0..=minutes)
            .map(|m| {
                let t = start + TimeDelta::minutes(m);
                Sample::new(t.format("%Y-%m-%d %H:%M:%S").to_string(), 50.0, 10.0, 12.0)
            })
            .collect();
        Series::from_ascending(samples)
    }

    #[test]
    fn test_default_viewport_short_series_shows_everything() {
        let series = minute_series(120);
        let viewport = compute_default_viewport(&series, Duration::hours(6)).unwrap();
        assert_eq!(viewport, Viewport::new(0, 120));
    }

    #[test]
    fn test_default_viewport_keeps_last_six_hours() {
        let series = minute_series(600);
        let viewport = compute_default_viewport(&series, Duration::hours(6)).unwrap();

        assert_eq!(viewport.max_index, 600);
        let first = series.get(viewport.min_index).unwrap().instant().unwrap();
        let latest = series.latest().unwrap().instant().unwrap();
        assert_eq!(latest - first, Duration::hours(6));

        let before = series.get(viewport.min_index - 1).unwrap().instant().unwrap();
        assert!(latest - before > Duration::hours(6));
    }

    #[test]
    fn test_default_viewport_falls_back_when_window_collapses() {
        // Only the newest sample is inside the lookback.
        let series = Series::from_ascending(vec![
            Sample::new("2024-05-01 00:00:00", 1.0, 1.0, 1.0),
            Sample::new("2024-05-01 01:00:00", 1.0, 1.0, 1.0),
            Sample::new("2024-05-01 09:00:00", 1.0, 1.0, 1.0),
        ]);
        let viewport = compute_default_viewport(&series, Duration::hours(6)).unwrap();
        assert_eq!(viewport, Viewport::new(0, 2));

        assert_eq!(compute_default_viewport(&Series::default(), Duration::hours(6)), None);
    }

    #[test]
    fn test_three_sample_series_end_to_end() {
        let series = Series::from_ascending(vec![
            Sample::new("2024-05-01 10:00:00", 5.0, 1.0, 10.0),
            Sample::new("2024-05-01 10:01:00", 7.0, 1.0, 10.0),
            Sample::new("2024-05-01 10:02:00", 9.0, 1.0, 10.0),
        ]);
        let viewport = compute_default_viewport(&series, Duration::days(365)).unwrap();
        assert_eq!(viewport, Viewport::new(0, 2));

        let geometry = viewport_to_brush_geometry(Some(viewport), series.len(), 1.0);
        assert_eq!(geometry.left_pct, 0.0);
        assert_eq!(geometry.width_pct, 100.0);
    }

    #[test]
    fn test_small_series_gets_full_brush() {
        assert_eq!(viewport_to_brush_geometry(None, 0, 1.0), BrushGeometry::FULL);
        assert_eq!(
            viewport_to_brush_geometry(Some(Viewport::new(0, 0)), 1, 1.0),
            BrushGeometry::FULL
        );
        assert_eq!(brush_geometry_to_viewport(BrushGeometry::FULL, 1), None);
    }

    #[test]
    fn test_floor_width_at_right_edge_stays_on_track() {
        let geometry = viewport_to_brush_geometry(Some(Viewport::new(49, 49)), 50, 1.0);
        assert_eq!(geometry.width_pct, 1.0);
        assert!(geometry.right_pct() <= 100.0 + 1e-9);
    }

    #[test]
    fn test_viewport_survives_brush_round_trip() {
        for len in 2..=101usize {
            for min_index in 0..len {
                for max_index in min_index..len {
                    let viewport = Viewport::new(min_index, max_index);
                    let geometry = viewport_to_brush_geometry(Some(viewport), len, 1.0);
                    let back = brush_geometry_to_viewport(geometry, len).unwrap();

                    assert!(back.min_index <= back.max_index);
                    assert!(back.max_index < len);
                    assert!(back.min_index.abs_diff(min_index) <= 1, "{len} {viewport:?} {back:?}");
                    assert!(back.max_index.abs_diff(max_index) <= 1, "{len} {viewport:?} {back:?}");
                }
            }
        }
    }

    #[test]
    fn test_long_series_round_trip_stays_within_one_sample() {
        for len in [150usize, 301, 1000] {
            let last = len - 1;
            let indices: Vec<usize> = (0..len).step_by(7).chain([last - 1, last]).collect();
            for &min_index in &indices {
                for &max_index in indices.iter().filter(|&&i| i >= min_index) {
                    let viewport = Viewport::new(min_index, max_index);
                    let geometry = viewport_to_brush_geometry(Some(viewport), len, 1.0);
                    let back = brush_geometry_to_viewport(geometry, len).unwrap();

                    assert!(back.min_index.abs_diff(min_index) <= 1, "{len} {viewport:?} {back:?}");
                    assert!(back.max_index.abs_diff(max_index) <= 1, "{len} {viewport:?} {back:?}");
                }
            }
        }

        let geometry = viewport_to_brush_geometry(Some(Viewport::new(150, 150)), 301, 1.0);
        assert_eq!(
            brush_geometry_to_viewport(geometry, 301),
            Some(Viewport::new(150, 151))
        );
    }

    #[test]
    fn test_clamp_to_shorter_series() {
        let viewport = Viewport::new(40, 49);
        assert_eq!(viewport.clamp_to(30), Some(Viewport::new(29, 29)));
        assert_eq!(viewport.clamp_to(45), Some(Viewport::new(40, 44)));
        assert_eq!(viewport.clamp_to(0), None);
    }
}
