// Declarative chart configuration shared by the main chart and the minimap
use super::format::format_time_label;
use super::sample::{Sample, Series};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisId {
    Speed,
    Ping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Download,
    Upload,
    Ping,
}

impl Metric {
    pub fn value(&self, sample: &Sample) -> Option<f64> {
        match self {
            Metric::Download => sample.download,
            Metric::Upload => sample.upload,
            Metric::Ping => sample.ping,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetConfig {
    pub label: &'static str,
    pub metric: Metric,
    pub color: &'static str,
    pub axis: AxisId,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisConfig {
    pub id: AxisId,
    pub title: &'static str,
    pub color: &'static str,
    pub min: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartOptions {
    pub show_legend: bool,
    pub show_axes: bool,
    pub axes: Vec<AxisConfig>,
}

pub const MUTED_COLOR: &str = "#94a3b8";

pub fn common_datasets() -> Vec<DatasetConfig> {
    vec![
        DatasetConfig {
            label: "Download (Mbps)",
            metric: Metric::Download,
            color: "#38bdf8",
            axis: AxisId::Speed,
            dashed: false,
        },
        DatasetConfig {
            label: "Upload (Mbps)",
            metric: Metric::Upload,
            color: "#4ade80",
            axis: AxisId::Speed,
            dashed: false,
        },
        DatasetConfig {
            label: "Ping (ms)",
            metric: Metric::Ping,
            color: "#f472b6",
            axis: AxisId::Ping,
            dashed: true,
        },
    ]
}

impl ChartOptions {
    pub fn main() -> Self {
        Self {
            show_legend: true,
            show_axes: true,
            axes: vec![
                AxisConfig {
                    id: AxisId::Speed,
                    title: "Speed (Mbps)",
                    color: MUTED_COLOR,
                    min: None,
                },
                AxisConfig {
                    id: AxisId::Ping,
                    title: "Ping (ms)",
                    color: "#f472b6",
                    min: Some(0.0),
                },
            ],
        }
    }

    pub fn minimap() -> Self {
        Self {
            show_legend: false,
            show_axes: false,
            ..Self::main()
        }
    }

    pub fn axis(&self, id: AxisId) -> Option<&AxisConfig> {
        self.axes.iter().find(|a| a.id == id)
    }
}

/// Points for one dataset, x being the sample index. Missing values are
/// skipped so the line shows a gap instead of a zero.
pub fn dataset_points(series: &Series, metric: Metric) -> Vec<(f64, f64)> {
    series
        .samples()
        .iter()
        .enumerate()
        .filter_map(|(index, sample)| metric.value(sample).map(|v| (index as f64, v)))
        .collect()
}

pub fn time_labels(series: &Series) -> Vec<String> {
    series
        .samples()
        .iter()
        .map(|s| format_time_label(&s.timestamp))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datasets_are_split_across_axes() {
        let datasets = common_datasets();
        assert_eq!(datasets.len(), 3);
        assert!(datasets[..2].iter().all(|d| d.axis == AxisId::Speed));
        assert_eq!(datasets[2].axis, AxisId::Ping);
        assert!(datasets[2].dashed);
    }

    #[test]
    fn test_minimap_hides_chrome() {
        let minimap = ChartOptions::minimap();
        assert!(!minimap.show_legend);
        assert!(!minimap.show_axes);
        assert_eq!(ChartOptions::main().axis(AxisId::Ping).and_then(|a| a.min), Some(0.0));
    }

    #[test]
    fn test_dataset_points_skip_missing_values() {
        let mut failed = Sample::new("2024-05-01 10:01:00", 0.0, 0.0, 0.0);
        failed.download = None;
        let series = Series::from_ascending(vec![
            Sample::new("2024-05-01 10:00:00", 5.0, 1.0, 10.0),
            failed,
            Sample::new("2024-05-01 10:02:00", 9.0, 1.0, 10.0),
        ]);

        assert_eq!(
            dataset_points(&series, Metric::Download),
            vec![(0.0, 5.0), (2.0, 9.0)]
        );
        assert_eq!(dataset_points(&series, Metric::Ping).len(), 3);
        assert_eq!(time_labels(&series).len(), 3);
    }
}
