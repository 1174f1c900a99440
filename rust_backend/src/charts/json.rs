use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use super::{ChartRenderer, ChartSpec, RenderError};

/// Writes every chart as a pretty-printed JSON description.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonChartRenderer;

impl JsonChartRenderer {
    fn check(chart: &ChartSpec) -> Result<(), RenderError> {
        match chart {
            ChartSpec::Boxplot { title, boxes, .. } if boxes.is_empty() => {
                Err(RenderError::NoData(title.clone()))
            }
            ChartSpec::Bubble { title, points, .. } if points.is_empty() => {
                Err(RenderError::NoData(title.clone()))
            }
            ChartSpec::Bubble {
                size_range: (min, max),
                ..
            } if !min.is_finite() || !max.is_finite() || min > max => {
                Err(RenderError::DegenerateSizeRange {
                    min: *min,
                    max: *max,
                })
            }
            _ => Ok(()),
        }
    }
}

impl ChartRenderer for JsonChartRenderer {
    fn render(&self, chart: &ChartSpec, output: &Path) -> Result<PathBuf, RenderError> {
        Self::check(chart)?;

        let mut name = output.as_os_str().to_owned();
        name.push(".json");
        let path = PathBuf::from(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(chart)?)?;
        debug!("Rendered '{}' to {}", chart.title(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{BoxSpec, BubblePoint};
    use tempfile::TempDir;

    fn bubble(sizes: (f64, f64)) -> ChartSpec {
        ChartSpec::Bubble {
            title: "Availability".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            size_range: sizes,
            points: vec![BubblePoint { x: 50.0, y: 2.0, size: 8.0 }],
        }
    }

    #[test]
    fn test_render_writes_json() {
        let dir = TempDir::new().unwrap();
        let chart = ChartSpec::Boxplot {
            title: "Accuracy score".to_string(),
            x_label: "Date".to_string(),
            y_label: "Values".to_string(),
            y_range: (0.0, 1.009),
            boxes: vec![BoxSpec {
                x: "2024-05".to_string(),
                series: None,
                min: 0.1,
                q1: 0.2,
                median: 0.3,
                q3: 0.4,
                max: 0.5,
            }],
        };

        let path = JsonChartRenderer
            .render(&chart, &dir.path().join("by_dimension/Accuracy score"))
            .unwrap();
        assert!(path.ends_with("by_dimension/Accuracy score.json"));

        let read: ChartSpec = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read, chart);
    }

    #[test]
    fn test_degenerate_bubble_sizes() {
        let dir = TempDir::new().unwrap();
        let err = JsonChartRenderer
            .render(&bubble((f64::INFINITY, f64::NEG_INFINITY)), &dir.path().join("bubble"))
            .unwrap_err();
        assert!(matches!(err, RenderError::DegenerateSizeRange { .. }));
        assert!(!dir.path().join("bubble.json").exists());

        assert!(JsonChartRenderer
            .render(&bubble((4.0, 8.0)), &dir.path().join("bubble"))
            .is_ok());
    }

    #[test]
    fn test_uniform_bubble_sizes_render() {
        let dir = TempDir::new().unwrap();
        let path = JsonChartRenderer
            .render(&bubble((8.0, 8.0)), &dir.path().join("uniform"))
            .unwrap();
        assert!(path.exists());
    }
}
