use crate::models::file_metric::FileMetric;
use crate::models::overview::HotspotFile;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotspotThresholds {
    pub min_change_frequency: f64,
    pub min_complexity: f64,
}

impl Default for HotspotThresholds {
    fn default() -> Self {
        Self {
            min_change_frequency: 10.0,
            min_complexity: 20.0,
        }
    }
}

pub fn is_hotspot(file: &FileMetric, thresholds: &HotspotThresholds) -> bool {
    file.change_frequency_90d >= thresholds.min_change_frequency
        && file.cyclomatic_complexity >= thresholds.min_complexity
}

pub fn count_hotspots(files: &[FileMetric], thresholds: &HotspotThresholds) -> usize {
    files.iter().filter(|f| is_hotspot(f, thresholds)).count()
}

/// Top `n` hotspots ranked by complexity × change frequency, then path.
pub fn top_hotspots(files: &[FileMetric], thresholds: &HotspotThresholds, n: usize) -> Vec<HotspotFile> {
    let mut hotspots: Vec<HotspotFile> = files
        .iter()
        .filter(|f| is_hotspot(f, thresholds))
        .map(|f| HotspotFile {
            file_path: f.file_path.clone(),
            cyclomatic_complexity: f.cyclomatic_complexity,
            change_frequency_90d: f.change_frequency_90d,
            hotspot_score: f.cyclomatic_complexity * f.change_frequency_90d,
        })
        .collect();

    hotspots.sort_by(|a, b| {
        b.hotspot_score
            .total_cmp(&a.hotspot_score)
            .then_with(|| a.file_path.cmp(&b.file_path))
    });
    hotspots.truncate(n);
    hotspots
}
