#[cfg(test)]
mod tests {
    use crate::analytics::{
        categorical_distribution, summary_metrics, time_series, CategoricalField, SeriesMetric,
    };
    use crate::dataset::{FilterSpec, LogDataset};
    use crate::parser::LineParser;
    use crate::synth::LogLineSynthesizer;
    use crate::traffic::TrafficModel;
    use crate::volume::VolumeShaper;
    use chrono::{Duration, TimeZone, Utc};
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    /// The full pipeline: synthesize a file, parse it back, filter and
    /// aggregate. Exercises the round-trip invariant end to end.
    #[test]
    fn test_generate_parse_aggregate_pipeline() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("synthetic.log");

        let end = Utc.with_ymd_and_hms(2023, 10, 10, 12, 0, 0).unwrap();
        let mut synthesizer =
            LogLineSynthesizer::with_seed(TrafficModel::default(), VolumeShaper::default(), 1234);
        let delivered = synthesizer.generate_to_path(end, 2_000, &log_path).unwrap();
        assert_eq!(delivered, 2_000);

        let parser = LineParser::new();
        let dataset = LogDataset::from_path(&log_path, &parser).unwrap();

        // Every synthetic line parses.
        assert_eq!(dataset.len(), 2_000);
        assert!(dataset.failures().is_empty());

        // Aggregation conservation over the unfiltered set.
        let series = time_series(&dataset, Duration::hours(1), SeriesMetric::Count);
        let total: f64 = series.iter().map(|(_, v)| v).sum();
        assert_eq!(total as usize, dataset.len());

        // Summary metrics are defined and sane.
        let metrics = summary_metrics(&dataset).unwrap();
        assert_eq!(metrics.total_requests, 2_000);
        assert!(metrics.mean_response_time_ms > 0.0);
        assert!(metrics.success_rate_pct > 50.0 && metrics.success_rate_pct <= 100.0);

        // The endpoint pool dominates the path distribution.
        let paths = categorical_distribution(&dataset, CategoricalField::Path, Some(3));
        assert_eq!(paths.len(), 3);
        assert!(paths[0].1 >= paths[1].1 && paths[1].1 >= paths[2].1);
    }

    #[test]
    fn test_filtered_pipeline_matches_manual_count() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("filter.log");

        let end = Utc.with_ymd_and_hms(2023, 10, 10, 12, 0, 0).unwrap();
        let mut synthesizer =
            LogLineSynthesizer::with_seed(TrafficModel::default(), VolumeShaper::default(), 77);
        synthesizer.generate_to_path(end, 1_000, &log_path).unwrap();

        let parser = LineParser::new();
        let dataset = LogDataset::from_path(&log_path, &parser).unwrap();

        let statuses: HashSet<u16> = [200].into_iter().collect();
        let methods: HashSet<String> = ["GET".to_string()].into_iter().collect();
        let spec = FilterSpec {
            start_date: (end - Duration::days(7)).date_naive(),
            end_date: end.date_naive(),
            statuses,
            methods,
        };

        let filtered = dataset.filter(&spec);
        let manual = dataset
            .records()
            .iter()
            .filter(|r| r.status == 200 && r.method == "GET")
            .count();
        assert_eq!(filtered.len(), manual);

        // Conservation holds on the filtered set too.
        let series = time_series(&filtered, Duration::hours(1), SeriesMetric::Count);
        let total: f64 = series.iter().map(|(_, v)| v).sum();
        assert_eq!(total as usize, filtered.len());
    }

    #[test]
    fn test_corrupted_file_reports_failures_and_keeps_going() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("corrupt.log");

        let end = Utc.with_ymd_and_hms(2023, 10, 10, 12, 0, 0).unwrap();
        let mut synthesizer =
            LogLineSynthesizer::with_seed(TrafficModel::default(), VolumeShaper::default(), 5);
        synthesizer.generate_to_path(end, 100, &log_path).unwrap();

        // Splice garbage into the middle of the file.
        let content = fs::read_to_string(&log_path).unwrap();
        let mut lines: Vec<&str> = content.lines().collect();
        lines.insert(50, "*** truncated by logrotate ***");
        lines.insert(10, "");
        let spliced = lines.join("\n");
        fs::write(&log_path, &spliced).unwrap();

        let parser = LineParser::new();
        let dataset = LogDataset::from_path(&log_path, &parser).unwrap();

        assert_eq!(dataset.len(), 100);
        assert_eq!(dataset.failures().len(), 1);
        assert_eq!(dataset.failures()[0].line, "*** truncated by logrotate ***");
    }

    #[test]
    fn test_generated_timestamps_cover_multiple_days() {
        let end = Utc.with_ymd_and_hms(2023, 10, 10, 12, 0, 0).unwrap();
        let mut synthesizer =
            LogLineSynthesizer::with_seed(TrafficModel::default(), VolumeShaper::default(), 8);

        let mut buffer = Vec::new();
        synthesizer.generate(end, 5_000, &mut buffer).unwrap();

        let parser = LineParser::new();
        let text = String::from_utf8(buffer).unwrap();
        let dataset = LogDataset::build(text.lines(), &parser);

        let days: HashSet<_> = dataset
            .records()
            .iter()
            .map(|r| r.timestamp.date_naive())
            .collect();
        assert!(days.len() >= 7, "expected a week of traffic, got {} days", days.len());
    }
}
