use std::io::Write;

use parking_lot::Mutex;

use crate::cache::CacheStatsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for chunk cache snapshots.
///
/// This exporter writes in the Prometheus text exposition format so it can be
/// scraped by Prometheus or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_metric(&self, kind: &str, suffix: &str, value: u64) {
        let name = self.metric_name(suffix);
        let mut writer = self.writer.lock();
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_metric("counter", suffix, value);
    }

    fn write_gauge(&self, suffix: &str, value: u64) {
        self.write_metric("gauge", suffix, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<CacheStatsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &CacheStatsSnapshot) {
        self.write_counter("installs_total", snapshot.installs);
        self.write_counter("displacements_total", snapshot.displacements);
        self.write_counter("out_of_range_total", snapshot.out_of_range);
        self.write_counter("drops_total", snapshot.drops);
        self.write_counter("stale_drops_total", snapshot.stale_drops);
        self.write_counter("resizes_total", snapshot.resizes);
        self.write_counter("resize_migrated_total", snapshot.migrated);
        self.write_counter("resize_discarded_total", snapshot.resize_discarded);
        self.write_counter("cleared_total", snapshot.cleared);
        self.write_counter("light_tasks_executed_total", snapshot.light_tasks_executed);
        self.write_counter("light_tasks_skipped_total", snapshot.light_tasks_skipped);
        self.write_gauge("loaded_chunks", snapshot.loaded as u64);
        self.write_gauge("capacity", snapshot.capacity as u64);
        self.write_gauge("radius", u64::from(snapshot.radius));
        self.write_gauge("pending_light_tasks", snapshot.pending_light_tasks as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_prefixed_counters_and_gauges() {
        let exporter = PrometheusTextExporter::new("chunks", Vec::new());
        exporter.export(&CacheStatsSnapshot {
            installs: 3,
            stale_drops: 1,
            loaded: 2,
            capacity: 25,
            radius: 2,
            ..CacheStatsSnapshot::default()
        });
        let text = String::from_utf8(exporter.into_inner()).unwrap();

        assert!(text.contains("# TYPE chunks_installs_total counter\nchunks_installs_total 3\n"));
        assert!(text.contains("chunks_stale_drops_total 1\n"));
        assert!(text.contains("# TYPE chunks_loaded_chunks gauge\nchunks_loaded_chunks 2\n"));
        assert!(text.contains("chunks_capacity 25\n"));
        assert!(text.contains("chunks_radius 2\n"));
    }

    #[test]
    fn empty_prefix_uses_bare_names() {
        let exporter = PrometheusTextExporter::new("", Vec::new());
        exporter.export(&CacheStatsSnapshot::default());
        let text = String::from_utf8(exporter.into_inner()).unwrap();
        assert!(text.starts_with("# TYPE installs_total counter\n"));
    }
}
