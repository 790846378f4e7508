//! Capacity gauges, refreshed after every insert and purge.
//!
//! `cachet_moka_entries` and `cachet_moka_size_bytes`, labelled by `backend`.
//! Recorded only with the `metrics` feature.

/// Point-in-time size of a moka store.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Capacity {
    pub entries: u64,
    pub weighted_size: u64,
}

#[cfg(feature = "metrics")]
lazy_static::lazy_static! {
    static ref GAUGES: (&'static str, &'static str) = {
        metrics::describe_gauge!("cachet_moka_entries", "Entries held by the moka store.");
        metrics::describe_gauge!(
            "cachet_moka_size_bytes",
            metrics::Unit::Bytes,
            "Weighted size of the moka store."
        );
        ("cachet_moka_entries", "cachet_moka_size_bytes")
    };
}

impl Capacity {
    #[cfg(feature = "metrics")]
    pub(crate) fn record(self, backend: &str) {
        let (entries, size) = *GAUGES;
        metrics::gauge!(entries, "backend" => backend.to_owned()).set(self.entries as f64);
        metrics::gauge!(size, "backend" => backend.to_owned()).set(self.weighted_size as f64);
    }

    #[cfg(not(feature = "metrics"))]
    #[inline]
    pub(crate) fn record(self, _backend: &str) {}
}
