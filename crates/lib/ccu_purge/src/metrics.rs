use opentelemetry::{
    global,
    metrics::{Counter, Meter},
};

#[derive(Debug)]
pub struct PurgeMetrics {
    pub(crate) batch_purges: Counter<u64>,
    pub(crate) purged_targets: Counter<u64>,
    pub(crate) batch_purge_errors: Counter<u64>,
    pub(crate) rate_limited_batches: Counter<u64>,
}

impl PurgeMetrics {
    pub fn new(meter: &Meter) -> Self {
        const PREFIX: &str = "akamai.ccu";
        Self {
            batch_purges: meter
                .u64_counter(format!("{PREFIX}.batch_purges"))
                .with_unit("1")
                .build(),
            purged_targets: meter
                .u64_counter(format!("{PREFIX}.purged_targets"))
                .with_unit("1")
                .build(),
            batch_purge_errors: meter
                .u64_counter(format!("{PREFIX}.batch_purge_errors"))
                .with_unit("1")
                .build(),
            rate_limited_batches: meter
                .u64_counter(format!("{PREFIX}.rate_limited_batches"))
                .with_unit("1")
                .build(),
        }
    }

    /// metrics on the globally installed meter provider, a no-op unless the
    /// host application set one up.
    pub fn global() -> Self {
        Self::new(&global::meter("ccu"))
    }
}
