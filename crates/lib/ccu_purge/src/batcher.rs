use crate::{
    Config,
    api::{Backend, PurgeBackend as _, ResponseKind},
    credentials::Credentials,
    error::{Error, Result},
    metrics::PurgeMetrics,
    models::{BatchOutcome, PurgeResult, PurgeStatus, QueueLength},
    options::{ApiVersion, OptionOverrides, PurgeOptions},
    queue::{BatchLimit, PendingQueue},
    target::PurgeInput,
};
use bon::bon;
use itertools::Itertools as _;
use opentelemetry::KeyValue;
use std::time::Duration;
use tracing::{debug, error, info, instrument, trace, warn};

/// Collects purge targets and sends them to one of the CCU APIs in batches.
///
/// Methods take `&mut self` and finish their network call before returning,
/// an instance is meant to be driven by one task at a time. Separate
/// instances share nothing.
#[derive(Debug)]
pub struct PurgeBatcher {
    backend: Backend,
    options: PurgeOptions,
    batch_limit: BatchLimit,
    rate_limit_delay: Duration,
    queue: PendingQueue,
    last_result: Option<PurgeResult>,
    metrics: PurgeMetrics,
    metric_attributes: Vec<KeyValue>,
}

#[bon]
impl PurgeBatcher {
    /// Batcher for the configured API, with credentials and default options
    /// from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Credentials passed here win over the ones in `config` and the `.edgerc`
    /// file. `options` are applied on top of the configured defaults.
    #[builder(finish_fn = build)]
    pub fn builder(
        config: &Config,
        #[builder(into)] credentials: Option<Credentials>,
        #[builder(default)] options: OptionOverrides,
        #[builder(into)] targets: Option<PurgeInput>,
    ) -> Result<Self> {
        let api = config.api_version;
        let credentials = Credentials::resolve(api, credentials, config)?;

        let options = PurgeOptions::defaults_for(api)
            .merge(&config.option_overrides())
            .merge(&options);
        options.validate(api)?;

        let batch_limit = match (api, config.max_batch_bytes) {
            (_, Some(0)) => {
                return Err(Error::Configuration(
                    "AKAMAI_CCU_MAX_BATCH_BYTES must be positive".into(),
                ));
            }
            (ApiVersion::V3, Some(max_bytes)) => BatchLimit::Bytes(max_bytes),
            (api, _) => BatchLimit::default_for(api),
        };

        let mut batcher = Self::with_backend(
            Backend::from_config(api, config, credentials)?,
            options,
            batch_limit,
            config.rate_limit_delay,
        );
        if let Some(targets) = targets {
            batcher.add(targets)?;
        }
        Ok(batcher)
    }

    fn with_backend(
        backend: Backend,
        options: PurgeOptions,
        batch_limit: BatchLimit,
        rate_limit_delay: Duration,
    ) -> Self {
        let api = backend.api_version();
        Self {
            backend,
            options,
            batch_limit,
            rate_limit_delay,
            queue: PendingQueue::default(),
            last_result: None,
            metrics: PurgeMetrics::global(),
            metric_attributes: vec![KeyValue::new("api", api.to_string())],
        }
    }

    /// Queue one url, a list of urls, or resolved objects.
    ///
    /// Returns how many targets were added. When any of them is invalid, or
    /// too large for the byte limit of the API, nothing is added.
    pub fn add(&mut self, input: impl Into<PurgeInput>) -> Result<usize> {
        let targets = input.into().into_targets()?;
        if let BatchLimit::Bytes(max_bytes) = self.batch_limit
            && let Some(target) = targets.iter().find(|t| t.encoded_len() > max_bytes)
        {
            return Err(Error::UnsupportedInput(format!(
                "purge target of {} bytes can never fit into a batch of {max_bytes} bytes",
                target.encoded_len()
            )));
        }
        let added = targets.len();
        self.queue.extend(targets);

        debug!(added, pending = self.queue.len(), "queued purge targets");
        Ok(added)
    }

    /// Submit the next batch with the default limit of the API.
    pub async fn purge(&mut self) -> Result<BatchOutcome> {
        self.purge_batch(self.batch_limit).await
    }

    /// Submit at most one batch from the front of the queue.
    ///
    /// * empty queue: no request, [`BatchOutcome::Empty`].
    /// * accepted: the targets are gone from the queue.
    /// * rate limited: the batch is back at the front of the queue, the
    ///   caller decides when to try again.
    /// * any other response: [`Error::PurgeRequestFailed`]. The batch is not
    ///   put back, same for transport errors. Re-add the targets to retry them.
    /// * first target larger than a byte `limit`: [`Error::TargetTooLarge`],
    ///   the target is dropped from the queue and nothing is sent.
    #[instrument(skip(self), fields(api = %self.api_version(), pending = self.queue.len()))]
    pub async fn purge_batch(&mut self, limit: BatchLimit) -> Result<BatchOutcome> {
        let batch = match self.queue.take_batch(limit) {
            Ok(batch) => batch,
            Err(err @ Error::TargetTooLarge { .. }) => {
                error!(?err, "dropped purge target larger than the batch limit");
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        if batch.is_empty() {
            return Ok(BatchOutcome::Empty);
        }

        self.last_result = None;
        debug!(targets = batch.len(), "submitting purge batch");
        trace!(targets = %batch.iter().join(" "), "purge batch content");

        let result = match self.backend.submit(&batch, &self.options).await {
            Ok(result) => result,
            Err(err) => {
                // connection errors or similar, where we don't have a response
                self.metrics
                    .batch_purge_errors
                    .add(1, &self.metric_attributes);
                error!(?err, targets = batch.len(), "failed to send purge request");
                return Err(err);
            }
        };
        self.last_result = Some(result.clone());

        match self.backend.classify(&result) {
            ResponseKind::Accepted => {
                let count = batch.len();
                self.metrics.batch_purges.add(1, &self.metric_attributes);
                self.metrics
                    .purged_targets
                    .add(count as u64, &self.metric_attributes);

                info!(status = %result.status, count, "purge batch accepted");
                Ok(BatchOutcome::Purged { result, count })
            }
            ResponseKind::RateLimited => {
                let requeued = batch.len();
                self.queue.restore_front(batch);
                self.metrics
                    .rate_limited_batches
                    .add(1, &self.metric_attributes);

                warn!(status = %result.status, requeued, "purge request rate limited");
                Ok(BatchOutcome::RateLimited { result, requeued })
            }
            ResponseKind::Failed => {
                self.metrics
                    .batch_purge_errors
                    .add(1, &self.metric_attributes);

                error!(
                    status = %result.status,
                    body = result.body,
                    targets = batch.len(),
                    "purge request failed"
                );
                Err(Error::PurgeRequestFailed {
                    status: result.status,
                    body: result.body,
                })
            }
        }
    }

    /// [`purge_all_with_delay`](Self::purge_all_with_delay) with the
    /// configured delay.
    pub async fn purge_all(&mut self) -> Result<Vec<BatchOutcome>> {
        self.purge_all_with_delay(self.rate_limit_delay).await
    }

    /// Submit batches until the queue is empty.
    ///
    /// After a rate limited batch we sleep for `delay` and try the same batch
    /// again, without any retry limit. Wrap the future in
    /// [`tokio::time::timeout`] to bound it. Any error stops the loop, the
    /// targets after the failed batch stay queued.
    ///
    /// Returns every outcome in order, rate limited attempts included.
    #[instrument(skip(self), fields(api = %self.api_version(), pending = self.queue.len()))]
    pub async fn purge_all_with_delay(&mut self, delay: Duration) -> Result<Vec<BatchOutcome>> {
        let mut outcomes = Vec::new();

        loop {
            match self.purge().await? {
                BatchOutcome::Empty => break,
                outcome @ BatchOutcome::RateLimited { .. } => {
                    outcomes.push(outcome);
                    debug!(?delay, "waiting before retrying rate limited batch");
                    tokio::time::sleep(delay).await;
                }
                outcome => outcomes.push(outcome),
            }
        }

        info!(
            batches = outcomes.len(),
            purged = outcomes.iter().map(BatchOutcome::count).sum::<usize>(),
            "purged all pending targets"
        );
        Ok(outcomes)
    }

    /// Status of an earlier purge, `reference` is its `progressUri`.
    pub async fn check_status(&self, reference: &str) -> Result<PurgeStatus> {
        self.backend.check_status(reference).await
    }

    /// Number of purge requests waiting at Akamai for this account.
    pub async fn check_queue_length(&self) -> Result<QueueLength> {
        self.backend.check_queue_length().await
    }

    /// Targets not sent yet, in the order they will be sent.
    pub fn pending(&self) -> &PendingQueue {
        &self.queue
    }

    /// Response of the latest submission, `None` before the first one and
    /// after a transport error.
    pub fn last_result(&self) -> Option<&PurgeResult> {
        self.last_result.as_ref()
    }

    /// Options sent with every batch, after merging defaults, configuration
    /// and builder overrides.
    pub fn options(&self) -> &PurgeOptions {
        &self.options
    }

    pub fn api_version(&self) -> ApiVersion {
        self.backend.api_version()
    }

    /// Limit used by [`purge`](Self::purge) and [`purge_all`](Self::purge_all).
    pub fn batch_limit(&self) -> BatchLimit {
        self.batch_limit
    }
}

/// testing functionality
#[cfg(any(test, feature = "testing"))]
impl PurgeBatcher {
    /// Batcher on a [`MockBackend`](crate::MockBackend) with the
    /// default options and limits of `api`.
    pub fn mock(api: ApiVersion) -> Self {
        Self::with_backend(
            Backend::Mock(crate::MockBackend::new(api)),
            PurgeOptions::defaults_for(api),
            BatchLimit::default_for(api),
            Duration::from_secs(60),
        )
    }

    pub fn mock_backend(&self) -> Option<&crate::MockBackend> {
        match self.backend {
            Backend::Mock(ref backend) => Some(backend),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{PurgeResponse, RestPurgeResponse},
        options::{Action, ContentType, Network},
        target::{AbsoluteUrl, Target},
    };
    use ccu_config::AppConfig as _;
    use opentelemetry::metrics::MeterProvider as _;
    use opentelemetry_sdk::metrics::{
        InMemoryMetricExporter, PeriodicReader, SdkMeterProvider,
        data::{AggregatedMetrics, MetricData, ResourceMetrics},
    };
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use tokio::time::Instant;

    const RATE_LIMITED: &str = r#"{"httpStatus":507,"detail":"Queue is full","supportId":"17SY1402344390048829"}"#;
    const FORBIDDEN: &str = r#"{"httpStatus":403,"title":"unauthorized arl","detail":"http://www.example.com/forbidden.html"}"#;

    fn urls(count: usize) -> Vec<String> {
        (0..count)
            .map(|i| format!("http://www.example.com/url-{i}.html"))
            .collect()
    }

    fn config(vars: &[(&str, &str)]) -> Config {
        Config::from_env_source(&vars.iter().copied().collect::<HashMap<_, _>>()).unwrap()
    }

    fn mock(batcher: &PurgeBatcher) -> &crate::MockBackend {
        batcher.mock_backend().unwrap()
    }

    /// current value of a u64 counter, summed over its attribute sets.
    fn counter_value(collected: &[ResourceMetrics], name: &str) -> u64 {
        let Some(metric) = collected
            .iter()
            .flat_map(|rm| rm.scope_metrics())
            .flat_map(|sm| sm.metrics())
            .filter(|m| m.name() == name)
            .last()
        else {
            return 0;
        };

        let AggregatedMetrics::U64(MetricData::Sum(sum)) = metric.data() else {
            panic!("expected u64 counter, got: {:?}", metric.data());
        };
        sum.data_points().map(|dp| dp.value()).sum()
    }

    struct Page {
        slug: &'static str,
    }

    impl AbsoluteUrl for Page {
        fn absolute_url(&self) -> String {
            format!("https://www.example.com/pages/{}/", self.slug)
        }
    }

    #[test]
    fn test_add_keeps_order_and_counts() -> Result<()> {
        let mut batcher = PurgeBatcher::mock(ApiVersion::V3);

        assert_eq!(batcher.add("http://www.example.com/a.html")?, 1);
        assert_eq!(
            batcher.add(vec!["http://www.example.com/b.html", "http://www.example.com/a.html"])?,
            2
        );
        assert_eq!(
            batcher.add(PurgeInput::objects([Page { slug: "about" }, Page { slug: "team" }]))?,
            2
        );
        assert_eq!(batcher.add(PurgeInput::object(&Page { slug: "jobs" }))?, 1);

        assert_eq!(
            batcher.pending().iter().map(Target::as_str).collect::<Vec<_>>(),
            [
                "http://www.example.com/a.html",
                "http://www.example.com/b.html",
                "http://www.example.com/a.html",
                "https://www.example.com/pages/about/",
                "https://www.example.com/pages/team/",
                "https://www.example.com/pages/jobs/",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unsupported_input_leaves_queue_untouched() -> Result<()> {
        let mut batcher = PurgeBatcher::mock(ApiVersion::V3);
        batcher.add("http://www.example.com/a.html")?;

        assert!(matches!(
            batcher.add(None::<&str>),
            Err(Error::UnsupportedInput(_))
        ));
        assert!(matches!(
            batcher.add(vec!["http://www.example.com/b.html", ""]),
            Err(Error::UnsupportedInput(_))
        ));

        assert_eq!(batcher.pending().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_queue_sends_nothing() -> Result<()> {
        let mut batcher = PurgeBatcher::mock(ApiVersion::V3);

        let outcome = batcher.purge().await?;
        assert_eq!(outcome, BatchOutcome::Empty);
        assert_eq!(outcome.count(), 0);
        assert!(batcher.purge_all().await?.is_empty());

        assert!(mock(&batcher).submitted().await.is_empty());
        assert!(batcher.last_result().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_batches_of_hundred() -> Result<()> {
        let mut batcher = PurgeBatcher::mock(ApiVersion::V2);
        batcher.add(urls(250))?;

        let mut counts = Vec::new();
        for _ in 0..4 {
            counts.push(batcher.purge_batch(BatchLimit::Count(100)).await?.count());
        }
        assert_eq!(counts, [100, 100, 50, 0]);

        let submitted = mock(&batcher).submitted().await;
        assert_eq!(submitted.len(), 3);
        assert_eq!(submitted[0][0], "http://www.example.com/url-0.html");
        assert_eq!(submitted[2][49], "http://www.example.com/url-249.html");
        assert!(batcher.pending().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_v3_batches_respect_byte_cap() -> Result<()> {
        let mut batcher = PurgeBatcher::mock(ApiVersion::V3);
        assert_eq!(batcher.batch_limit(), BatchLimit::Bytes(BatchLimit::V3_MAX_BYTES));

        let long_urls: Vec<String> = (0..400)
            .map(|i| format!("https://www.example.com/{}/{i}.html", "x".repeat(300)))
            .collect();
        batcher.add(long_urls.clone())?;

        let outcomes = batcher.purge_all().await?;
        assert!(outcomes.len() > 1);
        assert_eq!(
            outcomes.iter().map(BatchOutcome::count).sum::<usize>(),
            long_urls.len()
        );

        let submitted = mock(&batcher).submitted().await;
        for batch in &submitted {
            let size: usize = batch.iter().map(Target::encoded_len).sum();
            assert!(size <= BatchLimit::V3_MAX_BYTES, "batch of {size} bytes");
        }
        // nothing lost, nothing reordered
        assert_eq!(
            submitted.concat().iter().map(Target::as_str).collect::<Vec<_>>(),
            long_urls
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_target_larger_than_byte_cap_is_rejected() -> Result<()> {
        let mut batcher = PurgeBatcher::mock(ApiVersion::V3);
        let oversized = format!("https://www.example.com/{}", "x".repeat(BatchLimit::V3_MAX_BYTES));

        assert!(matches!(
            batcher.add(oversized.clone()),
            Err(Error::UnsupportedInput(_))
        ));
        assert!(matches!(
            batcher.add(vec![oversized, "https://www.example.com/ok.html".into()]),
            Err(Error::UnsupportedInput(_))
        ));
        assert!(batcher.pending().is_empty());

        batcher.add("https://www.example.com/ok.html")?;
        assert_eq!(batcher.purge_all().await?.len(), 1);
        assert_eq!(
            mock(&batcher).submitted().await,
            [["https://www.example.com/ok.html"]]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_oversized_head_does_not_block_the_queue() -> Result<()> {
        let mut batcher = PurgeBatcher::mock(ApiVersion::V3);
        let oversized = format!("https://www.example.com/{}", "x".repeat(200));
        batcher.add(vec![oversized.as_str(), "https://www.example.com/ok.html"])?;

        match batcher.purge_batch(BatchLimit::Bytes(100)).await {
            Err(Error::TargetTooLarge { target, limit, .. }) => {
                assert_eq!(target.as_str(), oversized);
                assert_eq!(limit, 100);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(mock(&batcher).submitted().await.is_empty());

        // the next target goes out with the same limit
        assert_eq!(batcher.purge_batch(BatchLimit::Bytes(100)).await?.count(), 1);
        assert_eq!(
            mock(&batcher).submitted().await,
            [["https://www.example.com/ok.html"]]
        );
        assert!(batcher.pending().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_rate_limited_batch_is_requeued() -> Result<()> {
        let mut batcher = PurgeBatcher::mock(ApiVersion::V2);
        mock(&batcher)
            .push_response(StatusCode::INSUFFICIENT_STORAGE, RATE_LIMITED)
            .await;
        batcher.add(urls(3))?;

        let outcome = batcher.purge().await?;
        assert!(outcome.is_rate_limited());
        assert_eq!(outcome.count(), 0);
        assert!(matches!(outcome, BatchOutcome::RateLimited { requeued: 3, .. }));

        assert_eq!(
            batcher.pending().iter().map(Target::as_str).collect::<Vec<_>>(),
            urls(3)
        );
        assert_eq!(
            batcher.last_result().unwrap().status,
            StatusCode::INSUFFICIENT_STORAGE
        );

        // and it's the same batch on the next attempt
        assert_eq!(batcher.purge().await?.count(), 3);
        let submitted = mock(&batcher).submitted().await;
        assert_eq!(submitted[0], submitted[1]);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_all_sleeps_after_rate_limit() -> Result<()> {
        ccu_logging::testing::init();
        let mut batcher = PurgeBatcher::mock(ApiVersion::V3);
        mock(&batcher)
            .push_response(StatusCode::INSUFFICIENT_STORAGE, RATE_LIMITED)
            .await;
        batcher.add("http://www.example.com/url-1.html")?;

        let delay = Duration::from_secs(5);
        let start = Instant::now();
        let outcomes = batcher.purge_all_with_delay(delay).await?;
        assert!(start.elapsed() >= delay);

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_rate_limited());

        let purged: Vec<_> = outcomes.iter().filter(|o| o.count() > 0).collect();
        assert_eq!(purged.len(), 1);
        assert_eq!(purged[0].count(), 1);
        assert_eq!(purged[0].result().unwrap().status, StatusCode::CREATED);

        assert_eq!(mock(&batcher).submitted().await.len(), 2);
        assert!(batcher.pending().is_empty());
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_all_can_be_cancelled() -> Result<()> {
        let mut batcher = PurgeBatcher::mock(ApiVersion::V3);
        for _ in 0..3 {
            mock(&batcher)
                .push_response(StatusCode::TOO_MANY_REQUESTS, "")
                .await;
        }
        batcher.add(urls(2))?;

        let result = tokio::time::timeout(
            Duration::from_secs(90),
            batcher.purge_all_with_delay(Duration::from_secs(60)),
        )
        .await;
        assert!(result.is_err());

        // the rate limited batch is never dropped
        assert_eq!(batcher.pending().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_hard_failure_stops_draining() -> Result<()> {
        ccu_logging::testing::init();
        let mut batcher = PurgeBatcher::mock(ApiVersion::V2);
        batcher.add(urls(450))?;

        let backend = mock(&batcher);
        backend.push_response(StatusCode::CREATED, "").await;
        backend.push_response(StatusCode::FORBIDDEN, FORBIDDEN).await;

        let err = batcher
            .purge_all_with_delay(Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PurgeRequestFailed { .. }));
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));

        // the failed batch is gone, the rest is still queued
        assert_eq!(mock(&batcher).submitted().await.len(), 2);
        assert_eq!(batcher.pending().len(), 50);
        assert_eq!(
            batcher.pending().iter().next().unwrap(),
            &"http://www.example.com/url-400.html"
        );

        let last = batcher.last_result().unwrap();
        assert_eq!(last.status, StatusCode::FORBIDDEN);
        assert_eq!(
            last.rest().and_then(|r| r.title.as_deref()),
            Some("unauthorized arl")
        );
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_metrics() -> Result<()> {
        let exporter = InMemoryMetricExporter::default();
        let provider = SdkMeterProvider::builder()
            .with_reader(PeriodicReader::builder(exporter.clone()).build())
            .build();

        let mut batcher = PurgeBatcher::mock(ApiVersion::V2);
        batcher.metrics = PurgeMetrics::new(&provider.meter("ccu"));
        batcher.add(urls(450))?;

        let backend = mock(&batcher);
        backend.push_response(StatusCode::CREATED, "").await;
        backend
            .push_response(StatusCode::INSUFFICIENT_STORAGE, RATE_LIMITED)
            .await;
        backend.push_response(StatusCode::CREATED, "").await;
        backend.push_response(StatusCode::FORBIDDEN, FORBIDDEN).await;

        assert!(
            batcher
                .purge_all_with_delay(Duration::from_secs(1))
                .await
                .is_err()
        );

        provider.force_flush().unwrap();
        let collected = exporter.get_finished_metrics().unwrap();

        assert_eq!(counter_value(&collected, "akamai.ccu.batch_purges"), 2);
        assert_eq!(counter_value(&collected, "akamai.ccu.purged_targets"), 400);
        assert_eq!(counter_value(&collected, "akamai.ccu.rate_limited_batches"), 1);
        assert_eq!(counter_value(&collected, "akamai.ccu.batch_purge_errors"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_rate_limit_status_depends_on_api() -> Result<()> {
        // 429 is only a rate limit for v3
        let mut batcher = PurgeBatcher::mock(ApiVersion::V2);
        mock(&batcher)
            .push_response(StatusCode::TOO_MANY_REQUESTS, "")
            .await;
        batcher.add(urls(1))?;

        assert!(matches!(
            batcher.purge().await,
            Err(Error::PurgeRequestFailed { status, .. }) if status == StatusCode::TOO_MANY_REQUESTS
        ));
        assert!(batcher.pending().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_last_result() -> Result<()> {
        let mut batcher = PurgeBatcher::mock(ApiVersion::V3);
        batcher.add(urls(1))?;

        let outcome = batcher.purge().await?;
        let last = batcher.last_result().unwrap();
        assert_eq!(Some(last), outcome.result());
        assert!(matches!(
            last.response,
            Some(PurgeResponse::Rest(RestPurgeResponse {
                estimated_seconds: Some(5),
                ..
            }))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_status_checks() -> Result<()> {
        let batcher = PurgeBatcher::mock(ApiVersion::V2);
        let status = batcher.check_status("/ccu/v2/purges/abc-123").await?;
        assert_eq!(status.purge_id.as_deref(), Some("abc-123"));
        assert!(status.is_done());
        assert_eq!(batcher.check_queue_length().await?.queue_length, 0);

        let batcher = PurgeBatcher::mock(ApiVersion::V3);
        assert!(matches!(
            batcher.check_queue_length().await,
            Err(Error::UnsupportedOperation {
                operation: "check_queue_length",
                api: ApiVersion::V3
            })
        ));
        assert!(matches!(
            batcher.check_status("/ccu/v2/purges/abc-123").await,
            Err(Error::UnsupportedOperation { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_construct_from_config() -> Result<()> {
        let config = config(&[
            ("AKAMAI_CCU_API_VERSION", "v2"),
            ("AKAMAI_CCUAPI_USERNAME", "ccu_user"),
            ("AKAMAI_CCUAPI_PASSWORD", "ccu_password"),
            ("AKAMAI_CCU_NETWORK", "staging"),
        ]);

        let batcher = PurgeBatcher::builder()
            .config(&config)
            .options(OptionOverrides::default().action(Action::Invalidate))
            .targets(vec!["http://www.example.com/a.html"])
            .build()?;

        assert_eq!(batcher.api_version(), ApiVersion::V2);
        assert_eq!(batcher.batch_limit(), BatchLimit::Count(200));
        assert_eq!(batcher.pending().len(), 1);
        assert_eq!(
            batcher.options(),
            &PurgeOptions {
                action: Action::Invalidate,
                content_type: ContentType::Arl,
                network: Network::Staging,
                notification_email: None,
            }
        );
        Ok(())
    }

    #[test]
    fn test_explicit_credentials_win() -> Result<()> {
        let config = config(&[("AKAMAI_CCU_API_VERSION", "ccuapi")]);
        assert!(matches!(
            PurgeBatcher::from_config(&config),
            Err(Error::Configuration(_))
        ));

        let batcher = PurgeBatcher::builder()
            .config(&config)
            .credentials(Credentials::password("ccuapi_user", "1234567"))
            .build()?;
        assert_eq!(batcher.api_version(), ApiVersion::Ccuapi);
        assert_eq!(batcher.batch_limit(), BatchLimit::Count(100));
        Ok(())
    }

    #[test]
    fn test_max_batch_bytes() -> Result<()> {
        let v3 = [
            ("AKAMAI_CCU_HOST", "akab-host.purge.akamaiapis.net"),
            ("AKAMAI_CCU_CLIENT_TOKEN", "client-token"),
            ("AKAMAI_CCU_CLIENT_SECRET", "client-secret"),
            ("AKAMAI_CCU_ACCESS_TOKEN", "access-token"),
        ];

        let mut vars = v3.to_vec();
        vars.push(("AKAMAI_CCU_MAX_BATCH_BYTES", "10000"));
        let batcher = PurgeBatcher::from_config(&config(&vars))?;
        assert_eq!(batcher.batch_limit(), BatchLimit::Bytes(10_000));

        let mut vars = v3.to_vec();
        vars.push(("AKAMAI_CCU_MAX_BATCH_BYTES", "0"));
        assert!(matches!(
            PurgeBatcher::from_config(&config(&vars)),
            Err(Error::Configuration(_))
        ));
        Ok(())
    }

    #[test]
    fn test_invalid_options_rejected() {
        let config = config(&[
            ("AKAMAI_CCU_API_VERSION", "v2"),
            ("AKAMAI_CCUAPI_USERNAME", "ccu_user"),
            ("AKAMAI_CCUAPI_PASSWORD", "ccu_password"),
        ]);

        let result = PurgeBatcher::builder()
            .config(&config)
            .options(OptionOverrides::default().action(Action::Delete))
            .build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }
}
