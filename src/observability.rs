//! Prometheus exposition for the `/metrics` variant of the service.
//!
//! Recording goes through the `metrics` facade, so it is a no-op unless
//! [`install_recorder`] ran at startup.

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

pub const REQUESTS_TOTAL: &str = "http_requests_total";
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Periodically folds buffered histogram samples into their summaries.
/// Samples otherwise accumulate until the next scrape, which may never come.
pub fn spawn_upkeep(handle: PrometheusHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            handle.run_upkeep();
        }
    })
}

/// Collapses arbitrary request paths so the label set stays bounded.
pub fn path_label(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/version" => "/version",
        "/metrics" => "/metrics",
        _ => "other",
    }
}

pub fn record_request(path: &str, status: u16, elapsed: Duration) {
    let path = path_label(path);
    counter!(REQUESTS_TOTAL, "path" => path, "status" => status.to_string()).increment(1);
    histogram!(REQUEST_DURATION_SECONDS, "path" => path).record(elapsed.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_paths_share_one_label() {
        assert_eq!(path_label("/health"), "/health");
        assert_eq!(path_label("/version"), "/version");
        assert_eq!(path_label("/"), "other");
        assert_eq!(path_label("/wp-admin/login.php"), "other");
        assert_eq!(path_label("/health/"), "other");
    }

    #[test]
    fn recorded_requests_show_up_in_exposition() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            record_request("/health", 200, Duration::from_millis(2));
            record_request("/anything", 200, Duration::from_millis(1));
        });

        let rendered = handle.render();
        assert!(rendered.contains(REQUESTS_TOTAL));
        assert!(rendered.contains(REQUEST_DURATION_SECONDS));
        assert!(rendered.contains("path=\"/health\""));
        assert!(rendered.contains("path=\"other\""));
        assert!(!rendered.contains("/anything"));
    }

    #[tokio::test(start_paused = true)]
    async fn upkeep_keeps_running_until_aborted() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            for _ in 0..100 {
                record_request("/health", 200, Duration::from_micros(50));
            }
        });

        let task = spawn_upkeep(handle.clone(), UPKEEP_INTERVAL);
        for _ in 0..3 {
            time::advance(UPKEEP_INTERVAL).await;
            tokio::task::yield_now().await;
        }
        assert!(!task.is_finished());

        let rendered = handle.render();
        assert!(rendered.contains("http_requests_total{path=\"/health\",status=\"200\"} 100"));
        assert!(rendered.contains(REQUEST_DURATION_SECONDS));

        task.abort();
        let err = task.await.expect_err("aborted task should not complete");
        assert!(err.is_cancelled());
    }
}
