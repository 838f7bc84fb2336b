use crate::types::{Endpoint, ProbeOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time;
use tracing::debug;

/// Knobs shared by both probe call sites.
///
/// The scheduled batch tolerates a long per-probe budget; the on-demand query
/// path runs with a tighter one to stay under its request-time ceiling.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Per-probe connect timeout.
    pub timeout: Duration,
    /// Max in-flight connection attempts. Bounded to avoid exhausting
    /// ephemeral ports and file descriptors on large datasets.
    pub concurrency: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(10_000),
            concurrency: 500,
        }
    }
}

/// Probe one endpoint with a single TCP connection attempt.
///
/// Never fails: every path resolves to a `ProbeOutcome`. Exactly one of three
/// terminal events fires — connect, timeout, or an immediate connect error
/// (refused, unreachable, resolution failure) — and the socket is released
/// before the outcome is returned on all of them.
pub async fn probe_endpoint(endpoint: &Endpoint, timeout: Duration) -> ProbeOutcome {
    // The selector already drops these, but endpoints can also arrive from
    // callers that build them directly; classify rather than panic.
    if endpoint.hostname.trim().is_empty() {
        return ProbeOutcome::down(endpoint, "Invalid or missing hostname");
    }
    if endpoint.port == 0 {
        return ProbeOutcome::down(endpoint, "Invalid or missing port");
    }

    let addr = (endpoint.hostname.as_str(), endpoint.port);
    match time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(stream)) => {
            // Reachability only; never exchange data.
            drop(stream);
            ProbeOutcome::up(endpoint)
        }
        Ok(Err(err)) => ProbeOutcome::down(endpoint, err.to_string()),
        Err(_) => ProbeOutcome::down(endpoint, "Connection timed out"),
    }
}

/// Probe every endpoint concurrently and collect all outcomes.
///
/// - Fan-out is bounded by a `Semaphore` sized from `config.concurrency`.
/// - One attempt per endpoint, no retries, no batch-wide cancellation; a slow
///   endpoint delays only its own outcome.
/// - The result is re-assembled into input order: outcome `i` corresponds to
///   `endpoints[i]`, and the count always equals the input count.
pub async fn probe_endpoints(endpoints: &[Endpoint], config: &ProbeConfig) -> Vec<ProbeOutcome> {
    let sem = Arc::new(Semaphore::new(config.concurrency.clamp(1, 5_000)));
    let mut set = JoinSet::new();

    for (idx, endpoint) in endpoints.iter().cloned().enumerate() {
        let permit = sem
            .clone()
            .acquire_owned()
            .await
            .expect("semaphore in scope");
        let timeout = config.timeout;

        set.spawn(async move {
            let _permit = permit; // keep permit until the probe completes
            let outcome = probe_endpoint(&endpoint, timeout).await;
            debug!(
                hostname = %outcome.hostname,
                port = outcome.port,
                connectable = outcome.is_connectable,
                "probed endpoint"
            );
            (idx, outcome)
        });
    }

    let mut slots: Vec<Option<ProbeOutcome>> = vec![None; endpoints.len()];
    while let Some(res) = set.join_next().await {
        if let Ok((idx, outcome)) = res {
            slots[idx] = Some(outcome);
        }
    }

    // A joined task can only be missing if it panicked; keep the one-outcome-
    // per-endpoint invariant by synthesizing an error record for its slot.
    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            slot.unwrap_or_else(|| ProbeOutcome::down(&endpoints[idx], "Probe task failed"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn endpoint(name: &str, hostname: &str, port: u16) -> Endpoint {
        Endpoint {
            name: name.into(),
            hostname: hostname.into(),
            port,
        }
    }

    #[tokio::test]
    async fn empty_hostname_classifies_without_connecting() {
        let o = probe_endpoint(&endpoint("A", "", 23), Duration::from_millis(100)).await;
        assert!(!o.is_connectable);
        assert_eq!(o.error.as_deref(), Some("Invalid or missing hostname"));
    }

    #[tokio::test]
    async fn zero_port_classifies_without_connecting() {
        let o = probe_endpoint(&endpoint("A", "localhost", 0), Duration::from_millis(100)).await;
        assert!(!o.is_connectable);
        assert_eq!(o.error.as_deref(), Some("Invalid or missing port"));
    }

    #[tokio::test]
    async fn listening_port_is_connectable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let o = probe_endpoint(&endpoint("A", "127.0.0.1", port), Duration::from_secs(2)).await;
        assert!(o.is_connectable);
        assert_eq!(o.error, None);
    }

    #[tokio::test]
    async fn closed_port_yields_error_outcome_not_panic() {
        // Bind then drop to find a port with no listener.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let o = probe_endpoint(&endpoint("A", "127.0.0.1", port), Duration::from_millis(500)).await;
        assert!(!o.is_connectable);
        assert!(o.error.is_some());
    }

    #[tokio::test]
    async fn outcomes_match_input_order_and_count() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let open_port = listener.local_addr().unwrap().port();
        let gone = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let closed_port = gone.local_addr().unwrap().port();
        drop(gone);

        let endpoints = vec![
            endpoint("Closed", "127.0.0.1", closed_port),
            endpoint("Open", "127.0.0.1", open_port),
            endpoint("Bad", "", 23),
        ];
        let config = ProbeConfig {
            timeout: Duration::from_millis(800),
            concurrency: 2,
        };
        let outcomes = probe_endpoints(&endpoints, &config).await;

        assert_eq!(outcomes.len(), endpoints.len());
        assert_eq!(outcomes[0].name, "Closed");
        assert!(!outcomes[0].is_connectable);
        assert_eq!(outcomes[1].name, "Open");
        assert!(outcomes[1].is_connectable);
        assert_eq!(outcomes[2].name, "Bad");
        assert!(!outcomes[2].is_connectable);
    }

    #[tokio::test]
    async fn empty_endpoint_set_yields_empty_batch() {
        let outcomes = probe_endpoints(&[], &ProbeConfig::default()).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn repeated_probes_of_live_endpoint_stay_connectable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let ep = endpoint("A", "127.0.0.1", port);
        for _ in 0..3 {
            let o = probe_endpoint(&ep, Duration::from_secs(2)).await;
            assert!(o.is_connectable);
        }
    }
}
