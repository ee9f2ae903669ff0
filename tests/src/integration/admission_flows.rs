//! # Admission Integration Flows
//!
//! End-to-end gateway scenarios: identity resolution from request headers,
//! declarative configuration, and the decision path under load.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    use http::{HeaderMap, HeaderValue};
    use opipe_admission::{
        resolve_client, AdmissionConfig, AdmissionController, Decision, LimitProfile, RouteTable,
    };

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Controller over an adjustable millisecond clock.
    fn controller_with_clock(table: RouteTable) -> (AdmissionController, Arc<AtomicU64>) {
        let clock = Arc::new(AtomicU64::new(0));
        let reader = Arc::clone(&clock);
        let controller = AdmissionController::with_time_provider(table, move || {
            reader.load(Ordering::SeqCst) as f64 / 1_000.0
        });
        (controller, clock)
    }

    fn proxied_headers(client: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_str(&format!("{client}, 10.0.0.1")).unwrap(),
        );
        headers
    }

    // =========================================================================
    // GATEWAY REQUEST FLOWS
    // =========================================================================

    /// Full path: config -> controller -> header identity -> decision.
    #[test]
    fn test_configured_gateway_flow() {
        let config: AdmissionConfig = serde_json::from_str(
            r#"{
                "routes": [
                    {"prefix": "/api/agents", "capacity": 2.0, "refill_rate": 1.0}
                ]
            }"#,
        )
        .unwrap();
        let controller = config.build().unwrap();

        let peer: SocketAddr = "10.0.0.1:50000".parse().unwrap();
        let client = resolve_client(&proxied_headers("203.0.113.7"), Some(peer));
        assert_eq!(client, "203.0.113.7");

        assert!(controller.try_consume(&client, "/api/agents/hb").is_allowed());
        assert!(controller.try_consume(&client, "/api/agents/hb").is_allowed());
        assert!(!controller.try_consume(&client, "/api/agents/hb").is_allowed());
    }

    /// The documented burst scenario: capacity 30, refill 0.5/s, 31 requests
    /// within one second; the 31st is denied with retry_after ≈ 2s.
    #[test]
    fn test_burst_scenario_thirty_then_denied() {
        let mut table = RouteTable::new();
        table.insert("/api/agents", LimitProfile { capacity: 30.0, refill_rate: 0.5 });
        let (controller, clock) = controller_with_clock(table);

        let mut allowed = 0;
        let mut denied_hint = None;
        for _ in 0..31u64 {
            match controller.try_consume("203.0.113.7", "/api/agents/hb") {
                Decision::Allowed => allowed += 1,
                Decision::Denied { retry_after } => denied_hint = Some(retry_after),
            }
        }

        assert_eq!(allowed, 30);
        let retry_after = denied_hint.expect("31st request must be denied");
        assert!((retry_after - 2.0).abs() < 1e-9, "retry_after = {retry_after}");
        let _ = clock;
    }

    /// Unidentifiable clients share the single "unknown" bucket.
    #[test]
    fn test_unidentifiable_clients_share_one_limit() {
        let mut table = RouteTable::new();
        table.insert("/api", LimitProfile { capacity: 3.0, refill_rate: 0.1 });
        let (controller, _clock) = controller_with_clock(table);

        // Three different anonymous requests drain the shared bucket.
        for _ in 0..3 {
            let client = resolve_client(&HeaderMap::new(), None);
            assert!(controller.try_consume(&client, "/api/x").is_allowed());
        }

        let client = resolve_client(&HeaderMap::new(), None);
        assert!(!controller.try_consume(&client, "/api/x").is_allowed());
        assert_eq!(controller.bucket_count(), 1);
    }

    /// A client throttled on one route prefix keeps its budget on another.
    #[test]
    fn test_per_route_budgets_are_independent() {
        let mut table = RouteTable::new();
        table.insert("/api/agents", LimitProfile { capacity: 1.0, refill_rate: 0.1 });
        table.insert("/api/reports", LimitProfile { capacity: 1.0, refill_rate: 0.1 });
        let (controller, _clock) = controller_with_clock(table);

        assert!(controller.try_consume("c", "/api/agents/hb").is_allowed());
        assert!(!controller.try_consume("c", "/api/agents/hb").is_allowed());
        assert!(controller.try_consume("c", "/api/reports/daily").is_allowed());
    }

    /// Sweeping idle buckets does not disturb active ones, and a swept
    /// client starts over with a full bucket.
    #[test]
    fn test_sweep_then_fresh_bucket() {
        let mut table = RouteTable::new();
        table.insert("/api", LimitProfile { capacity: 2.0, refill_rate: 0.001 });
        let (controller, clock) = controller_with_clock(table);

        controller.try_consume("idle-client", "/api/x");
        controller.try_consume("idle-client", "/api/x");
        assert!(!controller.try_consume("idle-client", "/api/x").is_allowed());

        clock.store(7_200_000, Ordering::SeqCst); // two hours later
        assert_eq!(controller.sweep(3_600.0), 1);

        // Recreated on next access, full again.
        assert!(controller.try_consume("idle-client", "/api/x").is_allowed());
    }

    /// Heavier operations can consume more than one token per request.
    #[test]
    fn test_weighted_cost_requests() {
        let mut table = RouteTable::new();
        table.insert("/api/export", LimitProfile { capacity: 10.0, refill_rate: 1.0 });
        let (controller, _clock) = controller_with_clock(table);

        assert!(controller.try_consume_cost("c", "/api/export", 8.0).is_allowed());
        match controller.try_consume_cost("c", "/api/export", 8.0) {
            Decision::Denied { retry_after } => assert!((retry_after - 6.0).abs() < 1e-9),
            Decision::Allowed => panic!("second heavy request must be denied"),
        }
    }
}
