//! # Envelope Integration Flows
//!
//! End-to-end sender/receiver scenarios across trust namespaces: a sender
//! constructs and signs an envelope, a receiver verifies it against its own
//! authenticator and replay store.

#[cfg(test)]
mod tests {
    use opipe_envelope::{
        AgentKind, Envelope, InMemoryReplayStore, MessageType, NamespaceAuthenticator,
        SharedSecret, TrustNamespace, VerifyError,
    };
    use serde_json::json;

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    fn opipe_side(secret: &str) -> NamespaceAuthenticator {
        NamespaceAuthenticator::with_secret(
            TrustNamespace::Opipe,
            SharedSecret::new(secret.as_bytes().to_vec()),
        )
    }

    fn command(auth: &NamespaceAuthenticator) -> Envelope {
        auth.construct(
            MessageType::Command,
            "dashboard",
            vec!["agent-a".to_string()],
            json!({"action": "deploy", "target": "staging"}),
            AgentKind::Human,
            300,
        )
    }

    // =========================================================================
    // SENDER -> RECEIVER FLOWS
    // =========================================================================

    /// A signed envelope verified within its TTL with a fresh nonce passes.
    #[test]
    fn test_round_trip_across_sender_and_receiver() {
        let sender = opipe_side("deployment-secret");
        let receiver = opipe_side("deployment-secret");
        let replay = InMemoryReplayStore::new(600.0);

        let signed = sender.sign(command(&sender));
        assert!(receiver.verify(&signed, Some(&replay)).is_ok());
    }

    /// Wire round-trip: serialize the signed envelope to JSON and back, then
    /// verify. Canonicalization must survive transport re-encoding.
    #[test]
    fn test_round_trip_survives_json_transport() {
        let sender = opipe_side("deployment-secret");
        let receiver = opipe_side("deployment-secret");

        let signed = sender.sign(command(&sender));
        let wire = serde_json::to_string(&signed).unwrap();
        let received: Envelope = serde_json::from_str(&wire).unwrap();

        assert!(receiver.verify(&received, None).is_ok());
    }

    /// A second delivery of the same envelope is rejected as a replay, even
    /// though its signature is still valid.
    #[test]
    fn test_duplicate_delivery_rejected() {
        let sender = opipe_side("deployment-secret");
        let receiver = opipe_side("deployment-secret");
        let replay = InMemoryReplayStore::new(600.0);

        let signed = sender.sign(command(&sender));
        assert!(receiver.verify(&signed, Some(&replay)).is_ok());
        assert!(matches!(
            receiver.verify(&signed, Some(&replay)),
            Err(VerifyError::Replayed { .. })
        ));
    }

    /// An envelope with ttl_seconds=1 verified 1.1s after issuance expires,
    /// independent of a tampered signature.
    #[test]
    fn test_expiry_wins_over_signature_state() {
        let sender = opipe_side("deployment-secret");
        let receiver = opipe_side("deployment-secret");

        let mut signed = sender.sign(command(&sender));
        signed.ttl_seconds = 1;
        signed.signature = Some("0".repeat(64));

        let result = receiver.verify_at(&signed, None, signed.issued_at + 1.1);
        assert!(matches!(result, Err(VerifyError::Expired { .. })));
    }

    /// Identical content signed in one namespace never verifies in another.
    #[test]
    fn test_cross_namespace_verification_fails() {
        let opipe = opipe_side("opipe-secret");
        let illuminate = NamespaceAuthenticator::with_secret(
            TrustNamespace::Oilluminate,
            SharedSecret::new(b"oilluminate-secret".to_vec()),
        );

        let signed = opipe.sign(command(&opipe));
        assert_eq!(
            illuminate.verify(&signed, None),
            Err(VerifyError::BadSignature)
        );
    }

    /// Request/response correlation: the response carries the request id and
    /// verifies independently with its own nonce.
    #[test]
    fn test_correlated_response_flow() {
        let dashboard = opipe_side("deployment-secret");
        let agent = opipe_side("deployment-secret");
        let replay = InMemoryReplayStore::new(600.0);

        let request = dashboard.sign(command(&dashboard));
        assert!(agent.verify(&request, Some(&replay)).is_ok());

        let response = agent.sign(
            agent
                .construct(
                    MessageType::Ack,
                    "agent-a",
                    vec!["dashboard".to_string()],
                    json!({"status": "ok"}),
                    AgentKind::NonHuman,
                    300,
                )
                .correlate_to(&request),
        );

        assert_eq!(response.correlation_id.as_deref(), Some(request.id.as_str()));
        assert_ne!(response.nonce, request.nonce);
        assert!(dashboard.verify(&response, Some(&replay)).is_ok());
    }

    /// A man-in-the-middle edit to any covered field invalidates the
    /// signature, including destination rewrites.
    #[test]
    fn test_destination_rewrite_detected() {
        let sender = opipe_side("deployment-secret");
        let receiver = opipe_side("deployment-secret");

        let mut signed = sender.sign(command(&sender));
        signed.destinations = vec!["attacker".to_string()];

        assert_eq!(receiver.verify(&signed, None), Err(VerifyError::BadSignature));
    }

    /// Replay stores are per namespace: the same nonce may appear in two
    /// namespaces without either flagging a replay.
    #[test]
    fn test_replay_windows_are_per_namespace() {
        let opipe = opipe_side("opipe-secret");
        let iimsibis = NamespaceAuthenticator::with_secret(
            TrustNamespace::Iimsibis,
            SharedSecret::new(b"iimsibis-secret".to_vec()),
        );
        let opipe_replay = InMemoryReplayStore::new(600.0);
        let iimsibis_replay = InMemoryReplayStore::new(600.0);

        let a = opipe.sign(command(&opipe));
        let mut b = iimsibis.construct(
            MessageType::Event,
            "scanner",
            vec!["inventory".to_string()],
            json!({"asset": "rack-4"}),
            AgentKind::NonHuman,
            300,
        );
        b.nonce = a.nonce.clone();
        let b = iimsibis.sign(b);

        assert!(opipe.verify(&a, Some(&opipe_replay)).is_ok());
        assert!(iimsibis.verify(&b, Some(&iimsibis_replay)).is_ok());
    }
}
