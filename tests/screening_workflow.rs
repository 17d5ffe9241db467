//! Integration scenarios for the bulk screening workflow, driven through the
//! public service facade: bounded concurrency, failure isolation, incremental
//! streaming, cancellation, and deterministic ranking.

mod common {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use talent_ai::workflows::screening::{
        CandidateDocument, DocumentId, RoleDescription, RoleId, ScoredItem, ScoringAdapter,
        ScoringError, ScreeningConfig, ScreeningService,
    };

    /// Scripted stand-in for the hosted inference endpoint.
    pub(super) struct ScriptedAdapter {
        pub(super) base_score: i64,
        pub(super) score_overrides: HashMap<String, i64>,
        pub(super) omit_ids: HashSet<String>,
        pub(super) fail_ids: HashSet<String>,
        pub(super) delay: Option<Duration>,
        pub(super) calls: AtomicUsize,
        pub(super) current: AtomicUsize,
        pub(super) peak: AtomicUsize,
    }

    impl Default for ScriptedAdapter {
        fn default() -> Self {
            Self {
                base_score: 50,
                score_overrides: HashMap::new(),
                omit_ids: HashSet::new(),
                fail_ids: HashSet::new(),
                delay: None,
                calls: AtomicUsize::new(0),
                current: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    impl ScriptedAdapter {
        pub(super) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(super) fn peak_in_flight(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        fn respond(
            &self,
            documents: &[CandidateDocument],
        ) -> Result<Vec<ScoredItem>, ScoringError> {
            if documents.iter().any(|doc| self.fail_ids.contains(&doc.id.0)) {
                return Err(ScoringError::Transport(
                    "simulated network error: connection reset by peer".to_string(),
                ));
            }

            Ok(documents
                .iter()
                .filter(|doc| !self.omit_ids.contains(&doc.id.0))
                .map(|doc| {
                    let score = self
                        .score_overrides
                        .get(&doc.id.0)
                        .copied()
                        .unwrap_or(self.base_score);
                    ScoredItem {
                        document_id: doc.id.clone(),
                        candidate_name: format!("Candidate {}", doc.display_stem()),
                        email: format!("{}@example.com", doc.display_stem()),
                        match_score: score,
                        compatibility_score: (score - 5).max(0),
                        key_skills: "Rust, Distributed Systems".to_string(),
                        feedback: "screened by scripted adapter".to_string(),
                    }
                })
                .collect())
        }
    }

    #[async_trait]
    impl ScoringAdapter for ScriptedAdapter {
        async fn score_batch(
            &self,
            _role: &RoleDescription,
            documents: &[CandidateDocument],
        ) -> Result<Vec<ScoredItem>, ScoringError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let in_flight = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(in_flight, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            let result = self.respond(documents);
            self.current.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    pub(super) fn role() -> RoleDescription {
        RoleDescription {
            id: RoleId("platform-engineer".to_string()),
            display_name: "Platform Engineer".to_string(),
            content: "Build and operate the screening platform; Rust, Tokio, Postgres."
                .to_string(),
            source_document: "platform-engineer.md".to_string(),
        }
    }

    pub(super) fn documents(count: usize) -> Vec<CandidateDocument> {
        (0..count)
            .map(|index| CandidateDocument {
                id: DocumentId(format!("cand-{index:03}")),
                display_name: format!("candidate-{index:03}.pdf"),
                content: format!("resume body {index}"),
            })
            .collect()
    }

    pub(super) fn screening_config(batch_size: usize, max_in_flight: usize) -> ScreeningConfig {
        ScreeningConfig {
            batch_size,
            max_in_flight,
            max_attempts: 1,
        }
    }

    pub(super) fn build_service(
        adapter: ScriptedAdapter,
        config: ScreeningConfig,
    ) -> (Arc<ScriptedAdapter>, ScreeningService<ScriptedAdapter>) {
        let adapter = Arc::new(adapter);
        let service = ScreeningService::new(adapter.clone(), config);
        (adapter, service)
    }
}

mod orchestration {
    use super::common::*;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn twenty_three_documents_run_as_three_bounded_batches() {
        let adapter = ScriptedAdapter {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let (adapter, service) = build_service(adapter, screening_config(10, 5));

        let session = service
            .run_to_completion(role(), documents(23))
            .await
            .expect("session completes");

        assert_eq!(session.record_count(), 23);
        assert_eq!(adapter.call_count(), 3);
        assert!(
            adapter.peak_in_flight() <= 3,
            "three batches can never need more than three slots"
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_unrelated_sessions_each_deliver_complete_results() {
        let adapter = ScriptedAdapter {
            delay: Some(Duration::from_millis(20)),
            ..Default::default()
        };
        let (adapter, service) = build_service(adapter, screening_config(10, 5));

        let (first, second) = tokio::join!(
            service.run_to_completion(role(), documents(23)),
            service.run_to_completion(role(), documents(8)),
        );

        let first = first.expect("first session completes");
        let second = second.expect("second session completes");
        assert_eq!(first.record_count(), 23, "no record of either caller may be dropped");
        assert_eq!(second.record_count(), 8);
        assert_eq!(adapter.call_count(), 4);
    }

    #[tokio::test]
    async fn scores_always_stay_within_bounds() {
        let mut adapter = ScriptedAdapter::default();
        adapter.score_overrides.insert("cand-000".to_string(), 500);
        adapter.score_overrides.insert("cand-001".to_string(), -20);
        let (_adapter, service) = build_service(adapter, screening_config(10, 5));

        let session = service
            .run_to_completion(role(), documents(4))
            .await
            .expect("session completes");

        for record in &session.records {
            assert!(record.match_score <= 100);
            assert!(record.compatibility_score <= 100);
        }
        let top = &session.records[0];
        assert_eq!(top.match_score, 100, "oversized score clamps to 100");
    }
}

mod failure_isolation {
    use super::common::*;
    use talent_ai::workflows::screening::ScoreDisposition;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn network_error_degrades_one_batch_and_spares_the_rest() {
        let mut adapter = ScriptedAdapter::default();
        adapter.fail_ids.insert("cand-012".to_string());
        let (adapter, service) = build_service(adapter, screening_config(10, 5));

        let session = service
            .run_to_completion(role(), documents(23))
            .await
            .expect("session completes");

        assert_eq!(session.record_count(), 23);
        assert_eq!(adapter.call_count(), 3);

        let failed: Vec<_> = session
            .records
            .iter()
            .filter(|record| record.disposition == ScoreDisposition::Failed)
            .collect();
        assert_eq!(failed.len(), 10);
        for record in &failed {
            assert_eq!(record.match_score, 0);
            assert!(record.feedback.contains("connection reset"));
        }
    }

    #[tokio::test]
    async fn partial_adapter_response_synthesizes_the_missing_records() {
        let mut adapter = ScriptedAdapter::default();
        adapter.omit_ids.insert("cand-003".to_string());
        adapter.omit_ids.insert("cand-007".to_string());
        let (_adapter, service) = build_service(adapter, screening_config(10, 5));

        let session = service
            .run_to_completion(role(), documents(10))
            .await
            .expect("session completes");

        assert_eq!(session.record_count(), 10);
        let failed: Vec<&str> = session
            .records
            .iter()
            .filter(|record| record.disposition == ScoreDisposition::Failed)
            .map(|record| record.document_id.0.as_str())
            .collect();
        assert_eq!(failed.len(), 2);
        assert!(failed.contains(&"cand-003"));
        assert!(failed.contains(&"cand-007"));
    }
}

mod cancellation {
    use super::common::*;
    use std::time::Duration;
    use talent_ai::workflows::screening::SessionGate;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn a_new_session_silently_supersedes_the_previous_one() {
        let adapter = ScriptedAdapter {
            delay: Some(Duration::from_millis(40)),
            ..Default::default()
        };
        let (_adapter, service) = build_service(adapter, screening_config(5, 5));
        let gate = SessionGate::new();

        let first = service.start(&gate, role(), documents(10)).expect("first run");
        let second = service.start(&gate, role(), documents(10)).expect("second run");

        let stale = first.finalize(&gate).await;
        assert_eq!(stale.record_count(), 0);

        let active = second.finalize(&gate).await;
        assert_eq!(active.record_count(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn sessions_on_different_gates_are_unrelated() {
        let adapter = ScriptedAdapter {
            delay: Some(Duration::from_millis(25)),
            ..Default::default()
        };
        let (_adapter, service) = build_service(adapter, screening_config(5, 5));
        let first_gate = SessionGate::new();
        let second_gate = SessionGate::new();

        let first = service
            .start(&first_gate, role(), documents(10))
            .expect("first run");
        let second = service
            .start(&second_gate, role(), documents(10))
            .expect("second run");

        let first = first.finalize(&first_gate).await;
        let second = second.finalize(&second_gate).await;
        assert_eq!(first.record_count(), 10);
        assert_eq!(second.record_count(), 10);
    }
}

mod ranking {
    use super::common::*;

    #[tokio::test]
    async fn repeated_runs_over_the_same_input_rank_identically() {
        let mut first_adapter = ScriptedAdapter::default();
        first_adapter.score_overrides.insert("cand-002".to_string(), 90);
        first_adapter.score_overrides.insert("cand-005".to_string(), 90);
        let (_adapter, first_service) = build_service(first_adapter, screening_config(3, 2));

        let mut second_adapter = ScriptedAdapter::default();
        second_adapter.score_overrides.insert("cand-002".to_string(), 90);
        second_adapter.score_overrides.insert("cand-005".to_string(), 90);
        let (_adapter, second_service) = build_service(second_adapter, screening_config(3, 2));

        let first = first_service
            .run_to_completion(role(), documents(9))
            .await
            .expect("first session");
        let second = second_service
            .run_to_completion(role(), documents(9))
            .await
            .expect("second session");

        assert_eq!(first.records, second.records);
        assert_eq!(first.records[0].document_id.0, "cand-002");
        assert_eq!(first.records[1].document_id.0, "cand-005");
    }
}
