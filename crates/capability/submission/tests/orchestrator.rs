use async_trait::async_trait;
use dam_remote::RemoteError;
use dam_storage::{
    InMemoryKeyValueStore, KeyValueStore, KvReadingRepository, ReadingRepository, reading_key,
};
use dam_submission::{
    BatchSender, ClearPolicy, SubmissionOrchestrator, SubmissionOutcome, SubmissionState,
};
use domain::{
    Confirmer, FacilityContext, InstrumentTemplate, InstrumentType, Notice, NoticeKind, Notifier,
    PendingReading, ReadingBatch,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    fn last(&self) -> Notice {
        self.notices
            .lock()
            .expect("lock")
            .last()
            .cloned()
            .expect("notice")
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().expect("lock").push(notice);
    }
}

struct ScriptedConfirmer {
    answer: bool,
    calls: AtomicUsize,
    last_message: Mutex<String>,
}

impl ScriptedConfirmer {
    fn new(answer: bool) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
            last_message: Mutex::new(String::new()),
        }
    }
}

impl Confirmer for ScriptedConfirmer {
    fn confirm(&self, _title: &str, message: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_message.lock().expect("lock") = message.to_string();
        self.answer
    }
}

#[derive(Default)]
struct FakeSender {
    calls: AtomicUsize,
    failure: Option<String>,
    last_batch: Mutex<Option<ReadingBatch>>,
}

#[async_trait]
impl BatchSender for FakeSender {
    async fn send(&self, batch: &ReadingBatch) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_batch.lock().expect("lock") = Some(batch.clone());
        match &self.failure {
            Some(message) => Err(RemoteError::Transport(message.clone())),
            None => Ok(()),
        }
    }
}

/// 发送时阻塞，直到测试放行。
struct BlockingSender {
    calls: AtomicUsize,
    started: Notify,
    release: Notify,
}

#[async_trait]
impl BatchSender for BlockingSender {
    async fn send(&self, _batch: &ReadingBatch) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

fn template(name: &str) -> InstrumentTemplate {
    InstrumentTemplate {
        id: format!("tpl-{}", name),
        custom_name: name.to_string(),
        instrument_type: InstrumentType {
            domain_id: "type-pz".to_string(),
            name: "Piezometer".to_string(),
            measurement_units: Vec::new(),
        },
        parameters: Vec::new(),
    }
}

fn reading(name: &str, level: &str) -> PendingReading {
    PendingReading {
        instrument_template_id: format!("tpl-{}", name),
        instrument_type_id: "type-pz".to_string(),
        instrument_type_name: "Piezometer".to_string(),
        custom_name: name.to_string(),
        values: BTreeMap::from([("Level".to_string(), level.to_string())]),
        notes: String::new(),
        date: "2024-05-01".to_string(),
    }
}

struct Fixture {
    store: Arc<InMemoryKeyValueStore>,
    repo: Arc<KvReadingRepository>,
    notifier: Arc<RecordingNotifier>,
    ctx: FacilityContext,
}

impl Fixture {
    async fn with_readings(readings: &[PendingReading]) -> Self {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let repo = Arc::new(KvReadingRepository::new(store.clone()));
        let ctx = FacilityContext::new("North", false);
        repo.save(&ctx, readings).await.expect("seed");
        Self {
            store,
            repo,
            notifier: Arc::new(RecordingNotifier::default()),
            ctx,
        }
    }

    fn orchestrator(
        &self,
        sender: Arc<dyn BatchSender>,
        confirmer: Arc<ScriptedConfirmer>,
    ) -> SubmissionOrchestrator {
        SubmissionOrchestrator::new(self.repo.clone(), sender, self.notifier.clone(), confirmer)
    }
}

#[tokio::test]
async fn incomplete_batch_prompts_and_decline_has_no_side_effects() {
    let fixture = Fixture::with_readings(&[reading("A", "1,5"), reading("C", "2")]).await;
    let sender = Arc::new(FakeSender::default());
    let confirmer = Arc::new(ScriptedConfirmer::new(false));
    let orchestrator = fixture.orchestrator(sender.clone(), confirmer.clone());
    let templates = vec![template("A"), template("B"), template("C")];

    let outcome = orchestrator.submit(&fixture.ctx, &templates).await;

    assert_eq!(outcome, SubmissionOutcome::Cancelled);
    assert_eq!(confirmer.calls.load(Ordering::SeqCst), 1);
    let message = confirmer.last_message.lock().expect("lock").clone();
    assert!(message.contains("\nB\n"));
    assert!(!message.contains("\nA\n"));
    assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fixture.repo.load_all(&fixture.ctx).await.expect("load").len(), 2);
    assert_eq!(orchestrator.state(), SubmissionState::Idle);
}

#[tokio::test]
async fn complete_batch_sends_without_prompt_and_normalizes() {
    let fixture = Fixture::with_readings(&[reading("A", "12,5"), reading("B", "12.5")]).await;
    let sender = Arc::new(FakeSender::default());
    let confirmer = Arc::new(ScriptedConfirmer::new(false));
    let orchestrator = fixture.orchestrator(sender.clone(), confirmer.clone());

    let outcome = orchestrator
        .submit(&fixture.ctx, &[template("A"), template("B")])
        .await;

    assert_eq!(
        outcome,
        SubmissionOutcome::Sent {
            submitted: 2,
            cleared: 1
        }
    );
    assert_eq!(confirmer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(sender.calls.load(Ordering::SeqCst), 1);
    let batch = sender
        .last_batch
        .lock()
        .expect("lock")
        .clone()
        .expect("batch");
    assert!(batch
        .readings
        .iter()
        .all(|reading| reading.values["Level"] == "12.5"));
    assert_eq!(fixture.notifier.last().kind, NoticeKind::Success);
}

#[tokio::test]
async fn accepted_partial_batch_is_sent() {
    let fixture = Fixture::with_readings(&[reading("A", "1")]).await;
    let sender = Arc::new(FakeSender::default());
    let confirmer = Arc::new(ScriptedConfirmer::new(true));
    let orchestrator = fixture.orchestrator(sender.clone(), confirmer.clone());

    let outcome = orchestrator
        .submit(&fixture.ctx, &[template("A"), template("B")])
        .await;

    assert!(matches!(outcome, SubmissionOutcome::Sent { submitted: 1, .. }));
    assert_eq!(confirmer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn network_failure_keeps_local_readings() {
    let fixture = Fixture::with_readings(&[reading("A", "1")]).await;
    let sender = Arc::new(FakeSender {
        failure: Some("connection refused".to_string()),
        ..Default::default()
    });
    let orchestrator = fixture.orchestrator(sender.clone(), Arc::new(ScriptedConfirmer::new(true)));

    let outcome = orchestrator.submit(&fixture.ctx, &[template("A")]).await;

    let message = match outcome {
        SubmissionOutcome::Failed { message } => message,
        other => panic!("expected failure, got {:?}", other),
    };
    assert!(message.contains("connection refused"));
    let notice = fixture.notifier.last();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, message);
    assert_eq!(fixture.repo.load_all(&fixture.ctx).await.expect("load").len(), 1);
    assert_eq!(fixture.store.len(), 1);
    assert_eq!(orchestrator.state(), SubmissionState::Idle);
}

#[tokio::test]
async fn success_clears_every_facility_key() {
    let fixture = Fixture::with_readings(&[reading("A", "1")]).await;
    let suffixed_key = format!("{}:previous", reading_key("North"));
    fixture
        .store
        .set_item(&suffixed_key, "{\"readings\":[]}")
        .await
        .expect("suffixed");
    let south = FacilityContext::new("South", false);
    fixture
        .repo
        .save(&south, &[reading("S", "3")])
        .await
        .expect("south");
    let orchestrator = fixture.orchestrator(
        Arc::new(FakeSender::default()),
        Arc::new(ScriptedConfirmer::new(true)),
    );

    let outcome = orchestrator.submit(&fixture.ctx, &[template("A")]).await;

    assert_eq!(
        outcome,
        SubmissionOutcome::Sent {
            submitted: 1,
            cleared: 2
        }
    );
    assert_eq!(fixture.store.get_item(&suffixed_key).await.expect("get"), None);
    assert_eq!(fixture.repo.load_all(&south).await.expect("south").len(), 1);
}

#[tokio::test]
async fn facility_with_longer_name_is_neither_sent_nor_cleared() {
    let fixture = Fixture::with_readings(&[reading("A", "1")]).await;
    let annex = FacilityContext::new("North Annex", false);
    fixture
        .repo
        .save(&annex, &[reading("B", "2")])
        .await
        .expect("annex");
    let sender = Arc::new(FakeSender::default());
    let orchestrator =
        fixture.orchestrator(sender.clone(), Arc::new(ScriptedConfirmer::new(true)));

    let outcome = orchestrator.submit(&fixture.ctx, &[template("A")]).await;

    assert_eq!(
        outcome,
        SubmissionOutcome::Sent {
            submitted: 1,
            cleared: 1
        }
    );
    let batch = sender.last_batch.lock().expect("lock").clone().expect("batch");
    assert_eq!(batch.template_ids(), vec!["tpl-A"]);
    let remaining = fixture.repo.load_all(&annex).await.expect("annex");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].instrument_template_id, "tpl-B");
}

#[tokio::test]
async fn submitted_only_policy_keeps_other_templates() {
    let fixture = Fixture::with_readings(&[reading("A", "1")]).await;
    let empty = PendingReading {
        values: BTreeMap::new(),
        ..reading("B", "")
    };
    fixture
        .repo
        .upsert(&fixture.ctx, &[empty])
        .await
        .expect("empty reading");
    let orchestrator = fixture
        .orchestrator(
            Arc::new(FakeSender::default()),
            Arc::new(ScriptedConfirmer::new(true)),
        )
        .with_clear_policy(ClearPolicy::SubmittedOnly);

    let outcome = orchestrator.submit(&fixture.ctx, &[template("A")]).await;

    assert!(matches!(outcome, SubmissionOutcome::Sent { submitted: 1, .. }));
    let remaining = fixture.repo.load(&fixture.ctx).await.expect("load");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].instrument_template_id, "tpl-B");
}

#[tokio::test]
async fn only_empty_readings_means_nothing_to_send() {
    let empty = PendingReading {
        values: BTreeMap::from([("Level".to_string(), " ".to_string())]),
        ..reading("A", "")
    };
    let fixture = Fixture::with_readings(&[empty]).await;
    let sender = Arc::new(FakeSender::default());
    let orchestrator = fixture.orchestrator(sender.clone(), Arc::new(ScriptedConfirmer::new(true)));

    let outcome = orchestrator.submit(&fixture.ctx, &[template("A")]).await;

    assert_eq!(outcome, SubmissionOutcome::NothingToSend);
    assert_eq!(sender.calls.load(Ordering::SeqCst), 0);
    let notice = fixture.notifier.last();
    assert_eq!(notice.kind, NoticeKind::Info);
    assert_eq!(notice.message, "No saved readings to send.");
}

#[tokio::test]
async fn retrigger_while_sending_is_ignored() {
    let fixture = Fixture::with_readings(&[reading("A", "1")]).await;
    let sender = Arc::new(BlockingSender {
        calls: AtomicUsize::new(0),
        started: Notify::new(),
        release: Notify::new(),
    });
    let orchestrator = Arc::new(
        fixture.orchestrator(sender.clone(), Arc::new(ScriptedConfirmer::new(true))),
    );

    let running = {
        let orchestrator = orchestrator.clone();
        let ctx = fixture.ctx.clone();
        tokio::spawn(async move { orchestrator.submit(&ctx, &[template("A")]).await })
    };
    sender.started.notified().await;
    assert_eq!(orchestrator.state(), SubmissionState::Sending);

    let second = orchestrator.submit(&fixture.ctx, &[template("A")]).await;
    assert_eq!(second, SubmissionOutcome::AlreadyInProgress);

    sender.release.notify_one();
    let first = running.await.expect("join");
    assert!(matches!(first, SubmissionOutcome::Sent { .. }));
    assert_eq!(sender.calls.load(Ordering::SeqCst), 1);
    assert_eq!(orchestrator.state(), SubmissionState::Idle);
}
