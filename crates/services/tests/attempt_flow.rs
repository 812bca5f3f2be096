use std::collections::{BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use exam_core::model::{
    Answer, Question, ResultId, ResultRecord, ResultStatus, Test, TestId, TestListing, TestResult,
};
use exam_core::time::fixed_now;
use exam_core::{AttemptPhase, SessionStateError, SubmissionReason, SubmissionTicket, ViolationKind};
use services::{ApiError, AttemptError, AttemptService, AttemptStart, CatalogService, Clock, TestApi};
use storage::repository::{AttemptDraft, DraftRepository, InMemoryDraftRepository};

#[derive(Default)]
struct FakeApi {
    test: Mutex<Option<Result<Test, ApiError>>>,
    start: Mutex<Option<Result<AttemptStart, ApiError>>>,
    submit_outcomes: Mutex<VecDeque<Result<TestResult, ApiError>>>,
    submitted: Mutex<Vec<SubmissionTicket>>,
    results: Mutex<Vec<ResultRecord>>,
}

impl FakeApi {
    fn serving(test: Test) -> Self {
        let api = Self::default();
        *api.test.lock().unwrap() = Some(Ok(test));
        *api.start.lock().unwrap() = Some(Ok(AttemptStart {
            started_at: Some(fixed_now()),
        }));
        api
    }

    fn queue_submit(&self, outcome: Result<TestResult, ApiError>) {
        self.submit_outcomes.lock().unwrap().push_back(outcome);
    }

    fn submitted(&self) -> Vec<SubmissionTicket> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl TestApi for FakeApi {
    async fn fetch_test(&self, _id: &TestId) -> Result<Test, ApiError> {
        self.test.lock().unwrap().clone().unwrap_or(Err(ApiError::NotFound))
    }

    async fn start_attempt(&self, _id: &TestId) -> Result<AttemptStart, ApiError> {
        self.start
            .lock()
            .unwrap()
            .clone()
            .unwrap_or(Ok(AttemptStart::default()))
    }

    async fn submit_attempt(&self, ticket: &SubmissionTicket) -> Result<TestResult, ApiError> {
        self.submitted.lock().unwrap().push(ticket.clone());
        self.submit_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Network("no scripted outcome".into())))
    }

    async fn list_tests(&self) -> Result<Vec<TestListing>, ApiError> {
        Ok(Vec::new())
    }

    async fn list_results(&self) -> Result<Vec<ResultRecord>, ApiError> {
        Ok(self.results.lock().unwrap().clone())
    }
}

fn options() -> Vec<String> {
    vec!["A".into(), "B".into(), "C".into(), "D".into()]
}

fn sample_test(minutes: u32) -> Test {
    Test::new(
        TestId::new("t-sample").unwrap(),
        "Sample",
        "mcq",
        minutes,
        vec![
            Question::new("First", options(), false),
            Question::new("Second", options(), false),
            Question::new("Third", options(), true),
        ],
    )
    .unwrap()
}

fn service(api: Arc<FakeApi>, drafts: Arc<InMemoryDraftRepository>) -> AttemptService {
    AttemptService::new(Clock::fixed(fixed_now() + Duration::seconds(95)), api, drafts)
}

fn id() -> TestId {
    TestId::new("t-sample").unwrap()
}

#[tokio::test]
async fn load_failure_yields_no_session() {
    let api = Arc::new(FakeApi::default());
    let svc = service(api, Arc::new(InMemoryDraftRepository::new()));

    let err = svc.load(&id()).await.unwrap_err();
    assert!(matches!(err, AttemptError::LoadFailed(ApiError::NotFound)));
}

#[tokio::test]
async fn failed_start_call_is_a_load_failure() {
    let api = FakeApi::serving(sample_test(1));
    *api.start.lock().unwrap() = Some(Err(ApiError::Network("offline".into())));
    let svc = service(Arc::new(api), Arc::new(InMemoryDraftRepository::new()));

    let err = svc.load(&id()).await.unwrap_err();
    assert!(matches!(err, AttemptError::LoadFailed(ApiError::Network(_))));
}

#[tokio::test]
async fn load_seeds_session_from_test() {
    let api = Arc::new(FakeApi::serving(sample_test(1)));
    let svc = service(api, Arc::new(InMemoryDraftRepository::new()));

    let loaded = svc.load(&id()).await.unwrap();
    let session = loaded.session;
    assert!(!loaded.restored);
    assert_eq!(session.remaining_secs(), 60);
    assert_eq!(session.answers().len(), 3);
    assert_eq!(session.current(), 0);
    assert_eq!(session.started_at(), fixed_now());
    assert_eq!(AttemptPhase::from(session.phase()), AttemptPhase::InProgress);
}

#[tokio::test]
async fn missing_started_at_falls_back_to_clock() {
    let api = FakeApi::serving(sample_test(1));
    *api.start.lock().unwrap() = Some(Ok(AttemptStart::default()));
    let svc = service(Arc::new(api), Arc::new(InMemoryDraftRepository::new()));

    let session = svc.load(&id()).await.unwrap().session;
    assert_eq!(session.started_at(), fixed_now() + Duration::seconds(95));
}

#[tokio::test]
async fn three_question_attempt_scores_two_of_three() {
    let api = Arc::new(FakeApi::serving(sample_test(1)));
    api.queue_submit(Ok(TestResult::new(Some(67), Some(2), Some(3), None).unwrap()));
    let svc = service(Arc::clone(&api), Arc::new(InMemoryDraftRepository::new()));

    let mut session = svc.load(&id()).await.unwrap().session;
    session.select_single(0, 1).unwrap();
    session.toggle_multiple(2, 2).unwrap();
    session.toggle_multiple(2, 0).unwrap();

    let result = svc
        .submit(&mut session, SubmissionReason::Manual)
        .await
        .unwrap();
    assert_eq!(result.percentage(), 67);
    assert_eq!(result.time_taken_secs(), Some(95));
    assert!(session.is_terminal());

    let sent = api.submitted();
    assert_eq!(sent.len(), 1);
    let body = serde_json::to_value(&sent[0]).unwrap();
    assert_eq!(body["responses"], serde_json::json!([1, null, [0, 2]]));
    assert_eq!(body["submissionReason"], "manual");
}

#[tokio::test]
async fn failed_submit_keeps_answers_and_allows_retry() {
    let api = Arc::new(FakeApi::serving(sample_test(1)));
    api.queue_submit(Err(ApiError::Rejected {
        message: "responses malformed".into(),
    }));
    api.queue_submit(Ok(TestResult::new(Some(100), Some(3), Some(3), Some(40)).unwrap()));
    let svc = service(Arc::clone(&api), Arc::new(InMemoryDraftRepository::new()));

    let mut session = svc.load(&id()).await.unwrap().session;
    session.select_single(1, 3).unwrap();
    for _ in 0..10 {
        svc.tick(&mut session);
    }
    let answers = session.answers().clone();

    let err = svc
        .submit(&mut session, SubmissionReason::Manual)
        .await
        .unwrap_err();
    assert!(matches!(err, AttemptError::SubmitFailed(ApiError::Rejected { .. })));
    assert_eq!(err.user_message(), "responses malformed");
    assert_eq!(session.answers(), &answers);
    assert_eq!(session.remaining_secs(), 50);
    assert_eq!(session.last_error(), Some("responses malformed"));

    // The countdown keeps running between attempts.
    svc.tick(&mut session);
    assert_eq!(session.remaining_secs(), 49);

    let result = svc
        .submit(&mut session, SubmissionReason::Manual)
        .await
        .unwrap();
    assert_eq!(result.time_taken_secs(), Some(40));
    assert_eq!(api.submitted().len(), 2);
}

#[tokio::test]
async fn no_duplicate_submit_while_in_flight() {
    let api = Arc::new(FakeApi::serving(sample_test(1)));
    api.queue_submit(Ok(TestResult::new(Some(0), Some(0), Some(3), None).unwrap()));
    let svc = service(Arc::clone(&api), Arc::new(InMemoryDraftRepository::new()));
    let mut session = svc.load(&id()).await.unwrap().session;

    let ticket = session.begin_submit(SubmissionReason::Manual).unwrap();
    let second = svc.submit(&mut session, SubmissionReason::Manual).await;
    assert!(matches!(
        second,
        Err(AttemptError::Session(SessionStateError::SubmissionInFlight))
    ));

    // Expiry while in flight is absorbed by the outstanding request.
    for _ in 0..120 {
        assert!(!svc.tick(&mut session).auto_submit);
    }

    let outcome = svc.send(&ticket).await;
    svc.finish(&mut session, outcome).unwrap();
    assert!(session.is_terminal());
    assert_eq!(api.submitted().len(), 1);
}

#[tokio::test]
async fn one_minute_timer_auto_submits_exactly_once() {
    let api = Arc::new(FakeApi::serving(sample_test(1)));
    let svc = service(Arc::clone(&api), Arc::new(InMemoryDraftRepository::new()));
    let mut session = svc.load(&id()).await.unwrap().session;

    let mut auto = 0;
    for tick in 1..=90 {
        let report = svc.tick(&mut session);
        if report.auto_submit {
            auto += 1;
            assert_eq!(tick, 60);
            assert_eq!(report.remaining, 0);
            // Network is down: the automatic submit fails and is not repeated.
            let _ = svc.submit(&mut session, SubmissionReason::AutoTime).await;
        }
    }
    assert_eq!(auto, 1);
    assert_eq!(api.submitted().len(), 1);
    assert_eq!(api.submitted()[0].reason, SubmissionReason::AutoTime);
    assert!(!session.is_terminal());
}

#[tokio::test]
async fn third_violation_requests_auto_submit() {
    let api = Arc::new(FakeApi::serving(sample_test(5)));
    let svc = service(api, Arc::new(InMemoryDraftRepository::new()));
    let mut session = svc.load(&id()).await.unwrap().session;

    let first = svc
        .record_violation(&mut session, ViolationKind::FocusLost)
        .unwrap();
    assert!(!first.auto_submit);
    assert!(first.warning.unwrap().contains("1/3"));
    svc.record_violation(&mut session, ViolationKind::FullscreenExit)
        .unwrap();
    let third = svc
        .record_violation(&mut session, ViolationKind::FocusLost)
        .unwrap();
    assert!(third.auto_submit);

    let ticket = session.begin_submit(SubmissionReason::AutoViolation).unwrap();
    assert_eq!(ticket.violation_count, 3);
    assert!(
        svc.record_violation(&mut session, ViolationKind::FocusLost)
            .is_none()
    );
}

#[tokio::test]
async fn matching_draft_is_restored_and_cleared_on_success() {
    let drafts = Arc::new(InMemoryDraftRepository::new());
    drafts
        .save_draft(&AttemptDraft {
            test_id: id(),
            started_at: fixed_now(),
            answers: vec![
                Answer::Single(Some(2)),
                Answer::Single(None),
                Answer::Multi(BTreeSet::from([3])),
            ],
            flagged: BTreeSet::from([1]),
            current: 2,
            saved_at: fixed_now(),
        })
        .await
        .unwrap();

    let api = Arc::new(FakeApi::serving(sample_test(1)));
    api.queue_submit(Ok(TestResult::new(Some(33), Some(1), Some(3), None).unwrap()));
    let svc = service(api, Arc::clone(&drafts));

    let loaded = svc.load(&id()).await.unwrap();
    assert!(loaded.restored);
    let mut session = loaded.session;
    assert_eq!(session.current(), 2);
    assert!(session.is_flagged(1));
    assert_eq!(session.progress().answered, 2);

    svc.submit(&mut session, SubmissionReason::Manual)
        .await
        .unwrap();
    assert!(drafts.load_draft(&id()).await.unwrap().is_none());
    assert!(svc.draft_of(&session).is_none());
}

#[tokio::test]
async fn draft_from_another_attempt_is_discarded() {
    let drafts = Arc::new(InMemoryDraftRepository::new());
    drafts
        .save_draft(&AttemptDraft {
            test_id: id(),
            started_at: fixed_now() - Duration::days(1),
            answers: vec![Answer::Single(Some(0)); 3],
            flagged: BTreeSet::new(),
            current: 0,
            saved_at: fixed_now(),
        })
        .await
        .unwrap();

    let svc = service(Arc::new(FakeApi::serving(sample_test(1))), Arc::clone(&drafts));
    let loaded = svc.load(&id()).await.unwrap();
    assert!(!loaded.restored);
    assert_eq!(loaded.session.progress().answered, 0);
    assert!(drafts.load_draft(&id()).await.unwrap().is_none());
}

#[tokio::test]
async fn save_draft_snapshots_progress() {
    let drafts = Arc::new(InMemoryDraftRepository::new());
    let svc = service(Arc::new(FakeApi::serving(sample_test(1))), Arc::clone(&drafts));
    let mut session = svc.load(&id()).await.unwrap().session;
    session.select_single(0, 3).unwrap();
    session.navigate(1).unwrap();

    svc.save_draft(&session).await;
    let draft = drafts.load_draft(&id()).await.unwrap().unwrap();
    assert_eq!(draft.current, 1);
    assert_eq!(draft.answers[0], Answer::Single(Some(3)));
    assert_eq!(draft.started_at, fixed_now());
}

#[tokio::test]
async fn results_are_sorted_newest_first() {
    let api = FakeApi::default();
    let record = |rid: &str, offset_hours: i64| ResultRecord {
        id: ResultId::new(rid).unwrap(),
        test_id: id(),
        test_name: Some("Sample".into()),
        started_at: fixed_now() + Duration::hours(offset_hours),
        completed_at: None,
        time_taken_secs: None,
        correct_count: 1,
        total: 3,
        score: 33,
        status: ResultStatus::Completed,
    };
    *api.results.lock().unwrap() = vec![record("old", 0), record("new", 5), record("mid", 2)];

    let catalog = CatalogService::new(Arc::new(api));
    let ids: Vec<String> = catalog
        .list_results()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id.to_string())
        .collect();
    assert_eq!(ids, ["new", "mid", "old"]);
}
