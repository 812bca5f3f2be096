use chrono::Duration;
use exam_core::model::{
    GradedBy, ResultId, ResultRecord, ResultStatus, TestId, TestListing, TestResult,
};
use exam_core::time::fixed_now;
use exam_core::{AttemptPhase, SubmissionReason};
use services::ApiError;
use storage::repository::{AttemptDraft, DraftRepository, Storage};

use super::test_harness::{FakeApi, ViewKind, setup_view_harness, setup_view_harness_with_storage};
use crate::vm::AttemptIntent;

fn listing(id: &str, name: &str, attempts: u32, completed: bool) -> TestListing {
    TestListing {
        id: TestId::new(id).unwrap(),
        name: name.into(),
        kind: "mcq".into(),
        question_count: Some(3),
        duration_minutes: Some(10),
        due_at: None,
        attempts,
        max_attempts: Some(2),
        completed,
        result_available: completed,
        score: completed.then_some(67),
        graded_by: GradedBy::Institution,
    }
}

fn record(id: &str, name: &str, days_ago: i64) -> ResultRecord {
    ResultRecord {
        id: ResultId::new(id).unwrap(),
        test_id: TestId::new("t-arith").unwrap(),
        test_name: Some(name.into()),
        started_at: fixed_now() - Duration::days(days_ago),
        completed_at: Some(fixed_now() - Duration::days(days_ago) + Duration::minutes(4)),
        time_taken_secs: Some(240),
        correct_count: 2,
        total: 3,
        score: 67,
        status: ResultStatus::Completed,
    }
}

#[tokio::test(flavor = "current_thread")]
async fn tests_view_lists_assigned_tests() {
    let api = FakeApi::new();
    *api.listings.lock().unwrap() = Ok(vec![
        listing("t-arith", "Arithmetic Basics", 0, false),
        listing("t-logic", "Logic Drill", 1, true),
    ]);
    let mut harness = setup_view_harness(ViewKind::Tests, api);
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Arithmetic Basics"), "missing test name in {html}");
    assert!(html.contains("Logic Drill"), "missing test name in {html}");
    assert!(html.contains("Start"), "missing start action in {html}");
    assert!(html.contains("View Result"), "missing result action in {html}");
    assert!(html.contains("Score: 67%"), "missing score in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn tests_view_shows_offline_error_with_retry() {
    let api = FakeApi::new();
    *api.listings.lock().unwrap() = Err(ApiError::Network("refused".into()));
    let mut harness = setup_view_harness(ViewKind::Tests, api);
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Could not reach the server"), "missing error in {html}");
    assert!(html.contains("Retry"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_lists_newest_first() {
    let api = FakeApi::new();
    *api.results.lock().unwrap() = Ok(vec![
        record("r-old", "Older Attempt", 5),
        record("r-new", "Newer Attempt", 1),
    ]);
    let mut harness = setup_view_harness(ViewKind::Results, api);
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    let newer = html.find("Newer Attempt").expect("newer row");
    let older = html.find("Older Attempt").expect("older row");
    assert!(newer < older, "rows out of order in {html}");
    assert!(html.contains("2/3"), "missing correct count in {html}");
    assert!(html.contains("4m 0s"), "missing time taken in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn attempt_view_renders_first_question() {
    let mut harness = setup_view_harness(ViewKind::Attempt("t-arith".into()), FakeApi::new());
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Arithmetic Basics"), "missing title in {html}");
    assert!(html.contains("Question 1 of 3"), "missing position in {html}");
    assert!(html.contains("<strong>2 + 2</strong>"), "missing prompt in {html}");
    assert!(html.contains("10:00"), "missing timer in {html}");
    assert!(html.contains("Answered: 0/3"), "missing progress in {html}");
    assert!(html.contains("Submit Test"), "missing submit in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn attempt_view_unknown_test_shows_not_found() {
    let api = FakeApi::new();
    *api.test.lock().unwrap() = Err(ApiError::NotFound);
    let mut harness = setup_view_harness(ViewKind::Attempt("t-missing".into()), api);
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("not available"), "missing not-found text in {html}");
    assert!(html.contains("Back to tests"), "missing back link in {html}");
    assert!(harness.api.submitted.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn attempt_view_submits_and_shows_result() {
    let api = FakeApi::new();
    *api.submit.lock().unwrap() = Ok(TestResult::new(None, Some(2), Some(3), Some(95)).unwrap());
    let mut harness = setup_view_harness(ViewKind::Attempt("t-arith".into()), api);
    harness.rebuild();
    harness.settle().await;

    harness.dispatch(AttemptIntent::Choose(1));
    harness.dispatch(AttemptIntent::Next);
    harness.dispatch(AttemptIntent::Choose(0));
    harness.dispatch(AttemptIntent::Choose(2));
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Question 2 of 3"), "missing position in {html}");
    assert!(html.contains("Answered: 2/3"), "missing progress in {html}");

    harness.dispatch(AttemptIntent::Submit);
    harness.dispatch(AttemptIntent::Submit);
    harness.settle().await;

    let submitted = harness.api.submitted.lock().unwrap().clone();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].reason, SubmissionReason::Manual);
    let body = serde_json::to_value(&submitted[0]).unwrap();
    assert_eq!(body["responses"], serde_json::json!([1, [0, 2], null]));

    assert_eq!(harness.with_vm(|vm| vm.phase()), AttemptPhase::Terminal);
    let html = harness.render();
    assert!(html.contains("Test submitted"), "missing result title in {html}");
    assert!(html.contains("67%"), "missing percentage in {html}");
    assert!(html.contains("Good effort"), "missing band in {html}");
    assert!(html.contains("1m 35s"), "missing time taken in {html}");

    let draft = harness
        .storage
        .drafts
        .load_draft(&TestId::new("t-arith").unwrap())
        .await
        .unwrap();
    assert!(draft.is_none(), "draft should be discarded after submit");
}

#[tokio::test(flavor = "current_thread")]
async fn attempt_view_failed_submit_keeps_answers_and_offers_retry() {
    let mut harness = setup_view_harness(ViewKind::Attempt("t-arith".into()), FakeApi::new());
    harness.rebuild();
    harness.settle().await;

    harness.dispatch(AttemptIntent::Choose(1));
    harness.dispatch(AttemptIntent::Submit);
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("Retry Submit"), "missing retry label in {html}");
    assert!(html.contains("Answered: 1/3"), "answers lost in {html}");
    assert_eq!(harness.with_vm(|vm| vm.phase()), AttemptPhase::InProgress);

    *harness.api.submit.lock().unwrap() =
        Ok(TestResult::new(Some(100), Some(3), Some(3), Some(60)).unwrap());
    harness.dispatch(AttemptIntent::Submit);
    harness.settle().await;

    assert_eq!(harness.api.submitted.lock().unwrap().len(), 2);
    let html = harness.render();
    assert!(html.contains("100%"), "missing percentage in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn attempt_view_restores_saved_draft() {
    let storage = Storage::in_memory();
    let draft = AttemptDraft {
        test_id: TestId::new("t-arith").unwrap(),
        started_at: fixed_now(),
        answers: vec![
            exam_core::model::Answer::Single(Some(1)),
            exam_core::model::Answer::Multi(std::collections::BTreeSet::new()),
            exam_core::model::Answer::Single(None),
        ],
        flagged: [2].into_iter().collect(),
        current: 2,
        saved_at: fixed_now(),
    };
    storage.drafts.save_draft(&draft).await.unwrap();

    let mut harness = setup_view_harness_with_storage(
        ViewKind::Attempt("t-arith".into()),
        FakeApi::new(),
        storage,
    );
    harness.rebuild();
    harness.settle().await;

    let html = harness.render();
    assert!(html.contains("saved answers were restored"), "missing notice in {html}");
    assert!(html.contains("Question 3 of 3"), "position not restored in {html}");
    assert!(html.contains("Answered: 1/3"), "answers not restored in {html}");
    assert!(html.contains("Flagged: 1"), "flags not restored in {html}");
}
