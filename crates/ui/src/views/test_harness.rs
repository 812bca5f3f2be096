use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use exam_core::SubmissionTicket;
use exam_core::model::{Question, ResultRecord, Test, TestId, TestListing, TestResult};
use exam_core::time::fixed_now;
use services::{
    ApiError, AppServices, AttemptService, AttemptStart, CatalogService, Clock, TestApi,
};
use storage::repository::Storage;

use crate::context::{UiApp, build_app_context};
use crate::views::attempt::AttemptTestHandles;
use crate::views::{AttemptView, ResultsView, TestsView};
use crate::vm::{AttemptIntent, AttemptVm};

/// Scripted server used by the view tests.
pub struct FakeApi {
    pub test: Mutex<Result<Test, ApiError>>,
    pub listings: Mutex<Result<Vec<TestListing>, ApiError>>,
    pub results: Mutex<Result<Vec<ResultRecord>, ApiError>>,
    pub submit: Mutex<Result<TestResult, ApiError>>,
    pub submitted: Mutex<Vec<SubmissionTicket>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            test: Mutex::new(Ok(sample_test())),
            listings: Mutex::new(Ok(Vec::new())),
            results: Mutex::new(Ok(Vec::new())),
            submit: Mutex::new(Err(ApiError::Network("not scripted".into()))),
            submitted: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TestApi for FakeApi {
    async fn fetch_test(&self, _id: &TestId) -> Result<Test, ApiError> {
        self.test.lock().unwrap().clone()
    }

    async fn start_attempt(&self, _id: &TestId) -> Result<AttemptStart, ApiError> {
        Ok(AttemptStart {
            started_at: Some(fixed_now()),
        })
    }

    async fn submit_attempt(&self, ticket: &SubmissionTicket) -> Result<TestResult, ApiError> {
        self.submitted.lock().unwrap().push(ticket.clone());
        self.submit.lock().unwrap().clone()
    }

    async fn list_tests(&self) -> Result<Vec<TestListing>, ApiError> {
        self.listings.lock().unwrap().clone()
    }

    async fn list_results(&self) -> Result<Vec<ResultRecord>, ApiError> {
        self.results.lock().unwrap().clone()
    }
}

pub fn sample_test() -> Test {
    let opts = |items: &[&str]| items.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
    Test::new(
        TestId::new("t-arith").unwrap(),
        "Arithmetic Basics",
        "mcq",
        10,
        vec![
            Question::new("What is **2 + 2**?", opts(&["3", "4", "5"]), false),
            Question::new("Pick the even numbers", opts(&["2", "3", "6"]), true),
            Question::new("What is 10 / 2?", opts(&["2", "5", "20"]), false),
        ],
    )
    .unwrap()
}

#[derive(Clone)]
struct TestApp {
    services: AppServices,
}

impl UiApp for TestApp {
    fn attempts(&self) -> Arc<AttemptService> {
        self.services.attempts()
    }

    fn catalog(&self) -> Arc<CatalogService> {
        self.services.catalog()
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum ViewKind {
    Tests,
    Results,
    Attempt(String),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    attempt_handles: Option<AttemptTestHandles>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view.clone());
    if let Some(handles) = props.attempt_handles.clone() {
        use_context_provider(|| handles);
    }
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Tests => rsx! { TestsView {} },
        ViewKind::Results => rsx! { ResultsView {} },
        ViewKind::Attempt(test_id) => rsx! { AttemptView { test_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub api: Arc<FakeApi>,
    pub storage: Storage,
    pub attempt_handles: Option<AttemptTestHandles>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Let spawned tasks and resources finish.
    pub async fn settle(&mut self) {
        for _ in 0..4 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }

    pub fn handles(&self) -> &AttemptTestHandles {
        self.attempt_handles.as_ref().expect("attempt handles")
    }

    pub fn dispatch(&mut self, intent: AttemptIntent) {
        let dispatch = self.handles().dispatch();
        self.dom.in_runtime(|| dispatch.call(intent));
        drive_dom(&mut self.dom);
    }

    /// Read the live attempt state.
    pub fn with_vm<R>(&self, read: impl FnOnce(&AttemptVm) -> R) -> R {
        let vm = self.handles().vm();
        self.dom
            .in_runtime(|| read(vm.read().as_ref().expect("attempt loaded")))
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_view_harness(view: ViewKind, api: FakeApi) -> ViewHarness {
    setup_view_harness_with_storage(view, api, Storage::in_memory())
}

pub fn setup_view_harness_with_storage(view: ViewKind, api: FakeApi, storage: Storage) -> ViewHarness {
    let clock = Clock::fixed(fixed_now());
    let api = Arc::new(api);
    let services = AppServices::from_parts(clock, Arc::clone(&api) as Arc<dyn TestApi>, storage.clone());
    let attempt_handles = match view {
        ViewKind::Attempt(_) => Some(AttemptTestHandles::default()),
        _ => None,
    };

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app: Arc::new(TestApp { services }),
            view,
            attempt_handles: attempt_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        api,
        storage,
        attempt_handles,
    }
}
