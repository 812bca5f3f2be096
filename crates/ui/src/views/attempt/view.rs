use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::Link;

use exam_core::model::TestId;
use exam_core::{AttemptPhase, SubmissionTicket, ViolationKind};
use services::{AttemptService, CountdownTicker};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{AttemptIntent, AttemptVm, IntentEffect, TickStep};

use super::components::{AttemptHeader, ClearConfirm, QuestionPalette, QuestionPanel, ResultPanel};
use super::scripts::{focus_attempt_root, unwatch_violations, watch_violations};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

/// Send a frozen submission and settle it on the vm once the server answers.
fn spawn_send(attempts: Arc<AttemptService>, vm: Signal<Option<AttemptVm>>, ticket: SubmissionTicket) {
    let mut vm = vm;
    spawn(async move {
        let outcome = attempts.send(&ticket).await;
        let done = vm
            .write()
            .as_mut()
            .is_some_and(|vm| vm.finish(&attempts, outcome));
        if done {
            attempts.discard_draft(&ticket.test_id).await;
        }
    });
}

fn spawn_save_draft(attempts: Arc<AttemptService>, vm: Signal<Option<AttemptVm>>) {
    let draft = vm
        .read()
        .as_ref()
        .and_then(|vm| attempts.draft_of(vm.session()));
    if let Some(draft) = draft {
        spawn(async move {
            attempts.store_draft(draft).await;
        });
    }
}

#[component]
pub fn AttemptView(test_id: String) -> Element {
    let ctx = use_context::<AppContext>();
    let attempts = ctx.attempts();

    let vm = use_signal(|| None::<AttemptVm>);

    let attempts_for_load = Arc::clone(&attempts);
    let resource = use_resource(move || {
        let attempts = Arc::clone(&attempts_for_load);
        let test_id = test_id.clone();
        let mut vm = vm;
        async move {
            let test_id = TestId::new(test_id).map_err(|_| ViewError::NotFound)?;
            let loaded = attempts.load(&test_id).await.map_err(ViewError::from)?;
            vm.set(Some(AttemptVm::new(loaded)));
            Ok::<_, ViewError>(())
        }
    });
    let state = view_state_from_resource(&resource);

    // One tick per second while the attempt runs. The ticker task is aborted
    // when this future is dropped with the component or the load fails.
    let attempts_for_timer = Arc::clone(&attempts);
    let mut timer = use_future(move || {
        let attempts = Arc::clone(&attempts_for_timer);
        let mut vm = vm;
        async move {
            CountdownTicker::start()
                .drive(|| {
                    let load_failed = resource.state().cloned() == UseResourceState::Ready
                        && matches!(resource.value().read().as_ref(), Some(Err(_)));
                    let step = TickStep::for_view(vm.write().as_mut(), load_failed, &attempts);
                    if let Some(ticket) = step.send {
                        spawn_send(Arc::clone(&attempts), vm, ticket);
                    }
                    step.flow
                })
                .await;
        }
    });

    let attempts_for_watch = Arc::clone(&attempts);
    use_future(move || {
        let attempts = Arc::clone(&attempts_for_watch);
        let mut vm = vm;
        async move {
            let mut watcher = watch_violations();
            while let Ok(kind) = watcher.recv::<ViolationKind>().await {
                let ticket = vm
                    .write()
                    .as_mut()
                    .and_then(|current| current.violation(&attempts, kind));
                if let Some(ticket) = ticket {
                    spawn_send(Arc::clone(&attempts), vm, ticket);
                }
            }
        }
    });
    use_drop(unwatch_violations);

    let attempts_for_intent = Arc::clone(&attempts);
    let dispatch_intent = use_callback(move |intent: AttemptIntent| {
        let mut vm = vm;
        let effect = vm
            .write()
            .as_mut()
            .map_or(IntentEffect::None, |current| current.apply(intent));
        match effect {
            IntentEffect::None => {}
            IntentEffect::SaveDraft => spawn_save_draft(Arc::clone(&attempts_for_intent), vm),
            IntentEffect::Send(ticket) => {
                spawn_send(Arc::clone(&attempts_for_intent), vm, ticket);
            }
        }
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<AttemptTestHandles>() {
                handles.register(dispatch_intent, vm);
            }
        }
    }

    use_effect(move || {
        if resource.state().cloned() == UseResourceState::Ready {
            focus_attempt_root();
        }
    });

    let on_key = move |evt: KeyboardEvent| match evt.data.key() {
        Key::ArrowLeft => {
            evt.prevent_default();
            dispatch_intent.call(AttemptIntent::Previous);
        }
        Key::ArrowRight => {
            evt.prevent_default();
            dispatch_intent.call(AttemptIntent::Next);
        }
        _ => {}
    };

    let mut retry = resource;
    let vm_guard = vm.read();

    rsx! {
        div { class: "page attempt-page", id: "attempt-root", tabindex: "0", onkeydown: on_key,
            match (state, vm_guard.as_ref()) {
                (ViewState::Idle | ViewState::Loading, _) => rsx! {
                    p { "Loading test..." }
                },
                (ViewState::Error(err), _) => rsx! {
                    div { class: "attempt-error",
                        p { "{err.message()}" }
                        if err == ViewError::Offline {
                            button {
                                class: "btn btn-secondary",
                                r#type: "button",
                                onclick: move |_| {
                                    retry.restart();
                                    timer.restart();
                                },
                                "Retry"
                            }
                        }
                        Link { class: "btn btn-ghost", to: Route::Tests {}, "Back to tests" }
                    }
                },
                (ViewState::Ready(()), None) => rsx! {
                    p { "Loading test..." }
                },
                (ViewState::Ready(()), Some(current)) => attempt_body(current, dispatch_intent),
            }
        }
    }
}

fn attempt_body(vm: &AttemptVm, on_intent: EventHandler<AttemptIntent>) -> Element {
    if vm.phase() == AttemptPhase::Terminal {
        return match vm.result() {
            Some(result) => rsx! {
                ResultPanel { title: vm.title().to_string(), result }
            },
            None => rsx! {
                p { "Test submitted." }
            },
        };
    }

    let locked = !vm.can_submit();

    rsx! {
        AttemptHeader {
            title: vm.title().to_string(),
            kind: vm.kind().to_string(),
            question_count: vm.question_count(),
            timer: vm.timer(),
            violations: vm.violation_badge(),
        }
        if vm.restored() {
            p { class: "attempt-notice", "Your saved answers were restored." }
        }
        if let Some(warning) = vm.warning() {
            div { class: "attempt-warning", role: "alert",
                span { "{warning}" }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    onclick: move |_| on_intent.call(AttemptIntent::DismissWarning),
                    "Dismiss"
                }
            }
        }
        if let Some(error) = vm.error() {
            p { class: "attempt-error", role: "alert", "{error}" }
        }
        div { class: "attempt-layout",
            QuestionPanel { question: vm.question(), disabled: locked, on_intent }
            QuestionPalette {
                items: vm.palette(),
                answered: vm.progress_label(),
                flagged: vm.flagged_label(),
                on_intent,
            }
        }
        if vm.confirm_clear() {
            ClearConfirm { on_intent }
        }
        footer { class: "attempt-footer",
            button {
                class: "btn btn-ghost",
                r#type: "button",
                disabled: locked,
                onclick: move |_| on_intent.call(AttemptIntent::RequestClear),
                "Clear all"
            }
            button {
                class: "btn btn-primary",
                id: "attempt-submit",
                r#type: "button",
                disabled: locked,
                onclick: move |_| on_intent.call(AttemptIntent::Submit),
                "{vm.submit_label()}"
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct AttemptTestHandles {
    dispatch: Rc<RefCell<Option<Callback<AttemptIntent>>>>,
    vm: Rc<RefCell<Option<Signal<Option<AttemptVm>>>>>,
}

#[cfg(test)]
impl AttemptTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<AttemptIntent>, vm: Signal<Option<AttemptVm>>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
        *self.vm.borrow_mut() = Some(vm);
    }

    pub(crate) fn dispatch(&self) -> Callback<AttemptIntent> {
        (*self.dispatch.borrow()).expect("attempt dispatch registered")
    }

    pub(crate) fn vm(&self) -> Signal<Option<AttemptVm>> {
        (*self.vm.borrow()).expect("attempt vm registered")
    }
}
