use dioxus::prelude::*;
use dioxus_router::Link;

use crate::routes::Route;
use crate::vm::{AttemptIntent, PaletteItemVm, QuestionVm, ResultVm, TimerVm};

#[component]
pub(super) fn AttemptHeader(
    title: String,
    kind: String,
    question_count: usize,
    timer: TimerVm,
    violations: Option<String>,
) -> Element {
    rsx! {
        header { class: "attempt-header",
            div { class: "attempt-header__heading",
                h2 { class: "attempt-header__title", "{title}" }
                if !kind.is_empty() {
                    span { class: "attempt-header__kind", "{kind}" }
                }
                span { class: "attempt-header__count", "{question_count} questions" }
            }
            div { class: "attempt-header__status",
                if let Some(violations) = violations {
                    span { class: "violation-badge", "{violations}" }
                }
                span { class: "{timer.class}", id: "attempt-timer", "{timer.label}" }
            }
        }
    }
}

#[component]
pub(super) fn QuestionPanel(
    question: QuestionVm,
    disabled: bool,
    on_intent: EventHandler<AttemptIntent>,
) -> Element {
    let QuestionVm {
        number,
        total,
        html,
        multiple,
        input_type,
        answered,
        flagged,
        explanation_note,
        options,
        can_previous,
        can_next,
    } = question;
    let flag_label = if flagged { "Unflag" } else { "Flag for review" };

    rsx! {
        section { class: "question",
            div { class: "question__meta",
                span { "Question {number} of {total}" }
                if multiple {
                    span { class: "question__hint", "Select all that apply" }
                }
                if answered {
                    span { class: "question__badge", "Answered" }
                }
            }
            div { class: "question__text", dangerous_inner_html: "{html}" }
            ul { class: "question__options",
                for option in options {
                    li { key: "{option.index}",
                        label {
                            class: if option.checked { "option option--checked" } else { "option" },
                            input {
                                r#type: "{input_type}",
                                name: "attempt-option",
                                checked: option.checked,
                                disabled,
                                onchange: move |_| on_intent.call(AttemptIntent::Choose(option.index)),
                            }
                            span { class: "option__label", "{option.label}." }
                            span { class: "option__text", "{option.text}" }
                        }
                    }
                }
            }
            if let Some(note) = explanation_note {
                p { class: "question__note", "{note}" }
            }
            div { class: "question__nav",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: !can_previous,
                    onclick: move |_| on_intent.call(AttemptIntent::Previous),
                    "Previous"
                }
                button {
                    class: "btn btn-ghost",
                    r#type: "button",
                    disabled,
                    onclick: move |_| on_intent.call(AttemptIntent::ToggleFlag),
                    "{flag_label}"
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: !can_next,
                    onclick: move |_| on_intent.call(AttemptIntent::Next),
                    "Next"
                }
            }
        }
    }
}

#[component]
pub(super) fn QuestionPalette(
    items: Vec<PaletteItemVm>,
    answered: String,
    flagged: String,
    on_intent: EventHandler<AttemptIntent>,
) -> Element {
    rsx! {
        aside { class: "palette",
            p { class: "palette__summary", "{answered}" }
            p { class: "palette__summary", "{flagged}" }
            div { class: "palette__grid",
                for item in items {
                    button {
                        key: "{item.index}",
                        class: "{item.class}",
                        r#type: "button",
                        onclick: move |_| on_intent.call(AttemptIntent::GoTo(item.index)),
                        "{item.number}"
                    }
                }
            }
            button {
                class: "btn btn-ghost palette__jump",
                r#type: "button",
                onclick: move |_| on_intent.call(AttemptIntent::NextUnanswered),
                "Next unanswered"
            }
        }
    }
}

#[component]
pub(super) fn ClearConfirm(on_intent: EventHandler<AttemptIntent>) -> Element {
    rsx! {
        div { class: "confirm", role: "dialog", aria_modal: "true",
            p { "Clear every answer? Flags are kept." }
            button {
                class: "btn btn-danger",
                r#type: "button",
                onclick: move |_| on_intent.call(AttemptIntent::ConfirmClear),
                "Clear answers"
            }
            button {
                class: "btn btn-secondary",
                r#type: "button",
                onclick: move |_| on_intent.call(AttemptIntent::CancelClear),
                "Cancel"
            }
        }
    }
}

#[component]
pub(super) fn ResultPanel(title: String, result: ResultVm) -> Element {
    rsx! {
        section { class: "result {result.tone}",
            h2 { class: "result__title", "Test submitted" }
            p { class: "result__test", "{title}" }
            p { class: "result__score", "{result.percentage}%" }
            p { class: "result__band", "{result.title}" }
            dl { class: "result__details",
                dt { "Correct" }
                dd { "{result.correct}" }
                dt { "Time taken" }
                dd { "{result.time_taken}" }
            }
            div { class: "result__actions",
                Link { class: "btn btn-secondary", to: Route::Tests {}, "Back to tests" }
                Link { class: "btn btn-ghost", to: Route::Results {}, "My results" }
            }
        }
    }
}
