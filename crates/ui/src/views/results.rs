use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ResultRowVm, map_result_rows};

#[component]
pub fn ResultsView() -> Element {
    let ctx = use_context::<AppContext>();
    let catalog = ctx.catalog();

    let mut resource = use_resource(move || {
        let catalog = catalog.clone();
        async move {
            let items = catalog
                .list_results()
                .await
                .map_err(|err| ViewError::from(&err))?;
            Ok(map_result_rows(&items))
        }
    });

    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "My Results" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(rows) => rsx! {
                    if rows.is_empty() {
                        p { "No attempts yet." }
                    } else {
                        table { class: "results-table",
                            thead {
                                tr {
                                    th { "Test" }
                                    th { "Started" }
                                    th { "Completed" }
                                    th { "Time" }
                                    th { "Correct" }
                                    th { "Score" }
                                    th { "Status" }
                                }
                            }
                            tbody {
                                for row in rows {
                                    ResultRow { row }
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| resource.restart(),
                        "Retry"
                    }
                },
            }
        }
    }
}

#[component]
fn ResultRow(row: ResultRowVm) -> Element {
    rsx! {
        tr {
            td { "{row.test_name}" }
            td { "{row.started_at}" }
            td { "{row.completed_at}" }
            td { "{row.time_taken}" }
            td { "{row.correct}" }
            td { "{row.score}" }
            td { span { class: "{row.status_class}", "{row.status_label}" } }
        }
    }
}
