use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{AttemptView, ResultsView, TestsView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", TestsView)] Tests {},
        #[route("/results", ResultsView)] Results {},
    #[end_layout]
    #[route("/test/:test_id", AttemptView)] Attempt { test_id: String },
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Exam Desk" }
            ul {
                li { Link { to: Route::Tests {}, "My Tests" } }
                li { Link { to: Route::Results {}, "My Results" } }
            }
        }
    }
}
