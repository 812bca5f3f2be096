mod attempt_vm;
mod catalog_vm;
mod markdown_vm;
mod time_fmt;

pub use attempt_vm::{
    AttemptIntent, AttemptVm, IntentEffect, OptionVm, PaletteItemVm, QuestionVm, ResultVm,
    TickStep, TimerVm,
};
pub use catalog_vm::{ResultRowVm, TestCardVm, map_result_rows, map_test_cards};
pub use markdown_vm::{looks_like_html, markdown_to_html, question_html, sanitize_html};
pub use time_fmt::{format_datetime, format_optional_datetime};
