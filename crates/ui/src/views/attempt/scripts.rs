use dioxus::document::{Eval, eval};

/// Watches the attempt window and reports each departure through `dioxus.send`
/// as a `ViolationKind` string. Repeated blur/visibility events for one
/// departure are folded into a single report.
const VIOLATION_WATCH_SCRIPT: &str = r#"
    const state = window.__examViolationWatch || (window.__examViolationWatch = { away: false });
    if (state.detach) { state.detach(); }
    const report = (kind) => {
        if (!document.getElementById("attempt-root")) { return; }
        if (state.away) { return; }
        state.away = true;
        dioxus.send(kind);
    };
    const back = () => { state.away = false; };
    const onVisibility = () => {
        if (document.hidden) { report("focusLost"); } else { back(); }
    };
    const onBlur = () => report("focusLost");
    const onFullscreen = () => {
        if (state.wasFullscreen && !document.fullscreenElement) { report("fullscreenExit"); }
        state.wasFullscreen = !!document.fullscreenElement;
    };
    document.addEventListener("visibilitychange", onVisibility);
    window.addEventListener("blur", onBlur);
    window.addEventListener("focus", back);
    document.addEventListener("fullscreenchange", onFullscreen);
    state.detach = () => {
        document.removeEventListener("visibilitychange", onVisibility);
        window.removeEventListener("blur", onBlur);
        window.removeEventListener("focus", back);
        document.removeEventListener("fullscreenchange", onFullscreen);
        state.detach = null;
    };
    await new Promise(() => {});
"#;

const VIOLATION_UNWATCH_SCRIPT: &str = r"
    const state = window.__examViolationWatch;
    if (state && state.detach) { state.detach(); }
";

pub(super) fn watch_violations() -> Eval {
    eval(VIOLATION_WATCH_SCRIPT)
}

pub(super) fn unwatch_violations() {
    let _ = eval(VIOLATION_UNWATCH_SCRIPT);
}

pub(super) fn focus_attempt_root() {
    let _ = eval(r#"document.getElementById("attempt-root")?.focus();"#);
}
