use crate::ipc::error::ok;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    let s = &state.snapshot;
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "counts": {
                "students": s.students.len(),
                "exams": s.exams.len(),
                "results": s.exam_results.len(),
                "assignments": s.assignments.len(),
                "submissions": s.submissions.len(),
            }
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        _ => None,
    }
}
