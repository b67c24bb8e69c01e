mod test_support;

use serde_json::json;
use test_support::{request, send_line, spawn_sidecar};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let mut sc = spawn_sidecar();

    let methods: Vec<(&str, serde_json::Value)> = vec![
        ("health", json!({})),
        ("students.list", json!({})),
        ("exams.list", json!({})),
        ("results.list", json!({ "examId": "1" })),
        ("assignments.list", json!({})),
        ("submissions.list", json!({})),
        ("analytics.grade", json!({ "percentage": 72.5 })),
        ("analytics.percentage", json!({ "obtainedMarks": 46, "totalMarks": 50 })),
        ("analytics.subjectPerformance", json!({})),
        ("analytics.gradeDistribution", json!({})),
        ("analytics.topPerformers", json!({})),
        ("analytics.submissionStatus", json!({})),
        ("analytics.examBreakdown", json!({ "examId": "1" })),
        ("analytics.overview", json!({})),
        ("dashboard.summary", json!({})),
    ];

    for (i, (method, params)) in methods.into_iter().enumerate() {
        let id = format!("{}", i + 1);
        let value = request(&mut sc, &id, method, params);
        assert_eq!(
            value.get("ok").and_then(|v| v.as_bool()),
            Some(true),
            "{} failed: {}",
            method,
            value
        );
    }
}

#[test]
fn unknown_method_and_bad_json_get_error_envelopes() {
    let mut sc = spawn_sidecar();

    let unknown = request(&mut sc, "u1", "grades.teleport", json!({}));
    assert_eq!(unknown.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        unknown.pointer("/error/code").and_then(|v| v.as_str()),
        Some("not_implemented")
    );

    let bad = send_line(&mut sc, "{not json");
    assert_eq!(bad.get("ok").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        bad.pointer("/error/code").and_then(|v| v.as_str()),
        Some("bad_json")
    );

    // the loop keeps serving after a bad line
    let health = request(&mut sc, "h1", "health", json!({}));
    assert_eq!(health.get("ok").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(
        health.pointer("/result/counts/students").and_then(|v| v.as_u64()),
        Some(5)
    );
}
