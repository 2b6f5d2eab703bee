use super::test_harness::{ViewKind, completed_quiz, setup_view_harness};

#[tokio::test(flavor = "current_thread")]
async fn home_view_asks_signed_out_learner_to_sign_in() {
    let mut harness = setup_view_harness(ViewKind::Home, false).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("sign in"), "missing sign-in prompt in {html}");
    assert!(!html.contains("assessment-id"), "unexpected form in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn home_view_shows_start_form_when_signed_in() {
    let mut harness = setup_view_harness(ViewKind::Home, true).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Start an assessment"), "missing title in {html}");
    assert!(html.contains("assessment-id"), "missing input in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn login_view_renders_form() {
    let mut harness = setup_view_harness(ViewKind::Login, false).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("Sign in"), "missing title in {html}");
    assert!(html.contains("password"), "missing password field in {html}");
    assert!(!html.contains("expired"), "unexpected notice in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_view_loads_first_question() {
    let mut harness = setup_view_harness(ViewKind::Assessment("a1".into()), true).await;
    harness.rebuild();

    let html = harness.drive_until("Question 1 of 2").await;
    assert!(html.contains("Question 1 of 2"), "missing position in {html}");
    assert!(html.contains("Ownership check"), "missing title in {html}");
    assert!(html.contains("1:00"), "missing countdown in {html}");
    assert!(html.contains("0 of 2 answered"), "missing progress in {html}");
    assert_eq!(harness.api.submit_calls(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_view_reports_unknown_assessment() {
    let mut harness = setup_view_harness(ViewKind::Assessment("zzz".into()), true).await;
    harness.rebuild();

    let html = harness.drive_until("could not be found").await;
    assert!(html.contains("could not be found"), "missing error in {html}");
    assert!(html.contains("Try again"), "missing retry in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn assessment_view_rejects_malformed_id() {
    let mut harness = setup_view_harness(ViewKind::Assessment("a/b".into()), true).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("could not be found"), "missing error in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_renders_review_rows() {
    let mut harness = setup_view_harness(ViewKind::Results("a1".into()), true).await;
    harness.ctx.record_completion(completed_quiz(100.0, Vec::new()));
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("100%"), "missing score in {html}");
    assert!(html.contains("Passed"), "missing verdict in {html}");
    assert!(html.contains("Your answer: string"), "missing answer in {html}");
    assert!(html.contains("review-row correct"), "case-insensitive match failed in {html}");
    assert!(html.contains("Time spent: 42s"), "missing time in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_without_completion_explains() {
    let mut harness = setup_view_harness(ViewKind::Results("a1".into()), true).await;
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("no result to show"), "missing empty state in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn advice_view_lists_knowledge_gaps() {
    let mut harness = setup_view_harness(ViewKind::Advice("c1".into()), true).await;
    harness
        .ctx
        .record_completion(completed_quiz(42.0, vec!["borrowing".into(), "lifetimes".into()]));
    harness.rebuild();
    let html = harness.render();
    assert!(html.contains("42%"), "missing score in {html}");
    assert!(html.contains("borrowing"), "missing gap in {html}");
    assert!(html.contains("lifetimes"), "missing gap in {html}");
    assert!(html.contains("Retake the assessment"), "missing retake link in {html}");
}
