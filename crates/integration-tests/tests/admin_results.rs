//! Result listing and correction.

use shodhsutra_integration_tests::TestApp;

fn sheet_form<'a>(extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    let mut form = vec![
        ("name", "Asha Rao"),
        ("rollNo", "1042"),
        ("enrollmentNo", "EN-2021-77"),
        ("course", "PhD Economics"),
        ("status", "Pass"),
        ("subject_name_0", "Research Methods"),
        ("subject_full_0", "100"),
        ("subject_pass_0", "40"),
        ("subject_obtained_0", "78"),
        ("subject_name_1", "Econometrics"),
        ("subject_full_1", "100"),
        ("subject_pass_1", "40"),
        ("subject_obtained_1", "64"),
    ];
    form.extend_from_slice(extra);
    form
}

#[tokio::test]
async fn test_results_list_and_search() {
    let app = TestApp::spawn().await;
    app.login().await;

    let page = app.get("/results?q=en-2021").await;
    assert!(page.contains("Asha Rao"));
    assert!(page.contains("1042"), "numeric roll numbers render as text");

    let page = app.get("/results?q=nobody").await;
    assert!(!page.contains("Asha Rao"));
}

#[tokio::test]
async fn test_save_sends_recomputed_totals() {
    let app = TestApp::spawn().await;
    app.login().await;

    let page = app.get("/results/r1/edit").await;
    assert_eq!(app.backend.calls(), vec!["GET /api/results/r1"]);
    assert!(page.contains("Research Methods"));
    assert!(page.contains("135"));
    app.backend.clear_calls();

    let page = app
        .post_form("/results/r1/edit", &sheet_form(&[("action", "save")]))
        .await;
    assert_eq!(app.backend.calls(), vec!["PUT /api/results/r1"]);
    assert!(page.contains("Result updated successfully!"));
    assert!(page.contains("142"));

    let data = app.backend.data();
    let body = data.result_updates.first().expect("one update");
    assert_eq!(body["result"]["totalObt"], 142);
    assert_eq!(body["result"]["totalFull"], 200);
    assert_eq!(body["result"]["subjects"][0]["obtained"], 78);
}

#[tokio::test]
async fn test_rejected_save_keeps_the_working_copy() {
    let app = TestApp::spawn().await;
    app.backend.data().reject_result_updates = Some("Roll No already assigned".to_string());
    app.login().await;
    app.get("/results/r1/edit").await;
    app.backend.clear_calls();

    let mut form = sheet_form(&[("action", "save")]);
    for field in &mut form {
        if field.0 == "name" {
            field.1 = "Asha R. Rao";
        }
    }
    let page = app.post_form("/results/r1/edit", &form).await;
    assert_eq!(app.backend.calls(), vec!["PUT /api/results/r1"]);
    assert_eq!(page.path, "/results/r1/edit");
    assert!(page.contains("Roll No already assigned"));
    assert!(!page.contains("Result updated successfully!"));
    assert!(page.contains("Asha R. Rao"), "edited values survive the failure");
    assert!(page.contains("142"));

    // The list still shows the stored record
    let list = app.get("/results").await;
    assert!(!list.contains("Asha R. Rao"));
}

#[tokio::test]
async fn test_incomplete_subject_blocks_save() {
    let app = TestApp::spawn().await;
    app.login().await;
    app.get("/results/r1/edit").await;
    app.backend.clear_calls();

    let page = app
        .post_form("/results/r1/edit", &sheet_form(&[("action", "add_subject")]))
        .await;
    assert!(page.contains("subject_name_2"), "a third row was added");

    // The new row has no name yet
    let page = app
        .post_form("/results/r1/edit", &sheet_form(&[("action", "save")]))
        .await;
    assert!(page.contains("Subject 3 is incomplete"));
    assert!(app.backend.calls().is_empty());
}

#[tokio::test]
async fn test_discard_drops_working_copy() {
    let app = TestApp::spawn().await;
    app.login().await;
    app.get("/results/r1/edit").await;

    let page = app
        .post_form("/results/r1/edit", &sheet_form(&[("action", "add_subject")]))
        .await;
    assert!(page.contains("subject_name_2"));

    let page = app.post_form("/results/r1/edit", &[("action", "discard")]).await;
    assert_eq!(page.path, "/results");

    app.backend.clear_calls();
    let page = app.get("/results/r1/edit").await;
    assert_eq!(app.backend.calls(), vec!["GET /api/results/r1"]);
    assert!(!page.contains("subject_name_2"));
}
