//! Integration tests for the view controller against a mock backend.

#[path = "support.rs"]
mod support;

use dailytrack_core::{ActivityFilter, LoginScreen, View};
use dailytrack_domain::constants::{ACCESS_TOKEN_KEY, CURRENT_USER_KEY, REFRESH_TOKEN_KEY};
use dailytrack_domain::{ActivityRecord, NewUser, Product, ProjectEntry, Role, TrackerSubmission};
use dailytrack_infra::ApiError;
use dailytrack_lib::{ControllerError, ControllerState, ReportSource, ViewModel};
use serde_json::{json, Value};
use support::{data, date, identity, row, Harness};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

// === Authentication ===

#[tokio::test]
async fn test_login_lands_on_home() {
    let harness = Harness::signed_out(None).await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "email": "a@corp.io", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "access_token": "tok",
            "refresh_token": "ref",
            "user": { "id": 3, "email": "a@corp.io", "name": "Asha", "role": "User" }
        })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let user = harness.controller.login(" a@corp.io ", "secret").await.unwrap();

    assert_eq!(user.role, Role::User);
    assert_eq!(
        harness.controller.state(),
        ControllerState::Authenticated { user: user.clone(), view: View::Home }
    );
    assert_eq!(harness.stored(ACCESS_TOKEN_KEY).await.as_deref(), Some("tok"));
    assert_eq!(harness.stored(REFRESH_TOKEN_KEY).await.as_deref(), Some("ref"));
    assert!(!harness.controller.menu().contains(&View::TeamControl));
}

#[tokio::test]
async fn test_login_failure_keeps_sign_in_screen() {
    let harness = Harness::signed_out(None).await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "status": "error", "message": "Invalid credentials" })),
        )
        .mount(&harness.server)
        .await;

    let err = harness.controller.login("a@corp.io", "wrong").await.unwrap_err();

    assert_eq!(err.user_message(), "Invalid credentials");
    assert_eq!(harness.controller.state(), ControllerState::signed_out());
    assert!(harness.stored(ACCESS_TOKEN_KEY).await.is_none());
}

#[tokio::test]
async fn test_blank_credentials_never_reach_backend() {
    let harness = Harness::signed_out(None).await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;

    let err = harness.controller.login("  ", "secret").await.unwrap_err();
    assert!(matches!(err, ControllerError::InvalidInput(_)));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let harness = Harness::signed_in(identity("a@corp.io", Role::User)).await;

    harness.controller.logout().await;

    assert_eq!(harness.controller.state(), ControllerState::signed_out());
    assert!(harness.controller.menu().is_empty());
    for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, CURRENT_USER_KEY] {
        assert!(harness.stored(key).await.is_none(), "{key} should be cleared");
    }
}

#[tokio::test]
async fn test_reset_link_flow_returns_to_sign_in() {
    let harness = Harness::signed_out(Some("http://localhost:5173/?reset_token=abc")).await;
    assert_eq!(
        harness.controller.state(),
        ControllerState::Unauthenticated(LoginScreen::ResetPassword { token: "abc".into() })
    );

    Mock::given(method("POST"))
        .and(path("/api/reset-password"))
        .and(body_json(json!({ "token": "abc", "new_password": "n3w-password" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&harness.server)
        .await;

    harness.controller.reset_password("abc", "n3w-password").await.unwrap();
    assert_eq!(harness.controller.state(), ControllerState::signed_out());
}

#[tokio::test]
async fn test_forgot_password_requires_email() {
    let harness = Harness::signed_out(None).await;
    Mock::given(method("POST"))
        .and(path("/api/forgot-password"))
        .and(body_json(json!({ "email": "a@corp.io" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&harness.server)
        .await;

    harness.controller.show_login_screen(LoginScreen::ForgotPassword);
    assert_eq!(
        harness.controller.state(),
        ControllerState::Unauthenticated(LoginScreen::ForgotPassword)
    );
    assert!(matches!(
        harness.controller.forgot_password("").await,
        Err(ControllerError::InvalidInput(_))
    ));
    harness.controller.forgot_password("a@corp.io").await.unwrap();
}

// === Session invalidation ===

#[tokio::test]
async fn test_failed_refresh_drops_to_sign_in() {
    let harness = Harness::signed_in(identity("a@corp.io", Role::User)).await;
    Mock::given(method("GET"))
        .and(path("/api/performance"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/refresh"))
        .and(header("authorization", "Bearer refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&harness.server)
        .await;

    harness.controller.navigate(View::Performance).unwrap();
    let err = harness.controller.load_current_view_on(date(2024, 5, 15)).await.unwrap_err();

    assert!(matches!(err, ControllerError::Api(ApiError::Rejected { status: 401, .. })));
    assert_eq!(harness.controller.state(), ControllerState::signed_out());
    for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, CURRENT_USER_KEY] {
        assert!(harness.stored(key).await.is_none(), "{key} should be cleared");
    }
}

#[tokio::test]
async fn test_invalidated_session_event_reaches_controller() {
    let harness = Harness::signed_in(identity("a@corp.io", Role::Admin)).await;
    harness.controller.navigate(View::OldData).unwrap();

    harness.session.invalidate("refresh token revoked").await;

    assert_eq!(harness.controller.state(), ControllerState::signed_out());
    assert!(matches!(
        harness.controller.load_current_view().await,
        Err(ControllerError::NotSignedIn)
    ));
}

// === Navigation and role gates ===

#[tokio::test]
async fn test_team_control_refused_for_non_admins() {
    for role in [Role::User, Role::TeamLead, Role::Manager] {
        let harness = Harness::signed_in(identity("manager1@corp.io", role)).await;

        let err = harness.controller.navigate(View::TeamControl).unwrap_err();

        assert!(matches!(err, ControllerError::Forbidden(_)), "{role} should be refused");
        assert_eq!(harness.controller.current_view(), Some(View::Home));
    }
}

#[tokio::test]
async fn test_team_control_lists_users_for_admin() {
    let harness = Harness::signed_in(identity("root@corp.io", Role::InternalAdmin)).await;
    Mock::given(method("GET"))
        .and(path("/api/users"))
        .and(header("authorization", "Bearer access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": 1, "email": "a@corp.io", "name": "Asha", "role": "User", "pod_name": "POD-1 (Aryabhata)" },
                { "id": 2, "email": "b@corp.io", "role": "Manager" }
            ]
        })))
        .mount(&harness.server)
        .await;

    harness.controller.navigate(View::TeamControl).unwrap();
    let model = harness.controller.load_current_view().await.unwrap();

    let ViewModel::TeamControl { users } = model else {
        panic!("expected team control model, got {model:?}");
    };
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].id, "1");
    assert_eq!(users[0].pod.as_deref(), Some("POD-1 (Aryabhata)"));
    assert_eq!(users[1].role, Role::Manager);
}

#[tokio::test]
async fn test_home_describes_scope() {
    let harness = Harness::signed_in(identity("manager1@corp.io", Role::Manager)).await;

    let model = harness.controller.load_current_view().await.unwrap();

    let ViewModel::Home { menu, scope, .. } = model else {
        panic!("expected home model, got {model:?}");
    };
    assert_eq!(scope, "POD-1 (Aryabhata), POD-4 (Gaganyaan)");
    assert_eq!(menu.len(), 6);
}

// === Data views ===

#[tokio::test]
async fn test_performance_view_scopes_rows_and_sums_own_week() {
    let harness = Harness::signed_in(identity("team_lead_1@corp.io", Role::TeamLead)).await;
    Mock::given(method("GET"))
        .and(path("/api/performance"))
        .and(query_param("email", "team_lead_1@corp.io"))
        .and(query_param("role", "Team Lead"))
        .and(query_param("start_date", "2024-04-15"))
        .and(query_param("end_date", "2024-05-15"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(vec![
            row("team_lead_1@corp.io", "POD-1 (Aryabhata)", "2024-05-13T09:00:00Z", 6.0),
            row("a@corp.io", "POD-1 (Aryabhata)", "2024-05-14 10:30:00", 4.0),
            row("b@corp.io", "POD-2 (Crawlers)", "2024-05-14", 5.0),
            row("a@corp.io", "POD-1 (Aryabhata)", "2024-05-05", 5.0),
        ])))
        .expect(1)
        .mount(&harness.server)
        .await;

    harness.controller.navigate(View::Performance).unwrap();
    let model = harness.controller.load_current_view_on(date(2024, 5, 15)).await.unwrap();

    let ViewModel::Performance { summary, rows, scope, .. } = model else {
        panic!("expected performance model, got {model:?}");
    };
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r.pod_name.as_deref() == Some("POD-1 (Aryabhata)")));
    assert_eq!(summary.week_start, date(2024, 5, 12));
    assert_eq!(summary.week_end, date(2024, 5, 18));
    // team rows are listed, but progress counts only the lead's own hours
    assert!((summary.hours - 6.0).abs() < f64::EPSILON);
    assert!((summary.remaining - 34.0).abs() < f64::EPSILON);
    assert_eq!(summary.percent, 15);
    assert_eq!(scope, "POD-1 (Aryabhata)");
}

#[tokio::test]
async fn test_old_data_for_user_is_scoped_and_filtered() {
    let harness = Harness::signed_in(identity("a@corp.io", Role::User)).await;
    Mock::given(method("GET"))
        .and(path("/api/daily_activity"))
        .and(query_param("email", "a@corp.io"))
        .and(query_param("product", "aims"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(vec![
            row("a@corp.io", "POD-1 (Aryabhata)", "2024-05-13", 6.0),
            row("a@corp.io", "POD-1 (Aryabhata)", "2024-05-02", 3.0),
            row("b@corp.io", "POD-1 (Aryabhata)", "2024-05-13", 2.0),
        ])))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/daily_activity/filters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .mount(&harness.server)
        .await;

    let filter = ActivityFilter {
        product: Some("aims".into()),
        from_date: Some(date(2024, 5, 10)),
        ..ActivityFilter::default()
    };
    harness.controller.set_old_data_filter(filter.clone());
    harness.controller.navigate(View::OldData).unwrap();
    let model = harness.controller.load_current_view().await.unwrap();

    let ViewModel::OldData { rows, options, filter: applied, can_edit } = model else {
        panic!("expected old data model, got {model:?}");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].submitted_at.as_deref(), Some("2024-05-13"));
    assert_eq!(options.products, vec!["aims".to_string()]);
    assert_eq!(applied, filter);
    assert!(!can_edit);

    let edit = ActivityRecord { remarks: Some("late".into()), ..rows[0].clone() };
    assert!(matches!(
        harness.controller.save_record_edit(&edit).await,
        Err(ControllerError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_old_data_for_manager_asks_only_for_own_rows() {
    let harness = Harness::signed_in(identity("manager1@corp.io", Role::Manager)).await;
    // without the email parameter nothing matches and the load fails
    Mock::given(method("GET"))
        .and(path("/api/daily_activity"))
        .and(query_param("email", "manager1@corp.io"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(vec![row(
            "manager1@corp.io",
            "POD-1 (Aryabhata)",
            "2024-05-13",
            2.0,
        )])))
        .expect(1)
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/daily_activity/filters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .mount(&harness.server)
        .await;

    harness.controller.navigate(View::OldData).unwrap();
    let model = harness.controller.load_current_view().await.unwrap();

    let ViewModel::OldData { rows, can_edit, .. } = model else {
        panic!("expected old data model, got {model:?}");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].email.as_deref(), Some("manager1@corp.io"));
    assert!(!can_edit);
}

#[tokio::test]
async fn test_admin_edit_patches_loaded_rows() {
    let harness = Harness::signed_in(identity("root@corp.io", Role::Admin)).await;
    Mock::given(method("GET"))
        .and(path("/api/daily_activity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(vec![
            row("a@corp.io", "POD-1 (Aryabhata)", "2024-05-13", 6.0),
            row("b@corp.io", "POD-2 (Crawlers)", "2024-05-13", 2.0),
        ])))
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/daily_activity/filters"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "products": ["aims", "ivms"], "podNames": ["POD-1 (Aryabhata)"] }
        })))
        .mount(&harness.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/daily_activity/edit"))
        .and(body_json(json!({ "id": "a@corp.io-2024-05-13", "remarks": "fixed" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&harness.server)
        .await;

    harness.controller.navigate(View::OldData).unwrap();
    let model = harness.controller.load_current_view().await.unwrap();
    let ViewModel::OldData { rows, options, can_edit, .. } = model else {
        panic!("expected old data model, got {model:?}");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(options.products, vec!["aims".to_string(), "ivms".to_string()]);
    assert!(can_edit);

    let edit = ActivityRecord {
        id: Some(Value::String("a@corp.io-2024-05-13".into())),
        remarks: Some("fixed".into()),
        ..ActivityRecord::default()
    };
    assert!(harness.controller.save_record_edit(&edit).await.unwrap());

    let missing = ActivityRecord {
        id: Some(Value::String("nobody".into())),
        remarks: Some("fixed".into()),
        ..ActivityRecord::default()
    };
    // Backend accepts it, but no loaded row has that identity
    Mock::given(method("PUT"))
        .and(path("/api/daily_activity/edit"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&harness.server)
        .await;
    assert!(!harness.controller.save_record_edit(&missing).await.unwrap());
}

#[tokio::test]
async fn test_team_report_from_backend_is_scoped_to_managed_pods() {
    let harness = Harness::signed_in(identity("manager1@corp.io", Role::Manager)).await;
    Mock::given(method("GET"))
        .and(path("/api/team-report"))
        .and(query_param("role", "Manager"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "email": "a@corp.io", "entries": 3, "totalHours": "12.5", "avgDaily": 4.1 },
                { "email": "c@corp.io", "entries": 2, "totalHours": 9, "avgDaily": 4.5 }
            ]
        })))
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/performance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(vec![
            row("a@corp.io", "POD-1 (Aryabhata)", "2024-05-13", 4.0),
            row("c@corp.io", "POD-2 (Crawlers)", "2024-05-14", 3.0),
        ])))
        .expect(1)
        .mount(&harness.server)
        .await;

    harness.controller.navigate(View::TeamReport).unwrap();
    let model = harness.controller.load_current_view_on(date(2024, 5, 15)).await.unwrap();

    let ViewModel::TeamReport { rows, source } = model else {
        panic!("expected team report model, got {model:?}");
    };
    assert_eq!(source, ReportSource::Backend);
    let emails: Vec<&str> = rows.iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, ["a@corp.io"], "POD-2 member must not reach manager1");
    assert_eq!(rows[0].entries, 3);
    assert_eq!(rows[0].total_hours, Some(12.5));
}

#[tokio::test]
async fn test_team_report_from_backend_is_unfiltered_for_admin() {
    let harness = Harness::signed_in(identity("root@corp.io", Role::Admin)).await;
    Mock::given(method("GET"))
        .and(path("/api/team-report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "email": "a@corp.io", "entries": 3, "totalHours": 12, "avgDaily": 4 },
                { "email": "c@corp.io", "entries": 2, "totalHours": 9, "avgDaily": 4.5 }
            ]
        })))
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/performance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(vec![])))
        .expect(0)
        .mount(&harness.server)
        .await;

    harness.controller.navigate(View::TeamReport).unwrap();
    let model = harness.controller.load_current_view_on(date(2024, 5, 15)).await.unwrap();

    let ViewModel::TeamReport { rows, source } = model else {
        panic!("expected team report model, got {model:?}");
    };
    assert_eq!(source, ReportSource::Backend);
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_team_report_falls_back_to_local_aggregate() {
    let harness = Harness::signed_in(identity("manager1@corp.io", Role::Manager)).await;
    Mock::given(method("GET"))
        .and(path("/api/team-report"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&harness.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/performance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(data(vec![
            row("a@corp.io", "POD-1 (Aryabhata)", "2024-05-13", 4.0),
            row("a@corp.io", "POD-4 (Gaganyaan)", "2024-05-14", 4.0),
            row("b@corp.io", "POD-1 (Aryabhata)", "2024-05-14", 2.0),
            row("c@corp.io", "POD-2 (Crawlers)", "2024-05-14", 3.0),
        ])))
        .mount(&harness.server)
        .await;

    harness.controller.navigate(View::TeamReport).unwrap();
    let model = harness.controller.load_current_view_on(date(2024, 5, 15)).await.unwrap();

    let ViewModel::TeamReport { rows, source } = model else {
        panic!("expected team report model, got {model:?}");
    };
    assert_eq!(source, ReportSource::Local);
    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].email.as_str(), rows[0].entries), ("a@corp.io", 2));
    assert_eq!(rows[0].total_hours, Some(8.0));
    assert_eq!(rows[0].avg_daily, Some(4.0));
    assert_eq!((rows[1].email.as_str(), rows[1].entries), ("b@corp.io", 1));
    assert_eq!(rows[1].avg_daily, Some(2.0));
}

// === Submissions and user management ===

#[tokio::test]
async fn test_submit_tracker_keeps_only_product_fields() {
    let harness = Harness::signed_in(identity("a@corp.io", Role::User)).await;
    Mock::given(method("POST"))
        .and(path("/api/tracker"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "count": 1 })))
        .expect(1)
        .mount(&harness.server)
        .await;

    let mut entry = ProjectEntry {
        project_name: "Grid".into(),
        nature_of_work: "Production".into(),
        task: "Digitising".into(),
        dedicated_hours: Some(6.5),
        ..ProjectEntry::default()
    };
    entry.fields.insert("conductorLines".into(), json!(14));
    entry.fields.insert("siteName".into(), json!("North"));
    let submission = TrackerSubmission {
        date: "2024-05-15".into(),
        mode_of_functioning: "WFO".into(),
        pod_name: "POD-1 (Aryabhata)".into(),
        product: Product::Aims,
        projects: vec![entry],
    };

    let receipt = harness.controller.submit_tracker(&submission).await.unwrap();
    assert_eq!(receipt.count, Some(1));

    let requests = harness.server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["product"], "aims");
    assert_eq!(body["projects"][0]["conductorLines"], 14);
    assert!(body["projects"][0].get("siteName").is_none());
}

#[tokio::test]
async fn test_submit_tracker_needs_a_project() {
    let harness = Harness::signed_in(identity("a@corp.io", Role::User)).await;
    let submission = TrackerSubmission {
        date: "2024-05-15".into(),
        mode_of_functioning: "WFH".into(),
        pod_name: "POD-1 (Aryabhata)".into(),
        product: Product::Imagery,
        projects: vec![],
    };

    assert!(matches!(
        harness.controller.submit_tracker(&submission).await,
        Err(ControllerError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_create_user_enforces_password_length() {
    let harness = Harness::signed_in(identity("root@corp.io", Role::Admin)).await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(body_json(json!({
            "name": "Ravi",
            "email": "ravi@corp.io",
            "password": "long-enough",
            "role": "Team Lead",
            "pod": "POD-3 (Marte)",
            "pod_name": "POD-3 (Marte)"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&harness.server)
        .await;

    let mut new_user = NewUser {
        name: "Ravi".into(),
        email: "ravi@corp.io".into(),
        password: "short".into(),
        role: Role::TeamLead,
        pod: Some("POD-3 (Marte)".into()),
    };
    let err = harness.controller.create_user(&new_user).await.unwrap_err();
    assert_eq!(err.user_message(), "Password must be at least 8 characters");

    new_user.password = "long-enough".into();
    harness.controller.create_user(&new_user).await.unwrap();
}

#[tokio::test]
async fn test_user_management_is_admin_only() {
    let harness = Harness::signed_in(identity("manager1@corp.io", Role::Manager)).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&harness.server)
        .await;

    assert!(matches!(
        harness.controller.delete_user("5").await,
        Err(ControllerError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_delete_user_surfaces_backend_message() {
    let harness = Harness::signed_in(identity("root@corp.io", Role::Admin)).await;
    Mock::given(method("DELETE"))
        .and(path("/api/users/5"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "error": "User has entries" })),
        )
        .mount(&harness.server)
        .await;

    let err = harness.controller.delete_user("5").await.unwrap_err();
    assert_eq!(err.user_message(), "User has entries");
    assert!(harness.controller.state().is_authenticated());
}
