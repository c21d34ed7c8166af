//! Integration tests against an in-process mock backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::attendance::{AttendanceForm, EligibilityResolver, SessionParams, SubmitPhase};
use crate::cache::{CacheEvent, QueryKey};
use crate::config::Config;
use crate::errors::{ApiError, NETWORK_UNAVAILABLE, SESSION_EXPIRED};
use crate::models::{Category, CreateUserRequest, Role, SessionType, StudentFilter, TokenPair};
use crate::store::Repository;
use crate::wizard::StudentWizard;

const PASSWORD: &str = "correct-horse";

type Reply = (StatusCode, Json<Value>);

/// Backend state shared with the mock handlers.
struct MockState {
    valid_access: Mutex<String>,
    refresh_ok: AtomicBool,
    deny_users: AtomicBool,
    hits: Mutex<HashMap<&'static str, usize>>,
    last_batch: Mutex<Option<(HashMap<String, String>, Value)>>,
    batch_failure: Mutex<Option<(StatusCode, Value)>>,
}

type Shared = Arc<MockState>;

impl MockState {
    fn new() -> Self {
        Self {
            valid_access: Mutex::new("access-1".to_string()),
            refresh_ok: AtomicBool::new(true),
            deny_users: AtomicBool::new(false),
            hits: Mutex::new(HashMap::new()),
            last_batch: Mutex::new(None),
            batch_failure: Mutex::new(None),
        }
    }

    fn hit(&self, endpoint: &'static str) -> usize {
        let mut hits = self.hits.lock().unwrap();
        let count = hits.entry(endpoint).or_insert(0);
        *count += 1;
        *count
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {}", self.valid_access.lock().unwrap());
        headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) == Some(expected.as_str())
    }

    /// Make every token issued so far stale.
    fn expire_access(&self) {
        *self.valid_access.lock().unwrap() = "rotated-server-side".to_string();
    }
}

fn unauthorized() -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "detail": "Could not validate credentials" })),
    )
}

fn student_json(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Member {}", id),
        "age": 30,
        "sex": "female",
        "church": "Central",
        "department_id": 3,
        "category": "adult"
    })
}

fn user_json() -> Value {
    json!({
        "id": 1,
        "email": "admin@flock.test",
        "full_name": "Ada Admin",
        "role": "admin",
        "is_active": true,
        "department_ids": [3]
    })
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    state.hit("login");
    if body["password"] == PASSWORD {
        let access = state.valid_access.lock().unwrap().clone();
        (
            StatusCode::OK,
            Json(json!({ "access_token": access, "refresh_token": "refresh-1", "token_type": "bearer" })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Incorrect email or password" })),
        )
    }
}

async fn refresh(State(state): State<Shared>, Json(body): Json<Value>) -> Reply {
    let count = state.hit("refresh");
    if state.refresh_ok.load(Ordering::SeqCst) && body["refresh_token"] == "refresh-1" {
        let token = format!("access-{}", count + 1);
        *state.valid_access.lock().unwrap() = token.clone();
        (StatusCode::OK, Json(json!({ "access_token": token })))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid refresh token" })),
        )
    }
}

async fn current_user(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    state.hit("me");
    if !state.authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, Json(user_json()))
}

async fn list_users(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    state.hit("users");
    if state.deny_users.load(Ordering::SeqCst) || !state.authorized(&headers) {
        return unauthorized();
    }
    (StatusCode::OK, Json(json!({ "results": [user_json()] })))
}

async fn create_manager(State(state): State<Shared>) -> Reply {
    state.hit("create_manager");
    (
        StatusCode::FORBIDDEN,
        Json(json!({ "detail": "Admins can only create managers in their own departments" })),
    )
}

async fn list_students(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    state.hit("students");
    if !state.authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({ "data": [student_json(1), student_json(2)] })),
    )
}

async fn create_student(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    state.hit("create_student");
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let mut created = body.clone();
    created["id"] = json!(10);
    (StatusCode::OK, Json(created))
}

async fn eligible(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Reply {
    state.hit("eligible");
    if !state.authorized(&headers) {
        return unauthorized();
    }
    let department = params.get("department_id").map(String::as_str);
    let category = params.get("category").map(String::as_str);
    let students = match (department, category) {
        (Some("3"), Some("adult")) => json!([student_json(1), student_json(2), student_json(3)]),
        _ => json!([]),
    };
    (StatusCode::OK, Json(students))
}

async fn submit_batch(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Reply {
    state.hit("batch");
    if !state.authorized(&headers) {
        return unauthorized();
    }
    *state.last_batch.lock().unwrap() = Some((params, body));
    let failure = state.batch_failure.lock().unwrap().clone();
    match failure {
        Some((status, payload)) => (status, Json(payload)),
        None => (StatusCode::OK, Json(json!({ "id": 41, "status": "created" }))),
    }
}

async fn list_sessions(State(state): State<Shared>, headers: HeaderMap) -> Reply {
    state.hit("sessions");
    if !state.authorized(&headers) {
        return unauthorized();
    }
    (
        StatusCode::OK,
        Json(json!({
            "items": [{
                "id": 40,
                "date": "2026-10-11",
                "department_id": 3,
                "category": "adult",
                "type": "REGULAR",
                "records": [
                    { "student_id": 1, "present": true },
                    { "student_id": 2, "present": false, "notes": "travelling" }
                ]
            }]
        })),
    )
}

fn mock_router(state: Shared) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/users/me", get(current_user))
        .route("/users/", get(list_users))
        .route("/users/admin/create-manager", post(create_manager))
        .route("/students/", get(list_students).post(create_student))
        .route("/attendance/eligible-students/", get(eligible))
        .route("/attendance/sessions/batch", post(submit_batch))
        .route("/attendance/sessions/", get(list_sessions))
        .with_state(state)
}

/// Test fixture for integration tests.
struct TestFixture {
    repo: Repository,
    state: Shared,
}

impl TestFixture {
    async fn new() -> Self {
        let state = Arc::new(MockState::new());
        let app = mock_router(Arc::clone(&state));

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let config = Config {
            api_base_url: format!("http://{}", addr),
            log_level: "warn".to_string(),
            ..Config::default()
        };

        TestFixture {
            repo: Repository::from_config(&config).expect("Failed to build repository"),
            state,
        }
    }

    async fn logged_in() -> Self {
        let fixture = Self::new().await;
        fixture
            .repo
            .login("admin@flock.test", PASSWORD)
            .await
            .expect("Login failed");
        fixture
    }

    fn hits(&self, endpoint: &str) -> usize {
        self.state
            .hits
            .lock()
            .unwrap()
            .get(endpoint)
            .copied()
            .unwrap_or(0)
    }

    fn adult_form(&self) -> AttendanceForm {
        let mut form = AttendanceForm::new(SessionParams::new(
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        ));
        form.select_department(Some(3));
        form.select_category(Some(Category::Adult));
        form
    }

    fn resolver(&self) -> EligibilityResolver {
        EligibilityResolver::new(self.repo.clone())
    }
}

#[tokio::test]
async fn test_login_and_current_user() {
    let fixture = TestFixture::logged_in().await;

    let user = fixture.repo.current_user().await.unwrap();
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.department_ids, vec![3]);

    // Served from cache the second time
    assert_eq!(fixture.hits("me"), 1);
    assert_eq!(
        fixture.repo.client().credentials().refresh_token().as_deref(),
        Some("refresh-1")
    );
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let fixture = TestFixture::new().await;

    let err = fixture
        .repo
        .login("admin@flock.test", "wrong")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Unauthorized("Incorrect email or password".to_string())
    );
    assert!(!fixture.repo.client().credentials().is_authenticated());
    assert_eq!(fixture.hits("refresh"), 0);
}

#[tokio::test]
async fn test_401_refreshes_once_and_retries() {
    let fixture = TestFixture::logged_in().await;
    fixture.state.expire_access();

    let students = fixture
        .repo
        .client()
        .eligible_students(3, Category::Adult)
        .await
        .unwrap();

    assert_eq!(students.len(), 3);
    assert_eq!(fixture.hits("refresh"), 1);
    assert_eq!(fixture.hits("eligible"), 2);

    let credentials = fixture.repo.client().credentials();
    assert_eq!(credentials.access_token().as_deref(), Some("access-2"));
    assert_eq!(credentials.refresh_token().as_deref(), Some("refresh-1"));
}

#[tokio::test]
async fn test_401_without_refresh_token_clears_credentials() {
    let fixture = TestFixture::new().await;
    fixture
        .repo
        .client()
        .credentials()
        .store(TokenPair::new("stale", None));

    let err = fixture.repo.client().current_user().await.unwrap_err();

    assert_eq!(err, ApiError::Unauthorized(SESSION_EXPIRED.to_string()));
    assert!(!fixture.repo.client().credentials().is_authenticated());
    assert_eq!(fixture.hits("refresh"), 0);
    assert_eq!(fixture.hits("me"), 1);
}

#[tokio::test]
async fn test_failed_refresh_forces_login() {
    let fixture = TestFixture::logged_in().await;
    fixture.state.refresh_ok.store(false, Ordering::SeqCst);
    fixture.state.expire_access();

    let err = fixture
        .repo
        .client()
        .list_sessions()
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), crate::errors::codes::UNAUTHORIZED);
    assert!(!fixture.repo.client().credentials().is_authenticated());
    assert_eq!(fixture.hits("refresh"), 1);
    assert_eq!(fixture.hits("sessions"), 1);
}

#[tokio::test]
async fn test_retry_happens_only_once() {
    let fixture = TestFixture::logged_in().await;
    fixture.state.deny_users.store(true, Ordering::SeqCst);

    let err = fixture.repo.client().list_users().await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Unauthorized("Could not validate credentials".to_string())
    );
    assert_eq!(fixture.hits("refresh"), 1);
    assert_eq!(fixture.hits("users"), 2);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let fixture = TestFixture::logged_in().await;
    fixture.state.expire_access();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = fixture.repo.client().clone();
        handles.push(tokio::spawn(async move { client.current_user().await }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap().id, 1);
    }

    assert_eq!(fixture.hits("refresh"), 1);
}

#[tokio::test]
async fn test_eligibility_is_skipped_until_selected_and_cached() {
    let fixture = TestFixture::logged_in().await;
    let resolver = fixture.resolver();

    let mut params = SessionParams::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
    params.department_id = Some(3);
    assert!(resolver.resolve(&params).await.unwrap().is_empty());
    assert_eq!(fixture.hits("eligible"), 0);

    params.category = Some(Category::Adult);
    assert_eq!(resolver.resolve(&params).await.unwrap().len(), 3);
    assert_eq!(resolver.resolve(&params).await.unwrap().len(), 3);
    assert_eq!(fixture.hits("eligible"), 1);
}

#[tokio::test]
async fn test_batch_submission_scenario() {
    let fixture = TestFixture::logged_in().await;
    let mut form = fixture.adult_form();

    assert_eq!(form.load_eligible(&fixture.resolver()).await.unwrap(), 3);
    form.toggle_present(1, true);

    let mut completed = None;
    let receipt = form
        .submit(&fixture.repo, |receipt| completed = receipt.session_id())
        .await
        .unwrap();

    assert_eq!(receipt.session_id(), Some(41));
    assert_eq!(completed, Some(41));
    assert_eq!(form.phase(), SubmitPhase::Succeeded);
    assert_eq!(form.selected_count(), 0);
    assert!(form.error().is_none());

    let (query, body) = fixture.state.last_batch.lock().unwrap().clone().unwrap();
    assert_eq!(query.get("department_id").map(String::as_str), Some("3"));
    assert_eq!(
        body,
        json!({
            "date": "2026-10-18",
            "department_id": 3,
            "category": "adult",
            "type": "REGULAR",
            "records": [
                { "student_id": 1, "present": true },
                { "student_id": 2, "present": false },
                { "student_id": 3, "present": false }
            ]
        })
    );
}

#[tokio::test]
async fn test_invalid_forms_never_reach_backend() {
    let fixture = TestFixture::logged_in().await;

    let mut unselected =
        AttendanceForm::new(SessionParams::new(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()));
    let err = unselected.submit(&fixture.repo, |_| {}).await.unwrap_err();
    assert_eq!(err.error_code(), crate::errors::codes::VALIDATION_ERROR);
    assert_eq!(unselected.error(), Some("Please select a department"));
    assert_eq!(unselected.phase(), SubmitPhase::Idle);

    let mut nobody_present = fixture.adult_form();
    nobody_present.load_eligible(&fixture.resolver()).await.unwrap();
    nobody_present.set_all_present(false);
    let err = nobody_present
        .submit(&fixture.repo, |_| panic!("must not complete"))
        .await
        .unwrap_err();
    assert!(!err.message().is_empty());

    assert_eq!(fixture.hits("batch"), 0);
}

#[tokio::test]
async fn test_server_errors_are_flattened_and_ledger_kept() {
    let fixture = TestFixture::logged_in().await;
    *fixture.state.batch_failure.lock().unwrap() = Some((
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "detail": [{ "msg": "date is required" }, { "msg": "category invalid" }] }),
    ));

    let mut form = fixture.adult_form();
    form.load_eligible(&fixture.resolver()).await.unwrap();
    form.set_all_present(true);

    let err = form.submit(&fixture.repo, |_| {}).await.unwrap_err();

    assert_eq!(err.status_code(), Some(422));
    assert_eq!(form.error(), Some("date is required. category invalid"));
    assert_eq!(form.phase(), SubmitPhase::Idle);
    assert_eq!(form.selected_count(), 3);

    // Correct and resubmit; the error clears
    *fixture.state.batch_failure.lock().unwrap() = None;
    form.set_session_type(SessionType::Event);
    form.submit(&fixture.repo, |_| {}).await.unwrap();
    assert!(form.error().is_none());
    assert_eq!(fixture.hits("batch"), 2);
}

#[tokio::test]
async fn test_submit_invalidates_session_history() {
    let fixture = TestFixture::logged_in().await;

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    fixture
        .repo
        .cache()
        .subscribe(QueryKey::Sessions, move |event| sink.lock().unwrap().push(*event));

    let sessions = fixture.repo.list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].records[1].notes.as_deref(), Some("travelling"));
    fixture.repo.list_sessions().await.unwrap();
    assert_eq!(fixture.hits("sessions"), 1);

    let mut form = fixture.adult_form();
    form.load_eligible(&fixture.resolver()).await.unwrap();
    form.toggle_present(2, true);
    form.submit(&fixture.repo, |_| {}).await.unwrap();

    fixture.repo.list_sessions().await.unwrap();
    assert_eq!(fixture.hits("sessions"), 2);
    assert!(events
        .lock()
        .unwrap()
        .contains(&CacheEvent::Invalidated(QueryKey::Sessions)));
}

#[tokio::test]
async fn test_created_student_refreshes_listing() {
    let fixture = TestFixture::logged_in().await;
    let filter = StudentFilter {
        department_id: Some(3),
        category: None,
    };

    assert_eq!(fixture.repo.list_students(filter).await.unwrap().len(), 2);

    let mut wizard = StudentWizard::for_department(3);
    wizard.set_field("name", "Akosua Asante");
    wizard.set_field("age", "9");
    wizard.set_field("sex", "female");
    wizard.next().unwrap();
    wizard.set_field("church", "Central");
    wizard.set_field("category", "child");
    wizard.next().unwrap();
    wizard.set_field("guardian_name", "Efua Asante");
    wizard.set_field("guardian_phone", "0201234567");
    wizard.next().unwrap();

    let created = fixture
        .repo
        .create_student(&wizard.finish().unwrap())
        .await
        .unwrap();
    assert_eq!(created.id, 10);
    assert_eq!(created.category, Category::Child);
    assert!(created.typed_details().is_some());

    fixture.repo.list_students(filter).await.unwrap();
    assert_eq!(fixture.hits("students"), 2);
}

#[tokio::test]
async fn test_forbidden_detail_is_verbatim() {
    let fixture = TestFixture::logged_in().await;
    let request = CreateUserRequest {
        email: "mgr@flock.test".to_string(),
        full_name: "Manny".to_string(),
        password: "long-enough".to_string(),
    };

    let err = fixture.repo.create_manager(9, &request).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Forbidden("Admins can only create managers in their own departments".to_string())
    );
    assert_eq!(fixture.hits("refresh"), 0);
}

#[tokio::test]
async fn test_logout_clears_cache() {
    let fixture = TestFixture::logged_in().await;
    assert!(fixture
        .repo
        .cache()
        .get::<Value>(&QueryKey::CurrentUser)
        .is_some());

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    fixture
        .repo
        .cache()
        .subscribe(QueryKey::CurrentUser, move |event| sink.lock().unwrap().push(*event));

    fixture.repo.logout();

    assert!(!fixture.repo.client().credentials().is_authenticated());
    assert!(fixture
        .repo
        .cache()
        .get::<Value>(&QueryKey::CurrentUser)
        .is_none());
    assert_eq!(
        *events.lock().unwrap(),
        vec![CacheEvent::Invalidated(QueryKey::CurrentUser)]
    );
}

#[tokio::test]
async fn test_network_failure_is_reported() {
    // Reserve a port, then free it so nothing is listening
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let config = Config {
        api_base_url: format!("http://{}", addr),
        ..Config::default()
    };
    let repo = Repository::from_config(&config).unwrap();

    let err = repo.current_user().await.unwrap_err();
    assert_eq!(err, ApiError::Network(NETWORK_UNAVAILABLE.to_string()));
    assert_eq!(err.status_code(), None);
}

#[test]
fn test_init_tracing_is_idempotent() {
    let config = Config {
        log_level: "warn".to_string(),
        ..Config::default()
    };
    crate::init_tracing(&config);
    assert!(!crate::init_tracing(&config));
}
