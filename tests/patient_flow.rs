//! End-to-end flows through the public controller API against an in-memory
//! stand-in for the records server.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Value, json};

use mejcrt_client::api::{ApiError, ApiReader, ApiResult, ApiWriter};
use mejcrt_client::domain::patient::PatientSummary;
use mejcrt_client::forms::patient::NewPatientForm;
use mejcrt_client::pagination::{FetchOutcome, KeyPress, Locator};
use mejcrt_client::routes::{Navigation, Route};
use mejcrt_client::services::ServiceError;
use mejcrt_client::services::patients::{create_patient, delete_patient, mount_patient_list};
use mejcrt_client::session::{NotificationKind, Session};

struct StoredPatient {
    key: String,
    name: String,
    code: String,
}

/// Answers the patient endpoints the way the server does: filtered,
/// paginated listings with `prev`/`next` locators, exact-code lookups,
/// creation and deletion.
#[derive(Default)]
struct RecordsServer {
    patients: Mutex<Vec<StoredPatient>>,
    posts: Mutex<usize>,
}

fn param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

impl RecordsServer {
    fn with_patients(count: usize) -> Self {
        let patients = (0..count)
            .map(|i| StoredPatient {
                key: format!("k{i}"),
                name: if i % 3 == 0 {
                    format!("Maria {i}")
                } else {
                    format!("Ana {i}")
                },
                code: format!("{}", 1000 + i),
            })
            .collect();
        Self {
            patients: Mutex::new(patients),
            posts: Mutex::new(0),
        }
    }

    fn listing(&self, query: &str) -> ApiResult<Value> {
        let offset: usize = param(query, "offset").and_then(|v| v.parse().ok()).unwrap_or(0);
        let max: usize = param(query, "max").and_then(|v| v.parse().ok()).unwrap_or(20);
        let filter = param(query, "q").unwrap_or("").to_lowercase();
        let patients = self.patients.lock().unwrap();
        let total = patients.len();
        let matching: Vec<&StoredPatient> = patients
            .iter()
            .filter(|p| filter.is_empty() || p.name.to_lowercase().contains(&filter))
            .collect();
        let count = matching.len();
        let items: Vec<Value> = matching
            .iter()
            .skip(offset)
            .take(max)
            .map(|p| json!({"key": p.key, "name": p.name, "code": p.code}))
            .collect();
        let link = |at: usize| {
            format!("/api/v1/patient/?offset={at}&max={max}&q={filter}&fields=name%2Ccode")
        };
        Ok(json!({
            "code": "OK",
            "data": items,
            "offset": offset,
            "max": max,
            "total": total,
            "count": count,
            "prev": if offset > 0 { json!(link(offset.saturating_sub(max))) } else { Value::Null },
            "next": if offset + max < count { json!(link(offset + max)) } else { Value::Null },
            "q": filter,
        }))
    }

    fn exact(&self, query: &str) -> ApiResult<Value> {
        let code = param(query, "q").unwrap_or_default();
        let patients = self.patients.lock().unwrap();
        let found: Vec<Value> = patients
            .iter()
            .filter(|p| p.code == code)
            .map(|p| json!({"code": p.code}))
            .collect();
        Ok(json!({"code": "OK", "data": found}))
    }
}

#[async_trait]
impl ApiReader for RecordsServer {
    async fn get(&self, locator: &Locator) -> ApiResult<Value> {
        let (_, query) = locator.as_str().split_once('?').unwrap_or((locator.as_str(), ""));
        if param(query, "exact") == Some("true") {
            self.exact(query)
        } else {
            self.listing(query)
        }
    }
}

#[async_trait]
impl ApiWriter for RecordsServer {
    async fn post(&self, _path: &str, body: &Value) -> ApiResult<Value> {
        *self.posts.lock().unwrap() += 1;
        let mut patients = self.patients.lock().unwrap();
        let key = format!("k{}", patients.len());
        patients.push(StoredPatient {
            key: key.clone(),
            name: body["name"].as_str().unwrap_or_default().to_string(),
            code: body["code"].as_str().unwrap_or_default().to_string(),
        });
        Ok(json!({"code": "OK", "data": {"key": key}}))
    }

    async fn put(&self, _path: &str, _body: &Value) -> ApiResult<Value> {
        Ok(json!({"code": "OK"}))
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let key = path.rsplit('/').next().unwrap_or_default();
        let mut patients = self.patients.lock().unwrap();
        let before = patients.len();
        patients.retain(|p| p.key != key);
        if patients.len() == before {
            return Err(ApiError::NotFound);
        }
        Ok(())
    }
}

fn logged_in() -> Session {
    Session::with_user(Default::default())
}

fn ten() -> NonZeroUsize {
    NonZeroUsize::new(10).unwrap()
}

#[tokio::test]
async fn paging_and_search_through_the_list() {
    let server = Arc::new(RecordsServer::with_patients(25));
    let session = logged_in();

    let browser = match mount_patient_list(server.clone(), &session, ten()).await.unwrap() {
        Navigation::Render(browser) => browser,
        Navigation::Redirect(route) => panic!("unexpected redirect to {route}"),
    };

    let state = browser.state();
    assert_eq!(state.items().len(), 10);
    assert!(!state.cursor.has_prev && state.cursor.has_next);

    assert_eq!(browser.go_to_next().await, Ok(FetchOutcome::Applied));
    assert_eq!(browser.go_to_next().await, Ok(FetchOutcome::Applied));
    let state = browser.state();
    assert_eq!(state.query.offset, 20);
    assert_eq!(state.page_number, 3);
    assert_eq!(state.items().len(), 5);
    assert!(state.cursor.has_prev && !state.cursor.has_next);

    browser.set_filter_text("maria");
    assert_eq!(browser.on_key(KeyPress::Enter).await, Ok(FetchOutcome::Applied));
    let state = browser.state();
    assert_eq!(state.query.offset, 0);
    let last_page = state.last_page.as_ref().expect("page loaded");
    assert_eq!(last_page.applied_filter, "maria");
    assert_eq!(last_page.count, 9);
    assert!(state.items().iter().all(|p: &PatientSummary| p.name.starts_with("Maria")));

    browser.clear().await.unwrap();
    assert_eq!(browser.state().last_page.map(|p| p.count), Some(25));
}

#[tokio::test]
async fn delete_then_reload_shrinks_the_list() {
    let server = Arc::new(RecordsServer::with_patients(12));
    let session = logged_in();
    let browser = mount_patient_list(server.clone(), &session, ten())
        .await
        .unwrap()
        .into_rendered()
        .expect("list rendered");

    let victim = browser.state().items()[0].clone();
    let outcome = delete_patient(server.as_ref(), victim.clone()).await;
    assert!(outcome.success);
    assert_eq!(outcome.record, victim);

    browser.reload().await.unwrap();
    assert_eq!(browser.state().last_page.map(|p| p.count), Some(11));

    let again = delete_patient(server.as_ref(), victim).await;
    assert!(!again.success);
}

#[tokio::test]
async fn create_checks_for_duplicates_before_posting() {
    let server = RecordsServer::with_patients(3);
    let session = logged_in();
    let mut form = NewPatientForm {
        name: "Joana Prado".to_string(),
        code: "1001".to_string(),
        blood_type: "A-".to_string(),
        patient_type: "O".to_string(),
    };

    let duplicate = create_patient(&server, &session, &form).await;
    assert!(matches!(
        duplicate,
        Err(ServiceError::DuplicateKeyRejected(ref code)) if code == "1001"
    ));
    assert_eq!(*server.posts.lock().unwrap(), 0);

    form.code = "9999".to_string();
    let route = create_patient(&server, &session, &form).await.unwrap();
    assert_eq!(route, Route::Patients);
    assert_eq!(*server.posts.lock().unwrap(), 1);

    let notification = session.take_notification().expect("success shown");
    assert_eq!(notification.kind, NotificationKind::Success);
    assert!(notification.message.contains("Joana Prado"));
}

#[tokio::test]
async fn anonymous_session_is_sent_to_login() {
    let server = Arc::new(RecordsServer::with_patients(1));
    let nav = mount_patient_list(server, &Session::anonymous(), ten())
        .await
        .unwrap();
    assert_eq!(nav.redirect_target(), Some(&Route::Login));
}
