use std::sync::{Arc, Mutex};

use fake::{faker::name::en::Name, Fake};
use frontdesk::{
    api_client::BackendClient,
    assignment::{AssignmentEngine, CompensationPolicy},
    configuration::Settings,
    domain::{Reservation, Table},
    floor_view::FloorView,
    notifier::{Notifier, Severity},
    startup::Dashboard,
    telemetry::{get_subscriber, init_subscriber},
};
use once_cell::sync::Lazy;
use wiremock::MockServer;

static LOGGER_INSTANCE: Lazy<()> = Lazy::new(|| {
    let log_level = "info".to_string();
    let name = "frontdesk-test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(name, log_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(name, log_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

#[derive(Debug, Clone, PartialEq)]
pub struct Notification{
    pub title: String,
    pub message: String,
    pub severity: Severity
}

// Keeps every notification so tests can assert on what staff would have seen
#[derive(Default)]
pub struct RecordingNotifier{
    received: Mutex<Vec<Notification>>
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.received.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str, severity: Severity) {
        self.received.lock().unwrap().push(Notification{
            title: title.to_string(),
            message: message.to_string(),
            severity
        });
    }
}

pub struct TestFloor{
    pub backend: MockServer,
    pub settings: Settings,
    pub client: BackendClient,
    pub notifier: Arc<RecordingNotifier>,
    pub view: FloorView
}

impl TestFloor {
    pub async fn spawn() -> TestFloor{
        Lazy::force(&LOGGER_INSTANCE);

        let backend = MockServer::start().await;

        let mut settings = Settings::get().expect("Failed to read configuration");
        settings.backend.base_url = backend.uri();
        settings.backend.timeout_milliseconds = 500;

        let client = BackendClient::from_settings(&settings.backend)
            .expect("Failed to build backend client");

        TestFloor{
            backend,
            settings,
            client,
            notifier: Arc::new(RecordingNotifier::default()),
            view: FloorView::default()
        }
    }

    pub fn engine(&self, policy: CompensationPolicy) -> AssignmentEngine {
        AssignmentEngine::new(self.client.clone(), self.notifier.clone(), policy)
    }

    pub fn dashboard(&self) -> Dashboard {
        Dashboard::build(&self.settings, self.notifier.clone()).expect("Failed to build dashboard")
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifier.notifications()
    }

    // Requests the backend saw, as "METHOD /path"
    pub async fn received(&self) -> Vec<String> {
        self.backend
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }

    pub async fn writes(&self) -> Vec<String> {
        self.received()
            .await
            .into_iter()
            .filter(|r| !r.starts_with("GET "))
            .collect()
    }
}

pub fn table_json(id: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "tableNumber": id,
        "capacity": 4,
        "section": "main",
        "status": status
    })
}

pub fn table(id: &str, status: &str) -> Table {
    serde_json::from_value(table_json(id, status)).unwrap()
}

pub fn reservation_json(id: &str, guest: &str, status: &str) -> serde_json::Value {
    serde_json::json!({
        "_id": id,
        "guestInfo": { "name": guest, "email": "guest@example.com" },
        "noOfDiners": 4,
        "date": "2024-06-01",
        "timeSlot": "19:00",
        "status": status,
        "createdAt": "2024-05-30T12:00:00Z"
    })
}

pub fn reservation(id: &str, status: &str) -> Reservation {
    serde_json::from_value(reservation_json(id, &guest_name(), status)).unwrap()
}

pub fn guest_name() -> String {
    Name().fake()
}
