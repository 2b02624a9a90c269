use crate::{
    config::RuntimeConfiguration, data::client::StudentClient, error::TweedResult,
    routes::sse::SseEvent,
};
use maud::{DOCTYPE, Markup, html};
use tokio::sync::broadcast::{Receiver, Sender, channel};

#[derive(Clone, Debug)]
pub struct TweedState {
    client: StudentClient,
    config: RuntimeConfiguration,
    sse_events_sender: Sender<SseEvent>,
}

impl TweedState {
    pub fn new(config: RuntimeConfiguration) -> TweedResult<Self> {
        let client = StudentClient::new(&config.api_config())?;
        let (tx, _rx) = channel(16);

        Ok(Self {
            client,
            config,
            sse_events_sender: tx,
        })
    }

    #[allow(clippy::unused_self, clippy::needless_pass_by_value)] //in case self is ever needed :), and to allow direct html! usage
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    //error responses still carry a banner worth showing
                    meta name="htmx-config" content=r#"{"responseHandling":[{"code":"204","swap":false},{"code":"[23]..","swap":true},{"code":"[45]..","swap":true,"error":true}]}"# {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://unpkg.com/htmx-ext-sse@2.2.3" integrity="sha384-Y4gc0CK6Kg+hmulDc6rZPJu0tqvk7EWlih0Oh+2OkAi1ZDlCbBDCQEE2uVk472Ky" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Tweed" }
                }
                body hx-ext="sse" class="bg-gray-900 min-h-screen flex flex-col items-center text-white" {
                    nav class="w-full bg-gray-800 shadow-md mb-8 px-8 py-4 flex flex-row space-x-6" {
                        a href="/" class="font-bold hover:text-blue-300" {"Tweed"}
                        a href="/students" class="hover:text-blue-300" {"Students"}
                    }
                    (markup)
                }
            }
        }
    }

    pub const fn client(&self) -> &StudentClient {
        &self.client
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    pub fn subscribe_to_sse_feed(&self) -> Receiver<SseEvent> {
        self.sse_events_sender.subscribe()
    }

    pub fn send_sse_event(&self, event: SseEvent) {
        let _ = self.sse_events_sender.send(event);
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::config::{ApiConfig, date_locale::DateLocaleConfig};
    use axum::{
        Json, Router,
        body::to_bytes,
        extract::{Path, State},
        http::StatusCode,
        response::Response,
        routing::{get, patch},
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    /// A student service living in memory, writing down every request it gets.
    #[derive(Default)]
    pub struct FakeService {
        pub students: Mutex<Vec<Value>>,
        pub calls: Mutex<Vec<String>>,
    }

    type Service = State<Arc<FakeService>>;

    impl FakeService {
        pub fn with(students: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                students: Mutex::new(students),
                ..Self::default()
            })
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    pub fn student_json(id: &str, name: &str, grade: f64) -> Value {
        json!({
            "id": id,
            "name": name,
            "cpf": "12345678901",
            "email": format!("{}@example.org", name.to_lowercase()),
            "grade": grade,
            "createdAt": "2024-03-01T12:00:00Z",
            "updatedAt": "2024-03-01T12:00:00Z"
        })
    }

    async fn list(State(service): Service) -> Json<Value> {
        service.record("list".to_string());
        Json(Value::Array(service.students.lock().unwrap().clone()))
    }

    async fn get_one(State(service): Service, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
        service.record(format!("get {id}"));
        service
            .students
            .lock()
            .unwrap()
            .iter()
            .find(|s| s["id"].as_str() == Some(id.as_str()))
            .cloned()
            .map(Json)
            .ok_or(StatusCode::NOT_FOUND)
    }

    async fn create(State(service): Service, Json(body): Json<Value>) -> Json<Value> {
        service.record(format!("create {}", body["cpf"].as_str().unwrap_or_default()));
        let mut created = student_json(
            "new",
            body["name"].as_str().unwrap_or_default(),
            body["grade"].as_f64().unwrap_or_default(),
        );
        created["cpf"] = body["cpf"].clone();
        created["email"] = Value::Null;
        service.students.lock().unwrap().push(created.clone());
        Json(created)
    }

    async fn change(
        State(service): Service,
        Path(field): Path<String>,
        Json(body): Json<Value>,
    ) -> Result<Json<Value>, StatusCode> {
        let id = body["id"].as_str().unwrap_or_default().to_string();
        service.record(format!("change_{field} {id}"));

        let value = if field == "grade" {
            json!(body["grade"].as_str().and_then(|g| g.parse::<f64>().ok()))
        } else {
            body[field.as_str()].clone()
        };

        let mut students = service.students.lock().unwrap();
        let student = students
            .iter_mut()
            .find(|s| s["id"].as_str() == Some(id.as_str()))
            .ok_or(StatusCode::NOT_FOUND)?;
        student[field.as_str()] = value;
        Ok(Json(student.clone()))
    }

    async fn deactivate(State(service): Service, Path(id): Path<String>) -> StatusCode {
        service.record(format!("deactivate {id}"));
        service
            .students
            .lock()
            .unwrap()
            .retain(|s| s["id"].as_str() != Some(id.as_str()));
        StatusCode::OK
    }

    pub fn state_for(base_url: String) -> TweedState {
        let dates = DateLocaleConfig::new(
            "UTC".to_string(),
            "en-GB".to_string(),
            "h23".to_string(),
            "gregorian".to_string(),
        )
        .unwrap();
        TweedState::new(RuntimeConfiguration::from_parts(ApiConfig::new(base_url), dates)).unwrap()
    }

    pub async fn state_backed_by(service: Arc<FakeService>) -> TweedState {
        let app = Router::new()
            .route("/student", get(list).post(create))
            .route("/student/{id}", get(get_one).delete(deactivate))
            .route("/student/change/{field}", patch(change))
            .with_state(service);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        state_for(format!("http://{addr}"))
    }

    ///nothing listens on the address it points at
    pub async fn state_without_service() -> TweedState {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        state_for(format!("http://{addr}"))
    }

    pub async fn body_of(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn page_shell_swaps_error_responses() {
        let state = state_for("http://127.0.0.1:1".to_string());
        let page = state.render(maud::html! { p {"hi"} }).into_string();
        assert!(page.contains("htmx-config"));
        assert!(page.contains("[45]..") && page.contains("&quot;swap&quot;:true,&quot;error&quot;:true"));
    }
}
