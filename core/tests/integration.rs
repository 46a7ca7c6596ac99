//! End-to-end session and mission flow against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `GalaxyApp` over real
//! HTTP with a ureq-backed `Transport`. Validates that request building,
//! response parsing, token handling and the refetching cache work together
//! with the actual server.

use std::cell::RefCell;
use std::net::SocketAddr;

use galaxy_core::notice::{self, Notice};
use galaxy_core::{
    ApiError, Config, FileSessionStore, GalaxyApp, HttpMethod, HttpRequest, HttpResponse,
    MemorySessionStore, SessionStore, Transport,
};

/// Executes requests with ureq and remembers the last one sent.
struct UreqTransport {
    agent: ureq::Agent,
    last: RefCell<Option<HttpRequest>>,
}

impl UreqTransport {
    /// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
    /// responses are returned as data rather than `Err`, letting the core
    /// client handle status interpretation.
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            last: RefCell::new(None),
        }
    }

    fn last_request(&self) -> HttpRequest {
        self.last.borrow().clone().expect("no request sent yet")
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        *self.last.borrow_mut() = Some(req.clone());

        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(&req.path), &req.headers).call(),
            (HttpMethod::Delete, _) => {
                with_headers(self.agent.delete(&req.path), &req.headers).call()
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(&req.path), &req.headers).send(body.as_bytes())
            }
            (HttpMethod::Post, None) => {
                with_headers(self.agent.post(&req.path), &req.headers).send_empty()
            }
        };
        let mut response = result.map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

/// Start the mock server on a random port in a background thread.
fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn session_and_mission_lifecycle() {
    let addr = start_server();
    let config = Config::new(format!("http://{addr}"));
    let mut app = GalaxyApp::new(&config, MemorySessionStore::new(), UreqTransport::new());

    // Step 1: signed out, listing fails without a bearer header.
    assert!(!app.is_logged_in());
    let err = app.refresh_todos().unwrap_err();
    assert!(err.is_auth());
    assert!(app.transport().last_request().header("authorization").is_none());
    assert_eq!(Notice::load_failed(&err).message, notice::LOAD_FAILED);
    assert!(app.todos().is_empty());

    // Step 2: unknown user cannot log in; the server's text comes through.
    let err = app.login("boboiboy", "galaxy").unwrap_err();
    assert_eq!(err, ApiError::Auth("Invalid username or password".to_string()));
    assert_eq!(
        Notice::auth_failed(&err).message,
        "Invalid username or password"
    );
    assert!(!app.is_logged_in());

    // Step 3: register, which logs the new account in.
    assert!(app
        .register("boboiboy", "galaxy", Some("boboiboy@tapops.my"))
        .unwrap());
    assert!(app.is_logged_in());

    // Step 4: logout, then log in again with the new account.
    app.logout().unwrap();
    assert!(!app.is_logged_in());
    app.login("boboiboy", "galaxy").unwrap();
    let token = app.store().get().unwrap().unwrap();

    // Step 5: the list starts empty and the request carries the token.
    assert!(app.refresh_todos().unwrap().is_empty());
    assert_eq!(app.transport().last_request().bearer_token(), Some(token.as_str()));

    // Step 6: a blank field is caught before any request goes out.
    let before = app.transport().last_request();
    let err = app.add_todo("Defeat Retak'ka", "").unwrap_err();
    assert_eq!(Notice::add_failed(&err), Notice::missing_fields());
    assert_eq!(app.transport().last_request(), before);

    // Step 7: add, and the refreshed list holds exactly that mission.
    app.add_todo("Defeat Retak'ka", "Stop the boss").unwrap();
    assert_eq!(app.transport().last_request().method, HttpMethod::Get);
    let todos = app.todos().to_vec();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "Defeat Retak'ka");
    assert_eq!(todos[0].description, "Stop the boss");
    assert!(!todos[0].id.is_empty());

    // Step 8: profile reflects the registration.
    let profile = app.profile().unwrap();
    assert_eq!(profile.username, "boboiboy");
    assert_eq!(profile.email, "boboiboy@tapops.my");

    // Step 9: delete, and the id is gone after the refetch.
    app.add_todo("Train", "With Ochobot").unwrap();
    assert_eq!(app.todos().len(), 2);
    app.delete_todo(&todos[0].id).unwrap();
    assert!(app.todos().iter().all(|t| t.id != todos[0].id));
    assert_eq!(app.todos().len(), 1);

    // Step 10: deleting again is NotFound.
    let err = app.delete_todo(&todos[0].id).unwrap_err();
    assert_eq!(err, ApiError::NotFound);
    assert_eq!(Notice::delete_failed(&err).message, notice::DELETE_FAILED);

    // Step 11: after logout the next call carries no bearer header.
    app.logout().unwrap();
    let err = app.profile().unwrap_err();
    assert!(err.is_auth());
    assert!(app.transport().last_request().header("authorization").is_none());
}

#[test]
fn file_session_survives_restart() {
    let addr = start_server();
    let config = Config::new(format!("http://{addr}"));
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let mut app = GalaxyApp::new(&config, FileSessionStore::new(&path), UreqTransport::new());
        assert!(app.register("yaya", "gravity", None).unwrap());
        app.add_todo("Gravity drills", "Twice a day").unwrap();
    }

    // A fresh app over the same file is still logged in.
    let mut app = GalaxyApp::new(&config, FileSessionStore::new(&path), UreqTransport::new());
    assert!(app.is_logged_in());
    let todos = app.refresh_todos().unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "Gravity drills");

    app.logout().unwrap();
    assert!(!path.exists());
}

#[test]
fn unreachable_server_is_a_network_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let config = Config::new(format!("http://{addr}"));
    let mut app = GalaxyApp::new(
        &config,
        MemorySessionStore::with_token("whatever"),
        UreqTransport::new(),
    );

    let err = app.refresh_todos().unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(Notice::add_failed(&err).message, notice::ADD_FAILED);
}
