use std::sync::Arc;

use application::{
    ChatServiceDependencies, ChatServices, DeletePolicy, LedgerSettings, ManualClock,
    PresenceSettings,
};
use config::ServerConfig;
use infrastructure::{MemoryMessageRepository, MemoryParticipantRepository};
use time::macros::datetime;
use tokio::{net::TcpListener, sync::oneshot};
use web_api::{cors_layer, router, AppState};

pub struct TestServer {
    pub base: String,
    pub client: reqwest::Client,
    pub clock: Arc<ManualClock>,
    pub services: ChatServices,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub async fn join(&self, name: &str) -> reqwest::Response {
        self.client
            .post(self.url("/participants"))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await
            .expect("join request")
    }

    pub async fn post_message(
        &self,
        user: &str,
        body: serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(self.url("/messages"))
            .header("User", user)
            .json(&body)
            .send()
            .await
            .expect("post message request")
    }

    pub async fn messages(&self, user: Option<&str>, query: &str) -> Vec<serde_json::Value> {
        let mut request = self.client.get(self.url(&format!("/messages{query}")));
        if let Some(user) = user {
            request = request.header("User", user);
        }
        request
            .send()
            .await
            .expect("list messages request")
            .json()
            .await
            .expect("messages json")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn spawn_server() -> TestServer {
    spawn_server_with(DeletePolicy::AnyParticipant).await
}

pub async fn spawn_server_with(delete_policy: DeletePolicy) -> TestServer {
    let clock = Arc::new(ManualClock::new(datetime!(2024-05-01 10:00:00 UTC)));
    let services = ChatServices::new(ChatServiceDependencies {
        participant_repository: Arc::new(MemoryParticipantRepository::new()),
        message_repository: Arc::new(MemoryMessageRepository::new()),
        clock: clock.clone(),
        presence: PresenceSettings::default(),
        ledger: LedgerSettings {
            delete_policy,
            ..LedgerSettings::default()
        },
    });

    let server_config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 5000,
        cors_origins: vec!["*".into()],
    };
    let app = router(AppState::new(&services)).layer(cors_layer(&server_config));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .ok();
    });

    TestServer {
        base: format!("http://{}", addr),
        client: reqwest::Client::new(),
        clock,
        services,
        shutdown: Some(shutdown_tx),
    }
}
