use std::{sync::Arc, time::Duration};

use it_tickets::{api, db, http, summary, view};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub struct Client {
    inner: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Serves a fresh dashboard over in-memory storage on an ephemeral port.
    pub async fn spawn() -> Self {
        Self::spawn_with(summary::Requester::disabled()).await
    }

    pub async fn spawn_with(summary: summary::Requester) -> Self {
        let db_client = db::Client::new(db::MemoryStorage::default());
        let state = http::AppState::load(
            db_client,
            view::SharedSecret::default(),
            summary,
        )
        .await
        .expect("failed to load app state");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind listener");
        let addr = listener.local_addr().expect("no local address");
        tokio::spawn(async move {
            axum::serve(listener, http::router(Arc::new(state)))
                .await
                .expect("server failed");
        });

        Self {
            inner: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
        }
    }

    /// Spawns and signs in as admin.
    pub async fn admin() -> Self {
        let client = Self::spawn().await;
        client.login("itadmin").await.expect("admin login failed");
        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn view(&self) -> api::view::State {
        self.inner
            .get(self.url("/view"))
            .send()
            .await
            .expect("failed to send a request")
            .json::<api::view::State>()
            .await
            .expect("failed to get a response")
    }

    pub async fn post_view(&self, action: &str) -> api::view::State {
        self.inner
            .post(self.url(&format!("/view/{action}")))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .expect("wrong status code")
            .json::<api::view::State>()
            .await
            .expect("failed to get a response")
    }

    pub async fn login(
        &self,
        password: &str,
    ) -> Result<api::view::State, (StatusCode, String)> {
        let resp = self
            .inner
            .post(self.url("/view/login"))
            .json(&json!({ "password": password }))
            .send()
            .await
            .expect("failed to send a request");
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.expect("failed to get a response");
            return Err((status, body));
        }
        Ok(resp
            .json::<api::view::State>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn get_tickets(
        &self,
        search: &str,
        status: &str,
    ) -> Result<api::ticket::List, StatusCode> {
        Ok(self
            .inner
            .get(self.url("/ticket"))
            .query(&[("search", search), ("status", status)])
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::ticket::List>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn get_ticket(
        &self,
        id: &api::ticket::Id,
    ) -> Result<api::Ticket, StatusCode> {
        Ok(self
            .inner
            .get(self.url(&format!("/ticket/{id}")))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::Ticket>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn stats(&self) -> api::ticket::Stats {
        self.inner
            .get(self.url("/stats"))
            .send()
            .await
            .expect("failed to send a request")
            .json::<api::ticket::Stats>()
            .await
            .expect("failed to get a response")
    }

    pub async fn add_ticket(
        &self,
        body: Value,
    ) -> Result<api::Ticket, (StatusCode, String)> {
        let resp = self
            .inner
            .post(self.url("/ticket"))
            .json(&body)
            .send()
            .await
            .expect("failed to send a request");
        Self::ticket_or_error(resp).await
    }

    pub async fn edit_ticket(
        &self,
        id: &api::ticket::Id,
        body: Value,
    ) -> Result<api::Ticket, (StatusCode, String)> {
        let resp = self
            .inner
            .put(self.url(&format!("/ticket/{id}")))
            .json(&body)
            .send()
            .await
            .expect("failed to send a request");
        Self::ticket_or_error(resp).await
    }

    pub async fn delete_ticket(
        &self,
        id: &api::ticket::Id,
        confirm: bool,
    ) -> StatusCode {
        self.inner
            .delete(self.url(&format!("/ticket/{id}")))
            .query(&[("confirm", confirm)])
            .send()
            .await
            .expect("failed to send a request")
            .status()
    }

    pub async fn summary(&self) -> String {
        self.inner
            .post(self.url("/summary"))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .expect("wrong status code")
            .text()
            .await
            .expect("failed to get a response")
    }

    /// Gives up on the summary request after `timeout`.
    pub async fn summary_within(
        &self,
        timeout: Duration,
    ) -> Result<String, reqwest::Error> {
        self.inner
            .post(self.url("/summary"))
            .timeout(timeout)
            .send()
            .await?
            .text()
            .await
    }

    async fn ticket_or_error(
        resp: reqwest::Response,
    ) -> Result<api::Ticket, (StatusCode, String)> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.expect("failed to get a response");
            return Err((status, body));
        }
        Ok(resp
            .json::<api::Ticket>()
            .await
            .expect("failed to get a response"))
    }
}

/// A complete, valid creation form.
pub fn new_ticket(issue: &str) -> Value {
    json!({
        "date": "2025-01-01",
        "company": "PT Padma Jarka Abadi",
        "pic": "GILANG PERMANA",
        "issue": issue,
        "type": "HW",
        "status": "PENDING",
        "priority": "NORMAL",
        "photoUrl": "blob:http://localhost/photo",
    })
}
