//! API Combat HTTP client.
//!
//! See <https://apicombat.com/api-docs/v1>.

use std::sync::atomic::{AtomicU32, Ordering};

use clap::{crate_name, crate_version};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use self::error::ApiError;
use self::models::*;
use crate::prelude::*;

pub mod error;
pub mod models;

pub const DEFAULT_BASE_URL: &str = "https://apicombat.com/api/v1";

const USER_AGENT: &str = concat!(crate_name!(), "/", crate_version!());

static COUNTER: AtomicU32 = AtomicU32::new(1);

/// Calls of the remote game service the client makes.
#[async_trait]
pub trait GameApi: Send + Sync {
    async fn register(&self, request: &RegisterRequest<'_>) -> Result<AuthResponse>;

    async fn login(&self, request: &LoginRequest<'_>) -> Result<AuthResponse>;

    /// Attaches the bearer token to the subsequent calls.
    fn authorize(&mut self, token: String);

    async fn get_profile(&self) -> Result<Profile>;

    async fn get_available_units(&self) -> Result<Vec<ShopUnit>>;

    async fn get_roster(&self) -> Result<Vec<RosterUnit>>;

    async fn configure_team(&self, request: &TeamRequest) -> Result<Team>;

    async fn list_teams(&self) -> Result<Vec<Team>>;

    async fn queue_battle(&self, request: &QueueRequest) -> Result<QueueStatus>;

    async fn get_battle_status(&self, battle_id: &Id) -> Result<BattleStatus>;

    async fn get_battle_results(&self, battle_id: &Id) -> Result<BattleResult>;
}

#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    base_url: Arc<Url>,
    token: Option<Arc<String>>,
}

impl Client {
    pub fn new(base_url: &str, timeout: StdDuration) -> Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("invalid base URL `{}`", base_url))?;
        if base_url.cannot_be_a_base() {
            bail!("`{}` cannot be a base URL", base_url);
        }
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build the HTTP client")?;
        Ok(Self {
            client,
            base_url: Arc::new(base_url),
            token: None,
        })
    }

    /// Appends the segments to the base URL, percent-encoding each of them.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(segment) = segments
            .iter()
            .find(|segment| matches!(**segment, "" | "." | ".."))
        {
            bail!("`{}` is not a valid path segment", segment);
        }
        let mut url = Url::clone(&self.base_url);
        url.path_segments_mut()
            .map_err(|_| anyhow!("`{}` cannot be a base URL", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url(segments)?;
        let request = self.authorized(self.client.get(url.clone()))?;
        self.send(Method::GET, url, request).await
    }

    async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        let request = self.authorized(self.client.post(url.clone()))?.json(body);
        self.send(Method::POST, url, request).await
    }

    /// Posts without the bearer token, for the authentication endpoints.
    async fn post_anonymously<B, T>(&self, segments: &[&str], body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        let request = self.client.post(url.clone()).json(body);
        self.send(Method::POST, url, request).await
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| anyhow!("not authenticated: log in or register first"))?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        request: RequestBuilder,
    ) -> Result<T> {
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        let start_instant = Instant::now();
        debug!(id, %method, %url, "sending…");
        let response = request
            .send()
            .await
            .with_context(|| format!("`{} {}` request has failed", method, url))?;
        let status = response.status();
        debug!(id, %status, elapsed = ?start_instant.elapsed(), "received");

        if !status.is_success() {
            let body = error_body(id, response.text().await);
            return Err(ApiError::new(method, url.path(), status, &body).into());
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("could not parse the `{} {}` response", method, url))
    }
}

/// Unwraps the body of a failed response, the status alone still makes a usable error.
fn error_body<E: std::fmt::Display>(id: u32, body: Result<String, E>) -> String {
    body.unwrap_or_else(|error| {
        warn!(id, "failed to read the error response body: {:#}", error);
        String::new()
    })
}

#[async_trait]
impl GameApi for Client {
    #[instrument(skip_all, fields(username = request.username))]
    async fn register(&self, request: &RegisterRequest<'_>) -> Result<AuthResponse> {
        self.post_anonymously(&["auth", "register"], request).await
    }

    #[instrument(skip_all, fields(email = request.email))]
    async fn login(&self, request: &LoginRequest<'_>) -> Result<AuthResponse> {
        self.post_anonymously(&["auth", "login"], request).await
    }

    fn authorize(&mut self, token: String) {
        self.token = Some(Arc::new(token));
    }

    #[instrument(skip_all)]
    async fn get_profile(&self) -> Result<Profile> {
        self.get(&["player", "profile"]).await
    }

    #[instrument(skip_all)]
    async fn get_available_units(&self) -> Result<Vec<ShopUnit>> {
        self.get(&["player", "roster", "available"]).await
    }

    #[instrument(skip_all)]
    async fn get_roster(&self) -> Result<Vec<RosterUnit>> {
        self.get(&["player", "roster"]).await
    }

    #[instrument(skip_all, fields(name = %request.name, n_units = request.unit_ids.len()))]
    async fn configure_team(&self, request: &TeamRequest) -> Result<Team> {
        self.post(&["team", "configure"], request).await
    }

    #[instrument(skip_all)]
    async fn list_teams(&self) -> Result<Vec<Team>> {
        self.get(&["team", "list"]).await
    }

    #[instrument(skip_all, fields(team_id = %request.team_id, mode = %request.mode))]
    async fn queue_battle(&self, request: &QueueRequest) -> Result<QueueStatus> {
        self.post(&["battle", "queue"], request).await
    }

    #[instrument(skip_all, fields(battle_id = %battle_id))]
    async fn get_battle_status(&self, battle_id: &Id) -> Result<BattleStatus> {
        self.get(&["battle", "status", &battle_id.to_string()]).await
    }

    #[instrument(skip_all, fields(battle_id = %battle_id))]
    async fn get_battle_results(&self, battle_id: &Id) -> Result<BattleResult> {
        self.get(&["battle", "results", &battle_id.to_string()]).await
    }
}

#[cfg(test)]
mod tests {
    use poem::http::StatusCode;
    use poem::listener::{Acceptor, Listener, TcpListener};
    use poem::web::{Json, Path};
    use poem::{get, handler, post, IntoResponse, Request, Response, Route, Server};
    use serde_json::{json, Value};

    use super::*;

    const TOKEN: &str = "secret-token";

    /// Starts the mock service on a random local port and returns its base URL.
    async fn spawn_service() -> Result<String> {
        let app = Route::new()
            .at("/auth/register", post(register_handler))
            .at("/auth/login", post(login_handler))
            .at("/player/profile", get(profile_handler))
            .at("/player/roster/available", get(available_units_handler))
            .at("/player/roster", get(roster_handler))
            .at("/team/configure", post(configure_team_handler))
            .at("/team/list", get(list_teams_handler))
            .at("/battle/queue", post(queue_battle_handler))
            .at("/battle/status/:battle_id", get(battle_status_handler))
            .at("/battle/results/:battle_id", get(battle_results_handler))
            .at("/headers", get(headers_handler))
            .at("/slow", get(slow_handler));
        let acceptor = TcpListener::bind("127.0.0.1:0").into_acceptor().await?;
        let address = acceptor
            .local_addr()
            .first()
            .and_then(|address| address.as_socket_addr().copied())
            .ok_or_else(|| anyhow!("the mock service has no socket address"))?;
        tokio::spawn(Server::new_with_acceptor(acceptor).run(app));
        Ok(format!("http://{}", address))
    }

    fn is_authorized(request: &Request) -> bool {
        request.header("Authorization") == Some(format!("Bearer {}", TOKEN).as_str())
    }

    #[handler]
    fn register_handler(request: &Request, Json(body): Json<Value>) -> Response {
        if body["username"] != "rs-tester" || request.header("Authorization").is_some() {
            return StatusCode::BAD_REQUEST.into_response();
        }
        Json(json!({"playerId": 42, "token": TOKEN}))
            .with_status(StatusCode::CREATED)
            .into_response()
    }

    #[handler]
    fn login_handler(Json(body): Json<Value>) -> Response {
        if body["password"] != "RsStarter1!tester" {
            return Json(json!({"error": "Invalid credentials"}))
                .with_status(StatusCode::UNAUTHORIZED)
                .into_response();
        }
        Json(json!({"playerId": "p-42", "token": TOKEN})).into_response()
    }

    #[handler]
    fn profile_handler(request: &Request) -> Response {
        if !is_authorized(request) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Json(json!({
            "username": "rs-tester",
            "level": 3,
            "currency": 1250,
            "rating": 1016,
            "rosterCount": 4,
            "teamCount": 1,
        }))
        .into_response()
    }

    #[handler]
    fn available_units_handler(request: &Request) -> Response {
        if !is_authorized(request) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        // language=JSON
        Json(json!([
            {"name": "Squire", "class": "Warrior", "health": 120, "attack": 14, "defense": 12, "speed": 8, "unlockCost": 0, "alreadyOwned": true},
            {"id": 7, "name": "Acolyte", "class": "Healer", "health": 80, "attack": 6, "defense": 6, "speed": 10, "unlockCost": 250, "alreadyOwned": false},
        ]))
        .into_response()
    }

    #[handler]
    fn roster_handler(request: &Request) -> Response {
        if !is_authorized(request) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Json(json!([
            {"id": "u-1", "name": "Squire", "class": "Warrior", "level": 2, "health": 130, "attack": 15, "defense": 13, "speed": 8, "abilities": [{"name": "Taunt"}]},
        ]))
        .into_response()
    }

    #[handler]
    fn configure_team_handler(request: &Request, Json(body): Json<Value>) -> Response {
        if !is_authorized(request) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        let units = body["unitIds"].clone();
        Json(json!({"id": "t-1", "name": body["name"], "units": units}))
            .with_status(StatusCode::CREATED)
            .into_response()
    }

    #[handler]
    fn list_teams_handler(request: &Request) -> Response {
        if !is_authorized(request) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Json(json!([{"id": 5, "name": "Rust Starter Team", "units": [{"id": "u-1"}]}])).into_response()
    }

    #[handler]
    fn queue_battle_handler() -> Response {
        Json(json!({"error": "Daily battle limit reached"}))
            .with_status(StatusCode::TOO_MANY_REQUESTS)
            .into_response()
    }

    #[handler]
    fn battle_status_handler(request: &Request, Path(battle_id): Path<String>) -> Response {
        if !is_authorized(request) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Json(json!({"battleId": battle_id, "status": "Completed"})).into_response()
    }

    /// Echoes the decoded battle ID back as the winner.
    #[handler]
    fn battle_results_handler(request: &Request, Path(battle_id): Path<String>) -> Response {
        if !is_authorized(request) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
        Json(json!({"turns": 9, "winnerId": battle_id, "battleLog": ["Turn 1"]})).into_response()
    }

    #[handler]
    fn headers_handler(request: &Request) -> Json<Value> {
        Json(json!({"userAgent": request.header("User-Agent")}))
    }

    #[handler]
    async fn slow_handler() -> Json<Value> {
        tokio::time::sleep(StdDuration::from_secs(5)).await;
        Json(json!({}))
    }

    async fn authorized_client() -> Result<Client> {
        let mut client = Client::new(&spawn_service().await?, StdDuration::from_secs(5))?;
        client.authorize(TOKEN.to_string());
        Ok(client)
    }

    #[test]
    fn url_ok() -> Result {
        let client = Client::new("https://apicombat.com/api/v1/", StdDuration::from_secs(1))?;
        assert_eq!(
            client.url(&["battle", "status", "b-1"])?.as_str(),
            "https://apicombat.com/api/v1/battle/status/b-1",
        );
        assert_eq!(
            client.url(&["battle", "status", "../x?y#z"])?.as_str(),
            "https://apicombat.com/api/v1/battle/status/..%2Fx%3Fy%23z",
        );
        Ok(())
    }

    #[test]
    fn dot_segment_error() -> Result {
        let client = Client::new("https://apicombat.com/api/v1", StdDuration::from_secs(1))?;
        assert!(client.url(&["battle", "status", ".."]).is_err());
        assert!(client.url(&["battle", "status", ""]).is_err());
        Ok(())
    }

    #[test]
    fn error_body_ok() {
        assert_eq!(error_body(1, Ok::<_, anyhow::Error>("oops".to_string())), "oops");
        assert_eq!(error_body(2, Err::<String, _>(anyhow!("connection reset"))), "");
    }

    #[tokio::test]
    async fn register_ok() -> Result {
        let client = Client::new(&spawn_service().await?, StdDuration::from_secs(5))?;
        let response = client
            .register(&RegisterRequest {
                username: "rs-tester",
                email: "rs-tester@example.com",
                password: "RsStarter1!tester",
            })
            .await?;
        assert_eq!(response.player_id, Id::Integer(42));
        assert_eq!(response.token, TOKEN);
        Ok(())
    }

    #[tokio::test]
    async fn login_rejected_ok() -> Result {
        let client = Client::new(&spawn_service().await?, StdDuration::from_secs(5))?;
        let error = client
            .login(&LoginRequest {
                email: "rs-tester@example.com",
                password: "wrong",
            })
            .await
            .err()
            .ok_or_else(|| anyhow!("login should fail"))?;
        let error = error
            .downcast_ref::<ApiError>()
            .ok_or_else(|| anyhow!("expected an API error"))?;
        assert_eq!(error.status, reqwest::StatusCode::UNAUTHORIZED);
        assert_eq!(error.path, "/auth/login");
        assert_eq!(error.body["error"], "Invalid credentials");
        Ok(())
    }

    #[tokio::test]
    async fn get_profile_ok() -> Result {
        let player = authorized_client().await?.get_profile().await?;
        assert_eq!(player.username, "rs-tester");
        assert_eq!(player.level, 3);
        assert_eq!(player.team_count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn get_available_units_ok() -> Result {
        let units = authorized_client().await?.get_available_units().await?;
        assert_eq!(units.len(), 2);
        assert!(units[0].already_owned);
        assert_eq!(units[1].id, Some(Id::from(7_i64)));
        assert_eq!(units[1].class_, "Healer");
        Ok(())
    }

    #[tokio::test]
    async fn get_roster_ok() -> Result {
        let units = authorized_client().await?.get_roster().await?;
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].id, Id::from("u-1"));
        assert_eq!(units[0].abilities[0].name, "Taunt");
        Ok(())
    }

    #[tokio::test]
    async fn list_teams_ok() -> Result {
        let teams = authorized_client().await?.list_teams().await?;
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].id, Id::from(5_i64));
        Ok(())
    }

    #[tokio::test]
    async fn bearer_token_required() -> Result {
        let mut client = Client::new(&spawn_service().await?, StdDuration::from_secs(5))?;
        client.authorize("stale-token".to_string());
        let error = client.list_teams().await.err().ok_or_else(|| anyhow!("should fail"))?;
        let error = error
            .downcast_ref::<ApiError>()
            .ok_or_else(|| anyhow!("expected an API error"))?;
        assert_eq!(error.status, reqwest::StatusCode::UNAUTHORIZED);
        assert_eq!(error.path, "/team/list");
        Ok(())
    }

    #[tokio::test]
    async fn user_agent_ok() -> Result {
        let client = authorized_client().await?;
        let headers: Value = client.get(&["headers"]).await?;
        assert_eq!(
            headers["userAgent"],
            format!("apicombat-client/{}", env!("CARGO_PKG_VERSION")),
        );
        Ok(())
    }

    #[tokio::test]
    async fn timeout_error() -> Result {
        let mut client = Client::new(&spawn_service().await?, StdDuration::from_millis(100))?;
        client.authorize(TOKEN.to_string());
        let error = client
            .get::<Value>(&["slow"])
            .await
            .err()
            .ok_or_else(|| anyhow!("the request should time out"))?;
        assert!(error
            .downcast_ref::<reqwest::Error>()
            .map_or(false, reqwest::Error::is_timeout));
        Ok(())
    }

    #[tokio::test]
    async fn unauthenticated_call_fails_locally() -> Result {
        // Nothing listens there, the call must not get as far as connecting.
        let client = Client::new("http://127.0.0.1:9", StdDuration::from_secs(1))?;
        let error = client.get_profile().await.err().ok_or_else(|| anyhow!("should fail"))?;
        assert!(error.to_string().starts_with("not authenticated"));
        Ok(())
    }

    #[tokio::test]
    async fn configure_team_ok() -> Result {
        let team = authorized_client()
            .await?
            .configure_team(&TeamRequest {
                name: "Rust Starter Team".to_string(),
                unit_ids: vec![Id::from(1_i64), Id::from(2_i64), Id::from(3_i64)],
                strategy: Strategy {
                    formation: "balanced".to_string(),
                    target_priority: vec!["lowest_hp".to_string()],
                },
            })
            .await?;
        assert_eq!(team.id, Id::from("t-1"));
        assert_eq!(team.name, "Rust Starter Team");
        assert_eq!(team.units.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn queue_battle_rejected_ok() -> Result {
        let error = authorized_client()
            .await?
            .queue_battle(&QueueRequest {
                team_id: Id::from("t-1"),
                mode: "casual".to_string(),
            })
            .await
            .err()
            .ok_or_else(|| anyhow!("queueing should fail"))?;
        let error = error
            .downcast_ref::<ApiError>()
            .ok_or_else(|| anyhow!("expected an API error"))?;
        assert!(error.is_rejection());
        assert_eq!(error.method, Method::POST);
        assert_eq!(error.path, "/battle/queue");
        Ok(())
    }

    #[tokio::test]
    async fn get_battle_status_ok() -> Result {
        let status = authorized_client()
            .await?
            .get_battle_status(&Id::from("b-7"))
            .await?;
        assert!(status.status.is_completed());
        Ok(())
    }

    #[tokio::test]
    async fn get_battle_results_ok() -> Result {
        let result = authorized_client()
            .await?
            .get_battle_results(&Id::from(7_i64))
            .await?;
        assert_eq!(result.turns, Some(9));
        assert_eq!(result.winner_id, Some(Id::from("7")));
        assert_eq!(result.battle_log().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn battle_id_with_reserved_characters_ok() -> Result {
        let client = authorized_client().await?;
        for battle_id in ["b-1?x=y#frag", "../../player/profile", "a b/c%20"] {
            let result = client.get_battle_results(&Id::from(battle_id)).await?;
            assert_eq!(result.winner_id, Some(Id::from(battle_id)));
        }
        Ok(())
    }
}
