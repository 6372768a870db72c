use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::Router;
use chrono::{DateTime, Utc};
use http::{header, HeaderMap, Request, StatusCode};
use http_body_util::BodyExt;
use meteo_common::models::auth::Scope;
use meteo_common::models::weather::WeatherStats;
use meteo_db::{
    MemoryStore, NewWeatherRecord, StoreError, StoreResult, WeatherHistoryStore,
    WeatherRecordRow,
};
use meteo_server::auth::TokenKeys;
use meteo_server::config::{
    AuthConfig, HistoryConfig, InitialUserConfig, RateLimitConfig, ServerConfig, WeatherConfig,
};
use meteo_server::rate_limit::RateLimiter;
use meteo_server::seed::seed_initial_users;
use meteo_server::state::AppState;
use meteo_server::web::build_router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const JWT_SECRET: &str = "integration-test-secret";

// ─── Test helpers ───────────────────────────────────────────────────────

fn initial_user(username: &str, disabled: bool) -> InitialUserConfig {
    InitialUserConfig {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "secret".to_string(),
        full_name: None,
        disabled,
    }
}

fn test_config(weather_url: Option<&str>) -> ServerConfig {
    ServerConfig {
        listen: "127.0.0.1:0".to_string(),
        db: None,
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            access_token_ttl_minutes: 30,
            initial_users: vec![initial_user("johndoe", false), initial_user("alice", true)],
        },
        rate_limit: RateLimitConfig::default(),
        weather: WeatherConfig {
            api_key: weather_url.map(|_| "test-key".to_string()),
            geocode_url: format!("{}/maps/api/geocode/json", weather_url.unwrap_or("http://127.0.0.1:9")),
            base_url: format!("{}/v1", weather_url.unwrap_or("http://127.0.0.1:9")),
            timeout_secs: 5,
            max_retries: 0,
            retry_backoff_ms: 1,
        },
        history: HistoryConfig::default(),
    }
}

async fn build_state(
    config: ServerConfig,
    history: Option<Arc<dyn WeatherHistoryStore>>,
) -> Result<AppState> {
    let store = Arc::new(MemoryStore::new());
    seed_initial_users(store.as_ref(), &config.auth.initial_users).await?;
    let history: Arc<dyn WeatherHistoryStore> = match history {
        Some(h) => h,
        None => store.clone(),
    };
    AppState::new(config, store, history)
}

async fn setup() -> Result<Router> {
    Ok(build_router(build_state(test_config(None), None).await?))
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, headers, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_request(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn login(app: &Router, username: &str, scopes: &[&str]) -> String {
    let (status, _, body) = send(
        app,
        json_request(
            "POST",
            "/login",
            json!({"username": username, "password": "secret", "scopes": scopes}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["access_token"].as_str().unwrap().to_string()
}

fn condition(base: &str, text: &str) -> Value {
    json!({"iconBaseUri": base, "description": {"text": text}, "type": "CLEAR"})
}

async fn mock_geocode_found(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/maps/api/geocode/json")
        .match_query(mockito::Matcher::UrlEncoded("address".into(), "London".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "OK",
                "results": [{"geometry": {"location": {"lat": 51.5072, "lng": -0.1276}}}]
            })
            .to_string(),
        )
        .create_async()
        .await
}

async fn mock_current(server: &mut mockito::ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/v1/currentConditions:lookup")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "isDaytime": true,
                "weatherCondition": condition("https://maps.gstatic.com/weather/v1/sunny", "Sunny"),
                "temperature": {"degrees": 18.4},
                "feelsLikeTemperature": {"degrees": 17.9},
                "relativeHumidity": 48,
                "wind": {"direction": {"cardinal": "WEST"}, "speed": {"value": 9}}
            })
            .to_string(),
        )
        .create_async()
        .await
}

/// History store whose writes always fail
struct FailingHistory;

#[async_trait]
impl WeatherHistoryStore for FailingHistory {
    async fn save_weather(&self, _: NewWeatherRecord) -> StoreResult<WeatherRecordRow> {
        Err(StoreError::Backend(anyhow::anyhow!("history unavailable")))
    }
    async fn weather_by_city(&self, _: &str, _: i64) -> StoreResult<Vec<WeatherRecordRow>> {
        Err(StoreError::Backend(anyhow::anyhow!("history unavailable")))
    }
    async fn cities_with_data(&self) -> StoreResult<Vec<String>> {
        Err(StoreError::Backend(anyhow::anyhow!("history unavailable")))
    }
    async fn weather_stats(&self, _: &str, _: i64) -> StoreResult<WeatherStats> {
        Err(StoreError::Backend(anyhow::anyhow!("history unavailable")))
    }
    async fn purge_weather_before(&self, _: DateTime<Utc>) -> StoreResult<u64> {
        Ok(0)
    }
}

// ─── Service info ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_root_and_health() -> Result<()> {
    let app = setup().await?;

    let (status, headers, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "meteo-server");

    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
    assert_eq!(
        headers["strict-transport-security"],
        "max-age=120; includeSubDomains"
    );
    assert!(headers.contains_key("x-ratelimit-limit"));

    let (status, headers, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    // excluded from the limiter
    assert!(!headers.contains_key("x-ratelimit-limit"));
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_enveloped_404() -> Result<()> {
    let app = setup().await?;
    let (status, _, body) = send(&app, get("/no/such/route")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 404);
    assert_eq!(body["error"]["path"], "/no/such/route");
    Ok(())
}

// ─── Signup and login ───────────────────────────────────────────────────

#[tokio::test]
async fn test_signup_then_login() -> Result<()> {
    let app = setup().await?;

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({
                "username": "newuser",
                "email": "New.User@Example.com",
                "password": "hunter22",
                "full_name": "New User"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "newuser");
    assert_eq!(body["data"]["email"], "new.user@example.com");
    assert_eq!(body["data"]["disabled"], false);
    assert!(body["data"].get("password_hash").is_none());

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/login",
            json!({"username": "newuser", "password": "hunter22"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "bearer");
    assert_eq!(body["data"]["expires_in"], 1800);
    assert_eq!(body["data"]["user"]["full_name"], "New User");

    let token = body["data"]["access_token"].as_str().unwrap();
    let claims = TokenKeys::new(JWT_SECRET).verify(token).unwrap();
    assert_eq!(claims.scope, "me items weather");

    let (status, _, body) = send(&app, authed("GET", "/users/me", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "newuser");
    Ok(())
}

#[tokio::test]
async fn test_duplicate_signup_rejected() -> Result<()> {
    let app = setup().await?;

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({"username": "johndoe", "email": "other@example.com", "password": "secret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Username already registered");
    assert_eq!(body["error"]["path"], "/signup");

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({"username": "johnny", "email": "johndoe@example.com", "password": "secret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Email already registered");

    // The rejected signups left nothing behind
    let (status, _, _) = send(
        &app,
        json_request("POST", "/login", json!({"username": "johnny", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_signup_field_rules() -> Result<()> {
    let app = setup().await?;

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({"username": "ab", "email": "ab@example.com", "password": "secret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);

    let (status, _, _) = send(
        &app,
        json_request(
            "POST",
            "/signup",
            json!({"username": "valid_name", "email": "not-an-email", "password": "secret"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(
        &app,
        json_request("POST", "/signup", json!({"username": "valid_name"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["message"], "Data validation error");
    assert_eq!(body["error"]["details"][0]["field"], "body");
    Ok(())
}

#[tokio::test]
async fn test_login_failures() -> Result<()> {
    let app = setup().await?;

    let (status, headers, body) = send(
        &app,
        json_request("POST", "/login", json!({"username": "johndoe", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer");
    let wrong_password = body["error"]["message"].clone();

    let (status, _, body) = send(
        &app,
        json_request("POST", "/login", json!({"username": "ghost", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], wrong_password);

    let (status, _, _) = send(
        &app,
        json_request("POST", "/login", json!({"username": "alice", "password": "secret"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = send(
        &app,
        json_request(
            "POST",
            "/login",
            json!({"username": "johndoe", "password": "secret", "scopes": ["me", "admin"]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"][0]["field"], "scopes");
    Ok(())
}

#[tokio::test]
async fn test_oauth2_form_endpoints() -> Result<()> {
    let app = setup().await?;
    let keys = TokenKeys::new(JWT_SECRET);

    // /token defaults to "me weather"
    let (status, _, body) =
        send(&app, form_request("/token", "username=johndoe&password=secret")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert!(body.get("success").is_none());
    let claims = keys.verify(body["access_token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.scope, "me weather");

    let (status, _, body) = send(
        &app,
        form_request("/login/form", "username=johndoe&password=secret&scope=items+me"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let claims = keys.verify(body["access_token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.scope, "items me");

    // /login/form refuses disabled accounts, /token does not check
    let (status, _, _) = send(
        &app,
        form_request("/login/form", "username=alice&password=secret"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, body) =
        send(&app, form_request("/token", "username=alice&password=secret")).await;
    assert_eq!(status, StatusCode::OK);
    let alice_token = body["access_token"].as_str().unwrap().to_string();

    let (status, _, _) = send(&app, authed("GET", "/users/me", &alice_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, body) = send(&app, authed("GET", "/users/status", &alice_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"], "alice");
    Ok(())
}

// ─── Scope authorization ────────────────────────────────────────────────

#[tokio::test]
async fn test_weather_scope_rejected_on_me_route() -> Result<()> {
    let app = setup().await?;
    let token = login(&app, "johndoe", &["weather"]).await;

    let (status, headers, body) = send(&app, authed("GET", "/users/me", &token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Not enough permissions");
    assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer scope=\"me\"");

    let (status, _, body) = send(&app, authed("GET", "/weather/cities", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn test_items_needs_me_and_items() -> Result<()> {
    let app = setup().await?;

    let me_only = login(&app, "johndoe", &["me"]).await;
    let (status, _, _) = send(&app, authed("GET", "/users/me/items", &me_only)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let both = login(&app, "johndoe", &["me", "items"]).await;
    let (status, _, body) = send(&app, authed("GET", "/users/me/items", &both)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["owner"], "johndoe");
    Ok(())
}

#[tokio::test]
async fn test_missing_malformed_and_expired_tokens() -> Result<()> {
    let app = setup().await?;

    let (status, headers, body) = send(&app, get("/users/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Could not validate credentials");
    assert_eq!(headers[header::WWW_AUTHENTICATE], "Bearer scope=\"me\"");

    let (status, _, _) = send(&app, authed("GET", "/session", "garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = TokenKeys::new(JWT_SECRET)
        .issue("johndoe", &[Scope::Me], chrono::Duration::seconds(-10))
        .unwrap();
    let (status, _, body) = send(&app, authed("GET", "/users/me", &expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Could not validate credentials");

    let forged = TokenKeys::new("some-other-secret")
        .issue("johndoe", &[Scope::Me], chrono::Duration::minutes(5))
        .unwrap();
    let (status, _, _) = send(&app, authed("GET", "/users/me", &forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_session_and_logout() -> Result<()> {
    let app = setup().await?;
    let token = login(&app, "johndoe", &["weather", "me"]).await;

    let (status, _, body) = send(&app, authed("GET", "/session", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "johndoe");
    assert_eq!(body["data"]["is_active"], true);
    assert_eq!(body["data"]["scopes"], json!(["me", "weather"]));

    let (status, _, body) = send(&app, authed("POST", "/logout", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "johndoe");

    let (status, _, _) = send(&app, authed("POST", "/logout/all", &token)).await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn test_update_profile() -> Result<()> {
    let app = setup().await?;
    let token = login(&app, "johndoe", &["me"]).await;

    let mut req = json_request(
        "PATCH",
        "/users/me",
        json!({"full_name": "John Doe", "password": "changed1"}),
    );
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["full_name"], "John Doe");

    let (status, _, _) = send(
        &app,
        json_request("POST", "/login", json!({"username": "johndoe", "password": "changed1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let mut req = json_request("PATCH", "/users/me", json!({"email": "alice@example.com"}));
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    let (status, _, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Email already registered");

    let mut req = json_request("PATCH", "/users/me", json!({}));
    req.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    let (status, _, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

// ─── Rate limiting ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_rate_limit_rejects_after_cap() -> Result<()> {
    let state = build_state(test_config(None), None)
        .await?
        .with_rate_limiter(RateLimiter::new(3, Duration::from_secs(60)));
    let app = build_router(state);

    for expected_remaining in ["2", "1", "0"] {
        let (status, headers, _) = send(&app, get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["x-ratelimit-limit"], "3");
        assert_eq!(headers["x-ratelimit-remaining"], expected_remaining);
        let reset: i64 = headers["x-ratelimit-reset"].to_str()?.parse()?;
        assert!(reset > Utc::now().timestamp());
    }

    let (status, headers, body) = send(&app, get("/session")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(headers["x-ratelimit-remaining"], "0");
    assert!(headers.contains_key(header::RETRY_AFTER));
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], 429);
    assert_eq!(body["error"]["path"], "/session");

    // excluded paths still pass
    let (status, _, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

// ─── Weather proxy ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_current_weather_recorded_in_history() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _geo = mock_geocode_found(&mut server).await;
    let _cur = mock_current(&mut server).await;

    let app = build_router(build_state(test_config(Some(&server.url())), None).await?);
    let token = login(&app, "johndoe", &["weather"]).await;

    let (status, _, body) = send(&app, authed("GET", "/weather/current?city=London", &token)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["temperature"], 18.4);
    assert_eq!(body["data"]["condition"], "Sunny");
    assert_eq!(
        body["data"]["icon"],
        "https://maps.gstatic.com/weather/v1/sunny.svg"
    );
    assert_eq!(body["data"]["wind_direction"], "WEST");

    let (status, _, body) = send(
        &app,
        authed("GET", "/weather/history?city=london&limit=5", &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["forecast_type"], "current");

    let (_, _, body) = send(&app, authed("GET", "/weather/cities", &token)).await;
    assert_eq!(body["data"], json!(["London"]));

    let (status, _, body) = send(
        &app,
        authed("GET", "/weather/stats?city=London&days=3", &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["records_count"], 1);
    assert_eq!(body["data"]["avg_temperature"], 18.4);
    assert_eq!(body["data"]["period_days"], 3);
    Ok(())
}

#[tokio::test]
async fn test_history_failure_does_not_block_weather() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _geo = mock_geocode_found(&mut server).await;
    let _cur = mock_current(&mut server).await;

    let state = build_state(
        test_config(Some(&server.url())),
        Some(Arc::new(FailingHistory)),
    )
    .await?;
    let app = build_router(state);
    let token = login(&app, "johndoe", &["weather"]).await;

    let (status, _, body) = send(&app, authed("GET", "/weather/current?city=London", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["temperature"], 18.4);

    // Reading history surfaces the failure as a generic 500
    let (status, _, body) = send(&app, authed("GET", "/weather/cities", &token)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Internal server error");
    Ok(())
}

#[tokio::test]
async fn test_unknown_city_is_404() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _geo = server
        .mock("GET", "/maps/api/geocode/json")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(json!({"status": "ZERO_RESULTS", "results": []}).to_string())
        .create_async()
        .await;

    let app = build_router(build_state(test_config(Some(&server.url())), None).await?);
    let token = login(&app, "johndoe", &["weather"]).await;

    let (status, _, body) = send(
        &app,
        authed("GET", "/weather/forecast-7days?city=Atlantis", &token),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "City 'Atlantis' not found");
    assert_eq!(body["error"]["path"], "/weather/forecast-7days");

    let (status, _, _) = send(&app, get("/coordinates?city=Atlantis")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_coordinates_is_public() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let _geo = mock_geocode_found(&mut server).await;

    let app = build_router(build_state(test_config(Some(&server.url())), None).await?);
    let (status, _, body) = send(&app, get("/coordinates?city=London")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"], "London");
    assert_eq!(body["data"]["latitude"], 51.5072);
    assert_eq!(body["data"]["longitude"], -0.1276);
    Ok(())
}

#[tokio::test]
async fn test_weather_input_errors() -> Result<()> {
    let app = setup().await?;
    let token = login(&app, "johndoe", &["weather"]).await;

    let (status, _, body) = send(&app, authed("GET", "/weather/current", &token)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["details"][0]["field"], "query");

    let (status, _, body) = send(&app, authed("GET", "/weather/current?city=R2D2", &token)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "City name contains invalid characters");

    let (status, _, _) = send(
        &app,
        authed("GET", "/weather/history?city=London&limit=0", &token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // No API key configured: provider is unavailable
    let (status, _, body) = send(&app, authed("GET", "/weather/current?city=London", &token)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], 503);
    Ok(())
}
