use askama::Template;
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ffl_dashboard::api::espn::{Credentials, EspnAuth, EspnClient, EspnError};
use ffl_dashboard::fetch_dashboard_data;
use ffl_dashboard::models::{League, Matchup};
use ffl_dashboard::utils::client_id::derive_client_id;
use ffl_dashboard::utils::config::EspnDefaults;
use ffl_dashboard::utils::rate_limit::RateLimiter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::time::{Duration, Instant};
use tower_http::services::ServeDir;

#[derive(Clone)]
struct AppState {
    espn: Arc<EspnClient>,
    defaults: EspnDefaults,
    league_limiter: RateLimiter,
    scoreboard_limiter: RateLimiter,
}

#[derive(Deserialize)]
struct EspnParams {
    #[serde(rename = "leagueId")]
    league_id: Option<u32>,
    season: Option<u16>,
    week: Option<u8>,
}

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    league: League,
    week: Option<u8>,
    matchups: Vec<Matchup>,
}

struct HtmlTemplate<T>(T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

fn client_id(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    let agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());
    derive_client_id(forwarded, agent)
}

fn http_status(err: &EspnError) -> StatusCode {
    match err.kind() {
        "input" => StatusCode::BAD_REQUEST,
        "authorization" => StatusCode::UNAUTHORIZED,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(err: EspnError) -> Response {
    tracing::warn!(kind = err.kind(), "ESPN request failed: {err}");
    (
        http_status(&err),
        Json(json!({ "error": err.to_string(), "kind": err.kind() })),
    )
        .into_response()
}

fn rate_limited(limiter: &RateLimiter, identifier: &str) -> Response {
    let reset_in = limiter
        .reset_at(identifier)
        .saturating_duration_since(Instant::now());
    (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({
            "error": "Rate limit exceeded",
            "remaining": limiter.remaining(identifier),
            "resetInMs": reset_in.as_millis() as u64,
        })),
    )
        .into_response()
}

// League and scoreboard responses are fine to cache briefly
fn cached_json<T: Serialize>(value: T) -> Response {
    (
        [(header::CACHE_CONTROL, "public, max-age=60")],
        Json(value),
    )
        .into_response()
}

/// GET /api/espn/league?leagueId=&season=
async fn league(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<EspnParams>,
) -> Response {
    let id = client_id(&headers);
    if !state.league_limiter.is_allowed(&id) {
        return rate_limited(&state.league_limiter, &id);
    }

    let creds = match Credentials::resolve(params.league_id, params.season, None, &state.defaults)
    {
        Ok(creds) => creds,
        Err(err) => return error_response(err),
    };

    match state.espn.get_league(&creds).await {
        Ok(league) => cached_json(league),
        Err(err) => error_response(err),
    }
}

/// GET /api/espn/scoreboard?leagueId=&season=&week=
async fn scoreboard(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<EspnParams>,
) -> Response {
    let id = client_id(&headers);
    if !state.scoreboard_limiter.is_allowed(&id) {
        return rate_limited(&state.scoreboard_limiter, &id);
    }

    let creds = match Credentials::resolve(
        params.league_id,
        params.season,
        params.week,
        &state.defaults,
    ) {
        Ok(creds) => creds,
        Err(err) => return error_response(err),
    };

    match state.espn.get_scoreboard(&creds).await {
        Ok(scoreboard) => cached_json(scoreboard),
        Err(err) => error_response(err),
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "time": chrono::Utc::now() }))
}

/// GET / — HTML dashboard for the configured league; add ?week= to show
/// that week's matchups.
async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<EspnParams>,
) -> Response {
    let id = client_id(&headers);
    if !state.league_limiter.is_allowed(&id) {
        return rate_limited(&state.league_limiter, &id);
    }

    let creds = match Credentials::resolve(
        params.league_id,
        params.season,
        params.week,
        &state.defaults,
    ) {
        Ok(creds) => creds,
        Err(err) => return error_page(err),
    };

    match fetch_dashboard_data(&state.espn, &creds).await {
        Ok(data) => HtmlTemplate(HomeTemplate {
            league: data.league,
            week: creds.week,
            matchups: data
                .scoreboard
                .map(|s| s.matchups)
                .unwrap_or_default(),
        })
        .into_response(),
        Err(err) => error_page(err),
    }
}

fn error_page(err: EspnError) -> Response {
    tracing::warn!(kind = err.kind(), "dashboard fetch failed: {err}");
    (
        http_status(&err),
        Html(format!("<p>Failed to load dashboard: {}</p>", err)),
    )
        .into_response()
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let defaults = match EspnDefaults::from_env() {
        Ok(defaults) => defaults,
        Err(err) => {
            eprintln!("Configuration error: {err:#}");
            std::process::exit(1);
        }
    };

    let espn = Arc::new(EspnClient::new(EspnAuth::from_env()));

    // League responses are heavier, so they get the tighter budget
    let league_limiter = RateLimiter::new(30, Duration::from_secs(60));
    let scoreboard_limiter = RateLimiter::new(60, Duration::from_secs(30));

    // Sweep expired counters every 5 minutes; the handles own the tasks
    let _league_sweeper = league_limiter.spawn_sweeper(Duration::from_secs(300));
    let _scoreboard_sweeper = scoreboard_limiter.spawn_sweeper(Duration::from_secs(300));

    let state = AppState {
        espn,
        defaults,
        league_limiter,
        scoreboard_limiter,
    };

    let app = Router::new()
        // This will serve files from the "static" directory at the "/static" URL path
        .nest_service("/static", ServeDir::new("static"))
        .route("/", get(home))
        .route("/api/health", get(health))
        .route("/api/espn/league", get(league))
        .route("/api/espn/scoreboard", get(scoreboard))
        .with_state(state);

    println!("Starting web server at http://127.0.0.1:3000");
    println!("Press Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
