//! ESPN Fantasy Football API client.
//!
//! Two read operations are supported: league details (teams + rosters) and
//! the weekly scoreboard. Each call is a single stateless round trip; there
//! are no retries, so callers inherit upstream latency and failures 1:1.

use serde_json::{json, Value};
use thiserror::Error;

use crate::api::schema::{self, SchemaError};
use crate::models::{League, Scoreboard};
use crate::utils::config::EspnDefaults;

const BASE_URL: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl/seasons";

/// Errors from the ESPN client, grouped by the taxonomy callers branch on.
#[derive(Debug, Error)]
pub enum EspnError {
    #[error("missing required parameter: {0}")]
    MissingParam(&'static str),
    #[error("week parameter is required for scoreboard")]
    MissingWeek,
    #[error("week must be between 1 and 18, got {0}")]
    InvalidWeek(u8),
    #[error("unauthorized: check ESPN credentials (ESPN_S2, ESPN_SWID)")]
    Unauthorized,
    #[error("ESPN API error: {status}")]
    Upstream { status: u16 },
    #[error("network error talking to ESPN: {0}")]
    Network(#[from] reqwest::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl EspnError {
    /// Stable taxonomy label, so callers can distinguish error classes
    /// without matching on message text.
    pub fn kind(&self) -> &'static str {
        match self {
            EspnError::MissingParam(_) | EspnError::MissingWeek | EspnError::InvalidWeek(_) => {
                "input"
            }
            EspnError::Unauthorized => "authorization",
            EspnError::Upstream { .. } => "upstream",
            EspnError::Network(_) => "network",
            EspnError::Schema(_) => "schema",
        }
    }
}

/// Parameters for an upstream call, resolved per-request from query
/// parameters or environment defaults. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credentials {
    pub league_id: u32,
    pub season: u16,
    pub week: Option<u8>,
}

impl Credentials {
    /// Resolve request parameters against environment defaults. Both
    /// `leagueId` and `season` must end up present; `week` stays optional
    /// but is range-checked when supplied.
    pub fn resolve(
        league_id: Option<u32>,
        season: Option<u16>,
        week: Option<u8>,
        defaults: &EspnDefaults,
    ) -> Result<Self, EspnError> {
        let league_id = league_id
            .or(defaults.league_id)
            .ok_or(EspnError::MissingParam("leagueId"))?;
        let season = season
            .or(defaults.season)
            .ok_or(EspnError::MissingParam("season"))?;
        if let Some(w) = week {
            if !(1..=18).contains(&w) {
                return Err(EspnError::InvalidWeek(w));
            }
        }
        Ok(Self {
            league_id,
            season,
            week,
        })
    }
}

/// Auth cookies for private leagues, read from `ESPN_S2` / `ESPN_SWID`.
/// Public leagues work without them.
#[derive(Debug, Clone, Default)]
pub struct EspnAuth {
    pub s2: Option<String>,
    pub swid: Option<String>,
}

impl EspnAuth {
    /// An unset variable is `None`; a set-but-empty variable is kept as-is
    /// so misconfiguration surfaces as a 401 instead of being masked.
    pub fn from_env() -> Self {
        Self {
            s2: std::env::var("ESPN_S2").ok(),
            swid: std::env::var("ESPN_SWID").ok(),
        }
    }

    fn cookie(&self) -> Option<String> {
        match (&self.s2, &self.swid) {
            (Some(s2), Some(swid)) => Some(format!("espn_s2={s2}; SWID={swid}")),
            _ => None,
        }
    }
}

pub struct EspnClient {
    client: reqwest::Client,
    base_url: String,
    auth: EspnAuth,
}

impl EspnClient {
    pub fn new(auth: EspnAuth) -> Self {
        Self::with_base_url(BASE_URL, auth)
    }

    pub fn with_base_url(base_url: impl Into<String>, auth: EspnAuth) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            auth,
        }
    }

    /// Fetch league details including teams and rosters.
    pub async fn get_league(&self, creds: &Credentials) -> Result<League, EspnError> {
        let url = format!(
            "{}/{}/segments/0/leagues/{}?view=mTeam&view=mRoster&view=mMatchup",
            self.base_url, creds.season, creds.league_id
        );
        let raw = self.fetch_json(&url).await?;
        schema::parse_league(&raw).map_err(|e| {
            tracing::warn!("league payload failed validation: {e}");
            e.into()
        })
    }

    /// Fetch the scoreboard (matchups) for a specific week. Fails before
    /// any network call if `week` is absent.
    pub async fn get_scoreboard(&self, creds: &Credentials) -> Result<Scoreboard, EspnError> {
        let week = creds.week.ok_or(EspnError::MissingWeek)?;
        let url = format!(
            "{}/{}/segments/0/leagues/{}?view=mMatchupScore&scoringPeriodId={}",
            self.base_url, creds.season, creds.league_id, week
        );
        let raw = self.fetch_json(&url).await?;
        let reshaped = reshape_schedule(&raw);
        schema::parse_scoreboard(&reshaped).map_err(|e| {
            tracing::warn!("scoreboard payload failed validation: {e}");
            e.into()
        })
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, EspnError> {
        let mut req = self.client.get(url);
        if let Some(cookie) = self.auth.cookie() {
            req = req.header(reqwest::header::COOKIE, cookie);
        }
        let res = req.send().await?;
        let status = res.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(EspnError::Unauthorized);
        }
        if !status.is_success() {
            return Err(EspnError::Upstream {
                status: status.as_u16(),
            });
        }
        // A 200 carrying something other than JSON (an HTML error page,
        // typically) is a schema problem, not a transport problem.
        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|_| SchemaError::at("$").into())
    }
}

/// Flatten the upstream's nested `schedule` representation into the
/// `{ matchups: [...] }` shape the validator expects. Values are carried
/// through untouched so the validator stays the single gate.
fn reshape_schedule(raw: &Value) -> Value {
    let matchups: Vec<Value> = raw
        .get("schedule")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|m| {
                    json!({
                        "id": m.get("id").cloned().unwrap_or(Value::Null),
                        "home": reshape_side(m.get("home")),
                        "away": reshape_side(m.get("away")),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    json!({ "matchups": matchups })
}

fn reshape_side(side: Option<&Value>) -> Value {
    json!({
        "teamId": side
            .and_then(|s| s.get("teamId"))
            .cloned()
            .unwrap_or(Value::Null),
        "totalPoints": side
            .and_then(|s| s.get("totalPoints"))
            .cloned()
            .unwrap_or(Value::Null),
    })
}
