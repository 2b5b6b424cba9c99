pub mod api;
pub mod models;
pub mod utils;

pub use api::*;
pub use models::*;
pub use utils::*;

use api::espn::{Credentials, EspnClient, EspnError};
use serde::{Deserialize, Serialize};

/// Everything the dashboard page shows for one league
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardData {
    pub league: models::League,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scoreboard: Option<models::Scoreboard>,
}

/// Fetch the league and, when a week is given, that week's scoreboard.
pub async fn fetch_dashboard_data(
    client: &EspnClient,
    creds: &Credentials,
) -> Result<DashboardData, EspnError> {
    let league = client.get_league(creds).await?;
    let scoreboard = match creds.week {
        Some(_) => Some(client.get_scoreboard(creds).await?),
        None => None,
    };
    Ok(DashboardData { league, scoreboard })
}
