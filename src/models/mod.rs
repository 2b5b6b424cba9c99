use serde::{Deserialize, Serialize};

/// An ESPN Fantasy Football league with its teams and rosters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: i64,
    pub name: String,
    pub teams: Vec<Team>,
}

/// A fantasy team within a league
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub location: String,
    pub nickname: String,
    pub roster: Roster,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
}

/// A single player slot on a roster. `lineup_slot_id` is absent when ESPN
/// has not assigned the player a lineup slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub player_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineup_slot_id: Option<i64>,
}

/// The head-to-head matchups for one scoring period (week)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub matchups: Vec<Matchup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub id: i64,
    pub home: MatchupSide,
    pub away: MatchupSide,
}

/// One side of a matchup. `total_points` is absent pre-kickoff; it must
/// stay absent rather than defaulting to `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchupSide {
    pub team_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_points: Option<f64>,
}
