//! Shape validation for raw ESPN Fantasy API payloads.
//!
//! The upstream API is unversioned and undocumented, so every response is
//! checked field-by-field before it is allowed to become a domain object.
//! Unknown fields are ignored; missing or mistyped required fields are
//! collected as dotted paths and reported together.

use serde_json::Value;
use thiserror::Error;

use crate::models::{League, Matchup, MatchupSide, Roster, RosterEntry, Scoreboard, Team};

/// Raised when an upstream payload does not match the expected shape.
/// `paths` lists every offending field, e.g. `teams[0].id`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema mismatch at {}", paths.join(", "))]
pub struct SchemaError {
    pub paths: Vec<String>,
}

impl SchemaError {
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            paths: vec![path.into()],
        }
    }
}

/// Parse a raw league payload into a [`League`].
///
/// Never returns a partially-populated league: if any required field is
/// missing or mistyped, the whole parse fails with every bad path listed.
pub fn parse_league(raw: &Value) -> Result<League, SchemaError> {
    let mut errs = Vec::new();

    let id = req_int(raw, "id", &mut errs);
    let name = req_str(raw, "name", &mut errs);

    let mut teams = Vec::new();
    match raw.get("teams").and_then(Value::as_array) {
        Some(arr) => {
            for (i, t) in arr.iter().enumerate() {
                if let Some(team) = parse_team(t, &format!("teams[{i}]"), &mut errs) {
                    teams.push(team);
                }
            }
        }
        None => errs.push("teams".to_string()),
    }

    if !errs.is_empty() {
        return Err(SchemaError { paths: errs });
    }
    Ok(League {
        id: id.unwrap(),
        name: name.unwrap(),
        teams,
    })
}

/// Parse a raw scoreboard payload (already reshaped to `{ matchups: [...] }`)
/// into a [`Scoreboard`].
pub fn parse_scoreboard(raw: &Value) -> Result<Scoreboard, SchemaError> {
    let mut errs = Vec::new();

    let mut matchups = Vec::new();
    match raw.get("matchups").and_then(Value::as_array) {
        Some(arr) => {
            for (i, m) in arr.iter().enumerate() {
                if let Some(matchup) = parse_matchup(m, &format!("matchups[{i}]"), &mut errs) {
                    matchups.push(matchup);
                }
            }
        }
        None => errs.push("matchups".to_string()),
    }

    if !errs.is_empty() {
        return Err(SchemaError { paths: errs });
    }
    Ok(Scoreboard { matchups })
}

fn parse_team(raw: &Value, path: &str, errs: &mut Vec<String>) -> Option<Team> {
    let before = errs.len();

    let id = req_int_at(raw, path, "id", errs);
    let location = req_str_at(raw, path, "location", errs);
    let nickname = req_str_at(raw, path, "nickname", errs);

    let mut entries = Vec::new();
    match raw
        .get("roster")
        .and_then(|r| r.get("entries"))
        .and_then(Value::as_array)
    {
        Some(arr) => {
            for (i, e) in arr.iter().enumerate() {
                if let Some(entry) =
                    parse_roster_entry(e, &format!("{path}.roster.entries[{i}]"), errs)
                {
                    entries.push(entry);
                }
            }
        }
        None => errs.push(format!("{path}.roster.entries")),
    }

    if errs.len() > before {
        return None;
    }
    Some(Team {
        id: id?,
        location: location?,
        nickname: nickname?,
        roster: Roster { entries },
    })
}

fn parse_roster_entry(raw: &Value, path: &str, errs: &mut Vec<String>) -> Option<RosterEntry> {
    let before = errs.len();
    let player_id = req_int_at(raw, path, "playerId", errs);
    let lineup_slot_id = opt_int_at(raw, path, "lineupSlotId", errs);
    if errs.len() > before {
        return None;
    }
    Some(RosterEntry {
        player_id: player_id?,
        lineup_slot_id,
    })
}

fn parse_matchup(raw: &Value, path: &str, errs: &mut Vec<String>) -> Option<Matchup> {
    let before = errs.len();
    let id = req_int_at(raw, path, "id", errs);
    let home = parse_side(raw.get("home"), &format!("{path}.home"), errs);
    let away = parse_side(raw.get("away"), &format!("{path}.away"), errs);
    if errs.len() > before {
        return None;
    }
    Some(Matchup {
        id: id?,
        home: home?,
        away: away?,
    })
}

fn parse_side(raw: Option<&Value>, path: &str, errs: &mut Vec<String>) -> Option<MatchupSide> {
    let Some(raw) = raw.filter(|v| v.is_object()) else {
        errs.push(path.to_string());
        return None;
    };
    let before = errs.len();
    let team_id = req_int_at(raw, path, "teamId", errs);
    let total_points = opt_num_at(raw, path, "totalPoints", errs);
    if errs.len() > before {
        return None;
    }
    Some(MatchupSide {
        team_id: team_id?,
        total_points,
    })
}

// Field helpers. "Required" means missing, null, or mistyped all record the
// path; "optional" means missing/null is None but a mistyped value is still
// an error.

fn req_int(raw: &Value, field: &str, errs: &mut Vec<String>) -> Option<i64> {
    match raw.get(field).and_then(Value::as_i64) {
        Some(v) => Some(v),
        None => {
            errs.push(field.to_string());
            None
        }
    }
}

fn req_str(raw: &Value, field: &str, errs: &mut Vec<String>) -> Option<String> {
    match raw.get(field).and_then(Value::as_str) {
        Some(v) => Some(v.to_string()),
        None => {
            errs.push(field.to_string());
            None
        }
    }
}

fn req_int_at(raw: &Value, path: &str, field: &str, errs: &mut Vec<String>) -> Option<i64> {
    match raw.get(field).and_then(Value::as_i64) {
        Some(v) => Some(v),
        None => {
            errs.push(format!("{path}.{field}"));
            None
        }
    }
}

fn req_str_at(raw: &Value, path: &str, field: &str, errs: &mut Vec<String>) -> Option<String> {
    match raw.get(field).and_then(Value::as_str) {
        Some(v) => Some(v.to_string()),
        None => {
            errs.push(format!("{path}.{field}"));
            None
        }
    }
}

fn opt_int_at(raw: &Value, path: &str, field: &str, errs: &mut Vec<String>) -> Option<i64> {
    match raw.get(field) {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_i64() {
            Some(v) => Some(v),
            None => {
                errs.push(format!("{path}.{field}"));
                None
            }
        },
    }
}

fn opt_num_at(raw: &Value, path: &str, field: &str, errs: &mut Vec<String>) -> Option<f64> {
    match raw.get(field) {
        None | Some(Value::Null) => None,
        Some(v) => match v.as_f64() {
            Some(v) => Some(v),
            None => {
                errs.push(format!("{path}.{field}"));
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_league() -> Value {
        json!({
            "id": 123456,
            "name": "Test League",
            "seasonId": 2024,
            "teams": [
                {
                    "id": 1,
                    "location": "City",
                    "nickname": "Team",
                    "roster": { "entries": [] }
                },
                {
                    "id": 2,
                    "location": "Other",
                    "nickname": "Squad",
                    "roster": {
                        "entries": [
                            { "playerId": 100, "lineupSlotId": 4 },
                            { "playerId": 200 }
                        ]
                    }
                }
            ]
        })
    }

    #[test]
    fn test_parse_league_preserves_teams_and_entries() {
        let league = parse_league(&sample_league()).unwrap();
        assert_eq!(league.id, 123456);
        assert_eq!(league.name, "Test League");
        assert_eq!(league.teams.len(), 2);
        assert_eq!(league.teams[0].id, 1);
        assert!(league.teams[0].roster.entries.is_empty());
        let entries = &league.teams[1].roster.entries;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].player_id, 100);
        assert_eq!(entries[0].lineup_slot_id, Some(4));
        assert_eq!(entries[1].player_id, 200);
        assert_eq!(entries[1].lineup_slot_id, None);
    }

    #[test]
    fn test_parse_league_missing_team_id() {
        let mut raw = sample_league();
        raw["teams"][0].as_object_mut().unwrap().remove("id");
        let err = parse_league(&raw).unwrap_err();
        assert_eq!(err.paths, vec!["teams[0].id"]);
    }

    #[test]
    fn test_parse_league_collects_all_paths() {
        let raw = json!({
            "name": 7,
            "teams": [{ "location": "City", "nickname": "Team", "roster": {} }]
        });
        let err = parse_league(&raw).unwrap_err();
        assert!(err.paths.contains(&"id".to_string()));
        assert!(err.paths.contains(&"name".to_string()));
        assert!(err.paths.contains(&"teams[0].id".to_string()));
        assert!(err.paths.contains(&"teams[0].roster.entries".to_string()));
    }

    #[test]
    fn test_parse_league_ignores_unknown_fields() {
        let mut raw = sample_league();
        raw["draftDetail"] = json!({ "drafted": true });
        raw["teams"][0]["logo"] = json!("https://example.com/logo.png");
        assert!(parse_league(&raw).is_ok());
    }

    #[test]
    fn test_parse_scoreboard_optional_points() {
        let raw = json!({
            "matchups": [
                {
                    "id": 1,
                    "home": { "teamId": 1, "totalPoints": 101.5 },
                    "away": { "teamId": 2 }
                }
            ]
        });
        let sb = parse_scoreboard(&raw).unwrap();
        assert_eq!(sb.matchups[0].home.total_points, Some(101.5));
        assert_eq!(sb.matchups[0].away.total_points, None);
    }

    #[test]
    fn test_parse_scoreboard_null_points_is_absent() {
        let raw = json!({
            "matchups": [
                {
                    "id": 1,
                    "home": { "teamId": 1, "totalPoints": null },
                    "away": { "teamId": 2, "totalPoints": 0.0 }
                }
            ]
        });
        let sb = parse_scoreboard(&raw).unwrap();
        assert_eq!(sb.matchups[0].home.total_points, None);
        assert_eq!(sb.matchups[0].away.total_points, Some(0.0));
    }

    #[test]
    fn test_parse_scoreboard_bad_team_id() {
        let raw = json!({
            "matchups": [
                { "id": 1, "home": { "teamId": "one" }, "away": { "teamId": 2 } }
            ]
        });
        let err = parse_scoreboard(&raw).unwrap_err();
        assert_eq!(err.paths, vec!["matchups[0].home.teamId"]);
    }

    #[test]
    fn test_parse_scoreboard_not_an_object() {
        let err = parse_scoreboard(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.paths, vec!["matchups"]);
    }
}
