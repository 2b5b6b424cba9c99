use anyhow::{Context, Result};
use chrono::Datelike;
use clap::Parser;
use ffl_dashboard::api::espn::{Credentials, EspnAuth, EspnClient};
use ffl_dashboard::fetch_dashboard_data;
use ffl_dashboard::utils::config::EspnDefaults;

/// Fetch an ESPN Fantasy Football league and print its teams and matchups
#[derive(Parser)]
#[command(name = "ffl-dashboard")]
struct Args {
    /// ESPN league identifier (falls back to ESPN_LEAGUE_ID)
    #[arg(long)]
    league_id: Option<u32>,

    /// Season year (falls back to ESPN_SEASON, then the current year)
    #[arg(long)]
    season: Option<u16>,

    /// Week to show the scoreboard for (1-18)
    #[arg(long)]
    week: Option<u8>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let mut defaults = EspnDefaults::from_env().context("Failed to read ESPN defaults")?;
    if defaults.season.is_none() {
        defaults.season = Some(chrono::Local::now().year() as u16);
    }

    let creds = Credentials::resolve(args.league_id, args.season, args.week, &defaults)?;

    let client = EspnClient::new(EspnAuth::from_env());
    let data = fetch_dashboard_data(&client, &creds)
        .await
        .context("Failed to fetch league data")?;

    println!("{} (league {}, season {})\n", data.league.name, data.league.id, creds.season);

    println!("Teams:");
    for team in &data.league.teams {
        println!(
            "  [{}] {} {} ({} players)",
            team.id,
            team.location,
            team.nickname,
            team.roster.entries.len()
        );
    }

    if let Some(scoreboard) = &data.scoreboard {
        println!("\nWeek {} matchups:", creds.week.unwrap_or_default());
        for m in &scoreboard.matchups {
            println!(
                "  #{} | Team {} {} vs Team {} {}",
                m.id,
                m.home.team_id,
                format_points(m.home.total_points),
                m.away.team_id,
                format_points(m.away.total_points)
            );
        }
    }

    Ok(())
}

fn format_points(points: Option<f64>) -> String {
    match points {
        Some(p) => format!("{:.1}", p),
        None => "(not played)".to_string(),
    }
}
