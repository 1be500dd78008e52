// CurlARC - Local demo session
//
// Wires the application over the in-memory store and plays through one
// match: a team is formed, a player is invited and joins, and a record is
// written end by end.

use chrono::{Duration, Utc};
use tracing::{error, info};

use curlarc_common::config::Config;
use curlarc_common::UserId;
use curlarc_records::{Coordinate, DataPerEnd, NewRecord, Shot, Stones, SHOTS_PER_END};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    curlarc_app::telemetry::init_tracing(&config)?;

    info!("Starting CurlARC local session");

    let app = curlarc_app::create_app(&config).map_err(|e| {
        error!("Failed to create application: {}", e);
        e
    })?;

    app.identity.register_token(
        "local-skip",
        UserId::new("local-skip"),
        Some("skip@curlarc.local".to_string()),
    );
    app.identity.register_token(
        "local-lead",
        UserId::new("local-lead"),
        Some("lead@curlarc.local".to_string()),
    );

    let skip = app
        .users
        .sign_up("local-skip", "Skip".to_string(), "skip@curlarc.local")
        .await?;
    let lead = app
        .users
        .sign_up("local-lead", "Lead".to_string(), "lead@curlarc.local")
        .await?;

    let team = app.teams.create_team(&skip.id, "Rink A".to_string()).await?;
    app.memberships
        .invite_users(&team.id, &skip.id, &[lead.email.clone()])
        .await?;
    app.memberships.accept_invitation(&team.id, &lead.id).await?;

    let record = app
        .records
        .create_record(
            &skip.id,
            &team.id,
            NewRecord {
                enemy_team_name: Some("Team Granite".to_string()),
                place: Some("Local rink".to_string()),
                date: Some(Utc::now() - Duration::hours(2)),
                ..Default::default()
            },
        )
        .await?;

    for (end, shooter) in [(1, &skip), (2, &lead)] {
        let updated = app
            .records
            .append_ends_data(&shooter.id, &record.id, vec![sample_end(end)])
            .await?;
        info!(record_id = %updated.id, ends = updated.ends_data.len(), "End recorded");
    }

    // A short end is refused and leaves the record as it was
    let mut short = sample_end(3);
    short.shots.pop();
    if let Err(e) = app
        .records
        .append_ends_data(&lead.id, &record.id, vec![short])
        .await
    {
        info!(error_code = e.error_code(), "Short end rejected");
    }

    let indices = app.records.list_record_indices(&skip.id, &team.id).await?;
    info!(team_id = %team.id, records = indices.len(), "Session complete");
    Ok(())
}

fn sample_end(score: i32) -> DataPerEnd {
    let shots = (0..SHOTS_PER_END)
        .map(|i| Shot {
            shot_type: if i % 2 == 0 { "draw" } else { "takeout" }.to_string(),
            success_rate: 0.75,
            shooter: format!("player-{}", i / 2 + 1),
            stones: Stones {
                friend_stones: vec![Coordinate {
                    index: i as i32,
                    r: 0.5,
                    theta: 0.25 * i as f64,
                }],
                enemy_stones: Vec::new(),
            },
        })
        .collect();

    DataPerEnd { score, shots }
}
