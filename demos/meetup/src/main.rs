//! Plans one game night from start to finish and prints the result.
//!
//! Storage follows `GAMENIGHT_STORAGE` / `GAMENIGHT_DATABASE`; logging
//! follows `RUST_LOG`.

use chrono::{Duration, Utc};
use gamenight::prelude::*;

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

/// Registers a small group, schedules a session and fills it up.
async fn plan(app: &Gamenight) -> Result<SessionDetails, GamenightError> {
    let ann = app.players.create("Ann", "ann@x.com", "Passw0rd").await?;
    let bob = app.players.create("Bob", "bob@x.com", "Passw0rd").await?;
    let cid = app.players.create("Cid", "cid@x.com", "Passw0rd").await?;

    let chess = app
        .games
        .create("Chess", "ChessCo", &[Genre::Puzzle, Genre::TurnBased])
        .await?;

    let host = app.caller(Some(&format!("Bearer {}", ann.token))).await?;
    let date = Utc::now() + Duration::days(7);
    let session = app.sessions.create(date, chess, 2, host).await?;

    app.sessions.add_player(session, bob.player_id).await?;
    match app.sessions.add_player(session, cid.player_id).await {
        Err(SessionError::Full) => {
            tracing::info!(%session, "session full, growing it by one seat");
            let grow = SessionUpdate {
                capacity: Some(3),
                ..Default::default()
            };
            app.sessions.update(session, host, grow).await?;
            app.sessions.add_player(session, cid.player_id).await?;
        }
        other => other?,
    }

    Ok(app.sessions.info(session).await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    gamenight::telemetry::init();

    let app = Gamenight::builder()
        .config(GamenightConfig::from_env()?)
        .build()?;

    let details = plan(&app).await?;
    println!("{}", serde_json::to_string_pretty(&details)?);
    Ok(())
}
