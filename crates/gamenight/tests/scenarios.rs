//! End-to-end scenarios, each run against both storage backends.
//!
//! Every scenario returns a transcript of what the caller observed
//! (returned values, or the error kind and message). The transcripts of
//! the in-memory and SQLite runs must be identical.

use chrono::{DateTime, Duration, TimeZone, Utc};
use gamenight::prelude::*;
use serde::Serialize;

/// A fresh in-memory app and a fresh SQLite app.
fn apps() -> [Gamenight; 2] {
    let memory = Gamenight::builder().build().unwrap();
    let sqlite = Gamenight::builder()
        .storage(StorageConfig::Sqlite {
            path: ":memory:".into(),
        })
        .build()
        .unwrap();
    [memory, sqlite]
}

fn meetup_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2099, 3, 14, 19, 30, 0).unwrap()
}

/// Records a call's outcome in a backend-independent form.
fn observe<T, E>(transcript: &mut Vec<String>, result: Result<T, E>) -> Option<T>
where
    T: Serialize,
    E: Into<GamenightError>,
{
    match result {
        Ok(value) => {
            transcript.push(serde_json::to_string(&value).unwrap());
            Some(value)
        }
        Err(err) => {
            let err: GamenightError = err.into();
            transcript.push(format!("{:?} {}: {}", err.kind(), err.status(), err));
            None
        }
    }
}

/// Runs `$scenario` on both backends and compares the transcripts.
macro_rules! assert_same_on_both_backends {
    ($scenario:ident) => {{
        let [memory, sqlite] = apps();
        let expected = $scenario(&memory).await;
        let actual = $scenario(&sqlite).await;
        assert_eq!(expected, actual, "backends disagree");
    }};
}

async fn register_three(app: &Gamenight) {
    for (name, email) in [("Ann", "ann@x.com"), ("Bob", "bob@x.com"), ("Cid", "cid@x.com")] {
        app.players.create(name, email, "Passw0rd").await.unwrap();
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_register_then_login_issues_new_token() {
    for app in apps() {
        let first = app.players.create("Ann", "ann@x.com", "Passw0rd").await.unwrap();
        assert_eq!(first.player_id, PlayerId(1));

        let second = app.players.login("Ann", "Passw0rd").await.unwrap();
        assert_eq!(second.player_id, PlayerId(1));
        assert_ne!(second.token, first.token);

        let stale = format!("Bearer {}", first.token);
        let err = app.caller(Some(&stale)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }
}

async fn duplicate_game_name_is_rejected(app: &Gamenight) -> Vec<String> {
    let mut t = Vec::new();
    let id = observe(&mut t, app.games.create("Chess", "ChessCo", &[Genre::Puzzle]).await);
    assert_eq!(id, Some(GameId(1)));

    let result = app.games.create("Chess", "Other", &[Genre::Puzzle]).await;
    assert!(matches!(result, Err(GameError::AlreadyExists)));
    observe(&mut t, result);
    t
}

#[tokio::test]
async fn test_duplicate_game_name_is_rejected() {
    assert_same_on_both_backends!(duplicate_game_name_is_rejected);
}

async fn session_fills_up_and_protects_host(app: &Gamenight) -> Vec<String> {
    let mut t = Vec::new();
    register_three(app).await;
    app.games.create("Chess", "ChessCo", &[Genre::Puzzle]).await.unwrap();

    let sessions = &app.sessions;
    let id = sessions
        .create(meetup_date(), GameId(1), 2, PlayerId(1))
        .await
        .unwrap();
    assert_eq!(id, SessionId(1));
    observe(&mut t, sessions.info(id).await);

    observe(&mut t, sessions.add_player(id, PlayerId(2)).await).unwrap();
    let details = sessions.info(id).await.unwrap();
    assert_eq!(details.player_ids(), vec![PlayerId(1), PlayerId(2)]);

    let full = sessions.add_player(id, PlayerId(3)).await;
    assert!(matches!(full, Err(SessionError::Full)));
    observe(&mut t, full);

    let host = sessions.remove_player(id, PlayerId(1)).await;
    assert!(matches!(host, Err(SessionError::HostCannotBeRemoved)));
    observe(&mut t, host);

    observe(&mut t, sessions.remove_player(id, PlayerId(2)).await).unwrap();
    let details = observe(&mut t, sessions.info(id).await).unwrap();
    assert_eq!(details.player_ids(), vec![PlayerId(1)]);
    assert_eq!(details.host_id, PlayerId(1));
    t
}

#[tokio::test]
async fn test_session_fills_up_and_protects_host() {
    assert_same_on_both_backends!(session_fills_up_and_protects_host);
}

async fn session_search_by_game(app: &Gamenight) -> Vec<String> {
    let mut t = Vec::new();
    register_three(app).await;
    app.games.create("Chess", "ChessCo", &[Genre::Puzzle]).await.unwrap();
    app.sessions
        .create(meetup_date(), GameId(1), 2, PlayerId(1))
        .await
        .unwrap();

    let found = observe(
        &mut t,
        app.sessions.search(&SessionQuery::default().with("gid", "1")).await,
    )
    .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, SessionId(1));

    let none = observe(
        &mut t,
        app.sessions.search(&SessionQuery::default().with("gid", "999")).await,
    )
    .unwrap();
    assert!(none.is_empty());

    let bad = app.sessions.search(&SessionQuery::default().with("gid", "abc")).await;
    assert!(matches!(
        bad,
        Err(SessionError::Validation(ValidationError::InvalidGameId))
    ));
    observe(&mut t, bad);
    t
}

#[tokio::test]
async fn test_session_search_by_game() {
    assert_same_on_both_backends!(session_search_by_game);
}

async fn session_capacity_update_rules(app: &Gamenight) -> Vec<String> {
    let mut t = Vec::new();
    register_three(app).await;
    let id = app
        .sessions
        .create(meetup_date(), GameId(1), 2, PlayerId(1))
        .await
        .unwrap();

    let shrink = SessionUpdate {
        capacity: Some(1),
        ..Default::default()
    };
    observe(&mut t, app.sessions.update(id, PlayerId(1), shrink).await).unwrap();

    let zero = SessionUpdate {
        capacity: Some(0),
        ..Default::default()
    };
    let result = app.sessions.update(id, PlayerId(1), zero).await;
    assert!(matches!(
        result,
        Err(SessionError::Validation(ValidationError::InvalidCapacity))
    ));
    observe(&mut t, result);

    // Growing then shrinking below the member count is refused.
    let grow = SessionUpdate {
        capacity: Some(3),
        ..Default::default()
    };
    app.sessions.update(id, PlayerId(1), grow).await.unwrap();
    app.sessions.add_player(id, PlayerId(2)).await.unwrap();
    app.sessions.add_player(id, PlayerId(3)).await.unwrap();
    let result = app.sessions.update(id, PlayerId(1), shrink).await;
    assert!(matches!(result, Err(SessionError::InvalidCapacity)));
    observe(&mut t, result);

    let not_host = app.sessions.update(id, PlayerId(2), grow).await;
    let err = GamenightError::from(not_host.unwrap_err());
    assert_eq!(err.kind(), ErrorKind::Forbidden);
    t
}

#[tokio::test]
async fn test_session_capacity_update_rules() {
    assert_same_on_both_backends!(session_capacity_update_rules);
}

async fn created_session_round_trips(app: &Gamenight) -> Vec<String> {
    let mut t = Vec::new();
    register_three(app).await;
    app.games.create("Chess", "ChessCo", &[Genre::Puzzle]).await.unwrap();

    let id = app
        .sessions
        .create(meetup_date(), GameId(1), 4, PlayerId(2))
        .await
        .unwrap();
    let details = observe(&mut t, app.sessions.info(id).await).unwrap();

    assert_eq!(details.capacity, 4);
    assert_eq!(details.host_id, PlayerId(2));
    assert_eq!(details.player_ids(), vec![PlayerId(2)]);
    assert_eq!(details.players[0].name, "Bob");
    assert_eq!(details.game.id, GameId(1));
    assert_eq!(details.game.name, "Chess");
    assert_eq!(details.date, meetup_date());
    t
}

#[tokio::test]
async fn test_created_session_round_trips() {
    assert_same_on_both_backends!(created_session_round_trips);
}

async fn pagination_past_end_is_empty(app: &Gamenight) -> Vec<String> {
    let mut t = Vec::new();
    register_three(app).await;
    for host in 1..=3 {
        app.sessions
            .create(meetup_date(), GameId(1), 2, PlayerId(host))
            .await
            .unwrap();
    }

    let page = SessionQuery::from_params([("skip", "1"), ("limit", "1")]);
    let found = observe(&mut t, app.sessions.search(&page).await).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, SessionId(2));

    let past = SessionQuery::new(Paging::new(Some(10), None));
    assert!(observe(&mut t, app.sessions.search(&past).await).unwrap().is_empty());

    let players = app.players.search_by_name("o", Paging::new(Some(5), None)).await;
    assert!(observe(&mut t, players).unwrap().is_empty());
    t
}

#[tokio::test]
async fn test_pagination_past_end_is_empty() {
    assert_same_on_both_backends!(pagination_past_end_is_empty);
}

async fn host_controls_session_lifecycle(app: &Gamenight) -> Vec<String> {
    let mut t = Vec::new();
    register_three(app).await;
    let id = app
        .sessions
        .create(meetup_date() + Duration::days(1), GameId(1), 3, PlayerId(1))
        .await
        .unwrap();
    app.sessions.add_player(id, PlayerId(2)).await.unwrap();

    observe(&mut t, app.sessions.add_player(id, PlayerId(2)).await);
    observe(&mut t, app.sessions.remove_player(id, PlayerId(3)).await);
    observe(&mut t, app.sessions.delete(id, PlayerId(2)).await);
    observe(&mut t, app.sessions.delete(id, PlayerId(1)).await).unwrap();
    observe(&mut t, app.sessions.info(id).await);
    observe(&mut t, app.sessions.add_player(id, PlayerId(3)).await);

    let filtered = app
        .sessions
        .search(&SessionQuery::default().with("pid", "2").with("state", "open"))
        .await;
    assert!(observe(&mut t, filtered).unwrap().is_empty());
    t
}

#[tokio::test]
async fn test_host_controls_session_lifecycle() {
    assert_same_on_both_backends!(host_controls_session_lifecycle);
}

async fn invariants_hold_after_mixed_workload(app: &Gamenight) -> Vec<String> {
    let mut t = Vec::new();
    register_three(app).await;

    let mut ids = Vec::new();
    for (capacity, host) in [(1, 1), (2, 2), (3, 3)] {
        ids.push(
            app.sessions
                .create(meetup_date(), GameId(1), capacity, PlayerId(host))
                .await
                .unwrap(),
        );
    }

    // Everyone tries to join everything, some leave, some shrink.
    for &id in &ids {
        for player in 1..=4 {
            observe(&mut t, app.sessions.add_player(id, PlayerId(player)).await);
        }
        observe(&mut t, app.sessions.remove_player(id, PlayerId(3)).await);
        let shrink = SessionUpdate {
            capacity: Some(1),
            ..Default::default()
        };
        let host = app.sessions.info(id).await.unwrap().host_id;
        observe(&mut t, app.sessions.update(id, host, shrink).await);
    }

    let all = app.sessions.search(&SessionQuery::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    for session in all {
        let members = session.player_ids();
        assert!(members.len() as i64 <= session.capacity);
        assert!(members.contains(&session.host_id));
        let mut unique = members.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), members.len());
    }

    let dup = app.players.create("Ann", "again@x.com", "Passw0rd").await;
    assert!(matches!(dup, Err(PlayerError::AlreadyExists)));
    app.games.create("Chess", "ChessCo", &[Genre::Puzzle]).await.unwrap();
    let dup = app.games.create("cHeSs", "ChessCo", &[Genre::Puzzle]).await;
    assert!(matches!(dup, Err(GameError::AlreadyExists)));
    t
}

#[tokio::test]
async fn test_invariants_hold_after_mixed_workload() {
    assert_same_on_both_backends!(invariants_hold_after_mixed_workload);
}

#[tokio::test]
async fn test_sqlite_file_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = GamenightConfig {
        storage: StorageConfig::Sqlite {
            path: dir.path().join("gamenight.db"),
        },
    };

    let creds = {
        let app = Gamenight::builder().config(config.clone()).build().unwrap();
        let creds = app.players.create("Ann", "ann@x.com", "Passw0rd").await.unwrap();
        app.games
            .create("Age of Empires", "Ensemble Studios", &[Genre::TurnBased])
            .await
            .unwrap();
        app.sessions
            .create(meetup_date(), GameId(1), 2, creds.player_id)
            .await
            .unwrap();
        creds
    };

    let app = Gamenight::builder().config(config).build().unwrap();
    let header = format!("Bearer {}", creds.token);
    assert_eq!(app.caller(Some(&header)).await.unwrap(), creds.player_id);

    let query = GameQuery {
        name: Some("age-of-empires".into()),
        ..Default::default()
    };
    let games = app.games.search(&query).await.unwrap();
    assert_eq!(games.len(), 1);

    let details = app.sessions.info(SessionId(1)).await.unwrap();
    assert_eq!(details.players[0].name, "Ann");
    assert_eq!(details.game.name, "Age of Empires");
}
