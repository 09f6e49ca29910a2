//! Flat-file session store: one JSON array file per domain under DATA_DIR.
//!
//! The whole file is read once at startup; every save re-serializes the full
//! in-memory array and rewrites the file. That is deliberate: session volumes
//! are tiny (a child does a handful of sessions per day) and it keeps the
//! files trivially inspectable. An async RwLock serializes writers in-process;
//! there is no cross-process locking.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, instrument};

use crate::domain::{ActivityRecord, GameKind, GameRecord};

const ACTIVITIES_FILE: &str = "activities.json";
const GAMES_FILE: &str = "game_sessions.json";

pub struct SessionStore {
    dir: PathBuf,
    activities: RwLock<Vec<ActivityRecord>>,
    games: RwLock<Vec<GameRecord>>,
}

impl SessionStore {
    /// Open the store under `dir`, loading whatever is already on disk.
    /// A corrupt file is logged and treated as empty; we never delete it.
    #[instrument(level = "info", skip_all, fields(dir = %dir.display()))]
    pub fn open(dir: PathBuf) -> Self {
        let activities: Vec<ActivityRecord> = load_array(&dir.join(ACTIVITIES_FILE));
        let games: Vec<GameRecord> = load_array(&dir.join(GAMES_FILE));
        info!(
            target: "sessions",
            activities = activities.len(),
            games = games.len(),
            "Session store opened"
        );
        Self {
            dir,
            activities: RwLock::new(activities),
            games: RwLock::new(games),
        }
    }

    #[instrument(level = "debug", skip(self, rec), fields(id = %rec.id, user = %rec.user_id))]
    pub async fn append_activity(&self, rec: ActivityRecord) -> Result<(), String> {
        let mut guard = self.activities.write().await;
        guard.push(rec);
        if let Err(e) = persist(&self.dir, ACTIVITIES_FILE, &*guard) {
            guard.pop();
            return Err(e);
        }
        Ok(())
    }

    #[instrument(level = "debug", skip(self, rec), fields(id = %rec.id, user = %rec.user_id))]
    pub async fn append_game(&self, rec: GameRecord) -> Result<(), String> {
        let mut guard = self.games.write().await;
        guard.push(rec);
        if let Err(e) = persist(&self.dir, GAMES_FILE, &*guard) {
            guard.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Activities for one user, newest first.
    pub async fn activities_for(&self, user_id: &str) -> Vec<ActivityRecord> {
        let guard = self.activities.read().await;
        let mut out: Vec<ActivityRecord> =
            guard.iter().filter(|a| a.user_id == user_id).cloned().collect();
        out.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        out
    }

    /// Game attempts for one user, optionally narrowed to a game kind, newest first.
    pub async fn games_for(&self, user_id: &str, kind: Option<GameKind>) -> Vec<GameRecord> {
        let guard = self.games.read().await;
        let mut out: Vec<GameRecord> = guard
            .iter()
            .filter(|g| g.user_id == user_id && kind.map_or(true, |k| g.game == k))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        out
    }
}

fn load_array<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    if !path.exists() {
        return Vec::new();
    }
    match std::fs::read_to_string(path) {
        Ok(s) => match serde_json::from_str::<Vec<T>>(&s) {
            Ok(items) => items,
            Err(e) => {
                error!(target: "sessions", path = %path.display(), error = %e, "Corrupt store file; starting empty");
                Vec::new()
            }
        },
        Err(e) => {
            error!(target: "sessions", path = %path.display(), error = %e, "Failed to read store file; starting empty");
            Vec::new()
        }
    }
}

fn persist<T: Serialize>(dir: &Path, file: &str, items: &[T]) -> Result<(), String> {
    std::fs::create_dir_all(dir).map_err(|e| format!("create {}: {}", dir.display(), e))?;
    let path = dir.join(file);
    let contents = serde_json::to_string_pretty(items).map_err(|e| e.to_string())?;
    std::fs::write(&path, contents).map_err(|e| format!("write {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("sproutmind-store-{}", Uuid::new_v4()))
    }

    fn sample_game(user: &str, hour: u32) -> GameRecord {
        GameRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user.into(),
            game: GameKind::Memory,
            level: 2,
            score: 120,
            accuracy: 83.5,
            duration_seconds: 240,
            completed_at: Utc.with_ymd_and_hms(2026, 8, 23, hour, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn appends_survive_a_reopen() {
        let dir = scratch_dir();
        let store = SessionStore::open(dir.clone());
        store.append_game(sample_game("u1", 9)).await.expect("append");
        store.append_game(sample_game("u1", 11)).await.expect("append");
        store.append_game(sample_game("u2", 10)).await.expect("append");

        let reopened = SessionStore::open(dir.clone());
        let got = reopened.games_for("u1", None).await;
        assert_eq!(got.len(), 2);
        // Newest first.
        assert!(got[0].completed_at > got[1].completed_at);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn kind_filter_narrows_results() {
        let dir = scratch_dir();
        let store = SessionStore::open(dir.clone());
        let mut logic = sample_game("u1", 9);
        logic.game = GameKind::Logic;
        store.append_game(logic).await.expect("append");
        store.append_game(sample_game("u1", 10)).await.expect("append");

        assert_eq!(store.games_for("u1", Some(GameKind::Logic)).await.len(), 1);
        assert_eq!(store.games_for("u1", Some(GameKind::Motor)).await.len(), 0);
        assert_eq!(store.games_for("u1", None).await.len(), 2);

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn failed_persist_rolls_back_and_reports_500_material_error() {
        // A regular file where the data directory should be makes every
        // persist fail (create_dir_all refuses), without touching the store
        // internals.
        let blocker = std::env::temp_dir().join(format!("sproutmind-blocker-{}", Uuid::new_v4()));
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = SessionStore::open(blocker.clone());
        let rec = ActivityRecord {
            id: Uuid::new_v4().to_string(),
            user_id: "u1".into(),
            activity: "drawing".into(),
            category: String::new(),
            duration_seconds: 300,
            mood_before: None,
            mood_after: None,
            notes: String::new(),
            completed_at: Utc.with_ymd_and_hms(2026, 8, 23, 9, 0, 0).unwrap(),
        };

        assert!(store.append_activity(rec).await.is_err());
        // The push was rolled back: memory mirrors disk.
        assert!(store.activities_for("u1").await.is_empty());

        std::fs::remove_file(blocker).ok();
    }

    #[tokio::test]
    async fn corrupt_file_is_tolerated() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(ACTIVITIES_FILE), "not json at all").unwrap();

        let store = SessionStore::open(dir.clone());
        assert!(store.activities_for("u1").await.is_empty());
        // The corrupt file is left in place for inspection.
        assert!(dir.join(ACTIVITIES_FILE).exists());

        std::fs::remove_dir_all(dir).ok();
    }
}
