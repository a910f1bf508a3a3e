//! On-disk persistence across reopen

use mystic_core::api::RuntimeConfigHandle;
use mystic_core::storage::{queries, Database, PlaybackProgress};
use mystic_core::{AppConfig, MysticClient, RuntimeConfig};

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("mystic.db");

    {
        let db = Database::new(&db_path).await.unwrap();
        let mut config = RuntimeConfig::new("https://mysticmovies.site");
        config.handshake_token = "per-launch".to_string();
        config.app.name = "MysticMovies".to_string();
        queries::save_runtime_config(db.pool(), &config).await.unwrap();

        let progress = PlaybackProgress::new("dune-2021", "Dune", 1260.0, 9300.0);
        queries::save_progress(db.pool(), &progress).await.unwrap();
        db.close().await.unwrap();
    }

    let db = Database::new(&db_path).await.unwrap();
    let saved = queries::load_runtime_config(db.pool()).await.unwrap().unwrap();
    assert_eq!(saved.app.name, "MysticMovies");
    assert!(!saved.has_handshake());

    // A client seeded from storage tries the last winning host first
    let client = MysticClient::with_runtime(
        AppConfig::builder().default_base_url("https://mysticmovies.onrender.com").build(),
        RuntimeConfigHandle::new(saved),
    )
    .unwrap();
    assert_eq!(client.candidates()[0], "https://mysticmovies.site");

    let resume = queries::list_continue_watching(db.pool(), 5).await.unwrap();
    assert_eq!(resume.len(), 1);
    assert_eq!(resume[0].title, "Dune");
    assert!(resume[0].fraction() > 0.13 && resume[0].fraction() < 0.14);
}
