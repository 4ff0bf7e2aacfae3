/*
    Identity persistence integration tests

    The logged-in user survives a restart through the file slot, and a
    logout or a damaged slot file leaves the next session logged out.
*/

use regula_core::identity::{FileSlot, KeyValueSlot, RegistrationForm, StatsUpdate, USER_SLOT_KEY};
use regula_core::test_utils::{assert_ok, assert_some, demo_credentials, fast_config, test_rng};
use regula_core::Platform;
use std::sync::Arc;
use tempfile::TempDir;

async fn open(dir: &TempDir) -> Platform {
    let slot: Arc<dyn KeyValueSlot> = Arc::new(FileSlot::new(dir.path()));
    Platform::new(fast_config(), test_rng(), slot).await
}

#[tokio::test]
async fn test_registered_user_survives_restart() {
    let dir = TempDir::new().unwrap();

    let form = RegistrationForm {
        full_name: " Ana Costa ".to_string(),
        email: "ana@example.com".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
        accept_terms: true,
    };
    assert_ok(form.validate());

    let registered = {
        let platform = open(&dir).await;
        assert_ok(platform.identity().register(form.into_request()).await)
    };
    assert_eq!(registered.name, "Ana Costa");
    assert!(dir.path().join(format!("{}.json", USER_SLOT_KEY)).exists());

    let platform = open(&dir).await;
    let restored = assert_some(platform.identity().current_user().await);
    assert_eq!(restored, registered);
}

#[tokio::test]
async fn test_stats_update_is_persisted() {
    let dir = TempDir::new().unwrap();
    {
        let platform = open(&dir).await;
        assert_ok(platform.identity().login(demo_credentials()).await);
        assert_ok(
            platform
                .identity()
                .update_user_stats(StatsUpdate {
                    invites_sent: Some(9),
                    ..Default::default()
                })
                .await,
        );
    }

    let platform = open(&dir).await;
    let user = assert_some(platform.identity().current_user().await);
    assert_eq!(user.stats.invites_sent, 9);
    assert_eq!(user.stats.uploaded_apks, 12);
}

#[tokio::test]
async fn test_logout_is_persisted() {
    let dir = TempDir::new().unwrap();
    {
        let platform = open(&dir).await;
        assert_ok(platform.identity().login(demo_credentials()).await);
        assert_ok(platform.identity().logout().await);
    }

    let platform = open(&dir).await;
    assert!(!platform.identity().is_authenticated().await);
}

#[tokio::test]
async fn test_damaged_slot_file_means_logged_out() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(format!("{}.json", USER_SLOT_KEY)),
        "{\"id\": \"not a number\"",
    )
    .unwrap();

    let platform = open(&dir).await;
    assert!(!platform.identity().is_authenticated().await);

    // The next login overwrites the damaged record
    assert_ok(platform.identity().login(demo_credentials()).await);
    let reopened = open(&dir).await;
    assert!(reopened.identity().is_authenticated().await);
}
