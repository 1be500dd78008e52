//! User account use-case tests

mod common;

use tokio_test::assert_ok;

use curlarc_common::{Error, FieldUpdate, UserId};
use curlarc_teams::UserUpdate;

use crate::common::{full_end, TestApp};

mod test_sign_up {
    use super::*;

    #[tokio::test]
    async fn test_sign_up_normalizes_email() {
        let t = TestApp::new();
        t.app.identity.register_token("tok", UserId::new("uid-1"), None);

        let user = t
            .app
            .users
            .sign_up("tok", "Skip".to_string(), "  Skip@Example.COM")
            .await
            .unwrap();
        assert_eq!(user.id, UserId::new("uid-1"));
        assert_eq!(user.email, "skip@example.com");
        assert_eq!(t.app.users.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let t = TestApp::new();
        let err = t
            .app
            .users
            .sign_up("forged", "Skip".to_string(), "skip@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication(_)), "got {err:?}");
        assert!(t.app.users.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeat_sign_up_keeps_provider_account() {
        let t = TestApp::new();
        let user = t.sign_up("skip").await.unwrap();

        let err = t
            .app
            .users
            .sign_up(&TestApp::token_for("skip"), "Skip".to_string(), &user.email)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert!(!t.app.identity.was_deleted(&user.id));
        assert_ok!(t.app.users.authorize(&TestApp::token_for("skip")).await);
    }

    #[tokio::test]
    async fn test_duplicate_email_removes_provider_account() {
        let t = TestApp::new();
        t.sign_up("skip").await.unwrap();
        t.app
            .identity
            .register_token("tok-2", UserId::new("uid-2"), None);

        let err = t
            .app
            .users
            .sign_up("tok-2", "Other".to_string(), "skip@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)), "got {err:?}");
        assert!(t.app.identity.was_deleted(&UserId::new("uid-2")));
    }

    #[tokio::test]
    async fn test_storage_failure_removes_provider_account() {
        let t = TestApp::new();
        t.app.identity.register_token("tok", UserId::new("uid-1"), None);
        t.app.store.set_write_failure(true);

        let err = t
            .app
            .users
            .sign_up("tok", "Skip".to_string(), "skip@example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)), "got {err:?}");
        assert!(t.app.identity.was_deleted(&UserId::new("uid-1")));
    }

    #[tokio::test]
    async fn test_concurrent_sign_up_keeps_provider_account() {
        let t = TestApp::interleaved();
        let token = TestApp::token_for("skip");
        t.app.identity.register_token(
            token.clone(),
            UserId::new("skip"),
            Some("skip@example.com".to_string()),
        );

        let (first, second) = tokio::join!(
            t.app.users.sign_up(&token, "Skip".to_string(), "skip@example.com"),
            t.app.users.sign_up(&token, "Skip".to_string(), "skip@example.com"),
        );

        let outcomes = [first, second];
        assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
        let err = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert!(matches!(err, Error::Conflict(_)), "got {err:?}");
        assert!(!t.app.identity.was_deleted(&UserId::new("skip")));
        assert_ok!(t.app.users.authorize(&token).await);
    }

    #[tokio::test]
    async fn test_invalid_profile_is_rejected_before_storage() {
        let t = TestApp::new();
        t.app.identity.register_token("tok", UserId::new("uid-1"), None);

        let err = t
            .app
            .users
            .sign_up("tok", "Skip".to_string(), "not-an-email")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(matches!(
            t.app.users.get_user(&UserId::new("uid-1")).await,
            Err(Error::NotFound(_))
        ));
    }
}

mod test_authorize {
    use super::*;

    #[tokio::test]
    async fn test_authorize_resolves_user() {
        let t = TestApp::new();
        let user = t.sign_up("skip").await.unwrap();

        let resolved = t
            .app
            .users
            .authorize(&TestApp::token_for("skip"))
            .await
            .unwrap();
        assert_eq!(resolved, user);
    }

    #[tokio::test]
    async fn test_authorize_before_sign_up() {
        let t = TestApp::new();
        t.app.identity.register_token("tok", UserId::new("uid-1"), None);

        let err = t.app.users.authorize("tok").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_authorize_while_provider_is_down() {
        let t = TestApp::new();
        t.sign_up("skip").await.unwrap();
        t.app.identity.set_unavailable(true);

        let err = t
            .app
            .users
            .authorize(&TestApp::token_for("skip"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
    }
}

mod test_update_user {
    use super::*;

    #[tokio::test]
    async fn test_partial_profile_update() {
        let t = TestApp::new();
        let user = t.sign_up("skip").await.unwrap();

        let updated = t
            .app
            .users
            .update_user(
                &user.id,
                UserUpdate {
                    name: FieldUpdate::Set("Skip Sato".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Skip Sato");
        assert_eq!(updated.email, user.email);
    }

    #[tokio::test]
    async fn test_email_taken_by_another_user() {
        let t = TestApp::new();
        let skip = t.sign_up("skip").await.unwrap();
        let lead = t.sign_up("lead").await.unwrap();

        let err = t
            .app
            .users
            .update_user(
                &lead.id,
                UserUpdate {
                    email: FieldUpdate::Set(skip.email.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(t.app.users.get_user(&lead.id).await.unwrap().email, lead.email);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let t = TestApp::new();
        let user = t.sign_up("skip").await.unwrap();

        let err = t
            .app
            .users
            .update_user(
                &user.id,
                UserUpdate {
                    name: FieldUpdate::Set(String::new()),
                    email: FieldUpdate::Set("new@example.com".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(t.app.users.get_user(&user.id).await.unwrap(), user);
    }
}

mod test_delete_user {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_deleted_user_loses_team_access() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let player = t.sign_up("player").await.unwrap();
        t.join(&team.id, &owner, &player).await.unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();

        assert_ok!(t.app.users.delete_user(&player.id).await);

        assert!(t.app.identity.was_deleted(&player.id));
        assert!(!t.app.memberships.is_member(&player.id, &team.id).await.unwrap());
        assert_eq!(
            t.app.teams.members_of(&owner.id, &team.id).await.unwrap(),
            vec![owner.clone()]
        );

        let err = t
            .app
            .records
            .append_ends_data(&player.id, &record.id, vec![full_end()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let err = t
            .app
            .users
            .authorize(&TestApp::token_for("player"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[tokio::test]
    async fn test_storage_failure_keeps_account() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();

        t.app.store.set_write_failure(true);
        let err = t.app.users.delete_user(&owner.id).await.unwrap_err();
        assert!(matches!(err, Error::Persistence(_)), "got {err:?}");
        t.app.store.set_write_failure(false);

        assert!(!t.app.identity.was_deleted(&owner.id));
        assert_ok!(t.app.users.authorize(&TestApp::token_for("owner")).await);
        assert!(t.app.memberships.is_member(&owner.id, &team.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_provider_outage_after_local_delete() {
        let t = TestApp::new();
        let user = t.sign_up("skip").await.unwrap();
        t.app.identity.set_unavailable(true);

        assert!(t.app.users.delete_user(&user.id).await.is_err());
        assert!(matches!(
            t.app.users.get_user(&user.id).await,
            Err(Error::NotFound(_))
        ));
    }
}
