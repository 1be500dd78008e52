//! Record use-case tests
//!
//! Authorization of record writes, validation before persistence, partial
//! updates and read visibility.

mod common;

use chrono::{Duration, Utc};
use serde_json::json;
use tokio_test::assert_ok;

use curlarc_common::{Error, FieldUpdate, RecordId};
use curlarc_records::{MatchResult, NewRecord, RecordUpdate};

use crate::common::{end_with, full_end, shot, TestApp};

mod test_authorization_gate {
    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_non_member_writes_are_forbidden() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let outsider = t.sign_up("outsider").await.unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();

        let results = vec![
            t.app
                .records
                .append_ends_data(&outsider.id, &record.id, vec![full_end()])
                .await
                .map(|_| ()),
            t.app
                .records
                .update_record(
                    &outsider.id,
                    &record.id,
                    RecordUpdate {
                        place: FieldUpdate::Set("Elsewhere".to_string()),
                        ..Default::default()
                    },
                )
                .await
                .map(|_| ()),
            t.app
                .records
                .set_visibility(&outsider.id, &record.id, true)
                .await
                .map(|_| ()),
            t.app.records.delete_record(&outsider.id, &record.id).await,
            t.app
                .records
                .create_record(&outsider.id, &team.id, NewRecord::default())
                .await
                .map(|_| ()),
        ];

        for result in results {
            assert!(matches!(result, Err(Error::Forbidden(_))), "got {result:?}");
        }

        let stored = t.app.records.get_record(&owner.id, &record.id).await.unwrap();
        assert_eq!(stored, record);
        assert_eq!(t.app.records.list_records(&owner.id, &team.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pending_invitee_cannot_write() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let invitee = t.sign_up("invitee").await.unwrap();
        t.app
            .memberships
            .invite_users(&team.id, &owner.id, &[invitee.email.clone()])
            .await
            .unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();

        let err = t
            .app
            .records
            .append_ends_data(&invitee.id, &record.id, vec![full_end()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_authorization_uses_the_records_team() {
        let t = TestApp::new();
        let (owner_a, team_a) = t.team_with_creator("alice", "Rink A").await.unwrap();
        let (owner_b, _team_b) = t.team_with_creator("bob", "Rink B").await.unwrap();
        let record = t.record_for(&owner_a, &team_a.id).await.unwrap();

        // Bob is a member of some team, just not the record's
        let err = t
            .app
            .records
            .set_visibility(&owner_b.id, &record.id, true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_missing_record() {
        let t = TestApp::new();
        let (owner, _) = t.team_with_creator("owner", "Rink A").await.unwrap();

        let err = t
            .app
            .records
            .append_ends_data(&owner.id, &RecordId::new("missing"), vec![full_end()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}

mod test_validation {
    use super::*;

    #[tokio::test]
    async fn test_append_requires_eight_shots_per_end() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();

        for shots in [0, 7, 9] {
            let err = t
                .app
                .records
                .append_ends_data(&owner.id, &record.id, vec![full_end(), end_with(shots)])
                .await
                .unwrap_err();
            assert!(matches!(err, Error::InvalidEndsData(_)), "{shots} shots: {err:?}");
        }

        let updated = t
            .app
            .records
            .append_ends_data(&owner.id, &record.id, vec![full_end(), full_end()])
            .await
            .unwrap();
        assert_eq!(updated.ends_data.len(), 2);

        let stored = t.app.records.get_record(&owner.id, &record.id).await.unwrap();
        assert_eq!(stored.ends_data.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_appends_keep_both_ends() {
        let t = TestApp::interleaved();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let player = t.sign_up("player").await.unwrap();
        t.join(&team.id, &owner, &player).await.unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();

        let (first, second) = tokio::join!(
            t.app.records.append_ends_data(&owner.id, &record.id, vec![full_end()]),
            t.app.records.append_ends_data(&player.id, &record.id, vec![full_end()]),
        );
        assert_ok!(first);
        assert_ok!(second);

        let stored = t.app.records.get_record(&owner.id, &record.id).await.unwrap();
        assert_eq!(stored.ends_data.len(), 2);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_rejects_out_of_range_success_rate() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();

        let mut end = full_end();
        end.shots[0] = shot(-0.1);
        let err = t
            .app
            .records
            .append_ends_data(&owner.id, &record.id, vec![end])
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_ENDS_DATA");
    }

    #[tokio::test]
    async fn test_future_dates_are_rejected() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();

        let err = t
            .app
            .records
            .create_record(
                &owner.id,
                &team.id,
                NewRecord {
                    date: Some(Utc::now() + Duration::days(1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));
        assert!(t.app.records.list_records(&owner.id, &team.id).await.unwrap().is_empty());

        let record = t.record_for(&owner, &team.id).await.unwrap();
        let err = t
            .app
            .records
            .update_record(
                &owner.id,
                &record.id,
                RecordUpdate {
                    place: FieldUpdate::Set("Tokyo".to_string()),
                    date: FieldUpdate::Set(Utc::now() + Duration::minutes(5)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));

        let stored = t.app.records.get_record(&owner.id, &record.id).await.unwrap();
        assert_eq!(stored.place, "Karuizawa");
        assert_eq!(stored.date, record.date);
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();

        t.app.store.set_write_failure(true);
        let err = t
            .app
            .records
            .append_ends_data(&owner.id, &record.id, vec![full_end()])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)), "got {err:?}");
        t.app.store.set_write_failure(false);

        let stored = t.app.records.get_record(&owner.id, &record.id).await.unwrap();
        assert!(stored.ends_data.is_empty());
    }
}

mod test_update_record {
    use super::*;

    #[tokio::test]
    async fn test_unset_fields_are_left_alone() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();

        let update: RecordUpdate = serde_json::from_value(json!({
            "result": "WIN",
            "is_red": true,
        }))
        .unwrap();
        let updated = t
            .app
            .records
            .update_record(&owner.id, &record.id, update)
            .await
            .unwrap();

        assert_eq!(updated.result, Some(MatchResult::Win));
        assert!(updated.is_red);
        assert!(!updated.is_first);
        assert_eq!(updated.enemy_team_name, "Team Granite");
        assert_eq!(updated.place, "Karuizawa");
        assert_eq!(updated.date, record.date);
    }

    #[tokio::test]
    async fn test_empty_string_is_a_real_value() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();

        let update: RecordUpdate = serde_json::from_value(json!({ "enemy_team_name": "" })).unwrap();
        let updated = t
            .app
            .records
            .update_record(&owner.id, &record.id, update)
            .await
            .unwrap();

        assert_eq!(updated.enemy_team_name, "");
        assert_eq!(updated.place, "Karuizawa");
    }

    #[tokio::test]
    async fn test_replace_ends_data() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();
        t.app
            .records
            .append_ends_data(&owner.id, &record.id, vec![full_end(), full_end()])
            .await
            .unwrap();

        let updated = t
            .app
            .records
            .update_record(
                &owner.id,
                &record.id,
                RecordUpdate {
                    ends_data: FieldUpdate::Set(vec![full_end()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.ends_data.len(), 1);
    }
}

mod test_read_visibility {
    use super::*;

    #[tokio::test]
    async fn test_public_records_are_readable_by_anyone() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let outsider = t.sign_up("outsider").await.unwrap();
        let private = t.record_for(&owner, &team.id).await.unwrap();
        let public = t.record_for(&owner, &team.id).await.unwrap();

        assert!(matches!(
            t.app.records.get_record(&outsider.id, &public.id).await,
            Err(Error::Forbidden(_))
        ));

        let published = t
            .app
            .records
            .set_visibility(&owner.id, &public.id, true)
            .await
            .unwrap();
        assert!(published.is_public);

        assert_ok!(t.app.records.get_record(&outsider.id, &public.id).await);
        assert!(matches!(
            t.app.records.get_record(&outsider.id, &private.id).await,
            Err(Error::Forbidden(_))
        ));

        let visible = t.app.records.list_records(&outsider.id, &team.id).await.unwrap();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, public.id);

        let indices = t
            .app
            .records
            .list_record_indices(&owner.id, &team.id)
            .await
            .unwrap();
        assert_eq!(indices.len(), 2);
        assert!(indices.iter().all(|i| i.enemy_team_name == "Team Granite"));
    }

    #[tokio::test]
    async fn test_delete_record() {
        let t = TestApp::new();
        let (owner, team) = t.team_with_creator("owner", "Rink A").await.unwrap();
        let record = t.record_for(&owner, &team.id).await.unwrap();

        assert_ok!(t.app.records.delete_record(&owner.id, &record.id).await);
        assert!(matches!(
            t.app.records.get_record(&owner.id, &record.id).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            t.app.records.delete_record(&owner.id, &record.id).await,
            Err(Error::NotFound(_))
        ));
    }
}
