use reqwest::multipart::{Form, Part};
use serde_json::json;

use crate::common::{TestApp, docx, para, routes};

/// Seeded account ids.
const ADMIN_ID: i32 = 1;
const USER_ID: i32 = 2;

/// One literature item allocated to the seeded `user` account.
async fn allocated() -> (TestApp, i32) {
    let app = TestApp::spawn().await;
    let lit = app
        .upload_literature("Paper X", "Smith", "paper.pdf", b"pdf".to_vec())
        .await;
    let id = app.allocate(USER_ID, lit, "2024-05-01T10:00").await;
    (app, id)
}

async fn allocation_row(app: &TestApp, id: i32) -> serde_json::Value {
    let list = app.get(routes::ALLOCATIONS).await;
    list.body
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["id"].as_i64() == Some(id as i64))
        .cloned()
        .expect("allocation should be listed")
}

mod allocate {
    use super::*;

    #[tokio::test]
    async fn listing_joins_user_and_literature() {
        let (app, id) = allocated().await;

        let res = app.get(routes::ALLOCATIONS).await;
        assert_eq!(res.status, 200);
        let rows = res.body.as_array().unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row["id"].as_i64().unwrap(), id as i64);
        assert_eq!(row["userId"], USER_ID);
        assert_eq!(row["userName"], "user");
        assert_eq!(row["literatureTitle"], "Paper X");
        assert_eq!(row["literatureAuthor"], "Smith");
        assert_eq!(row["literatureYear"], "2017");
        assert_eq!(row["meetingTime"], "2024-05-01T10:00:00");
        assert!(row["notes"].is_null());
        assert!(row["slidesFilename"].is_null());
    }

    #[tokio::test]
    async fn get_allocations_matches_allocations() {
        let (app, _) = allocated().await;
        let lit = app
            .upload_literature("Paper Y", "Jones", "y.pdf", b"y".to_vec())
            .await;
        app.allocate(ADMIN_ID, lit, "2024-06-01 09:30").await;

        let a = app.get(routes::ALLOCATIONS).await;
        let b = app.get(routes::GET_ALLOCATIONS).await;
        assert_eq!(b.status, 200);
        assert_eq!(a.body, b.body);
        assert_eq!(a.body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rfc3339_time_is_stored_in_utc() {
        let app = TestApp::spawn().await;
        let lit = app
            .upload_literature("Paper", "Smith", "p.pdf", b"p".to_vec())
            .await;
        let id = app.allocate(USER_ID, lit, "2024-05-01T12:00:00+02:00").await;

        let row = allocation_row(&app, id).await;
        assert_eq!(row["meetingTime"], "2024-05-01T10:00:00");
    }

    #[tokio::test]
    async fn invalid_meeting_time_is_rejected() {
        let app = TestApp::spawn().await;
        let lit = app
            .upload_literature("Paper", "Smith", "p.pdf", b"p".to_vec())
            .await;

        let res = app
            .post_json(
                routes::ALLOCATE,
                &json!({"userId": USER_ID, "literatureId": lit, "meetingTime": "soon"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["success"], false);
        assert!(app.get(routes::ALLOCATIONS).await.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_references_fail_generically() {
        let app = TestApp::spawn().await;
        let lit = app
            .upload_literature("Paper", "Smith", "p.pdf", b"p".to_vec())
            .await;

        for (user, literature) in [(99, lit), (USER_ID, 99)] {
            let res = app
                .post_json(
                    routes::ALLOCATE,
                    &json!({
                        "userId": user,
                        "literatureId": literature,
                        "meetingTime": "2024-05-01T10:00",
                    }),
                )
                .await;
            assert_eq!(res.status, 500);
            assert_eq!(res.body["success"], false);
            assert_eq!(res.body["message"], "Server error");
        }
        assert!(app.get(routes::ALLOCATIONS).await.body.as_array().unwrap().is_empty());
    }
}

mod attachments {
    use super::*;

    fn slides(name: &str, bytes: &[u8]) -> Form {
        Form::new().part("slidesFile", Part::bytes(bytes.to_vec()).file_name(name.to_string()))
    }

    #[tokio::test]
    async fn owner_can_set_text_notes() {
        let (app, id) = allocated().await;

        let form = Form::new().text("notes", "Attention replaces recurrence.");
        let res = app
            .put_multipart_as(&routes::allocation(id), form, Some(USER_ID))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["success"], true);
        let row = allocation_row(&app, id).await;
        assert_eq!(row["notes"], "Attention replaces recurrence.");
        assert!(row["slidesFilename"].is_null());
    }

    #[tokio::test]
    async fn notes_document_is_stored_as_text_and_discarded() {
        let (app, id) = allocated().await;
        let blobs_before = app.blob_count();

        let notes = docx(&format!("{}{}", para("First point"), para("Second point")));
        let form = Form::new().part("notes", Part::bytes(notes).file_name("takeaways.docx"));
        let res = app
            .put_multipart_as(&routes::allocation(id), form, Some(USER_ID))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        let row = allocation_row(&app, id).await;
        assert_eq!(row["notes"], "First point\n\nSecond point\n\n");
        assert_eq!(app.blob_count(), blobs_before);
    }

    #[tokio::test]
    async fn unreadable_notes_document_is_rejected_and_discarded() {
        let (app, id) = allocated().await;
        let blobs_before = app.blob_count();

        let form = Form::new().part(
            "notes",
            Part::bytes(b"garbage".to_vec()).file_name("takeaways.docx"),
        );
        let res = app
            .put_multipart_as(&routes::allocation(id), form, Some(USER_ID))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(app.blob_count(), blobs_before);
        assert!(allocation_row(&app, id).await["notes"].is_null());
    }

    #[tokio::test]
    async fn slides_only_updates_keep_notes() {
        let (app, id) = allocated().await;
        app.put_multipart_as(
            &routes::allocation(id),
            Form::new().text("notes", "keep me"),
            Some(USER_ID),
        )
        .await;

        let first = app
            .put_multipart_as(&routes::allocation(id), slides("deck.pptx", b"v1"), Some(USER_ID))
            .await;
        assert_eq!(first.status, 200);
        let after_first = allocation_row(&app, id).await;
        assert_eq!(after_first["notes"], "keep me");
        let first_handle = after_first["slidesFilename"].as_str().unwrap().to_string();

        let second = app
            .put_multipart_as(&routes::allocation(id), slides("deck.pptx", b"v2"), Some(USER_ID))
            .await;
        assert_eq!(second.status, 200);
        let after_second = allocation_row(&app, id).await;
        assert_eq!(after_second["notes"], "keep me");
        let second_handle = after_second["slidesFilename"].as_str().unwrap().to_string();

        assert_ne!(first_handle, second_handle);
        assert!(second_handle.ends_with(".pptx"));
        assert_eq!(app.get(&routes::file(&second_handle)).await.bytes, b"v2");
    }

    #[tokio::test]
    async fn empty_form_is_a_no_op() {
        let (app, id) = allocated().await;
        let before = allocation_row(&app, id).await;

        let res = app
            .put_multipart_as(
                &routes::allocation(id),
                Form::new().text("unrelated", "ignored"),
                Some(USER_ID),
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(allocation_row(&app, id).await, before);
    }

    #[tokio::test]
    async fn form_without_parts_is_a_no_op() {
        let (app, id) = allocated().await;
        let before = allocation_row(&app, id).await;

        let res = app
            .put_multipart_as(&routes::allocation(id), Form::new(), Some(USER_ID))
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["success"], true);
        assert_eq!(allocation_row(&app, id).await, before);
    }

    #[tokio::test]
    async fn non_multipart_body_is_denied_to_others_before_parsing() {
        let (app, id) = allocated().await;
        let intruder = app.create_user("mallory", "pw").await;
        let body = json!({ "notes": "overwritten" });

        let res = app
            .put_json_as(&routes::allocation(id), &body, intruder)
            .await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        let res = app.put_json_as(&routes::allocation(id), &body, USER_ID).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn other_users_are_denied_and_nothing_changes() {
        let (app, id) = allocated().await;
        let intruder = app.create_user("carol", "pw").await;
        assert_ne!(intruder, USER_ID);
        let before = allocation_row(&app, id).await;
        let blobs_before = app.blob_count();

        let form = Form::new()
            .text("notes", "overwritten")
            .part("slidesFile", Part::bytes(b"evil".to_vec()).file_name("x.pptx"));
        let res = app
            .put_multipart_as(&routes::allocation(id), form, Some(intruder))
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
        assert_eq!(allocation_row(&app, id).await, before);
        assert_eq!(app.blob_count(), blobs_before);
    }

    #[tokio::test]
    async fn admin_has_no_override() {
        let (app, id) = allocated().await;

        let res = app
            .put_multipart_as(
                &routes::allocation(id),
                Form::new().text("notes", "admin notes"),
                Some(ADMIN_ID),
            )
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn missing_allocation_and_missing_caller_are_denied() {
        let (app, id) = allocated().await;

        let res = app
            .put_multipart_as(
                &routes::allocation(id + 100),
                Form::new().text("notes", "x"),
                Some(USER_ID),
            )
            .await;
        assert_eq!(res.status, 403);

        let res = app
            .put_multipart_as(&routes::allocation(id), Form::new().text("notes", "x"), None)
            .await;
        assert_eq!(res.status, 403);
        assert!(allocation_row(&app, id).await["notes"].is_null());
    }
}
