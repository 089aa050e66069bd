use litreview_server::entity::allocation;
use reqwest::multipart::{Form, Part};
use sea_orm::EntityTrait;
use serde_json::json;

use crate::common::{TestApp, literature_form, routes};

mod upload {
    use super::*;

    #[tokio::test]
    async fn uploaded_literature_is_listed() {
        let app = TestApp::spawn().await;

        let id = app
            .upload_literature("Paper X", "Smith", "paper.pdf", b"%PDF-1.4".to_vec())
            .await;

        let res = app.get(routes::LITERATURES).await;
        assert_eq!(res.status, 200);
        let items = res.body.as_array().unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item["id"].as_i64().unwrap(), id as i64);
        assert_eq!(item["title"], "Paper X");
        assert_eq!(item["author"], "Smith");
        assert_eq!(item["year"], "2017");
        assert_eq!(item["source"], "arXiv");
        assert_eq!(item["unit"], "Lab 1");
        assert_eq!(item["description"], "A paper");

        let file = item["file"].as_str().unwrap();
        assert!(file.ends_with(".pdf"), "unexpected handle {file}");
        assert_ne!(file, "paper.pdf");
    }

    #[tokio::test]
    async fn same_filename_twice_gets_distinct_handles() {
        let app = TestApp::spawn().await;

        let a = app
            .upload_literature("First", "A", "report.docx", b"one".to_vec())
            .await;
        let b = app
            .upload_literature("Second", "B", "report.docx", b"two".to_vec())
            .await;

        let file_a = app.literature_file(a).await;
        let file_b = app.literature_file(b).await;
        assert_ne!(file_a, file_b);

        assert_eq!(app.get(&routes::file(&file_a)).await.bytes, b"one");
        assert_eq!(app.get(&routes::file(&file_b)).await.bytes, b"two");
    }

    #[tokio::test]
    async fn missing_file_part_is_rejected() {
        let app = TestApp::spawn().await;

        let res = app
            .post_multipart(
                routes::UPLOAD_LITERATURE,
                literature_form("No file", "Nobody", "2020"),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert!(app.get(routes::LITERATURES).await.body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let app = TestApp::spawn().await;

        let form = literature_form("   ", "Smith", "2020")
            .part("file", Part::bytes(b"data".to_vec()).file_name("a.pdf"));
        let res = app.post_multipart(routes::UPLOAD_LITERATURE, form).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn omitted_text_fields_default_to_empty() {
        let app = TestApp::spawn().await;

        let form = Form::new()
            .text("title", "Only a title")
            .part("file", Part::bytes(b"data".to_vec()).file_name("a.txt"));
        let res = app.post_multipart(routes::UPLOAD_LITERATURE, form).await;
        assert_eq!(res.status, 200, "{}", res.text);

        let list = app.get(routes::LITERATURES).await;
        let item = &list.body[0];
        assert_eq!(item["title"], "Only a title");
        assert_eq!(item["author"], "");
        assert_eq!(item["unit"], "");
    }
}

mod search {
    use super::*;

    async fn seeded() -> TestApp {
        let app = TestApp::spawn().await;
        app.upload_literature("Explainable AI", "Smith", "a.pdf", b"a".to_vec())
            .await;
        app.upload_literature("Graph Theory", "Jones", "b.pdf", b"b".to_vec())
            .await;
        app.upload_literature("Fair Ranking", "smithson", "c.pdf", b"c".to_vec())
            .await;
        app
    }

    fn titles(res: &crate::common::TestResponse) -> Vec<String> {
        res.body
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn title_filter_is_case_insensitive_substring() {
        let app = seeded().await;

        let res = app.get(&format!("{}?title=ai", routes::SEARCH)).await;
        assert_eq!(res.status, 200);
        assert_eq!(titles(&res), ["Explainable AI", "Fair Ranking"]);
    }

    #[tokio::test]
    async fn filters_are_combined() {
        let app = seeded().await;

        let res = app
            .get(&format!("{}?title=ai&author=SMITH", routes::SEARCH))
            .await;
        assert_eq!(titles(&res), ["Explainable AI", "Fair Ranking"]);

        let res = app
            .get(&format!("{}?title=ai&author=jones", routes::SEARCH))
            .await;
        assert!(titles(&res).is_empty());
    }

    #[tokio::test]
    async fn empty_filters_return_everything() {
        let app = seeded().await;

        assert_eq!(titles(&app.get(routes::SEARCH).await).len(), 3);
        assert_eq!(
            titles(&app.get(&format!("{}?title=&author=", routes::SEARCH)).await).len(),
            3
        );
    }

    #[tokio::test]
    async fn percent_sign_is_matched_literally() {
        let app = TestApp::spawn().await;
        app.upload_literature("100% Recall", "A", "a.pdf", b"a".to_vec())
            .await;
        app.upload_literature("1000 Samples", "B", "b.pdf", b"b".to_vec())
            .await;

        let res = app.get(&format!("{}?title=100%25", routes::SEARCH)).await;
        assert_eq!(titles(&res), ["100% Recall"]);
    }
}

mod update_and_delete {
    use super::*;

    #[tokio::test]
    async fn update_overwrites_every_field() {
        let app = TestApp::spawn().await;
        let id = app
            .upload_literature("Draft", "Smith", "a.pdf", b"a".to_vec())
            .await;

        let res = app
            .put_json(
                &routes::literature(id),
                &json!({
                    "title": "Final",
                    "description": "Revised",
                    "source": "NeurIPS",
                    "year": "2021",
                    "author": "Smith, Jones",
                    "unit": "Lab 2",
                    "file": "replacement.pdf",
                }),
            )
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["changes"], 1);

        let list = app.get(routes::LITERATURES).await;
        let item = &list.body[0];
        assert_eq!(item["title"], "Final");
        assert_eq!(item["source"], "NeurIPS");
        assert_eq!(item["year"], "2021");
        assert_eq!(item["file"], "replacement.pdf");
    }

    #[tokio::test]
    async fn update_of_missing_id_changes_nothing() {
        let app = TestApp::spawn().await;

        let res = app
            .put_json(
                &routes::literature(404),
                &json!({"title": "Ghost", "file": "x.pdf"}),
            )
            .await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["changes"], 0);
    }

    #[tokio::test]
    async fn update_rejects_blank_title() {
        let app = TestApp::spawn().await;
        let id = app
            .upload_literature("Draft", "Smith", "a.pdf", b"a".to_vec())
            .await;

        let res = app
            .put_json(&routes::literature(id), &json!({"title": "", "file": "a.pdf"}))
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn delete_keeps_the_stored_document() {
        let app = TestApp::spawn().await;
        let id = app
            .upload_literature("Temporary", "Smith", "a.pdf", b"keep me".to_vec())
            .await;
        let file = app.literature_file(id).await;

        let res = app.delete(&routes::literature(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["changes"], 1);
        assert!(app.get(routes::LITERATURES).await.body.as_array().unwrap().is_empty());

        let download = app.get(&routes::file(&file)).await;
        assert_eq!(download.status, 200);
        assert_eq!(download.bytes, b"keep me");

        let again = app.delete(&routes::literature(id)).await;
        assert_eq!(again.body["changes"], 0);
    }

    #[tokio::test]
    async fn allocated_literature_can_be_deleted() {
        let app = TestApp::spawn().await;
        let id = app
            .upload_literature("Assigned", "Smith", "a.pdf", b"pdf".to_vec())
            .await;
        app.allocate(2, id, "2024-05-01T10:00").await; // seeded `user`

        let res = app.delete(&routes::literature(id)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["changes"], 1);

        // The allocation row survives with a dangling reference, so it no
        // longer appears in the joined listing.
        let allocations = app.get(routes::ALLOCATIONS).await;
        assert_eq!(allocations.status, 200);
        assert!(allocations.body.as_array().unwrap().is_empty());

        let rows = allocation::Entity::find().all(&app.db).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].literature_id, id);
    }
}
