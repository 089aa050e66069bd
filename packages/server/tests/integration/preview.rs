use crate::common::{TestApp, docx, para, routes};

mod preview {
    use super::*;

    #[tokio::test]
    async fn docx_is_rendered_as_html_page() {
        let app = TestApp::spawn().await;
        let body = format!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Findings</w:t></w:r></w:p>{}<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Bold &amp; &lt;brave&gt;</w:t></w:r></w:p>"#,
            para("Transformers scale.")
        );
        let id = app
            .upload_literature("Paper X", "Smith", "paper.docx", docx(&body))
            .await;
        let file = app.literature_file(id).await;

        let res = app.get(&routes::preview(&file)).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert!(
            res.content_type
                .as_deref()
                .is_some_and(|ct| ct.starts_with("text/html"))
        );
        assert_eq!(
            res.text,
            "<html><head><meta charset=\"utf-8\"></head><body>\
             <h1>Findings</h1><p>Transformers scale.</p>\
             <p><strong>Bold &amp; &lt;brave&gt;</strong></p>\
             </body></html>"
        );
    }

    #[tokio::test]
    async fn other_files_are_passed_through() {
        let app = TestApp::spawn().await;
        let pdf = b"%PDF-1.4 fake".to_vec();
        let id = app
            .upload_literature("Slides", "Smith", "deck.PDF", pdf.clone())
            .await;
        let file = app.literature_file(id).await;
        assert!(file.ends_with(".PDF"), "extension case is kept: {file}");

        let res = app.get(&routes::preview(&file)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(res.bytes, pdf);
    }

    #[tokio::test]
    async fn unknown_extension_is_octet_stream() {
        let app = TestApp::spawn().await;
        let id = app
            .upload_literature("Data", "Smith", "dump.zzq", b"\x00\x01".to_vec())
            .await;
        let file = app.literature_file(id).await;

        let res = app.get(&routes::preview(&file)).await;

        assert_eq!(res.status, 200);
        assert_eq!(
            res.content_type.as_deref(),
            Some("application/octet-stream")
        );
        assert_eq!(res.bytes, b"\x00\x01");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app
            .get(&routes::preview("0192f5d2c1b87c3e9a0b4c1d2e3f4a5b.docx"))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn invalid_names_are_not_found() {
        let app = TestApp::spawn().await;

        for name in [".hidden", "..%2Fsecret.txt", "a%5Cb.pdf"] {
            let res = app.get(&routes::preview(name)).await;
            assert_eq!(res.status, 404, "name {name}: {}", res.text);
        }
    }

    #[tokio::test]
    async fn broken_docx_is_a_server_error() {
        let app = TestApp::spawn().await;
        let id = app
            .upload_literature("Broken", "Smith", "broken.docx", b"not a zip".to_vec())
            .await;
        let file = app.literature_file(id).await;

        let res = app.get(&routes::preview(&file)).await;

        assert_eq!(res.status, 500);
        assert_eq!(res.body["success"], false);
    }
}

mod download {
    use super::*;

    #[tokio::test]
    async fn download_returns_raw_bytes_as_attachment() {
        let app = TestApp::spawn().await;
        let bytes = docx(&para("raw"));
        let id = app
            .upload_literature("Paper", "Smith", "paper.docx", bytes.clone())
            .await;
        let file = app.literature_file(id).await;

        let res = app.get(&routes::file(&file)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.bytes, bytes);
        let disposition = res.content_disposition.unwrap();
        assert!(
            disposition.starts_with(&format!("attachment; filename=\"{file}\"")),
            "{disposition}"
        );
    }

    #[tokio::test]
    async fn missing_download_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::file("nothing-here.pdf")).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
