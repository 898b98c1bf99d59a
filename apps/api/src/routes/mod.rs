pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::render::handlers as render;
use crate::state::AppState;
use crate::templates::handlers as templates;

pub fn build_router(state: AppState) -> Router {
    let preview_dir = state.config.preview_dir();
    let router = Router::new()
        .route("/health", get(health::health_handler))
        // Rendering
        .route("/resume/:template_id", get(render::handle_editor))
        .route("/view-resume/:template_id", get(render::handle_view_resume))
        // Template management
        .route(
            "/upload-template",
            post(templates::handle_upload_template)
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/list-templates", get(templates::handle_list_templates));

    let router = match preview_dir {
        Some(dir) => router.nest_service("/previews", ServeDir::new(dir)),
        None => router,
    };

    router.with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, StorageConfig};
    use crate::profile::models::ExternalProfile;
    use crate::profile::{ProfileError, ProfileSource};
    use crate::templates::repository::InMemoryTemplateRepository;
    use crate::templates::store::LocalTemplateStore;

    const BOUNDARY: &str = "vitae-test-boundary";

    /// Counts fetches; fails them unless a profile is configured.
    #[derive(Default)]
    struct FakeProfiles {
        calls: AtomicUsize,
        profile: Option<ExternalProfile>,
    }

    #[async_trait]
    impl ProfileSource for FakeProfiles {
        async fn fetch(&self, _profile_id: &str) -> Result<ExternalProfile, ProfileError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.profile.clone().ok_or(ProfileError::Status(503))
        }
    }

    struct Harness {
        dir: TempDir,
        state: AppState,
        profiles: Arc<FakeProfiles>,
    }

    async fn harness(profile: Option<ExternalProfile>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(
            dir.path().join("resume_01.html"),
            "<h1>{{name}}</h1><p>{{email}}</p>",
        )
        .await
        .unwrap();
        let store = LocalTemplateStore::open(dir.path()).await.unwrap();
        let records = store.scan().await.unwrap();
        let profiles = Arc::new(FakeProfiles {
            calls: AtomicUsize::new(0),
            profile,
        });
        let state = AppState {
            config: Config {
                port: 0,
                rust_log: "debug".to_string(),
                storage: StorageConfig::Local {
                    templates_dir: dir.path().to_path_buf(),
                },
                profile_service_url: None,
                max_upload_bytes: 1024 * 1024,
            },
            templates: Arc::new(InMemoryTemplateRepository::with_records(records)),
            store: Arc::new(store),
            profiles: profiles.clone(),
        };
        Harness {
            dir,
            state,
            profiles,
        }
    }

    async fn get(state: &AppState, uri: &str) -> Response {
        build_router(state.clone())
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    fn multipart(parts: &[(&str, Option<&str>, &str)]) -> Body {
        let mut body = String::new();
        for (name, filename, content) in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            match filename {
                Some(f) => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )),
                None => body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                )),
            }
            body.push_str(content);
            body.push_str("\r\n");
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    async fn upload(state: &AppState, parts: &[(&str, Option<&str>, &str)]) -> Response {
        let request = Request::post("/upload-template")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(multipart(parts))
            .unwrap();
        build_router(state.clone()).oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(None).await;
        let json = body_json(get(&h.state, "/health").await).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "vitae-api");
    }

    #[tokio::test]
    async fn test_unknown_template_is_404_without_profile_lookup() {
        let h = harness(None).await;
        let response = get(&h.state, "/view-resume/99?profile_id=p-1").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
        assert_eq!(h.profiles.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failing_profile_renders_empty_fill() {
        let h = harness(None).await;
        let response = get(&h.state, "/view-resume/01?profile_id=p-1").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<h1></h1><p></p>");
        assert_eq!(h.profiles.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_render_without_profile_id_skips_lookup() {
        let h = harness(None).await;
        let response = get(&h.state, "/view-resume/01").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(h.profiles.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_profile_id_degrades_to_empty_fill() {
        let h = harness(None).await;
        let response = get(&h.state, "/view-resume/01?profile_id=a%2Fb").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "<h1></h1><p></p>");
        assert_eq!(h.profiles.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_template_with_malformed_profile_id_is_404() {
        let h = harness(None).await;
        for uri in ["/view-resume/99?profile_id=a%2Fb", "/resume/99?profile_id=a%2Fb"] {
            let response = get(&h.state, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        }
        assert_eq!(h.profiles.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_profile_data_is_filled() {
        let h = harness(Some(ExternalProfile {
            first_name: "Jagriti".to_string(),
            last_name: "Gaba".to_string(),
            email: Some("j@example.com".to_string()),
            ..Default::default()
        }))
        .await;
        let response = get(&h.state, "/view-resume/01?profile_id=p-1").await;
        assert_eq!(
            body_text(response).await,
            "<h1>Jagriti Gaba</h1><p>j@example.com</p>"
        );
    }

    #[tokio::test]
    async fn test_editor_shell_embeds_filled_template() {
        let h = harness(None).await;
        let response = get(&h.state, "/resume/01").await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains(r#"id="resumeCanvas""#));
        assert!(page.contains("<h1></h1><p></p>"));
    }

    #[tokio::test]
    async fn test_list_templates() {
        let h = harness(None).await;
        let json = body_json(get(&h.state, "/list-templates").await).await;
        assert_eq!(json["allowed_templates"], serde_json::json!(["01"]));
        assert_eq!(json["templates"][0]["id"], "01");
    }

    #[tokio::test]
    async fn test_upload_registers_template() {
        let h = harness(None).await;
        let response = upload(
            &h.state,
            &[
                ("resumeTemplate", Some("resume_02.html"), "<h2>{{name}}</h2>"),
                ("previewImage", Some("resume_02.png"), "PNGDATA"),
                ("name", None, "Modern"),
            ],
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["template_id"], "02");
        assert_eq!(json["allowed_templates"], serde_json::json!(["01", "02"]));

        let listed = body_json(get(&h.state, "/list-templates").await).await;
        assert_eq!(listed["templates"][1]["name"], "Modern");
        assert_eq!(listed["templates"][1]["preview_url"], "/previews/02.png");

        let preview = get(&h.state, "/previews/02.png").await;
        assert_eq!(preview.status(), StatusCode::OK);
        assert_eq!(body_text(preview).await, "PNGDATA");

        let rendered = get(&h.state, "/view-resume/02").await;
        assert_eq!(body_text(rendered).await, "<h2></h2>");
    }

    #[tokio::test]
    async fn test_upload_duplicate_id_rejected() {
        let h = harness(None).await;
        let response = upload(
            &h.state,
            &[
                ("resumeTemplate", Some("resume_01.html"), "<h2>replaced</h2>"),
                ("previewImage", Some("p.png"), "PNGDATA"),
            ],
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let rendered = get(&h.state, "/view-resume/01").await;
        assert_eq!(body_text(rendered).await, "<h1></h1><p></p>");
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_nothing_behind() {
        let h = harness(None).await;
        let previews = h.dir.path().join("previews");
        tokio::fs::remove_dir_all(&previews).await.unwrap();
        tokio::fs::write(&previews, "not a directory").await.unwrap();

        let response = upload(
            &h.state,
            &[
                ("resumeTemplate", Some("resume_05.html"), "<h2>{{name}}</h2>"),
                ("previewImage", Some("p.png"), "PNGDATA"),
            ],
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"]["code"], "STORAGE_ERROR");

        assert!(!h.dir.path().join("resume_05.html").exists());
        let listed = body_json(get(&h.state, "/list-templates").await).await;
        assert_eq!(listed["allowed_templates"], serde_json::json!(["01"]));

        // A restart rebuilds the template set from disk.
        tokio::fs::remove_file(&previews).await.unwrap();
        let reopened = LocalTemplateStore::open(h.dir.path()).await.unwrap();
        let ids: Vec<_> = reopened
            .scan()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["01"]);
    }

    #[tokio::test]
    async fn test_concurrent_uploads_of_one_id_keep_the_first_body() {
        let h = harness(None).await;
        let first = [
            ("resumeTemplate", Some("resume_07.html"), "<h2>first</h2>"),
            ("previewImage", Some("p.png"), "PNGDATA"),
        ];
        let second = [
            ("resumeTemplate", Some("resume_07.html"), "<h2>second</h2>"),
            ("previewImage", Some("p.png"), "PNGDATA"),
        ];

        let (a, b) = tokio::join!(upload(&h.state, &first), upload(&h.state, &second));
        let winner = match (a.status(), b.status()) {
            (StatusCode::OK, StatusCode::BAD_REQUEST) => "<h2>first</h2>",
            (StatusCode::BAD_REQUEST, StatusCode::OK) => "<h2>second</h2>",
            other => panic!("expected exactly one accepted upload, got {other:?}"),
        };

        let rendered = get(&h.state, "/view-resume/07").await;
        assert_eq!(body_text(rendered).await, winner);
        let on_disk = tokio::fs::read_to_string(h.dir.path().join("resume_07.html"))
            .await
            .unwrap();
        assert_eq!(on_disk, winner);
    }

    #[tokio::test]
    async fn test_upload_wrong_extension_rejected() {
        let h = harness(None).await;
        let response = upload(
            &h.state,
            &[
                ("resumeTemplate", Some("resume_03.ejs"), "<h2></h2>"),
                ("previewImage", Some("p.png"), "PNGDATA"),
            ],
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "UPLOAD_REJECTED");
        let listed = body_json(get(&h.state, "/list-templates").await).await;
        assert_eq!(listed["allowed_templates"], serde_json::json!(["01"]));
    }

    #[tokio::test]
    async fn test_upload_without_preview_rejected() {
        let h = harness(None).await;
        let response = upload(
            &h.state,
            &[("resumeTemplate", Some("resume_03.html"), "<h2></h2>")],
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"]["message"],
            "A preview image is required"
        );
    }
}
