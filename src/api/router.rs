//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! CORS is permissive — the dashboard frontend is served from another
//! origin during development.

use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7);
/// static segments win over params, so `/patients/search` and
/// `/patients/cancer-types` stay reachable next to `/patients/:id`.
pub fn api_router(ctx: ApiContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/patients", get(endpoints::patients::list))
        .route("/patients/search", get(endpoints::patients::search))
        .route(
            "/patients/cancer-types",
            get(endpoints::patients::cancer_types),
        )
        .route("/patients/:id", get(endpoints::patients::detail))
        .route("/patients/:id", patch(endpoints::patients::update))
        .route("/dashboard/alerts", get(endpoints::dashboard::alerts))
        .route("/chat", post(endpoints::chat::chat))
        .route("/chat/summary", post(endpoints::chat::summary))
        .with_state(ctx)
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use tower::ServiceExt;

    use crate::roster::{
        CancerInfo, CareInfo, DelayFlags, OncologyDates, Patient, PatientStore,
    };
    use crate::summary::types::{ChatMessage, LlmClient, LlmError};
    use crate::summary::SummaryEngine;

    /// Counts calls and replies with a fixed script.
    struct CountingClient {
        calls: Arc<AtomicUsize>,
        reply: Result<String, String>,
    }

    impl LlmClient for CountingClient {
        fn chat(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(url) => Err(LlmError::Connection(url.clone())),
            }
        }
    }

    const GOOD_REPLY: &str = r#"{"sintomas":["febre"],"pontos_relevantes":[],"sugestao_plano_acao":["q1","q2"],"nivel_urgencia":"Alta"}"#;

    fn seeded_store() -> Arc<PatientStore> {
        let store = PatientStore::new();
        let p1 = Patient {
            id: "P1".into(),
            name: "Maria Souza".into(),
            sex: Some("F".into()),
            age: Some(62),
            oncology: OncologyDates {
                diagnosis_date: NaiveDate::from_ymd_opt(2024, 1, 1),
                staging_date: None,
                treatment_start_date: None,
            },
            cancer: CancerInfo {
                cancer_type: Some("Mama".into()),
                stage: Some("II".into()),
            },
            care: CareInfo {
                last_visit: None,
                next_visit: None,
                status: Some("em acompanhamento".into()),
            },
            flags: DelayFlags {
                delay_staging_to_treatment: true,
                days_staging_to_treatment: Some(30),
                ..Default::default()
            },
            notes: None,
            meta: Default::default(),
        };
        let p2 = Patient {
            id: "P2".into(),
            name: "João Lima".into(),
            sex: Some("M".into()),
            age: Some(70),
            oncology: OncologyDates::default(),
            cancer: CancerInfo {
                cancer_type: Some("Pulmão".into()),
                stage: None,
            },
            care: CareInfo::default(),
            flags: DelayFlags::default(),
            notes: None,
            meta: Default::default(),
        };
        store.replace_all(vec![p1, p2]).unwrap();
        Arc::new(store)
    }

    fn test_router(
        reply: Result<String, String>,
        llm_live: bool,
    ) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = CountingClient {
            calls: calls.clone(),
            reply,
        };
        let engine = Arc::new(SummaryEngine::new(Box::new(client)));
        let ctx = ApiContext::new(seeded_store(), engine, llm_live);
        (api_router(ctx), calls)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_roster_size() {
        let (router, _) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["patients"], 2);
    }

    #[tokio::test]
    async fn list_patients_in_row_order() {
        let (router, _) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router.oneshot(get_request("/patients")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json[0]["id"], "P1");
        assert_eq!(json[1]["id"], "P2");
    }

    #[tokio::test]
    async fn list_patients_respects_limit() {
        let (router, _) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router
            .oneshot(get_request("/patients?limit=1&offset=1"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["id"], "P2");
    }

    #[tokio::test]
    async fn search_filters_by_delay_flag() {
        let (router, _) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router
            .oneshot(get_request("/patients/search?only_delayed=true"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["id"], "P1");
    }

    #[tokio::test]
    async fn cancer_types_are_listed() {
        let (router, _) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router
            .oneshot(get_request("/patients/cancer-types"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json, serde_json::json!(["Mama", "Pulmão"]));
    }

    #[tokio::test]
    async fn unknown_patient_is_404() {
        let (router, _) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router.oneshot(get_request("/patients/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn patch_updates_only_named_care_fields() {
        let (router, _) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router
            .oneshot(json_request(
                "PATCH",
                "/patients/P1",
                r#"{"care":{"status":"in_treatment"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["care"]["status"], "in_treatment");
        assert_eq!(json["oncology"]["diagnosis_date"], "2024-01-01");
    }

    #[tokio::test]
    async fn patch_with_unknown_field_is_rejected() {
        let (router, _) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router
            .oneshot(json_request(
                "PATCH",
                "/patients/P1",
                r#"{"care":{"doctor":"x"}}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn dashboard_counts_delays() {
        let (router, _) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router
            .oneshot(get_request("/dashboard/alerts"))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["total_patients"], 2);
        assert_eq!(json["delayed_patients"], 1);
        assert_eq!(json["delayed_pct"], 50.0);
    }

    #[tokio::test]
    async fn summary_returns_structured_fields() {
        let (router, calls) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router
            .oneshot(json_request(
                "POST",
                "/chat/summary",
                r#"{"patient_id":"P1","message":"estou com febre"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["summary"]["symptoms"], serde_json::json!(["febre"]));
        assert_eq!(json["summary"]["urgency"], "Alta");
        assert!(json.get("error").is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn summary_for_unknown_patient_skips_the_model() {
        let (router, calls) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router
            .oneshot(json_request(
                "POST",
                "/chat/summary",
                r#"{"patient_id":"nope","message":"oi"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn summary_with_empty_message_is_400() {
        let (router, calls) = test_router(Ok(GOOD_REPLY.into()), true);
        let response = router
            .oneshot(json_request(
                "POST",
                "/chat/summary",
                r#"{"patient_id":"P1","message":"  "}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn summary_upstream_failure_is_error_shaped_not_5xx() {
        let (router, _) = test_router(Err("http://test".into()), true);
        let response = router
            .oneshot(json_request(
                "POST",
                "/chat/summary",
                r#"{"patient_id":"P1","message":"oi"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json.get("summary").is_none());
        assert_eq!(json["error"]["code"], "UPSTREAM_UNAVAILABLE");
        assert!(!json["error"]["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_malformed_reply_carries_raw_output() {
        let (router, _) = test_router(Ok("resposta solta".into()), true);
        let response = router
            .oneshot(json_request(
                "POST",
                "/chat/summary",
                r#"{"patient_id":"P1","message":"oi"}"#,
            ))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "MALFORMED_RESPONSE");
        assert_eq!(json["error"]["raw_output"], "resposta solta");
    }

    #[tokio::test]
    async fn chat_in_stub_mode_answers_without_calling_the_model() {
        let (router, calls) = test_router(Ok("ignored".into()), false);
        let response = router
            .oneshot(json_request(
                "POST",
                "/chat",
                r#"{"message":"tudo bem?","patient_id":"P1"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["used_llm"], false);
        assert!(json["answer"].as_str().unwrap().contains("tudo bem?"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn chat_with_live_model_returns_its_answer() {
        let (router, calls) = test_router(Ok("Olá! Como posso ajudar?".into()), true);
        let response = router
            .oneshot(json_request("POST", "/chat", r#"{"message":"oi"}"#))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["used_llm"], true);
        assert_eq!(json["answer"], "Olá! Como posso ajudar?");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn chat_upstream_failure_degrades_to_stub() {
        let (router, _) = test_router(Err("http://test".into()), true);
        let response = router
            .oneshot(json_request("POST", "/chat", r#"{"message":"oi"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["used_llm"], false);
    }
}
