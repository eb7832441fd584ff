//! Mock tests for the diagnostics report pipeline
//!
//! These tests use WireMock to simulate the diagnostics endpoints and
//! mockall to stand in for the pacer and the request executor, then check
//! the rendered report and the lookup failures.

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::core::{GatewayBuilder, HttpGateway, MockRequestExecutor};
    use crate::error::{ServiceError, EXIT_API, EXIT_CONFIGURATION, EXIT_LOOKUP};
    use crate::pacing::{MockPacer, NoPacer};
    use crate::services::diagnostics::{DiagnosticsPipeline, CONTINUE_PROMPT};
    use crate::tests::fixtures::{output_text, test_config, test_issuer, test_key_file};

    const BUILD_ID: &str = "6a2b1c3d-build";
    const SIGNATURE_ID: &str = "sig-disk-writes";

    fn signatures_body(server_uri: &str) -> Value {
        json!({
            "data": [
                {
                    "type": "diagnosticSignatures",
                    "id": SIGNATURE_ID,
                    "attributes": {
                        "diagnosticType": "DISK_WRITES",
                        "signature": "-[DataStore flush]",
                        "weight": 42.5
                    },
                    "relationships": {
                        "logs": {
                            "links": {
                                "related": format!("{}/v1/diagnosticSignatures/{}/logs", server_uri, SIGNATURE_ID)
                            }
                        }
                    }
                },
                {
                    "type": "diagnosticSignatures",
                    "id": "sig-second",
                    "relationships": {
                        "logs": {"links": {"related": format!("{}/v1/diagnosticSignatures/sig-second/logs", server_uri)}}
                    }
                }
            ]
        })
    }

    fn diagnostic_log(app_version: &str, per_thread: bool) -> Value {
        json!({
            "diagnosticMetaData": {
                "deviceType": "iPhone14,2",
                "osVersion": "iPhone OS 16.1",
                "appVersion": app_version,
                "buildVersion": "108",
                "eventDetail": "2.14 GB of file-backed memory dirtied over 31 seconds"
            },
            "callStackTree": [{
                "callStackPerThread": per_thread,
                "callStacks": [{
                    "callStackRootFrames": [{
                        "rawFrame": "0 libsystem_kernel.dylib 0x1e2d4 pwrite",
                        "subFrames": [{
                            "rawFrame": "1 Foundation 0x8f10 -[NSData writeToFile:]",
                            "subFrames": [{"rawFrame": "2 MyApp 0x1234 -[DataStore flush]"}]
                        }]
                    }]
                }]
            }]
        })
    }

    fn logs_body(logs: Vec<Value>) -> Value {
        json!({
            "productData": [{
                "signatureId": SIGNATURE_ID,
                "diagnosticLogs": logs
            }]
        })
    }

    async fn mount_signatures(mock_server: &MockServer, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/builds/{}/diagnosticSignatures", BUILD_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(mock_server)
            .await;
    }

    async fn mount_logs(mock_server: &MockServer, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/diagnosticSignatures/{}/logs", SIGNATURE_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(mock_server)
            .await;
    }

    fn pipeline(mock_server: &MockServer) -> DiagnosticsPipeline<HttpGateway, NoPacer> {
        DiagnosticsPipeline::with_issuer(
            test_config(&mock_server.uri()),
            test_issuer(),
            GatewayBuilder::new().build(),
            NoPacer,
        )
    }

    #[tokio::test]
    async fn test_full_report() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/v1/builds/{}/diagnosticSignatures", BUILD_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(signatures_body(&mock_server.uri())))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v1/diagnosticSignatures/{}/logs", SIGNATURE_ID)))
            .and(query_param("limit", "5"))
            .and(header("Accept", "application/vnd.apple.xcode-metrics+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(logs_body(vec![
                diagnostic_log("2.3", false),
                diagnostic_log("2.4", true),
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut pacer = MockPacer::new();
        pacer
            .expect_pause()
            .withf(|prompt| prompt == CONTINUE_PROMPT)
            .times(2)
            .returning(|_| Ok(()));

        let pipeline = DiagnosticsPipeline::with_issuer(
            test_config(&mock_server.uri()),
            test_issuer(),
            GatewayBuilder::new().build(),
            pacer,
        );

        let mut out = Vec::new();
        pipeline.run(BUILD_ID, &mut out).await.unwrap();
        let text = output_text(&out);

        assert!(text.contains("Get top disk writes diagnostic signature and related logs."));
        assert!(text.contains(&format!("/v1/builds/{}/diagnosticSignatures", BUILD_ID)));
        assert!(text.contains(&format!("/v1/diagnosticSignatures/{}/logs?limit=5", SIGNATURE_ID)));
        assert!(text.contains("Got 2 logs to parse"));
        assert!(text.contains("Metadata: iPhone14,2 (iPhone OS 16.1), 2.3"));
        assert!(text.contains("Metadata: iPhone14,2 (iPhone OS 16.1), 2.4"));
        assert!(text.contains("callStackPerThread:  false"));
        assert!(text.contains("callStackPerThread:  true"));
        assert!(text.contains("\n0 libsystem_kernel.dylib 0x1e2d4 pwrite\n"));
        assert!(text.contains("\n  1 Foundation 0x8f10 -[NSData writeToFile:]\n"));
        assert!(text.contains("\n    2 MyApp 0x1234 -[DataStore flush]\n"));

        // Logs appear in API order.
        let first = text.find("), 2.3").unwrap();
        let second = text.find("), 2.4").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_configured_log_limit_is_appended() {
        let mock_server = MockServer::start().await;
        mount_signatures(&mock_server, signatures_body(&mock_server.uri())).await;

        Mock::given(method("GET"))
            .and(path(format!("/v1/diagnosticSignatures/{}/logs", SIGNATURE_ID)))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(logs_body(vec![diagnostic_log("2.3", false)])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut config = test_config(&mock_server.uri());
        config.log_limit = 2;
        let pipeline = DiagnosticsPipeline::with_issuer(config, test_issuer(), GatewayBuilder::new().build(), NoPacer);

        let mut out = Vec::new();
        pipeline.run(BUILD_ID, &mut out).await.unwrap();
        assert!(output_text(&out).contains("Got 1 logs to parse"));
    }

    #[tokio::test]
    async fn test_no_signature_for_build() {
        let mock_server = MockServer::start().await;
        mount_signatures(&mock_server, json!({"data": []})).await;

        let mut out = Vec::new();
        let err = pipeline(&mock_server).run(BUILD_ID, &mut out).await.unwrap_err();

        assert_eq!(err.to_string(), format!("no signature was found with build id {}", BUILD_ID));
        assert_eq!(err.exit_code(), EXIT_LOOKUP);
    }

    #[tokio::test]
    async fn test_null_signature_data() {
        let mock_server = MockServer::start().await;
        mount_signatures(&mock_server, json!({"data": null})).await;

        let mut out = Vec::new();
        let err = pipeline(&mock_server).run(BUILD_ID, &mut out).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_empty_product_data() {
        let mock_server = MockServer::start().await;
        mount_signatures(&mock_server, signatures_body(&mock_server.uri())).await;
        mount_logs(&mock_server, json!({"productData": []})).await;

        let mut out = Vec::new();
        let err = pipeline(&mock_server).run(BUILD_ID, &mut out).await.unwrap_err();

        assert_eq!(err.to_string(), "empty diagnostic logs response was returned");
        assert_eq!(err.exit_code(), EXIT_LOOKUP);
    }

    #[tokio::test]
    async fn test_no_logs_for_signature() {
        let mock_server = MockServer::start().await;
        mount_signatures(&mock_server, signatures_body(&mock_server.uri())).await;
        mount_logs(&mock_server, logs_body(Vec::new())).await;

        let mut pacer = MockPacer::new();
        pacer.expect_pause().times(0);

        let pipeline = DiagnosticsPipeline::with_issuer(
            test_config(&mock_server.uri()),
            test_issuer(),
            GatewayBuilder::new().build(),
            pacer,
        );

        let mut out = Vec::new();
        let err = pipeline.run(BUILD_ID, &mut out).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("no diagnostic log was found for signature id {}", SIGNATURE_ID)
        );
    }

    #[tokio::test]
    async fn test_api_failure_stops_the_pipeline() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(format!("/v1/builds/{}/diagnosticSignatures", BUILD_ID)))
            .respond_with(
                ResponseTemplate::new(401)
                    .insert_header("x-request-id", "REQ-401")
                    .set_body_string(r#"{"errors":[{"status":"401","code":"NOT_AUTHORIZED"}]}"#),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut out = Vec::new();
        let err = pipeline(&mock_server).run(BUILD_ID, &mut out).await.unwrap_err();

        assert_eq!(err.status_code(), Some(401));
        assert_eq!(err.request_id(), Some("REQ-401"));
        assert_eq!(err.exit_code(), EXIT_API);
        assert!(!output_text(&out).contains("logs to parse"));
    }

    #[tokio::test]
    async fn test_malformed_signatures_response() {
        let mut executor = MockRequestExecutor::new();
        executor
            .expect_request()
            .withf(|m, url, headers| {
                *m == Method::GET
                    && url.ends_with("/builds/42/diagnosticSignatures")
                    && headers.get("Authorization").map_or(false, |v| v.starts_with("Bearer "))
                    && !headers.contains_key("Accept")
            })
            .times(1)
            .returning(|_, _, _| Ok("{\"data\": [{\"id\": 7}]}".to_string()));

        let pipeline = DiagnosticsPipeline::with_issuer(
            test_config("https://api.example.com"),
            test_issuer(),
            executor,
            NoPacer,
        );

        let mut out = Vec::new();
        let err = pipeline.run("42", &mut out).await.unwrap_err();

        assert!(matches!(err.root(), ServiceError::Parsing(_)));
        assert_eq!(err.exit_code(), EXIT_LOOKUP);
    }

    #[tokio::test]
    async fn test_malformed_log_fails_after_earlier_logs_render() {
        let mock_server = MockServer::start().await;
        mount_signatures(&mock_server, signatures_body(&mock_server.uri())).await;
        mount_logs(
            &mock_server,
            logs_body(vec![
                diagnostic_log("2.3", false),
                json!({"diagnosticMetaData": {"deviceType": "iPhone14,2"}, "callStackTree": []}),
                diagnostic_log("2.5", false),
            ]),
        )
        .await;

        let mut pacer = MockPacer::new();
        pacer.expect_pause().times(2).returning(|_| Ok(()));

        let pipeline = DiagnosticsPipeline::with_issuer(
            test_config(&mock_server.uri()),
            test_issuer(),
            GatewayBuilder::new().build(),
            pacer,
        );

        let mut out = Vec::new();
        let err = pipeline.run(BUILD_ID, &mut out).await.unwrap_err();
        let text = output_text(&out);

        assert!(matches!(err.root(), ServiceError::Parsing(_)));
        assert!(err.to_string().contains("unexpected diagnostic log"));
        assert_eq!(err.exit_code(), EXIT_LOOKUP);
        assert!(text.contains("Got 3 logs to parse"));
        assert!(text.contains("Metadata: iPhone14,2 (iPhone OS 16.1), 2.3"));
        assert!(text.contains("\n    2 MyApp 0x1234 -[DataStore flush]\n"));
        assert!(!text.contains("), 2.5"));
    }

    #[tokio::test]
    async fn test_pacer_failure_is_propagated() {
        let mock_server = MockServer::start().await;
        mount_signatures(&mock_server, signatures_body(&mock_server.uri())).await;
        mount_logs(&mock_server, logs_body(vec![diagnostic_log("2.3", false)])).await;

        let mut pacer = MockPacer::new();
        pacer
            .expect_pause()
            .times(1)
            .returning(|_| Err(ServiceError::internal("stdin closed")));

        let pipeline = DiagnosticsPipeline::with_issuer(
            test_config(&mock_server.uri()),
            test_issuer(),
            GatewayBuilder::new().build(),
            pacer,
        );

        let mut out = Vec::new();
        let err = pipeline.run(BUILD_ID, &mut out).await.unwrap_err();

        assert!(matches!(err, ServiceError::Internal(_)));
        assert!(!output_text(&out).contains("Metadata:"));
    }

    #[tokio::test]
    async fn test_new_loads_private_key_file() {
        let mock_server = MockServer::start().await;
        mount_signatures(&mock_server, json!({"data": []})).await;

        let key_file = test_key_file();
        let mut config = test_config(&mock_server.uri());
        config.private_key_path = key_file.path().to_path_buf();

        let pipeline = DiagnosticsPipeline::new(config, GatewayBuilder::new().build(), NoPacer).unwrap();

        let mut out = Vec::new();
        let err = pipeline.run(BUILD_ID, &mut out).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_missing_private_key_is_configuration_error() {
        let config = test_config("https://api.example.com");
        let result = DiagnosticsPipeline::new(config, GatewayBuilder::new().build(), NoPacer);

        match result {
            Err(err) => assert_eq!(err.exit_code(), EXIT_CONFIGURATION),
            Ok(_) => panic!("Expected configuration error"),
        }
    }
}
