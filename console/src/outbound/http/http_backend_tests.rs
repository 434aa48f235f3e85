//! Adapter coverage against a local mock HTTP server.

use std::net::TcpListener;
use std::time::Duration;

use mockito::{Matcher, Server, ServerGuard};
use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::json;

use super::*;
use crate::domain::OwnerId;

fn backend_for(server: &ServerGuard) -> HttpExtrasBackend {
    let base_url = Url::parse(&server.url()).expect("mock server URL parses");
    HttpExtrasBackend::new(base_url, Duration::from_secs(5)).expect("client builds")
}

fn submission() -> AliasSubmission {
    AliasSubmission {
        label: "Block A".to_owned(),
        owner_ids: vec![OwnerId::new(10), OwnerId::new(20)],
        active: true,
    }
}

#[tokio::test]
async fn lists_active_aliases_with_query_and_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/extras/")
        .match_query(Matcher::UrlEncoded("ativo".into(), "true".into()))
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "success": true,
                "data": [{"id": 1, "alias": "Block A", "id_proprietarios": "[10,20]", "ativo": 1}]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let backend = backend_for(&server).with_auth_token("secret");

    let envelope = backend.list_active_aliases().await.expect("listing succeeds");

    mock.assert_async().await;
    assert!(envelope.success);
    let aliases = envelope.data.expect("data present");
    assert_eq!(aliases.len(), 1);
    assert_eq!(
        aliases.first().map(Alias::owner_ids),
        Some([OwnerId::new(10), OwnerId::new(20)].as_slice())
    );
}

#[tokio::test]
async fn base_url_path_prefix_is_preserved() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/admin/api/extras/estatisticas")
        .with_status(200)
        .with_body(
            json!({
                "success": true,
                "data": {
                    "total_extras": 3,
                    "extras_ativos": 2,
                    "extras_inativos": 1,
                    "valor_total_transferencias": "150.25"
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let base_url = Url::parse(&format!("{}/admin", server.url())).expect("URL parses");
    let backend = HttpExtrasBackend::new(base_url, Duration::from_secs(5)).expect("client builds");

    let envelope = backend.statistics().await.expect("statistics succeed");

    mock.assert_async().await;
    let statistics = envelope.data.expect("data present");
    assert_eq!(statistics.active_aliases, 2);
    assert_eq!(statistics.total_transferred, Decimal::new(15025, 2));
}

#[tokio::test]
async fn create_alias_posts_owner_blob() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/extras/")
        .match_body(Matcher::PartialJson(json!({
            "alias": "Block A",
            "id_proprietarios": "[10,20]",
            "ativo": true
        })))
        .with_status(201)
        .with_body(json!({"success": true, "id": 7}).to_string())
        .create_async()
        .await;

    let ack = backend_for(&server)
        .create_alias(&submission())
        .await
        .expect("create succeeds");

    mock.assert_async().await;
    assert_eq!(ack.id, Some(7));
    assert!(ack.confirms_success());
}

#[tokio::test]
async fn update_transfer_puts_to_record_path() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/api/transferencias/9")
        .match_body(Matcher::PartialJson(json!({
            "alias_id": 1,
            "nome_transferencia": "Rent",
            "data_criacao": "2024-01-01"
        })))
        .with_status(200)
        .with_body(json!({"id": 9}).to_string())
        .create_async()
        .await;
    let transfer = TransferSubmission {
        alias_id: AliasId::new(1),
        name: "Rent".to_owned(),
        created_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        end_date: None,
        allocations: Vec::new(),
        total_amount: Decimal::ZERO,
    };

    let ack = backend_for(&server)
        .update_transfer(TransferId::new(9), &transfer)
        .await
        .expect("update succeeds");

    mock.assert_async().await;
    assert!(ack.confirms_saved_record());
}

#[rstest]
#[case::no_content(204, "")]
#[case::json_null(200, "null")]
#[tokio::test]
async fn missing_acknowledgement_is_a_decode_error(#[case] status: usize, #[case] body: &str) {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/extras/4")
        .with_status(status)
        .with_body(body)
        .create_async()
        .await;

    let error = backend_for(&server)
        .delete_alias(AliasId::new(4))
        .await
        .expect_err("nothing acknowledged the delete");

    mock.assert_async().await;
    assert!(
        matches!(error, BackendError::Decode { .. }),
        "unexpected error: {error:?}"
    );
}

#[tokio::test]
async fn non_success_status_carries_compacted_body() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/transferencias/")
        .with_status(500)
        .with_body("{\n  \"error\":   \"database offline\"\n}")
        .create_async()
        .await;

    let error = backend_for(&server)
        .list_transfers()
        .await
        .expect_err("500 must fail");

    assert_eq!(
        error,
        BackendError::status(500_u16, "{ \"error\": \"database offline\" }")
    );
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/extras/proprietarios/disponiveis")
        .with_status(200)
        .with_body("<html>login</html>")
        .create_async()
        .await;

    let error = backend_for(&server)
        .list_available_owners()
        .await
        .expect_err("HTML is not JSON");

    assert!(
        matches!(error, BackendError::Decode { ref message } if message.contains("owner listing")),
        "unexpected error: {error:?}"
    );
}

#[tokio::test]
async fn refused_connection_is_a_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        listener.local_addr().expect("local address").port()
    };
    let base_url = Url::parse(&format!("http://127.0.0.1:{port}/")).expect("URL parses");
    let backend = HttpExtrasBackend::new(base_url, Duration::from_secs(5)).expect("client builds");

    let error = backend
        .list_transfers()
        .await
        .expect_err("closed port must fail");

    assert!(
        matches!(error, BackendError::Transport { .. }),
        "unexpected error: {error:?}"
    );
}

#[rstest]
#[case::short("  ok  ", "ok")]
#[case::empty("", "")]
fn body_preview_compacts_whitespace(#[case] body: &str, #[case] expected: &str) {
    assert_eq!(body_preview(body.as_bytes()), expected);
}

#[test]
fn body_preview_truncates_long_bodies() {
    let preview = body_preview("x".repeat(200).as_bytes());

    assert_eq!(preview.chars().count(), 163);
    assert!(preview.ends_with("..."));
}

#[test]
fn empty_status_body_falls_back_to_reason() {
    let error = map_status_error(StatusCode::BAD_GATEWAY, b"");

    assert_eq!(error, BackendError::status(502_u16, "Bad Gateway"));
}

#[test]
fn trailing_slash_is_added_once() {
    let url = with_trailing_slash(Url::parse("http://localhost:8000/admin").expect("URL parses"));

    assert_eq!(url.as_str(), "http://localhost:8000/admin/");
    assert_eq!(with_trailing_slash(url.clone()), url);
}
