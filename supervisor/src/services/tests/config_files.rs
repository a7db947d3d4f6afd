//! Tests for Base64ConfigMaterializer

use base64::Engine;

use crate::error::SupervisorError;
use crate::services::config_files::Base64ConfigMaterializer;
use crate::traits::ConfigMaterializer;
use crate::types::Candidate;

fn candidate_with_payload(payload: &[u8]) -> Candidate {
    Candidate {
        identifier: "public-vpn-42".to_string(),
        country_long: "Japan".to_string(),
        country_short: "JP".to_string(),
        address: "219.100.37.1".to_string(),
        config_payload: payload.to_vec(),
    }
}

#[tokio::test]
async fn test_materialize_writes_decoded_config() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = Base64ConfigMaterializer::with_temp_dir(dir.path().to_path_buf());
    let config = "client\ndev tun\nproto udp\nremote 219.100.37.1 1194\n";
    let encoded = base64::engine::general_purpose::STANDARD.encode(config);

    let artifact = materializer
        .materialize(&candidate_with_payload(encoded.as_bytes()))
        .await
        .unwrap();

    let path = artifact.path().to_path_buf();
    assert!(path.starts_with(dir.path()));
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("vpngate-openvpn-config-"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), config);

    artifact.remove().unwrap();
    assert!(!path.exists(), "Transient config should be deleted");
}

#[test]
fn test_decode_tolerates_line_breaks() {
    let encoded = base64::engine::general_purpose::STANDARD.encode("dev tun\n");
    let (head, tail) = encoded.split_at(4);
    let wrapped = format!("{head}\r\n{tail}\n");

    let decoded = Base64ConfigMaterializer::decode(wrapped.as_bytes()).unwrap();

    assert_eq!(decoded, b"dev tun\n");
}

#[tokio::test]
async fn test_invalid_payload_is_decode_error() {
    let materializer = Base64ConfigMaterializer::new();

    let err = materializer
        .materialize(&candidate_with_payload(b"not base64 at all!"))
        .await
        .unwrap_err();

    match err {
        SupervisorError::ConfigDecode { identifier, .. } => assert_eq!(identifier, "public-vpn-42"),
        other => panic!("expected ConfigDecode, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unwritable_directory_is_write_error() {
    let dir = tempfile::tempdir().unwrap();
    let materializer = Base64ConfigMaterializer::with_temp_dir(dir.path().join("missing"));
    let encoded = base64::engine::general_purpose::STANDARD.encode("dev tun\n");

    let err = materializer
        .materialize(&candidate_with_payload(encoded.as_bytes()))
        .await
        .unwrap_err();

    assert!(matches!(err, SupervisorError::ConfigWrite { .. }));
}
