use std::io::Write;

use snippet_bedrock::error::{BedrockError, ErrorKind};
use snippet_bedrock::{ClientConfig, CredentialSource};

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn from_file_reads_inline_credentials() {
    let file = config_file(
        r#"{
            "region": "us-east-1",
            "credentials": {
                "type": "inline",
                "access_key_id": "AKIAEXAMPLE",
                "secret_access_key": "secret"
            }
        }"#,
    );

    let config = ClientConfig::from_file(file.path()).unwrap();
    assert_eq!(config.region.as_deref(), Some("us-east-1"));
    let CredentialSource::Inline {
        access_key_id,
        session_token,
        ..
    } = config.credentials
    else {
        panic!("expected inline credentials");
    };
    assert_eq!(access_key_id, "AKIAEXAMPLE");
    assert!(session_token.is_none());
}

#[test]
fn from_file_defaults_to_provider_chain() {
    let file = config_file("{}");
    let config = ClientConfig::from_file(file.path()).unwrap();
    assert!(config.region.is_none());
    assert!(matches!(config.credentials, CredentialSource::DefaultChain));
}

#[test]
fn from_file_reads_profile() {
    let file = config_file(r#"{"credentials": {"type": "profile", "profile_name": "dev"}}"#);
    let config = ClientConfig::from_file(file.path()).unwrap();
    assert!(matches!(
        config.credentials,
        CredentialSource::Profile { ref profile_name } if profile_name == "dev"
    ));
}

#[test]
fn from_file_rejects_unknown_credential_type() {
    let file = config_file(r#"{"credentials": {"type": "sso"}}"#);
    let err = ClientConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, BedrockError::Config(_)));
    assert_eq!(err.kind(), ErrorKind::Usage);
}

#[test]
fn from_file_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = ClientConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}
