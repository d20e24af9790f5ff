use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use lambdeploy_server::{
    Action, DeployError, DeployerConfig, InvocationPayload, InvocationResponse, Journal, invoke,
};
use serde_json::Value;

use crate::output::{print_error, print_success, print_value, print_warning};

/// Returns whether the invocation succeeded. A payload that does not parse
/// still produces an `invalid_payload` envelope on stdout.
pub async fn run(
    config: &DeployerConfig,
    file: Option<&Path>,
    action: Option<Action>,
    authorization: Option<&str>,
) -> Result<bool> {
    let raw = read_payload(file)?;
    let (label, response) = match build_payload(&raw, action) {
        Ok(payload) => {
            let label = format!("{} {}", payload.action.as_str(), payload.lambda_name());
            (label, invoke(config, payload, authorization).await)
        }
        Err(err) => ("invoke".to_string(), rejected(config, action, &err)),
    };
    print_value(&serde_json::to_value(&response)?);

    for warning in &response.warnings {
        print_warning(warning);
    }
    match &response.error {
        None => {
            print_success(&label);
            Ok(true)
        }
        Some(error) => {
            print_error(&format!("{label} failed: {}", error.message));
            Ok(false)
        }
    }
}

fn read_payload(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("reading payload from {}", path.display())),
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("reading payload from stdin")?;
            Ok(raw)
        }
    }
}

fn build_payload(raw: &str, action: Option<Action>) -> Result<InvocationPayload, DeployError> {
    let mut value: Value =
        serde_json::from_str(raw).map_err(|e| DeployError::InvalidPayload(e.to_string()))?;
    if let Some(action) = action {
        let object = value.as_object_mut().ok_or_else(|| {
            DeployError::InvalidPayload("payload must be a JSON object".to_string())
        })?;
        object.insert("action".to_string(), Value::from(action.as_str()));
    }
    InvocationPayload::from_value(value)
}

fn rejected(config: &DeployerConfig, action: Option<Action>, err: &DeployError) -> InvocationResponse {
    let journal = Journal::new(config.logging.debug_journal);
    journal.error(err.to_string());
    InvocationResponse::failed(action, err, journal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lambdeploy_server::ErrorKind;

    const PAYLOAD: &str = r#"{
        "file": "f.py", "runtime": "python", "env_id": "env-1", "api": "dev1",
        "project": "p", "lambda_url": "https://s3.example.com/f.py",
        "git_ref": "master", "git_sha": "6c1ce958d576"
    }"#;

    #[test]
    fn test_action_override() {
        let payload = build_payload(PAYLOAD, None).unwrap();
        assert_eq!(payload.action, Action::Deploy);

        let payload = build_payload(PAYLOAD, Some(Action::Stop)).unwrap();
        assert_eq!(payload.action, Action::Stop);
        assert_eq!(payload.lambda_name(), "p/master/f.py");
    }

    #[test]
    fn test_rejects_non_object_payload() {
        for (raw, action) in [
            ("[1, 2]", Some(Action::Stop)),
            ("not json", None),
            (r#"{"file": "f.py"}"#, None),
            (r#"{"action": "restart"}"#, None),
        ] {
            let err = build_payload(raw, action).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPayload, "{raw}");
        }
    }

    #[test]
    fn test_rejected_payload_still_renders_envelope() {
        let config = DeployerConfig::default();
        let err = build_payload(r#"{"file": "f.py"}"#, Some(Action::Stop)).unwrap_err();
        let response = rejected(&config, Some(Action::Stop), &err);

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["action"], "stop");
        assert_eq!(value["error"]["kind"], "invalid_payload");
        assert_eq!(value["error"]["status"], 400);
        assert!(value["log"][0].as_str().unwrap().starts_with("ERROR: Invalid payload"));
    }

    #[test]
    fn test_reads_payload_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, PAYLOAD).unwrap();
        assert_eq!(read_payload(Some(path.as_path())).unwrap(), PAYLOAD);
        let missing = dir.path().join("missing.json");
        assert!(read_payload(Some(missing.as_path())).is_err());
    }
}
