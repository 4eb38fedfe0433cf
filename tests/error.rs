use std::path::PathBuf;

use serde_json::Value;
use habitviz::error::{exit_codes, Error, JsonError};

#[test]
fn exit_code_user_error() {
    let err = Error::InvalidArgument("bad input".to_string());
    assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
}

#[test]
fn exit_code_operation_failed() {
    let err = Error::OperationFailed("boom".to_string());
    assert_eq!(err.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_includes_fetch_details() {
    let err = Error::FetchFailed {
        source_name: "remote".to_string(),
        message: "status 401".to_string(),
    };
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::OPERATION_FAILED);
    assert!(json.error.contains("status 401"));

    let value: Value = serde_json::to_value(&json).expect("serialize");
    assert_eq!(value["details"]["source"], "remote");
}

#[test]
fn json_error_omits_empty_details() {
    let err = Error::ConfigExists(PathBuf::from(".habitviz.toml"));
    let value: Value = serde_json::to_value(JsonError::from(&err)).expect("serialize");
    assert_eq!(value["code"], exit_codes::USER_ERROR);
    assert_eq!(value["details"]["path"], ".habitviz.toml");

    let err = Error::InvalidConfig("grid.weeks must be between 1 and 520".to_string());
    let value: Value = serde_json::to_value(JsonError::from(&err)).expect("serialize");
    assert!(value.get("details").is_none());
}
