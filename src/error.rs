use std::convert::Infallible;

use anyhow::Error;
use serde::Serialize;
use warp::http::StatusCode;
use warp::reject::Reject;
use warp::{Rejection, Reply};

use crate::healthevent::{DecodeError, DecodeErrorKind};

#[derive(Serialize)]
pub struct ErrorMessage {
    pub code: u16,
    pub kind: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ErrorWrapper {
    pub error: Error,
}

impl Reject for ErrorWrapper {}

/// Turns a failed `Result` into a warp rejection carrying the error, logging it
/// on the way.
#[macro_export]
macro_rules! extract_rejection {
    ($v:expr) => {
        match $v {
            Ok(value) => Ok(value),
            Err(err) => {
                let error = anyhow::Error::from(err);
                log::error!("Failed to match result: `{:#}`", error);
                Err(warp::reject::custom($crate::error::ErrorWrapper { error }))
            }
        }
    };
}

/// Status and kind for a failure while unwrapping or decoding an event.
fn classify(error: &Error) -> (StatusCode, &'static str) {
    if let Some(err) = error.downcast_ref::<DecodeError>() {
        return match err.kind() {
            DecodeErrorKind::Syntax => (StatusCode::BAD_REQUEST, "SYNTAX_ERROR"),
            DecodeErrorKind::SchemaMismatch => (StatusCode::UNPROCESSABLE_ENTITY, "SCHEMA_MISMATCH"),
            DecodeErrorKind::MalformedTimestamp => {
                (StatusCode::UNPROCESSABLE_ENTITY, "MALFORMED_TIMESTAMP")
            }
        };
    }
    // the envelope itself failed to parse
    if let Some(err) = error.downcast_ref::<serde_json::Error>() {
        return if err.is_syntax() || err.is_eof() {
            (StatusCode::BAD_REQUEST, "SYNTAX_ERROR")
        } else {
            (StatusCode::UNPROCESSABLE_ENTITY, "SCHEMA_MISMATCH")
        };
    }
    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
}

// This function receives a `Rejection` and tries to return a custom
// value, otherwise simply passes the rejection along.
pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let kind: &str;
    let message: String;

    if err.is_not_found() {
        code = StatusCode::NOT_FOUND;
        kind = "NOT_FOUND";
        message = "NOT_FOUND".to_string();
    } else if let Some(err) = err.find::<ErrorWrapper>() {
        let (status, error_kind) = classify(&err.error);
        code = status;
        kind = error_kind;
        message = format!("{:#}", err.error);
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = StatusCode::PAYLOAD_TOO_LARGE;
        kind = "PAYLOAD_TOO_LARGE";
        message = "PAYLOAD_TOO_LARGE".to_string();
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        code = StatusCode::LENGTH_REQUIRED;
        kind = "LENGTH_REQUIRED";
        message = "LENGTH_REQUIRED".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = StatusCode::METHOD_NOT_ALLOWED;
        kind = "METHOD_NOT_ALLOWED";
        message = "METHOD_NOT_ALLOWED".to_string();
    } else {
        // We should have expected this... Just log and say its a 500
        error!("unhandled rejection: {:?}", err);
        code = StatusCode::INTERNAL_SERVER_ERROR;
        kind = "UNHANDLED_REJECTION";
        message = "UNHANDLED_REJECTION".to_string();
    }

    let json = warp::reply::json(&ErrorMessage {
        code: code.as_u16(),
        kind: kind.to_string(),
        message,
    });

    Ok(warp::reply::with_status(json, code))
}
