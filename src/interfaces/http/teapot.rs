use actix_web::body::{BoxBody, MessageBody};
use actix_web::dev::{Payload, ServiceRequest, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::middleware::Next;
use actix_web::{web, Error};
use serde_json::Value;
use tracing::{info, warn};

use super::json_error;

const TRIGGER_KEY: &str = "coffee";
const TRIGGER_VALUE: &str = "teapot";

/// Answers `418` to any request carrying `coffee=teapot` in its query string
/// or as a top-level field of a JSON object body. Runs before routing, so it
/// also covers paths that would otherwise 404 and methods a route rejects.
/// The query string is checked before the body is read, so a body the
/// payload limit rejects cannot hide a query trigger.
pub async fn teapot_guard(
    mut req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    if query_triggers(req.query_string()) {
        return Ok(teapot(req));
    }

    let body = match req.extract::<web::Bytes>().await {
        Ok(body) => body,
        Err(err) => {
            // Oversized or broken payloads still answer with a JSON error.
            let status = err.as_response_error().status_code();
            warn!(path = req.path(), error = %err, "Failed to read request body");
            let response = json_error(status, &err.to_string());
            return Ok(req.into_response(response).map_into_boxed_body());
        }
    };

    if body_triggers(&body) {
        return Ok(teapot(req));
    }

    // The body was consumed above; hand it back for the handlers.
    req.set_payload(Payload::from(body));
    next.call(req).await.map(ServiceResponse::map_into_boxed_body)
}

fn teapot(req: ServiceRequest) -> ServiceResponse<BoxBody> {
    info!(method = %req.method(), path = req.path(), "Teapot trigger");
    let response = json_error(StatusCode::IM_A_TEAPOT, "I am a teapot");
    req.into_response(response).map_into_boxed_body()
}

fn query_triggers(query: &str) -> bool {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == TRIGGER_KEY)
        .map(|(_, value)| value == TRIGGER_VALUE)
        .unwrap_or(false)
}

fn body_triggers(body: &[u8]) -> bool {
    if body.is_empty() {
        return false;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map.get(TRIGGER_KEY).and_then(Value::as_str) == Some(TRIGGER_VALUE),
        _ => false,
    }
}
