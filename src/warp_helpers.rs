use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;

use warp::{reject, Filter, Rejection, Reply};

use crate::flight_client::FlightOffersApi;
use crate::session::{SessionError, SessionStore, SESSION_COOKIE};

/// Shared handles every search route needs.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub flight_client: Arc<dyn FlightOffersApi>,
    pub max_offers: u32,
    pub secure_cookie: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub timestamp: String,
}

#[derive(Debug)]
pub struct SessionUnavailable {
    pub message: String,
}

impl reject::Reject for SessionUnavailable {}

impl From<SessionError> for SessionUnavailable {
    fn from(err: SessionError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

pub fn session_rejection(err: SessionError) -> Rejection {
    log::error!("Session store error: {}", err);
    reject::custom(SessionUnavailable::from(err))
}

pub fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

pub fn with_session_id() -> impl Filter<Extract = (Option<String>,), Error = Infallible> + Clone {
    warp::cookie::optional(SESSION_COOKIE)
}

pub fn session_cookie_value(session_id: &str, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, session_id);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn with_session_cookie(reply: impl Reply, session_id: &str, secure: bool) -> impl Reply {
    warp::reply::with_header(reply, "set-cookie", session_cookie_value(session_id, secure))
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;
    let timestamp = chrono::Utc::now().to_rfc3339();

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(session_error) = err.find::<SessionUnavailable>() {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = session_error.message.clone();
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = "Invalid query string".to_string();
    } else if let Some(body_error) = err.find::<warp::filters::body::BodyDeserializeError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = body_error.to_string();
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = warp::http::StatusCode::PAYLOAD_TOO_LARGE;
        message = "Payload too large".to_string();
    } else if err.find::<warp::reject::UnsupportedMediaType>().is_some() {
        code = warp::http::StatusCode::UNSUPPORTED_MEDIA_TYPE;
        message = "Unsupported media type".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
        message = "Method not allowed".to_string();
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal server error".to_string();
    }

    let error_response = ErrorResponse {
        error: message,
        code: code.as_u16(),
        timestamp,
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&error_response),
        code,
    ))
}

pub fn cors() -> warp::cors::Builder {
    warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
}
