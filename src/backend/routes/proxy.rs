//! Request interception fallback
//!
//! Every request that is not a control route is rebuilt against the origin
//! (the target's path and query only, so `//host/...` stays on the origin)
//! and handed to the worker's `fetch` handler. `Sec-Fetch-Dest` and
//! `Sec-Fetch-Mode` carry the browser's destination and mode.

use crate::backend::error::GatewayError;
use crate::backend::server::state::AppState;
use crate::network::{self, Destination, HeaderMap, RequestMode, Url};
use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, Uri},
    response::{IntoResponse, Response},
};

/// Largest request body forwarded to the origin
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const HOP_BY_HOP: [header::HeaderName; 4] = [
    header::HOST,
    header::CONNECTION,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
];

/// Fallback handler: answer the request through interception
pub async fn handle_intercepted(State(state): State<AppState>, request: Request) -> Result<Response, GatewayError> {
    let intercepted = into_intercepted(&state, request).await?;
    let response = state.runtime.worker.fetch(intercepted).await?;
    Ok(into_response(response))
}

async fn into_intercepted(state: &AppState, request: Request) -> Result<network::Request, GatewayError> {
    let (parts, body) = request.into_parts();

    let url = origin_url(&state.origin, &parts.uri)?;

    let destination = header_str(&parts.headers, "sec-fetch-dest")
        .map(Destination::from_header)
        .unwrap_or_default();
    let mode = header_str(&parts.headers, "sec-fetch-mode")
        .map(RequestMode::from_header)
        .unwrap_or_default();

    let mut headers = parts.headers;
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| GatewayError::bad_request(format!("unreadable request body: {}", err)))?;

    Ok(network::Request {
        method: parts.method,
        url,
        headers,
        body: (!body.is_empty()).then_some(body),
        destination,
        mode,
    })
}

/// The request target placed on the origin; never resolved as a reference
fn origin_url(origin: &Url, target: &Uri) -> Result<Url, GatewayError> {
    let mut url = origin.clone();
    url.set_path(target.path());
    url.set_query(target.query());
    url.set_fragment(None);
    if url.origin() != origin.origin() {
        return Err(GatewayError::bad_request(format!("cannot route {} off the origin", target)));
    }
    Ok(url)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn into_response(response: network::Response) -> Response {
    let mut headers = response.headers;
    headers.remove(header::TRANSFER_ENCODING);
    headers.remove(header::CONNECTION);
    headers.remove(header::CONTENT_LENGTH);

    let mut out = (response.status, Body::from(response.body)).into_response();
    out.headers_mut().extend(headers);
    out
}
