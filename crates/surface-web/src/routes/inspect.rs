//! The inspection endpoint.
//!
//! `POST /api/inspect` takes the raw `.api.json` text and answers with
//! the envelope the viewer consumes: `success:true` plus exactly one root
//! view node, or `success:false` plus one short message. Never both, and
//! never a partial tree alongside a failure.
//!
//! Pipeline order matters: size ceiling before parsing, marker validation
//! before the loader, and the side table is built only for documents that
//! loaded.

use axum::http::{header::CONTENT_LENGTH, HeaderMap};
use axum::Json;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use surface_projection::{loader, project, SideTable, ViewNode};

use crate::error::{InspectError, MAX_BODY_BYTES};

/// Response envelope for the inspection endpoint.
#[derive(Debug, Serialize)]
pub struct InspectResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<ViewNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InspectResponse {
    fn ok(tree: ViewNode) -> Self {
        Self {
            success: true,
            tree: Some(tree),
            error: None,
        }
    }

    fn fail(message: String) -> Self {
        Self {
            success: false,
            tree: None,
            error: Some(message),
        }
    }
}

pub async fn inspect(headers: HeaderMap, body: String) -> Json<InspectResponse> {
    match run(&headers, &body) {
        Ok(tree) => Json(InspectResponse::ok(tree)),
        Err(err) => {
            err.log();
            Json(InspectResponse::fail(err.user_message()))
        }
    }
}

fn run(headers: &HeaderMap, body: &str) -> Result<ViewNode, InspectError> {
    check_size(headers, body)?;
    // Projection is pure and expected not to panic for loaded input; if
    // it ever does, the client gets an opaque internal error, not a 500
    // with internals in it.
    match catch_unwind(AssertUnwindSafe(|| inspect_source(body))) {
        Ok(result) => result,
        Err(_) => Err(InspectError::Internal),
    }
}

/// Reject oversized payloads before any parsing happens. The declared
/// `Content-Length` is checked as well as the measured body, so a
/// truthful client is refused without us reading the whole payload into
/// the parser.
fn check_size(headers: &HeaderMap, body: &str) -> Result<(), InspectError> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    if let Some(bytes) = declared {
        if bytes > MAX_BODY_BYTES {
            return Err(InspectError::TooLarge { bytes });
        }
    }
    if body.len() > MAX_BODY_BYTES {
        return Err(InspectError::TooLarge { bytes: body.len() });
    }
    Ok(())
}

/// The full text-to-tree pipeline, shared by the handler and the tests.
pub(crate) fn inspect_source(source: &str) -> Result<ViewNode, InspectError> {
    let doc: serde_json::Value =
        serde_json::from_str(source).map_err(InspectError::MalformedJson)?;
    loader::validate_markers(&doc).map_err(InspectError::InvalidDocument)?;
    let root = loader::load_document(&doc).map_err(InspectError::LoadFailed)?;
    let side = SideTable::build(&doc);
    Ok(project(&root, &side))
}
