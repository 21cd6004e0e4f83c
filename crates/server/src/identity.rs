// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity extraction for the server.
//!
//! The identity collaborator sits in front of this service and forwards the
//! acting staff member, their organization and their role as headers. The
//! values are trusted as supplied; this module only turns them into a
//! `Principal` and a per-request `Cause`.

use std::sync::atomic::Ordering;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use rotaplan::Principal;
use rotaplan_api::{ApiError, resolve_principal};
use rotaplan_audit::Cause;
use tracing::{debug, warn};

use crate::{AppState, ErrorResponse};

/// Header carrying the acting staff member's id.
pub const STAFF_ID_HEADER: &str = "x-staff-id";
/// Header carrying the organization the request acts in.
pub const ORGANIZATION_ID_HEADER: &str = "x-organization-id";
/// Header carrying the acting staff member's role.
pub const ROLE_HEADER: &str = "x-role";
/// Optional header carrying the caller's request id, recorded as the cause.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extractor for the acting identity.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     identity: Identity,
/// ) -> Result<Json<Response>, HttpError> {
///     // identity.principal: Principal
///     // identity.cause: Cause
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Rejects with 401 if an identity header is missing, and with 400 if a
/// header is malformed or the role is unknown.
pub struct Identity {
    /// The acting principal.
    pub principal: Principal,
    /// The cause recorded on any schedule event this request produces.
    pub cause: Cause,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = IdentityError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let staff_id: i64 = header_id(parts, STAFF_ID_HEADER)?;
        let organization_id: i64 = header_id(parts, ORGANIZATION_ID_HEADER)?;
        let role: &str = header_str(parts, ROLE_HEADER)?;

        let principal: Principal =
            resolve_principal(staff_id, organization_id, role).map_err(|e| {
                warn!(staff_id, role, "Unknown role in identity headers");
                IdentityError::InvalidRole(e)
            })?;

        let request_id: String = match parts.headers.get(REQUEST_ID_HEADER) {
            Some(value) => value
                .to_str()
                .map_err(|_| IdentityError::InvalidHeader(REQUEST_ID_HEADER))?
                .to_string(),
            None => format!(
                "req-{}",
                state.request_counter.fetch_add(1, Ordering::Relaxed) + 1
            ),
        };
        let cause: Cause = Cause::new(
            request_id,
            format!("{} {}", parts.method, parts.uri.path()),
        );

        debug!(
            staff_id,
            organization_id,
            role = %principal.role,
            cause_id = %cause.id,
            "Identity resolved"
        );

        Ok(Self { principal, cause })
    }
}

fn header_str<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, IdentityError> {
    parts
        .headers
        .get(name)
        .ok_or_else(|| {
            debug!(header = name, "Missing identity header");
            IdentityError::MissingHeader(name)
        })?
        .to_str()
        .map_err(|_| {
            warn!(header = name, "Invalid identity header encoding");
            IdentityError::InvalidHeader(name)
        })
}

fn header_id(parts: &Parts, name: &'static str) -> Result<i64, IdentityError> {
    header_str(parts, name)?.trim().parse().map_err(|_| {
        warn!(header = name, "Identity header is not an integer id");
        IdentityError::InvalidHeader(name)
    })
}

/// Identity extraction errors.
#[derive(Debug)]
pub enum IdentityError {
    /// A required identity header is missing.
    MissingHeader(&'static str),
    /// A header is not valid text or not an integer id.
    InvalidHeader(&'static str),
    /// The role is not recognized.
    InvalidRole(ApiError),
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let (status, kind, message): (StatusCode, &str, String) = match self {
            Self::MissingHeader(name) => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                format!("Missing {name} header"),
            ),
            Self::InvalidHeader(name) => (
                StatusCode::BAD_REQUEST,
                "invalid_argument",
                format!("Invalid {name} header"),
            ),
            Self::InvalidRole(err) => (StatusCode::BAD_REQUEST, err.kind(), err.to_string()),
        };

        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            kind: kind.to_string(),
            message,
        });
        (status, body).into_response()
    }
}
