use axum::{
    body::Bytes,
    extract::{rejection::{BytesRejection, PathRejection}, Path, State},
    http::StatusCode,
    Json,
};
use common::types::MessageBody;
use service::resources::{model::parse_resource, Collection, Resource, ResourceId};
use tracing::{debug, info};

use crate::errors::ApiError;
use crate::state::AppState;

/// GET /resource
pub async fn list_resources(State(state): State<AppState>) -> Result<Json<Collection>, ApiError> {
    let all = state.resources.read().await?;
    debug!(count = all.len(), "listed resources");
    Ok(Json(all))
}

/// POST /resource
pub async fn create_resource(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<MessageBody>), ApiError> {
    let record = decode_body(body)?;
    state.resources.create(record).await?;
    info!("resource created");
    Ok((StatusCode::CREATED, Json(MessageBody::new("Resource created successfully"))))
}

/// PUT /resource/:id
pub async fn update_resource(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = resource_id(&state, id)?;
    let patch = decode_body(body)?;
    state.resources.update(id, patch).await?;
    info!(%id, "resource updated");
    Ok(Json(MessageBody::new("Resource updated successfully")))
}

/// DELETE /resource/:id
pub async fn delete_resource(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = resource_id(&state, id)?;
    state.resources.delete(id).await?;
    info!(%id, "resource deleted");
    Ok(Json(MessageBody::new("Resource deleted successfully")))
}

/// Any other method or path.
pub async fn endpoint_not_found() -> ApiError {
    ApiError::EndpointNotFound
}

fn decode_body(body: Result<Bytes, BytesRejection>) -> Result<Resource, ApiError> {
    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            debug!(%rejection, "failed to buffer request body");
            ApiError::InvalidJson
        }
    })?;
    parse_resource(&bytes).map_err(|e| {
        debug!(error = %e, "rejected request body");
        ApiError::InvalidJson
    })
}

/// Strict mode rejects unparseable ids; lenient mode turns them into a
/// sentinel that matches nothing.
fn resource_id(state: &AppState, id: Result<Path<String>, PathRejection>) -> Result<ResourceId, ApiError> {
    let strict = state.strict_ids;
    let Ok(Path(token)) = id else {
        return if strict { Err(ApiError::InvalidId) } else { Ok(ResourceId::NoMatch) };
    };
    if strict {
        Ok(ResourceId::parse_strict(&token)?)
    } else {
        Ok(ResourceId::parse_lenient(&token))
    }
}
