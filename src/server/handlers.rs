//! HTTP handlers
//!
//! `/api/me/*` answers permission questions for the calling identity.
//! `/api/admin/*` reads and mutates permission records.

use crate::access_control::{
    CapabilityLevel, Role, RoleFlags, SystemAccess, SystemId, SystemInfo, UserPermissionRecord,
};
use crate::auth::Identity;
use crate::error::{AccessDeniedError, StoreError};
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::store::PermissionUpdate;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use tracing::info;

/// Permission overview for the caller
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub identity: Identity,
    pub role: Option<Role>,
    pub flags: RoleFlags,
    pub allowed_branches: BTreeSet<String>,
    pub systems: Vec<SystemAccess>,
}

#[derive(Debug, Deserialize)]
pub struct LevelQuery {
    pub level: Option<CapabilityLevel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemCheck {
    pub system: SystemId,
    pub required: CapabilityLevel,
    pub level: CapabilityLevel,
    pub allowed: bool,
}

#[derive(Debug, Serialize)]
pub struct BranchCheck {
    pub branch: String,
    pub allowed: bool,
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "status": "ok", "store": state.store.backend() }))
}

pub async fn list_systems(State(state): State<AppState>) -> Json<&'static [SystemInfo]> {
    Json(state.resolver.catalog().entries())
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, ApiError> {
    let identity = Identity::from_headers(&headers)?;
    let snapshot = state.snapshot_for(&identity).await;
    let record = snapshot.record();

    Ok(Json(MeResponse {
        role: record.map(|r| r.role),
        flags: snapshot.flags(),
        allowed_branches: record
            .map(|r| r.allowed_branches.clone())
            .unwrap_or_default(),
        systems: state.resolver.accessible_systems(record),
        identity,
    }))
}

pub async fn me_system(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(system): Path<String>,
    Query(query): Query<LevelQuery>,
) -> Result<Json<SystemCheck>, ApiError> {
    let identity = Identity::from_headers(&headers)?;
    let system = SystemId::try_parse(&system)
        .ok_or_else(|| ApiError::NotFound(format!("unknown system '{}'", system)))?;
    let required = query.level.unwrap_or(CapabilityLevel::Read);

    let snapshot = state.snapshot_for(&identity).await;
    Ok(Json(SystemCheck {
        system,
        required,
        level: snapshot.get_user_permission(&state.resolver, system),
        allowed: snapshot.has_system_permission(&state.resolver, system, required),
    }))
}

pub async fn me_branch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(branch): Path<String>,
) -> Result<Json<BranchCheck>, ApiError> {
    let identity = Identity::from_headers(&headers)?;
    let snapshot = state.snapshot_for(&identity).await;
    let allowed = snapshot.can_access_branch(&state.resolver, &branch);
    Ok(Json(BranchCheck { branch, allowed }))
}

/// Admin routes need the shared password and an admin-or-higher caller.
/// Mutations also need admin capability on user management.
async fn authorize_admin(
    state: &AppState,
    headers: &HeaderMap,
    mutate: bool,
) -> Result<Identity, ApiError> {
    let identity = Identity::from_headers(headers)?;
    state.gate.verify_headers(headers)?;

    let snapshot = state.snapshot_for(&identity).await;
    if !snapshot.flags().is_admin {
        return Err(AccessDeniedError::admin_required("permissions").into());
    }
    if mutate {
        state.resolver.require_system(
            snapshot.record(),
            SystemId::UserManagement,
            CapabilityLevel::Admin,
        )?;
    }
    Ok(identity)
}

pub async fn list_records(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserPermissionRecord>>, ApiError> {
    authorize_admin(&state, &headers, false).await?;
    Ok(Json(state.store.list().await?))
}

pub async fn get_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<UserPermissionRecord>, ApiError> {
    authorize_admin(&state, &headers, false).await?;
    let record = state.store.get(&user_id).await?;
    match record {
        Some(record) => Ok(Json(record)),
        None => Err(StoreError::NotFound { user_id }.into()),
    }
}

pub async fn put_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(mut update): Json<PermissionUpdate>,
) -> Result<Json<UserPermissionRecord>, ApiError> {
    let admin = authorize_admin(&state, &headers, true).await?;
    if !update.user_id.is_empty() && update.user_id != user_id {
        return Err(StoreError::Invalid(format!(
            "body userId '{}' does not match path '{}'",
            update.user_id, user_id
        ))
        .into());
    }
    update.user_id = user_id;

    let record = state.store.upsert(update).await?;
    info!(admin = %admin.user_id, user = %record.user_id, "Admin updated permissions");
    Ok(Json(record))
}

pub async fn delete_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let admin = authorize_admin(&state, &headers, true).await?;
    if state.store.delete(&user_id).await? {
        info!(admin = %admin.user_id, user = %user_id, "Admin deleted permissions");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StoreError::NotFound { user_id }.into())
    }
}
