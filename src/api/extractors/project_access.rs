use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::extractors::auth::AuthUser;
use crate::domain::models::access::ProjectAccess;
use crate::domain::models::auth::Claims;
use crate::domain::models::project::Project;
use crate::domain::services::permissions::{evaluate, Capability};
use crate::error::AppError;
use crate::state::AppState;

/// Loads the project named in the path and the caller's grant on it, in
/// one place, before any handler body runs.
///
/// Route naming is not uniform: older routes use `{id}` where newer ones
/// use `{projectId}`, so both are accepted. A global admin passes without
/// a grant (`access` is `None` in that case and every check succeeds).
pub struct ProjectContext {
    pub claims: Claims,
    pub project: Project,
    pub access: Option<ProjectAccess>,
}

impl ProjectContext {
    pub fn is_global_admin(&self) -> bool {
        self.claims.is_global_admin()
    }

    pub fn allows(&self, capability: Capability) -> bool {
        self.is_global_admin() || evaluate(self.access.as_ref(), capability)
    }

    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.allows(capability) {
            return Ok(());
        }
        Err(AppError::Forbidden(format!(
            "Insufficient permissions: {} required",
            capability.as_str()
        )))
    }
}

impl FromRequestParts<Arc<AppState>> for ProjectContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        let params: Path<HashMap<String, String>> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::Validation("Project ID is required".to_string()))?;

        let project_id = params
            .get("projectId")
            .or_else(|| params.get("id"))
            .ok_or_else(|| AppError::Validation("Project ID is required".to_string()))?;

        let project = state
            .project_repo
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        if claims.is_global_admin() {
            return Ok(ProjectContext {
                claims,
                project,
                access: None,
            });
        }

        let access = state
            .access_repo
            .find(&claims.sub, &project.id)
            .await?
            .ok_or_else(|| AppError::Forbidden("No access to this project".to_string()))?;

        Ok(ProjectContext {
            claims,
            project,
            access: Some(access),
        })
    }
}
