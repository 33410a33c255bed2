// src/tenant.rs
//
// Tenant resolution. Every company-scoped handler takes a `TenantContext`,
// never a company id from the request body: the id comes from the
// x-company-id header and is validated against the tenant store before any
// scoped read or write happens.

use crate::{auth, errors::AppError, state::AppState};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use uuid::Uuid;

pub const TENANT_HEADER: &str = "x-company-id";

#[derive(Debug, Clone)]
pub struct TenantContext {
    pub company_id: Uuid,
    pub company_name: String,
    /// The authenticated user, carried for audit fields.
    pub user_id: Uuid,
}

/// Header extraction alone: present and non-blank, or `MissingTenant`.
pub fn tenant_id_from_headers(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .ok_or(AppError::MissingTenant)?;
    if value.is_empty() {
        return Err(AppError::MissingTenant);
    }
    Ok(value)
}

impl FromRequestParts<AppState> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = auth::authenticate(&parts.headers, &state.config.jwt_secret)?;

        let raw = tenant_id_from_headers(&parts.headers)?;
        // A malformed id can never resolve; report it like any unknown tenant.
        let company_id = Uuid::parse_str(raw).map_err(|_| AppError::UnknownTenant)?;

        let company = state
            .tenants
            .find_for_owner(company_id, user.id)
            .await?
            .ok_or(AppError::UnknownTenant)?;

        Ok(TenantContext {
            company_id: company.id,
            company_name: company.name,
            user_id: user.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::{TenantStore, memory::MemoryTenantStore};
    use axum::http::HeaderValue;

    #[test]
    fn missing_or_blank_header_is_missing_tenant() {
        let headers = HeaderMap::new();
        assert!(matches!(
            tenant_id_from_headers(&headers),
            Err(AppError::MissingTenant)
        ));

        let mut headers = HeaderMap::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_static("   "));
        assert!(matches!(
            tenant_id_from_headers(&headers),
            Err(AppError::MissingTenant)
        ));
    }

    #[test]
    fn present_header_is_returned_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            TENANT_HEADER,
            HeaderValue::from_static(" 4f9ad0f4-2894-4f0a-9d68-30e8a111ee85 "),
        );
        assert_eq!(
            tenant_id_from_headers(&headers).unwrap(),
            "4f9ad0f4-2894-4f0a-9d68-30e8a111ee85"
        );
    }

    #[tokio::test]
    async fn soft_deleted_company_does_not_resolve() {
        let store = MemoryTenantStore::default();
        let owner = Uuid::new_v4();
        let live = store.add(owner, "Acme", false).await;
        let deleted = store.add(owner, "Gone", true).await;

        assert!(store.find_for_owner(live, owner).await.unwrap().is_some());
        // the row still exists, but the tenant must not resolve
        assert!(store.find_for_owner(deleted, owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn foreign_company_resolves_like_a_missing_one() {
        let store = MemoryTenantStore::default();
        let owner = Uuid::new_v4();
        let company = store.add(owner, "Acme", false).await;

        let stranger = Uuid::new_v4();
        assert!(store.find_for_owner(company, stranger).await.unwrap().is_none());
    }
}
