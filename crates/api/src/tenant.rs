use uuid::Uuid;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiResult},
};

/// Resolves the company scope for a list query. Tenant-bound users are
/// always pinned to their own company; a mismatched explicit filter reads
/// as not-found rather than revealing the other tenant. Platform
/// operators (no binding) scope by the filter they pass, or see all.
pub fn effective_company(user: &CurrentUser, requested: Option<Uuid>) -> ApiResult<Option<Uuid>> {
    match (user.company_id, requested) {
        (Some(own), Some(req)) if req != own => Err(ApiError::NotFound("Company")),
        (Some(own), _) => Ok(Some(own)),
        (None, req) => Ok(req),
    }
}

/// Like [`effective_company`] but for writes, where a concrete tenant is
/// mandatory.
pub fn require_company(user: &CurrentUser, requested: Option<Uuid>) -> ApiResult<Uuid> {
    effective_company(user, requested)?
        .ok_or_else(|| ApiError::validation("companyId is required"))
}

/// Guards a loaded row: cross-tenant ids behave exactly like missing ids.
pub fn ensure_tenant(
    user: &CurrentUser,
    company_id: Uuid,
    resource: &'static str,
) -> ApiResult<()> {
    match user.company_id {
        Some(own) if own != company_id => Err(ApiError::NotFound(resource)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::UserRole;

    fn bound(company: Uuid) -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            company_id: Some(company),
            roles: vec![UserRole::Member],
        }
    }

    fn operator() -> CurrentUser {
        CurrentUser {
            user_id: Uuid::new_v4(),
            company_id: None,
            roles: vec![UserRole::Owner],
        }
    }

    #[test]
    fn bound_users_are_pinned_to_their_company() {
        let company = Uuid::new_v4();
        let user = bound(company);
        assert_eq!(effective_company(&user, None).unwrap(), Some(company));
        assert_eq!(
            effective_company(&user, Some(company)).unwrap(),
            Some(company)
        );
        assert!(effective_company(&user, Some(Uuid::new_v4())).is_err());
    }

    #[test]
    fn operators_scope_by_filter() {
        let user = operator();
        assert_eq!(effective_company(&user, None).unwrap(), None);
        let company = Uuid::new_v4();
        assert_eq!(
            effective_company(&user, Some(company)).unwrap(),
            Some(company)
        );
        assert!(require_company(&user, None).is_err());
    }

    #[test]
    fn cross_tenant_rows_read_as_missing() {
        let company = Uuid::new_v4();
        let user = bound(company);
        assert!(ensure_tenant(&user, company, "Branch").is_ok());
        let err = ensure_tenant(&user, Uuid::new_v4(), "Branch").unwrap_err();
        assert!(matches!(err, ApiError::NotFound("Branch")));
    }
}
