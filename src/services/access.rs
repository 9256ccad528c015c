use uuid::Uuid;

use crate::database::models::User;
use crate::error::AppError;
use crate::services::auth::Claims;

/// Scoping rules applied before any operation that touches another user's
/// data. Failures name the missing relationship instead of returning a
/// bare 403, except where doing so would leak existence across company
/// boundaries (those return NotFound).

pub fn ensure_owner(claims: &Claims, owner_id: Uuid) -> Result<(), AppError> {
    if claims.sub != owner_id {
        return Err(AppError::Forbidden(
            "This record belongs to another user.".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_manager_role(claims: &Claims) -> Result<(), AppError> {
    if !claims.is_manager_or_admin() {
        return Err(AppError::Forbidden(
            "Manager or admin role required.".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_admin_role(claims: &Claims) -> Result<(), AppError> {
    if !claims.is_admin() {
        return Err(AppError::Forbidden("Admin role required.".to_string()));
    }
    Ok(())
}

/// Managers may read users of their own company only; admins see all.
pub fn ensure_company_scope(claims: &Claims, target: &User) -> Result<(), AppError> {
    if claims.is_admin() {
        return Ok(());
    }

    match (claims.company_id, target.company_id) {
        (Some(own), Some(theirs)) if own == theirs => Ok(()),
        _ => Err(AppError::Forbidden(
            "User belongs to a different company.".to_string(),
        )),
    }
}

/// Mutating a report's data (schedule reassignment) requires the direct
/// manager relationship, not just company membership.
pub fn ensure_direct_report(claims: &Claims, target: &User) -> Result<(), AppError> {
    if target.manager_id != Some(claims.sub) {
        return Err(AppError::Forbidden(
            "User is not a direct report of the caller.".to_string(),
        ));
    }
    Ok(())
}

/// A manager asking for a schedule outside their company gets NotFound, so
/// the lookup does not confirm the schedule exists elsewhere.
pub fn ensure_schedule_visible(
    claims: &Claims,
    schedule_company_id: Uuid,
) -> Result<(), AppError> {
    if claims.is_admin() || claims.company_id == Some(schedule_company_id) {
        return Ok(());
    }
    Err(AppError::NotFound("Work schedule not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{User, UserRole};
    use fake::faker::internet::en::SafeEmail;
    use fake::faker::name::en::Name;
    use fake::Fake;

    fn claims(role: UserRole, company_id: Option<Uuid>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: SafeEmail().fake(),
            role,
            company_id,
            exp: 0,
        }
    }

    fn user_in_company(company_id: Option<Uuid>) -> User {
        let mut user = User::new(SafeEmail().fake(), "hash".to_string(), Name().fake());
        user.company_id = company_id;
        user
    }

    #[test]
    fn owner_check_rejects_other_users() {
        let c = claims(UserRole::Employee, None);
        assert!(ensure_owner(&c, c.sub).is_ok());
        assert!(matches!(
            ensure_owner(&c, Uuid::new_v4()).unwrap_err(),
            AppError::Forbidden(_)
        ));
    }

    #[test]
    fn company_scope_requires_matching_company() {
        let company = Uuid::new_v4();
        let manager = claims(UserRole::Manager, Some(company));

        assert!(ensure_company_scope(&manager, &user_in_company(Some(company))).is_ok());
        assert!(matches!(
            ensure_company_scope(&manager, &user_in_company(Some(Uuid::new_v4()))).unwrap_err(),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            ensure_company_scope(&manager, &user_in_company(None)).unwrap_err(),
            AppError::Forbidden(_)
        ));
    }

    #[test]
    fn admin_bypasses_company_scope() {
        let admin = claims(UserRole::Admin, None);
        assert!(ensure_company_scope(&admin, &user_in_company(Some(Uuid::new_v4()))).is_ok());
    }

    #[test]
    fn direct_report_check_requires_the_manager_link() {
        let manager = claims(UserRole::Manager, Some(Uuid::new_v4()));
        let mut report = user_in_company(manager.company_id);
        report.manager_id = Some(manager.sub);

        assert!(ensure_direct_report(&manager, &report).is_ok());

        report.manager_id = Some(Uuid::new_v4());
        assert!(matches!(
            ensure_direct_report(&manager, &report).unwrap_err(),
            AppError::Forbidden(_)
        ));
    }

    #[test]
    fn cross_company_schedule_lookup_reports_not_found() {
        let manager = claims(UserRole::Manager, Some(Uuid::new_v4()));
        let err = ensure_schedule_visible(&manager, Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn role_gates() {
        assert!(ensure_manager_role(&claims(UserRole::Manager, None)).is_ok());
        assert!(ensure_manager_role(&claims(UserRole::Admin, None)).is_ok());
        assert!(ensure_manager_role(&claims(UserRole::Employee, None)).is_err());

        assert!(ensure_admin_role(&claims(UserRole::Admin, None)).is_ok());
        assert!(ensure_admin_role(&claims(UserRole::Manager, None)).is_err());
    }
}
