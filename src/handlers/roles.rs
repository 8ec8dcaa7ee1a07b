use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    error::AppError,
    middleware::{is_allowed, Action, CurrentUser, Resource},
    models::{AppRole, UserRole},
};

use super::require_user;

#[derive(Deserialize)]
pub struct RoleFilter {
    pub user_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct AssignRole {
    pub user_id: Uuid,
    pub role: AppRole,
}

/// Rows a role-assignment listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListScope {
    All,
    User(Uuid),
    Empty,
}

/// Intersects the caller's visibility with the requested filter. Admins see
/// whatever they ask for; everyone else sees only their own rows, so asking
/// for another user's assignments yields an empty set rather than a
/// substituted one.
fn list_scope(user: &CurrentUser, requested: Option<Uuid>) -> ListScope {
    if is_allowed(user, Action::Read, Resource::RoleAssignment) {
        match requested {
            Some(id) => ListScope::User(id),
            None => ListScope::All,
        }
    } else {
        match requested {
            Some(id) if id != user.id => ListScope::Empty,
            _ => ListScope::User(user.id),
        }
    }
}

pub async fn list_roles(
    cookies: Cookies,
    State(db): State<Database>,
    Query(filter): Query<RoleFilter>,
) -> Result<Json<Vec<UserRole>>, AppError> {
    let user = require_user(&cookies, &db).await?;

    let scope = match list_scope(&user, filter.user_id) {
        ListScope::Empty => return Ok(Json(Vec::new())),
        ListScope::All => None,
        ListScope::User(id) => Some(id),
    };

    let roles = sqlx::query_as::<_, UserRole>(
        "SELECT * FROM user_roles WHERE ($1::uuid IS NULL OR user_id = $1) ORDER BY created_at DESC",
    )
    .bind(scope)
    .fetch_all(&db)
    .await?;

    Ok(Json(roles))
}

pub async fn assign_role(
    cookies: Cookies,
    State(db): State<Database>,
    Json(req): Json<AssignRole>,
) -> Result<(StatusCode, Json<UserRole>), AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Create, Resource::RoleAssignment) {
        return Err(AppError::Forbidden);
    }

    let assignment = sqlx::query_as::<_, UserRole>(
        "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) RETURNING *",
    )
    .bind(req.user_id)
    .bind(req.role)
    .fetch_one(&db)
    .await?;

    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn remove_role(
    cookies: Cookies,
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let user = require_user(&cookies, &db).await?;

    if !is_allowed(&user, Action::Delete, Resource::RoleAssignment) {
        return Err(AppError::Forbidden);
    }

    let result = sqlx::query("DELETE FROM user_roles WHERE id = $1")
        .bind(id)
        .execute(&db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("role assignment not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(roles: Vec<AppRole>) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "t@example.com".into(),
            full_name: "Test".into(),
            roles,
        }
    }

    #[test]
    fn admin_scope_follows_the_filter() {
        let admin = user_with(vec![AppRole::Admin]);
        let other = Uuid::new_v4();
        assert_eq!(list_scope(&admin, None), ListScope::All);
        assert_eq!(list_scope(&admin, Some(other)), ListScope::User(other));
    }

    #[test]
    fn non_admin_defaults_to_own_rows() {
        let staff = user_with(vec![AppRole::Staff]);
        assert_eq!(list_scope(&staff, None), ListScope::User(staff.id));
        assert_eq!(list_scope(&staff, Some(staff.id)), ListScope::User(staff.id));
    }

    #[test]
    fn non_admin_asking_for_another_user_gets_nothing() {
        // The filter intersects with the caller's visibility; it is never
        // rewritten to the caller's own rows.
        let staff = user_with(vec![AppRole::Staff]);
        let manager = user_with(vec![AppRole::Manager]);
        let other = Uuid::new_v4();
        assert_eq!(list_scope(&staff, Some(other)), ListScope::Empty);
        assert_eq!(list_scope(&manager, Some(other)), ListScope::Empty);
    }
}
