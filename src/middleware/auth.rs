use serde::{Deserialize, Serialize};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    database::Database,
    models::{AppRole, Profile},
    utils::verify_token,
};

/// Authenticated caller: profile data plus the resolved role set.
///
/// Roles are loaded once per request here, so policy checks later in the
/// handler are plain in-memory lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub roles: Vec<AppRole>,
}

impl CurrentUser {
    pub fn has_role(&self, role: AppRole) -> bool {
        self.roles.contains(&role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(AppRole::Admin)
    }
}

/// `Ok(None)` means "not authenticated" (missing/invalid token, unknown
/// identity); a database failure is an error, not an anonymous session.
pub async fn get_current_user(
    cookies: &Cookies,
    db: &Database,
) -> Result<Option<CurrentUser>, sqlx::Error> {
    let token = match cookies.get("auth_token") {
        Some(cookie) => cookie.value().to_string(),
        None => return Ok(None),
    };

    let claims = match verify_token(&token) {
        Ok(claims) => claims,
        Err(_) => return Ok(None),
    };
    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return Ok(None),
    };

    let profile = match sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(db)
        .await?
    {
        Some(profile) => profile,
        None => return Ok(None),
    };

    let roles = get_user_roles(db, user_id).await?;

    Ok(Some(CurrentUser {
        id: profile.id,
        email: profile.email,
        full_name: profile.full_name,
        roles,
    }))
}

pub async fn get_user_roles(db: &Database, user_id: Uuid) -> Result<Vec<AppRole>, sqlx::Error> {
    sqlx::query_scalar::<_, AppRole>("SELECT role FROM user_roles WHERE user_id = $1")
        .bind(user_id)
        .fetch_all(db)
        .await
}
