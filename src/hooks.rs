//! Lifecycle hooks, invoked explicitly by the write paths that used to rely
//! on database triggers.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Modification stamp. Every UPDATE statement binds this value for its
/// `updated_at` column; nothing updates a governed row without it.
pub fn updated_at() -> DateTime<Utc> {
    Utc::now()
}

/// Display name recorded at signup when none was provided.
pub fn display_name(full_name: Option<&str>) -> String {
    full_name.unwrap_or("").to_string()
}

/// Identity-created hook: inserts exactly one profile row for a new user.
///
/// Runs inside the registration transaction. A failure here propagates and
/// rolls the whole registration back, so an identity is never committed
/// without its profile.
pub async fn provision_profile(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    email: &str,
    full_name: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO profiles (id, full_name, email) VALUES ($1, $2, $3)")
        .bind(user_id)
        .bind(display_name(full_name))
        .bind(email)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_defaults_to_empty_string() {
        assert_eq!(display_name(None), "");
        assert_eq!(display_name(Some("Ada Lovelace")), "Ada Lovelace");
    }
}
