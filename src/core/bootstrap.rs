use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;

/// Creates the configured staff account, or repairs its flags and password.
pub(crate) async fn ensure_superuser(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_superuser_password.is_empty() {
        tracing::warn!("FIRST_SUPERUSER_PASSWORD not configured; skipping superuser creation");
        return Ok(());
    }

    let username = admin.first_superuser_username.as_str();
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_username(state.db(), username).await? {
        let password_matches =
            security::verify_password(&admin.first_superuser_password, &user.hashed_password)
                .unwrap_or(false);
        let flags_ok = user.is_active && user.is_staff && user.is_superuser && user.is_verified;

        if password_matches && flags_ok {
            tracing::info!(username, "Default superuser already up to date");
            return Ok(());
        }

        let hashed_password = if password_matches {
            None
        } else {
            Some(security::hash_password(&admin.first_superuser_password)?)
        };

        repositories::users::update(
            state.db(),
            &user.id,
            repositories::users::UpdateUser {
                first_name: None,
                last_name: None,
                email: None,
                phone_number: None,
                is_verified: Some(true),
                is_active: Some(true),
                is_staff: Some(true),
                is_superuser: Some(true),
                hashed_password,
                updated_at: now,
            },
        )
        .await?;

        tracing::info!(username, "Updated default superuser");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_superuser_password)?;
    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            username,
            email: &admin.first_superuser_email,
            phone_number: &admin.first_superuser_phone,
            hashed_password,
            first_name: "Super",
            last_name: "Admin",
            is_verified: true,
            is_active: true,
            is_staff: true,
            is_superuser: true,
            date_joined: now,
        },
    )
    .await?;

    tracing::info!(username, "Created default superuser");
    Ok(())
}
