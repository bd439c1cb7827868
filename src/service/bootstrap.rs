use crate::auth::hash_password;
use crate::config::FirstAdminConfig;
use crate::error::AppError;
use crate::models::{NewUser, Role, User};
use crate::repository::UserRepository;

/// Creates the configured administrator when no administrator exists yet.
///
/// Returns the created user, or `None` when an administrator already exists or no
/// password is configured.
pub async fn ensure_first_admin(
    users: &dyn UserRepository,
    settings: &FirstAdminConfig,
    bcrypt_cost: u32,
) -> Result<Option<User>, AppError> {
    if !users.find_by_role(Role::Admin).await?.is_empty() {
        log::debug!("Administrator present, skipping first-admin setup");
        return Ok(None);
    }

    let password = match settings.password.as_deref() {
        Some(password) if !password.is_empty() => password,
        _ => {
            log::warn!("No administrator exists and FIRST_ADMIN_PASSWORD is not set");
            return Ok(None);
        }
    };

    let admin = users
        .insert(NewUser {
            firstname: settings.firstname.clone(),
            lastname: settings.lastname.clone(),
            email: settings.email.clone(),
            password_hash: hash_password(password, bcrypt_cost)?,
            role: Role::Admin,
        })
        .await?;
    log::info!("Created first administrator {}", admin.email);
    Ok(Some(admin))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;

    fn settings(password: Option<&str>) -> FirstAdminConfig {
        FirstAdminConfig {
            firstname: "Admin".into(),
            lastname: "Admin".into(),
            email: "admin@example.com".into(),
            password: password.map(str::to_string),
        }
    }

    #[test_log::test(actix_rt::test)]
    async fn test_first_admin_created_once() {
        let store = MemoryStore::new();

        let created = ensure_first_admin(&store, &settings(Some("admin123")), 4)
            .await
            .unwrap();
        assert_eq!(created.map(|u| u.role), Some(Role::Admin));

        let again = ensure_first_admin(&store, &settings(Some("admin123")), 4)
            .await
            .unwrap();
        assert!(again.is_none());
        assert_eq!(store.find_by_role(Role::Admin).await.unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_skipped_without_password() {
        let store = MemoryStore::new();
        let created = ensure_first_admin(&store, &settings(None), 4).await.unwrap();

        assert!(created.is_none());
        assert!(store.find_by_role(Role::Admin).await.unwrap().is_empty());
    }
}
