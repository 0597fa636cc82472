use futures::future::join_all;
use sea_orm::{ActiveEnum, Order};

use super::file;
use crate::entity::entity_file::EntityType;
use crate::entity::user;
use crate::error::AppError;
use crate::models::shared::{Pagination, required_text};
use crate::models::user::*;
use crate::repo::{
    EntityFileRepo, PageRequest, QueryOptions, UserLink, UserRepo, UserWithAvatar,
};
use crate::state::AppState;
use crate::utils::{jwt, password};

pub(crate) async fn user_response(state: &AppState, row: &UserWithAvatar) -> UserResponse {
    UserResponse {
        id: row.user.id,
        name: row.user.name.clone(),
        email: row.user.email.clone(),
        role: row.user.role,
        phone: row.user.phone.clone(),
        join_date: row.user.created_at.format("%Y-%m-%d").to_string(),
        avatar: file::optional_response(state, row.avatar.as_ref()).await,
    }
}

async fn load(state: &AppState, user_id: i64) -> Result<UserResponse, AppError> {
    let row = UserRepo::new(&state.db)
        .find_by_id(user_id, &QueryOptions::new().preload(UserLink::Avatar))
        .await?;
    Ok(user_response(state, &row).await)
}

/// Exchange an email or name plus password for a bearer token. Unknown
/// users and wrong passwords are indistinguishable to the caller.
pub async fn login(state: &AppState, payload: LoginRequest) -> Result<LoginResponse, AppError> {
    let key = payload.username.trim();
    if key.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("username and password are required".into()));
    }

    let found = UserRepo::new(&state.db).find_by_key(key).await?;
    let account = match found {
        Some(account) if password::verify(&payload.password, &account.password) => account,
        _ => {
            tracing::info!(username = key, "login rejected");
            return Err(AppError::InvalidCredentials);
        }
    };

    let token = jwt::sign(
        &state.config.auth,
        account.id,
        &account.name,
        &account.role.to_value(),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))?;
    tracing::info!(user_id = account.id, "user logged in");

    Ok(LoginResponse {
        token,
        expires_in: state.config.auth.expire_secs,
        user: load(state, account.id).await?,
    })
}

pub async fn me(state: &AppState, user_id: i64) -> Result<UserResponse, AppError> {
    load(state, user_id).await
}

pub async fn list(state: &AppState) -> Result<Vec<UserResponse>, AppError> {
    let rows = UserRepo::new(&state.db)
        .list(&QueryOptions::new().preload(UserLink::Avatar))
        .await?;
    Ok(join_all(rows.iter().map(|row| user_response(state, row))).await)
}

/// Update profile fields. A changed avatar swaps the avatar association in
/// the same transaction as the row update.
pub async fn update(
    state: &AppState,
    user_id: i64,
    payload: UpdateUserRequest,
) -> Result<UserResponse, AppError> {
    let repo = UserRepo::new(&state.db);
    let mut current: user::Model = repo.find_by_id(user_id, &QueryOptions::new()).await?.user;

    current.name = required_text(&payload.name, "name", 50)?;
    current.email = validate_email(&payload.email)?;
    if let Some(phone) = payload.phone {
        current.phone = phone.trim().to_string();
    }
    if let Some(avatar_id) = payload.avatar_id {
        if let Some(id) = avatar_id {
            file::require_files(state, &[id]).await?;
        }
        current.avatar_id = avatar_id;
    }
    if !payload.new_password.is_empty() {
        validate_password(&payload.new_password)?;
        current.password = password::hash(&payload.new_password)
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))?;
    }

    if let Some(email) = &current.email {
        if let Some(other) = repo.find_by_key(email).await? {
            if other.id != user_id {
                return Err(AppError::Conflict("email already in use".into()));
            }
        }
    }

    repo.update_with_avatar(current).await?;
    tracing::info!(user_id, "user updated");
    load(state, user_id).await
}

/// Avatars the user has ever set, newest first.
pub async fn avatar_history(
    state: &AppState,
    user_id: i64,
    page: PageRequest,
) -> Result<AvatarHistoryResponse, AppError> {
    UserRepo::new(&state.db)
        .find_by_id(user_id, &QueryOptions::new())
        .await?;
    let (files, total) = EntityFileRepo::new(&state.db)
        .associated_files_paginated(
            user_id,
            EntityType::UserAvatar,
            page,
            &QueryOptions::new().order_by("entity_files.created_at", Order::Desc),
        )
        .await?;
    let views = file::responses(state, &files).await;
    let avatars = files
        .iter()
        .zip(views)
        .map(|(model, view)| AvatarHistoryItem {
            id: model.id,
            url: view.url,
            thumbnail_url: view.thumbnail,
            created_at: model.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
        .collect();
    Ok(AvatarHistoryResponse {
        avatars,
        pagination: Pagination::new(page, total),
    })
}

pub async fn remove_avatar(state: &AppState, user_id: i64, file_id: i64) -> Result<(), AppError> {
    UserRepo::new(&state.db)
        .remove_avatar(user_id, file_id)
        .await?;
    tracing::info!(user_id, file_id, "avatar removed from history");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::user::Role;
    use crate::repo::test_support::{PASSWORD, create_file, create_user};
    use crate::state::test_state;

    fn login_as(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    fn rename(name: &str) -> UpdateUserRequest {
        UpdateUserRequest {
            name: name.into(),
            email: String::new(),
            phone: None,
            avatar_id: None,
            new_password: String::new(),
        }
    }

    #[tokio::test]
    async fn login_accepts_email_or_name() {
        let (state, _dir) = test_state().await;
        let user = create_user(&state.db, "ann", Role::Girl).await;

        let by_name = login(&state, login_as("ann", PASSWORD)).await.unwrap();
        let claims = jwt::verify(&state.config.auth, &by_name.token).unwrap();
        assert_eq!(claims.uid, user.id);
        assert_eq!(claims.role, "girl");
        assert_eq!(by_name.user.name, "ann");

        assert!(login(&state, login_as("ann@example.com", PASSWORD)).await.is_ok());
        assert!(matches!(
            login(&state, login_as("ann", "wrong-password")).await,
            Err(AppError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&state, login_as("nobody", PASSWORD)).await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn avatar_swap_moves_the_association() {
        let (state, _dir) = test_state().await;
        let user = create_user(&state.db, "ann", Role::Girl).await;
        let first = create_file(&state.db, "a.png").await;
        let second = create_file(&state.db, "b.png").await;

        for avatar in [first.id, second.id] {
            update(
                &state,
                user.id,
                UpdateUserRequest {
                    avatar_id: Some(Some(avatar)),
                    ..rename("ann")
                },
            )
            .await
            .unwrap();
        }

        let current = me(&state, user.id).await.unwrap();
        assert_eq!(current.avatar.map(|f| f.id), Some(second.id));
        let history = avatar_history(&state, user.id, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(history.pagination.total, 1);
        assert_eq!(history.avatars[0].id, second.id);

        remove_avatar(&state, user.id, second.id).await.unwrap();
        assert!(me(&state, user.id).await.unwrap().avatar.is_none());
    }

    #[tokio::test]
    async fn new_password_replaces_the_old_one() {
        let (state, _dir) = test_state().await;
        let user = create_user(&state.db, "ann", Role::Girl).await;
        update(
            &state,
            user.id,
            UpdateUserRequest {
                new_password: "another-secret".into(),
                ..rename("ann")
            },
        )
        .await
        .unwrap();

        assert!(login(&state, login_as("ann", PASSWORD)).await.is_err());
        assert!(login(&state, login_as("ann", "another-secret")).await.is_ok());
    }

    #[tokio::test]
    async fn email_must_be_unique() {
        let (state, _dir) = test_state().await;
        create_user(&state.db, "ann", Role::Girl).await;
        let bob = create_user(&state.db, "bob", Role::Boy).await;
        let result = update(
            &state,
            bob.id,
            UpdateUserRequest {
                email: "ann@example.com".into(),
                ..rename("bob")
            },
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
