use futures::future::join_all;
use sea_orm::ActiveValue::Set;
use sea_orm::Order;

use super::file;
use crate::entity::moment;
use crate::error::AppError;
use crate::extractors::auth::AuthUser;
use crate::models::moment::*;
use crate::models::shared::Pagination;
use crate::repo::{
    FilterCondition, MomentEdit, MomentLink, MomentRepo, MomentWithRelations, PageRequest, QueryOptions,
};
use crate::state::AppState;

async fn moment_response(state: &AppState, row: &MomentWithRelations) -> MomentResponse {
    let author = match &row.author {
        Some(author) => Some(MomentAuthor {
            name: author.user.name.clone(),
            avatar: file::optional_response(state, author.avatar.as_ref()).await,
        }),
        None => None,
    };
    MomentResponse {
        id: row.moment.id,
        content: row.moment.content.clone(),
        images: file::responses(state, &row.images).await,
        likes: row.moment.likes,
        is_public: row.moment.is_public,
        author,
        created_at: row.moment.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

fn with_relations(options: QueryOptions<MomentLink>) -> QueryOptions<MomentLink> {
    options
        .preload(MomentLink::Images)
        .preload(MomentLink::Author)
}

async fn load(state: &AppState, moment_id: i64) -> Result<MomentResponse, AppError> {
    let row = MomentRepo::new(&state.db)
        .find_by_id(moment_id, &with_relations(QueryOptions::new()))
        .await?;
    Ok(moment_response(state, &row).await)
}

/// Signed-in users see their own moments, everybody else the public ones.
pub async fn list(
    state: &AppState,
    viewer: Option<&AuthUser>,
    page: PageRequest,
) -> Result<MomentListResponse, AppError> {
    let scope = match viewer {
        Some(user) => FilterCondition::eq("user_id", user.user_id),
        None => FilterCondition::eq("is_public", true),
    };
    let options = with_relations(
        QueryOptions::new()
            .filter(scope)
            .order_by("created_at", Order::Desc),
    );
    let (rows, total) = MomentRepo::new(&state.db)
        .find_with_pagination(page, &options)
        .await?;
    Ok(MomentListResponse {
        moments: join_all(rows.iter().map(|row| moment_response(state, row))).await,
        pagination: Pagination::new(page, total),
    })
}

pub async fn create(
    state: &AppState,
    author: &AuthUser,
    payload: CreateMomentRequest,
) -> Result<MomentResponse, AppError> {
    let content = validate_content(&payload.content)?;
    validate_image_ids(&payload.image_ids)?;
    file::require_files(state, &payload.image_ids).await?;

    let created = MomentRepo::new(&state.db)
        .create_with_images(
            moment::ActiveModel {
                content: Set(content),
                likes: Set(0),
                is_public: Set(payload.is_public),
                user_id: Set(author.user_id),
                ..Default::default()
            },
            &payload.image_ids,
        )
        .await?;
    tracing::info!(moment_id = created.id, user_id = author.user_id, "moment created");
    load(state, created.id).await
}

pub async fn update(
    state: &AppState,
    moment_id: i64,
    payload: UpdateMomentRequest,
) -> Result<MomentResponse, AppError> {
    let edit = MomentEdit {
        content: payload.content.as_deref().map(validate_content).transpose()?,
        is_public: payload.is_public,
    };
    if let Some(ids) = &payload.image_ids {
        validate_image_ids(ids)?;
        file::require_files(state, ids).await?;
    }
    MomentRepo::new(&state.db)
        .update_with_images(moment_id, edit, payload.image_ids.as_deref())
        .await?;
    load(state, moment_id).await
}

pub async fn delete(state: &AppState, moment_id: i64) -> Result<(), AppError> {
    MomentRepo::new(&state.db).delete_with_images(moment_id).await?;
    tracing::info!(moment_id, "moment deleted");
    Ok(())
}

pub async fn set_public(
    state: &AppState,
    moment_id: i64,
    payload: MomentVisibilityRequest,
) -> Result<MomentResponse, AppError> {
    MomentRepo::new(&state.db)
        .set_public(moment_id, payload.is_public)
        .await?;
    load(state, moment_id).await
}

pub async fn like(state: &AppState, moment_id: i64) -> Result<MomentLikeResponse, AppError> {
    let likes = MomentRepo::new(&state.db).increment_likes(moment_id).await?;
    Ok(MomentLikeResponse { likes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::user::Role;
    use crate::repo::test_support::{create_file, create_user};
    use crate::state::test_state;

    fn author(user_id: i64) -> AuthUser {
        AuthUser {
            user_id,
            name: "a".into(),
            role: "boy".into(),
        }
    }

    fn request(content: &str, is_public: bool, image_ids: Vec<i64>) -> CreateMomentRequest {
        CreateMomentRequest {
            content: content.into(),
            image_ids,
            is_public,
        }
    }

    #[tokio::test]
    async fn anonymous_viewers_only_see_public_moments() {
        let (state, _dir) = test_state().await;
        let boy = create_user(&state.db, "boy", Role::Boy).await.id;
        let girl = create_user(&state.db, "girl", Role::Girl).await.id;
        create(&state, &author(boy), request("public", true, vec![]))
            .await
            .unwrap();
        create(&state, &author(boy), request("private", false, vec![]))
            .await
            .unwrap();
        create(&state, &author(girl), request("hers", true, vec![]))
            .await
            .unwrap();

        let public = list(&state, None, PageRequest::default()).await.unwrap();
        assert_eq!(public.pagination.total, 2);
        assert!(public.moments.iter().all(|m| m.is_public));

        let own = list(&state, Some(&author(boy)), PageRequest::default())
            .await
            .unwrap();
        let contents: Vec<_> = own.moments.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["private", "public"]);
        assert_eq!(own.moments[0].author.as_ref().unwrap().name, "boy");
    }

    #[tokio::test]
    async fn update_replaces_images_only_when_given() {
        let (state, _dir) = test_state().await;
        let user = create_user(&state.db, "boy", Role::Boy).await.id;
        let a = create_file(&state.db, "a.jpg").await;
        let b = create_file(&state.db, "b.jpg").await;
        let created = create(&state, &author(user), request("x", true, vec![a.id]))
            .await
            .unwrap();

        let kept = update(
            &state,
            created.id,
            UpdateMomentRequest {
                content: Some("edited".into()),
                image_ids: None,
                is_public: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(kept.content, "edited");
        assert_eq!(kept.images.iter().map(|f| f.id).collect::<Vec<_>>(), vec![a.id]);

        let swapped = update(
            &state,
            created.id,
            UpdateMomentRequest {
                content: None,
                image_ids: Some(vec![b.id]),
                is_public: Some(false),
            },
        )
        .await
        .unwrap();
        assert!(!swapped.is_public);
        assert_eq!(swapped.images.iter().map(|f| f.id).collect::<Vec<_>>(), vec![b.id]);
    }

    #[tokio::test]
    async fn likes_accumulate_and_visibility_toggles() {
        let (state, _dir) = test_state().await;
        let user = create_user(&state.db, "boy", Role::Boy).await.id;
        let created = create(&state, &author(user), request("x", false, vec![]))
            .await
            .unwrap();

        like(&state, created.id).await.unwrap();
        assert_eq!(like(&state, created.id).await.unwrap().likes, 2);

        let shown = set_public(&state, created.id, MomentVisibilityRequest { is_public: true })
            .await
            .unwrap();
        assert!(shown.is_public);
        assert_eq!(shown.likes, 2);

        delete(&state, created.id).await.unwrap();
        assert!(matches!(like(&state, created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn too_many_images_are_rejected() {
        let (state, _dir) = test_state().await;
        let user = create_user(&state.db, "boy", Role::Boy).await.id;
        let ids = (1..=(MAX_IMAGES as i64 + 1)).collect();
        assert!(matches!(
            create(&state, &author(user), request("x", true, ids)).await,
            Err(AppError::Validation(_))
        ));
    }
}
