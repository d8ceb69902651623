/**
 * Recipe Routes
 * CRUD endpoints, premium-gated detail, and the view-credit entry point
 */
use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json as SqlJson;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{
    self,
    models::{ApprovalStatus, Ingredient, Recipe},
};
use crate::premium::compensation::{self, CompensationError};
use crate::premium::gate::{self, Viewer, ViewerRole};
use crate::premium::sweep;
use crate::routes::auth::requester_claims;
use crate::routes::{db_unavailable, msg_response};

const RECIPE_COLUMNS: &str = "id, title, description, ingredients, steps, writer_id, is_premium, \
     category, approval_status, approval_date, creation_date, image_url, num_of_views";

const PREMIUM_CALL_TO_ACTION: &str =
    "Subscribe to premium to unlock this recipe's steps and ingredients";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /api/recipes
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub title: String,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<String>,
    pub writer_id: Uuid,
    pub is_premium: bool,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
}

/// Request body for PUT /api/recipes/:id
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Option<Vec<Ingredient>>,
    pub steps: Option<Vec<String>>,
    pub is_premium: Option<bool>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub approval_status: Option<ApprovalStatus>,
}

/// Request body for PUT /api/recipes/:id/increment-views
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncrementViewsRequest {
    pub user_id: Option<Uuid>,
}

/// Summary shape for list endpoints: premium content never leaks here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub writer_id: Uuid,
    pub is_premium: bool,
    pub category: Option<String>,
    pub approval_status: ApprovalStatus,
    pub creation_date: DateTime<Utc>,
    pub image_url: Option<String>,
    pub num_of_views: i64,
}

impl From<Recipe> for RecipeSummary {
    fn from(r: Recipe) -> Self {
        RecipeSummary {
            id: r.id,
            title: r.title,
            description: r.description,
            writer_id: r.writer_id,
            is_premium: r.is_premium,
            category: r.category,
            approval_status: r.approval_status,
            creation_date: r.creation_date,
            image_url: r.image_url,
            num_of_views: r.num_of_views,
        }
    }
}

/// Gated detail shape: steps/ingredients are withheld for locked viewers
/// and a purchase call-to-action is surfaced instead.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub writer_id: Uuid,
    pub is_premium: bool,
    pub category: Option<String>,
    pub approval_status: ApprovalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<DateTime<Utc>>,
    pub creation_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub num_of_views: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<Vec<Ingredient>>,
    pub premium_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_to_action: Option<String>,
}

impl RecipeDetailResponse {
    pub fn from_recipe(recipe: Recipe, full_content: bool) -> Self {
        let locked = !full_content;
        RecipeDetailResponse {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            writer_id: recipe.writer_id,
            is_premium: recipe.is_premium,
            category: recipe.category,
            approval_status: recipe.approval_status,
            approval_date: recipe.approval_date,
            creation_date: recipe.creation_date,
            image_url: recipe.image_url,
            num_of_views: recipe.num_of_views,
            steps: full_content.then_some(recipe.steps),
            ingredients: full_content.then(|| recipe.ingredients.0),
            premium_locked: locked,
            call_to_action: locked.then(|| PREMIUM_CALL_TO_ACTION.to_string()),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn fetch_recipe(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Recipe>> {
    sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {} FROM recipes WHERE id = $1",
        RECIPE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

async fn is_admin(pool: &PgPool, user_id: Uuid) -> sqlx::Result<bool> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM admins WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

async fn has_viewed(pool: &PgPool, recipe_id: Uuid, viewer_id: Uuid) -> sqlx::Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM recipe_viewers WHERE recipe_id = $1 AND viewer_id = $2)",
    )
    .bind(recipe_id)
    .bind(viewer_id)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Build the gate's picture of the requester from an optional bearer token.
async fn viewer_from_headers(pool: &PgPool, headers: &HeaderMap) -> Viewer {
    let Some(claims) = requester_claims(headers) else {
        return Viewer::anonymous();
    };
    let Some(user_id) = claims.user_id() else {
        return Viewer::anonymous();
    };

    let role = claims.viewer_role();
    let has_active_subscription = if role == ViewerRole::Admin {
        false
    } else {
        match sweep::is_active_for(pool, user_id).await {
            Ok(sub) => sub.is_some(),
            Err(e) => {
                tracing::error!("subscription lookup failed during gating: {}", e);
                false
            }
        }
    };

    Viewer {
        id: Some(user_id),
        role,
        has_active_subscription,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/recipes - List approved recipes as summaries
pub async fn list_recipes() -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    match sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {} FROM recipes WHERE approval_status = 'Approved' ORDER BY creation_date DESC",
        RECIPE_COLUMNS
    ))
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(recipes) => {
            let summaries: Vec<RecipeSummary> =
                recipes.into_iter().map(RecipeSummary::from).collect();
            (StatusCode::OK, Json(summaries)).into_response()
        }
        Err(e) => {
            tracing::error!("Database error listing recipes: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
        }
    }
}

/// GET /api/recipes/user/:writer_id - A writer's own recipes, unabridged
pub async fn recipes_by_writer(Path(writer_id): Path<Uuid>) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    match sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {} FROM recipes WHERE writer_id = $1 ORDER BY creation_date DESC",
        RECIPE_COLUMNS
    ))
    .bind(writer_id)
    .fetch_all(pool.as_ref())
    .await
    {
        Ok(recipes) => (StatusCode::OK, Json(recipes)).into_response(),
        Err(e) => {
            tracing::error!("Database error listing writer recipes: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
        }
    }
}

/// GET /api/recipes/:id - Premium-gated recipe detail
pub async fn get_recipe(headers: HeaderMap, Path(id): Path<Uuid>) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    let recipe = match fetch_recipe(pool.as_ref(), id).await {
        Ok(Some(r)) => r,
        Ok(None) => {
            return msg_response(StatusCode::NOT_FOUND, "Recipe not found").into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching recipe: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                .into_response();
        }
    };

    let viewer = viewer_from_headers(pool.as_ref(), &headers).await;
    let full_content = gate::full_content_visible(&viewer, recipe.is_premium);

    (
        StatusCode::OK,
        Json(RecipeDetailResponse::from_recipe(recipe, full_content)),
    )
        .into_response()
}

/// POST /api/recipes - Create a recipe (author must be an Approved writer
/// or an existing subscriber)
pub async fn create_recipe(Json(payload): Json<CreateRecipeRequest>) -> impl IntoResponse {
    if payload.title.trim().is_empty() {
        return msg_response(StatusCode::BAD_REQUEST, "Title is required").into_response();
    }
    if payload.description.trim().is_empty() {
        return msg_response(StatusCode::BAD_REQUEST, "Description is required").into_response();
    }
    if payload.steps.is_empty() {
        return msg_response(StatusCode::BAD_REQUEST, "At least one step is required")
            .into_response();
    }
    if payload.ingredients.is_empty() {
        return msg_response(StatusCode::BAD_REQUEST, "At least one ingredient is required")
            .into_response();
    }

    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    // Publishing is gated on writer approval; subscriber-authors are not
    // moderated as accounts, only their recipes are.
    let writer_status: Option<(ApprovalStatus,)> =
        match sqlx::query_as("SELECT status FROM recipe_writers WHERE id = $1")
            .bind(payload.writer_id)
            .fetch_optional(pool.as_ref())
            .await
        {
            Ok(row) => row,
            Err(e) => {
                tracing::error!("Database error resolving author: {}", e);
                return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                    .into_response();
            }
        };

    match writer_status {
        Some((status,)) if status != ApprovalStatus::Approved => {
            return msg_response(
                StatusCode::FORBIDDEN,
                "Recipe writer is not approved to publish",
            )
            .into_response();
        }
        Some(_) => {}
        None => {
            let subscriber_exists: Result<(bool,), _> =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM subscribers WHERE id = $1)")
                    .bind(payload.writer_id)
                    .fetch_one(pool.as_ref())
                    .await;
            match subscriber_exists {
                Ok((true,)) => {}
                Ok((false,)) => {
                    return msg_response(StatusCode::NOT_FOUND, "Recipe writer not found")
                        .into_response();
                }
                Err(e) => {
                    tracing::error!("Database error resolving author: {}", e);
                    return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                        .into_response();
                }
            }
        }
    }

    let approval_status = payload.approval_status.unwrap_or(ApprovalStatus::Pending);
    let approval_date =
        (approval_status == ApprovalStatus::Approved).then(Utc::now);

    match sqlx::query_as::<_, Recipe>(&format!(
        "INSERT INTO recipes \
             (title, description, ingredients, steps, writer_id, is_premium, category, \
              approval_status, approval_date, image_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {}",
        RECIPE_COLUMNS
    ))
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(SqlJson(&payload.ingredients))
    .bind(&payload.steps)
    .bind(payload.writer_id)
    .bind(payload.is_premium)
    .bind(&payload.category)
    .bind(approval_status)
    .bind(approval_date)
    .bind(&payload.image_url)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(recipe) => (StatusCode::CREATED, Json(recipe)).into_response(),
        Err(e) => {
            tracing::error!("Database error creating recipe: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create recipe")
                .into_response()
        }
    }
}

/// PUT /api/recipes/:id - Update a recipe (content edits and moderation)
pub async fn update_recipe(
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRecipeRequest>,
) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    let existing = match fetch_recipe(pool.as_ref(), id).await {
        Ok(Some(r)) => r,
        Ok(None) => {
            return msg_response(StatusCode::NOT_FOUND, "Recipe not found").into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching recipe: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                .into_response();
        }
    };

    let title = payload.title.unwrap_or(existing.title);
    let description = payload.description.unwrap_or(existing.description);
    let ingredients = payload.ingredients.unwrap_or(existing.ingredients.0);
    let steps = payload.steps.unwrap_or(existing.steps);
    let is_premium = payload.is_premium.unwrap_or(existing.is_premium);
    let category = payload.category.or(existing.category);
    let image_url = payload.image_url.or(existing.image_url);
    let approval_status = payload.approval_status.unwrap_or(existing.approval_status);

    // Stamp the approval time on the Pending -> Approved transition.
    let approval_date = if approval_status == ApprovalStatus::Approved {
        existing.approval_date.or_else(|| Some(Utc::now()))
    } else {
        existing.approval_date
    };

    match sqlx::query_as::<_, Recipe>(&format!(
        "UPDATE recipes SET title = $1, description = $2, ingredients = $3, steps = $4, \
             is_premium = $5, category = $6, image_url = $7, approval_status = $8, \
             approval_date = $9 \
         WHERE id = $10 \
         RETURNING {}",
        RECIPE_COLUMNS
    ))
    .bind(&title)
    .bind(&description)
    .bind(SqlJson(&ingredients))
    .bind(&steps)
    .bind(is_premium)
    .bind(&category)
    .bind(&image_url)
    .bind(approval_status)
    .bind(approval_date)
    .bind(id)
    .fetch_one(pool.as_ref())
    .await
    {
        Ok(recipe) => (StatusCode::OK, Json(recipe)).into_response(),
        Err(e) => {
            tracing::error!("Database error updating recipe: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update recipe")
                .into_response()
        }
    }
}

/// DELETE /api/recipes/:id
pub async fn delete_recipe(Path(id): Path<Uuid>) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    match sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(pool.as_ref())
        .await
    {
        Ok(result) if result.rows_affected() == 0 => {
            msg_response(StatusCode::NOT_FOUND, "Recipe not found").into_response()
        }
        Ok(_) => msg_response(StatusCode::OK, "Recipe removed").into_response(),
        Err(e) => {
            tracing::error!("Database error deleting recipe: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete recipe")
                .into_response()
        }
    }
}

/// PUT /api/recipes/:id/increment-views - Count a view and compensate the
/// writer, at most once per distinct viewer
pub async fn increment_views(
    Path(id): Path<Uuid>,
    Json(payload): Json<IncrementViewsRequest>,
) -> impl IntoResponse {
    let pool = match db::get_pool() {
        Some(p) => p,
        None => return db_unavailable().into_response(),
    };

    let recipe = match fetch_recipe(pool.as_ref(), id).await {
        Ok(Some(r)) => r,
        Ok(None) => {
            return msg_response(StatusCode::NOT_FOUND, "Recipe not found").into_response();
        }
        Err(e) => {
            tracing::error!("Database error fetching recipe: {}", e);
            return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                .into_response();
        }
    };

    if let Some(viewer_id) = payload.user_id {
        let (admin, already_viewed) = match tokio::try_join!(
            is_admin(pool.as_ref(), viewer_id),
            has_viewed(pool.as_ref(), id, viewer_id),
        ) {
            Ok(pair) => pair,
            Err(e) => {
                tracing::error!("Database error evaluating view gate: {}", e);
                return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                    .into_response();
            }
        };

        let viewer = Viewer {
            id: Some(viewer_id),
            role: if admin {
                ViewerRole::Admin
            } else {
                ViewerRole::Subscriber
            },
            // Subscription state is irrelevant to compensability.
            has_active_subscription: false,
        };

        if gate::is_compensable(&viewer, recipe.writer_id, recipe.is_premium, already_viewed) {
            match compensation::record_view(pool.as_ref(), recipe.id, recipe.writer_id, viewer_id)
                .await
            {
                Ok(_) => {}
                Err(CompensationError::AccountsMissing) => {
                    return msg_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Writer or Admin not found",
                    )
                    .into_response();
                }
                Err(CompensationError::Db(e)) => {
                    tracing::error!("Database error crediting view: {}", e);
                    return msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error")
                        .into_response();
                }
            }
        }
    }

    // Return current state whether or not this request moved the counter.
    match fetch_recipe(pool.as_ref(), id).await {
        Ok(Some(recipe)) => (StatusCode::OK, Json(recipe)).into_response(),
        Ok(None) => msg_response(StatusCode::NOT_FOUND, "Recipe not found").into_response(),
        Err(e) => {
            tracing::error!("Database error re-fetching recipe: {}", e);
            msg_response(StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::{get, put};
    use axum::Router;
    use chrono::Utc;
    use tower::ServiceExt;

    fn test_router() -> Router {
        Router::new()
            .route("/api/recipes", get(list_recipes).post(create_recipe))
            .route("/api/recipes/{id}", get(get_recipe))
            .route("/api/recipes/{id}/increment-views", put(increment_views))
            .route("/api/recipes/user/{writer_id}", get(recipes_by_writer))
    }

    fn sample_recipe(premium: bool) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            title: "Sourdough".to_string(),
            description: "Slow-fermented loaf".to_string(),
            ingredients: SqlJson(vec![Ingredient {
                ingredient: "flour".to_string(),
                quantity: crate::db::models::Quantity::Number(500.0),
                measurement: Some("g".to_string()),
            }]),
            steps: vec!["mix".to_string(), "proof".to_string(), "bake".to_string()],
            writer_id: Uuid::new_v4(),
            is_premium: premium,
            category: Some("bread".to_string()),
            approval_status: ApprovalStatus::Approved,
            approval_date: Some(Utc::now()),
            creation_date: Utc::now(),
            image_url: None,
            num_of_views: 7,
        }
    }

    #[test]
    fn test_locked_detail_withholds_premium_content() {
        let response = RecipeDetailResponse::from_recipe(sample_recipe(true), false);
        assert!(response.premium_locked);
        assert!(response.steps.is_none());
        assert!(response.ingredients.is_none());
        assert_eq!(
            response.call_to_action.as_deref(),
            Some(PREMIUM_CALL_TO_ACTION)
        );

        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("\"steps\""));
        assert!(!json.contains("\"ingredients\""));
        assert!(json.contains("\"premiumLocked\":true"));
    }

    #[test]
    fn test_unlocked_detail_includes_full_content() {
        let response = RecipeDetailResponse::from_recipe(sample_recipe(true), true);
        assert!(!response.premium_locked);
        assert_eq!(response.steps.as_ref().map(Vec::len), Some(3));
        assert!(response.ingredients.is_some());
        assert!(response.call_to_action.is_none());
    }

    #[test]
    fn test_summary_never_carries_steps() {
        let summary = RecipeSummary::from(sample_recipe(false));
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("steps"));
        assert!(!json.contains("ingredients"));
        assert!(json.contains("\"numOfViews\":7"));
    }

    #[tokio::test]
    async fn test_get_recipe_invalid_uuid_returns_bad_request() {
        let req = Request::get("/api/recipes/not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_increment_views_without_pool_returns_service_unavailable() {
        let body = serde_json::to_vec(&IncrementViewsRequest {
            user_id: Some(Uuid::new_v4()),
        })
        .unwrap();
        let req = Request::put(format!("/api/recipes/{}/increment-views", Uuid::new_v4()))
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_create_recipe_empty_title_returns_bad_request() {
        let body = serde_json::json!({
            "title": "  ",
            "description": "something",
            "ingredients": [{"ingredient": "x", "quantity": 1}],
            "steps": ["do it"],
            "writerId": Uuid::new_v4(),
            "isPremium": false
        });
        let req = Request::post("/api/recipes")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_recipe_rejects_unknown_approval_status() {
        let body = serde_json::json!({
            "title": "t",
            "description": "d",
            "ingredients": [{"ingredient": "x", "quantity": 1}],
            "steps": ["s"],
            "writerId": Uuid::new_v4(),
            "isPremium": false,
            "approvalStatus": "published"
        });
        let req = Request::post("/api/recipes")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        // Serde rejects the enum value before the handler runs.
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_recipe_accepts_lowercase_approval_status() {
        let body = serde_json::json!({
            "title": "t",
            "description": "d",
            "ingredients": [{"ingredient": "x", "quantity": 1}],
            "steps": ["s"],
            "writerId": Uuid::new_v4(),
            "isPremium": false,
            "approvalStatus": "approved"
        });
        let req = Request::post("/api/recipes")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        let res = test_router().oneshot(req).await.unwrap();
        // Parses fine; without a database pool the handler reports 503.
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
