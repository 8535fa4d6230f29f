//! Catalog administration handlers.

use actix_web::{HttpResponse, web};

use quill_core::services::catalog;
use quill_shared::ApiResponse;
use quill_shared::dto::{CategoryRequest, TagRequest};

use crate::middleware::auth::CurrentRequester;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /admin/categories
pub async fn create_category(
    state: web::Data<AppState>,
    CurrentRequester(requester): CurrentRequester,
    body: web::Json<CategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = catalog::create_category(&state.store, &requester, &body.name).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(category, "Category created")))
}

/// POST /admin/tags
pub async fn create_tag(
    state: web::Data<AppState>,
    CurrentRequester(requester): CurrentRequester,
    body: web::Json<TagRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let tag = catalog::create_tag(&state.store, &requester, &req.name, req.slug.as_deref()).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(tag, "Tag created")))
}
