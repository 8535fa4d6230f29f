//! Site pages outside the blog scope.

use actix_web::{HttpResponse, web};

use quill_core::services::query;

use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET / - the newest posts.
pub async fn landing(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let context = query::landing(&state.store).await?;
    Ok(HttpResponse::Ok().json(context))
}
