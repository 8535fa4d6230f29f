//! Blog handlers - post listings, detail, and the write flows.
//!
//! Read views answer with the JSON context the presentation layer renders.
//! Successful writes and refused post creation answer with `302 Found`.

use actix_web::{HttpResponse, http::header, web};

use quill_core::domain::{CommentInput, PostInput};
use quill_core::services::{self, CommentRequest, Outcome, posts, query};
use quill_shared::dto::{CommentFormRequest, PageQuery, PostFormRequest};

use crate::middleware::auth::CurrentRequester;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn found(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

/// Split a submitted form into post fields and the raw tag string.
fn post_input(form: PostFormRequest) -> (PostInput, Option<String>) {
    let input = PostInput {
        title: form.title,
        hook_text: form.hook_text,
        content: form.content,
        head_image: form.head_image,
        file_upload: form.file_upload,
        category_id: form.category,
    };
    (input, form.tags_str)
}

/// GET /blog/?page=N
pub async fn list(state: web::Data<AppState>, page: web::Query<PageQuery>) -> AppResult<HttpResponse> {
    let context = query::list_posts(&state.store, page.into_inner().page).await?;
    Ok(HttpResponse::Ok().json(context))
}

/// GET /blog/{id}/
pub async fn detail(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let context = query::post_detail(&state.store, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(context))
}

/// GET /blog/category/{slug}/
pub async fn category(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let context = query::category_posts(&state.store, &path).await?;
    Ok(HttpResponse::Ok().json(context))
}

/// GET /blog/tag/{slug}/
pub async fn tag(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let context = query::tag_posts(&state.store, &path).await?;
    Ok(HttpResponse::Ok().json(context))
}

/// GET /blog/search/{q}/
pub async fn search(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let context = query::search_posts(&state.store, &path).await?;
    Ok(HttpResponse::Ok().json(context))
}

/// GET /blog/create_post/
pub async fn create_form(
    state: web::Data<AppState>,
    CurrentRequester(requester): CurrentRequester,
) -> AppResult<HttpResponse> {
    Ok(match posts::create_form(&state.store, &requester).await? {
        Outcome::Done(context) => HttpResponse::Ok().json(context),
        Outcome::Redirect(location) => found(location),
    })
}

/// POST /blog/create_post/
pub async fn create(
    state: web::Data<AppState>,
    CurrentRequester(requester): CurrentRequester,
    body: web::Json<PostFormRequest>,
) -> AppResult<HttpResponse> {
    let (input, tags_str) = post_input(body.into_inner());

    Ok(
        match services::create_post(&state.store, &requester, input, tags_str.as_deref()).await? {
            Outcome::Done(saved) => found(saved.location()),
            Outcome::Redirect(location) => found(location),
        },
    )
}

/// GET /blog/update_post/{id}/
pub async fn update_form(
    state: web::Data<AppState>,
    CurrentRequester(requester): CurrentRequester,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let context = posts::update_form(&state.store, &requester, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(context))
}

/// POST /blog/update_post/{id}/
pub async fn update(
    state: web::Data<AppState>,
    CurrentRequester(requester): CurrentRequester,
    path: web::Path<i32>,
    body: web::Json<PostFormRequest>,
) -> AppResult<HttpResponse> {
    let (input, tags_str) = post_input(body.into_inner());
    let saved = services::update_post(
        &state.store,
        &requester,
        path.into_inner(),
        input,
        tags_str.as_deref(),
    )
    .await?;

    Ok(found(saved.location()))
}

/// GET /blog/{id}/new_comment/
pub async fn comment_visit(
    state: web::Data<AppState>,
    CurrentRequester(requester): CurrentRequester,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let outcome = services::submit_comment(
        &state.store,
        &requester,
        path.into_inner(),
        CommentRequest::Visit,
    )
    .await?;

    Ok(found(outcome.location))
}

/// POST /blog/{id}/new_comment/
pub async fn comment(
    state: web::Data<AppState>,
    CurrentRequester(requester): CurrentRequester,
    path: web::Path<i32>,
    body: web::Json<CommentFormRequest>,
) -> AppResult<HttpResponse> {
    let input = CommentInput {
        content: body.into_inner().content,
    };
    let outcome = services::submit_comment(
        &state.store,
        &requester,
        path.into_inner(),
        CommentRequest::Submit(input),
    )
    .await?;

    Ok(found(outcome.location))
}
