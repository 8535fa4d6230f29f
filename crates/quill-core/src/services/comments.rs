//! Comment submission flow.

use validator::Validate;

use crate::domain::{Comment, CommentInput, NewComment, post_url};
use crate::error::DomainError;
use crate::ports::{ContentStore, Requester};
use crate::services::guard;

/// How the comment endpoint was called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentRequest {
    /// A plain visit; nothing to store.
    Visit,
    /// A form submission.
    Submit(CommentInput),
}

/// Where the client goes next, and the comment stored on the way, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOutcome {
    pub location: String,
    pub comment: Option<Comment>,
}

/// Attach a comment to a post on behalf of the requester.
///
/// The post is looked up before permissions are checked, so an unknown post
/// is reported as missing even to anonymous requesters.
pub async fn submit_comment(
    store: &ContentStore,
    requester: &Requester,
    post_id: i32,
    request: CommentRequest,
) -> Result<CommentOutcome, DomainError> {
    let post = store
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", post_id))?;

    let identity = guard::create_comment(requester).require()?;

    let input = match request {
        CommentRequest::Visit => {
            return Ok(CommentOutcome {
                location: post_url(post.id),
                comment: None,
            });
        }
        CommentRequest::Submit(input) => input,
    };

    input.validate()?;
    store.users.upsert(identity.to_user()).await?;

    let comment = store
        .comments
        .create(NewComment {
            post_id: post.id,
            author_id: identity.user_id,
            content: input.content,
        })
        .await?;

    tracing::info!(
        post_id = post.id,
        comment_id = comment.id,
        author = %identity.user_id,
        "Created comment"
    );

    Ok(CommentOutcome {
        location: comment.absolute_url(),
        comment: Some(comment),
    })
}
