//! Authentication extractors.
//!
//! Blog pages are public, so a missing or unusable token never fails the
//! request; it only makes the requester anonymous. Permission decisions are
//! left to the services.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};
use std::sync::Arc;

use quill_core::ports::{AuthError, Identity, Requester, TokenService};

/// The party behind the request, as seen by the services.
///
/// ```ignore
/// async fn page(CurrentRequester(requester): CurrentRequester) -> impl Responder {
///     format!("staff: {}", requester.is_staff())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentRequester(pub Requester);

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuth)?;
    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidToken("Invalid authorization header".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidToken("Expected Bearer token".to_string()))
}

fn identify(req: &HttpRequest) -> Result<Identity, AuthError> {
    let token_service = req
        .app_data::<web::Data<Arc<dyn TokenService>>>()
        .ok_or_else(|| {
            tracing::error!("TokenService not found in app data");
            AuthError::InvalidToken("Server configuration error".to_string())
        })?;

    let claims = token_service.validate_token(bearer_token(req)?)?;
    Ok(Identity::from(claims))
}

impl FromRequest for CurrentRequester {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let requester = match identify(req) {
            Ok(identity) => Requester::Authenticated(identity),
            Err(AuthError::MissingAuth) => Requester::Anonymous,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unusable credentials");
                Requester::Anonymous
            }
        };
        ready(Ok(CurrentRequester(requester)))
    }
}
