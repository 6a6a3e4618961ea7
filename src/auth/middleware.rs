use std::sync::Arc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::extractors::AuthenticatedUserId;
use crate::auth::token::SessionTokenAuthority;
use crate::auth::TOKEN_COOKIE;
use crate::error::AppError;

/// Session gate for protected scopes.
///
/// Reads the token from `Authorization: Bearer ...` or, failing that, the `token`
/// cookie. A verified request continues with an `AuthenticatedUserId` in its
/// extensions; anything else is answered with 401 and never reaches the handler.
pub struct AuthMiddleware {
    authority: Arc<SessionTokenAuthority>,
}

impl AuthMiddleware {
    pub fn new(authority: Arc<SessionTokenAuthority>) -> Self {
        Self { authority }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            authority: self.authority.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    authority: Arc<SessionTokenAuthority>,
}

/// Pulls the raw token out of a request, header first. A blank bearer value
/// does not shadow the cookie.
pub fn extract_token(req: &ServiceRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned);

    bearer.or_else(|| req.cookie(TOKEN_COOKIE).map(|c| c.value().to_owned()))
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = extract_token(&req);

        match self.authority.verify(token.as_deref().unwrap_or("")) {
            Ok(user_id) => {
                req.extensions_mut().insert(AuthenticatedUserId(user_id));
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(reason) => {
                log::debug!("Rejected request to {}: {}", req.path(), reason);
                let app_err: AppError = reason.into();
                Box::pin(async move { Err(app_err.into()) })
            }
        }
    }
}
