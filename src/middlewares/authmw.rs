use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::{
    Error, HttpMessage,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    error::{ErrorForbidden, ErrorInternalServerError, ErrorUnauthorized},
    http::header,
    web,
};
use futures_util::future::LocalBoxFuture;

use crate::db::store::UserStore;
use crate::state::app_state::AppState;
use crate::utils::jwt::{Claims, validate_token};

pub struct JwtAuth;

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Skip auth for account and health routes
        let path = req.path();
        if path.starts_with("/api/auth/") || path.starts_with("/api/health/check") {
            return Box::pin(self.service.call(req));
        }

        let (secret, users) = match req.app_data::<web::Data<AppState>>() {
            Some(state) => (state.config.jwt_secret.clone(), state.user_store.clone()),
            None => {
                return Box::pin(async move {
                    Err(ErrorInternalServerError("Application state missing"))
                });
            }
        };

        // Get token from Authorization header
        let auth_header = match req.headers().get(header::AUTHORIZATION) {
            Some(header) => header,
            None => {
                return Box::pin(async move { Err(ErrorUnauthorized("No authorization header")) });
            }
        };

        let auth_header_str = match auth_header.to_str() {
            Ok(header_str) => header_str,
            Err(_) => {
                return Box::pin(
                    async move { Err(ErrorUnauthorized("Invalid authorization header")) },
                );
            }
        };

        let token = match auth_header_str.strip_prefix("Bearer ") {
            Some(token) => token,
            None => {
                return Box::pin(
                    async move { Err(ErrorUnauthorized("Invalid authorization format")) },
                );
            }
        };

        let claims = match validate_token(token, &secret) {
            Ok(claims) => claims,
            Err(e) => {
                log::debug!("Rejected token: {:#}", e);
                return Box::pin(async move { Err(ErrorUnauthorized("Invalid token")) });
            }
        };

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            // The account may have been deleted or demoted since the token was issued
            let user = match users.get_user(&claims.sub).await {
                Ok(Some(user)) => user,
                Ok(None) => return Err(ErrorUnauthorized("Account no longer exists")),
                Err(e) => {
                    log::error!("Failed to load user {}: {}", claims.sub, e);
                    return Err(ErrorInternalServerError("Database error"));
                }
            };

            // Store claims in request extensions for the handlers
            req.extensions_mut().insert(Claims {
                username: user.username,
                is_admin: user.is_admin,
                ..claims
            });

            service.call(req).await
        })
    }
}

/// Must sit inside `JwtAuth`, which refreshes the admin flag from the store.
pub struct RequireAdmin;

impl<S, B> Transform<S, ServiceRequest> for RequireAdmin
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequireAdminMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAdminMiddleware { service }))
    }
}

pub struct RequireAdminMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequireAdminMiddleware<S>
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
        let is_admin = match req.extensions().get::<Claims>() {
            Some(claims) => claims.is_admin,
            None => {
                return Box::pin(async move { Err(ErrorUnauthorized("Authentication required")) });
            }
        };

        if !is_admin {
            return Box::pin(async move { Err(ErrorForbidden("Admin access required")) });
        }

        Box::pin(self.service.call(req))
    }
}
