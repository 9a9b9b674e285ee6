use crate::user::UserId;
use actix_web::dev::ServiceRequest;
use actix_web::error::ErrorInternalServerError;
use actix_web::{web, Error, HttpMessage, Scope};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web_httpauth::extractors::{bearer, AuthenticationError};
use actix_web_httpauth::headers::www_authenticate::bearer::Bearer;
use jwt::JWTAuth;
use tracing::{debug, error};
use tracing_actix_web::RootSpan;

pub mod handlers;
pub mod jwt;
pub mod password;

/// `/auth/login`, plus `/auth/register` when signups are enabled.
pub fn auth_service(signups_enabled: bool) -> Scope {
    let scope = web::scope("/auth").service(handlers::login);
    if signups_enabled {
        scope.service(handlers::register)
    } else {
        scope
    }
}

/// Validates credentials using [JWTAuth]. If valid, injects the user id into request and into the
/// [RootSpan]
pub async fn credentials_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    let Some(jwt_auth) = req.app_data::<JWTAuth>() else {
        error!("JWTAuth is not registered as app data");
        return Err((ErrorInternalServerError("authentication unavailable"), req));
    };

    match jwt_auth.validate_token(credentials.token()) {
        Ok(user) => {
            if let Some(root_span) = req.extensions().get::<RootSpan>() {
                root_span.record("user_id", user);
            }
            req.extensions_mut().insert::<UserId>(user);
            Ok(req)
        }
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            let challenge = Bearer::build().error(bearer::Error::InvalidToken).finish();
            Err((AuthenticationError::new(challenge).into(), req))
        }
    }
}
