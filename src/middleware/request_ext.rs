//! Access to the claims stored by [`AuthMiddleware`](super::AuthMiddleware).

use actix_web::HttpMessage;

use crate::models::Claims;

pub trait RequestExt {
    /// Claims of the signed-in user, `None` outside the protected scopes.
    fn get_claims(&self) -> Option<Claims>;

    /// Raw bearer token the request was authenticated with.
    fn bearer_token(&self) -> Option<String>;
}

impl RequestExt for actix_web::HttpRequest {
    fn get_claims(&self) -> Option<Claims> {
        self.extensions().get::<Claims>().cloned()
    }

    fn bearer_token(&self) -> Option<String> {
        self.extensions().get::<String>().cloned()
    }
}
