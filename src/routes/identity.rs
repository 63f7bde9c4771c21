use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::dao::models::UserId;

/// Header carrying the identity of the caller, set by the authentication layer in front of us.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Acting identity of a request; `None` when the header is absent or blank.
#[derive(Debug, Clone)]
pub struct ActingUser(pub Option<UserId>);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(UserId::parse);
        Ok(ActingUser(user))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> Option<UserId> {
        let (mut parts, _) = request.into_parts();
        let ActingUser(user) = ActingUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        user
    }

    #[tokio::test]
    async fn reads_trimmed_header() {
        let request = Request::builder()
            .header("X-User-Id", " u1 ")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await, UserId::parse("u1"));
    }

    #[tokio::test]
    async fn missing_or_blank_header_is_anonymous() {
        assert_eq!(extract(Request::new(())).await, None);

        let request = Request::builder().header("X-User-Id", "").body(()).unwrap();
        assert_eq!(extract(request).await, None);
    }
}
