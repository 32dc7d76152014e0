/// Caller identity extraction
///
/// The gateway in front of this service owns authentication; it
/// resolves the caller and forwards the internal user id in the
/// `x-user-id` header. Handlers declare whether they require an
/// identity by taking `UserId` (401 when absent) or `MaybeUserId`
/// (anonymous reads).
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller id, required
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub i64);

/// Caller id when present; anonymous callers yield `None`
#[derive(Debug, Clone, Copy)]
pub struct MaybeUserId(pub Option<i64>);

fn user_id_from_request(req: &HttpRequest) -> Option<i64> {
    req.headers()
        .get(USER_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
        .filter(|id| *id > 0)
}

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(
            user_id_from_request(req)
                .map(UserId)
                .ok_or_else(|| AppError::Unauthorized("Missing user identity".to_string())),
        )
    }
}

impl FromRequest for MaybeUserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(MaybeUserId(user_id_from_request(req))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn header_is_parsed() {
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "42"))
            .to_http_request();
        assert_eq!(user_id_from_request(&req), Some(42));
    }

    #[test]
    fn missing_or_malformed_header_yields_none() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(user_id_from_request(&req), None);

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-number"))
            .to_http_request();
        assert_eq!(user_id_from_request(&req), None);

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "-3"))
            .to_http_request();
        assert_eq!(user_id_from_request(&req), None);
    }
}
