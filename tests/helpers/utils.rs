use huddle_domain::ID;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Claims {
    exp: usize,
    iat: usize,
    user_id: ID,
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Valid system time")
        .as_millis() as i64
}

/// Bearer token the way the auth provider would mint it
pub fn auth_token(user_id: &ID, secret: &str) -> String {
    let now_secs = (now_millis() / 1000) as usize;
    let claims = Claims {
        exp: now_secs + 60 * 60,
        iat: now_secs,
        user_id: user_id.clone(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("To encode token")
}
