use crate::error::HuddleError;
use actix_web::HttpRequest;
use huddle_domain::{User, ID};
use huddle_infra::HuddleContext;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub exp: usize,     // Expiration time (as UTC timestamp)
    pub iat: usize,     // Issued at (as UTC timestamp)
    pub user_id: ID,    // Subject (whom token refers to)
}

fn parse_authtoken_header(token_header_value: &str) -> String {
    token_header_value
        .replace("Bearer", "")
        .replace("bearer", "")
        .trim()
        .to_string()
}

pub fn decode_token(secret: &str, token: &str) -> anyhow::Result<Claims> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?
    .claims;

    Ok(claims)
}

/// The auth provider owns user identities. The first valid token for
/// an unknown id creates the corresponding user row.
async fn create_user_if_not_exists(user_id: &ID, ctx: &HuddleContext) -> Option<User> {
    if let Some(user) = ctx.repos.users.find(user_id).await {
        return Some(user);
    }

    let user = User::new(user_id.clone(), ctx.sys.get_timestamp_millis());
    match ctx.repos.users.insert(&user).await {
        Ok(_) => Some(user),
        Err(e) => {
            error!("Unable to create user: {}. Error: {:?}", user_id, e);
            None
        }
    }
}

pub async fn auth_user_req(req: &HttpRequest, ctx: &HuddleContext) -> Option<User> {
    let token = req.headers().get("authorization")?;
    let token = match token.to_str() {
        Ok(token) => parse_authtoken_header(token),
        Err(_) => return None,
    };
    match decode_token(&ctx.config.jwt_secret, &token) {
        Ok(claims) => create_user_if_not_exists(&claims.user_id, ctx).await,
        Err(_) => None,
    }
}

pub async fn protect_route(req: &HttpRequest, ctx: &HuddleContext) -> Result<User, HuddleError> {
    match auth_user_req(req, ctx).await {
        Some(user) => Ok(user),
        None => Err(HuddleError::Unauthorized(
            "Unable to find user from credentials".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn encode_token(secret: &str, user_id: &ID, expires_in_secs: i64) -> String {
        let now_secs = 1_700_000_000usize;
        let claims = Claims {
            exp: (now_secs as i64 + expires_in_secs) as usize,
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

    #[test]
    fn decodes_valid_token() {
        let user_id = ID::default();
        let token = encode_token("secret", &user_id, 60 * 60 * 24 * 365 * 100);
        let claims = decode_token("secret", &token).expect("Valid token");
        assert_eq!(claims.user_id, user_id);
    }

    #[test]
    fn rejects_token_with_wrong_secret() {
        let token = encode_token("secret", &ID::default(), 60 * 60 * 24 * 365 * 100);
        assert!(decode_token("other-secret", &token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let token = encode_token("secret", &ID::default(), -60);
        assert!(decode_token("secret", &token).is_err());
    }

    #[test]
    fn strips_bearer_prefix() {
        assert_eq!(parse_authtoken_header("Bearer abc"), "abc");
        assert_eq!(parse_authtoken_header("bearer abc"), "abc");
        assert_eq!(parse_authtoken_header("abc"), "abc");
    }
}
