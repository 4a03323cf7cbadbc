use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    ResourceOwnerPassword, ResourceOwnerUsername, TokenResponse, TokenUrl,
};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use url::Url;
use wsb_core::{CoreError, RedditApiError, RedditCredentials};

const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);
// Refresh a little early so a token never expires mid-request.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: Instant,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        Instant::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

/// Script-app authentication: trades username and password for a bearer token.
pub struct PasswordAuthenticator {
    oauth_client: BasicClient,
    http_client: Client,
    username: ResourceOwnerUsername,
    password: ResourceOwnerPassword,
}

impl PasswordAuthenticator {
    pub fn new(credentials: &RedditCredentials, auth_base: &Url) -> Result<Self, CoreError> {
        let base = auth_base.as_str().trim_end_matches('/');
        let invalid_url = |e: url::ParseError| CoreError::Internal {
            message: format!("Invalid Reddit auth URL: {}", e),
        };
        let auth_url = AuthUrl::new(format!("{}/api/v1/authorize", base)).map_err(invalid_url)?;
        let token_url =
            TokenUrl::new(format!("{}/api/v1/access_token", base)).map_err(invalid_url)?;

        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        // Reddit rejects token requests that carry a generic user agent.
        let http_client = Client::builder()
            .user_agent(&credentials.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            oauth_client,
            http_client,
            username: ResourceOwnerUsername::new(credentials.username.clone()),
            password: ResourceOwnerPassword::new(credentials.password.clone()),
        })
    }

    pub async fn request_token(&self) -> Result<RedditToken, CoreError> {
        info!("Requesting Reddit access token");
        let response = self
            .oauth_client
            .exchange_password(&self.username, &self.password)
            .request_async(|request| send_token_request(&self.http_client, request))
            .await
            .map_err(map_token_error)?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let scope = response
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.to_string()).collect())
            .unwrap_or_default();

        debug!("Access token valid for {:?}", lifetime);
        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: Instant::now() + lifetime,
            scope,
        })
    }
}

async fn send_token_request(
    client: &Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().to_owned();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}

fn map_token_error(err: RequestTokenError<reqwest::Error, BasicErrorResponse>) -> CoreError {
    match err {
        RequestTokenError::ServerResponse(response) => {
            error!("Reddit rejected the password grant: {}", response);
            RedditApiError::AuthenticationFailed {
                reason: response.error().to_string(),
            }
            .into()
        }
        RequestTokenError::Request(e) => {
            error!("Token request failed: {}", e);
            CoreError::Network(e)
        }
        // Reddit answers bad credentials with `200 {"error": "invalid_grant"}`.
        RequestTokenError::Parse(_, body) => {
            let body = String::from_utf8_lossy(&body);
            error!("Unexpected token response: {}", body);
            let reason = extract_error_field(&body)
                .unwrap_or_else(|| "unexpected token response".to_string());
            RedditApiError::AuthenticationFailed { reason }.into()
        }
        RequestTokenError::Other(message) => {
            RedditApiError::AuthenticationFailed { reason: message }.into()
        }
    }
}

fn extract_error_field(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("error").map(|e| match e {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_expiry_margin() {
        let fresh = RedditToken {
            access_token: "t".to_string(),
            expires_at: Instant::now() + Duration::from_secs(3600),
            scope: vec!["*".to_string()],
        };
        assert!(!fresh.is_expired());

        let nearly_expired = RedditToken {
            expires_at: Instant::now() + Duration::from_secs(30),
            ..fresh
        };
        assert!(nearly_expired.is_expired());
    }

    #[test]
    fn test_extract_error_field() {
        assert_eq!(
            extract_error_field(r#"{"error": "invalid_grant"}"#),
            Some("invalid_grant".to_string())
        );
        assert_eq!(extract_error_field(r#"{"error": 401}"#), Some("401".to_string()));
        assert_eq!(extract_error_field("<html>"), None);
    }
}
