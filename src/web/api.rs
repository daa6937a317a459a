// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON endpoints doing the token operations that need the client secret, for clients that run the OAuth flow
//! themselves.

use super::session_key::USER;
use crate::discord::{DiscordOAuth, DiscordOAuthError};
use crate::model::User;
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

#[derive(Debug, Deserialize)]
pub struct TokenExchangeBody {
	code: String,
	redirect_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
	refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct RevokeBody {
	access_token: String,
}

/// `POST /api/auth/discord/token`
pub async fn token_exchange_route(
	State(oauth): State<Arc<DiscordOAuth>>,
	body: Result<Json<TokenExchangeBody>, JsonRejection>,
) -> Response {
	let body = match request_body(body) {
		Ok(body) => body,
		Err(response) => return response,
	};

	// Discord only accepts the redirect URI the code was issued for, which is always ours
	if let Some(redirect_uri) = &body.redirect_uri {
		if redirect_uri != oauth.redirect_uri() {
			return (
				StatusCode::BAD_REQUEST,
				"redirect_uri doesn't match the configured redirect URI",
			)
				.into_response();
		}
	}

	match oauth.exchange_code(&body.code).await {
		Ok(grant) => Json(grant).into_response(),
		Err(error) => error_response(error),
	}
}

/// `POST /api/auth/discord/refresh`
pub async fn token_refresh_route(
	State(oauth): State<Arc<DiscordOAuth>>,
	body: Result<Json<RefreshBody>, JsonRejection>,
) -> Response {
	let body = match request_body(body) {
		Ok(body) => body,
		Err(response) => return response,
	};
	match oauth.refresh_token(&body.refresh_token).await {
		Ok(grant) => Json(grant).into_response(),
		Err(error) => error_response(error),
	}
}

/// `POST /api/auth/discord/revoke`
pub async fn token_revoke_route(
	State(oauth): State<Arc<DiscordOAuth>>,
	body: Result<Json<RevokeBody>, JsonRejection>,
) -> Response {
	let body = match request_body(body) {
		Ok(body) => body,
		Err(response) => return response,
	};
	match oauth.revoke_token(&body.access_token).await {
		Ok(()) => StatusCode::NO_CONTENT.into_response(),
		Err(error) => error_response(error),
	}
}

/// `GET /api/auth/me`
pub async fn current_user_route(session: Session) -> Response {
	let user: Option<User> = match session.get(USER).await {
		Ok(user) => user,
		Err(error) => {
			tracing::error!(source = ?error, "Failed to retrieve user from session");
			return StatusCode::INTERNAL_SERVER_ERROR.into_response();
		}
	};

	match user {
		Some(user) => Json(user).into_response(),
		None => StatusCode::UNAUTHORIZED.into_response(),
	}
}

/// Any problem with the request body is answered with 400 and the reason
fn request_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
	match body {
		Ok(Json(body)) => Ok(body),
		Err(rejection) => Err((StatusCode::BAD_REQUEST, rejection.body_text()).into_response()),
	}
}

fn error_response(error: DiscordOAuthError) -> Response {
	let status = if error.is_upstream() {
		tracing::error!(source = ?error, "Discord token request failed");
		StatusCode::BAD_GATEWAY
	} else {
		StatusCode::BAD_REQUEST
	};
	(status, error.to_string()).into_response()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::discord::{Operation, TokenGrant, mock};
	use crate::web::server::{auth_routes, session_layer};
	use axum::Router;
	use axum::body::{Body, to_bytes};
	use axum::http::{Request, header};
	use tower::ServiceExt;

	async fn test_app() -> Router {
		let oauth = mock::oauth_client().await;
		auth_routes().layer(session_layer(false)).with_state(Arc::new(oauth))
	}

	fn json_post(uri: &str, body: &str) -> Request<Body> {
		Request::builder()
			.method("POST")
			.uri(uri)
			.header(header::CONTENT_TYPE, "application/json")
			.body(Body::from(body.to_string()))
			.unwrap()
	}

	async fn body_text(response: Response) -> String {
		let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
		String::from_utf8(bytes.to_vec()).unwrap()
	}

	#[tokio::test]
	async fn token_exchange_returns_discord_grant() {
		let request = json_post(
			"/api/auth/discord/token",
			r#"{"code": "good-code", "redirect_uri": "http://localhost:3000/callback"}"#,
		);
		let response = test_app().await.oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::OK);

		let grant: TokenGrant = serde_json::from_str(&body_text(response).await).unwrap();
		assert_eq!(grant.access_token, mock::ACCESS_TOKEN);
		assert_eq!(grant.token_type, "Bearer");
		assert_eq!(grant.refresh_token.as_deref(), Some(mock::REFRESH_TOKEN));
	}

	#[tokio::test]
	async fn token_exchange_rejects_foreign_redirect_uri() {
		let request = json_post(
			"/api/auth/discord/token",
			r#"{"code": "good-code", "redirect_uri": "https://evil.example/callback"}"#,
		);
		let response = test_app().await.oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert_eq!(
			body_text(response).await,
			"redirect_uri doesn't match the configured redirect URI"
		);
	}

	#[tokio::test]
	async fn token_exchange_requires_code() {
		let request = json_post("/api/auth/discord/token", r#"{"redirect_uri": "http://localhost:3000/callback"}"#);
		let response = test_app().await.oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
		assert!(body_text(response).await.contains("code"));
	}

	#[tokio::test]
	async fn rejected_code_is_bad_gateway() {
		let request = json_post("/api/auth/discord/token", r#"{"code": "stale-code"}"#);
		let response = test_app().await.oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
		assert!(body_text(response).await.starts_with("Token exchange failed: 400 "));
	}

	#[tokio::test]
	async fn refresh_without_json_content_type_is_bad_request() {
		let request = Request::builder()
			.method("POST")
			.uri("/api/auth/discord/refresh")
			.body(Body::from(r#"{"refresh_token": "good-refresh-token"}"#))
			.unwrap();
		let response = test_app().await.oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn refresh_returns_new_grant() {
		let request = json_post("/api/auth/discord/refresh", r#"{"refresh_token": "good-refresh-token"}"#);
		let response = test_app().await.oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::OK);

		let grant: TokenGrant = serde_json::from_str(&body_text(response).await).unwrap();
		assert_eq!(grant.access_token, mock::REFRESHED_ACCESS_TOKEN);
	}

	#[tokio::test]
	async fn revoke_answers_no_content() {
		let request = json_post("/api/auth/discord/revoke", r#"{"access_token": "good-access-token"}"#);
		let response = test_app().await.oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::NO_CONTENT);
	}

	#[tokio::test]
	async fn current_user_needs_login() {
		let request = Request::builder().uri("/api/auth/me").body(Body::empty()).unwrap();
		let response = test_app().await.oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	}

	#[tokio::test]
	async fn upstream_failures_are_bad_gateway() {
		let response = error_response(DiscordOAuthError::Status {
			operation: Operation::TokenRevocation,
			status: 401,
			body: String::from("401: Unauthorized"),
		});
		assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
		assert_eq!(body_text(response).await, "Failed to revoke token: 401 401: Unauthorized");
	}
}
