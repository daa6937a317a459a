// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::session_key::{ACCESS_TOKEN, AUTH_ERROR, OAUTH_STATE, REFRESH_TOKEN, USER};
use crate::discord::{AuthorizeOptions, CallbackParams, DiscordOAuth, DiscordOAuthError, TokenGrant, generate_state};
use crate::model::User;
use axum::extract::{RawQuery, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use std::sync::Arc;
use tower_sessions::Session;

pub const LOGIN_PATH: &str = "/login";
pub const CALLBACK_PATH: &str = "/callback";
pub const LOGOUT_PATH: &str = "/logout";
pub const AUTH_ERROR_PATH: &str = "/auth/error";
const AFTER_LOGIN_PATH: &str = "/dashboard";
const AFTER_LOGOUT_PATH: &str = "/";

/// Pages only shown to logged-in users. Subpaths are included.
const LOGIN_REQUIRED_PATHS: [&str; 1] = ["/dashboard"];

/// Axum layer function sending visitors who aren't logged in to the login route when they request a page that
/// needs a Discord user.
pub async fn login_required_layer(session: Session, request: Request, next: Next) -> Response {
	if !requires_login(request.uri().path()) {
		return next.run(request).await;
	}

	let user: Option<User> = match session.get(USER).await {
		Ok(user) => user,
		Err(error) => {
			tracing::error!(source = ?error, "Failed to retrieve user from session");
			return StatusCode::INTERNAL_SERVER_ERROR.into_response();
		}
	};

	if user.is_none() {
		return Redirect::to(LOGIN_PATH).into_response();
	}

	next.run(request).await
}

fn requires_login(path: &str) -> bool {
	LOGIN_REQUIRED_PATHS.iter().any(|required_path| {
		path.strip_prefix(required_path)
			.is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
	})
}

/// Route function starting a login: remembers a fresh state value and sends the visitor to Discord
pub async fn login_route(State(oauth): State<Arc<DiscordOAuth>>, session: Session) -> Response {
	let csrf_state = generate_state();

	let insert_result = session.insert(OAUTH_STATE, &csrf_state).await;
	if let Err(error) = insert_result {
		tracing::error!(source = ?error, "Failed to set oauth state to session");
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}

	let oauth_url = oauth.authorization_url(&csrf_state, &AuthorizeOptions::default());
	tracing::debug!(url = %oauth_url, "Redirecting to Discord for login");
	Redirect::to(oauth_url.as_str()).into_response()
}

/// Route function for the OAuth login callback
pub async fn callback_route(
	RawQuery(query): RawQuery,
	session: Session,
	State(oauth): State<Arc<DiscordOAuth>>,
) -> Response {
	let params = CallbackParams::from_query(query.as_deref().unwrap_or_default());

	// The state is single-use, so it's taken out whether or not this callback is legitimate
	let stored_state: Option<String> = match session.remove(OAUTH_STATE).await {
		Ok(state) => state,
		Err(error) => {
			tracing::error!(source = ?error, "Failed to get CSRF state for login callback");
			return StatusCode::INTERNAL_SERVER_ERROR.into_response();
		}
	};

	let login = match complete_login(&oauth, params, stored_state.as_deref()).await {
		Ok(login) => login,
		Err(error) => {
			tracing::warn!(source = ?error, "Discord login failed");
			let insert_result = session.insert(AUTH_ERROR, error.to_string()).await;
			if let Err(error) = insert_result {
				tracing::error!(source = ?error, "Failed to store login error to session");
				return StatusCode::INTERNAL_SERVER_ERROR.into_response();
			}
			return Redirect::to(AUTH_ERROR_PATH).into_response();
		}
	};

	// New privileges for this session, so it gets a new ID
	if let Err(error) = session.cycle_id().await {
		tracing::error!(source = ?error, "Failed to cycle session ID on login");
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}

	let insert_result = session.insert(ACCESS_TOKEN, &login.tokens.access_token).await;
	if let Err(error) = insert_result {
		tracing::error!(source = ?error, "Failed to store access token");
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}
	if let Some(refresh_token) = &login.tokens.refresh_token {
		let insert_result = session.insert(REFRESH_TOKEN, refresh_token).await;
		if let Err(error) = insert_result {
			tracing::error!(source = ?error, "Failed to store refresh token");
			return StatusCode::INTERNAL_SERVER_ERROR.into_response();
		}
	}
	let insert_result = session.insert(USER, &login.user).await;
	if let Err(error) = insert_result {
		tracing::error!(source = ?error, "Failed to store Discord user");
		return StatusCode::INTERNAL_SERVER_ERROR.into_response();
	}

	tracing::info!(user_id = login.user.id, "User logged in");
	Redirect::to(AFTER_LOGIN_PATH).into_response()
}

struct CompletedLogin {
	tokens: TokenGrant,
	user: User,
}

async fn complete_login(
	oauth: &DiscordOAuth,
	params: CallbackParams,
	stored_state: Option<&str>,
) -> Result<CompletedLogin, DiscordOAuthError> {
	let code = params.verify(stored_state)?;
	let tokens = oauth.exchange_code(&code).await?;
	let user = oauth.get_user(&tokens.access_token).await?;
	Ok(CompletedLogin {
		tokens,
		user: user.into(),
	})
}

/// Route function forgetting the logged-in user
pub async fn logout_route(session: Session) -> Response {
	for key in [USER, ACCESS_TOKEN, REFRESH_TOKEN] {
		if let Err(error) = session.remove_value(key).await {
			tracing::error!(source = ?error, key, "Failed to remove login data from session");
			return StatusCode::INTERNAL_SERVER_ERROR.into_response();
		}
	}

	Redirect::to(AFTER_LOGOUT_PATH).into_response()
}
