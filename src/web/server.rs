// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::api::{current_user_route, token_exchange_route, token_refresh_route, token_revoke_route};
use super::auth::{CALLBACK_PATH, LOGIN_PATH, LOGOUT_PATH, callback_route, login_required_layer, login_route, logout_route};
use super::pages::app::App;
use super::pages::shell::shell;
use super::state::AppState;
use crate::config::ConfigData;
use crate::discord::DiscordOAuth;
use axum::Router;
use axum::body::Body;
use axum::extract::{FromRef, Request, State};
use axum::http::{StatusCode, Uri};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use leptos::prelude::*;
use leptos_axum::{LeptosRoutes, generate_route_list, render_app_to_stream};
use miette::IntoDiagnostic;
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower::util::ServiceExt;
use tower_http::services::ServeDir;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Sessions are dropped after this long without a request
const SESSION_INACTIVITY_LIMIT: Duration = Duration::days(7);

pub async fn run_server(config: Arc<ConfigData>, oauth: Arc<DiscordOAuth>) -> miette::Result<()> {
	let web_config = get_configuration(None).into_diagnostic()?;
	let site_addr = &config.web.bind_addr;
	let leptos_options = web_config.leptos_options;
	let routes = generate_route_list(App);

	let secure_cookies = config.web.base_url.starts_with("https://");

	let app_state = AppState {
		leptos_options,
		config: Arc::clone(&config),
		oauth,
	};

	let app = Router::new()
		.leptos_routes_with_context(
			&app_state,
			routes,
			{
				let app_state = app_state.clone();
				move || provide_context(app_state.clone())
			},
			{
				let leptos_options = app_state.leptos_options.clone();
				move || shell(leptos_options.clone())
			},
		)
		.merge(auth_routes())
		.fallback(file_and_error_handler)
		.layer(
			ServiceBuilder::new()
				.layer(session_layer(secure_cookies))
				.layer(from_fn(login_required_layer)),
		)
		.with_state(app_state);

	tracing::info!("Listening on http://{}", site_addr);
	let listener = TcpListener::bind(site_addr).await.into_diagnostic()?;
	axum::serve(listener, app.into_make_service()).await.into_diagnostic()?;

	Ok(())
}

/// Routes for logging in and out, and the JSON token endpoints
pub fn auth_routes<S>() -> Router<S>
where
	S: Clone + Send + Sync + 'static,
	Arc<DiscordOAuth>: FromRef<S>,
{
	Router::new()
		.route(LOGIN_PATH, get(login_route))
		.route(CALLBACK_PATH, get(callback_route))
		.route(LOGOUT_PATH, post(logout_route))
		.route("/api/auth/discord/token", post(token_exchange_route))
		.route("/api/auth/discord/refresh", post(token_refresh_route))
		.route("/api/auth/discord/revoke", post(token_revoke_route))
		.route("/api/auth/me", get(current_user_route))
}

/// Session storage for the login state and the logged-in user
pub fn session_layer(secure_cookies: bool) -> SessionManagerLayer<MemoryStore> {
	SessionManagerLayer::new(MemoryStore::default())
		.with_same_site(SameSite::Lax)
		.with_secure(secure_cookies)
		.with_expiry(Expiry::OnInactivity(SESSION_INACTIVITY_LIMIT))
}

async fn file_and_error_handler(uri: Uri, State(state): State<AppState>, request: Request) -> Response {
	let site_root_dir = state.leptos_options.site_root.clone();
	let response = get_static_file(uri.clone(), &site_root_dir).await;
	let response = match response {
		Ok(response) => response,
		Err(error) => return error.into_response(),
	};

	if response.status() == StatusCode::OK {
		response.into_response()
	} else {
		let handler = render_app_to_stream(App);
		handler(request).await.into_response()
	}
}

async fn get_static_file(uri: Uri, root: &str) -> Result<Response, StatusCode> {
	let Ok(request) = Request::builder().uri(uri.clone()).body(Body::empty()) else {
		return Err(StatusCode::INTERNAL_SERVER_ERROR);
	};

	match ServeDir::new(root).oneshot(request).await {
		Ok(response) => Ok(response.into_response()),
		Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
	}
}
