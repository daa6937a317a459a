// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A local stand-in for the Discord API, serving the OAuth and user endpoints over plain HTTP.

use super::{DiscordOAuth, Scope};
use axum::extract::Form;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::net::TcpListener;

pub const CLIENT_ID: &str = "1226868250713784331";
pub const CLIENT_SECRET: &str = "not-a-real-secret";
pub const REDIRECT_URI: &str = "http://localhost:3000/callback";
pub const GOOD_CODE: &str = "good-code";
pub const ACCESS_TOKEN: &str = "good-access-token";
pub const REFRESH_TOKEN: &str = "good-refresh-token";
pub const REFRESHED_ACCESS_TOKEN: &str = "refreshed-access-token";
pub const USER_ID: u64 = 80351110224678912;

/// Starts the mock API on a free local port and returns its API base
pub async fn start() -> String {
	let router = Router::new()
		.route("/api/v10/oauth2/token", post(token))
		.route("/api/v10/oauth2/token/revoke", post(revoke))
		.route("/api/v10/oauth2/@me", get(authorization_info))
		.route("/api/v10/users/@me", get(current_user))
		.route("/api/v10/users/@me/guilds", get(guilds))
		.route("/api/v10/users/@me/connections", get(connections));

	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let address = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, router).await.unwrap();
	});

	format!("http://{}/api/v10", address)
}

/// An OAuth client talking to a freshly started mock API
pub async fn oauth_client() -> DiscordOAuth {
	let api_base = start().await;
	DiscordOAuth::with_api_base(
		String::from(CLIENT_ID),
		String::from(CLIENT_SECRET),
		String::from(REDIRECT_URI),
		vec![Scope::Identify, Scope::Email, Scope::Guilds],
		&api_base,
	)
	.unwrap()
}

fn has_client_credentials(headers: &HeaderMap) -> bool {
	headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.is_some_and(|value| value.starts_with("Basic "))
}

fn has_access_token(headers: &HeaderMap) -> bool {
	let expected = format!("Bearer {}", ACCESS_TOKEN);
	headers
		.get(header::AUTHORIZATION)
		.and_then(|value| value.to_str().ok())
		.is_some_and(|value| value == expected)
}

fn unauthorized() -> Response {
	(
		StatusCode::UNAUTHORIZED,
		Json(json!({"message": "401: Unauthorized", "code": 0})),
	)
		.into_response()
}

fn token_response(access_token: &str) -> Response {
	Json(json!({
		"access_token": access_token,
		"token_type": "Bearer",
		"expires_in": 604800,
		"refresh_token": REFRESH_TOKEN,
		"scope": "identify email guilds"
	}))
	.into_response()
}

async fn token(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
	if !has_client_credentials(&headers) {
		return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_client"}))).into_response();
	}

	let grant_type = form.get("grant_type").map(String::as_str);
	match grant_type {
		Some("authorization_code")
			if form.get("code").map(String::as_str) == Some(GOOD_CODE)
				&& form.get("redirect_uri").map(String::as_str) == Some(REDIRECT_URI) =>
		{
			token_response(ACCESS_TOKEN)
		}
		Some("refresh_token") if form.get("refresh_token").map(String::as_str) == Some(REFRESH_TOKEN) => {
			token_response(REFRESHED_ACCESS_TOKEN)
		}
		_ => (
			StatusCode::BAD_REQUEST,
			r#"{"error": "invalid_grant", "error_description": "Invalid \"code\" in request."}"#,
		)
			.into_response(),
	}
}

async fn revoke(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> Response {
	if !has_client_credentials(&headers) {
		return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid_client"}))).into_response();
	}
	if form.get("token").map(String::as_str) != Some(ACCESS_TOKEN) {
		return (StatusCode::BAD_REQUEST, r#"{"error": "invalid_request"}"#).into_response();
	}
	StatusCode::OK.into_response()
}

async fn current_user(headers: HeaderMap) -> Response {
	if !has_access_token(&headers) {
		return unauthorized();
	}
	Json(json!({
		"id": USER_ID.to_string(),
		"username": "nelly",
		"discriminator": "0",
		"global_name": "Nelly",
		"avatar": "8342729096ea3675442027381ff50dfe",
		"verified": true,
		"email": "nelly@discord.com",
		"flags": 64
	}))
	.into_response()
}

fn guild(id: &str, name: &str, owner: bool, permissions: &str) -> Value {
	json!({
		"id": id,
		"name": name,
		"icon": null,
		"owner": owner,
		"permissions": permissions,
		"features": []
	})
}

async fn guilds(headers: HeaderMap) -> Response {
	if !has_access_token(&headers) {
		return unauthorized();
	}
	Json(json!([
		guild("41771983423143937", "Dragon's Den", true, "2147483647"),
		guild("81384788765712384", "Discord API", false, "1024")
	]))
	.into_response()
}

async fn connections(headers: HeaderMap) -> Response {
	if !has_access_token(&headers) {
		return unauthorized();
	}
	Json(json!([{
		"id": "nelly-gh",
		"name": "nelly",
		"type": "github",
		"friend_sync": false,
		"show_activity": true,
		"two_way_link": false,
		"verified": true,
		"visibility": 1
	}]))
	.into_response()
}

async fn authorization_info(headers: HeaderMap) -> Response {
	if !has_access_token(&headers) {
		return unauthorized();
	}
	Json(json!({
		"application": {
			"id": CLIENT_ID,
			"name": "Winter Dragon",
			"icon": null,
			"description": "",
			"bot_public": true,
			"bot_require_code_grant": false,
			"flags": null,
			"team": null,
			"verify_key": "1e0a356058d627ca38a5c8c9648818061d49e49bd9da9e3ab17d98ad4d6bg2u8"
		},
		"scopes": ["identify", "email", "guilds"],
		"expires": "2025-06-08T00:00:00.000000+00:00",
		"user": {
			"id": USER_ID.to_string(),
			"username": "nelly",
			"discriminator": "0",
			"avatar": null
		}
	}))
	.into_response()
}
