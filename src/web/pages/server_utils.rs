// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::model::User;
use crate::web::session_key::{ACCESS_TOKEN, USER};
use crate::web::state::AppState;
use leptos::prelude::*;
use leptos_axum::extract_with_state;
use tower_sessions::session::Session;

/// Gets the session for a request.
/// Must be used from a server function; relies on extracting request data.
pub async fn get_session_from_request() -> Result<Session, ServerFnError> {
	let state: AppState = expect_context();
	let session: Session = extract_with_state(&state).await?;
	Ok(session)
}

/// Gets the logged-in user for a request.
/// Must be used from a server function; relies on extracting request data.
pub async fn get_user_from_request() -> Result<Option<User>, ServerFnError> {
	let session = get_session_from_request().await?;
	let user: Option<User> = session.get(USER).await?;
	Ok(user)
}

/// Gets the Discord access token of the logged-in user for a request.
/// Must be used from a server function; relies on extracting request data.
pub async fn get_access_token_from_request() -> Result<Option<String>, ServerFnError> {
	let session = get_session_from_request().await?;
	let access_token: Option<String> = session.get(ACCESS_TOKEN).await?;
	Ok(access_token)
}
