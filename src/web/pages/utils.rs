// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::model::User;
use crate::web::permissions::PermissionLevel;
use chrono::{DateTime, Utc};
use leptos::prelude::*;
use serde::{Deserialize, Serialize};

/// The logged-in user with everything needed to show them
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UserProfile {
	pub user: User,
	pub avatar_url: String,
	/// When the Discord account was created, taken from the user ID
	pub account_created: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct GuildData {
	pub id: u64,
	pub name: String,
	pub icon_image_url: Option<String>,
	pub permission_level: PermissionLevel,
}

#[server]
pub async fn get_current_user() -> Result<Option<UserProfile>, ServerFnError> {
	use super::server_utils::get_user_from_request;
	use crate::discord::cdn::{DEFAULT_IMAGE_SIZE, avatar_url};
	use crate::discord::snowflake::created_at;
	use twilight_model::id::Id;
	use twilight_model::id::marker::UserMarker;

	let user = get_user_from_request().await?;
	let profile = user.map(|user| {
		let avatar_url = avatar_url(user.id, user.avatar.as_deref(), DEFAULT_IMAGE_SIZE);
		let account_created = Id::<UserMarker>::new_checked(user.id).and_then(created_at);
		UserProfile {
			user,
			avatar_url,
			account_created,
		}
	});
	Ok(profile)
}

/// Gets the servers the logged-in user is in, as reported by Discord
#[server]
pub async fn get_user_guilds() -> Result<Vec<GuildData>, ServerFnError> {
	use super::server_utils::get_access_token_from_request;
	use crate::discord::GuildQuery;
	use crate::discord::cdn::{DEFAULT_IMAGE_SIZE, guild_icon_url};
	use crate::web::state::AppState;

	let Some(access_token) = get_access_token_from_request().await? else {
		return Ok(Vec::new());
	};

	let state = expect_context::<AppState>();
	let guilds = state.oauth.get_user_guilds(&access_token, &GuildQuery::default()).await?;

	let guilds = guilds
		.into_iter()
		.map(|guild| {
			let guild_id = guild.id.get();
			let icon_hash = guild.icon.as_ref().map(ToString::to_string);
			GuildData {
				id: guild_id,
				icon_image_url: guild_icon_url(guild_id, icon_hash.as_deref(), DEFAULT_IMAGE_SIZE),
				permission_level: PermissionLevel::for_guild(&guild),
				name: guild.name,
			}
		})
		.collect();
	Ok(guilds)
}

/// Takes the message of the last failed login out of the session
#[server]
pub async fn take_auth_error() -> Result<Option<String>, ServerFnError> {
	use super::server_utils::get_session_from_request;
	use crate::web::session_key::AUTH_ERROR;

	let session = get_session_from_request().await?;
	let message: Option<String> = session.remove(AUTH_ERROR).await?;
	Ok(message)
}
