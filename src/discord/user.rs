// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::model::User;
use serde::Deserialize;
use twilight_model::id::Id;
use twilight_model::id::marker::UserMarker;

/// The user object returned by `GET /users/@me`.
///
/// Decoded here instead of through twilight's `CurrentUser` so the display name (`global_name`) is kept.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct DiscordUser {
	pub id: Id<UserMarker>,
	pub username: String,
	pub discriminator: String,
	#[serde(default)]
	pub global_name: Option<String>,
	#[serde(default)]
	pub avatar: Option<String>,
	#[serde(default)]
	pub email: Option<String>,
}

impl From<DiscordUser> for User {
	fn from(user: DiscordUser) -> Self {
		Self {
			id: user.id.get(),
			username: user.username,
			discriminator: user.discriminator.parse().unwrap_or(0),
			global_name: user.global_name,
			avatar: user.avatar,
			email: user.email,
		}
	}
}
