// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

/// What the logged-in user may do with the bot in a guild
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum PermissionLevel {
	#[default]
	Member,
	/// Has Manage Server or Administrator, so can add and configure the bot
	Manager,
	Owner,
}

impl PermissionLevel {
	pub fn label(&self) -> &'static str {
		match self {
			Self::Member => "Member",
			Self::Manager => "Manager",
			Self::Owner => "Owner",
		}
	}

	pub fn can_manage(&self) -> bool {
		*self != Self::Member
	}
}

#[cfg(feature = "ssr")]
impl PermissionLevel {
	pub fn for_guild(guild: &twilight_model::user::CurrentUserGuild) -> Self {
		use twilight_model::guild::Permissions;

		if guild.owner {
			Self::Owner
		} else if guild
			.permissions
			.intersects(Permissions::ADMINISTRATOR | Permissions::MANAGE_GUILD)
		{
			Self::Manager
		} else {
			Self::Member
		}
	}
}
