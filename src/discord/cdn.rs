// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub const DISCORD_CDN_BASE: &str = "https://cdn.discordapp.com";
pub const DEFAULT_IMAGE_SIZE: u16 = 128;

/// Which of Discord's six default avatars a user without an avatar gets
pub fn default_avatar_index(user_id: u64) -> u64 {
	(user_id >> 22) % 6
}

/// Gets the avatar URL for a user, falling back to the default avatar when the user has none.
pub fn avatar_url(user_id: u64, avatar_hash: Option<&str>, size: u16) -> String {
	match avatar_hash {
		Some(hash) => format!(
			"{}/avatars/{}/{}.{}?size={}",
			DISCORD_CDN_BASE,
			user_id,
			hash,
			image_extension(hash),
			size
		),
		None => format!(
			"{}/embed/avatars/{}.png",
			DISCORD_CDN_BASE,
			default_avatar_index(user_id)
		),
	}
}

/// Gets the icon URL for a guild. Guilds without an icon have no default image.
pub fn guild_icon_url(guild_id: u64, icon_hash: Option<&str>, size: u16) -> Option<String> {
	icon_hash.map(|hash| {
		format!(
			"{}/icons/{}/{}.{}?size={}",
			DISCORD_CDN_BASE,
			guild_id,
			hash,
			image_extension(hash),
			size
		)
	})
}

fn image_extension(hash: &str) -> &'static str {
	if hash.starts_with("a_") { "gif" } else { "png" }
}
