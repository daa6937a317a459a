// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use serde::{Deserialize, Serialize};

/// The logged-in Discord user, as cached in the session after login.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
	pub id: u64,
	pub username: String,
	/// Legacy four-digit discriminator; `0` for users on the new username system.
	pub discriminator: u16,
	pub global_name: Option<String>,
	/// Avatar image hash, if the user has set an avatar
	pub avatar: Option<String>,
	/// Only present when the `email` scope was granted.
	pub email: Option<String>,
}

impl User {
	/// Gets the name to show for the user
	pub fn display_name(&self) -> &str {
		self.global_name.as_deref().unwrap_or(&self.username)
	}
}
