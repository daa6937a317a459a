// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Utc};
use twilight_model::id::Id;
use twilight_model::id::marker::GenericMarker;
use twilight_util::snowflake::Snowflake;

/// Milliseconds since the Unix epoch at which Discord's snowflake clock starts (2015-01-01).
pub const DISCORD_EPOCH_MILLIS: i64 = 1_420_070_400_000;

/// When the object with this ID was created on Discord
pub fn created_at(id: impl Snowflake) -> Option<DateTime<Utc>> {
	DateTime::from_timestamp_millis(id.timestamp())
}

/// Checks whether a string is a plausible Discord snowflake: digits only, fits in 64 bits, and
/// was minted after the Discord epoch and no later than `now`.
pub fn is_valid_snowflake(id: &str, now: DateTime<Utc>) -> bool {
	if id.is_empty() || !id.bytes().all(|byte| byte.is_ascii_digit()) {
		return false;
	}
	let Some(id) = id.parse().ok().and_then(Id::<GenericMarker>::new_checked) else {
		return false;
	};

	created_at(id).is_some_and(|created| created.timestamp_millis() > DISCORD_EPOCH_MILLIS && created <= now)
}
