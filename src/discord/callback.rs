// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::error::DiscordOAuthError;
use rand::RngCore;
use std::fmt::Write;
use url::{Url, form_urlencoded};

/// Generates a new random `state` value for a login attempt: 32 random bytes as lowercase hex.
pub fn generate_state() -> String {
	let mut bytes = [0u8; 32];
	rand::thread_rng().fill_bytes(&mut bytes);

	let mut state = String::with_capacity(bytes.len() * 2);
	for byte in bytes {
		let _ = write!(state, "{:02x}", byte);
	}
	state
}

/// The query parameters Discord sends back to the redirect URI
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CallbackParams {
	pub code: Option<String>,
	pub state: Option<String>,
	pub error: Option<String>,
	pub error_description: Option<String>,
}

impl CallbackParams {
	/// Parses the callback parameters out of a full callback URL
	pub fn from_url(url: &str) -> Result<Self, url::ParseError> {
		let url = Url::parse(url)?;
		Ok(Self::from_query(url.query().unwrap_or_default()))
	}

	/// Parses the callback parameters out of the query string of the callback request.
	/// Empty values are treated as missing, and a repeated parameter keeps its last value.
	pub fn from_query(query: &str) -> Self {
		let mut params = Self::default();
		for (key, value) in form_urlencoded::parse(query.as_bytes()) {
			if value.is_empty() {
				continue;
			}
			let value = Some(value.into_owned());
			match key.as_ref() {
				"code" => params.code = value,
				"state" => params.state = value,
				"error" => params.error = value,
				"error_description" => params.error_description = value,
				_ => (),
			}
		}
		params
	}

	/// Checks the callback against the `state` stored when the login started, and returns the
	/// authorization code if the callback is legitimate.
	pub fn verify(self, stored_state: Option<&str>) -> Result<String, DiscordOAuthError> {
		if let Some(error) = self.error {
			return Err(DiscordOAuthError::Authorization {
				error,
				description: self.error_description,
			});
		}

		let Some(code) = self.code.filter(|code| !code.is_empty()) else {
			return Err(DiscordOAuthError::MissingCode);
		};

		match (self.state.as_deref(), stored_state) {
			(Some(state), Some(stored_state)) if state == stored_state => Ok(code),
			_ => Err(DiscordOAuthError::StateMismatch),
		}
	}
}
