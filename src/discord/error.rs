// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::Diagnostic;
use std::fmt;

/// The Discord call an error came from. Displays as the start of the failure message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Operation {
	TokenExchange,
	TokenRefresh,
	TokenRevocation,
	GetUser,
	GetGuilds,
	GetConnections,
	GetAuthorizationInfo,
}

impl fmt::Display for Operation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let description = match self {
			Self::TokenExchange => "Token exchange failed",
			Self::TokenRefresh => "Token refresh failed",
			Self::TokenRevocation => "Failed to revoke token",
			Self::GetUser => "Failed to get user",
			Self::GetGuilds => "Failed to get guilds",
			Self::GetConnections => "Failed to get connections",
			Self::GetAuthorizationInfo => "Failed to get authorization info",
		};
		write!(f, "{}", description)
	}
}

/// Errors from the Discord OAuth flow
#[derive(Debug, Diagnostic)]
pub enum DiscordOAuthError {
	/// Discord answered with a non-success HTTP status.
	Status {
		operation: Operation,
		status: u16,
		body: String,
	},
	/// The request never produced a response.
	Transport { operation: Operation, message: String },
	/// The response body couldn't be decoded.
	Decode { operation: Operation, message: String },
	/// The client was set up with an invalid URL or similar.
	Configuration(String),
	/// Discord redirected back with an `error` parameter instead of a code.
	Authorization {
		error: String,
		description: Option<String>,
	},
	MissingCode,
	StateMismatch,
}

impl DiscordOAuthError {
	/// Whether the failure happened between us and Discord rather than in the visitor's request
	pub fn is_upstream(&self) -> bool {
		matches!(
			self,
			Self::Status { .. } | Self::Transport { .. } | Self::Decode { .. } | Self::Configuration(_)
		)
	}
}

impl fmt::Display for DiscordOAuthError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Status {
				operation,
				status,
				body,
			} => write!(f, "{}: {} {}", operation, status, body),
			Self::Transport { operation, message } => write!(f, "{}: {}", operation, message),
			Self::Decode { operation, message } => {
				write!(f, "{}: couldn't decode response: {}", operation, message)
			}
			Self::Configuration(message) => write!(f, "Discord OAuth configuration error: {}", message),
			Self::Authorization { error, description } => match description {
				Some(description) => write!(f, "Discord OAuth error: {} - {}", error, description),
				None => write!(f, "Discord OAuth error: {}", error),
			},
			Self::MissingCode => write!(f, "No authorization code received from Discord"),
			Self::StateMismatch => write!(f, "Invalid state parameter - possible CSRF attack"),
		}
	}
}

impl std::error::Error for DiscordOAuthError {}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_message_embeds_status_and_body() {
		let error = DiscordOAuthError::Status {
			operation: Operation::TokenExchange,
			status: 400,
			body: String::from(r#"{"error": "invalid_grant"}"#),
		};
		assert_eq!(error.to_string(), r#"Token exchange failed: 400 {"error": "invalid_grant"}"#);
		assert!(error.is_upstream());
	}

	#[test]
	fn lookup_failures_name_the_lookup() {
		let error = DiscordOAuthError::Status {
			operation: Operation::GetGuilds,
			status: 401,
			body: String::from(r#"{"message": "401: Unauthorized", "code": 0}"#),
		};
		assert_eq!(
			error.to_string(),
			r#"Failed to get guilds: 401 {"message": "401: Unauthorized", "code": 0}"#
		);
	}

	#[test]
	fn callback_errors_are_not_upstream() {
		assert!(!DiscordOAuthError::StateMismatch.is_upstream());
		assert!(!DiscordOAuthError::MissingCode.is_upstream());
	}

	#[test]
	fn authorization_error_without_description() {
		let error = DiscordOAuthError::Authorization {
			error: String::from("access_denied"),
			description: None,
		};
		assert_eq!(error.to_string(), "Discord OAuth error: access_denied");
	}
}
