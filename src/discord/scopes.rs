// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use miette::Diagnostic;
use std::fmt;
use std::str::FromStr;

/// OAuth2 scopes Discord understands
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Scope {
	Identify,
	Email,
	Guilds,
	GuildsJoin,
	GuildsMembersRead,
	Connections,
	RoleConnectionsWrite,
	ApplicationsCommands,
	ApplicationsCommandsUpdate,
	ApplicationsCommandsPermissionsUpdate,
	Bot,
	WebhookIncoming,
	/// Privileged
	MessagesRead,
	Rpc,
	RpcNotificationsRead,
	RpcVoiceRead,
	RpcVoiceWrite,
	RpcActivitiesWrite,
}

const ALL_SCOPES: [Scope; 18] = [
	Scope::Identify,
	Scope::Email,
	Scope::Guilds,
	Scope::GuildsJoin,
	Scope::GuildsMembersRead,
	Scope::Connections,
	Scope::RoleConnectionsWrite,
	Scope::ApplicationsCommands,
	Scope::ApplicationsCommandsUpdate,
	Scope::ApplicationsCommandsPermissionsUpdate,
	Scope::Bot,
	Scope::WebhookIncoming,
	Scope::MessagesRead,
	Scope::Rpc,
	Scope::RpcNotificationsRead,
	Scope::RpcVoiceRead,
	Scope::RpcVoiceWrite,
	Scope::RpcActivitiesWrite,
];

/// The scopes requested at login when the configuration doesn't list any
pub const DEFAULT_LOGIN_SCOPES: [Scope; 3] = [Scope::Identify, Scope::Email, Scope::Guilds];

impl Scope {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Identify => "identify",
			Self::Email => "email",
			Self::Guilds => "guilds",
			Self::GuildsJoin => "guilds.join",
			Self::GuildsMembersRead => "guilds.members.read",
			Self::Connections => "connections",
			Self::RoleConnectionsWrite => "role_connections.write",
			Self::ApplicationsCommands => "applications.commands",
			Self::ApplicationsCommandsUpdate => "applications.commands.update",
			Self::ApplicationsCommandsPermissionsUpdate => "applications.commands.permissions.update",
			Self::Bot => "bot",
			Self::WebhookIncoming => "webhook.incoming",
			Self::MessagesRead => "messages.read",
			Self::Rpc => "rpc",
			Self::RpcNotificationsRead => "rpc.notifications.read",
			Self::RpcVoiceRead => "rpc.voice.read",
			Self::RpcVoiceWrite => "rpc.voice.write",
			Self::RpcActivitiesWrite => "rpc.activities.write",
		}
	}
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

#[derive(Debug, Diagnostic)]
pub struct UnknownScopeError(pub String);

impl fmt::Display for UnknownScopeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "unknown Discord OAuth scope: {}", self.0)
	}
}

impl std::error::Error for UnknownScopeError {}

impl FromStr for Scope {
	type Err = UnknownScopeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ALL_SCOPES
			.iter()
			.find(|scope| scope.as_str() == s)
			.copied()
			.ok_or_else(|| UnknownScopeError(s.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_dotted_scopes() {
		assert_eq!(
			"applications.commands.permissions.update".parse::<Scope>().unwrap(),
			Scope::ApplicationsCommandsPermissionsUpdate
		);
		assert_eq!("guilds.members.read".parse::<Scope>().unwrap(), Scope::GuildsMembersRead);
	}

	#[test]
	fn rejects_unknown_scope() {
		let error = "identify email".parse::<Scope>().unwrap_err();
		assert_eq!(error.to_string(), "unknown Discord OAuth scope: identify email");
	}
}
