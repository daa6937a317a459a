// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::discord::{DEFAULT_LOGIN_SCOPES, DISCORD_API_BASE, Scope, UnknownScopeError};
use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};
use miette::{Diagnostic, IntoDiagnostic};
use std::fmt;
use tokio::fs::read_to_string;

pub async fn parse_config(config_path: &str) -> miette::Result<ConfigData> {
	let config_file_contents = read_to_string(config_path).await.into_diagnostic()?;
	parse_config_str(&config_file_contents)
}

pub fn parse_config_str(config_file_contents: &str) -> miette::Result<ConfigData> {
	let document: KdlDocument = config_file_contents.parse()?;

	let discord = section(&document, "discord")?;
	let client_id = required_string(discord, "discord", "client_id")?;
	let client_secret = required_string(discord, "discord", "client_secret")?;
	let scopes = scopes(discord)?;
	let api_base = discord
		.get_arg("api_base")
		.and_then(|value| value.as_string())
		.unwrap_or(DISCORD_API_BASE)
		.to_string();

	let web = section(&document, "web")?;
	let bind_addr = required_string(web, "web", "bind_addr")?;
	let base_url = required_string(web, "web", "base_url")?;

	Ok(ConfigData {
		discord: DiscordConfig {
			client_id,
			client_secret,
			scopes,
			api_base,
		},
		web: WebConfig { bind_addr, base_url },
	})
}

#[derive(Debug)]
pub struct ConfigData {
	pub discord: DiscordConfig,
	pub web: WebConfig,
}

#[derive(Debug)]
pub struct DiscordConfig {
	pub client_id: String,
	pub client_secret: String,
	/// Scopes requested when users log in
	pub scopes: Vec<Scope>,
	/// Base of the Discord API, ending in `/api/v10`. Only changed to go through a proxy.
	pub api_base: String,
}

#[derive(Debug)]
pub struct WebConfig {
	/// Address and port the web server listens on
	pub bind_addr: String,
	/// Public URL of the site, without a trailing slash
	pub base_url: String,
}

impl WebConfig {
	/// The URL Discord sends users back to after login
	pub fn redirect_uri(&self) -> String {
		format!("{}/callback", self.base_url.trim_end_matches('/'))
	}
}

#[derive(Debug, Diagnostic)]
pub enum ConfigError {
	MissingSection(&'static str),
	MissingValue {
		section: &'static str,
		key: &'static str,
	},
	InvalidScope(UnknownScopeError),
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MissingSection(section) => write!(f, "config is missing the `{}` section", section),
			Self::MissingValue { section, key } => {
				write!(f, "config section `{}` is missing a string value for `{}`", section, key)
			}
			Self::InvalidScope(error) => write!(f, "invalid scope in config: {}", error),
		}
	}
}

impl std::error::Error for ConfigError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::InvalidScope(error) => Some(error),
			_ => None,
		}
	}
}

fn section<'a>(document: &'a KdlDocument, name: &'static str) -> Result<&'a KdlDocument, ConfigError> {
	document
		.get(name)
		.and_then(KdlNode::children)
		.ok_or(ConfigError::MissingSection(name))
}

fn required_string(section: &KdlDocument, section_name: &'static str, key: &'static str) -> Result<String, ConfigError> {
	section
		.get_arg(key)
		.and_then(|value| value.as_string())
		.map(String::from)
		.ok_or(ConfigError::MissingValue {
			section: section_name,
			key,
		})
}

fn scopes(discord: &KdlDocument) -> Result<Vec<Scope>, ConfigError> {
	let Some(node) = discord.get("scopes") else {
		return Ok(DEFAULT_LOGIN_SCOPES.to_vec());
	};
	let values: Vec<&KdlValue> = node
		.entries()
		.iter()
		.filter(|entry| entry.name().is_none())
		.map(KdlEntry::value)
		.collect();
	if values.is_empty() {
		return Ok(DEFAULT_LOGIN_SCOPES.to_vec());
	}

	let mut scopes = Vec::with_capacity(values.len());
	for value in values {
		let Some(name) = value.as_string() else {
			return Err(ConfigError::MissingValue {
				section: "discord",
				key: "scopes",
			});
		};
		scopes.push(name.parse().map_err(ConfigError::InvalidScope)?);
	}
	Ok(scopes)
}
