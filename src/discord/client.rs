// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::error::{DiscordOAuthError, Operation};
use super::http::{TransportError, send_oauth_request};
use super::scopes::Scope;
use super::user::DiscordUser;
use crate::config::ConfigData;
use oauth2::basic::{BasicClient, BasicTokenResponse, BasicTokenType};
use oauth2::{
	AccessToken, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
	ErrorResponse, HttpRequest, RedirectUrl, RefreshToken, RequestTokenError, RevocationUrl, StandardRevocableToken,
	TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use twilight_http::client::Client;
use twilight_http::error::{Error as HttpError, ErrorType};
use twilight_model::guild::Permissions;
use twilight_model::id::Id;
use twilight_model::id::marker::GuildMarker;
use twilight_model::oauth::CurrentAuthorizationInformation;
use twilight_model::user::{Connection, CurrentUserGuild};
use url::Url;

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Path every API base has to end in; the REST client always requests below it.
const API_PATH: &str = "/api/v10";

type DiscordOAuthClient = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointSet, EndpointSet>;

/// Whether Discord should ask the user to authorize again
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Prompt {
	Consent,
	None,
}

impl Prompt {
	fn as_str(&self) -> &'static str {
		match self {
			Self::Consent => "consent",
			Self::None => "none",
		}
	}
}

/// Optional parameters for the authorization URL
#[derive(Clone, Debug, Default)]
pub struct AuthorizeOptions {
	pub prompt: Option<Prompt>,
	/// Permissions requested for the bot when the `bot` scope is included
	pub permissions: Option<Permissions>,
	/// Preselects a guild in the bot authorization dialog
	pub guild_id: Option<Id<GuildMarker>>,
	pub disable_guild_select: bool,
}

/// Pagination for the current user's guild list
#[derive(Clone, Debug, Default)]
pub struct GuildQuery {
	pub before: Option<Id<GuildMarker>>,
	pub after: Option<Id<GuildMarker>>,
	pub limit: Option<u16>,
}

/// Tokens granted by Discord, in the shape of the OAuth token response
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TokenGrant {
	pub access_token: String,
	pub token_type: String,
	pub expires_in: Option<u64>,
	pub refresh_token: Option<String>,
	pub scope: Option<String>,
}

impl From<&BasicTokenResponse> for TokenGrant {
	fn from(response: &BasicTokenResponse) -> Self {
		let scope = response.scopes().map(|scopes| {
			scopes
				.iter()
				.map(|scope| scope.as_str())
				.collect::<Vec<_>>()
				.join(" ")
		});
		Self {
			access_token: response.access_token().secret().clone(),
			token_type: token_type_name(response.token_type()),
			expires_in: response.expires_in().map(|duration| duration.as_secs()),
			refresh_token: response.refresh_token().map(|token| token.secret().clone()),
			scope,
		}
	}
}

/// Names the token type the way Discord writes it
fn token_type_name(token_type: &BasicTokenType) -> String {
	match token_type {
		BasicTokenType::Bearer => String::from("Bearer"),
		BasicTokenType::Mac => String::from("MAC"),
		BasicTokenType::Extension(name) => name.clone(),
	}
}

/// Where REST requests go when the API base isn't Discord's own
#[derive(Clone, Debug)]
struct RestProxy {
	host: String,
	use_http: bool,
}

/// OAuth2 client for logging users in with Discord and acting on their behalf
#[derive(Debug)]
pub struct DiscordOAuth {
	oauth_client: DiscordOAuthClient,
	http_client: reqwest::Client,
	redirect_uri: String,
	scopes: Vec<Scope>,
	rest_proxy: Option<RestProxy>,
}

impl DiscordOAuth {
	pub fn new(
		client_id: String,
		client_secret: String,
		redirect_uri: String,
		scopes: Vec<Scope>,
	) -> Result<Self, DiscordOAuthError> {
		Self::with_api_base(client_id, client_secret, redirect_uri, scopes, DISCORD_API_BASE)
	}

	/// Sets up the client to talk to Discord through another API base, such as a proxy.
	/// The base must end in `/api/v10`.
	pub fn with_api_base(
		client_id: String,
		client_secret: String,
		redirect_uri: String,
		scopes: Vec<Scope>,
		api_base: &str,
	) -> Result<Self, DiscordOAuthError> {
		let api_base = api_base.trim_end_matches('/');
		let rest_proxy = rest_proxy(api_base)?;

		let auth_url = AuthUrl::new(format!("{}/oauth2/authorize", api_base)).map_err(configuration_error)?;
		let token_url = TokenUrl::new(format!("{}/oauth2/token", api_base)).map_err(configuration_error)?;
		let revocation_url =
			RevocationUrl::new(format!("{}/oauth2/token/revoke", api_base)).map_err(configuration_error)?;
		let redirect_url = RedirectUrl::new(redirect_uri.clone()).map_err(configuration_error)?;

		let oauth_client = BasicClient::new(ClientId::new(client_id))
			.set_client_secret(ClientSecret::new(client_secret))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_revocation_url(revocation_url)
			.set_redirect_uri(redirect_url);

		// Following redirects from the token endpoint would leak the client credentials
		let http_client = reqwest::Client::builder()
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.map_err(configuration_error)?;

		Ok(Self {
			oauth_client,
			http_client,
			redirect_uri,
			scopes,
			rest_proxy,
		})
	}

	/// Sets up the client from the site configuration. The redirect URI is the site's `/callback` route.
	pub fn from_config(config: &ConfigData) -> Result<Self, DiscordOAuthError> {
		Self::with_api_base(
			config.discord.client_id.clone(),
			config.discord.client_secret.clone(),
			config.web.redirect_uri(),
			config.discord.scopes.clone(),
			&config.discord.api_base,
		)
	}

	pub fn redirect_uri(&self) -> &str {
		&self.redirect_uri
	}

	/// Builds the URL to send the user to for logging in.
	/// The `state` is round-tripped through Discord and must be checked on callback.
	pub fn authorization_url(&self, state: &str, options: &AuthorizeOptions) -> Url {
		let state = state.to_string();
		let mut request = self
			.oauth_client
			.authorize_url(move || CsrfToken::new(state))
			.add_scopes(
				self.scopes
					.iter()
					.map(|scope| oauth2::Scope::new(scope.as_str().to_string())),
			);

		if let Some(prompt) = options.prompt {
			request = request.add_extra_param("prompt", prompt.as_str());
		}
		if let Some(permissions) = options.permissions {
			request = request.add_extra_param("permissions", permissions.bits().to_string());
		}
		if let Some(guild_id) = options.guild_id {
			request = request.add_extra_param("guild_id", guild_id.to_string());
		}
		if options.disable_guild_select {
			request = request.add_extra_param("disable_guild_select", "true");
		}

		let (url, _) = request.url();
		url
	}

	/// Exchanges the code from the login callback for tokens
	pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, DiscordOAuthError> {
		let http_client = self.http_client.clone();
		let send = move |request: HttpRequest| send_oauth_request(http_client.clone(), request);
		let response = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_string()))
			.request_async(&send)
			.await
			.map_err(|error| token_error(Operation::TokenExchange, error))?;
		Ok(TokenGrant::from(&response))
	}

	pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenGrant, DiscordOAuthError> {
		let http_client = self.http_client.clone();
		let send = move |request: HttpRequest| send_oauth_request(http_client.clone(), request);
		let refresh_token = RefreshToken::new(refresh_token.to_string());
		let response = self
			.oauth_client
			.exchange_refresh_token(&refresh_token)
			.request_async(&send)
			.await
			.map_err(|error| token_error(Operation::TokenRefresh, error))?;
		Ok(TokenGrant::from(&response))
	}

	/// Revokes an access token. Discord authenticates this request with the client credentials.
	pub async fn revoke_token(&self, access_token: &str) -> Result<(), DiscordOAuthError> {
		let http_client = self.http_client.clone();
		let send = move |request: HttpRequest| send_oauth_request(http_client.clone(), request);
		let token = StandardRevocableToken::AccessToken(AccessToken::new(access_token.to_string()));
		let request = self
			.oauth_client
			.revoke_token(token)
			.map_err(|error| DiscordOAuthError::Configuration(error.to_string()))?;
		request
			.request_async(&send)
			.await
			.map_err(|error| token_error(Operation::TokenRevocation, error))
	}

	pub async fn get_user(&self, access_token: &str) -> Result<DiscordUser, DiscordOAuthError> {
		let client = self.bearer_client(access_token);
		let response = client
			.current_user()
			.await
			.map_err(|error| rest_error(Operation::GetUser, error))?;
		let body = response
			.bytes()
			.await
			.map_err(|error| decode_error(Operation::GetUser, error))?;
		serde_json::from_slice(&body).map_err(|error| decode_error(Operation::GetUser, error))
	}

	pub async fn get_user_guilds(
		&self,
		access_token: &str,
		query: &GuildQuery,
	) -> Result<Vec<CurrentUserGuild>, DiscordOAuthError> {
		let client = self.bearer_client(access_token);
		let mut request = client.current_user_guilds();
		if let Some(before) = query.before {
			request = request.before(before);
		}
		if let Some(after) = query.after {
			request = request.after(after);
		}
		if let Some(limit) = query.limit {
			request = request.limit(limit);
		}

		let response = request
			.await
			.map_err(|error| rest_error(Operation::GetGuilds, error))?;
		response
			.models()
			.await
			.map_err(|error| decode_error(Operation::GetGuilds, error))
	}

	/// Gets the accounts the user linked to Discord. Needs the `connections` scope.
	pub async fn get_user_connections(&self, access_token: &str) -> Result<Vec<Connection>, DiscordOAuthError> {
		let client = self.bearer_client(access_token);
		let response = client
			.current_user_connections()
			.await
			.map_err(|error| rest_error(Operation::GetConnections, error))?;
		response
			.models()
			.await
			.map_err(|error| decode_error(Operation::GetConnections, error))
	}

	pub async fn get_current_authorization_info(
		&self,
		access_token: &str,
	) -> Result<CurrentAuthorizationInformation, DiscordOAuthError> {
		let client = self.bearer_client(access_token);
		let response = client
			.current_authorization()
			.await
			.map_err(|error| rest_error(Operation::GetAuthorizationInfo, error))?;
		response
			.model()
			.await
			.map_err(|error| decode_error(Operation::GetAuthorizationInfo, error))
	}

	/// Gets a Discord HTTP client acting as the user who granted the access token
	fn bearer_client(&self, access_token: &str) -> Client {
		let builder = Client::builder().token(format!("Bearer {}", access_token));
		match &self.rest_proxy {
			Some(proxy) => builder.proxy(proxy.host.clone(), proxy.use_http).build(),
			None => builder.build(),
		}
	}
}

fn rest_proxy(api_base: &str) -> Result<Option<RestProxy>, DiscordOAuthError> {
	if api_base == DISCORD_API_BASE {
		return Ok(None);
	}

	let url = Url::parse(api_base).map_err(configuration_error)?;
	if url.path() != API_PATH {
		return Err(DiscordOAuthError::Configuration(format!(
			"API base {} doesn't end in {}",
			api_base, API_PATH
		)));
	}
	let Some(host) = url.host_str() else {
		return Err(DiscordOAuthError::Configuration(format!("API base {} has no host", api_base)));
	};
	let host = match url.port() {
		Some(port) => format!("{}:{}", host, port),
		None => host.to_string(),
	};

	Ok(Some(RestProxy {
		host,
		use_http: url.scheme() == "http",
	}))
}

fn configuration_error(error: impl std::fmt::Display) -> DiscordOAuthError {
	DiscordOAuthError::Configuration(error.to_string())
}

fn token_error<T: ErrorResponse + std::fmt::Display + 'static>(
	operation: Operation,
	error: RequestTokenError<TransportError, T>,
) -> DiscordOAuthError {
	match error {
		RequestTokenError::Request(TransportError::Status { status, body }) => {
			DiscordOAuthError::Status { operation, status, body }
		}
		RequestTokenError::Request(error) => DiscordOAuthError::Transport {
			operation,
			message: error.to_string(),
		},
		RequestTokenError::ServerResponse(response) => DiscordOAuthError::Transport {
			operation,
			message: response.to_string(),
		},
		RequestTokenError::Parse(error, _) => DiscordOAuthError::Decode {
			operation,
			message: error.to_string(),
		},
		RequestTokenError::Other(message) => DiscordOAuthError::Transport { operation, message },
	}
}

fn rest_error(operation: Operation, error: HttpError) -> DiscordOAuthError {
	match error.kind() {
		ErrorType::Response { body, status, .. } => DiscordOAuthError::Status {
			operation,
			status: status.get(),
			body: String::from_utf8_lossy(body).into_owned(),
		},
		_ => DiscordOAuthError::Transport {
			operation,
			message: error.to_string(),
		},
	}
}

fn decode_error(operation: Operation, error: impl std::fmt::Display) -> DiscordOAuthError {
	DiscordOAuthError::Decode {
		operation,
		message: error.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::discord::mock;
	use std::collections::HashMap;

	fn test_client(scopes: Vec<Scope>) -> DiscordOAuth {
		DiscordOAuth::new(
			String::from("1226868250713784331"),
			String::from("not-a-real-secret"),
			String::from("http://localhost:3000/callback"),
			scopes,
		)
		.unwrap()
	}

	fn query_map(url: &Url) -> HashMap<String, String> {
		url.query_pairs().into_owned().collect()
	}

	#[test]
	fn authorization_url_has_client_redirect_and_scopes() {
		let client = test_client(vec![Scope::Identify, Scope::Email, Scope::Guilds]);
		let url = client.authorization_url("nonce", &AuthorizeOptions::default());

		assert_eq!(url.scheme(), "https");
		assert_eq!(url.host_str(), Some("discord.com"));
		assert_eq!(url.path(), "/api/v10/oauth2/authorize");

		let query = query_map(&url);
		assert_eq!(query.get("client_id").map(String::as_str), Some("1226868250713784331"));
		assert_eq!(
			query.get("redirect_uri").map(String::as_str),
			Some("http://localhost:3000/callback")
		);
		assert_eq!(query.get("response_type").map(String::as_str), Some("code"));
		assert_eq!(query.get("scope").map(String::as_str), Some("identify email guilds"));
		assert_eq!(query.get("state").map(String::as_str), Some("nonce"));
		assert!(!query.contains_key("prompt"));
		assert!(!query.contains_key("disable_guild_select"));
	}

	#[test]
	fn authorization_url_bot_invite_options() {
		let client = test_client(vec![Scope::Bot, Scope::ApplicationsCommands]);
		let options = AuthorizeOptions {
			prompt: Some(Prompt::Consent),
			permissions: Some(Permissions::SEND_MESSAGES | Permissions::VIEW_CHANNEL),
			guild_id: Some(Id::new(41771983423143937)),
			disable_guild_select: true,
		};
		let url = client.authorization_url("nonce", &options);
		let query = query_map(&url);

		assert_eq!(query.get("scope").map(String::as_str), Some("bot applications.commands"));
		assert_eq!(query.get("prompt").map(String::as_str), Some("consent"));
		let expected_permissions = (Permissions::SEND_MESSAGES | Permissions::VIEW_CHANNEL).bits().to_string();
		assert_eq!(query.get("permissions"), Some(&expected_permissions));
		assert_eq!(query.get("guild_id").map(String::as_str), Some("41771983423143937"));
		assert_eq!(query.get("disable_guild_select").map(String::as_str), Some("true"));
	}

	#[test]
	fn rejects_invalid_redirect_uri() {
		let result = DiscordOAuth::new(
			String::from("1"),
			String::from("secret"),
			String::from("not a url"),
			vec![Scope::Identify],
		);
		assert!(matches!(result, Err(DiscordOAuthError::Configuration(_))));
	}

	#[test]
	fn token_endpoint_status_becomes_status_error() {
		let error: RequestTokenError<TransportError, oauth2::basic::BasicErrorResponse> =
			RequestTokenError::Request(TransportError::Status {
				status: 401,
				body: String::from(r#"{"error": "invalid_client"}"#),
			});
		let error = token_error(Operation::TokenRefresh, error);
		assert_eq!(error.to_string(), r#"Token refresh failed: 401 {"error": "invalid_client"}"#);
	}

	#[test]
	fn api_base_must_be_versioned_api_path() {
		let result = DiscordOAuth::with_api_base(
			String::from("1"),
			String::from("secret"),
			String::from("http://localhost:3000/callback"),
			vec![Scope::Identify],
			"http://127.0.0.1:8080/api",
		);
		assert!(matches!(result, Err(DiscordOAuthError::Configuration(_))));
	}

	#[test]
	fn discord_token_type_keeps_its_case() {
		let response: BasicTokenResponse = serde_json::from_str(
			r#"{"access_token": "abc", "token_type": "Bearer", "expires_in": 604800, "refresh_token": "def", "scope": "identify guilds"}"#,
		)
		.unwrap();
		let grant = TokenGrant::from(&response);
		assert_eq!(grant.token_type, "Bearer");
		assert_eq!(grant.expires_in, Some(604800));
		assert_eq!(grant.refresh_token.as_deref(), Some("def"));
		assert_eq!(grant.scope.as_deref(), Some("identify guilds"));
	}

	#[tokio::test]
	async fn exchanges_code_for_tokens() {
		let oauth = mock::oauth_client().await;
		let grant = oauth.exchange_code(mock::GOOD_CODE).await.unwrap();
		assert_eq!(
			grant,
			TokenGrant {
				access_token: String::from(mock::ACCESS_TOKEN),
				token_type: String::from("Bearer"),
				expires_in: Some(604800),
				refresh_token: Some(String::from(mock::REFRESH_TOKEN)),
				scope: Some(String::from("identify email guilds")),
			}
		);
	}

	#[tokio::test]
	async fn rejected_code_reports_status_and_body() {
		let oauth = mock::oauth_client().await;
		let error = oauth.exchange_code("stale-code").await.unwrap_err();
		assert!(matches!(
			error,
			DiscordOAuthError::Status {
				operation: Operation::TokenExchange,
				status: 400,
				..
			}
		));
		assert_eq!(
			error.to_string(),
			r#"Token exchange failed: 400 {"error": "invalid_grant", "error_description": "Invalid \"code\" in request."}"#
		);
	}

	#[tokio::test]
	async fn refreshes_tokens() {
		let oauth = mock::oauth_client().await;
		let grant = oauth.refresh_token(mock::REFRESH_TOKEN).await.unwrap();
		assert_eq!(grant.access_token, mock::REFRESHED_ACCESS_TOKEN);

		let error = oauth.refresh_token("revoked-refresh-token").await.unwrap_err();
		assert!(error.to_string().starts_with("Token refresh failed: 400 "));
	}

	#[tokio::test]
	async fn revokes_tokens() {
		let oauth = mock::oauth_client().await;
		oauth.revoke_token(mock::ACCESS_TOKEN).await.unwrap();

		let error = oauth.revoke_token("unknown-token").await.unwrap_err();
		assert_eq!(
			error.to_string(),
			r#"Failed to revoke token: 400 {"error": "invalid_request"}"#
		);
	}

	#[tokio::test]
	async fn gets_user_with_display_name() {
		let oauth = mock::oauth_client().await;
		let user = oauth.get_user(mock::ACCESS_TOKEN).await.unwrap();
		assert_eq!(user.id.get(), mock::USER_ID);
		assert_eq!(user.username, "nelly");
		assert_eq!(user.global_name.as_deref(), Some("Nelly"));
		assert_eq!(user.email.as_deref(), Some("nelly@discord.com"));
	}

	#[tokio::test]
	async fn bad_access_token_reports_status() {
		let oauth = mock::oauth_client().await;
		let error = oauth.get_user("expired-token").await.unwrap_err();
		assert!(matches!(
			error,
			DiscordOAuthError::Status {
				operation: Operation::GetUser,
				status: 401,
				..
			}
		));
		assert!(error.to_string().starts_with("Failed to get user: 401 "));
	}

	#[tokio::test]
	async fn gets_guilds_connections_and_authorization() {
		let oauth = mock::oauth_client().await;

		let guilds = oauth
			.get_user_guilds(mock::ACCESS_TOKEN, &GuildQuery::default())
			.await
			.unwrap();
		let names: Vec<&str> = guilds.iter().map(|guild| guild.name.as_str()).collect();
		assert_eq!(names, ["Dragon's Den", "Discord API"]);
		assert!(guilds[0].owner);

		let connections = oauth.get_user_connections(mock::ACCESS_TOKEN).await.unwrap();
		assert_eq!(connections.len(), 1);
		assert_eq!(connections[0].kind, "github");

		let authorization = oauth.get_current_authorization_info(mock::ACCESS_TOKEN).await.unwrap();
		assert_eq!(authorization.application.name, "Winter Dragon");
		assert_eq!(authorization.scopes, ["identify", "email", "guilds"]);
		assert_eq!(authorization.user.map(|user| user.id.get()), Some(mock::USER_ID));
	}
}
