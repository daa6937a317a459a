// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#[cfg(feature = "ssr")]
#[tokio::main]
async fn main() -> miette::Result<()> {
	use std::sync::Arc;
	use tracing_subscriber::EnvFilter;
	use winter_dragon_web::config::parse_config;
	use winter_dragon_web::discord::DiscordOAuth;
	use winter_dragon_web::web::server::run_server;

	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let config = Arc::new(parse_config("config.kdl").await?);
	let oauth = Arc::new(DiscordOAuth::from_config(&config)?);
	tracing::info!(redirect_uri = oauth.redirect_uri(), "Discord OAuth client ready");

	run_server(config, oauth).await
}

#[cfg(not(feature = "ssr"))]
pub fn main() {}
