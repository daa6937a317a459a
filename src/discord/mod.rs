// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod callback;
pub mod cdn;
mod client;
mod error;
mod http;
mod scopes;
pub mod snowflake;
mod user;
#[cfg(test)]
pub(crate) mod mock;

pub use callback::{CallbackParams, generate_state};
pub use client::{AuthorizeOptions, DISCORD_API_BASE, DiscordOAuth, GuildQuery, Prompt, TokenGrant};
pub use error::{DiscordOAuthError, Operation};
pub use scopes::{DEFAULT_LOGIN_SCOPES, Scope, UnknownScopeError};
pub use user::DiscordUser;
