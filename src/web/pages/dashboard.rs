// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::{GuildData, UserProfile, get_current_user, get_user_guilds};
use leptos::prelude::*;

#[component]
pub fn Dashboard() -> impl IntoView {
	let user = OnceResource::new(get_current_user());
	let guilds = OnceResource::new(get_user_guilds());

	view! {
		<div id="dashboard_layout">
			<Transition fallback=|| view! { <div class="dashboard_loading">"Loading..."</div> }>
				{
					move || match user.read().as_ref().and_then(|user| user.as_ref().ok().cloned().flatten()) {
						Some(profile) => view! { <UserCard profile /> }.into_any(),
						None => view! {
							<div id="dashboard_login_prompt">
								<p>"Log in to see your servers."</p>
								<a href="/login" rel="external">"Log in with Discord"</a>
							</div>
						}.into_any(),
					}
				}
			</Transition>
			<Transition fallback=|| view! { <div class="dashboard_loading">"Loading servers..."</div> }>
				{
					move || match guilds.read().as_ref() {
						Some(Ok(guilds)) => view! { <GuildList guilds={guilds.clone()} /> }.into_any(),
						Some(Err(error)) => view! {
							<div class="dashboard_error">
								{format!("Couldn't load your servers: {}", error)}
							</div>
						}.into_any(),
						None => ().into_any(),
					}
				}
			</Transition>
		</div>
	}
}

#[component]
fn UserCard(profile: UserProfile) -> impl IntoView {
	let UserProfile {
		user,
		avatar_url,
		account_created,
	} = profile;
	let display_name = user.display_name().to_string();

	view! {
		<div id="dashboard_user">
			<img id="dashboard_user_avatar" src={avatar_url} alt="Avatar" />
			<div>
				<h2>{display_name}</h2>
				<div class="dashboard_user_username">{format!("@{}", user.username)}</div>
				{
					user.email.map(|email| view! {
						<div class="dashboard_user_email">{email}</div>
					})
				}
				{
					account_created.map(|created| view! {
						<div class="dashboard_user_created">
							{format!("On Discord since {}", created.format("%B %-d, %Y"))}
						</div>
					})
				}
			</div>
		</div>
	}
}

#[component]
fn GuildList(guilds: Vec<GuildData>) -> impl IntoView {
	if guilds.is_empty() {
		return view! {
			<p class="dashboard_guild_list_empty">"You aren't in any servers."</p>
		}
		.into_any();
	}

	// Servers the user can add the bot to come first
	let mut guilds = guilds;
	guilds.sort_by_key(|guild| !guild.permission_level.can_manage());

	view! {
		<table class="dashboard_guild_list">
			<thead>
				<tr>
					<th></th>
					<th>"Server"</th>
					<th>"Your Access"</th>
				</tr>
			</thead>
			<tbody>
				{
					guilds.into_iter().map(|guild| view! {
						<tr>
							<td>
								{
									guild
										.icon_image_url
										.map(|url| view! {
											<img class="dashboard_guild_icon" src={url} alt="Server Icon" />
										})
								}
							</td>
							<td>{guild.name}</td>
							<td>{guild.permission_level.label()}</td>
						</tr>
					}).collect::<Vec<_>>()
				}
			</tbody>
		</table>
	}
	.into_any()
}
