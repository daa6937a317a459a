// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::UserProfile;
use leptos::prelude::*;

#[component]
pub fn PageHeader(user: Option<UserProfile>) -> impl IntoView {
	view! {
		<header id="header">
			<a id="header_home" href="/">
				<h1>"Winter Dragon"</h1>
			</a>
			<nav id="header_nav">
				{
					match user {
						Some(profile) => view! {
							<a href="/dashboard" id="header_user">
								<img id="header_user_avatar" src={profile.avatar_url.clone()} alt="" />
								<span>{profile.user.display_name().to_string()}</span>
							</a>
							<form method="post" action="/logout">
								<button type="submit">"Log out"</button>
							</form>
						}.into_any(),
						// Login goes through a server route, so the client-side router must not handle it
						None => view! {
							<a href="/login" rel="external" id="header_login">"Log in with Discord"</a>
						}.into_any(),
					}
				}
			</nav>
		</header>
	}
}
