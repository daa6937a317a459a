// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use leptos::prelude::*;

#[component]
pub fn Home() -> impl IntoView {
	view! {
		<div id="home_page">
			<h1>"Winter Dragon"</h1>
			<p>"A Discord bot for moderation, automod, custom commands, welcome messages, logging, and games."</p>
			<a href="/dashboard" rel="external" class="home_call_to_action">"Open the dashboard"</a>
		</div>
	}
}
