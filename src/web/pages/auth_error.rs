// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::utils::take_auth_error;
use leptos::prelude::*;

#[component]
pub fn AuthError() -> impl IntoView {
	let message = OnceResource::new(take_auth_error());
	let message = move || {
		message
			.read()
			.as_ref()
			.and_then(|message| message.as_ref().ok().cloned().flatten())
			.unwrap_or_else(|| String::from("An unknown error occurred"))
	};

	view! {
		<div id="auth_error_page">
			<h1>"Authentication Error"</h1>
			<Suspense fallback=|| view! { <p>"Loading..."</p> }>
				<p class="auth_error_message">{message}</p>
			</Suspense>
			<a href="/">"Return Home"</a>
		</div>
	}
}
