// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::auth_error::AuthError;
use super::dashboard::Dashboard;
use super::errors::not_found::NotFound;
use super::header::PageHeader;
use super::home::Home;
use super::utils::get_current_user;
use leptos::prelude::*;
use leptos_meta::{Stylesheet, Title, provide_meta_context};
use leptos_router::components::{ParentRoute, Route, Router, Routes};
use leptos_router::nested_router::Outlet;
use leptos_router::path;

#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Stylesheet href="/pkg/winter-dragon-web.css" />
		<Title text="Winter Dragon" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<ParentRoute path=path!("") view=MainPage>
					<Route path=path!("") view=Home />
					<Route path=path!("dashboard") view=Dashboard />
					<Route path=path!("auth/error") view=AuthError />
				</ParentRoute>
			</Routes>
		</Router>
	}
}

#[component]
fn MainPage() -> impl IntoView {
	view! {
		<Await future=get_current_user() let:user>
			<PageHeader user={user.as_ref().ok().cloned().flatten()} />
			<main>
				<Outlet />
			</main>
		</Await>
	}
}
