// © 2024-2025 ElementalAlchemist and the Dainsleif Mains Development Team
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use oauth2::{HttpRequest, HttpResponse};
use std::fmt;

/// Error from sending an OAuth request to Discord
#[derive(Debug)]
pub enum TransportError {
	/// Discord answered, but not with a success status. The body is kept as text for the error message.
	Status { status: u16, body: String },
	Request(reqwest::Error),
	Http(oauth2::http::Error),
}

impl From<reqwest::Error> for TransportError {
	fn from(error: reqwest::Error) -> Self {
		Self::Request(error)
	}
}

impl fmt::Display for TransportError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Status { status, body } => write!(f, "{} {}", status, body),
			Self::Request(error) => write!(f, "request error: {}", error),
			Self::Http(error) => write!(f, "HTTP error: {}", error),
		}
	}
}

impl std::error::Error for TransportError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Status { .. } => None,
			Self::Request(error) => Some(error),
			Self::Http(error) => Some(error),
		}
	}
}

/// Sends a request built by the OAuth client.
///
/// Takes the client by value so the returned future doesn't borrow from the caller. Non-success responses become [TransportError::Status] before the OAuth client sees them, so every token
/// endpoint failure reports Discord's status and body.
pub async fn send_oauth_request(http_client: reqwest::Client, request: HttpRequest) -> Result<HttpResponse, TransportError> {
	let request = reqwest::Request::try_from(request)?;
	let response = http_client.execute(request).await?;

	let status = response.status();
	let mut builder = oauth2::http::Response::builder().status(status);
	for (name, value) in response.headers() {
		builder = builder.header(name, value);
	}
	let body = response.bytes().await?.to_vec();

	if !status.is_success() {
		return Err(TransportError::Status {
			status: status.as_u16(),
			body: String::from_utf8_lossy(&body).into_owned(),
		});
	}

	builder.body(body).map_err(TransportError::Http)
}
