/// Configuration of the GitHub API client.
#[derive(Clone, Debug)]
pub struct Config
{
	/// The base URL of the GitHub API server with a trailing slash (default:
	/// <https://api.github.com/>).
	pub base_url: url::Url,
	/// Maximum time a single GitHub API request may take before it’s abandoned.
	pub request_timeout: std::time::Duration,
}

#[doc(hidden)]
pub fn github_com_api_base_url() -> url::Url
{
	url::Url::parse("https://api.github.com/")
		.expect("this call is infallible because we know the URL to be well-formed")
}

/// Parse a GitHub API base URL. A trailing slash is added if necessary, as endpoints are resolved
/// relative to the base URL and would otherwise replace its last path segment (such as `v3` in
/// `https://github.example.com/api/v3`).
pub fn parse_base_url(base_url: &str) -> Result<url::Url, crate::Error>
{
	let mut base_url = url::Url::parse(base_url).map_err(crate::Error::ParseUrl)?;

	if !base_url.path().ends_with('/')
	{
		let path = format!("{}/", base_url.path());
		base_url.set_path(&path);
	}

	Ok(base_url)
}

/// A GitHub API client authenticating with a personal access token.
///
/// The token isn’t stored in the client but passed along with every request, as it’s reread from
/// disk for every webmention. Each request is made exactly once and is abandoned after the
/// configured timeout.
///
/// The client can safely be shared between threads, as cloning it only clones handles to the
/// underlying connection pool.
#[derive(Clone)]
pub struct Client
{
	#[doc(hidden)]
	config: std::sync::Arc<Config>,
	#[doc(hidden)]
	reqwest_client: reqwest::Client,
}

impl Client
{
	/// Initialize a new GitHub API client with a given configuration.
	pub fn from_config(config: Config) -> Result<Self, crate::Error>
	{
		let reqwest_client = reqwest::ClientBuilder::new()
			// Set a recognizable user agent to get meaningful debugging information from GitHub
			.user_agent(env!("CARGO_PKG_NAME"))
			.timeout(config.request_timeout)
			.build().map_err(crate::Error::CreateHttpClient)?;

		Ok(Self
		{
			config: std::sync::Arc::new(config),
			reqwest_client,
		})
	}

	/// Make an HTTP POST request with a JSON body to the GitHub API.
	///
	/// # Arguments
	/// - `endpoint`: The API endpoint (without host and leading slash, example:
	///   `repos/example-owner/example-repo/pulls`).
	/// - `body`: A serializable type containing the request body.
	/// - `access_token`: The token to authenticate with.
	pub async fn post<S, B, R>(&self, endpoint: S, body: &B, access_token: &crate::Credential)
		-> Result<R, crate::Error>
	where
		S: AsRef<str>,
		B: serde::Serialize,
		R: serde::de::DeserializeOwned,
	{
		// Build the API endpoint URL from the base URL and the endpoint path
		let url = self.config.base_url.join(endpoint.as_ref()).map_err(crate::Error::ParseUrl)?;

		let response = self.reqwest_client.post(url)
			// Serialize the body, which also sets the JSON content type
			.json(body)
			// Provide the access token using the Authorization header
			.bearer_auth(access_token)
			// Request the REST API media type, as recommended by GitHub’s documentation
			.header(reqwest::header::ACCEPT, "application/vnd.github+json")
			// Send the request
			.send().await.map_err(map_reqwest_error)?;

		// Return an error for every status other than 2xx
		if !response.status().is_success()
		{
			let status_code = response.status();
			let url = response.url().to_owned();

			// Decode the body for debugging purposes
			let response_body = response.text().await.map_err(map_reqwest_error)?;

			log::error!("GitHub API request failed with status {status_code}: {response_body}");

			return Err(crate::Error::ReceivedGitHubApiError{status_code, url, response_body});
		}

		let response_body = response.bytes().await.map_err(map_reqwest_error)?;

		serde_json::from_slice(&response_body).map_err(crate::Error::DecodeGitHubApiResponseBody)
	}
}

/// Distinguish timeouts from other transport failures.
#[doc(hidden)]
fn map_reqwest_error(error: reqwest::Error) -> crate::Error
{
	match error.is_timeout()
	{
		true => crate::Error::GitHubApiRequestTimedOut(error),
		false => crate::Error::MakeGitHubApiRequest(error),
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	use wiremock::matchers::{header, method, path};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	fn client_for(server: &MockServer, request_timeout: std::time::Duration) -> Client
	{
		let config = Config
		{
			base_url: parse_base_url(&server.uri()).unwrap(),
			request_timeout,
		};

		Client::from_config(config).unwrap()
	}

	fn token() -> crate::Credential
	{
		let file = tempfile::NamedTempFile::new().unwrap();
		std::fs::write(file.path(), "test_github_token").unwrap();
		crate::CredentialLoader::new(file.path()).load().unwrap()
	}

	#[test]
	fn base_url_keeps_path_prefix()
	{
		let base_url = parse_base_url("https://custom-github.com/api/v3").unwrap();
		let url = base_url.join("repos/owner/repo/pulls").unwrap();

		assert_eq!(url.as_str(), "https://custom-github.com/api/v3/repos/owner/repo/pulls");

		let base_url = parse_base_url("https://api.github.com").unwrap();
		assert_eq!(base_url, github_com_api_base_url());
	}

	#[tokio::test]
	async fn post_sends_expected_headers_and_decodes_response()
	{
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.and(path("/repos/owner/repo/pulls"))
			.and(header("authorization", "Bearer test_github_token"))
			.and(header("accept", "application/vnd.github+json"))
			.and(header("content-type", "application/json"))
			.and(header("user-agent", "webmention-forwarder"))
			.respond_with(ResponseTemplate::new(201)
				.set_body_json(serde_json::json!({"number": 7, "html_url": "https://example.com"})))
			.expect(1)
			.mount(&server)
			.await;

		let client = client_for(&server, std::time::Duration::from_secs(5));
		let response: serde_json::Value = client
			.post("repos/owner/repo/pulls", &serde_json::json!({"title": "x"}), &token())
			.await
			.unwrap();

		assert_eq!(response["number"], 7);
	}

	#[tokio::test]
	async fn non_success_status_is_an_error()
	{
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(401)
				.set_body_json(serde_json::json!({"message": "Bad credentials"})))
			.expect(1)
			.mount(&server)
			.await;

		let client = client_for(&server, std::time::Duration::from_secs(5));
		let result: Result<serde_json::Value, _> =
			client.post("repos/owner/repo/pulls", &(), &token()).await;

		match result
		{
			Err(crate::Error::ReceivedGitHubApiError{status_code, response_body, ..}) =>
			{
				assert_eq!(status_code, reqwest::StatusCode::UNAUTHORIZED);
				assert!(response_body.contains("Bad credentials"));
			},
			_ => panic!("expected a GitHub API error"),
		}
	}

	#[tokio::test]
	async fn server_errors_are_not_retried()
	{
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(502))
			.expect(1)
			.mount(&server)
			.await;

		let client = client_for(&server, std::time::Duration::from_secs(5));
		let result: Result<serde_json::Value, _> =
			client.post("repos/owner/repo/pulls", &(), &token()).await;

		assert!(matches!(result, Err(crate::Error::ReceivedGitHubApiError{..})));
	}

	#[tokio::test]
	async fn slow_responses_time_out()
	{
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(201)
				.set_delay(std::time::Duration::from_secs(2)))
			.mount(&server)
			.await;

		let client = client_for(&server, std::time::Duration::from_millis(100));
		let result: Result<serde_json::Value, _> =
			client.post("repos/owner/repo/pulls", &(), &token()).await;

		assert!(matches!(result, Err(crate::Error::GitHubApiRequestTimedOut(_))));
	}

	#[tokio::test]
	async fn malformed_response_is_an_error()
	{
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(201).set_body_string("not json"))
			.mount(&server)
			.await;

		let client = client_for(&server, std::time::Duration::from_secs(5));
		let result: Result<serde_json::Value, _> =
			client.post("repos/owner/repo/pulls", &(), &token()).await;

		assert!(matches!(result, Err(crate::Error::DecodeGitHubApiResponseBody(_))));
	}

	#[tokio::test]
	async fn empty_success_response_is_an_error()
	{
		let server = MockServer::start().await;

		Mock::given(method("POST"))
			.respond_with(ResponseTemplate::new(201))
			.expect(1)
			.mount(&server)
			.await;

		let client = client_for(&server, std::time::Duration::from_secs(5));
		let result: Result<crate::CreatePullRequestResponse, _> =
			client.post("repos/owner/repo/pulls", &(), &token()).await;

		assert!(matches!(result, Err(crate::Error::DecodeGitHubApiResponseBody(_))));
	}
}
