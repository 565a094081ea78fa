/// All errors that may occur during initialization or while handling requests.
#[derive(Debug, thiserror::Error)]
pub enum Error
{
	#[error("could not parse URL")]
	ParseUrl(#[source] url::ParseError),
	#[error("could not parse listen address")]
	ParseListenAddress(#[source] std::net::AddrParseError),
	#[error("could not parse request timeout")]
	ParseRequestTimeout(#[source] std::num::ParseIntError),

	#[error("could not create HTTP client")]
	CreateHttpClient(#[source] reqwest::Error),

	#[error("WEBMENTION_FORWARDER_REPO is not set, set it to the target repository in OWNER/REPO \
		format")]
	MissingRepository,

	#[error("GitHub credentials file not found at “{}”, create this file with a GitHub personal \
		access token", path.display())]
	CredentialsFileNotFound
	{
		path: std::path::PathBuf,
	},
	#[error("could not read GitHub credentials file “{}”", path.display())]
	ReadCredentialsFile
	{
		path: std::path::PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("GitHub credentials file “{}” is empty, add a GitHub personal access token to it",
		path.display())]
	EmptyCredentialsFile
	{
		path: std::path::PathBuf,
	},

	#[error("could not make GitHub API request")]
	MakeGitHubApiRequest(#[source] reqwest::Error),
	#[error("GitHub API request timed out")]
	GitHubApiRequestTimedOut(#[source] reqwest::Error),
	#[error("received GitHub API error (status code {status_code}): {response_body}")]
	ReceivedGitHubApiError
	{
		status_code: reqwest::StatusCode,
		url: url::Url,
		response_body: String,
	},
	#[error("could not decode GitHub API response body")]
	DecodeGitHubApiResponseBody(#[source] serde_json::Error),
	#[error("could not create pull request for webmention")]
	CreatePullRequest(#[source] Box<crate::Error>),

	#[error("missing source or target parameter")]
	MissingWebmentionParameters,
	#[error("could not decode multipart payload body")]
	DecodeMultipartBody(#[source] warp::Error),
	#[error("payload too large")]
	PayloadTooLarge,
}

// Allow this crate’s error type to be used for failed HTTP responses
impl warp::reject::Reject for Error
{
}
