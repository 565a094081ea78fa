/// Environment variable naming the repository that webmentions are forwarded to.
const REPOSITORY_VARIABLE: &str = "WEBMENTION_FORWARDER_REPO";
/// Environment variable overriding the GitHub API base URL.
const API_BASE_URL_VARIABLE: &str = "GITHUB_API_URL";
/// Environment variable overriding the path of the GitHub credentials file.
const CREDENTIALS_PATH_VARIABLE: &str = "GITHUB_CREDENTIALS_PATH";
/// Environment variable overriding the address the HTTP server listens on.
const LISTEN_ADDRESS_VARIABLE: &str = "WEBMENTION_FORWARDER_LISTEN_ADDRESS";
/// Environment variable overriding the timeout of GitHub API requests in seconds.
const REQUEST_TIMEOUT_VARIABLE: &str = "WEBMENTION_FORWARDER_TIMEOUT_SECS";

const DEFAULT_LISTEN_ADDRESS: &str = "127.0.0.1:9292";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CREDENTIALS_FILE_NAME: &str = ".github_credentials";

/// Top-level configuration of this application.
///
/// The configuration is read from environment variables once at startup and is read-only
/// afterwards. The GitHub credentials themselves are not part of it, as they are read from
/// [Config::credentials_path] anew for every webmention.
#[derive(Clone, Debug)]
pub struct Config
{
	/// Address the HTTP server listens on for incoming webmentions.
	pub listen_address: std::net::SocketAddr,
	/// Repository in `OWNER/REPO` format that pull requests are opened in. This is only required
	/// once a webmention is forwarded, so the server can start without it.
	pub repository: Option<String>,
	/// Path to the file containing the GitHub personal access token.
	pub credentials_path: std::path::PathBuf,
	/// Configuration options specific to the GitHub API.
	pub github_api: crate::github_api::Config,
}

impl Config
{
	/// Read the configuration from the process environment.
	pub fn from_env() -> Result<Self, crate::Error>
	{
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Read the configuration using a custom lookup function for environment variables.
	///
	/// # Arguments
	/// `lookup`: Returns the value of the environment variable with the given name, if set.
	pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
	where
		F: Fn(&str) -> Option<String>
	{
		// Treat empty variables as if they weren’t set at all
		let lookup = |name: &str| lookup(name).filter(|value| !value.is_empty());

		let listen_address = lookup(LISTEN_ADDRESS_VARIABLE)
			.as_deref()
			.unwrap_or(DEFAULT_LISTEN_ADDRESS)
			.parse()
			.map_err(crate::Error::ParseListenAddress)?;

		let credentials_path = match lookup(CREDENTIALS_PATH_VARIABLE)
		{
			Some(path) => path.into(),
			None => default_credentials_path(),
		};

		let base_url = match lookup(API_BASE_URL_VARIABLE)
		{
			Some(base_url) => crate::github_api::parse_base_url(&base_url)?,
			None => crate::github_api::github_com_api_base_url(),
		};

		let request_timeout = match lookup(REQUEST_TIMEOUT_VARIABLE)
		{
			Some(seconds) => seconds.parse().map_err(crate::Error::ParseRequestTimeout)?,
			None => DEFAULT_REQUEST_TIMEOUT_SECS,
		};

		Ok(Self
		{
			listen_address,
			repository: lookup(REPOSITORY_VARIABLE),
			credentials_path,
			github_api: crate::github_api::Config
			{
				base_url,
				request_timeout: std::time::Duration::from_secs(request_timeout),
			},
		})
	}

	/// The repository webmentions are forwarded to, failing if it wasn’t configured.
	pub fn repository(&self) -> Result<&str, crate::Error>
	{
		self.repository.as_deref()
			.filter(|repository| !repository.is_empty())
			.ok_or(crate::Error::MissingRepository)
	}
}

/// `~/.github_credentials`, or a file of that name in the working directory if there’s no home
/// directory.
#[doc(hidden)]
fn default_credentials_path() -> std::path::PathBuf
{
	dirs::home_dir().unwrap_or_default().join(DEFAULT_CREDENTIALS_FILE_NAME)
}

#[cfg(test)]
mod tests
{
	use super::*;

	fn lookup_from(variables: &[(&str, &str)])
		-> impl Fn(&str) -> Option<String>
	{
		let variables: std::collections::HashMap<String, String> = variables.iter()
			.map(|(name, value)| (name.to_string(), value.to_string()))
			.collect();

		move |name: &str| variables.get(name).cloned()
	}

	#[test]
	fn defaults_apply_when_nothing_is_set()
	{
		let config = Config::from_lookup(lookup_from(&[])).unwrap();

		assert_eq!(config.listen_address,
			"127.0.0.1:9292".parse::<std::net::SocketAddr>().unwrap());
		assert_eq!(config.repository, None);
		assert!(config.credentials_path.ends_with(".github_credentials"));
		assert_eq!(config.github_api.base_url.as_str(), "https://api.github.com/");
		assert_eq!(config.github_api.request_timeout, std::time::Duration::from_secs(30));
	}

	#[test]
	fn variables_override_defaults()
	{
		let config = Config::from_lookup(lookup_from(&[
			("WEBMENTION_FORWARDER_REPO", "test-owner/test-repo"),
			("GITHUB_API_URL", "https://custom-github.com/api/v3"),
			("GITHUB_CREDENTIALS_PATH", "/tmp/test_github_credentials"),
			("WEBMENTION_FORWARDER_LISTEN_ADDRESS", "0.0.0.0:8080"),
			("WEBMENTION_FORWARDER_TIMEOUT_SECS", "10"),
		])).unwrap();

		assert_eq!(config.repository().unwrap(), "test-owner/test-repo");
		assert_eq!(config.github_api.base_url.as_str(), "https://custom-github.com/api/v3/");
		assert_eq!(config.credentials_path,
			std::path::PathBuf::from("/tmp/test_github_credentials"));
		assert_eq!(config.listen_address,
			"0.0.0.0:8080".parse::<std::net::SocketAddr>().unwrap());
		assert_eq!(config.github_api.request_timeout, std::time::Duration::from_secs(10));
	}

	#[test]
	fn empty_repository_counts_as_missing()
	{
		let config = Config::from_lookup(lookup_from(&[("WEBMENTION_FORWARDER_REPO", "")]))
			.unwrap();

		assert!(matches!(config.repository(), Err(crate::Error::MissingRepository)));

		// Also when set directly rather than through the environment
		let config = Config{repository: Some(String::new()), ..config};

		assert!(matches!(config.repository(), Err(crate::Error::MissingRepository)));
	}

	#[test]
	fn invalid_values_are_rejected()
	{
		let result = Config::from_lookup(lookup_from(&[("GITHUB_API_URL", "not a url")]));
		assert!(matches!(result, Err(crate::Error::ParseUrl(_))));

		let result = Config::from_lookup(
			lookup_from(&[("WEBMENTION_FORWARDER_LISTEN_ADDRESS", "localhost")]));
		assert!(matches!(result, Err(crate::Error::ParseListenAddress(_))));

		let result = Config::from_lookup(
			lookup_from(&[("WEBMENTION_FORWARDER_TIMEOUT_SECS", "soon")]));
		assert!(matches!(result, Err(crate::Error::ParseRequestTimeout(_))));
	}
}
