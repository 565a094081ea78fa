/// Branch that pull requests for webmentions are opened against.
const BASE_BRANCH: &str = "main";

/// The title, description, and branches of a pull request announcing a webmention.
#[derive(Debug, Eq, PartialEq)]
pub struct PullRequestDraft
{
	pub title: String,
	pub body: String,
	pub head_branch: String,
	pub base_branch: &'static str,
}

impl PullRequestDraft
{
	/// Describe a webmention as a pull request labeled with the current time.
	pub fn new(webmention: &crate::Webmention) -> Self
	{
		// The title and branch name only serve as labels, so they don’t need to share a timestamp
		let title = format!("New Webmention Received at {}",
			chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC"));
		let head_branch = format!("{}-new-webmention",
			chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S"));

		Self
		{
			title,
			body: format!("source: {}\ntarget: {}", webmention.source, webmention.target),
			head_branch,
			base_branch: BASE_BRANCH,
		}
	}
}

/// Forwards webmentions to the configured repository by opening pull requests.
///
/// Every webmention results in at most one GitHub API request. Failures aren’t retried, as it’s up
/// to the sender to deliver the webmention again.
#[derive(Clone)]
pub struct Forwarder
{
	#[doc(hidden)]
	config: std::sync::Arc<crate::Config>,
	#[doc(hidden)]
	credentials: crate::CredentialLoader,
	#[doc(hidden)]
	github_api_client: crate::github_api::Client,
}

impl Forwarder
{
	/// Initialize a new forwarder with a given configuration.
	pub fn from_config(config: crate::Config) -> Result<Self, crate::Error>
	{
		let credentials = crate::CredentialLoader::new(config.credentials_path.clone());
		let github_api_client = crate::github_api::Client::from_config(config.github_api.clone())?;

		Ok(Self
		{
			config: std::sync::Arc::new(config),
			credentials,
			github_api_client,
		})
	}

	/// Open a pull request announcing the webmention.
	///
	/// The repository and credentials are checked before anything is sent, so a misconfiguration
	/// never results in a GitHub API request.
	pub async fn forward(&self, webmention: &crate::Webmention)
		-> Result<crate::CreatePullRequestResponse, crate::Error>
	{
		let repository = self.config.repository()?;
		let access_token = self.credentials.load()?;

		let draft = PullRequestDraft::new(webmention);

		log::info!("creating pull request in “{repository}” with title “{}”", draft.title);

		let create_pull_request_request = crate::CreatePullRequestRequest
		{
			title: &draft.title,
			body: &draft.body,
			head: &draft.head_branch,
			base: draft.base_branch,
		};

		let created_pull_request: crate::CreatePullRequestResponse = self.github_api_client
			.post(format!("repos/{repository}/pulls"), &create_pull_request_request,
				&access_token)
			.await
			.map_err(Box::new).map_err(crate::Error::CreatePullRequest)?;

		log::info!("created pull request #{}: {}", created_pull_request.number,
			created_pull_request.html_url);

		Ok(created_pull_request)
	}
}
