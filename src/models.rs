/// Partial data model for the parameters needed to make a GitHub API request to create a new pull
/// request.
#[derive(Debug, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CreatePullRequestRequest<'a>
{
	/// The title of the pull request.
	pub title: &'a str,
	/// The contents of the pull request.
	pub body: &'a str,
	/// The name of the branch where the changes are implemented.
	pub head: &'a str,
	/// The name of the branch the changes should be pulled into.
	pub base: &'a str,
	// We don’t need to set the optional fields, so ignore them
}

/// Partial data model for the response of the GitHub API to a request to create a new pull
/// request.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CreatePullRequestResponse
{
	/// The number identifying the pull request within its repository.
	pub number: u64,
	/// User-facing URL of the created pull request, only used for logging.
	pub html_url: String,
	// We don’t need the other fields, so ignore them
}
