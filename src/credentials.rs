/// Reads the GitHub personal access token from a file on disk.
///
/// The token is read anew on every call to [CredentialLoader::load] so that a rotated token takes
/// effect with the next webmention, without restarting the service.
#[derive(Clone, Debug)]
pub struct CredentialLoader
{
	#[doc(hidden)]
	path: std::path::PathBuf,
}

impl CredentialLoader
{
	/// Create a loader for the credentials file at `path`.
	pub fn new<P>(path: P) -> Self
	where
		P: Into<std::path::PathBuf>
	{
		Self{path: path.into()}
	}

	/// Read the token from the credentials file, ignoring surrounding whitespace.
	pub fn load(&self) -> Result<Credential, crate::Error>
	{
		let contents = std::fs::read_to_string(&self.path).map_err(|error|
			match error.kind()
			{
				std::io::ErrorKind::NotFound =>
					crate::Error::CredentialsFileNotFound{path: self.path.clone()},
				_ => crate::Error::ReadCredentialsFile{path: self.path.clone(), source: error},
			})?;

		let token = contents.trim();

		if token.is_empty()
		{
			return Err(crate::Error::EmptyCredentialsFile{path: self.path.clone()});
		}

		Ok(Credential(token.to_owned()))
	}
}

/// A GitHub personal access token, used as a bearer token for GitHub API requests.
#[derive(Clone, Eq, PartialEq)]
pub struct Credential(String);

impl std::fmt::Display for Credential
{
	fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result
	{
		write!(formatter, "{}", self.0)
	}
}

// Keep the token out of logs
impl std::fmt::Debug for Credential
{
	fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result
	{
		formatter.write_str("Credential(***)")
	}
}
