#[doc(hidden)]
mod config;
#[doc(hidden)]
mod credentials;
#[doc(hidden)]
mod error;
#[doc(hidden)]
mod forwarder;
pub mod github_api;
#[doc(hidden)]
mod models;
#[doc(hidden)]
mod webmention;

pub use config::Config;
pub use credentials::{Credential, CredentialLoader};
pub use error::Error;
pub use forwarder::{Forwarder, PullRequestDraft};
pub use models::*;
pub use webmention::{Webmention, WebmentionParameters};

/// Page for creating a personal access token with the scopes needed to open pull requests.
const TOKEN_CREATION_URL: &str =
	"https://github.com/settings/tokens/new?scopes=repo&description=Webmention%20Forwarder";

#[tokio::main]
async fn main() -> anyhow::Result<()>
{
	let mut logger = pretty_env_logger::formatted_builder();
	logger.filter_level(log::LevelFilter::Info);

	if let Ok(filters) = std::env::var("RUST_LOG")
	{
		logger.parse_filters(&filters);
	}

	logger.init();

	// Read the configuration from the environment
	let config = Config::from_env()?;
	let listen_address = config.listen_address;

	// The repository is only needed once webmentions arrive, so don’t refuse to start without it
	if config.repository.is_none()
	{
		log::warn!("WEBMENTION_FORWARDER_REPO is not set, webmentions can’t be forwarded until \
			it is");
	}

	let forwarder = Forwarder::from_config(config)?;

	log::info!("listening for incoming webmentions on {listen_address}");
	warp::serve(routes(forwarder)).run(listen_address).await;

	Ok(())
}

/// All routes of this service, including the handler turning rejections into HTTP responses.
///
/// # Arguments
/// `forwarder`: Forwards valid webmentions to GitHub.
fn routes(forwarder: Forwarder)
	-> impl warp::Filter<Extract = (impl warp::Reply,), Error = std::convert::Infallible> + Clone
{
	use warp::Filter as _;

	let webmention_route =
		// Only listen for requests to /webmention
		with_exact_path("/webmention")
		// Only listen for POST requests
		.and(warp::post())
		// Collect the source and target parameters from the query string and the body
		.and(webmention::with_webmention_parameters())
		// Relay a handle to the forwarder
		.and(warp::any().map(move || forwarder.clone()))
		// Forward request to request handler
		.and_then(handle_webmention);

	let token_creation_route =
		with_exact_path("/")
		.and(warp::get())
		.map(redirect_to_token_creation);

	webmention_route
		.or(token_creation_route)
		.recover(handle_rejection)
}

/// [warp] filter only letting through requests to exactly the given path. Unlike
/// [warp::path::end], this doesn’t accept a trailing slash (`/webmention/`) as the same path.
///
/// # Arguments
/// `expected_path`: The full path including the leading slash, without the query string.
fn with_exact_path(expected_path: &'static str)
	-> impl warp::Filter<Extract = (), Error = warp::Rejection> + Clone
{
	use warp::Filter as _;

	warp::path::full()
		.and_then(move |path: warp::path::FullPath| async move
		{
			match path.as_str() == expected_path
			{
				true => Ok(()),
				false => Err(warp::reject::not_found()),
			}
		})
		.untuple_one()
}

/// Request handler for incoming webmentions.
///
/// # Arguments
/// - `parameters`: The webmention parameters as supplied by the sender.
/// - `forwarder`: A handle to the forwarder.
async fn handle_webmention(parameters: WebmentionParameters, forwarder: Forwarder)
	-> Result<impl warp::Reply, warp::Rejection>
{
	let webmention = parameters.validate().map_err(warp::reject::custom)?;

	log::info!("received webmention from “{}” to “{}”", webmention.source, webmention.target);

	forwarder.forward(&webmention).await.map_err(warp::reject::custom)?;

	Ok(warp::reply::with_status("Webmention processed successfully",
		warp::http::StatusCode::OK))
}

/// Redirect to the GitHub page for creating a personal access token this service can use.
fn redirect_to_token_creation() -> impl warp::Reply
{
	let response = warp::reply::with_status(warp::reply(), warp::http::StatusCode::FOUND);

	warp::reply::with_header(response, warp::http::header::LOCATION, TOKEN_CREATION_URL)
}

/// Request handler for all requests that were rejected previously.
///
/// This is the only place where errors are turned into responses. Apart from missing webmention
/// parameters, no error details are revealed to the client, but they are logged instead.
///
/// # Arguments
/// - `error`: Reasons for why this request was rejected by all routes.
async fn handle_rejection(error: warp::Rejection)
	-> Result<impl warp::Reply, std::convert::Infallible>
{
	let status_code;
	let message;

	if let Some(crate::Error::MissingWebmentionParameters) = error.find()
	{
		status_code = warp::http::StatusCode::BAD_REQUEST;
		message = "Bad Request: source and target parameters are required";
	}
	else if let Some(crate::Error::PayloadTooLarge) = error.find()
	{
		status_code = warp::http::StatusCode::PAYLOAD_TOO_LARGE;
		message = "Payload Too Large";
	}
	else if let Some(crate::Error::DecodeMultipartBody(_)) = error.find()
	{
		status_code = warp::http::StatusCode::BAD_REQUEST;
		message = "Bad Request";
	}
	else if let Some(error) = error.find::<crate::Error>()
	{
		status_code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
		message = "Internal Server Error";

		log::error!("could not forward webmention: {}", describe_error_chain(error));
	}
	// Routes exist for one method each, so a wrong method is as good as a missing route
	else if error.is_not_found() || error.find::<warp::reject::MethodNotAllowed>().is_some()
	{
		status_code = warp::http::StatusCode::NOT_FOUND;
		message = "Not Found";
	}
	else if let Some(_) = error.find::<warp::reject::InvalidHeader>()
	{
		status_code = warp::http::StatusCode::BAD_REQUEST;
		message = "Bad Request";
	}
	// If users are able to trigger errors we did not anticipate, log them so we can inspect this
	// more closely later
	else
	{
		status_code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
		message = "Internal Server Error";

		log::error!("unhandled error: {:#?}", error);
	}

	Ok(warp::reply::with_status(message, status_code))
}

/// Describe an error along with the chain of errors that caused it, one cause per line.
#[doc(hidden)]
fn describe_error_chain(error: &(dyn std::error::Error + 'static)) -> String
{
	anyhow::Chain::new(error)
		.map(|cause| cause.to_string())
		.collect::<Vec<_>>()
		.join("\ncaused by: ")
}
