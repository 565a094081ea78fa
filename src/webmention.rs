/// Request bodies larger than this are rejected, which is plenty for a source and target URL.
const MAX_BODY_SIZE: u64 = 256 * 1024;

const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";
const MULTIPART_MEDIA_TYPE: &str = "multipart/form-data";

/// A validated webmention, asserting that `source` links to `target`.
///
/// Neither URL is checked for being well-formed, and `source` isn’t fetched to verify the claim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Webmention
{
	/// URL of the document mentioning `target`.
	pub source: String,
	/// URL of the document being mentioned.
	pub target: String,
}

/// The webmention parameters as supplied by the sender, before validation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WebmentionParameters
{
	pub source: Option<String>,
	pub target: Option<String>,
}

impl WebmentionParameters
{
	/// Collect the parameters from the query string and the request body.
	///
	/// The body is only decoded as a form if it’s declared as one or if no content type was given
	/// at all. Body parameters take precedence over query parameters of the same name, and later
	/// occurrences of a parameter over earlier ones.
	///
	/// # Arguments
	/// - `query`: The raw query string without the leading `?`.
	/// - `content_type`: The value of the request’s `Content-Type` header, if present.
	/// - `body`: The raw request body.
	pub fn parse(query: &str, content_type: Option<&str>, body: &[u8]) -> Self
	{
		let mut parameters = Self::default();

		parameters.extend(url::form_urlencoded::parse(query.as_bytes()));

		if content_type.map_or(true, |content_type| has_media_type(content_type, FORM_MEDIA_TYPE))
		{
			parameters.extend(url::form_urlencoded::parse(body));
		}

		parameters
	}

	/// Require both `source` and `target` to be present.
	///
	/// Only absent parameters are rejected. Empty values are passed on as they are.
	pub fn validate(self) -> Result<Webmention, crate::Error>
	{
		match (self.source, self.target)
		{
			(Some(source), Some(target)) => Ok(Webmention{source, target}),
			(source, target) =>
			{
				log::warn!("invalid webmention: missing source or target (source: {source:?}, \
					target: {target:?})");
				Err(crate::Error::MissingWebmentionParameters)
			},
		}
	}

	#[doc(hidden)]
	fn extend<'a, I>(&mut self, pairs: I)
	where
		I: Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>
	{
		for (name, value) in pairs
		{
			self.set(&name, value.into_owned());
		}
	}

	#[doc(hidden)]
	fn set(&mut self, name: &str, value: String)
	{
		match name
		{
			"source" => self.source = Some(value),
			"target" => self.target = Some(value),
			_ => (),
		}
	}
}

/// Check whether a `Content-Type` header value denotes the given media type, ignoring parameters
/// such as `charset` or `boundary`.
#[doc(hidden)]
fn has_media_type(content_type: &str, media_type: &str) -> bool
{
	content_type.split(';').next()
		.map_or(false, |actual| actual.trim().eq_ignore_ascii_case(media_type))
}

/// Collect the parameters from the query string and a `multipart/form-data` body. Body parameters
/// take precedence, as with URL-encoded forms. Values that aren’t valid UTF-8 are decoded lossily.
#[doc(hidden)]
async fn parse_multipart(query: String, form: warp::multipart::FormData)
	-> Result<WebmentionParameters, crate::Error>
{
	use futures::TryStreamExt as _;
	use warp::Buf as _;

	let mut parameters = WebmentionParameters::default();
	parameters.extend(url::form_urlencoded::parse(query.as_bytes()));

	let mut form = Box::pin(form);

	while let Some(part) = form.try_next().await.map_err(crate::Error::DecodeMultipartBody)?
	{
		let name = part.name().to_owned();

		let value = part.stream()
			.try_fold(Vec::new(), |mut value, mut chunk| async move
			{
				while chunk.has_remaining()
				{
					let bytes = chunk.chunk();
					let length = bytes.len();
					value.extend_from_slice(bytes);
					chunk.advance(length);
				}

				Ok(value)
			})
			.await
			.map_err(crate::Error::DecodeMultipartBody)?;

		parameters.set(&name, String::from_utf8_lossy(&value).into_owned());
	}

	Ok(parameters)
}

/// [warp] filter extracting the webmention parameters from the query string and the request body.
/// Requests with bodies larger than [MAX_BODY_SIZE] are rejected with
/// [crate::Error::PayloadTooLarge]. The parameters aren’t validated yet, so that the request
/// handler decides how to respond to missing ones.
pub fn with_webmention_parameters()
	-> impl warp::Filter<Extract = (WebmentionParameters,), Error = warp::Rejection> + Clone
{
	use warp::Filter as _;

	// A missing query string just means there are no query parameters
	let query = warp::query::raw().or(warp::any().map(String::new)).unify();

	let multipart_parameters =
		// Only take this branch for multipart bodies, so that other bodies are left for the next
		warp::header::optional::<String>("content-type")
		.and_then(|content_type: Option<String>| async move
		{
			match content_type.as_deref()
				.map_or(false, |content_type| has_media_type(content_type, MULTIPART_MEDIA_TYPE))
			{
				true => Ok(()),
				false => Err(warp::reject::not_found()),
			}
		})
		.untuple_one()
		.and(query.clone())
		.and(warp::multipart::form().max_length(MAX_BODY_SIZE))
		.and_then(|query: String, form: warp::multipart::FormData| async move
		{
			parse_multipart(query, form).await.map_err(warp::reject::custom)
		});

	let form_parameters = query
		.and(warp::header::optional::<String>("content-type"))
		.and(warp::body::bytes())
		.and_then(
			|query: String, content_type: Option<String>, body: warp::hyper::body::Bytes|
			async move
			{
				// Chunked bodies don’t declare their size, so check it again after reading
				if body.len() as u64 > MAX_BODY_SIZE
				{
					return Err(warp::reject::custom(crate::Error::PayloadTooLarge));
				}

				Ok(WebmentionParameters::parse(&query, content_type.as_deref(), &body))
			});

	warp::any()
		// Reject oversized payloads before reading them if their size is declared upfront
		.and(warp::header::optional::<u64>("content-length"))
		.and_then(|content_length: Option<u64>| async move
		{
			match content_length
			{
				Some(content_length) if content_length > MAX_BODY_SIZE =>
					Err(warp::reject::custom(crate::Error::PayloadTooLarge)),
				_ => Ok(()),
			}
		})
		.untuple_one()
		.and(multipart_parameters.or(form_parameters).unify())
}
