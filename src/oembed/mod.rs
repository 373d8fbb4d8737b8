//! oEmbed metadata synchronization.
//!
//! Embed-backed content types keep a local cache of provider metadata.
//! This module owns the refresh cycle: build the provider request, fetch
//! the JSON document, and map the declared keys onto the item. Transport
//! failures fall back to the cached copy by default; contract failures
//! (a mapped key missing from the response) always propagate.

use chrono::Utc;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{ContentItem, EmbedFields};

pub mod mapping;
pub mod providers;

pub use mapping::{AssignError, FieldMapping};
pub use providers::Provider;

/// Errors raised while talking to a provider or mapping its response.
#[derive(Debug, Error)]
pub enum OembedError {
    #[error("resource '{resource}' does not match endpoint scheme '{scheme}'")]
    NoEndpoint { resource: String, scheme: String },

    #[error("request to {url} failed: {source}")]
    RemoteFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider at {url} returned HTTP {status}")]
    RemoteStatus { url: String, status: u16 },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("oEmbed response for {kind} is missing mapped key '{key}'")]
    MappingContract {
        kind: crate::domain::ContentKind,
        key: &'static str,
    },

    #[error("oEmbed response for {kind} carries a malformed value under '{key}'")]
    MalformedValue {
        kind: crate::domain::ContentKind,
        key: &'static str,
    },

    #[error("oEmbed mapping for {kind} names unknown local field '{field}'")]
    UnknownField {
        kind: crate::domain::ContentKind,
        field: &'static str,
    },
}

impl OembedError {
    /// Transport-level failures are recoverable: the caller keeps serving
    /// the cached copy. Everything else is a broken contract.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            OembedError::RemoteFetch { .. }
                | OembedError::RemoteStatus { .. }
                | OembedError::Decode { .. }
        )
    }
}

/// What to do when a provider cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Keep the cached field values and carry on (the default)
    #[default]
    StaleOnError,

    /// Propagate transport failures to the caller
    Strict,
}

/// A provider endpoint and the resource URL scheme it serves.
#[derive(Debug, Clone)]
pub struct OembedEndpoint {
    pub url: String,
    pub scheme: String,
}

impl OembedEndpoint {
    pub fn new(url: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            scheme: scheme.into(),
        }
    }

    /// Wildcard match of a resource URL against the endpoint scheme.
    ///
    /// `*` matches any run of characters; everything else is literal.
    pub fn matches(&self, resource: &str) -> bool {
        let mut rest = resource;
        let mut segments = self.scheme.split('*').peekable();

        // First segment anchors at the start
        if let Some(first) = segments.next() {
            if !rest.starts_with(first) {
                return false;
            }
            rest = &rest[first.len()..];
        }

        while let Some(segment) = segments.next() {
            if segment.is_empty() {
                // Trailing '*' swallows the remainder
                if segments.peek().is_none() {
                    return true;
                }
                continue;
            }
            match rest.find(segment) {
                Some(idx) => rest = &rest[idx + segment.len()..],
                None => return false,
            }
        }

        rest.is_empty()
    }
}

/// HTTP client for oEmbed endpoints.
///
/// Requests always ask for the JSON response format; configured maximum
/// dimensions are passed along so providers size their embeds to fit.
pub struct OembedClient {
    client: reqwest::Client,
    max_width: Option<u32>,
    max_height: Option<u32>,
}

impl Default for OembedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OembedClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            max_width: None,
            max_height: None,
        }
    }

    /// Cap the dimensions requested from providers
    pub fn with_max_dimensions(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    /// Fetch the provider's JSON document for one resource.
    pub async fn fetch(
        &self,
        endpoint: &OembedEndpoint,
        resource: &str,
        extra_params: &[(&str, String)],
    ) -> Result<Value, OembedError> {
        if !endpoint.matches(resource) {
            return Err(OembedError::NoEndpoint {
                resource: resource.to_string(),
                scheme: endpoint.scheme.clone(),
            });
        }

        let mut request = self
            .client
            .get(&endpoint.url)
            .query(&[("format", "json"), ("url", resource)]);

        if let Some(width) = self.max_width {
            request = request.query(&[("maxwidth", width.to_string())]);
        }
        if let Some(height) = self.max_height {
            request = request.query(&[("maxheight", height.to_string())]);
        }
        for (key, value) in extra_params {
            request = request.query(&[(*key, value.as_str())]);
        }

        debug!(url = %endpoint.url, %resource, "Fetching oEmbed metadata");

        let response = request.send().await.map_err(|e| OembedError::RemoteFetch {
            url: endpoint.url.clone(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(OembedError::RemoteStatus {
                url: endpoint.url.clone(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| OembedError::Decode {
            url: endpoint.url.clone(),
            source: e,
        })
    }
}

/// Contract for content types that cache provider metadata.
///
/// The mapping table and local field list are declarative; the provider
/// registry checks at startup that every mapped local name is one the
/// variant actually carries.
pub trait OembedItem: ContentItem {
    fn embed(&self) -> &EmbedFields;

    fn embed_mut(&mut self) -> &mut EmbedFields;

    /// The endpoint serving this variant
    fn endpoint(&self) -> OembedEndpoint;

    /// Remote-key to local-field table for this variant
    fn oembed_map() -> &'static [FieldMapping];

    /// Every local field name this variant can be assigned
    fn local_fields() -> &'static [&'static str];

    /// The remote resource this item mirrors
    fn resource(&self) -> String;

    /// Endpoint-specific request parameters
    fn endpoint_params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Transform hook applied to each value before assignment
    fn clean_value(&self, _local: &str, value: Value) -> Value {
        value
    }

    /// Assign one mapped value onto the item
    fn assign(&mut self, local: &str, value: &Value) -> Result<(), AssignError>;
}

/// Run one refresh cycle against the item's provider.
///
/// `date_updated` advances whether or not the provider answers, so an
/// unreachable provider is retried at most once per cache window instead
/// of on every load.
pub async fn refresh<T: OembedItem>(
    client: &OembedClient,
    item: &mut T,
    policy: FetchPolicy,
) -> Result<(), OembedError> {
    item.embed_mut().date_updated = Some(Utc::now());

    let endpoint = item.endpoint();
    let resource = item.resource();
    let params = item.endpoint_params();

    match client.fetch(&endpoint, &resource, &params).await {
        Ok(response) => mapping::apply(item, &response),
        Err(e) if e.is_transport() && policy == FetchPolicy::StaleOnError => {
            warn!(kind = %T::KIND, %resource, error = %e, "oEmbed fetch failed, serving cached metadata");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
