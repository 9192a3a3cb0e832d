use crate::api::{parse_document, XtJson};
use crate::config::SafetyConfig;
use crate::error::{RemoteFetchError, Result, XtJsonError};
use crate::serialization::Value;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Retrieves the raw text behind a `~"uri"` reference.
///
/// Timeouts, retries and transport are the implementor's business; a hung
/// fetch hangs the parse that is waiting on it.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, std::result::Result<String, RemoteFetchError>>;
}

/// Reads `file://` URIs and plain paths, relative to `base_dir`.
///
/// Reads are blocking `std::fs` calls made inside the returned future, so this
/// fetcher is meant for local files and tests. On a shared async runtime the
/// read stalls the executor thread; supply a non-blocking [`Fetcher`] there.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    base_dir: PathBuf,
}

impl FileFetcher {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn path_for(&self, uri: &str) -> std::result::Result<PathBuf, RemoteFetchError> {
        let path = match uri.split_once("://") {
            Some(("file", path)) => path,
            Some((scheme, _)) => {
                return Err(RemoteFetchError::new(
                    uri,
                    format!("unsupported scheme `{scheme}`"),
                ))
            }
            None => uri,
        };
        Ok(self.base_dir.join(path))
    }
}

impl Fetcher for FileFetcher {
    fn fetch<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, std::result::Result<String, RemoteFetchError>> {
        async move {
            let path = self.path_for(uri)?;
            std::fs::read_to_string(&path).map_err(|err| RemoteFetchError::new(uri, err))
        }
        .boxed()
    }
}

/// Serves documents from memory, keyed by their exact URI.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    documents: HashMap<String, String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, uri: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(uri, text);
        self
    }

    pub fn insert(&mut self, uri: impl Into<String>, text: impl Into<String>) {
        self.documents.insert(uri.into(), text.into());
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, std::result::Result<String, RemoteFetchError>> {
        let document = self
            .documents
            .get(uri)
            .cloned()
            .ok_or_else(|| RemoteFetchError::new(uri, "document not found"));
        futures::future::ready(document).boxed()
    }
}

/// Refuses every reference.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFetcher;

impl Fetcher for NoFetcher {
    fn fetch<'a>(&'a self, uri: &'a str) -> BoxFuture<'a, std::result::Result<String, RemoteFetchError>> {
        futures::future::ready(Err(RemoteFetchError::new(
            uri,
            "remote fetching is not available",
        )))
        .boxed()
    }
}

/// Resolves remote references for one document.
pub struct Resolver<'a> {
    session: &'a XtJson,
    // URIs currently being resolved, outermost first, to detect cycles
    chain: Vec<String>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(session: &'a XtJson, chain: Vec<String>) -> Self {
        Self { session, chain }
    }

    /// Fetches `uri` and parses it with the trust `safety` grants to remote
    /// content. Any failure, including one deep inside the fetched document,
    /// aborts the whole parse.
    pub async fn resolve(&self, uri: &str, safety: SafetyConfig) -> Result<Value> {
        if self.chain.iter().any(|seen| seen == uri) {
            let cycle = self
                .chain
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(uri))
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(XtJsonError::CircularReference { cycle });
        }

        let limit = self.session.options().max_remote_depth;
        if self.chain.len() >= limit {
            return Err(XtJsonError::RemoteDepthExceeded {
                uri: uri.to_string(),
                limit,
            });
        }

        log::debug!("fetching remote document `{uri}`");
        let text = self.session.fetcher().fetch(uri).await?;
        log::debug!("fetched {} bytes from `{uri}`", text.len());

        let mut chain = self.chain.clone();
        chain.push(uri.to_string());
        parse_document(self.session, text, safety.for_remote(), chain).await
    }
}
