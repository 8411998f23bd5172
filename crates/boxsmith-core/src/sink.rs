// ── Sink ──
//
// Hands a compiled document to its consumer: inline in the response, or
// uploaded to object storage with a URL in its place. The document is
// already valid by the time it arrives here.

use std::future::Future;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info};

use crate::compile::Compiled;
use crate::config::{DeliveryMethod, ObjectStoreConfig};
use crate::error::SinkError;

/// Key prefix for uploaded profiles.
pub const PROFILE_PREFIX: &str = "profiles";

pub const CONTENT_TYPE: &str = "application/json";

/// What the caller receives after delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method")]
pub enum Delivery {
    #[serde(rename = "direct")]
    Direct {
        content: String,
        #[serde(rename = "fileName")]
        file_name: String,
    },
    #[serde(rename = "oss")]
    ObjectStore {
        url: String,
        #[serde(rename = "fileName")]
        file_name: String,
    },
}

impl Delivery {
    pub fn file_name(&self) -> &str {
        match self {
            Self::Direct { file_name, .. } | Self::ObjectStore { file_name, .. } => file_name,
        }
    }
}

/// Write access to an object bucket.
pub trait ObjectStore: Send + Sync {
    fn put(
        &self,
        key: &str,
        body: &str,
        content_type: &str,
    ) -> impl Future<Output = io::Result<()>> + Send;
}

/// A bucket backed by a local directory; keys map to relative paths.
#[derive(Debug, Clone)]
pub struct DirectoryObjectStore {
    root: PathBuf,
}

impl DirectoryObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

impl ObjectStore for DirectoryObjectStore {
    async fn put(&self, key: &str, body: &str, content_type: &str) -> io::Result<()> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, body).await?;
        debug!(path = %path.display(), content_type, bytes = body.len(), "object written");
        Ok(())
    }
}

/// Return the document inline, named after the profile.
pub fn direct(compiled: &Compiled) -> Delivery {
    Delivery::Direct {
        content: compiled.to_json().to_owned(),
        file_name: compiled.file_name(),
    }
}

/// Upload the document and return where it can be fetched.
///
/// Without a public domain the URL field carries a note naming the key.
pub async fn upload<O: ObjectStore>(
    compiled: &Compiled,
    store: &O,
    public_domain: Option<&str>,
) -> Result<Delivery, SinkError> {
    let file_name = object_file_name(compiled);
    let key = format!("{PROFILE_PREFIX}/{file_name}");

    store
        .put(&key, compiled.to_json(), CONTENT_TYPE)
        .await
        .map_err(|source| SinkError::Upload {
            key: key.clone(),
            source,
        })?;

    let url = match public_domain.filter(|d| !d.is_empty()) {
        Some(domain) => format!("https://{domain}/{key}"),
        None => format!("Object uploaded as {key}"),
    };
    info!(profile = %compiled.profile, %key, "profile uploaded");
    Ok(Delivery::ObjectStore { url, file_name })
}

/// Deliver by the configured method.
pub async fn deliver(
    compiled: &Compiled,
    method: DeliveryMethod,
    config: &ObjectStoreConfig,
) -> Result<Delivery, SinkError> {
    match method {
        DeliveryMethod::Direct => Ok(direct(compiled)),
        DeliveryMethod::ObjectStore => {
            let root = config.root.as_ref().ok_or(SinkError::NotConfigured)?;
            let store = DirectoryObjectStore::new(root);
            upload(compiled, &store, config.public_domain.as_deref()).await
        }
    }
}

/// `<id>-<name>.json` with every non-alphanumeric name character as `-`.
pub fn object_file_name(compiled: &Compiled) -> String {
    let name: String = compiled
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("{}-{name}.json", compiled.profile)
}
