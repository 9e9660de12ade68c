//! Schema document loading.
//!
//! Loaders map a fragment-free document URI to its parsed JSON. The engine
//! asks at most once per document and navigates fragments itself, so loaders
//! never see a JSON Pointer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};

/// Source of schema documents.
pub trait SchemaLoader {
    /// Load the document at `uri`, or `Ok(None)` if this loader does not know it.
    fn load(&self, uri: &Url) -> Result<Option<Value>>;
}

/// Documents registered up front, keyed by URI.
#[derive(Debug, Default)]
pub struct PreloadedLoader {
    documents: HashMap<Url, Value>,
}

impl PreloadedLoader {
    /// Register `document` as the content of `uri`. Any fragment is ignored.
    pub fn preload(&mut self, uri: &Url, document: Value) {
        let mut uri = uri.clone();
        uri.set_fragment(None);
        self.documents.insert(uri, document);
    }

    /// Read a schema file and register it under `uri`.
    pub fn preload_file(&mut self, uri: &Url, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let document: Value = serde_json::from_str(&content)?;
        tracing::info!("{uri}: loading from {}", path.display());
        self.preload(uri, document);
        Ok(())
    }
}

impl SchemaLoader for PreloadedLoader {
    fn load(&self, uri: &Url) -> Result<Option<Value>> {
        Ok(self.documents.get(uri).cloned())
    }
}

/// Serves every URI below `root` from the matching file below `base_dir`.
///
/// `file:` URIs are read directly.
#[derive(Debug)]
pub struct DirectoryLoader {
    root: Url,
    base_dir: PathBuf,
}

impl DirectoryLoader {
    pub fn new(root: Url, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            root,
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, uri: &Url) -> Option<PathBuf> {
        if let Some(relative) = uri.as_str().strip_prefix(self.root.as_str()) {
            let relative = percent_encoding::percent_decode_str(relative)
                .decode_utf8_lossy()
                .into_owned();
            return Some(self.base_dir.join(relative));
        }
        if uri.scheme() == "file" {
            return uri.to_file_path().ok();
        }
        None
    }
}

impl SchemaLoader for DirectoryLoader {
    fn load(&self, uri: &Url) -> Result<Option<Value>> {
        let Some(path) = self.path_for(uri) else {
            return Ok(None);
        };
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::Read { path, source: e }),
        };
        tracing::debug!("{uri}: reading {}", path.display());
        Ok(Some(serde_json::from_str(&content)?))
    }
}

/// Fetches `http`/`https` documents over the network.
#[cfg(feature = "download")]
pub struct HttpLoader {
    runtime: tokio::runtime::Runtime,
}

#[cfg(feature = "download")]
impl HttpLoader {
    pub fn new() -> Result<Self> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| Error::Download(format!("starting runtime: {e}")))?;
        Ok(Self { runtime })
    }

    async fn fetch(uri: &Url) -> Result<Value> {
        let response = reqwest::get(uri.as_str())
            .await
            .map_err(|e| Error::Download(format!("GET {uri}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Download(format!(
                "GET {uri} returned {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Download(format!("reading response body: {e}")))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(feature = "download")]
impl SchemaLoader for HttpLoader {
    fn load(&self, uri: &Url) -> Result<Option<Value>> {
        if !matches!(uri.scheme(), "http" | "https") {
            return Ok(None);
        }
        tracing::info!("{uri}: downloading");
        self.runtime.block_on(Self::fetch(uri)).map(Some)
    }
}

/// Tries each loader in order until one knows the document.
#[derive(Default)]
pub struct LoaderChain {
    loaders: Vec<Box<dyn SchemaLoader>>,
}

impl LoaderChain {
    pub fn with(mut self, loader: impl SchemaLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }
}

impl SchemaLoader for LoaderChain {
    fn load(&self, uri: &Url) -> Result<Option<Value>> {
        for loader in &self.loaders {
            if let Some(document) = loader.load(uri)? {
                return Ok(Some(document));
            }
        }
        Ok(None)
    }
}

/// The URI a schema file is known by: its path relative to `base_dir`,
/// resolved against `root`.
pub fn schema_file_uri(root: &Url, base_dir: &Path, file: &Path) -> Result<Url> {
    let base_dir = std::path::absolute(base_dir).map_err(|e| Error::Read {
        path: base_dir.to_path_buf(),
        source: e,
    })?;
    let file_abs = std::path::absolute(file).map_err(|e| Error::Read {
        path: file.to_path_buf(),
        source: e,
    })?;
    let relative = file_abs.strip_prefix(&base_dir).map_err(|_| {
        Error::Config(format!(
            "schema file {} is not below base directory {}",
            file.display(),
            base_dir.display()
        ))
    })?;
    let relative: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let relative = relative.join("/");
    root.join(&relative).map_err(|source| Error::InvalidUri {
        uri: relative,
        source,
    })
}
