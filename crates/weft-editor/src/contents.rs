use std::future::Future;
use std::pin::Pin;

/// A file as seen by a [`ContentsManager`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContentsModel {
    pub path: String,
    pub name: String,
    pub content: String,
}

impl ContentsModel {
    /// A model whose name is the last segment of `path`.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: base_name(&path).to_string(),
            path,
            content: content.into(),
        }
    }
}

/// The last `/`-separated segment of `path`.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Everything up to and including the last `/` of `path`.
pub fn dir_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[..=index],
        None => "",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContentsError {
    #[error("no file at {0}")]
    NotFound(String),
    #[error("a file already exists at {0}")]
    AlreadyExists(String),
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ContentsResult = Result<ContentsModel, ContentsError>;

pub type ContentsFuture = Pin<Box<dyn Future<Output = ContentsResult>>>;

/// Loads, stores and renames files.
pub trait ContentsManager {
    fn get(&self, path: &str) -> ContentsFuture;

    fn save(&self, path: &str, content: &str) -> ContentsFuture;

    fn rename(&self, old_path: &str, new_path: &str) -> ContentsFuture;
}
