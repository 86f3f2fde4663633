use std::io;
use std::path::{Path, PathBuf};

use weft_editor::{ContentsError, ContentsFuture, ContentsManager, ContentsModel};

/// Contents manager over a directory of the local file system. Paths are
/// `/`-separated and relative to the root.
pub struct FsContentsManager {
    root: PathBuf,
}

impl FsContentsManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(Path::new(path))
    }

    fn io_error(path: &str, source: io::Error) -> ContentsError {
        match source.kind() {
            io::ErrorKind::NotFound => ContentsError::NotFound(path.to_string()),
            _ => ContentsError::Io {
                path: path.to_string(),
                source,
            },
        }
    }

    fn read(&self, path: &str) -> Result<ContentsModel, ContentsError> {
        let content =
            std::fs::read_to_string(self.resolve(path)).map_err(|err| Self::io_error(path, err))?;
        Ok(ContentsModel::new(path, content))
    }

    fn write(&self, path: &str, content: &str) -> Result<ContentsModel, ContentsError> {
        std::fs::write(self.resolve(path), content).map_err(|err| Self::io_error(path, err))?;
        Ok(ContentsModel::new(path, content))
    }

    fn move_file(&self, old_path: &str, new_path: &str) -> Result<ContentsModel, ContentsError> {
        let target = self.resolve(new_path);
        if target.exists() {
            return Err(ContentsError::AlreadyExists(new_path.to_string()));
        }
        std::fs::rename(self.resolve(old_path), &target)
            .map_err(|err| Self::io_error(old_path, err))?;
        self.read(new_path)
    }
}

impl ContentsManager for FsContentsManager {
    fn get(&self, path: &str) -> ContentsFuture {
        log::debug!("reading {}", path);
        Box::pin(std::future::ready(self.read(path)))
    }

    fn save(&self, path: &str, content: &str) -> ContentsFuture {
        log::debug!("writing {} bytes to {}", content.len(), path);
        Box::pin(std::future::ready(self.write(path, content)))
    }

    fn rename(&self, old_path: &str, new_path: &str) -> ContentsFuture {
        log::debug!("renaming {} to {}", old_path, new_path);
        Box::pin(std::future::ready(self.move_file(old_path, new_path)))
    }
}
