use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tracing::trace;

use super::{ArtifactId, ArtifactStore};

/// Keeps every artifact as one file in a work directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub async fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the artifact's file.
    pub fn path_for(&self, id: &ArtifactId) -> PathBuf {
        self.root.join(file_name(id))
    }
}

// Unit identifiers may be paths; escape separators (and the escape
// character itself) so every id lands in its own file directly under root.
fn file_name(id: &ArtifactId) -> String {
    let mut name = String::with_capacity(id.as_str().len());
    for c in id.as_str().chars() {
        match c {
            '%' => name.push_str("%25"),
            '/' => name.push_str("%2F"),
            '\\' => name.push_str("%5C"),
            c => name.push(c),
        }
    }
    name
}

#[async_trait]
impl ArtifactStore for FsStore {
    async fn put(&self, id: &ArtifactId, bytes: Bytes) -> io::Result<()> {
        let path = self.path_for(id);
        let root = self.root.clone();
        let prefix = format!(".{}.", file_name(id));
        let len = bytes.len();
        // Once started, the write and the rename finish even if the caller
        // stops waiting, so no temp file outlives an interrupted put.
        tokio::task::spawn_blocking(move || -> io::Result<()> {
            let mut tmp = tempfile::Builder::new()
                .prefix(&prefix)
                .suffix(".tmp")
                .tempfile_in(&root)?;
            tmp.write_all(&bytes)?;
            tmp.persist(&path).map_err(|err| err.error)?;
            Ok(())
        })
        .await??;
        trace!(artifact = %id, bytes = len, "artifact written");
        Ok(())
    }

    async fn append(&self, id: &ArtifactId, bytes: Bytes) -> io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path_for(id))
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await
    }

    async fn get(&self, id: &ArtifactId) -> io::Result<Bytes> {
        tokio::fs::read(self.path_for(id)).await.map(Bytes::from)
    }

    async fn remove(&self, id: &ArtifactId) -> io::Result<()> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn put_overwrites_and_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::create(dir.path().join("work")).await.unwrap();
        let id = ArtifactId::intermediate("in1");

        store.put(&id, Bytes::from_static(b"first version")).await.unwrap();
        store.put(&id, Bytes::from_static(b"v2")).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().as_ref(), b"v2");

        assert_eq!(entries(store.root()), ["inter_in1"]);
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn abandoned_put_still_lands_whole() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::create(dir.path()).await.unwrap();
        let id = ArtifactId::intermediate("in1");
        let payload = Bytes::from(vec![7u8; 1 << 20]);

        // A zero deadline polls the put once and then drops it.
        let _ = tokio::time::timeout(Duration::ZERO, store.put(&id, payload.clone())).await;

        let mut names = entries(store.root());
        for _ in 0..200 {
            if names == ["inter_in1"] {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
            names = entries(store.root());
        }
        assert_eq!(names, ["inter_in1"]);
        assert_eq!(store.get(&id).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn append_creates_then_extends() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::create(dir.path()).await.unwrap();
        let id = ArtifactId::output("in1");

        store.append(&id, Bytes::from_static(b"ab")).await.unwrap();
        store.append(&id, Bytes::from_static(b"cd")).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().as_ref(), b"abcd");
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::create(dir.path()).await.unwrap();
        let id = ArtifactId::output("in1");

        store.remove(&id).await.unwrap();
        store.put(&id, Bytes::from_static(b"x")).await.unwrap();
        store.remove(&id).await.unwrap();
        store.remove(&id).await.unwrap();
        assert_eq!(
            store.get(&id).await.unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn path_like_units_do_not_collide() {
        let store = FsStore {
            root: PathBuf::from("/work"),
        };
        let nested = store.path_for(&ArtifactId::intermediate("data/in1"));
        let flat = store.path_for(&ArtifactId::intermediate("data%2Fin1"));
        assert_ne!(nested, flat);
        assert_eq!(nested.parent(), Some(Path::new("/work")));
        assert_eq!(flat.parent(), Some(Path::new("/work")));
    }
}
