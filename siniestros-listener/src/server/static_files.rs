use std::path::{Component, Path, PathBuf};

use bytes::Bytes;

const INDEX: &str = "index.html";

/// Read-only file tree mounted under `/web`.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `rel` is the request path below the mount point, e.g. `js/app.js`.
    /// `None` means not found; traversal attempts are reported the same way.
    pub async fn load(&self, rel: &str) -> Option<(Bytes, &'static str)> {
        let mut path = self.resolve(rel)?;

        let meta = tokio::fs::metadata(&path).await.ok()?;
        if meta.is_dir() {
            path.push(INDEX);
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => Some((Bytes::from(bytes), content_type(&path))),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "static file read failed");
                None
            }
        }
    }

    fn resolve(&self, rel: &str) -> Option<PathBuf> {
        let mut out = self.root.clone();
        for comp in Path::new(rel.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(seg) => out.push(seg),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(out)
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|s| s.to_str()) {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}
