//! Saving returned charts to disk.

use std::path::PathBuf;

use anyhow::{bail, Context};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::info;

use titanic_common::AskResponse;

const PNG_SIGNATURE: &[u8] = b"\x89PNG\r\n\x1a\n";

/// Writes charts as `plot-001.png`, `plot-002.png`, ... in one directory,
/// skipping names that already exist.
#[derive(Debug)]
pub struct PlotSaver {
    dir: PathBuf,
    next: u32,
}

impl PlotSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), next: 1 }
    }

    pub fn save_base64(&mut self, encoded: &str) -> anyhow::Result<PathBuf> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .context("Chart is not valid base64")?;
        if !bytes.starts_with(PNG_SIGNATURE) {
            bail!("Chart is not a PNG image");
        }

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create {}", self.dir.display()))?;
        let path = loop {
            let candidate = self.dir.join(format!("plot-{:03}.png", self.next));
            self.next += 1;
            if !candidate.exists() {
                break candidate;
            }
        };
        std::fs::write(&path, &bytes)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        info!(path = %path.display(), bytes = bytes.len(), "Chart saved");
        Ok(path)
    }
}

/// The chart to keep from a response: only when the backend flagged one
/// as needed and actually attached it.
pub fn attached_chart(resp: &AskResponse) -> Option<&str> {
    resp.plot_base64.as_deref().filter(|_| resp.plot_needed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fake_png() -> String {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(b"rest of the image");
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_sequential_names() {
        let dir = tempfile::tempdir().unwrap();
        let mut saver = PlotSaver::new(dir.path().join("plots"));

        let first = saver.save_base64(&fake_png()).unwrap();
        let second = saver.save_base64(&fake_png()).unwrap();
        assert_eq!(first.file_name().unwrap(), "plot-001.png");
        assert_eq!(second.file_name().unwrap(), "plot-002.png");
        assert!(std::fs::read(&first).unwrap().starts_with(PNG_SIGNATURE));
    }

    #[test]
    fn test_existing_files_are_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("plot-001.png"), b"keep me").unwrap();
        let mut saver = PlotSaver::new(dir.path());

        let path = saver.save_base64(&fake_png()).unwrap();
        assert_eq!(path.file_name().unwrap(), "plot-002.png");
        assert_eq!(std::fs::read(dir.path().join("plot-001.png")).unwrap(), b"keep me");
    }

    #[test]
    fn test_rejects_non_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut saver = PlotSaver::new(dir.path());
        assert!(saver.save_base64("not base64!").is_err());
        let err = saver.save_base64(&STANDARD.encode(b"GIF89a")).unwrap_err();
        assert_eq!(err.to_string(), "Chart is not a PNG image");
    }

    #[test]
    fn test_chart_kept_only_when_needed() {
        let mut resp = AskResponse {
            text_answer: "Most passengers were in third class.".into(),
            plot_needed: true,
            plot_base64: Some(fake_png()),
        };
        assert_eq!(attached_chart(&resp), resp.plot_base64.as_deref());

        resp.plot_needed = false;
        assert_eq!(attached_chart(&resp), None);

        resp.plot_needed = true;
        resp.plot_base64 = None;
        assert_eq!(attached_chart(&resp), None);
    }
}
