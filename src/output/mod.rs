use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs,
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

/// JSON layout of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStyle {
    Compact,
    /// Two-space indent plus a trailing newline.
    Pretty,
}

/// Serialize `value` to `path` atomically: write a dot-prefixed temp file
/// in the same directory, then rename it over the target.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T, style: JsonStyle) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("{} has no file name", path.display()))?;
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    {
        let tmp = fs::File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))?;
        let mut w = BufWriter::new(tmp);
        match style {
            JsonStyle::Compact => serde_json::to_writer(&mut w, value),
            JsonStyle::Pretty => serde_json::to_writer_pretty(&mut w, value),
        }
        .with_context(|| format!("serializing {}", file_name))?;
        if style == JsonStyle::Pretty {
            w.write_all(b"\n")?;
        }
        w.flush()
            .with_context(|| format!("flushing {}", tmp_path.display()))?;
    }

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} -> {}", tmp_path.display(), path.display()))?;
    info!(path = %path.display(), "wrote");
    Ok(())
}
