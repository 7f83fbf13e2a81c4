pub mod compose;
pub mod info;
pub mod replay;

use std::path::{Path, PathBuf};

use decal_render_engine::ExportArtifact;

/// Write an artifact to `output`, defaulting to the artifact's suggested
/// filename in the current directory.
pub(crate) fn write_artifact(
    artifact: &ExportArtifact,
    output: Option<PathBuf>,
) -> anyhow::Result<PathBuf> {
    let target = output.unwrap_or_else(|| Path::new(".").to_path_buf());
    let written = artifact
        .write_to(&target)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", target.display()))?;
    Ok(written)
}
