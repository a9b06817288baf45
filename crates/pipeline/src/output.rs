//! Local persistence of downloaded images.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Write `bytes` to `output_dir/filename`, creating the directory if it
/// does not exist and overwriting any existing file of the same name.
///
/// `filename` comes from the server and must be a single plain path
/// component; anything else is rejected with [`io::ErrorKind::InvalidInput`].
pub async fn save_image(output_dir: &Path, filename: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    validate_filename(filename)?;

    tokio::fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(filename);
    tokio::fs::write(&path, bytes).await?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "Image written");
    Ok(path)
}

fn validate_filename(filename: &str) -> io::Result<()> {
    let mut components = Path::new(filename).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to write image with unsafe filename '{filename}'"),
        )),
    }
}
