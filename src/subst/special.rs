//! Translation of special files (symlinks).
//!
//! The canonical form of a symlink is the literal byte sequence
//! `link <target>` with no trailing newline. Platforms without symlink
//! support fall back to keeping that literal form in a regular file.

use std::io::Write;
use std::path::Path;

use crate::{Error, Result};

/// First bytes of the canonical form of a symlink.
pub const SPECIAL_LINK_PREFIX: &[u8] = b"link ";

/// Produces the canonical form of the special file at `path`.
///
/// A symlink canonicalises to `link <target>`; a regular file already holds
/// the literal form and is returned as-is.
pub fn canonicalise_special(path: &Path) -> Result<Vec<u8>> {
    let meta = std::fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() {
        let target = std::fs::read_link(path)?;
        let mut out = Vec::from(SPECIAL_LINK_PREFIX);
        out.extend_from_slice(target.to_string_lossy().as_bytes());
        Ok(out)
    } else {
        Ok(std::fs::read(path)?)
    }
}

/// Materialises the canonical form `canonical` as a special file at `dst`.
///
/// The result appears atomically: the link (or fallback file) is created
/// under a temporary name in the destination directory and renamed into
/// place.
pub fn materialise_special(canonical: &[u8], dst: &Path) -> Result<()> {
    let dir = dst.parent().unwrap_or_else(|| Path::new("."));

    if let Some(target) = link_target(canonical) {
        #[cfg(unix)]
        {
            let tmp = tmp_name(dir);
            std::os::unix::fs::symlink(Path::new(&target), &tmp)?;
            if let Err(err) = std::fs::rename(&tmp, dst) {
                let _ = std::fs::remove_file(&tmp);
                return Err(err.into());
            }
            return Ok(());
        }
    }

    // No symlink support, or not a link form: keep the literal bytes.
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(canonical)?;
    tmp.persist(dst).map_err(|err| Error::Io(err.error))?;
    Ok(())
}

/// The link target of a canonical special form, if it is the link form.
fn link_target(canonical: &[u8]) -> Option<String> {
    let rest = canonical.strip_prefix(SPECIAL_LINK_PREFIX)?;
    String::from_utf8(rest.to_vec()).ok()
}

#[cfg(unix)]
fn tmp_name(dir: &Path) -> std::path::PathBuf {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    dir.join(format!(".link.{}.{nonce}.tmp", std::process::id()))
}
