//! Generic EOL and keyword substitution between repository and working form.
//!
//! Repository form is canonical: LF-only terminators and contracted
//! keywords (`$Rev$`). Working form is what lands on disk: the configured
//! terminator and expanded keywords (`$Rev: 1729 $`). A [`Translation`]
//! names the direction and options; [`translate_stream`] applies it as a
//! byte-stream filter that never buffers more than one chunk plus a small
//! residue (a partial `\r\n` pair and a partial keyword).

mod keyword;
mod special;

#[cfg(test)]
mod tests;

use std::io::{Read, Write};
use std::path::Path;

use crate::{Error, Result};

pub use special::{canonicalise_special, materialise_special, SPECIAL_LINK_PREFIX};

/// Maximum byte length of a recognised keyword occurrence, both dollar
/// signs included. Candidates growing past this are passed through verbatim.
pub const KEYWORD_MAX_LEN: usize = 255;

/// Translation reads the source in chunks of this size.
const CHUNK_SIZE: usize = 4096;

/// A fixed line terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetEol {
    Lf,
    Cr,
    Crlf,
}

impl TargetEol {
    /// The terminator byte sequence.
    pub fn bytes(self) -> &'static [u8] {
        match self {
            TargetEol::Lf => b"\n",
            TargetEol::Cr => b"\r",
            TargetEol::Crlf => b"\r\n",
        }
    }

    /// The platform's canonical terminator.
    pub fn platform() -> TargetEol {
        if cfg!(windows) {
            TargetEol::Crlf
        } else {
            TargetEol::Lf
        }
    }
}

/// The value of the `eol-style` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EolStyle {
    /// No EOL translation in either direction.
    #[default]
    None,
    /// Working form uses the platform terminator.
    Native,
    /// Working form uses the named terminator on every platform.
    Fixed(TargetEol),
}

impl EolStyle {
    /// Parses a property value. Returns `None` for unrecognised values.
    pub fn parse(value: &str) -> Option<EolStyle> {
        match value {
            "native" => Some(EolStyle::Native),
            "LF" => Some(EolStyle::Fixed(TargetEol::Lf)),
            "CR" => Some(EolStyle::Fixed(TargetEol::Cr)),
            "CRLF" => Some(EolStyle::Fixed(TargetEol::Crlf)),
            _ => None,
        }
    }

    /// The terminator written when materialising under this style.
    pub fn working_eol(self, native: TargetEol) -> Option<TargetEol> {
        match self {
            EolStyle::None => None,
            EolStyle::Native => Some(native),
            EolStyle::Fixed(eol) => Some(eol),
        }
    }
}

/// Expansion values for the recognised keywords. A present field enables
/// the keyword; an absent one leaves its occurrences untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keywords {
    pub revision: Option<String>,
    pub date: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub id: Option<String>,
}

impl Keywords {
    /// True when no keyword is enabled.
    pub fn is_empty(&self) -> bool {
        self.revision.is_none()
            && self.date.is_none()
            && self.author.is_none()
            && self.url.is_none()
            && self.id.is_none()
    }

    /// Builds the tuple from a `keywords` property value: a whitespace
    /// separated list of keyword names or their aliases. Values for names
    /// absent from the list stay disabled.
    pub fn build(
        property: &str,
        rev: Option<&str>,
        url: Option<&str>,
        date: Option<&str>,
        author: Option<&str>,
    ) -> Keywords {
        let mut kw = Keywords::default();
        for token in property.split_whitespace() {
            match token {
                "LastChangedRevision" | "Revision" | "Rev" => {
                    kw.revision = Some(rev.unwrap_or("").to_string());
                }
                "LastChangedDate" | "Date" => {
                    kw.date = Some(date.unwrap_or("").to_string());
                }
                "LastChangedBy" | "Author" => {
                    kw.author = Some(author.unwrap_or("").to_string());
                }
                "HeadURL" | "URL" => {
                    kw.url = Some(url.unwrap_or("").to_string());
                }
                "Id" => {
                    let base = url
                        .and_then(|u| u.rsplit('/').next())
                        .unwrap_or("");
                    kw.id = Some(format!(
                        "{} {} {} {}",
                        base,
                        rev.unwrap_or(""),
                        date.unwrap_or(""),
                        author.unwrap_or("")
                    ));
                }
                _ => {}
            }
        }
        kw
    }
}

/// Direction and options of one translation.
#[derive(Debug, Clone, Default)]
pub struct Translation {
    /// Rewrite every terminator to this sequence. `None` leaves
    /// terminators alone (and skips the consistency check entirely).
    pub eol: Option<TargetEol>,
    /// Accept mixed terminators in the source instead of failing with
    /// [`Error::InconsistentEol`].
    pub repair: bool,
    /// The enabled keywords and their expansion values.
    pub keywords: Keywords,
    /// Direction: true materialises (expand keywords), false canonicalises
    /// (contract them).
    pub expand: bool,
}

impl Translation {
    /// Working form to repository form: LF terminators, contracted keywords.
    pub fn canonicalise(keywords: Keywords, repair: bool) -> Translation {
        Translation {
            eol: Some(TargetEol::Lf),
            repair,
            keywords,
            expand: false,
        }
    }

    /// Repository form to working form. Repository form is LF-only by
    /// invariant, so no repair is requested; mixed terminators in the
    /// source surface as [`Error::InconsistentEol`].
    pub fn materialise(eol: Option<TargetEol>, keywords: Keywords) -> Translation {
        Translation {
            eol,
            repair: false,
            keywords,
            expand: true,
        }
    }

    /// True when the translation would copy the input unchanged.
    pub fn is_noop(&self) -> bool {
        self.eol.is_none() && self.keywords.is_empty()
    }
}

/// Translates `src` into `dst` according to `translation`.
///
/// Output bytes appear in input order; the filter holds at most one pending
/// `\r` and one partial keyword between reads.
pub fn translate_stream(
    src: &mut impl Read,
    dst: &mut dyn Write,
    translation: &Translation,
) -> Result<()> {
    if translation.is_noop() {
        std::io::copy(src, dst)?;
        return Ok(());
    }

    let eol = translation.eol.map(TargetEol::bytes);
    let mut buf = [0u8; CHUNK_SIZE];

    // Pending partial terminator (at most a lone '\r').
    let mut newline_buf = [0u8; 2];
    let mut newline_off = 0usize;
    // Pending keyword candidate, opening '$' included.
    let mut keyword_buf = [0u8; KEYWORD_MAX_LEN];
    let mut keyword_off = 0usize;
    // First terminator seen, for the consistency check.
    let mut src_format = [0u8; 2];
    let mut src_format_len = 0usize;

    loop {
        let readlen = src.read(&mut buf)?;
        if readlen == 0 {
            break;
        }

        let chunk = &buf[..readlen];
        let mut p = 0usize;
        while p < chunk.len() {
            // Leave the interesting state, if we are in one.
            if newline_off > 0 {
                if chunk[p] == b'\n' {
                    newline_buf[newline_off] = chunk[p];
                    newline_off += 1;
                    p += 1;
                }
                translate_newline(
                    eol,
                    &mut src_format,
                    &mut src_format_len,
                    &newline_buf[..newline_off],
                    dst,
                    translation.repair,
                )?;
                newline_off = 0;
            } else if keyword_off > 0 && chunk[p] == b'$' {
                // A candidate ends; if it is no recognised keyword, the
                // closing '$' may open the next candidate instead.
                keyword_buf[keyword_off] = b'$';
                keyword_off += 1;
                if keyword::translate(
                    &mut keyword_buf,
                    &mut keyword_off,
                    translation.expand,
                    &translation.keywords,
                ) {
                    p += 1;
                } else {
                    keyword_off -= 1;
                }
                dst.write_all(&keyword_buf[..keyword_off])?;
                keyword_off = 0;
            } else if keyword_off == KEYWORD_MAX_LEN - 1
                || (keyword_off > 0 && (chunk[p] == b'\r' || chunk[p] == b'\n'))
            {
                // No closing '$' in reach; flush the candidate verbatim.
                dst.write_all(&keyword_buf[..keyword_off])?;
                keyword_off = 0;
            } else if keyword_off > 0 {
                keyword_buf[keyword_off] = chunk[p];
                keyword_off += 1;
                p += 1;
                continue;
            }

            // Boring state: copy a run of uninteresting bytes at once.
            let run = chunk[p..]
                .iter()
                .position(|&b| {
                    b == b'$' && !translation.keywords.is_empty()
                        || (b == b'\r' || b == b'\n') && eol.is_some()
                })
                .unwrap_or(chunk.len() - p);
            if run > 0 {
                dst.write_all(&chunk[p..p + run])?;
                p += run;
            }

            // Enter the state the interesting byte calls for.
            match chunk.get(p) {
                Some(b'$') if !translation.keywords.is_empty() => {
                    keyword_buf[keyword_off] = b'$';
                    keyword_off += 1;
                    p += 1;
                }
                Some(b'\r') if eol.is_some() => {
                    newline_buf[newline_off] = b'\r';
                    newline_off += 1;
                    p += 1;
                }
                Some(b'\n') if eol.is_some() => {
                    newline_buf[newline_off] = b'\n';
                    newline_off += 1;
                    p += 1;
                    translate_newline(
                        eol,
                        &mut src_format,
                        &mut src_format_len,
                        &newline_buf[..newline_off],
                        dst,
                        translation.repair,
                    )?;
                    newline_off = 0;
                }
                _ => {}
            }
        }
    }

    // Flush residue at EOF: a lone '\r' is still a terminator, a dangling
    // candidate is plain text.
    if newline_off > 0 {
        translate_newline(
            eol,
            &mut src_format,
            &mut src_format_len,
            &newline_buf[..newline_off],
            dst,
            translation.repair,
        )?;
    }
    if keyword_off > 0 {
        dst.write_all(&keyword_buf[..keyword_off])?;
    }

    Ok(())
}

/// Translates a byte string in memory.
pub fn translate_bytes(src: &[u8], translation: &Translation) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(src.len());
    let mut cursor = src;
    translate_stream(&mut cursor, &mut out, translation)?;
    Ok(out)
}

/// Copies `src` to `dst` through the translation. The destination appears
/// atomically: output goes to a temporary in the destination's directory
/// and is renamed into place only once translation succeeded.
pub fn translate_file(src: &Path, dst: &Path, translation: &Translation) -> Result<()> {
    let dir = dst.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut reader = std::fs::File::open(src)?;
        translate_stream(&mut reader, tmp.as_file_mut(), translation)
            .map_err(|err| err.wrap(format!("while translating '{}'", src.display())))?;
        tmp.as_file_mut().flush()?;
    }
    tmp.persist(dst).map_err(|err| Error::Io(err.error))?;
    Ok(())
}

/// Checks one source terminator against the first one seen and writes the
/// requested target terminator.
fn translate_newline(
    eol: Option<&'static [u8]>,
    src_format: &mut [u8; 2],
    src_format_len: &mut usize,
    newline: &[u8],
    dst: &mut dyn Write,
    repair: bool,
) -> Result<()> {
    let eol = eol.expect("newline state requires an eol target");
    if *src_format_len > 0 {
        if !repair && &src_format[..*src_format_len] != newline {
            return Err(Error::InconsistentEol);
        }
    } else {
        src_format[..newline.len()].copy_from_slice(newline);
        *src_format_len = newline.len();
    }
    dst.write_all(eol)?;
    Ok(())
}
