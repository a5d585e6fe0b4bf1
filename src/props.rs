//! Property storage: an opaque name/value map per versioned item.
//!
//! Values are raw bytes. The few property names the pipeline itself
//! interprets (`eol-style`, `keywords`, `special`, `externals`) are
//! exported as constants; everything else passes through untouched.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::admin::AdminArea;
use crate::subst::EolStyle;
use crate::{Error, Result};

/// Line-terminator style of a file's working form.
pub const PROP_EOL_STYLE: &str = "eol-style";
/// Keywords expanded in a file's working form.
pub const PROP_KEYWORDS: &str = "keywords";
/// Marks a file as special (symlink-like).
pub const PROP_SPECIAL: &str = "special";
/// External references attached to a directory.
pub const PROP_EXTERNALS: &str = "externals";

const PROPS_FORMAT: u8 = 1;

/// The properties of one versioned item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    map: BTreeMap<String, Vec<u8>>,
}

impl PropertySet {
    pub fn new() -> PropertySet {
        PropertySet::default()
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.map.get(name).map(Vec::as_slice)
    }

    /// The value as UTF-8 text, if the property is set and decodes.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.map.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.map.remove(name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// The `eol-style` of the item. Unrecognised values count as no
    /// translation.
    pub fn eol_style(&self) -> EolStyle {
        match self.get_str(PROP_EOL_STYLE) {
            None => EolStyle::None,
            Some(value) => EolStyle::parse(value).unwrap_or_else(|| {
                tracing::warn!(value, "unrecognised eol-style value");
                EolStyle::None
            }),
        }
    }

    /// The raw `keywords` property value.
    pub fn keywords_value(&self) -> Option<&str> {
        self.get_str(PROP_KEYWORDS)
    }

    /// True when the item is special (symlink-like). Presence of the
    /// property is what matters, not its value.
    pub fn special(&self) -> bool {
        self.get(PROP_SPECIAL).is_some()
    }

    /// Decodes a property set.
    pub fn read(src: &mut impl Read) -> Result<PropertySet> {
        let format = src.read_u8().map_err(|_| Error::Codec("property file"))?;
        if format > PROPS_FORMAT {
            return Err(Error::UnsupportedFormat {
                found: format,
                supported: PROPS_FORMAT,
            });
        }
        let count = src
            .read_u32::<BigEndian>()
            .map_err(|_| Error::Codec("property count"))?;
        let mut map = BTreeMap::new();
        for _ in 0..count {
            let name = read_blob(src, "property name")?;
            let name = String::from_utf8(name).map_err(|_| Error::Codec("property name"))?;
            let value = read_blob(src, "property value")?;
            map.insert(name, value);
        }
        Ok(PropertySet { map })
    }

    /// Encodes the property set.
    pub fn write(&self, dst: &mut dyn Write) -> Result<()> {
        dst.write_u8(PROPS_FORMAT)?;
        dst.write_u32::<BigEndian>(self.map.len() as u32)?;
        for (name, value) in &self.map {
            write_blob(dst, name.as_bytes())?;
            write_blob(dst, value)?;
        }
        Ok(())
    }

    /// Loads the property set of `name` in `area`; a missing file is an
    /// empty set. The empty name addresses the directory's own properties.
    pub fn load(area: &AdminArea, name: &str) -> Result<PropertySet> {
        match std::fs::File::open(area.props_path(name)) {
            Ok(mut file) => PropertySet::read(&mut file),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(PropertySet::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Stores the property set of `name` in `area` atomically.
    pub fn store(&self, area: &AdminArea, name: &str) -> Result<()> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        area.write_atomic(&area.props_path(name), &buf)
    }
}

fn read_blob(src: &mut impl Read, what: &'static str) -> Result<Vec<u8>> {
    let len = src.read_u32::<BigEndian>().map_err(|_| Error::Codec(what))?;
    let mut buf = vec![0u8; len as usize];
    src.read_exact(&mut buf).map_err(|_| Error::Codec(what))?;
    Ok(buf)
}

fn write_blob(dst: &mut dyn Write, blob: &[u8]) -> Result<()> {
    dst.write_u32::<BigEndian>(blob.len() as u32)?;
    dst.write_all(blob)?;
    Ok(())
}
