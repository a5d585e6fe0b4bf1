//! Binary encoding of an entries file.
//!
//! Big-endian, length-prefixed, one leading format byte. Optional fields
//! are a boolean discriminator followed by the value.

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use num_traits::{FromPrimitive, ToPrimitive};

use super::{EntriesMap, Entry, EntryFlags, Kind, Revnum, Schedule, Timestamp};
use crate::admin::FORMAT_VERSION;
use crate::{Error, Result};

pub(super) fn read_map(src: &mut impl Read) -> Result<EntriesMap> {
    let format = src.read_u8().map_err(|_| Error::Codec("entries format"))?;
    if format > FORMAT_VERSION {
        return Err(Error::UnsupportedFormat {
            found: format,
            supported: FORMAT_VERSION,
        });
    }
    let count = src
        .read_u32::<BigEndian>()
        .map_err(|_| Error::Codec("entries count"))?;
    let mut map = EntriesMap::new();
    for _ in 0..count {
        let entry = read_entry(src)?;
        map.insert(entry.name.clone(), entry);
    }
    Ok(map)
}

pub(super) fn write_map(dst: &mut dyn Write, map: &EntriesMap) -> Result<()> {
    dst.write_u8(FORMAT_VERSION)?;
    dst.write_u32::<BigEndian>(map.len() as u32)?;
    for entry in map.values() {
        write_entry(dst, entry)?;
    }
    Ok(())
}

fn read_entry(src: &mut impl Read) -> Result<Entry> {
    let name = string(src)?;
    let kind: Kind = variant(src, "entry kind")?;
    let schedule: Schedule = variant(src, "entry schedule")?;
    let entry = Entry {
        name,
        kind,
        schedule,
        revision: option(src, |s| u64(s))?,
        url: option(src, string)?,
        copied_from: option(src, |s| Ok((string(s)?, u64(s)?)))?,
        checksum: option(src, digest)?,
        text_time: option(src, time)?,
        prop_time: option(src, time)?,
        committed_rev: option(src, |s| u64(s))?,
        committed_date: option(src, time)?,
        committed_author: option(src, string)?,
        lock_token: option(src, string)?,
        conflict_old: option(src, string)?,
        conflict_new: option(src, string)?,
        conflict_working: option(src, string)?,
        prop_reject: option(src, string)?,
        flags: flags(src)?,
    };
    Ok(entry)
}

fn write_entry(dst: &mut dyn Write, entry: &Entry) -> Result<()> {
    write_string(dst, &entry.name)?;
    dst.write_u8(entry.kind.to_u8().expect("kind discriminant"))?;
    dst.write_u8(entry.schedule.to_u8().expect("schedule discriminant"))?;
    write_option(dst, entry.revision, |d, v| Ok(d.write_u64::<BigEndian>(v)?))?;
    write_option(dst, entry.url.as_deref(), |d, v| write_string(d, v))?;
    write_option(dst, entry.copied_from.as_ref(), |d, (url, rev)| {
        write_string(d, url)?;
        d.write_u64::<BigEndian>(*rev)?;
        Ok(())
    })?;
    write_option(dst, entry.checksum, |d, v| Ok(d.write_all(&v)?))?;
    write_option(dst, entry.text_time, write_time)?;
    write_option(dst, entry.prop_time, write_time)?;
    write_option(dst, entry.committed_rev, |d, v| Ok(d.write_u64::<BigEndian>(v)?))?;
    write_option(dst, entry.committed_date, write_time)?;
    write_option(dst, entry.committed_author.as_deref(), |d, v| write_string(d, v))?;
    write_option(dst, entry.lock_token.as_deref(), |d, v| write_string(d, v))?;
    write_option(dst, entry.conflict_old.as_deref(), |d, v| write_string(d, v))?;
    write_option(dst, entry.conflict_new.as_deref(), |d, v| write_string(d, v))?;
    write_option(dst, entry.conflict_working.as_deref(), |d, v| write_string(d, v))?;
    write_option(dst, entry.prop_reject.as_deref(), |d, v| write_string(d, v))?;
    dst.write_u8(entry.flags.bits())?;
    Ok(())
}

fn u64(src: &mut impl Read) -> Result<Revnum> {
    src.read_u64::<BigEndian>().map_err(|_| Error::Codec("entry number"))
}

fn string(src: &mut impl Read) -> Result<String> {
    let len = src
        .read_u32::<BigEndian>()
        .map_err(|_| Error::Codec("entry string"))?;
    let mut buf = vec![0u8; len as usize];
    src.read_exact(&mut buf).map_err(|_| Error::Codec("entry string"))?;
    String::from_utf8(buf).map_err(|_| Error::Codec("entry string"))
}

fn digest(src: &mut impl Read) -> Result<[u8; 16]> {
    let mut buf = [0u8; 16];
    src.read_exact(&mut buf).map_err(|_| Error::Codec("entry checksum"))?;
    Ok(buf)
}

fn time(src: &mut impl Read) -> Result<Timestamp> {
    let seconds = src
        .read_i64::<BigEndian>()
        .map_err(|_| Error::Codec("entry timestamp"))?;
    let nanos = src
        .read_u32::<BigEndian>()
        .map_err(|_| Error::Codec("entry timestamp"))?;
    Ok(Timestamp { seconds, nanos })
}

fn flags(src: &mut impl Read) -> Result<EntryFlags> {
    let bits = src.read_u8().map_err(|_| Error::Codec("entry flags"))?;
    EntryFlags::from_bits(bits).ok_or(Error::Codec("entry flags"))
}

fn option<T, S: Read>(
    src: &mut S,
    cont: impl FnOnce(&mut S) -> Result<T>,
) -> Result<Option<T>> {
    match src.read_u8().map_err(|_| Error::Codec("entry option"))? {
        0 => Ok(None),
        1 => Ok(Some(cont(src)?)),
        _ => Err(Error::Codec("entry option")),
    }
}

fn variant<T: FromPrimitive>(src: &mut impl Read, what: &'static str) -> Result<T> {
    let raw = src.read_u8().map_err(|_| Error::Codec(what))?;
    T::from_u8(raw).ok_or(Error::Codec(what))
}

fn write_string(dst: &mut dyn Write, s: &str) -> Result<()> {
    dst.write_u32::<BigEndian>(s.len() as u32)?;
    dst.write_all(s.as_bytes())?;
    Ok(())
}

fn write_time(dst: &mut dyn Write, t: Timestamp) -> Result<()> {
    dst.write_i64::<BigEndian>(t.seconds)?;
    dst.write_u32::<BigEndian>(t.nanos)?;
    Ok(())
}

fn write_option<T>(
    dst: &mut dyn Write,
    value: Option<T>,
    cont: impl FnOnce(&mut dyn Write, T) -> Result<()>,
) -> Result<()> {
    match value {
        Some(value) => {
            dst.write_u8(1)?;
            cont(dst, value)
        }
        None => Ok(dst.write_u8(0)?),
    }
}
