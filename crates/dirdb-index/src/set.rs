//! On-disk encoding for an index bucket's membership: a sorted, deduplicated
//! set of canonical DN strings, stored as the value at an `@INDEX:...` or
//! `@IDXONE:...` store key. Same length-prefixed, big-endian shape as the
//! record codec, kept separate because an index bucket isn't an `Entry`.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use dirdb_core::{Error, Result};
use std::io::Cursor;

/// Decode a bucket's membership. An absent key (empty `bytes`) decodes to
/// an empty set.
pub fn decode(bytes: &[u8]) -> Result<Vec<String>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    let corrupt = || Error::Protocol("corrupt index bucket".to_string());
    let mut cur = Cursor::new(bytes);
    let count = cur.read_u32::<BigEndian>().map_err(|_| corrupt())?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let len = cur.read_u32::<BigEndian>().map_err(|_| corrupt())?;
        let remaining = cur.get_ref().len() as u64 - cur.position();
        if u64::from(len) > remaining {
            return Err(corrupt());
        }
        let mut buf = vec![0u8; len as usize];
        std::io::Read::read_exact(&mut cur, &mut buf).map_err(|_| corrupt())?;
        out.push(String::from_utf8(buf).map_err(|_| corrupt())?);
    }
    Ok(out)
}

/// Encode a bucket's membership, sorted for deterministic output.
pub fn encode(members: &[String]) -> Vec<u8> {
    let mut sorted = members.to_vec();
    sorted.sort();
    sorted.dedup();

    let mut buf = Vec::new();
    buf.write_u32::<BigEndian>(sorted.len() as u32)
        .expect("writing to a Vec never fails");
    for m in &sorted {
        let bytes = m.as_bytes();
        buf.write_u32::<BigEndian>(bytes.len() as u32)
            .expect("writing to a Vec never fails");
        buf.extend_from_slice(bytes);
    }
    buf
}
