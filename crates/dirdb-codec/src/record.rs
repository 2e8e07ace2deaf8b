//! Binary, self-describing, length-prefixed record format.
//!
//! Layout: `magic(4) || version(1) || dn_len(u32) || dn bytes ||
//! element_count(u32) || elements...`, where each element is
//! `name_len(u32) || name bytes || flags(u32) || value_count(u32) ||
//! values...`, and each value is `value_len(u32) || value bytes`. All
//! integers are big-endian, via the `byteorder` crate the rest of the
//! workspace's on-disk formats already use.

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use dirdb_core::{Dn, Element, Entry, Error, Result, Value};
use std::io::{Cursor, Read};

const MAGIC: &[u8; 4] = b"DDB1";
const VERSION: u8 = 1;

/// Pack an entry into its on-disk byte form. Total over any well-formed
/// `Entry` — this never fails.
pub fn pack(entry: &Entry) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(MAGIC);
    buf.push(VERSION);

    write_bytes(&mut buf, entry.dn.as_str().as_bytes());

    buf.write_u32::<BigEndian>(entry.elements.len() as u32)
        .expect("writing to a Vec never fails");
    for el in &entry.elements {
        write_bytes(&mut buf, el.name.as_bytes());
        buf.write_u32::<BigEndian>(el.flags)
            .expect("writing to a Vec never fails");
        buf.write_u32::<BigEndian>(el.values.len() as u32)
            .expect("writing to a Vec never fails");
        for value in &el.values {
            write_bytes(&mut buf, value.as_bytes());
        }
    }
    buf
}

fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    buf.write_u32::<BigEndian>(bytes.len() as u32)
        .expect("writing to a Vec never fails");
    buf.extend_from_slice(bytes);
}

/// Unpack a previously-packed entry. Fails with [`Error::Protocol`]
/// ("corrupt record") on short input, implausible counts, or a length
/// prefix that would read past the end of the buffer.
pub fn unpack(bytes: &[u8]) -> Result<Entry> {
    let mut cur = Cursor::new(bytes);
    let corrupt = || Error::Protocol("corrupt record".to_string());

    let mut magic = [0u8; 4];
    cur.read_exact(&mut magic).map_err(|_| corrupt())?;
    if &magic != MAGIC {
        return Err(corrupt());
    }
    let version = cur.read_u8().map_err(|_| corrupt())?;
    if version != VERSION {
        return Err(corrupt());
    }

    let dn_bytes = read_bytes(&mut cur, &corrupt)?;
    let dn = String::from_utf8(dn_bytes).map_err(|_| corrupt())?;

    let element_count = cur.read_u32::<BigEndian>().map_err(|_| corrupt())?;
    let mut elements = Vec::with_capacity(element_count as usize);
    for _ in 0..element_count {
        let name_bytes = read_bytes(&mut cur, &corrupt)?;
        let name = String::from_utf8(name_bytes).map_err(|_| corrupt())?;
        let flags = cur.read_u32::<BigEndian>().map_err(|_| corrupt())?;
        let value_count = cur.read_u32::<BigEndian>().map_err(|_| corrupt())?;
        let mut values = Vec::with_capacity(value_count as usize);
        for _ in 0..value_count {
            let value_bytes = read_bytes(&mut cur, &corrupt)?;
            values.push(Value::new(value_bytes));
        }
        elements.push(Element { name, flags, values });
    }

    Ok(Entry {
        dn: Dn::new(dn),
        elements,
    })
}

fn read_bytes(cur: &mut Cursor<&[u8]>, corrupt: impl Fn() -> Error) -> Result<Vec<u8>> {
    let len = cur.read_u32::<BigEndian>().map_err(|_| corrupt())?;
    let remaining = cur.get_ref().len() as u64 - cur.position();
    if u64::from(len) > remaining {
        return Err(corrupt());
    }
    let mut out = vec![0u8; len as usize];
    cur.read_exact(&mut out).map_err(|_| corrupt())?;
    Ok(out)
}
