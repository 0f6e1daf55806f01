use std::collections::HashMap;
use std::fmt;

use super::packer::*;
use shared::error::*;

// Maximum wire length of an encoded name (RFC 1035 section 3.1).
const NAME_LEN: usize = 255;

// Maximum length of a single label.
const LABEL_LEN: usize = 63;

// Largest message offset a compression pointer can address.
const POINTER_MAX: usize = 0x3FFF;

const POINTER_BITS: u8 = 0xC0;

/// A domain name in dotted form, always with a trailing dot.
///
/// The root name is `"."`.
#[derive(Default, PartialEq, Eq, Debug, Clone)]
pub struct Name {
    pub data: String,
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

impl Name {
    /// Creates a name from dotted text, adding the trailing dot if missing.
    ///
    /// Fails with [`Error::ErrCalcLen`] when the encoded form would exceed
    /// 255 bytes.
    pub fn new(data: &str) -> Result<Self> {
        let data = if data.ends_with('.') {
            data.to_owned()
        } else {
            format!("{data}.")
        };

        let wire_len = data
            .split('.')
            .filter(|label| !label.is_empty())
            .map(|label| label.len() + 1)
            .sum::<usize>()
            + 1;
        if wire_len > NAME_LEN {
            return Err(Error::ErrCalcLen);
        }

        Ok(Name { data })
    }

    /// Encodes the name as uncompressed length-prefixed labels.
    pub fn encode(&self) -> Result<Vec<u8>> {
        self.pack(Vec::new(), &mut None, 0)
    }

    /// Decodes the name starting at `off` in `msg`.
    ///
    /// Returns the name and the number of bytes it occupies at `off`; a name
    /// that ends in a compression pointer only accounts for the two pointer
    /// bytes, never for the labels read through it.
    pub fn decode(msg: &[u8], off: usize, max_len: usize) -> Result<(Name, usize)> {
        let mut name = Name::default();
        let new_off = name.unpack(msg, off, max_len)?;
        Ok((name, new_off - off))
    }

    // pack appends the wire format of the Name to msg.
    //
    // Empty labels are dropped. When compression is enabled, a suffix that was
    // already written is replaced by a pointer to it, and new suffixes are
    // remembered relative to compression_off.
    pub(crate) fn pack(
        &self,
        mut msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<Vec<u8>> {
        let data = self.data.as_bytes();

        let mut begin = 0;
        while begin < data.len() {
            let end = data[begin..]
                .iter()
                .position(|&c| c == b'.')
                .map_or(data.len(), |p| begin + p);
            if end == begin {
                begin += 1;
                continue;
            }
            if end - begin > LABEL_LEN {
                return Err(Error::ErrSegTooLong);
            }

            if let Some(compression) = compression {
                let suffix = &self.data[begin..];
                if let Some(&ptr) = compression.get(suffix) {
                    return Ok(pack_uint16(msg, (ptr | ((POINTER_BITS as usize) << 8)) as u16));
                }
                let off = msg.len() - compression_off;
                if off <= POINTER_MAX {
                    compression.insert(suffix.to_owned(), off);
                }
            }

            msg.push((end - begin) as u8);
            msg.extend_from_slice(&data[begin..end]);
            begin = end + 1;
        }

        msg.push(0);
        Ok(msg)
    }

    // unpack decodes the name at off and returns the offset just past it in
    // the caller's section.
    //
    // Every byte appended to the dotted form is checked against max_len, and
    // pointer chains are bounded by half the message length so a cycle fails
    // instead of spinning.
    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize, max_len: usize) -> Result<usize> {
        let mut buf: Vec<u8> = Vec::new();
        let mut curr = off;
        let mut new_off = off;
        let mut ptrs = 0;
        let max_ptrs = msg.len() / 2;

        loop {
            if curr >= msg.len() {
                return Err(Error::ErrBaseLen);
            }
            let c = msg[curr];
            curr += 1;

            match c & POINTER_BITS {
                0x00 => {
                    if c == 0x00 {
                        break;
                    }
                    let end = curr + c as usize;
                    if end > msg.len() {
                        return Err(Error::ErrCalcLen);
                    }
                    for &b in &msg[curr..end] {
                        push_checked(&mut buf, b, max_len)?;
                    }
                    push_checked(&mut buf, b'.', max_len)?;
                    curr = end;
                }
                POINTER_BITS => {
                    if curr >= msg.len() {
                        return Err(Error::ErrInvalidPtr);
                    }
                    let target = (((c & !POINTER_BITS) as usize) << 8) | msg[curr] as usize;
                    curr += 1;
                    if ptrs == 0 {
                        new_off = curr;
                    }
                    ptrs += 1;
                    if ptrs > max_ptrs {
                        return Err(Error::ErrTooManyPtr);
                    }
                    if target >= msg.len() {
                        return Err(Error::ErrInvalidPtr);
                    }
                    curr = target;
                }
                _ => return Err(Error::ErrReservedLabel),
            }
        }

        if buf.is_empty() {
            push_checked(&mut buf, b'.', max_len)?;
        }
        if ptrs == 0 {
            new_off = curr;
        }

        self.data = String::from_utf8_lossy(&buf).into_owned();
        Ok(new_off)
    }

    // skip advances past the name at off without decoding it.
    pub(crate) fn skip(msg: &[u8], off: usize) -> Result<usize> {
        let mut new_off = off;
        loop {
            if new_off >= msg.len() {
                return Err(Error::ErrBaseLen);
            }
            let c = msg[new_off];
            new_off += 1;

            match c & POINTER_BITS {
                0x00 => {
                    if c == 0x00 {
                        break;
                    }
                    new_off += c as usize;
                    if new_off > msg.len() {
                        return Err(Error::ErrCalcLen);
                    }
                }
                POINTER_BITS => {
                    new_off += 1;
                    if new_off > msg.len() {
                        return Err(Error::ErrInvalidPtr);
                    }
                    break;
                }
                _ => return Err(Error::ErrReservedLabel),
            }
        }
        Ok(new_off)
    }
}

fn push_checked(buf: &mut Vec<u8>, b: u8, max_len: usize) -> Result<()> {
    if buf.len() >= max_len {
        return Err(Error::ErrNameTooLong);
    }
    buf.push(b);
    Ok(())
}
