use std::collections::HashMap;
use std::fmt;

use super::name::*;
use super::*;
use shared::error::Result;

// A question is a DNS query.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Question {
    pub name: Name,
    pub typ: DnsType,
    pub class: DnsClass,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.question{{Name: {}, Type: {}, Class: {}}}",
            self.name, self.typ, self.class
        )
    }
}

impl Question {
    // pack appends the wire format of the question to msg.
    pub(crate) fn pack(
        &self,
        mut msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<Vec<u8>> {
        msg = self.name.pack(msg, compression, compression_off)?;
        msg = self.typ.pack(msg);
        Ok(self.class.pack(msg))
    }

    /// Parses the question at `off` and returns the offset of the next record.
    pub fn unpack(&mut self, msg: &[u8], off: usize, max_name_len: usize) -> Result<usize> {
        let mut new_off = self.name.unpack(msg, off, max_name_len)?;
        new_off = self.typ.unpack(msg, new_off)?;
        self.class.unpack(msg, new_off)
    }

    pub(crate) fn skip(msg: &[u8], off: usize) -> Result<usize> {
        let new_off = Name::skip(msg, off)?;
        let new_off = DnsType::skip(msg, new_off)?;
        DnsClass::skip(msg, new_off)
    }
}
