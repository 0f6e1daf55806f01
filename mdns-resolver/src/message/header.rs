use std::fmt;

use super::packer::*;
use super::parser::Section;
use super::*;
use shared::error::*;

/// Header is the fixed 12-byte prefix of every DNS message.
///
/// The 16-bit flags word is kept decomposed into its fields; the section
/// counts are filled in during unpacking and recomputed by
/// [`Message::pack`](super::Message::pack).
///
/// ```text
///   0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      ID                       |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |QR|   Opcode  |AA|TC|RD|RA|   Z    |   RCODE   |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                    QDCOUNT                    |
/// |                    ANCOUNT                    |
/// |                    NSCOUNT                    |
/// |                    ARCOUNT                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Default, Copy, Clone, PartialEq, Eq, Debug)]
pub struct Header {
    pub id: u16,
    pub response: bool,
    pub op_code: OpCode,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub rcode: RCode,

    pub questions: u16,
    pub answers: u16,
    pub authorities: u16,
    pub additionals: u16,
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.Header{{id: {}, response: {}, op_code: {}, authoritative: {}, \
             truncated: {}, recursion_desired: {}, recursion_available: {}, rcode: {}, \
             questions: {}, answers: {}, authorities: {}, additionals: {}}}",
            self.id,
            self.response,
            self.op_code,
            self.authoritative,
            self.truncated,
            self.recursion_desired,
            self.recursion_available,
            self.rcode,
            self.questions,
            self.answers,
            self.authorities,
            self.additionals,
        )
    }
}

impl Header {
    // bits packs the flag fields into the second header word.
    pub(crate) fn bits(&self) -> u16 {
        let mut bits = ((self.op_code & 0xF) << 11) | (self.rcode as u16 & 0xF);
        if self.recursion_available {
            bits |= HEADER_BIT_RA;
        }
        if self.recursion_desired {
            bits |= HEADER_BIT_RD;
        }
        if self.truncated {
            bits |= HEADER_BIT_TC;
        }
        if self.authoritative {
            bits |= HEADER_BIT_AA;
        }
        if self.response {
            bits |= HEADER_BIT_QR;
        }
        bits
    }

    fn set_bits(&mut self, bits: u16) {
        self.response = bits & HEADER_BIT_QR != 0;
        self.op_code = (bits >> 11) & 0xF;
        self.authoritative = bits & HEADER_BIT_AA != 0;
        self.truncated = bits & HEADER_BIT_TC != 0;
        self.recursion_desired = bits & HEADER_BIT_RD != 0;
        self.recursion_available = bits & HEADER_BIT_RA != 0;
        self.rcode = RCode::from((bits & 0xF) as u8);
    }

    // pack appends the wire format of the header to msg.
    pub(crate) fn pack(&self, mut msg: Vec<u8>) -> Vec<u8> {
        msg = pack_uint16(msg, self.id);
        msg = pack_uint16(msg, self.bits());
        msg = pack_uint16(msg, self.questions);
        msg = pack_uint16(msg, self.answers);
        msg = pack_uint16(msg, self.authorities);
        pack_uint16(msg, self.additionals)
    }

    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize) -> Result<usize> {
        let (id, off) = unpack_uint16(msg, off)?;
        let (bits, off) = unpack_uint16(msg, off)?;
        let (questions, off) = unpack_uint16(msg, off)?;
        let (answers, off) = unpack_uint16(msg, off)?;
        let (authorities, off) = unpack_uint16(msg, off)?;
        let (additionals, off) = unpack_uint16(msg, off)?;

        self.id = id;
        self.set_bits(bits);
        self.questions = questions;
        self.answers = answers;
        self.authorities = authorities;
        self.additionals = additionals;
        Ok(off)
    }

    /// Number of records announced for `section`.
    pub(crate) fn count(&self, section: Section) -> u16 {
        match section {
            Section::Questions => self.questions,
            Section::Answers => self.answers,
            Section::Authorities => self.authorities,
            Section::Additionals => self.additionals,
            _ => 0,
        }
    }
}
