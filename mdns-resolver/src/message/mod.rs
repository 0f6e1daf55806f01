//! DNS wire format: names, questions, resource records and whole messages.
//!
//! Only what an mDNS address lookup needs is modelled in depth. Record kinds
//! without their own handler are carried as opaque rdata so that the records
//! after them still line up.

#[cfg(test)]
mod message_test;

pub(crate) mod header;
pub(crate) mod name;
mod packer;
pub(crate) mod parser;
pub(crate) mod question;
pub(crate) mod resource;

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

pub use header::Header;
pub use name::Name;
pub use parser::Parser;
pub use question::Question;
pub use resource::*;

use packer::*;

use shared::error::*;

// Message formats

// A Type is a type of DNS request and response.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub enum DnsType {
    // ResourceHeader.Type and question.Type
    A,
    Ns,
    Md,
    Mf,
    Cname,
    Soa,
    Mb,
    Mg,
    Mr,
    Null,
    Wks,
    Ptr,
    Hinfo,
    Minfo,
    Mx,
    Txt,
    Aaaa,
    Srv,

    // question.Type
    Any,

    /// Type 0, which no record carries.
    #[default]
    Unsupported,
    /// A type without its own variant (NSEC, OPT, ...), kept by value so
    /// it packs back unchanged.
    Unknown(u16),
}

impl From<u16> for DnsType {
    fn from(v: u16) -> Self {
        match v {
            1 => DnsType::A,
            2 => DnsType::Ns,
            3 => DnsType::Md,
            4 => DnsType::Mf,
            5 => DnsType::Cname,
            6 => DnsType::Soa,
            7 => DnsType::Mb,
            8 => DnsType::Mg,
            9 => DnsType::Mr,
            10 => DnsType::Null,
            11 => DnsType::Wks,
            12 => DnsType::Ptr,
            13 => DnsType::Hinfo,
            14 => DnsType::Minfo,
            15 => DnsType::Mx,
            16 => DnsType::Txt,
            28 => DnsType::Aaaa,
            33 => DnsType::Srv,

            // question.Type
            255 => DnsType::Any,

            0 => DnsType::Unsupported,
            _ => DnsType::Unknown(v),
        }
    }
}

impl From<DnsType> for u16 {
    fn from(t: DnsType) -> Self {
        match t {
            DnsType::A => 1,
            DnsType::Ns => 2,
            DnsType::Md => 3,
            DnsType::Mf => 4,
            DnsType::Cname => 5,
            DnsType::Soa => 6,
            DnsType::Mb => 7,
            DnsType::Mg => 8,
            DnsType::Mr => 9,
            DnsType::Null => 10,
            DnsType::Wks => 11,
            DnsType::Ptr => 12,
            DnsType::Hinfo => 13,
            DnsType::Minfo => 14,
            DnsType::Mx => 15,
            DnsType::Txt => 16,
            DnsType::Aaaa => 28,
            DnsType::Srv => 33,
            DnsType::Any => 255,
            DnsType::Unsupported => 0,
            DnsType::Unknown(v) => v,
        }
    }
}

impl fmt::Display for DnsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            DnsType::A => "A",
            DnsType::Ns => "NS",
            DnsType::Md => "MD",
            DnsType::Mf => "MF",
            DnsType::Cname => "CNAME",
            DnsType::Soa => "SOA",
            DnsType::Mb => "MB",
            DnsType::Mg => "MG",
            DnsType::Mr => "MR",
            DnsType::Null => "NULL",
            DnsType::Wks => "WKS",
            DnsType::Ptr => "PTR",
            DnsType::Hinfo => "HINFO",
            DnsType::Minfo => "MINFO",
            DnsType::Mx => "MX",
            DnsType::Txt => "TXT",
            DnsType::Aaaa => "AAAA",
            DnsType::Srv => "SRV",
            DnsType::Any => "ANY",
            DnsType::Unsupported => "Unsupported",
            // RFC 3597 presentation form.
            DnsType::Unknown(v) => return write!(f, "TYPE{v}"),
        };
        write!(f, "{s}")
    }
}

impl DnsType {
    // pack appends the wire format of field to msg.
    pub(crate) fn pack(&self, msg: Vec<u8>) -> Vec<u8> {
        pack_uint16(msg, u16::from(*self))
    }

    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize) -> Result<usize> {
        let (t, o) = unpack_uint16(msg, off)?;
        *self = DnsType::from(t);
        Ok(o)
    }

    pub(crate) fn skip(msg: &[u8], off: usize) -> Result<usize> {
        skip_uint16(msg, off)
    }
}

/// DNS class of a question or resource record.
///
/// Only [`DNSCLASS_INET`] matters for mDNS. The top bit is overloaded by
/// RFC 6762: in questions it asks for a unicast reply
/// ([`UNICAST_RESPONSE_BIT`]), in answers it is the cache-flush flag.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct DnsClass(pub u16);

/// Internet class (IN). Value: 1
pub const DNSCLASS_INET: DnsClass = DnsClass(1);

/// Any class (*), only valid in questions. Value: 255
pub const DNSCLASS_ANY: DnsClass = DnsClass(255);

/// Top bit of a question's class asking responders to answer by unicast
/// (RFC 6762 section 5.4).
pub const UNICAST_RESPONSE_BIT: u16 = 0x8000;

impl fmt::Display for DnsClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = DnsClass(self.0 & !UNICAST_RESPONSE_BIT);
        let other = format!("{}", class.0);
        let s = match class {
            DNSCLASS_INET => "ClassINET",
            DNSCLASS_ANY => "ClassANY",
            _ => other.as_str(),
        };
        if self.0 & UNICAST_RESPONSE_BIT != 0 {
            write!(f, "{s}|QU")
        } else {
            write!(f, "{s}")
        }
    }
}

impl DnsClass {
    // pack appends the wire format of field to msg.
    pub(crate) fn pack(&self, msg: Vec<u8>) -> Vec<u8> {
        pack_uint16(msg, self.0)
    }

    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize) -> Result<usize> {
        let (c, o) = unpack_uint16(msg, off)?;
        *self = DnsClass(c);
        Ok(o)
    }

    pub(crate) fn skip(msg: &[u8], off: usize) -> Result<usize> {
        skip_uint16(msg, off)
    }
}

// An OpCode is a DNS operation code.
pub type OpCode = u16;

/// A DNS response status code.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub enum RCode {
    // Message.Rcode
    #[default]
    Success = 0,
    FormatError = 1,
    ServerFailure = 2,
    NameError = 3,
    NotImplemented = 4,
    Refused = 5,
    Unsupported,
}

impl From<u8> for RCode {
    fn from(v: u8) -> Self {
        match v {
            0 => RCode::Success,
            1 => RCode::FormatError,
            2 => RCode::ServerFailure,
            3 => RCode::NameError,
            4 => RCode::NotImplemented,
            5 => RCode::Refused,
            _ => RCode::Unsupported,
        }
    }
}

impl fmt::Display for RCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            RCode::Success => "RCodeSuccess",
            RCode::FormatError => "RCodeFormatError",
            RCode::ServerFailure => "RCodeServerFailure",
            RCode::NameError => "RCodeNameError",
            RCode::NotImplemented => "RCodeNotImplemented",
            RCode::Refused => "RCodeRefused",
            RCode::Unsupported => "RCodeUnsupported",
        };
        write!(f, "{s}")
    }
}

// Internal constants.

// UINT16LEN is the length (in bytes) of a uint16.
const UINT16LEN: usize = 2;

// UINT32LEN is the length (in bytes) of a uint32.
const UINT32LEN: usize = 4;

/// HEADER_LEN is the length (in bytes) of a DNS header.
///
/// A header is comprised of 6 uint16s and no padding.
pub const HEADER_LEN: usize = 6 * UINT16LEN;

const HEADER_BIT_QR: u16 = 1 << 15; // query/response (response=1)
const HEADER_BIT_AA: u16 = 1 << 10; // authoritative
const HEADER_BIT_TC: u16 = 1 << 9; // truncated
const HEADER_BIT_RD: u16 = 1 << 8; // recursion desired
const HEADER_BIT_RA: u16 = 1 << 7; // recursion available

// Message is a representation of a DNS message.
#[derive(Default, Debug)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<Resource>,
    pub authorities: Vec<Resource>,
    pub additionals: Vec<Resource>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = "dnsmessage.Message{Header: ".to_owned();
        s += self.header.to_string().as_str();

        s += ", Questions: ";
        let v: Vec<String> = self.questions.iter().map(|q| q.to_string()).collect();
        s += &v.join(", ");

        s += ", Answers: ";
        let v: Vec<String> = self.answers.iter().map(|q| q.to_string()).collect();
        s += &v.join(", ");

        s += ", Authorities: ";
        let v: Vec<String> = self.authorities.iter().map(|q| q.to_string()).collect();
        s += &v.join(", ");

        s += ", Additionals: ";
        let v: Vec<String> = self.additionals.iter().map(|q| q.to_string()).collect();
        s += &v.join(", ");

        write!(f, "{s}")
    }
}

impl Message {
    /// Builds the single-question mDNS query asking for the A record of
    /// `name`.
    ///
    /// The id and every flag are zero (RFC 6762 section 18), and the class
    /// carries [`UNICAST_RESPONSE_BIT`] so responders may answer directly.
    pub fn build_query(name: &str) -> Result<Vec<u8>> {
        let mut msg = Message {
            header: Header::default(),
            questions: vec![Question {
                name: Name::new(name)?,
                typ: DnsType::A,
                class: DnsClass(DNSCLASS_INET.0 | UNICAST_RESPONSE_BIT),
            }],
            ..Default::default()
        };
        msg.pack()
    }

    // Unpack parses a full Message.
    pub fn unpack(&mut self, msg: &[u8], max_name_len: usize) -> Result<()> {
        let mut p = Parser::new(max_name_len);
        self.header = p.start(msg)?;
        self.questions = p.all_questions()?;
        self.answers = p.all_answers()?;
        self.authorities = p.all_authorities()?;
        self.additionals = p.all_additionals()?;
        Ok(())
    }

    // Pack packs a full Message.
    pub fn pack(&mut self) -> Result<Vec<u8>> {
        self.append_pack(vec![])
    }

    // append_pack is like Pack but appends the full Message to b and returns the
    // extended buffer.
    pub fn append_pack(&mut self, b: Vec<u8>) -> Result<Vec<u8>> {
        if self.questions.len() > u16::MAX as usize {
            return Err(Error::ErrTooManyQuestions);
        }
        if self.answers.len() > u16::MAX as usize {
            return Err(Error::ErrTooManyAnswers);
        }
        if self.authorities.len() > u16::MAX as usize {
            return Err(Error::ErrTooManyAuthorities);
        }
        if self.additionals.len() > u16::MAX as usize {
            return Err(Error::ErrTooManyAdditionals);
        }

        self.header.questions = self.questions.len() as u16;
        self.header.answers = self.answers.len() as u16;
        self.header.authorities = self.authorities.len() as u16;
        self.header.additionals = self.additionals.len() as u16;

        let compression_off = b.len();
        let mut msg = self.header.pack(b);

        // Unpacking must support compression (RFC 1035), so always compress
        // when packing.
        let mut compression = Some(HashMap::new());

        for question in &self.questions {
            msg = question.pack(msg, &mut compression, compression_off)?;
        }
        for answer in &mut self.answers {
            msg = answer.pack(msg, &mut compression, compression_off)?;
        }
        for authority in &mut self.authorities {
            msg = authority.pack(msg, &mut compression, compression_off)?;
        }
        for additional in &mut self.additionals {
            msg = additional.pack(msg, &mut compression, compression_off)?;
        }

        Ok(msg)
    }
}

/// The parts of an mDNS reply a lookup acts on.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub header: Header,
    /// Address of the first A record in the answer section.
    pub address: Option<Ipv4Addr>,
}

impl Reply {
    /// Parses a reply, walking every section so that a malformed record
    /// anywhere in the message is reported.
    ///
    /// Succeeds whatever the response code; interpreting it is up to the
    /// caller.
    pub fn parse(msg: &[u8], max_name_len: usize) -> Result<Reply> {
        let mut p = Parser::new(max_name_len);
        let header = p.start(msg)?;

        let _ = p.all_questions()?;

        let mut address = None;
        loop {
            let answer = match p.answer() {
                Ok(answer) => answer,
                Err(Error::ErrSectionDone) => break,
                Err(err) => return Err(err),
            };
            if address.is_none() {
                address = answer.ipv4();
            }
        }

        let _ = p.all_authorities()?;
        let _ = p.all_additionals()?;

        Ok(Reply { header, address })
    }
}
