pub(crate) mod a;
pub(crate) mod cname;
pub(crate) mod hinfo;
pub(crate) mod mailbox;
pub(crate) mod mx;
pub(crate) mod ns;
pub(crate) mod opaque;
pub(crate) mod ptr;
pub(crate) mod soa;
pub(crate) mod txt;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;

pub use a::AResource;
pub use cname::CnameResource;
pub use hinfo::HinfoResource;
pub use mailbox::{MbResource, MgResource, MrResource};
pub use mx::MxResource;
pub use ns::NsResource;
pub use opaque::OpaqueResource;
pub use ptr::PtrResource;
pub use soa::SoaResource;
pub use txt::TxtResource;

use super::name::*;
use super::packer::*;
use super::*;
use shared::error::*;

// A Resource is a DNS resource record.
#[derive(Default, Debug)]
pub struct Resource {
    pub header: ResourceHeader,
    pub body: Option<Box<dyn ResourceBody>>,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.Resource{{Header: {}, Body: {}}}",
            self.header,
            if let Some(body) = &self.body {
                body.to_string()
            } else {
                "None".to_owned()
            }
        )
    }
}

impl Resource {
    // pack appends the wire format of the Resource to msg.
    pub(crate) fn pack(
        &mut self,
        msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<Vec<u8>> {
        self.header.typ = self
            .body
            .as_ref()
            .ok_or(Error::ErrNilResourceBody)?
            .real_type();
        let (mut msg, len_off) = self.header.pack(msg, compression, compression_off)?;
        let pre_len = msg.len();
        if let Some(body) = &self.body {
            msg = body.pack(msg, compression, compression_off)?;
            self.header.fix_len(&mut msg, len_off, pre_len)?;
        }
        Ok(msg)
    }

    /// Parses the resource record at `off` and returns the offset of the
    /// next record.
    ///
    /// The body is decoded by the handler for the record's type and must fit
    /// inside the declared rdata length; the returned offset is always the
    /// end of that rdata, whatever the handler consumed.
    pub fn unpack(&mut self, msg: &[u8], off: usize, max_name_len: usize) -> Result<usize> {
        let off = self.header.unpack(msg, off, max_name_len)?;
        let length = self.header.length as usize;
        let end = off + length;
        if end > msg.len() {
            return Err(Error::ErrResourceLen);
        }

        let (rb, body_end) = unpack_resource_body(self.header.typ, msg, off, length, max_name_len)?;
        if body_end > end {
            return Err(Error::ErrResourceLen);
        }
        self.body = Some(rb);
        Ok(end)
    }

    pub(crate) fn skip(msg: &[u8], off: usize) -> Result<usize> {
        let mut new_off = Name::skip(msg, off)?;
        new_off = DnsType::skip(msg, new_off)?;
        new_off = DnsClass::skip(msg, new_off)?;
        new_off = skip_uint32(msg, new_off)?;
        let (length, mut new_off) = unpack_uint16(msg, new_off)?;
        new_off += length as usize;
        if new_off > msg.len() {
            return Err(Error::ErrResourceLen);
        }
        Ok(new_off)
    }

    /// The IPv4 address carried by an A record, `None` for any other body.
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        self.body
            .as_ref()?
            .as_any()
            .downcast_ref::<AResource>()
            .map(|a| Ipv4Addr::from(a.a))
    }
}

/// Header for a DNS resource record.
///
/// ```text
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      NAME                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TYPE                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     CLASS                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                      TTL                      |
/// |                                               |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                   RDLENGTH                    |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// |                     RDATA                     |
/// +--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+--+
/// ```
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct ResourceHeader {
    /// The domain name for which this resource record pertains.
    pub name: Name,

    /// The type of DNS resource record.
    ///
    /// This field will be set automatically during packing.
    pub typ: DnsType,

    /// The class of network to which this DNS resource record pertains.
    pub class: DnsClass,

    /// Time to live in seconds. Carried through, never acted on.
    pub ttl: u32,

    /// Length of the resource data (RDATA) following this header.
    ///
    /// This field will be set automatically during packing.
    pub length: u16,
}

impl fmt::Display for ResourceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.ResourceHeader{{Name: {}, Type: {}, Class: {}, TTL: {}, Length: {}}}",
            self.name, self.typ, self.class, self.ttl, self.length,
        )
    }
}

impl ResourceHeader {
    // pack appends the wire format of the ResourceHeader to msg.
    //
    // len_off is the offset in msg where the Length field was packed.
    pub(crate) fn pack(
        &self,
        mut msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<(Vec<u8>, usize)> {
        msg = self.name.pack(msg, compression, compression_off)?;
        msg = self.typ.pack(msg);
        msg = self.class.pack(msg);
        msg = pack_uint32(msg, self.ttl);
        let len_off = msg.len();
        msg = pack_uint16(msg, self.length);
        Ok((msg, len_off))
    }

    pub(crate) fn unpack(&mut self, msg: &[u8], off: usize, max_name_len: usize) -> Result<usize> {
        let mut new_off = off;
        new_off = self.name.unpack(msg, new_off, max_name_len)?;
        new_off = self.typ.unpack(msg, new_off)?;
        new_off = self.class.unpack(msg, new_off)?;
        let (ttl, new_off) = unpack_uint32(msg, new_off)?;
        self.ttl = ttl;
        let (l, new_off) = unpack_uint16(msg, new_off)?;
        self.length = l;

        Ok(new_off)
    }

    // fix_len updates a packed ResourceHeader to include the length of the
    // ResourceBody.
    //
    // len_off is the offset of the ResourceHeader.Length field in msg.
    //
    // pre_len is the length that msg was before the ResourceBody was packed.
    pub(crate) fn fix_len(&mut self, msg: &mut [u8], len_off: usize, pre_len: usize) -> Result<()> {
        if msg.len() < pre_len || msg.len() > pre_len + u16::MAX as usize {
            return Err(Error::ErrResTooLong);
        }

        let con_len = msg.len() - pre_len;

        // Fill in the length now that we know how long the content is.
        msg[len_off] = ((con_len >> 8) & 0xFF) as u8;
        msg[len_off + 1] = (con_len & 0xFF) as u8;
        self.length = con_len as u16;

        Ok(())
    }
}

/// A ResourceBody is a DNS resource record minus the header.
///
/// Each record kind has its own implementation; [`unpack_resource_body`]
/// picks one from the header's type.
pub trait ResourceBody: fmt::Display + fmt::Debug {
    // real_type returns the actual type of the Resource. This is used to
    // fill in the header Type field.
    fn real_type(&self) -> DnsType;

    // pack packs a Resource except for its header.
    fn pack(
        &self,
        msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<Vec<u8>>;

    // unpack decodes the body at off, given the declared rdata length, and
    // returns the offset just past what it consumed.
    fn unpack(&mut self, msg: &[u8], off: usize, length: usize, max_name_len: usize)
    -> Result<usize>;

    fn as_any(&self) -> &dyn Any;
}

pub fn unpack_resource_body(
    typ: DnsType,
    msg: &[u8],
    mut off: usize,
    length: usize,
    max_name_len: usize,
) -> Result<(Box<dyn ResourceBody>, usize)> {
    let mut rb: Box<dyn ResourceBody> = match typ {
        DnsType::A => Box::<AResource>::default(),
        DnsType::Ns => Box::<NsResource>::default(),
        DnsType::Cname => Box::<CnameResource>::default(),
        DnsType::Soa => Box::<SoaResource>::default(),
        DnsType::Mb => Box::<MbResource>::default(),
        DnsType::Mg => Box::<MgResource>::default(),
        DnsType::Mr => Box::<MrResource>::default(),
        DnsType::Ptr => Box::<PtrResource>::default(),
        DnsType::Hinfo => Box::<HinfoResource>::default(),
        DnsType::Mx => Box::<MxResource>::default(),
        DnsType::Txt => Box::<TxtResource>::default(),
        _ => Box::new(OpaqueResource::new(typ)),
    };

    off = rb.unpack(msg, off, length, max_name_len)?;

    Ok((rb, off))
}

// single_name_resource defines a body made of exactly one domain name, the
// shape shared by CNAME, NS, PTR, MB, MG and MR.
macro_rules! single_name_resource {
    ($(#[$meta:meta])* $name:ident, $field:ident, $typ:expr, $label:literal) => {
        $(#[$meta])*
        #[derive(Default, Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub $field: Name,
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(
                    f,
                    concat!("dnsmessage.", stringify!($name), "{{", $label, ": {}}}"),
                    self.$field
                )
            }
        }

        impl ResourceBody for $name {
            fn real_type(&self) -> DnsType {
                $typ
            }

            fn pack(
                &self,
                msg: Vec<u8>,
                compression: &mut Option<HashMap<String, usize>>,
                compression_off: usize,
            ) -> Result<Vec<u8>> {
                self.$field.pack(msg, compression, compression_off)
            }

            fn unpack(
                &mut self,
                msg: &[u8],
                off: usize,
                _length: usize,
                max_name_len: usize,
            ) -> Result<usize> {
                self.$field.unpack(msg, off, max_name_len)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

pub(crate) use single_name_resource;
