use super::*;

// An MxResource is an MX Resource record.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct MxResource {
    pub pref: u16,
    pub mx: Name,
}

impl fmt::Display for MxResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.MXResource{{Pref: {}, MX: {}}}",
            self.pref, self.mx
        )
    }
}

impl ResourceBody for MxResource {
    fn real_type(&self) -> DnsType {
        DnsType::Mx
    }

    // pack appends the wire format of the MxResource to msg.
    fn pack(
        &self,
        mut msg: Vec<u8>,
        compression: &mut Option<HashMap<String, usize>>,
        compression_off: usize,
    ) -> Result<Vec<u8>> {
        msg = pack_uint16(msg, self.pref);
        self.mx.pack(msg, compression, compression_off)
    }

    fn unpack(
        &mut self,
        msg: &[u8],
        off: usize,
        _length: usize,
        max_name_len: usize,
    ) -> Result<usize> {
        let (pref, off) = unpack_uint16(msg, off)?;
        self.pref = pref;
        self.mx.unpack(msg, off, max_name_len)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
