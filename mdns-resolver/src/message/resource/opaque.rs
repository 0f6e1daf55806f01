use super::*;

/// An OpaqueResource holds the raw rdata of any record kind without a
/// dedicated handler (NULL, WKS, MINFO, AAAA, SRV, ...).
///
/// It consumes exactly the declared rdata length, which keeps the records
/// that follow aligned.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct OpaqueResource {
    pub typ: DnsType,
    pub data: Vec<u8>,
}

impl OpaqueResource {
    pub fn new(typ: DnsType) -> Self {
        OpaqueResource { typ, data: vec![] }
    }
}

impl fmt::Display for OpaqueResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.OpaqueResource{{Type: {}, Data: {:?}}}",
            self.typ, self.data
        )
    }
}

impl ResourceBody for OpaqueResource {
    fn real_type(&self) -> DnsType {
        self.typ
    }

    fn pack(
        &self,
        msg: Vec<u8>,
        _compression: &mut Option<HashMap<String, usize>>,
        _compression_off: usize,
    ) -> Result<Vec<u8>> {
        Ok(pack_bytes(msg, &self.data))
    }

    fn unpack(
        &mut self,
        msg: &[u8],
        off: usize,
        length: usize,
        _max_name_len: usize,
    ) -> Result<usize> {
        self.data = vec![0; length];
        unpack_bytes(msg, off, &mut self.data)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
