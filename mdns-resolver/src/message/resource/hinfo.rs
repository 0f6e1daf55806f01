use super::*;

// An HinfoResource is an HINFO Resource record.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct HinfoResource {
    pub cpu: String,
    pub os: String,
}

impl fmt::Display for HinfoResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dnsmessage.HinfoResource{{CPU: {}, OS: {}}}",
            self.cpu, self.os
        )
    }
}

impl ResourceBody for HinfoResource {
    fn real_type(&self) -> DnsType {
        DnsType::Hinfo
    }

    // pack appends the wire format of the HinfoResource to msg.
    fn pack(
        &self,
        msg: Vec<u8>,
        _compression: &mut Option<HashMap<String, usize>>,
        _compression_off: usize,
    ) -> Result<Vec<u8>> {
        let msg = pack_str(msg, &self.cpu)?;
        pack_str(msg, &self.os)
    }

    fn unpack(
        &mut self,
        msg: &[u8],
        off: usize,
        _length: usize,
        _max_name_len: usize,
    ) -> Result<usize> {
        let (cpu, off) = unpack_str(msg, off)?;
        let (os, off) = unpack_str(msg, off)?;
        self.cpu = cpu;
        self.os = os;
        Ok(off)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
