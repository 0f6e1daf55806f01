use super::*;

// A TxtResource is a TXT Resource record.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TxtResource {
    pub txt: Vec<String>,
}

impl fmt::Display for TxtResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dnsmessage.TXTResource{{TXT: {}}}", self.txt.join(","))
    }
}

impl ResourceBody for TxtResource {
    fn real_type(&self) -> DnsType {
        DnsType::Txt
    }

    // pack appends the wire format of the TxtResource to msg.
    fn pack(
        &self,
        mut msg: Vec<u8>,
        _compression: &mut Option<HashMap<String, usize>>,
        _compression_off: usize,
    ) -> Result<Vec<u8>> {
        for s in &self.txt {
            msg = pack_str(msg, s)?;
        }
        Ok(msg)
    }

    // unpack reads character-strings until the rdata is exhausted.
    fn unpack(
        &mut self,
        msg: &[u8],
        mut off: usize,
        length: usize,
        _max_name_len: usize,
    ) -> Result<usize> {
        let end = off + length;
        let mut txts = vec![];
        while off < end {
            let (t, new_off) = unpack_str(msg, off)?;
            if new_off > end {
                return Err(Error::ErrCalcLen);
            }
            txts.push(t);
            off = new_off;
        }
        self.txt = txts;
        Ok(off)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
