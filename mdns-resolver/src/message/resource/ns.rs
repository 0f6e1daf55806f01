use super::*;

super::single_name_resource!(
    /// An NsResource is an NS Resource record.
    NsResource,
    ns,
    DnsType::Ns,
    "NS"
);
