use super::*;

super::single_name_resource!(
    /// A CnameResource is a CNAME Resource record.
    CnameResource,
    cname,
    DnsType::Cname,
    "CNAME"
);
