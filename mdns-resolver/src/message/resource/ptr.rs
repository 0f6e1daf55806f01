use super::*;

super::single_name_resource!(
    /// A PtrResource is a PTR Resource record.
    PtrResource,
    ptr,
    DnsType::Ptr,
    "PTR"
);
