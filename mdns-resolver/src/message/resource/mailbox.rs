//! Experimental mailbox records from RFC 1035 section 3.3.
//!
//! They are never produced by mDNS responders but are still valid answers,
//! so they are decoded far enough to be skipped correctly.

use super::*;

super::single_name_resource!(
    /// An MbResource names the host holding a mailbox.
    MbResource,
    mb,
    DnsType::Mb,
    "MB"
);

super::single_name_resource!(
    /// An MgResource names a mail group member.
    MgResource,
    mg,
    DnsType::Mg,
    "MG"
);

super::single_name_resource!(
    /// An MrResource names a mailbox rename.
    MrResource,
    mr,
    DnsType::Mr,
    "MR"
);
