use super::*;
use crate::config::DEFAULT_MAX_NAME_LEN;

fn body<T: 'static>(r: &Resource) -> &T {
    r.body
        .as_ref()
        .unwrap()
        .as_any()
        .downcast_ref::<T>()
        .unwrap()
}

fn resource(name: &str, body: Box<dyn ResourceBody>) -> Resource {
    Resource {
        header: ResourceHeader {
            name: Name::new(name).unwrap(),
            class: DNSCLASS_INET,
            ttl: 120,
            ..Default::default()
        },
        body: Some(body),
    }
}

fn a_record(name: &str, a: [u8; 4]) -> Resource {
    resource(name, Box::new(AResource { a }))
}

fn reply(answers: Vec<Resource>) -> Message {
    Message {
        header: Header {
            response: true,
            authoritative: true,
            ..Default::default()
        },
        answers,
        ..Default::default()
    }
}

#[test]
fn test_name_new_appends_trailing_dot() {
    assert_eq!(Name::new("host.local").unwrap().data, "host.local.");
    assert_eq!(Name::new("host.local.").unwrap().data, "host.local.");
}

#[test]
fn test_name_new_too_long() {
    let label = "a".repeat(63);
    let name = format!("{label}.{label}.{label}.{label}");
    assert_eq!(Name::new(&name), Err(Error::ErrCalcLen));
}

#[test]
fn test_name_round_trip() {
    let name = Name::new("www.example.com").unwrap();
    let wire = name.encode().unwrap();
    assert_eq!(
        wire,
        b"\x03www\x07example\x03com\x00".to_vec(),
        "uncompressed labels"
    );

    let (decoded, consumed) = Name::decode(&wire, 0, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(decoded.data, "www.example.com.");
    assert_eq!(consumed, wire.len());
}

#[test]
fn test_name_round_trip_at_length_limits() {
    let label63 = "a".repeat(63);
    let name = Name::new(&format!("{label63}.local")).unwrap();
    let wire = name.encode().unwrap();
    assert_eq!(wire[0], 63);
    let (decoded, consumed) = Name::decode(&wire, 0, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(decoded, name);
    assert_eq!(consumed, wire.len());

    // Three 63-byte labels and one of 61 bytes encode to exactly 255 bytes.
    let text = format!("{label63}.{label63}.{label63}.{}", "b".repeat(61));
    let name = Name::new(&text).unwrap();
    let wire = name.encode().unwrap();
    assert_eq!(wire.len(), 255);
    assert_eq!(name.data.len(), 254);

    let (decoded, consumed) = Name::decode(&wire, 0, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(decoded, name);
    assert_eq!(consumed, 255);

    // A limit equal to the dotted length still fits; one less does not.
    let (decoded, _) = Name::decode(&wire, 0, 254).unwrap();
    assert_eq!(decoded, name);
    assert_eq!(Name::decode(&wire, 0, 253), Err(Error::ErrNameTooLong));

    // One more byte is over the wire limit.
    assert_eq!(Name::new(&format!("{text}b")), Err(Error::ErrCalcLen));
}

#[test]
fn test_name_encode_label_too_long() {
    let name = Name::new(&"a".repeat(64)).unwrap();
    assert_eq!(name.encode(), Err(Error::ErrSegTooLong));
}

#[test]
fn test_name_decode_root() {
    let (name, consumed) = Name::decode(&[0], 0, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(name.data, ".");
    assert_eq!(consumed, 1);
}

#[test]
fn test_name_decode_pointer() {
    let mut msg = b"\x03www\x07example\x03com\x00".to_vec();
    let direct_end = msg.len();
    msg.extend_from_slice(&[0xC0, 0x00]);
    let foo_off = msg.len();
    // "foo" followed by a pointer to "example.com" at offset 4.
    msg.extend_from_slice(b"\x03foo\xC0\x04");

    let (direct, _) = Name::decode(&msg, 0, DEFAULT_MAX_NAME_LEN).unwrap();
    let (pointed, consumed) = Name::decode(&msg, direct_end, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(pointed, direct);
    assert_eq!(consumed, 2, "only the pointer bytes belong to the name");

    let (mixed, consumed) = Name::decode(&msg, foo_off, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(mixed.data, "foo.example.com.");
    assert_eq!(consumed, 6);
}

#[test]
fn test_name_decode_pointer_cycle() {
    assert_eq!(
        Name::decode(&[0xC0, 0x00], 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrTooManyPtr)
    );
    assert_eq!(
        Name::decode(&[0xC0, 0x02, 0xC0, 0x00], 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrTooManyPtr)
    );
    // A label in the loop still must not grow the name without bound.
    let result = Name::decode(&[0x01, b'a', 0xC0, 0x00], 0, DEFAULT_MAX_NAME_LEN);
    assert!(result.is_err());
}

#[test]
fn test_name_decode_invalid_pointer() {
    assert_eq!(
        Name::decode(&[0xC0, 0x10], 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrInvalidPtr)
    );
    assert_eq!(
        Name::decode(&[0xC0], 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrInvalidPtr)
    );
}

#[test]
fn test_name_decode_reserved_label() {
    assert_eq!(
        Name::decode(&[0x40, 0x00], 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrReservedLabel)
    );
    assert_eq!(
        Name::decode(&[0x80, 0x00], 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrReservedLabel)
    );
}

#[test]
fn test_name_decode_truncated() {
    assert_eq!(
        Name::decode(&[0x05, b'a', b'b'], 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrCalcLen)
    );
    assert_eq!(
        Name::decode(&[0x01, b'a'], 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrBaseLen)
    );
    assert_eq!(Name::decode(&[], 0, DEFAULT_MAX_NAME_LEN), Err(Error::ErrBaseLen));
}

#[test]
fn test_name_decode_max_len() {
    let wire = b"\x03abc\x03def\x00";

    // "abc.def." is exactly eight bytes.
    let (name, _) = Name::decode(wire, 0, 8).unwrap();
    assert_eq!(name.data, "abc.def.");
    assert_eq!(Name::decode(wire, 0, 7), Err(Error::ErrNameTooLong));

    assert_eq!(Name::decode(&[0], 0, 0), Err(Error::ErrNameTooLong));
}

#[test]
fn test_header_flags() {
    let header = Header {
        id: 0x1234,
        response: true,
        authoritative: true,
        rcode: RCode::NameError,
        questions: 1,
        answers: 2,
        ..Default::default()
    };

    let wire = header.pack(vec![]);
    assert_eq!(
        wire,
        vec![0x12, 0x34, 0x84, 0x03, 0x00, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00]
    );

    let mut decoded = Header::default();
    assert_eq!(decoded.unpack(&wire, 0).unwrap(), HEADER_LEN);
    assert_eq!(decoded, header);
}

#[test]
fn test_header_too_short() {
    assert_eq!(Reply::parse(&[0; 11], DEFAULT_MAX_NAME_LEN), Err(Error::ErrBaseLen));
}

#[test]
fn test_build_query() {
    let query = Message::build_query("local").unwrap();
    assert_eq!(
        query,
        vec![
            0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x6c,
            0x6f, 0x63, 0x61, 0x6c, 0x00, 0x00, 0x01, 0x80, 0x01,
        ]
    );
}

#[test]
fn test_build_query_label_too_long() {
    assert_eq!(
        Message::build_query(&"a".repeat(64)),
        Err(Error::ErrSegTooLong)
    );
}

#[test]
fn test_parse_a_record() {
    let mut msg = b"\x04host\x05local\x00".to_vec();
    let name_len = msg.len();
    msg.extend_from_slice(&[0x00, 0x01, 0x80, 0x01, 0x00, 0x00, 0x00, 0x78, 0x00, 0x04]);
    msg.extend_from_slice(&[192, 168, 1, 10]);

    let mut r = Resource::default();
    let next = r.unpack(&msg, 0, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(next, name_len + 10 + 4);
    assert_eq!(r.header.name.data, "host.local.");
    assert_eq!(r.header.typ, DnsType::A);
    assert_eq!(r.header.class, DnsClass(0x8001));
    assert_eq!(r.header.ttl, 120);
    assert_eq!(r.ipv4(), Some(Ipv4Addr::new(192, 168, 1, 10)));
}

#[test]
fn test_parse_resource_rdata_overrun() {
    // rdlength claims ten bytes, only four follow.
    let msg = [
        0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0A, 10, 0, 0, 1,
    ];
    let mut r = Resource::default();
    assert_eq!(
        r.unpack(&msg, 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrResourceLen)
    );
}

#[test]
fn test_parse_body_outside_rdata() {
    // An A record whose rdlength is too small for the address.
    let msg = [
        0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 10, 0, 0, 1,
    ];
    let mut r = Resource::default();
    assert_eq!(
        r.unpack(&msg, 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrResourceLen)
    );

    // A CNAME whose target runs past its rdata.
    let msg = [
        0x00, 0x00, 0x05, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x03, b'f', b'o',
        b'o', 0x00,
    ];
    let mut r = Resource::default();
    assert_eq!(
        r.unpack(&msg, 0, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrResourceLen)
    );
}

#[test]
fn test_next_record_follows_rdata_length() {
    let mut msg = Header {
        response: true,
        answers: 2,
        ..Default::default()
    }
    .pack(vec![]);
    // Root name, A, IN, ttl 0, rdlength 6 with two trailing bytes.
    msg.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x06]);
    msg.extend_from_slice(&[10, 0, 0, 1, 0xFF, 0xFF]);
    msg.extend_from_slice(&[0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04]);
    msg.extend_from_slice(&[10, 0, 0, 2]);

    let mut m = Message::default();
    m.unpack(&msg, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(m.answers.len(), 2);
    assert_eq!(m.answers[0].ipv4(), Some(Ipv4Addr::new(10, 0, 0, 1)));
    assert_eq!(m.answers[1].ipv4(), Some(Ipv4Addr::new(10, 0, 0, 2)));
}

#[test]
fn test_pack_compresses_repeated_names() {
    let mut m = reply(vec![a_record("host.local", [10, 0, 0, 1])]);
    m.questions.push(Question {
        name: Name::new("host.local").unwrap(),
        typ: DnsType::A,
        class: DNSCLASS_INET,
    });
    let wire = m.pack().unwrap();

    // 12 header bytes, 12 name bytes and 4 type/class bytes precede the answer.
    assert_eq!(&wire[28..30], &[0xC0, 0x0C]);

    let mut decoded = Message::default();
    decoded.unpack(&wire, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(decoded.answers[0].header.name.data, "host.local.");
}

#[test]
fn test_record_kinds_round_trip() {
    let mut m = reply(vec![
        resource(
            "alias.local",
            Box::new(CnameResource {
                cname: Name::new("host.local").unwrap(),
            }),
        ),
        resource(
            "local",
            Box::new(MxResource {
                pref: 10,
                mx: Name::new("mail.local").unwrap(),
            }),
        ),
        resource(
            "host.local",
            Box::new(HinfoResource {
                cpu: "arm".to_owned(),
                os: "none".to_owned(),
            }),
        ),
        resource(
            "host.local",
            Box::new(TxtResource {
                txt: vec!["path=/".to_owned(), "v=1".to_owned()],
            }),
        ),
        resource(
            "host.local",
            Box::new(OpaqueResource {
                typ: DnsType::Aaaa,
                data: vec![0xFE, 0x80, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            }),
        ),
        a_record("host.local", [192, 168, 0, 7]),
    ]);
    m.authorities.push(resource(
        "local",
        Box::new(SoaResource {
            ns: Name::new("ns.local").unwrap(),
            mbox: Name::new("admin.local").unwrap(),
            serial: 7,
            refresh: 3600,
            retry: 600,
            expire: 86400,
            min_ttl: 60,
        }),
    ));
    m.additionals.push(resource(
        "local",
        Box::new(NsResource {
            ns: Name::new("ns.local").unwrap(),
        }),
    ));
    m.additionals.push(resource(
        "7.0.168.192.in-addr.arpa",
        Box::new(PtrResource {
            ptr: Name::new("host.local").unwrap(),
        }),
    ));
    m.additionals.push(resource(
        "local",
        Box::new(MbResource {
            mb: Name::new("mail.local").unwrap(),
        }),
    ));
    let wire = m.pack().unwrap();

    let mut decoded = Message::default();
    decoded.unpack(&wire, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(decoded.header.answers, 6);
    assert_eq!(decoded.header.authorities, 1);
    assert_eq!(decoded.header.additionals, 3);

    assert_eq!(
        body::<CnameResource>(&decoded.answers[0]).cname.data,
        "host.local."
    );
    let mx = body::<MxResource>(&decoded.answers[1]);
    assert_eq!(mx.pref, 10);
    assert_eq!(mx.mx.data, "mail.local.");
    let hinfo = body::<HinfoResource>(&decoded.answers[2]);
    assert_eq!((hinfo.cpu.as_str(), hinfo.os.as_str()), ("arm", "none"));
    assert_eq!(
        body::<TxtResource>(&decoded.answers[3]).txt,
        vec!["path=/".to_owned(), "v=1".to_owned()]
    );
    let opaque = body::<OpaqueResource>(&decoded.answers[4]);
    assert_eq!(opaque.typ, DnsType::Aaaa);
    assert_eq!(opaque.data.len(), 16);
    assert_eq!(
        decoded.answers[5].ipv4(),
        Some(Ipv4Addr::new(192, 168, 0, 7))
    );

    let soa = body::<SoaResource>(&decoded.authorities[0]);
    assert_eq!(soa.mbox.data, "admin.local.");
    assert_eq!(soa.min_ttl, 60);
    assert_eq!(
        body::<NsResource>(&decoded.additionals[0]).ns.data,
        "ns.local."
    );
    assert_eq!(
        body::<PtrResource>(&decoded.additionals[1]).ptr.data,
        "host.local."
    );
    assert_eq!(
        body::<MbResource>(&decoded.additionals[2]).mb.data,
        "mail.local."
    );

    let r = Reply::parse(&wire, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(r.address, Some(Ipv4Addr::new(192, 168, 0, 7)));
}

#[test]
fn test_parser_section_order() {
    let mut m = reply(vec![a_record("host.local", [10, 0, 0, 1])]);
    m.questions.push(Question {
        name: Name::new("host.local").unwrap(),
        typ: DnsType::A,
        class: DNSCLASS_INET,
    });
    let wire = m.pack().unwrap();

    let mut p = Parser::new(DEFAULT_MAX_NAME_LEN);
    assert_eq!(p.answer().err(), Some(Error::ErrNotStarted));

    let header = p.start(&wire).unwrap();
    assert!(header.response);
    assert_eq!(p.answer().err(), Some(Error::ErrNotStarted));

    p.skip_all_questions().unwrap();
    assert_eq!(p.question().err(), Some(Error::ErrSectionDone));

    let answer = p.answer().unwrap();
    assert_eq!(answer.ipv4(), Some(Ipv4Addr::new(10, 0, 0, 1)));
    assert_eq!(p.answer().err(), Some(Error::ErrSectionDone));
    assert!(p.all_authorities().unwrap().is_empty());
    assert!(p.all_additionals().unwrap().is_empty());
    assert_eq!(p.offset(), wire.len());
}

#[test]
fn test_parser_skips_every_section() {
    let mut m = reply(vec![
        a_record("host.local", [10, 0, 0, 1]),
        a_record("host.local", [10, 0, 0, 2]),
        a_record("host.local", [10, 0, 0, 3]),
    ]);
    m.questions.push(Question {
        name: Name::new("host.local").unwrap(),
        typ: DnsType::A,
        class: DNSCLASS_INET,
    });
    m.authorities.push(resource(
        "local",
        Box::new(NsResource {
            ns: Name::new("ns.local").unwrap(),
        }),
    ));
    m.additionals.push(a_record("ns.local", [10, 0, 0, 53]));
    let wire = m.pack().unwrap();

    // Skip everything without decoding a single body.
    let mut p = Parser::new(DEFAULT_MAX_NAME_LEN);
    p.start(&wire).unwrap();
    p.skip_all_questions().unwrap();
    let answers_off = p.offset();
    p.skip_answer().unwrap();
    let second_answer_off = p.offset();
    assert_eq!(
        second_answer_off,
        Resource::skip(&wire, answers_off).unwrap()
    );
    p.skip_all_answers().unwrap();
    assert_eq!(p.skip_answer(), Err(Error::ErrSectionDone));
    p.skip_all_authorities().unwrap();
    p.skip_all_additionals().unwrap();
    assert_eq!(p.offset(), wire.len());

    // The same walk with full decoding ends at the same offsets.
    let mut p = Parser::new(DEFAULT_MAX_NAME_LEN);
    p.start(&wire).unwrap();
    assert_eq!(p.all_questions().unwrap().len(), 1);
    assert_eq!(p.offset(), answers_off);
    p.answer().unwrap();
    assert_eq!(p.offset(), second_answer_off);
    assert_eq!(p.all_answers().unwrap().len(), 2);

    let authority = p.authority().unwrap();
    assert_eq!(
        body::<NsResource>(&authority).ns.data,
        "ns.local."
    );
    assert_eq!(p.authority().err(), Some(Error::ErrSectionDone));

    let additional = p.additional().unwrap();
    assert_eq!(additional.ipv4(), Some(Ipv4Addr::new(10, 0, 0, 53)));
    assert_eq!(p.additional().err(), Some(Error::ErrSectionDone));
    assert_eq!(p.offset(), wire.len());
}

#[test]
fn test_unknown_type_keeps_its_value() {
    let mut wire = Header {
        response: true,
        authoritative: true,
        additionals: 1,
        ..Default::default()
    }
    .pack(vec![]);
    // An NSEC (47) record, which has no dedicated handler.
    wire.extend_from_slice(b"\x04host\x05local\x00");
    wire.extend_from_slice(&[0x00, 0x2F, 0x00, 0x01, 0x00, 0x00, 0x00, 0x78, 0x00, 0x02]);
    wire.extend_from_slice(&[0xAB, 0xCD]);

    let mut m = Message::default();
    m.unpack(&wire, DEFAULT_MAX_NAME_LEN).unwrap();
    let record = &m.additionals[0];
    assert_eq!(record.header.typ, DnsType::Unknown(47));
    let opaque = body::<OpaqueResource>(record);
    assert_eq!(opaque.typ, DnsType::Unknown(47));
    assert_eq!(opaque.data, vec![0xAB, 0xCD]);

    assert_eq!(m.pack().unwrap(), wire);
}

#[test]
fn test_reply_first_a_record_wins() {
    let wire = reply(vec![
        resource(
            "alias.local",
            Box::new(CnameResource {
                cname: Name::new("host.local").unwrap(),
            }),
        ),
        a_record("host.local", [10, 0, 0, 1]),
        a_record("host.local", [10, 0, 0, 2]),
    ])
    .pack()
    .unwrap();

    let r = Reply::parse(&wire, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(r.header.rcode, RCode::Success);
    assert_eq!(r.address, Some(Ipv4Addr::new(10, 0, 0, 1)));
}

#[test]
fn test_reply_without_address() {
    let mut m = reply(vec![]);
    m.header.rcode = RCode::NameError;
    let wire = m.pack().unwrap();

    let r = Reply::parse(&wire, DEFAULT_MAX_NAME_LEN).unwrap();
    assert_eq!(r.header.rcode, RCode::NameError);
    assert_eq!(r.address, None);
}

#[test]
fn test_reply_malformed_additional() {
    let mut wire = reply(vec![a_record("host.local", [10, 0, 0, 1])])
        .pack()
        .unwrap();
    // Announce an additional record that is not there.
    wire[11] = 1;
    assert_eq!(
        Reply::parse(&wire, DEFAULT_MAX_NAME_LEN),
        Err(Error::ErrBaseLen)
    );
}

#[test]
fn test_display() {
    assert_eq!(DnsType::A.to_string(), "A");
    assert_eq!(DnsType::from(0), DnsType::Unsupported);
    assert_eq!(DnsType::from(99), DnsType::Unknown(99));
    assert_eq!(DnsType::Unknown(99).to_string(), "TYPE99");
    assert_eq!(u16::from(DnsType::Unknown(47)), 47);
    assert_eq!(u16::from(DnsType::Aaaa), 28);
    assert_eq!(DnsClass(0x8001).to_string(), "ClassINET|QU");
    assert_eq!(RCode::from(3).to_string(), "RCodeNameError");
    assert_eq!(
        AResource { a: [10, 0, 0, 1] }.to_string(),
        "dnsmessage.AResource{A: 10.0.0.1}"
    );
}
