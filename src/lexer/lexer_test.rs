use std::iter::Iterator;

use super::*;

#[test]
fn test_decode() -> Result<()> {
    let line = Line::new(1, "a=rtcp:9 IN IP4 0.0.0.0");
    let [port, network_type, address_type, address] = line.decode("a=rtcp:%s %s %s %s")?;
    assert_eq!(port, "9");
    assert_eq!(network_type, "IN");
    assert_eq!(address_type, "IP4");
    assert_eq!(address, "0.0.0.0");

    let line = Line::new(1, "t=0   0");
    let [start, stop] = line.decode("t=%d %d")?;
    assert_eq!((start, stop), ("0", "0"));

    // Trailing input is left unread.
    let line = Line::new(1, "a=sctpmap:5000 webrtc-datachannel 1024");
    let [number, app] = line.decode("a=sctpmap:%d %s")?;
    assert_eq!((number, app), ("5000", "webrtc-datachannel"));

    Ok(())
}

#[test]
fn test_decode_failure() {
    let tests = [
        ("v=x", "v=%d"),
        ("a=mid:", "a=mid:%s"),
        ("a=setup:actpass", "a=tls-id:%s"),
        ("t=0", "t=%d %d"),
        ("a=max-message-size:-", "a=max-message-size:%d"),
    ];

    for (i, (text, pattern)) in tests.iter().enumerate() {
        let line = Line::new(7, text);
        let result: Result<[&str; 1]> = line.decode(pattern);
        match result {
            Err(Error::LineFormat { pattern: p, line: l }) => {
                assert_eq!(&p, pattern, "{i}");
                assert_eq!(&l, text, "{i}");
            }
            other => panic!("{i}: expected LineFormat, got {other:?}"),
        }
    }
}

#[test]
fn test_decode_if_has() -> Result<()> {
    let line = Line::new(1, "a=mid:audio");
    assert!(line.decode_if_has::<1>("a=msid:", "a=msid:%s").is_none());

    let decoded = line.decode_if_has::<1>("a=mid:", "a=mid:%s");
    assert_eq!(decoded, Some(Ok(["audio"])));

    let line = Line::new(1, "a=mid: ");
    let decoded = line.decode_if_has::<1>("a=mid:", "a=mid:%s");
    assert!(matches!(decoded, Some(Err(Error::LineFormat { .. }))));

    Ok(())
}

#[test]
fn test_split_lines() {
    let text = "v=0\r\n  o=- 1 1 IN IP4 127.0.0.1 \r\n\r\n\ts=-\nt=0 0";
    let lines = split_lines(text);
    let actual: Vec<(usize, &str)> = lines.iter().map(|l| (l.number(), l.as_str())).collect();
    assert_eq!(
        actual,
        vec![
            (1, "v=0"),
            (2, "o=- 1 1 IN IP4 127.0.0.1"),
            (4, "s=-"),
            (5, "t=0 0"),
        ]
    );
}

#[test]
fn test_append() -> fmt::Result {
    let mut out = String::new();
    append(&mut out, "", format_args!("a=mid:{}{END_LINE}", ""))?;
    append(&mut out, &false, format_args!("a=rtcp-mux{END_LINE}"))?;
    append(&mut out, &None::<u32>, format_args!("a=sctp-port:{END_LINE}"))?;
    assert_eq!(out, "");

    append(&mut out, "0", format_args!("a=mid:{}{END_LINE}", "0"))?;
    write_flag(&mut out, "a=rtcp-mux", true)?;
    write_key_value(&mut out, "a=ice-ufrag:", "")?;
    write_key_value(&mut out, "a=ice-pwd:", "secret")?;
    write_key_slice_of_values(&mut out, "a=group:BUNDLE ", &["0", "", "1"])?;
    write_key_slice_of_values(&mut out, "a=group:LS ", &["", ""])?;
    assert_eq!(
        out,
        "a=mid:0\r\na=rtcp-mux\r\na=ice-pwd:secret\r\na=group:BUNDLE 0 1\r\n"
    );

    Ok(())
}
