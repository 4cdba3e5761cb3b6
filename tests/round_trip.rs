use sdp_codec::description::common::MediaKind;
use sdp_codec::ice::HostType;
use sdp_codec::{Error, Media, RecordKind, Result, Session};

const CHROME_OFFER: &str = "v=0\r\n\
o=- 4611731400430051336 2 IN IP4 127.0.0.1\r\n\
s=-\r\n\
t=0 0\r\n\
a=group:BUNDLE 0 1 2\r\n\
a=msid-semantic: WMS d4CjVgGfYTSSBBRvhwpj6fDX45NDPwQpQosZ\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 111 103 9 0 8 126\r\n\
c=IN IP4 0.0.0.0\r\n\
a=rtcp:9 IN IP4 0.0.0.0\r\n\
a=ice-ufrag:1eK7W+oSBMWFa8Pe\r\n\
a=ice-pwd:V7nbdVnnGGW0F+ZQfiz9841Z\r\n\
a=ice-options:trickle\r\n\
a=fingerprint:sha-256 94:42:B8:B8:BA:B4:52:3D:33:0F:8E:D0:7A:E7:35:2E:2A:70:08:C3:0F:1D:CA:0B:3A:93:E5:C0:EF:86:F3:14\r\n\
a=setup:actpass\r\n\
a=mid:0\r\n\
a=extmap:1 urn:ietf:params:rtp-hdrext:ssrc-audio-level\r\n\
a=extmap:2 http://www.webrtc.org/experiments/rtp-hdrext/abs-send-time\r\n\
a=sendrecv\r\n\
a=rtcp-mux\r\n\
a=rtpmap:111 opus/48000/2\r\n\
a=rtcp-fb:111 transport-cc\r\n\
a=fmtp:111 minptime=10;useinbandfec=1\r\n\
a=rtpmap:103 ISAC/16000\r\n\
a=rtpmap:9 G722/8000\r\n\
a=rtpmap:0 PCMU/8000\r\n\
a=rtpmap:8 PCMA/8000\r\n\
a=rtpmap:126 telephone-event/8000\r\n\
a=maxptime:60\r\n\
a=ssrc:65275558 cname:+0VBE2jiQiCaYE/E\r\n\
a=ssrc:65275558 msid:d4CjVgGfYTSSBBRvhwpj6fDX45NDPwQpQosZ fdfe23cd-ad58-4029-8011-126b1c245296\r\n\
a=ssrc:65275558 mslabel:d4CjVgGfYTSSBBRvhwpj6fDX45NDPwQpQosZ\r\n\
a=ssrc:65275558 label:fdfe23cd-ad58-4029-8011-126b1c245296\r\n\
a=candidate:1467250027 1 udp 2122260223 192.168.0.196 46243 typ host generation 0\r\n\
a=candidate:435653019 1 tcp 1845501695 192.168.0.196 9 typ host tcptype active generation 0\r\n\
a=candidate:1853887674 1 udp 1518280447 47.61.61.61 36768 typ srflx raddr 192.168.0.196 rport 36768 generation 0\r\n\
a=candidate:750991856 1 udp 25108223 237.30.30.30 58779 typ relay raddr 47.61.61.61 rport 54761 generation 0\r\n\
m=video 9 UDP/TLS/RTP/SAVPF 96 97 98\r\n\
c=IN IP4 0.0.0.0\r\n\
a=rtcp:9 IN IP4 0.0.0.0\r\n\
a=ice-ufrag:1eK7W+oSBMWFa8Pe\r\n\
a=ice-pwd:V7nbdVnnGGW0F+ZQfiz9841Z\r\n\
a=ice-options:trickle\r\n\
a=fingerprint:sha-256 94:42:B8:B8:BA:B4:52:3D:33:0F:8E:D0:7A:E7:35:2E:2A:70:08:C3:0F:1D:CA:0B:3A:93:E5:C0:EF:86:F3:14\r\n\
a=setup:actpass\r\n\
a=mid:1\r\n\
a=extmap:3 urn:ietf:params:rtp-hdrext:toffset\r\n\
a=sendrecv\r\n\
a=rtcp-mux\r\n\
a=rtcp-rsize\r\n\
a=rtpmap:96 VP8/90000\r\n\
a=rtcp-fb:96 goog-remb\r\n\
a=rtcp-fb:96 transport-cc\r\n\
a=rtcp-fb:96 ccm fir\r\n\
a=rtcp-fb:96 nack\r\n\
a=rtcp-fb:96 nack pli\r\n\
a=rtpmap:97 rtx/90000\r\n\
a=fmtp:97 apt=96\r\n\
a=rtpmap:98 VP9/90000\r\n\
a=fmtp:98 profile-id=0\r\n\
a=ssrc-group:FID 190423554 2231627014\r\n\
a=ssrc:190423554 cname:+0VBE2jiQiCaYE/E\r\n\
a=ssrc:190423554 msid:d4CjVgGfYTSSBBRvhwpj6fDX45NDPwQpQosZ 40f7cb5c-5e4a-4e2f-9a3c-1b1d5e55f6c1\r\n\
a=ssrc:190423554 mslabel:d4CjVgGfYTSSBBRvhwpj6fDX45NDPwQpQosZ\r\n\
a=ssrc:190423554 label:40f7cb5c-5e4a-4e2f-9a3c-1b1d5e55f6c1\r\n\
a=ssrc:2231627014 cname:+0VBE2jiQiCaYE/E\r\n\
a=ssrc:2231627014 msid:d4CjVgGfYTSSBBRvhwpj6fDX45NDPwQpQosZ 40f7cb5c-5e4a-4e2f-9a3c-1b1d5e55f6c1\r\n\
a=ssrc:2231627014 mslabel:d4CjVgGfYTSSBBRvhwpj6fDX45NDPwQpQosZ\r\n\
a=ssrc:2231627014 label:40f7cb5c-5e4a-4e2f-9a3c-1b1d5e55f6c1\r\n\
m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n\
c=IN IP4 0.0.0.0\r\n\
a=ice-ufrag:1eK7W+oSBMWFa8Pe\r\n\
a=ice-pwd:V7nbdVnnGGW0F+ZQfiz9841Z\r\n\
a=ice-options:trickle\r\n\
a=fingerprint:sha-256 94:42:B8:B8:BA:B4:52:3D:33:0F:8E:D0:7A:E7:35:2E:2A:70:08:C3:0F:1D:CA:0B:3A:93:E5:C0:EF:86:F3:14\r\n\
a=setup:actpass\r\n\
a=mid:2\r\n\
a=sctp-port:5000\r\n\
a=max-message-size:262144\r\n";

const FIREFOX_OFFER: &str = "v=0\r\n\
o=mozilla...THIS_IS_SDPARTA-99.0 5089983916539446380 0 IN IP4 0.0.0.0\r\n\
s=-\r\n\
t=0 0\r\n\
a=fingerprint:sha-256 5E:6C:0A:52:13:A8:16:9A:2E:0F:4C:7B:6F:4E:C4:18:D7:4A:19:73:8F:AB:0A:1F:2D:01:50:B5:AC:63:14:0C\r\n\
a=group:BUNDLE 0 1\r\n\
a=ice-options:trickle\r\n\
a=msid-semantic:WMS *\r\n\
m=audio 9 UDP/TLS/RTP/SAVPF 109 9 0 8 101\r\n\
c=IN IP4 0.0.0.0\r\n\
a=sendrecv\r\n\
a=extmap:1 urn:ietf:params:rtp-hdrext:ssrc-audio-level\r\n\
a=extmap:2/recvonly urn:ietf:params:rtp-hdrext:csrc-audio-level\r\n\
a=fmtp:109 maxplaybackrate=48000;stereo=1;useinbandfec=1\r\n\
a=fmtp:101 0-15\r\n\
a=ice-pwd:c40fc5e5d0d6a6a7b5b7a1e8c2e0a5b3\r\n\
a=ice-ufrag:a7b2d0cc\r\n\
a=mid:0\r\n\
a=msid:{0a2b7c4e-1f2d-4c5e-9a8b-7c6d5e4f3a2b} {1b2c3d4e-5f6a-7b8c-9d0e-1f2a3b4c5d6e}\r\n\
a=rtcp-mux\r\n\
a=rtpmap:109 opus/48000/2\r\n\
a=rtpmap:9 G722/8000/1\r\n\
a=rtpmap:0 PCMU/8000\r\n\
a=rtpmap:8 PCMA/8000\r\n\
a=rtpmap:101 telephone-event/8000/1\r\n\
a=setup:actpass\r\n\
a=ssrc:1713418208 cname:{6f2e1a0b-3c4d-4e5f-8a9b-0c1d2e3f4a5b}\r\n\
a=candidate:0 1 UDP 2122252543 4f0b2e4c-7a3d-4b1e-9f2a-6c5d4e3b2a10.local 59466 typ host\r\n\
a=candidate:2 1 TCP 2105524479 4f0b2e4c-7a3d-4b1e-9f2a-6c5d4e3b2a10.local 9 typ host tcptype active\r\n\
a=candidate:1 1 UDP 1686052863 203.0.113.141 59466 typ srflx raddr 0.0.0.0 rport 0\r\n\
a=end-of-candidates\r\n\
m=application 9 UDP/DTLS/SCTP webrtc-datachannel\r\n\
c=IN IP4 0.0.0.0\r\n\
a=sendrecv\r\n\
a=ice-pwd:c40fc5e5d0d6a6a7b5b7a1e8c2e0a5b3\r\n\
a=ice-ufrag:a7b2d0cc\r\n\
a=mid:1\r\n\
a=setup:actpass\r\n\
a=sctp-port:5000\r\n\
a=max-message-size:1073741823\r\n";

fn init_log() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init()
        .ok();
}

fn av(session: &Session, index: usize) -> &sdp_codec::AvMedia {
    match &session.media[index] {
        Media::Av(m) => m,
        other => panic!("media {index} is not audio/video: {other:?}"),
    }
}

#[test]
fn test_double_round_trip() -> Result<()> {
    init_log();

    for (i, offer) in [CHROME_OFFER, FIREFOX_OFFER].iter().enumerate() {
        let first = Session::unmarshal(offer)?;
        let encoded = first.marshal();
        let second = Session::unmarshal(&encoded)?;

        assert_eq!(first, second, "offer {i} changed after a round trip:\n{encoded}");
        assert_eq!(
            encoded,
            second.marshal(),
            "offer {i} encodes differently the second time"
        );
    }

    Ok(())
}

#[test]
fn test_encoded_lines_end_with_crlf() -> Result<()> {
    init_log();

    let encoded = Session::unmarshal(CHROME_OFFER)?.marshal();
    assert!(encoded.ends_with("\r\n"));
    for (i, line) in encoded.split_terminator("\r\n").enumerate() {
        assert!(!line.is_empty(), "line {i} is empty");
        assert!(!line.contains('\n'), "line {i} has a bare LF: {line:?}");
    }

    Ok(())
}

#[test]
fn test_ssrc_group_is_derived() -> Result<()> {
    init_log();

    let session = Session::unmarshal(CHROME_OFFER)?;
    let encoded = session.marshal();

    assert_eq!(encoded.matches("a=ssrc-group:FID").count(), 1);
    assert!(encoded.contains("a=ssrc-group:FID 190423554 2231627014\r\n"));

    let video = av(&session, 1);
    assert_eq!(
        video.base.ssrcs.keys().collect::<Vec<_>>(),
        vec!["190423554", "2231627014"]
    );

    Ok(())
}

#[test]
fn test_firefox_session_level_attributes() -> Result<()> {
    init_log();

    let session = Session::unmarshal(FIREFOX_OFFER)?;

    assert!(session.ice_trickle);
    assert_eq!(session.msid_semantic, "*");
    assert_eq!(session.group_bundle, vec!["0", "1"]);

    for (i, media) in session.media.iter().enumerate() {
        let base = media.base();
        assert_eq!(base.dtls.hash_algorithm, "sha-256", "media {i}");
        assert!(base.dtls.fingerprint.starts_with("5E:6C:0A"), "media {i}");
        assert_eq!(base.ice.options, "trickle", "media {i}");
    }

    let audio = av(&session, 0);
    assert_eq!(
        audio.rtp.keys().collect::<Vec<_>>(),
        vec!["109", "9", "0", "8", "101"]
    );
    assert_eq!(audio.rtp["101"].format_params, "0-15");
    assert_eq!(audio.ext_maps[1].key, "2/recvonly");
    assert!(audio.base.ice.is_complete());

    Ok(())
}

#[test]
fn test_candidate_related_address() -> Result<()> {
    init_log();

    for offer in [CHROME_OFFER, FIREFOX_OFFER] {
        let session = Session::unmarshal(offer)?;
        for media in &session.media {
            for (i, c) in media.base().ice.candidates.iter().enumerate() {
                if c.end_of_candidates {
                    continue;
                }
                match c.host_type {
                    HostType::ServerReflexive | HostType::Relay => {
                        assert!(c.related.is_some(), "candidate {i}: {c}")
                    }
                    HostType::Host => assert!(c.related.is_none(), "candidate {i}: {c}"),
                }
            }
        }
    }

    Ok(())
}

#[test]
fn test_rtpmap_before_or_after_feedback() -> Result<()> {
    init_log();

    let header = "v=0\r\nm=video 9 UDP/TLS/RTP/SAVPF 96\r\n";
    let before = Session::unmarshal(&format!(
        "{header}a=rtpmap:96 VP8/90000\r\na=rtcp-fb:96 nack pli\r\na=rtcp-fb:96 ccm fir\r\n"
    ))?;
    let after = Session::unmarshal(&format!(
        "{header}a=rtcp-fb:96 nack pli\r\na=rtcp-fb:96 ccm fir\r\na=rtpmap:96 VP8/90000\r\n"
    ))?;

    assert_eq!(av(&before, 0).rtp, av(&after, 0).rtp);
    assert_eq!(av(&before, 0).rtp["96"].feedback, vec!["nack pli", "ccm fir"]);

    Ok(())
}

#[test]
fn test_unknown_media_aborts() {
    init_log();

    let text = "v=0\r\n\
                o=- 1 1 IN IP4 127.0.0.1\r\n\
                s=-\r\n\
                t=0 0\r\n\
                m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
                a=mid:0\r\n\
                m=unknown 9 UDP 0\r\n";

    let result = Session::decode(text);
    assert_eq!(result, Err(Error::UnknownMediaType("unknown".to_owned())));
}

#[test]
fn test_missing_ssrc_record() -> Result<()> {
    init_log();

    let text = "v=0\r\n\
                m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
                a=ssrc:111 msid:x y\r\n\
                a=ssrc:111 cname:abc\r\n";

    let decoded = Session::decode(text)?;
    assert_eq!(decoded.errors.len(), 1);
    assert_eq!(decoded.errors[0].line_number, 3);
    assert_eq!(
        decoded.errors[0].error,
        Error::MissingRecord {
            record: RecordKind::Ssrc,
            key: "111".to_owned(),
        }
    );

    // the cname line that follows still creates the record
    let media = av(&decoded.session, 0);
    assert_eq!(media.base.ssrcs["111"].cname, "abc");
    assert_eq!(media.base.ssrcs["111"].msid, "");

    let err = Session::unmarshal(text).err();
    assert!(matches!(err, Some(Error::Decode(_))), "{err:?}");

    Ok(())
}

#[test]
fn test_end_to_end() -> Result<()> {
    init_log();

    let text = "v=0
o=- 1 1 IN IP4 127.0.0.1
s=-
t=0 0
m=audio 9 UDP/TLS/RTP/SAVPF 111
c=IN IP4 0.0.0.0
a=mid:0
a=rtpmap:111 opus/48000/2
a=candidate:1 1 udp 2122260223 192.168.0.1 5000 typ host
";

    let session = Session::unmarshal(text)?;
    assert_eq!(session.media.len(), 1);

    let media = av(&session, 0);
    assert_eq!(media.base.kind, MediaKind::Audio);
    assert_eq!(media.base.port, "9");
    assert_eq!(media.rtp.len(), 1);
    assert_eq!(media.rtp["111"].codec, "opus/48000/2");

    let candidates = &media.base.ice.candidates;
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].host_type, HostType::Host);
    assert_eq!(candidates[0].protocol.to_string(), "udp");
    assert!(candidates[0].related.is_none());

    let encoded = session.marshal();
    for field in [
        "v=0\r\n",
        "o=- 1 1 IN IP4 127.0.0.1\r\n",
        "s=-\r\n",
        "t=0 0\r\n",
        "m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n",
        "c=IN IP4 0.0.0.0\r\n",
        "a=mid:0\r\n",
        "a=rtpmap:111 opus/48000/2\r\n",
        "a=candidate:1 1 udp 2122260223 192.168.0.1 5000 typ host\r\n",
    ] {
        assert!(encoded.contains(field), "missing {field:?} in\n{encoded}");
    }

    assert_eq!(Session::unmarshal(&encoded)?, session);

    let via_str: Session = text.parse()?;
    let via_string = Session::try_from(text.to_owned())?;
    assert_eq!(via_str, via_string);
    assert_eq!(String::from(via_str), encoded);

    Ok(())
}

#[test]
fn test_candidate_after_end_of_candidates() -> Result<()> {
    init_log();

    let text = "v=0\r\n\
                o=- 1 1 IN IP4 127.0.0.1\r\n\
                s=-\r\n\
                t=0 0\r\n\
                m=audio 9 UDP/TLS/RTP/SAVPF 111\r\n\
                a=candidate:1 1 udp 2122260223 192.168.0.1 5000 typ host\r\n\
                a=end-of-candidates\r\n\
                a=candidate:2 1 udp 2122260223 192.168.0.2 5002 typ host\r\n";

    let first = Session::unmarshal(text)?;
    let candidates = &av(&first, 0).base.ice.candidates;
    assert_eq!(candidates.len(), 2);
    assert!(candidates[1].end_of_candidates);

    let second = Session::unmarshal(&first.marshal())?;
    assert_eq!(first, second);

    Ok(())
}

#[test]
fn test_wildcard_feedback_stays_off_media_line() -> Result<()> {
    init_log();

    let text = "v=0\r\n\
                m=video 9 UDP/TLS/RTP/SAVPF 96\r\n\
                a=rtpmap:96 VP8/90000\r\n\
                a=rtcp-fb:* nack\r\n";

    let first = Session::unmarshal(text)?;
    assert_eq!(av(&first, 0).rtp["*"].feedback, vec!["nack"]);

    let encoded = first.marshal();
    assert!(
        encoded.contains("m=video 9 UDP/TLS/RTP/SAVPF 96\r\n"),
        "{encoded}"
    );
    assert!(encoded.contains("a=rtcp-fb:* nack\r\n"), "{encoded}");
    assert_eq!(Session::unmarshal(&encoded)?, first);

    Ok(())
}

#[test]
fn test_missing_origin_round_trip() -> Result<()> {
    init_log();

    let first = Session::unmarshal("v=0\r\ns=-\r\nt=0 0\r\nm=audio 9 RTP/AVP 0\r\n")?;
    let encoded = first.marshal();
    assert!(!encoded.contains("o="), "{encoded}");
    assert_eq!(Session::unmarshal(&encoded)?, first);

    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn test_json_snapshot() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_log();

    let session = Session::unmarshal(FIREFOX_OFFER)?;
    let json = serde_json::to_value(&session)?;

    assert_eq!(json["msid_semantic"], "*");
    assert_eq!(json["media"][0]["Av"]["base"]["kind"], "Audio");
    assert_eq!(
        json["media"][0]["Av"]["rtp"]["109"]["codec"],
        "opus/48000/2"
    );
    assert_eq!(json["media"][1]["DataChannel"]["sctp_port"], 5000);

    // the table keeps first-seen order through serialization
    let keys: Vec<&str> = json["media"][0]["Av"]["rtp"]
        .as_object()
        .map(|m| m.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(keys, vec!["109", "9", "0", "8", "101"]);

    let back: Session = serde_json::from_value(json)?;
    assert_eq!(back, session);

    Ok(())
}
