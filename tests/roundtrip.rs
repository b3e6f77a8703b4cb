use lzwchain::{decode::Decoder, encode::Encoder, literal};

#[test]
fn roundtrip_all() {
    for (name, data) in corpora() {
        assert_roundtrips(name, &data);
    }
}

#[test]
fn roundtrip_random_text() {
    let rng = fastrand::Rng::with_seed(0x5eed);
    let alphabet: Vec<u8> = (0..=255u8).filter(|&b| literal::is_supported(b)).collect();
    assert_eq!(alphabet.len(), 99);

    for &len in &[1usize, 2, 3, 17, 1000, 100_000] {
        let data: Vec<u8> = (0..len)
            .map(|_| alphabet[rng.usize(..alphabet.len())])
            .collect();
        assert_roundtrips("random", &data);
    }
}

#[test]
fn roundtrip_small_alphabet() {
    let rng = fastrand::Rng::with_seed(7);
    let alphabet = b"ab\r\n";

    for _ in 0..50 {
        let len = rng.usize(0..400);
        let data: Vec<u8> = (0..len).map(|_| alphabet[rng.usize(..4)]).collect();
        assert_roundtrips("small alphabet", &data);
    }
}

#[test]
fn roundtrip_through_rehashes() {
    let rng = fastrand::Rng::with_seed(42);
    let data: Vec<u8> = (0..60_000).map(|_| b'a' + rng.u8(..26)).collect();

    let mut encoder = Encoder::new();
    let mut buffer = vec![];
    encoder
        .into_stream(&mut buffer)
        .encode_all(data.as_slice())
        .status
        .unwrap();
    assert!(encoder.rehashes() > 0);

    let mut decoder = Decoder::new();
    let mut compare = vec![];
    decoder
        .into_stream(&mut compare)
        .decode_all(buffer.as_slice())
        .status
        .unwrap();
    assert!(data == compare);
}

fn corpora() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("empty", vec![]),
        ("single", b"x".to_vec()),
        ("lib.rs", include_bytes!("../src/lib.rs").to_vec()),
        ("dictionary.rs", include_bytes!("../src/dictionary.rs").to_vec()),
        ("Cargo.toml", include_bytes!("../Cargo.toml").to_vec()),
        ("run", b"a".repeat(10_000)),
        (
            "newlines",
            b"line one\r\nline two\rline three\n\tindented\r\n\r\n".repeat(50),
        ),
        ("tobeornot", b"TOBEORNOTTOBEORTOBEORNOT".to_vec()),
        ("delete", vec![127; 300]),
    ]
}

fn assert_roundtrips(name: &str, data: &[u8]) {
    let mut encoder = Encoder::for_input_len(data.len() as u64);
    let mut buffer = Vec::with_capacity(4 * data.len() + 4);
    let result = encoder.into_stream(&mut buffer).encode_all(data);
    assert!(result.status.is_ok(), "{}: {:?}", name, result.status);
    assert_eq!(result.bytes_read, data.len(), "{}", name);
    assert_eq!(result.bytes_written, buffer.len(), "{}", name);

    let mut decoder = Decoder::new();
    let mut compare = vec![];
    let result = decoder.into_stream(&mut compare).decode_all(buffer.as_slice());
    assert!(result.status.is_ok(), "{}: {:?}", name, result.status);
    assert_eq!(result.bytes_read, buffer.len(), "{}", name);
    assert!(data == &*compare, "{}", name);
    assert_eq!(decoder.entries(), encoder.entries(), "{}", name);
    assert_eq!(decoder.next_code(), encoder.next_code(), "{}", name);
}
