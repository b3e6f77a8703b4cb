use lzwchain::{decode::Decoder, encode::Encoder, LzwStatus};

const TEXT: &[u8] = b"It was the best of times, it was the worst of times,\r\n\
    it was the age of wisdom, it was the age of foolishness,\n\
    \tit was the epoch of belief, it was the epoch of incredulity,\r\
    it was the season of Light, it was the season of Darkness.";

fn encode_chunked(data: &[u8], in_chunk: usize, out_len: usize) -> Vec<u8> {
    let mut encoder = Encoder::new();
    let mut target = vec![0; out_len];
    let mut input = data;
    let mut out = vec![];

    loop {
        if input.is_empty() {
            encoder.finish();
        }

        let chunk = &input[..in_chunk.min(input.len())];
        let result = encoder.encode_bytes(chunk, &mut target);
        input = &input[result.consumed_in..];
        out.extend_from_slice(&target[..result.consumed_out]);

        match result.status {
            Ok(LzwStatus::Done) => break,
            Ok(LzwStatus::Ok) => {}
            other => panic!("{} {}: {:?}", in_chunk, out_len, other),
        }
    }

    out
}

fn decode_chunked(data: &[u8], in_chunk: usize, out_len: usize) -> Vec<u8> {
    let mut decoder = Decoder::new();
    let mut target = vec![0; out_len];
    let mut input = data;
    let mut out = vec![];

    loop {
        if input.is_empty() {
            decoder.finish();
        }

        let chunk = &input[..in_chunk.min(input.len())];
        let result = decoder.decode_bytes(chunk, &mut target);
        input = &input[result.consumed_in..];
        out.extend_from_slice(&target[..result.consumed_out]);

        match result.status {
            Ok(LzwStatus::Done) => break,
            Ok(LzwStatus::Ok) => {}
            other => panic!("{} {}: {:?}", in_chunk, out_len, other),
        }
    }

    out
}

#[test]
fn encode_with_small_buffers() {
    let mut reference = vec![];
    Encoder::new()
        .into_stream(&mut reference)
        .encode_all(TEXT)
        .status
        .unwrap();

    for &in_chunk in &[1, 3, 7, 64, TEXT.len()] {
        for &out_len in &[4, 5, 9, 4096] {
            let out = encode_chunked(TEXT, in_chunk, out_len);
            assert!(out == reference, "{} {}", in_chunk, out_len);
        }
    }
}

#[test]
fn decode_with_small_buffers() {
    let codes = encode_chunked(TEXT, TEXT.len(), 4096);

    for &in_chunk in &[1, 2, 3, 5, 4, 64, codes.len()] {
        for &out_len in &[1, 2, 7, 4096] {
            let out = decode_chunked(&codes, in_chunk, out_len);
            assert!(out == TEXT, "{} {}", in_chunk, out_len);
        }
    }
}

#[test]
fn decode_without_finish_keeps_partial_code() {
    let codes = encode_chunked(b"ABABABA", 7, 64);
    let (head, tail) = codes.split_at(6);

    let mut decoder = Decoder::new();
    let mut out = vec![];
    let result = decoder.into_stream(&mut out).decode(head);
    assert!(result.status.is_ok(), "{:?}", result.status);
    assert_eq!(out, b"A");

    let result = decoder.into_stream(&mut out).decode_all(tail);
    assert!(result.status.is_ok(), "{:?}", result.status);
    assert_eq!(out, b"ABABABA");
}
