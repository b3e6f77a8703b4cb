#![no_main]
use libfuzzer_sys::fuzz_target;
use lzwchain::{decode, encode, literal};

fuzz_target!(|data: &[u8]| {
    let data: Vec<u8> = data.iter().copied().filter(|&b| literal::is_supported(b)).collect();
    let mut encoder = encode::Encoder::new();
    let mut buffer = Vec::with_capacity(4*data.len() + 4);
    let result = encoder.into_stream(&mut buffer).encode_all(data.as_slice());
    assert!(result.status.is_ok(), "{:?}", result.status);

    let mut decoder = decode::Decoder::new();
    let mut compare = vec![];
    let result = decoder.into_stream(&mut compare).decode_all(buffer.as_slice());
    assert!(result.status.is_ok(), "{:?}", result.status);
    assert!(data == compare);
});
