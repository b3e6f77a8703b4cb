//! The fixed literal table shared by encoder and decoder.
use crate::Code;

/// The lowest byte, and code, of the printable range.
pub const FIRST_PRINTABLE: u8 = 32;
/// The highest byte, and code, of the printable range.
pub const LAST_PRINTABLE: u8 = 127;

pub const LINE_FEED: Code = 128;
pub const TAB: Code = 129;
pub const CARRIAGE_RETURN: Code = 130;
pub const CRLF: Code = 131;

/// The first code handed out for a learned pattern.
pub const FIRST_FREE_CODE: Code = 132;

/// The number of seeded entries.
pub const SEED_LEN: usize = (LAST_PRINTABLE - FIRST_PRINTABLE) as usize + 1 + 4;

static SPECIALS: [(&[u8], Code); 4] = [
    (b"\n" as &[u8], LINE_FEED),
    (b"\t" as &[u8], TAB),
    (b"\r" as &[u8], CARRIAGE_RETURN),
    (b"\r\n" as &[u8], CRLF),
];

/// The single byte literal code of `byte`, if it has one.
pub fn code_of(byte: u8) -> Option<Code> {
    match byte {
        FIRST_PRINTABLE..=LAST_PRINTABLE => Some(Code::from(byte)),
        b'\n' => Some(LINE_FEED),
        b'\t' => Some(TAB),
        b'\r' => Some(CARRIAGE_RETURN),
        _ => None,
    }
}

/// Whether `byte` may appear in encoder input.
pub fn is_supported(byte: u8) -> bool {
    code_of(byte).is_some()
}

/// All seeded `(pattern, code)` pairs, in ascending code order.
pub fn seeds() -> impl Iterator<Item = (&'static [u8], Code)> {
    static PRINTABLE: [u8; 96] = {
        let mut table = [0; 96];
        let mut i = 0;
        while i < table.len() {
            table[i] = FIRST_PRINTABLE + i as u8;
            i += 1;
        }
        table
    };

    PRINTABLE
        .chunks(1)
        .map(|ch| (ch, Code::from(ch[0])))
        .chain(SPECIALS.iter().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_cover_the_literal_range() {
        let seeds: Vec<_> = seeds().collect();
        assert_eq!(seeds.len(), SEED_LEN);
        assert_eq!(seeds[0], (&b" "[..], 32));
        assert_eq!(seeds[95], (&[127u8][..], 127));
        assert_eq!(seeds[99], (&b"\r\n"[..], CRLF));

        let codes: Vec<_> = seeds.iter().map(|&(_, code)| code).collect();
        let expected: Vec<_> = (32..FIRST_FREE_CODE).collect();
        assert_eq!(codes, expected);
    }

    #[test]
    fn unsupported_bytes() {
        assert!(!is_supported(0));
        assert!(!is_supported(31));
        assert!(!is_supported(128));
        assert!(!is_supported(0xff));
        assert_eq!(code_of(b'A'), Some(65));
        assert_eq!(code_of(b'\t'), Some(TAB));
    }
}
