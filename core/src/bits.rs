//! Text <-> bitstream conversion
//!
//! A bitstream is a `String` of `'0'`/`'1'` characters, eight per input
//! character, most significant bit first.

pub const BITS_PER_CHAR: usize = 8;

/// Encode text as 8-bit MSB-first groups.
///
/// Characters beyond U+00FF do not fit in one byte and are sent as `'?'`.
pub fn text_to_bits(text: &str) -> String {
    let mut bits = String::with_capacity(text.len() * BITS_PER_CHAR);
    for ch in text.chars() {
        let code = u8::try_from(u32::from(ch)).unwrap_or(b'?');
        for shift in (0..BITS_PER_CHAR).rev() {
            bits.push(if (code >> shift) & 1 == 1 { '1' } else { '0' });
        }
    }
    bits
}

/// Decode 8-bit groups back into text.
///
/// Trailing bits that do not fill a whole group are dropped. Control codes
/// (0-31, 127-159) are treated as padding and produce nothing; a group that
/// is not valid binary turns into `'?'`.
pub fn bits_to_text(bits: &str) -> String {
    let bytes = bits.as_bytes();
    let dropped = bytes.len() % BITS_PER_CHAR;
    if dropped != 0 {
        log::debug!("Dropping {} trailing bits that do not form a full byte", dropped);
    }

    let groups = bytes.chunks_exact(BITS_PER_CHAR);
    log::debug!("Converting {} bytes to text", groups.len());

    let mut text = String::with_capacity(groups.len());
    for group in groups {
        match parse_group(group) {
            Some(code) if is_padding(code) => {}
            Some(code) => text.push(char::from(code)),
            None => text.push('?'),
        }
    }
    text
}

fn parse_group(group: &[u8]) -> Option<u8> {
    group.iter().try_fold(0u8, |acc, &bit| match bit {
        b'0' => Some(acc << 1),
        b'1' => Some((acc << 1) | 1),
        _ => None,
    })
}

fn is_padding(code: u8) -> bool {
    code < 32 || (127..160).contains(&code)
}
