//! Repetition code over bitstreams
//!
//! The transmitter repeats every bit `redundancy` times. The receiver
//! collapses each group of `redundancy` raw bits back into one bit by
//! majority vote. With the default redundancy of 1 both directions are
//! the identity.

/// Repeat each bit `redundancy` times (values below 1 behave like 1)
pub fn expand(bits: &str, redundancy: usize) -> String {
    let redundancy = redundancy.max(1);
    if redundancy == 1 {
        return bits.to_string();
    }

    let mut expanded = String::with_capacity(bits.len() * redundancy);
    for bit in bits.chars() {
        for _ in 0..redundancy {
            expanded.push(bit);
        }
    }
    expanded
}

/// Collapse groups of `redundancy` raw bits by majority vote.
///
/// A tied vote (even redundancy) resolves to `'1'`, matching the tie-break
/// the demodulator uses for individual bits. Raw bits that do not fill a
/// whole group are dropped.
pub fn reduce(raw: &str, redundancy: usize) -> String {
    let redundancy = redundancy.max(1);
    if redundancy == 1 {
        return raw.to_string();
    }

    let groups = raw.as_bytes().chunks_exact(redundancy);
    let leftover = groups.remainder().len();
    if leftover != 0 {
        log::debug!("Dropping {} raw bits that do not fill an FEC group", leftover);
    }

    groups
        .map(|group| {
            let ones = group.iter().filter(|&&b| b == b'1').count();
            if ones * 2 >= redundancy {
                '1'
            } else {
                '0'
            }
        })
        .collect()
}
