use crate::error::LsbError;

/// A packed DNA sequence, two bits per symbol, first symbol in the most
/// significant occupied position.
pub type Kmer = u64;

/// Set on keys that hold a (k-1)-mer instead of a k-mer.
pub const SHORT_FLAG: Kmer = 1 << 63;

/// Longest sequence whose packed form leaves [`SHORT_FLAG`] free.
pub const MAX_K: usize = 31;

const SYMBOLS: [char; 4] = ['A', 'C', 'G', 'T'];

/// Packs `sequence` MSB-first with `A=0 C=1 G=2 T=3`.
///
/// # Arguments
/// * `sequence` - ASCII nucleotides, at most [`MAX_K`] of them
///
/// # Returns
/// The packed k-mer, [`LsbError::SequenceTooLong`] past [`MAX_K`] symbols, or
/// [`LsbError::InvalidSymbol`] naming the first byte that is not one of `ACGT`
pub fn encode(sequence: &[u8]) -> Result<Kmer, LsbError> {
    if sequence.len() > MAX_K {
        return Err(LsbError::SequenceTooLong {
            length: sequence.len(),
            max: MAX_K,
        });
    }
    sequence
        .iter()
        .enumerate()
        .try_fold(0, |packed, (position, &byte)| {
            let symbol = match byte {
                b'A' => 0,
                b'C' => 1,
                b'G' => 2,
                b'T' => 3,
                _ => {
                    return Err(LsbError::InvalidSymbol {
                        symbol: char::from(byte),
                        position,
                    });
                }
            };
            Ok((packed << 2) | symbol)
        })
}

/// Unpacks the low `k` symbols of `kmer`. The short flag is ignored.
pub fn decode(kmer: Kmer, k: usize) -> String {
    (0..k)
        .rev()
        .map(|position| SYMBOLS[symbol_at(kmer, position) as usize])
        .collect()
}

pub fn is_short(kmer: Kmer) -> bool {
    kmer & SHORT_FLAG != 0
}

/// Symbol at `position`, counted from the least significant end.
pub fn symbol_at(kmer: Kmer, position: usize) -> u64 {
    (kmer >> (position * 2)) & 3
}

/// Mask covering the low `symbols` symbols.
pub fn low_mask(symbols: usize) -> Kmer {
    (1 << (symbols * 2)) - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_packs_msb_first() {
        assert_eq!(encode(b"ACGT").unwrap(), 0b00_01_10_11);
        assert_eq!(encode(b"TA").unwrap(), 0b11_00);
        assert_eq!(encode(b"").unwrap(), 0);
    }

    #[test]
    fn test_encode_rejects_unknown_symbol() {
        let err = encode(b"ACNT").unwrap_err();
        assert!(matches!(
            err,
            LsbError::InvalidSymbol {
                symbol: 'N',
                position: 2
            }
        ));
    }

    #[test]
    fn test_decode_inverts_encode() {
        for text in ["A", "GATTACA", "TTTTTTTTTTTTTTTTTTTTTTTTTTTTTTT"] {
            let kmer = encode(text.as_bytes()).unwrap();
            assert_eq!(decode(kmer, text.len()), text);
        }
    }

    #[test]
    fn test_decode_ignores_short_flag() {
        let kmer = encode(b"CAT").unwrap() | SHORT_FLAG;
        assert!(is_short(kmer));
        assert_eq!(decode(kmer, 3), "CAT");
    }

    #[test]
    fn test_symbol_at_counts_from_low_end() {
        let kmer = encode(b"ACGT").unwrap();
        let symbols: Vec<u64> = (0..4).map(|p| symbol_at(kmer, p)).collect();
        assert_eq!(symbols, vec![3, 2, 1, 0]);
    }

    #[test]
    fn test_low_mask() {
        assert_eq!(low_mask(0), 0);
        assert_eq!(low_mask(2), 0b1111);
        assert_eq!(low_mask(MAX_K), (1 << 62) - 1);
    }

    #[test]
    fn test_encode_rejects_too_long() {
        let result = encode(&[b'A'; MAX_K + 1]);
        assert!(matches!(
            result,
            Err(LsbError::SequenceTooLong { length: 32, max: MAX_K })
        ));
        assert!(encode(&[b'A'; MAX_K]).is_ok());
    }
}
