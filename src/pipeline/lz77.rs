use crate::error::{EcpackError, Result};

/// Default history window in bytes
pub const WINDOW_SIZE: usize = 4096;

/// Default lookahead in bytes
pub const LOOKAHEAD_SIZE: usize = 32;

/// Shortest run worth encoding as a back-reference
pub const MIN_MATCH: usize = 3;

/// Progress is reported whenever the scan position is a multiple of this
const PROGRESS_INTERVAL: usize = 1000;

/// An LZ77 coding unit
///
/// `offset == 0 && length == 0` is a pure literal carried in `next`. Otherwise
/// `length` bytes are copied from `offset` bytes back, then `next` is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub offset: u16,
    pub length: u16,
    pub next: u8,
}

impl Token {
    pub fn literal(next: u8) -> Self {
        Self {
            offset: 0,
            length: 0,
            next,
        }
    }

    pub fn is_literal(&self) -> bool {
        self.offset == 0 && self.length == 0
    }

    /// Number of output bytes this token expands to
    pub fn expanded_len(&self) -> usize {
        self.length as usize + 1
    }
}

/// Sliding-window LZ77 matcher
///
/// Every token carries a trailing literal, so a match is only emitted when at
/// least one byte follows it. The search is a naive linear scan over the window
/// and the first longest match found wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lz77 {
    window: usize,
    lookahead: usize,
}

impl Default for Lz77 {
    fn default() -> Self {
        Self {
            window: WINDOW_SIZE,
            lookahead: LOOKAHEAD_SIZE,
        }
    }
}

impl Lz77 {
    /// Both sizes must fit the 16-bit token fields
    pub fn new(window: usize, lookahead: usize) -> Result<Self> {
        if window == 0 || window > u16::MAX as usize {
            return Err(EcpackError::InvalidWindow(window));
        }
        if lookahead < MIN_MATCH || lookahead > u16::MAX as usize {
            return Err(EcpackError::InvalidLookahead(lookahead));
        }
        Ok(Self { window, lookahead })
    }

    /// Tokenize `data`
    pub fn compress(&self, data: &[u8]) -> Vec<Token> {
        self.compress_with_progress(data, &mut |_, _| {})
    }

    /// Tokenize `data`, reporting percent of input consumed
    pub fn compress_with_progress(
        &self,
        data: &[u8],
        progress: &mut dyn FnMut(u8, &str),
    ) -> Vec<Token> {
        let n = data.len();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < n {
            let (offset, length) = self.longest_match(data, i);

            if length >= MIN_MATCH && i + length < n {
                tokens.push(Token {
                    offset: offset as u16,
                    length: length as u16,
                    next: data[i + length],
                });
                i += length + 1;
            } else {
                tokens.push(Token::literal(data[i]));
                i += 1;
            }

            if i % PROGRESS_INTERVAL == 0 {
                let pct = (i as u64 * 100 / n as u64) as u8;
                progress(pct, &format!("LZ77: {}%", pct));
            }
        }

        progress(100, "LZ77 complete");
        tokens
    }

    /// Find the longest match for `data[pos..]` inside the window
    /// Returns (offset, length); length 0 means no match.
    /// The lookahead stops one byte short of the end so a trailing literal always exists.
    fn longest_match(&self, data: &[u8], pos: usize) -> (usize, usize) {
        let start = pos.saturating_sub(self.window);
        let max_len = self.lookahead.min(data.len() - pos - 1);
        let lookahead = &data[pos..pos + max_len];

        let mut best_offset = 0;
        let mut best_length = 0;

        for candidate in start..pos {
            // Source may run into the lookahead itself (overlapping copy)
            let length = data[candidate..]
                .iter()
                .zip(lookahead)
                .take_while(|(a, b)| a == b)
                .count();
            if length > best_length {
                best_length = length;
                best_offset = pos - candidate;
                if best_length == max_len {
                    break;
                }
            }
        }

        (best_offset, best_length)
    }

    /// Replay tokens back into bytes
    /// Match lengths are untrusted, so the buffer grows as tokens are validated.
    pub fn decompress(&self, tokens: &[Token]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(tokens.len());

        for (index, token) in tokens.iter().enumerate() {
            if token.is_literal() {
                out.push(token.next);
                continue;
            }

            let offset = token.offset as usize;
            if offset == 0 || offset > out.len() {
                return Err(EcpackError::CorruptToken {
                    index,
                    reason: format!(
                        "offset {} reaches before start of output ({} bytes)",
                        offset,
                        out.len()
                    ),
                });
            }

            // Byte-by-byte: source and destination overlap when length > offset
            let start = out.len() - offset;
            for k in 0..token.length as usize {
                let byte = out[start + k];
                out.push(byte);
            }
            out.push(token.next);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn roundtrip(data: &[u8]) -> Vec<Token> {
        let lz = Lz77::default();
        let tokens = lz.compress(data);
        assert_eq!(lz.decompress(&tokens).unwrap(), data);
        tokens
    }

    #[test]
    fn test_empty_input() {
        let tokens = roundtrip(b"");
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_single_byte() {
        let tokens = roundtrip(b"x");
        assert_eq!(tokens, vec![Token::literal(b'x')]);
    }

    #[test]
    fn test_short_repeats_stay_literal() {
        let tokens = roundtrip(b"ababab");
        assert!(tokens[..2].iter().all(Token::is_literal));
        roundtrip(b"aa");
        roundtrip(b"aaa");
    }

    #[test]
    fn test_run_of_same_byte() {
        let data = b"AAAAAAAAAA";
        let tokens = roundtrip(data);
        assert_eq!(tokens[0], Token::literal(b'A'));
        assert!(tokens[1..].iter().any(|t| !t.is_literal()));
        // Overlapping copy: offset 1, length 8, trailing 'A'
        assert_eq!(
            tokens[1],
            Token {
                offset: 1,
                length: 8,
                next: b'A'
            }
        );
    }

    #[test]
    fn test_every_token_has_trailing_literal() {
        let data = b"abcabcabcabc";
        let tokens = roundtrip(data);
        let total: usize = tokens.iter().map(Token::expanded_len).sum();
        assert_eq!(total, data.len());
    }

    #[test]
    fn test_offsets_bounded_by_window() {
        // A 4200-byte pattern repeated: the first copy is out of reach
        let pattern: Vec<u8> = (0..4200u32).map(|i| (i * 7 % 251) as u8).collect();
        let mut data = pattern.clone();
        data.extend_from_slice(&pattern[..800]);
        assert_eq!(data.len(), 5000);

        let tokens = roundtrip(&data);
        for token in &tokens {
            assert!(token.offset as usize <= WINDOW_SIZE);
            assert!(token.length as usize <= LOOKAHEAD_SIZE);
        }
    }

    #[test]
    fn test_custom_window() {
        let lz = Lz77::new(8, 4).unwrap();
        let data = b"0123456789abcdef0123456789abcdef";
        let tokens = lz.compress(data);
        assert!(tokens.iter().all(|t| t.offset <= 8 && t.length <= 4));
        assert_eq!(lz.decompress(&tokens).unwrap(), data);
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(Lz77::new(0, 32), Err(EcpackError::InvalidWindow(0))));
        assert!(matches!(
            Lz77::new(70_000, 32),
            Err(EcpackError::InvalidWindow(70_000))
        ));
        assert!(matches!(
            Lz77::new(4096, 2),
            Err(EcpackError::InvalidLookahead(2))
        ));
    }

    #[test]
    fn test_first_found_offset_wins_ties() {
        // "abcd" appears at 0 and 4; the scan starts at the window's far end
        let data = b"abcdabcdabcdX";
        let tokens = Lz77::default().compress(data);
        assert_eq!(
            tokens[4],
            Token {
                offset: 4,
                length: 8,
                next: b'X'
            }
        );
    }

    #[test]
    fn test_decompress_rejects_offset_before_start() {
        let tokens = vec![
            Token::literal(b'a'),
            Token {
                offset: 2,
                length: 3,
                next: b'b',
            },
        ];
        let result = Lz77::default().decompress(&tokens);
        assert!(matches!(
            result,
            Err(EcpackError::CorruptToken { index: 1, .. })
        ));
    }

    #[test]
    fn test_decompress_rejects_zero_offset_match() {
        let tokens = vec![Token {
            offset: 0,
            length: 4,
            next: b'z',
        }];
        assert!(Lz77::default().decompress(&tokens).is_err());
    }

    #[test]
    fn test_decompress_long_bogus_matches_fail_fast() {
        let mut tokens = vec![Token::literal(b'a')];
        tokens.extend(std::iter::repeat(Token {
            offset: 5000,
            length: u16::MAX,
            next: 0,
        })
        .take(200_000));
        let result = Lz77::default().decompress(&tokens);
        assert!(matches!(
            result,
            Err(EcpackError::CorruptToken { index: 1, .. })
        ));
    }

    #[test]
    fn test_progress_reported() {
        let data = vec![7u8; 5000];
        let mut last = 0;
        let mut calls = 0;
        Lz77::default().compress_with_progress(&data, &mut |pct, _| {
            last = pct;
            calls += 1;
        });
        assert!(calls >= 1);
        assert_eq!(last, 100);
    }

    proptest! {
        #[test]
        fn prop_roundtrip(data in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let lz = Lz77::default();
            let tokens = lz.compress(&data);
            prop_assert_eq!(lz.decompress(&tokens).unwrap(), data);
        }

        #[test]
        fn prop_roundtrip_low_entropy(data in proptest::collection::vec(0u8..3, 0..2048)) {
            let lz = Lz77::default();
            let tokens = lz.compress(&data);
            for t in &tokens {
                prop_assert!(t.is_literal() || (t.length as usize >= MIN_MATCH && t.offset >= 1));
            }
            prop_assert_eq!(lz.decompress(&tokens).unwrap(), data);
        }
    }
}
