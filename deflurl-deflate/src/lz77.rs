//! LZ77 match finding for DEFLATE.
//!
//! LZ77 finds repeated sequences in the input and replaces them with
//! back-references (length, distance pairs).
//!
//! # Algorithm
//!
//! Every position is indexed by a hash of its first three bytes. The `head`
//! table holds the most recent position per hash and `prev` links each
//! position to the previous one with the same hash, so walking the chain
//! visits candidates from the closest to the farthest. The walk stops at the
//! edge of the 32 KB window or after `max_chain` candidates.
//!
//! The encoder is greedy: at each position it takes the longest match found,
//! emitting a literal when there is none. From level 4 upwards it adds a
//! one-step lazy evaluation: a match is deferred by one literal when the next
//! position offers a strictly longer one.

use deflurl_core::level::CompressionLevel;
use deflurl_core::window::WINDOW_SIZE;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Mask for indexing the chain table by position.
const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// Hash table size in bits.
const HASH_BITS: u32 = 15;

/// Size of the hash table (power of 2).
const HASH_SIZE: usize = 1 << HASH_BITS;

/// Empty slot marker in the head and chain tables.
const NIL: usize = usize::MAX;

/// A token produced by LZ77 compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1-32768).
        distance: u16,
    },
}

impl Lz77Token {
    /// Number of bytes this token expands to.
    #[inline]
    pub fn decoded_len(&self) -> usize {
        match *self {
            Lz77Token::Literal(_) => 1,
            Lz77Token::Match { length, .. } => length as usize,
        }
    }
}

/// A back-reference candidate returned by [`MatchFinder::find_match`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Match length (3-258).
    pub length: u16,
    /// Distance back from the current position (1-32768).
    pub distance: u16,
}

impl From<Match> for Lz77Token {
    fn from(m: Match) -> Self {
        Lz77Token::Match {
            length: m.length,
            distance: m.distance,
        }
    }
}

/// Hash chain index over the positions of one input buffer.
#[derive(Debug, Clone)]
pub struct MatchFinder {
    /// Most recent position per hash.
    head: Vec<usize>,
    /// Previous position with the same hash, indexed by `pos & WINDOW_MASK`.
    prev: Vec<usize>,
    /// Maximum number of candidates examined per search.
    max_chain: usize,
    /// Match length that cuts the rest of the chain to a quarter.
    good_length: usize,
    /// Match length that stops the search.
    nice_length: usize,
}

impl MatchFinder {
    /// Create a match finder that examines at most `max_chain` candidates.
    pub fn new(max_chain: usize) -> Self {
        Self {
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; WINDOW_SIZE],
            max_chain,
            good_length: MAX_MATCH,
            nice_length: MAX_MATCH,
        }
    }

    /// Create a match finder with the search effort of `level`.
    pub fn for_level(level: CompressionLevel) -> Self {
        Self::new(level.max_chain()).with_cutoffs(level.good_length(), level.nice_length())
    }

    /// Stop searching at a `nice_length` match, and search only a quarter
    /// of the remaining chain once a `good_length` match is found.
    pub fn with_cutoffs(mut self, good_length: usize, nice_length: usize) -> Self {
        self.good_length = good_length.max(MIN_MATCH);
        self.nice_length = nice_length.clamp(MIN_MATCH, MAX_MATCH);
        self
    }

    /// Maximum chain depth.
    pub fn max_chain(&self) -> usize {
        self.max_chain
    }

    /// Forget every indexed position.
    pub fn reset(&mut self) {
        self.head.fill(NIL);
        self.prev.fill(NIL);
    }

    /// Hash the three bytes at the start of `bytes`.
    #[inline(always)]
    fn hash(bytes: &[u8]) -> usize {
        let v = u32::from(bytes[0]) | u32::from(bytes[1]) << 8 | u32::from(bytes[2]) << 16;
        (v.wrapping_mul(2_654_435_761) >> (32 - HASH_BITS)) as usize
    }

    /// Index position `pos` of `data`.
    ///
    /// Positions with fewer than three bytes left cannot start a match and
    /// are ignored.
    #[inline]
    pub fn insert(&mut self, data: &[u8], pos: usize) {
        if pos + MIN_MATCH > data.len() {
            return;
        }
        let h = Self::hash(&data[pos..]);
        self.prev[pos & WINDOW_MASK] = self.head[h];
        self.head[h] = pos;
    }

    /// Find the longest match for `data[pos..]` among the indexed positions.
    ///
    /// Every position before `pos` that should be searchable must already
    /// have been inserted, and `pos` itself must not be. Among matches of
    /// equal length the closest one wins.
    pub fn find_match(&self, data: &[u8], pos: usize) -> Option<Match> {
        let max_len = data.len().saturating_sub(pos).min(MAX_MATCH);
        if max_len < MIN_MATCH || self.max_chain == 0 {
            return None;
        }

        let current = &data[pos..pos + max_len];
        let limit = pos.saturating_sub(WINDOW_SIZE);
        let mut candidate = self.head[Self::hash(current)];
        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0usize;
        let nice_len = self.nice_length.min(max_len);
        let mut chain = self.max_chain;
        let mut chain_cut = false;

        while candidate != NIL && candidate < pos && candidate >= limit && chain > 0 {
            // Cheap rejection: a longer match must also differ nowhere at best_len
            if data[candidate + best_len] == current[best_len] {
                let len = data[candidate..]
                    .iter()
                    .zip(current)
                    .take_while(|(a, b)| a == b)
                    .count();

                if len > best_len {
                    best_len = len;
                    best_dist = pos - candidate;
                    if len >= nice_len {
                        break;
                    }
                    if !chain_cut && len >= self.good_length {
                        chain = chain.div_ceil(4);
                        chain_cut = true;
                    }
                }
            }

            let next = self.prev[candidate & WINDOW_MASK];
            if next == NIL || next >= candidate {
                break;
            }
            candidate = next;
            chain -= 1;
        }

        (best_len >= MIN_MATCH).then_some(Match {
            length: best_len as u16,
            distance: best_dist as u16,
        })
    }
}

/// LZ77 encoder for DEFLATE compression.
#[derive(Debug)]
pub struct Lz77Encoder {
    /// Hash chain index.
    finder: MatchFinder,
    /// Enable lazy matching.
    lazy_match: bool,
}

impl Lz77Encoder {
    /// Create a new LZ77 encoder with default settings.
    pub fn new() -> Self {
        Self::with_level(CompressionLevel::DEFAULT)
    }

    /// Create a new LZ77 encoder for the given compression level.
    ///
    /// Level 0 finds no matches at all; higher levels search deeper chains.
    pub fn with_level(level: impl Into<CompressionLevel>) -> Self {
        let level = level.into();
        Self {
            finder: MatchFinder::for_level(level),
            lazy_match: level.lazy_matching(),
        }
    }

    /// Whether lazy matching is enabled.
    pub fn is_lazy(&self) -> bool {
        self.lazy_match
    }

    /// Turn `data` into a sequence of literals and back-references.
    pub fn tokenize(&mut self, data: &[u8]) -> Vec<Lz77Token> {
        self.finder.reset();

        if self.finder.max_chain() == 0 {
            return data.iter().map(|&b| Lz77Token::Literal(b)).collect();
        }

        let mut tokens = Vec::with_capacity(data.len() / 2 + 16);
        let mut pending: Option<Match> = None;
        let mut pos = 0;

        while pos < data.len() {
            let found = pending.take().or_else(|| self.finder.find_match(data, pos));
            self.finder.insert(data, pos);

            let Some(m) = found else {
                tokens.push(Lz77Token::Literal(data[pos]));
                pos += 1;
                continue;
            };

            if self.lazy_match && (m.length as usize) < MAX_MATCH {
                match self.finder.find_match(data, pos + 1) {
                    Some(next) if next.length > m.length => {
                        tokens.push(Lz77Token::Literal(data[pos]));
                        pending = Some(next);
                        pos += 1;
                        continue;
                    }
                    _ => {}
                }
            }

            tokens.push(m.into());
            let end = pos + m.length as usize;
            for p in pos + 1..end {
                self.finder.insert(data, p);
            }
            pos = end;
        }

        tokens
    }

    /// Tokenize all data at once (convenience method).
    pub fn compress_all(input: &[u8], level: impl Into<CompressionLevel>) -> Vec<Lz77Token> {
        Self::with_level(level).tokenize(input)
    }
}

impl Default for Lz77Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Expand tokens back into bytes.
pub fn expand_tokens(tokens: &[Lz77Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(tokens.iter().map(Lz77Token::decoded_len).sum());
    for token in tokens {
        match *token {
            Lz77Token::Literal(b) => out.push(b),
            Lz77Token::Match { length, distance } => {
                let start = out.len() - distance as usize;
                for i in 0..length as usize {
                    out.push(out[start + i]);
                }
            }
        }
    }
    out
}
