//! Compression level and the match-search effort it selects.

/// Hash chain candidates examined per position, indexed by level.
const CHAIN_DEPTH: [usize; 10] = [0, 4, 8, 16, 32, 64, 128, 256, 1024, 4096];

/// Match length after which the remaining chain is cut to a quarter.
const GOOD_LENGTH: [usize; 10] = [0, 4, 4, 4, 4, 8, 8, 8, 16, 16];

/// Match length that ends the chain walk at once.
const NICE_LENGTH: [usize; 10] = [0, 8, 16, 32, 32, 64, 128, 128, 258, 258];

/// Lowest level that defers matches by one byte looking for a longer one.
const LAZY_FROM: u8 = 4;

/// Compression level, 0 through 9.
///
/// Level 0 emits stored blocks only. Levels 1-3 parse greedily and levels
/// 4-9 add one step of lazy matching; each step up searches a deeper hash
/// chain. Every level produces a stream any DEFLATE decoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// Stored blocks only.
    pub const NONE: Self = Self(0);
    /// Shallowest search.
    pub const FAST: Self = Self(1);
    /// Level 6.
    pub const DEFAULT: Self = Self(6);
    /// Deepest search.
    pub const BEST: Self = Self(9);

    /// Level `level`, saturating at 9.
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Numeric level.
    pub fn level(self) -> u8 {
        self.0
    }

    /// Whether the encoder skips match finding and writes stored blocks.
    pub fn is_store(self) -> bool {
        self.0 == 0
    }

    /// Maximum hash chain candidates the match finder visits per position.
    pub fn max_chain(self) -> usize {
        CHAIN_DEPTH[self.0 as usize]
    }

    /// Once a match this long is found, only a quarter of the remaining
    /// chain is searched.
    pub fn good_length(self) -> usize {
        GOOD_LENGTH[self.0 as usize]
    }

    /// A match this long is taken without looking further down the chain.
    pub fn nice_length(self) -> usize {
        NICE_LENGTH[self.0 as usize]
    }

    /// Whether the parser tries the next position before committing a match.
    pub fn lazy_matching(self) -> bool {
        self.0 >= LAZY_FROM
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}
