/// Resource limits applied while reading and assembling a document.
///
/// Input is untrusted: elements, group layers and class properties nest
/// recursively, and compressed tile data can expand far beyond its encoded size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest allowed nesting of `group` layers (and of class properties).
    pub max_nesting_depth: usize,
    /// Deepest allowed XML element nesting when reading text.
    pub max_element_depth: usize,
    /// Ceiling on the decompressed size of one tile data block or chunk.
    pub max_decompressed_bytes: usize,
}

impl ParseOptions {
    /// Default for [`ParseOptions::max_nesting_depth`].
    pub const DEFAULT_MAX_NESTING_DEPTH: usize = 64;
    /// Default for [`ParseOptions::max_element_depth`]. Leaves room for the
    /// default group and class nesting, which take one and two elements per level.
    pub const DEFAULT_MAX_ELEMENT_DEPTH: usize = 256;
    /// Default for [`ParseOptions::max_decompressed_bytes`].
    pub const DEFAULT_MAX_DECOMPRESSED_BYTES: usize = 64 * 1024 * 1024;

    /// Sets [`ParseOptions::max_nesting_depth`].
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Sets [`ParseOptions::max_element_depth`].
    pub fn with_max_element_depth(mut self, depth: usize) -> Self {
        self.max_element_depth = depth;
        self
    }

    /// Sets [`ParseOptions::max_decompressed_bytes`].
    pub fn with_max_decompressed_bytes(mut self, bytes: usize) -> Self {
        self.max_decompressed_bytes = bytes;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_nesting_depth: Self::DEFAULT_MAX_NESTING_DEPTH,
            max_element_depth: Self::DEFAULT_MAX_ELEMENT_DEPTH,
            max_decompressed_bytes: Self::DEFAULT_MAX_DECOMPRESSED_BYTES,
        }
    }
}
