use std::io;

/// Errors produced while assembling a Tiled document.
///
/// Every variant aborts the parse; nothing is recovered locally.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// A required attribute is absent.
    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        /// Tag of the element being read.
        element: String,
        /// Name of the absent attribute.
        attribute: &'static str,
    },

    /// An attribute is present but its text does not parse as the expected type.
    #[error("<{element}> attribute `{attribute}` has malformed value {raw_text:?}")]
    MalformedAttribute {
        /// Tag of the element being read.
        element: String,
        /// Name of the attribute (`csv` for a bad CSV tile field).
        attribute: &'static str,
        /// The rejected text.
        raw_text: String,
    },

    /// An element was handed to the wrong assembly step.
    #[error("expected <{expected}>, found <{found}>")]
    UnexpectedElement {
        /// Tag the step reads.
        expected: &'static str,
        /// Tag it was given.
        found: String,
    },

    /// A child element appears more often than allowed, or not at all when required.
    #[error("<{element}> expects {expected} <{child}> child element(s), found {found}")]
    CardinalityViolation {
        /// Tag of the parent element.
        element: String,
        /// Tag (or `|`-separated tags) of the counted children.
        child: &'static str,
        /// The allowed count.
        expected: Cardinality,
        /// The count found.
        found: usize,
    },

    /// A color literal is not 3, 4, 6 or 8 hex digits.
    #[error("invalid color literal {raw_text:?}")]
    InvalidColorLiteral {
        /// The rejected literal.
        raw_text: String,
    },

    /// Tile data `encoding` is neither absent, `csv` nor `base64`.
    #[error("unsupported tile data encoding {encoding:?}")]
    UnsupportedEncoding {
        /// The encoding as written.
        encoding: String,
    },

    /// Tile data `compression` is unknown, not compiled in, or used without base64.
    #[error("unsupported tile data compression {scheme:?}")]
    UnsupportedCompression {
        /// The compression scheme as written.
        scheme: String,
    },

    /// Base64 tile data does not decode.
    #[error("invalid base64 tile data: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// The decompressor failed on the decoded bytes.
    #[error("failed to decompress {scheme} tile data: {source}")]
    Decompression {
        /// `zlib`, `gzip` or `zstd`.
        scheme: &'static str,
        /// Error reported by the decoder.
        #[source]
        source: io::Error,
    },

    /// Decompressed tile data passed [`ParseOptions::max_decompressed_bytes`](crate::ParseOptions).
    #[error("decompressed tile data exceeds {limit} bytes")]
    DecompressedSizeExceeded {
        /// The configured ceiling.
        limit: usize,
    },

    /// A binary tile buffer is not four bytes per cell.
    #[error("tile buffer holds {actual_bytes} bytes, expected {expected_bytes}")]
    TruncatedTileBuffer {
        /// `4 * width * height`.
        expected_bytes: usize,
        /// Length after decoding and decompression.
        actual_bytes: usize,
    },

    /// Tile data holds a different number of cells than the layer or chunk declares.
    #[error("tile data holds {actual} tiles, expected {expected}")]
    TileCountMismatch {
        /// `width * height`.
        expected: usize,
        /// Cells found.
        actual: usize,
    },

    /// Elements, group layers or class properties nest deeper than allowed.
    #[error("document nested deeper than {limit} levels")]
    NestingTooDeep {
        /// The configured limit that was passed.
        limit: usize,
    },

    /// The XML reader rejected the text.
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute of the XML text is malformed.
    #[error("xml attribute error: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    /// Text content could not be decoded.
    #[error("xml encoding error: {0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    /// A tag or attribute name is not UTF-8.
    #[error("utf8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Well-formed XML events that do not make up a single element tree.
    #[error("malformed document: {0}")]
    Structure(String),
}

/// How many children of a kind an element may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Zero or one.
    AtMostOne,
    /// Exactly one.
    ExactlyOne,
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::AtMostOne => write!(f, "at most one"),
            Cardinality::ExactlyOne => write!(f, "exactly one"),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MapError>;
