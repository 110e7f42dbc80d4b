//! Decoding of `<data>` / `<chunk>` blocks into raw gid sequences.
//!
//! Gids are returned as stored, flip flags included; resolving them against
//! tilesets is left to the caller.

use crate::error::{MapError, Result};
use crate::layer::{Chunk, Compression, Encoding, TileLayerData, TileStorage};
use crate::loader::attrs::{Attrs, FromAttr};
use crate::options::ParseOptions;
use crate::xml::Element;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::Read;
use tracing::trace;

/// Decodes the single `<data>` child of a tile layer.
///
/// Infinite maps store their cells in `<chunk>` children, each decoded on
/// its own; fixed-size maps hold exactly `width * height` cells.
pub(crate) fn decode_layer_data(
    data: &Element,
    width: u32,
    height: u32,
    infinite: bool,
    options: &ParseOptions,
) -> Result<TileLayerData> {
    let encoding = parse_encoding(data.attr("encoding"))?;
    let compression = parse_compression(data.attr("compression"))?;
    if compression != Compression::None && encoding != Encoding::Base64 {
        return Err(MapError::UnsupportedCompression {
            scheme: compression.name().to_string(),
        });
    }

    let tiles = if infinite {
        let chunks = data
            .children_named("chunk")
            .map(|chunk| decode_chunk(chunk, encoding, compression, options))
            .collect::<Result<Vec<_>>>()?;
        TileStorage::Chunks(chunks)
    } else {
        let cells = cell_count(width, height);
        TileStorage::Finite(decode_block(data, encoding, compression, cells, false, options)?)
    };

    Ok(TileLayerData {
        encoding,
        compression,
        raw: data.text.clone(),
        tiles,
    })
}

fn decode_chunk(
    chunk: &Element,
    encoding: Encoding,
    compression: Compression,
    options: &ParseOptions,
) -> Result<Chunk> {
    let attrs = Attrs::of(chunk);
    let x: i32 = attrs.required("x")?;
    let y: i32 = attrs.required("y")?;
    let width: u32 = attrs.required("width")?;
    let height: u32 = attrs.required("height")?;
    let gids = decode_block(
        chunk,
        encoding,
        compression,
        cell_count(width, height),
        true,
        options,
    )?;
    trace!(x, y, width, height, "decoded chunk");
    Ok(Chunk {
        x,
        y,
        width,
        height,
        gids,
    })
}

fn cell_count(width: u32, height: u32) -> usize {
    (width as usize).saturating_mul(height as usize)
}

fn parse_encoding(raw: Option<&str>) -> Result<Encoding> {
    match raw {
        None => Ok(Encoding::None),
        Some(raw) => Encoding::from_attr(raw).ok_or_else(|| MapError::UnsupportedEncoding {
            encoding: raw.to_string(),
        }),
    }
}

fn parse_compression(raw: Option<&str>) -> Result<Compression> {
    match raw {
        None | Some("") => Ok(Compression::None),
        Some(raw) => Compression::from_attr(raw).ok_or_else(|| MapError::UnsupportedCompression {
            scheme: raw.to_string(),
        }),
    }
}

/// Decodes one block (a whole `<data>` or a single `<chunk>`) of `cells` tiles.
pub(crate) fn decode_block(
    block: &Element,
    encoding: Encoding,
    compression: Compression,
    cells: usize,
    chunked: bool,
    options: &ParseOptions,
) -> Result<Vec<u32>> {
    let gids = match encoding {
        Encoding::None => block
            .children_named("tile")
            .map(|tile| Attrs::of(tile).defaulted("gid", 0u32))
            .collect::<Result<Vec<_>>>()?,
        Encoding::Csv => decode_csv(&block.name, &block.text, chunked)?,
        Encoding::Base64 => {
            let bytes = decode_base64(&block.text)?;
            let bytes = decompress(bytes, compression, options.max_decompressed_bytes)?;
            gids_from_le_bytes(&bytes, cells)?
        }
    };

    if gids.len() != cells {
        return Err(MapError::TileCountMismatch {
            expected: cells,
            actual: gids.len(),
        });
    }
    Ok(gids)
}

/// Parses comma separated gids.
///
/// Line breaks are dropped first. Inside chunks the writer separates row
/// groups with a four-space indent run, which is read as a field separator,
/// so empty fields are skipped there. Elsewhere only a single trailing comma
/// is tolerated; any other empty field is malformed.
pub(crate) fn decode_csv(element: &str, text: &str, chunked: bool) -> Result<Vec<u32>> {
    let mut normalized: String = text.chars().filter(|&c| c != '\r' && c != '\n').collect();
    if chunked {
        normalized = normalized.replace("    ", ",");
    }

    let mut fields: Vec<&str> = normalized.split(',').map(str::trim).collect();
    if fields.last() == Some(&"") {
        fields.pop();
    }

    fields
        .into_iter()
        .filter(|field| !(chunked && field.is_empty()))
        .map(|field| {
            u32::from_attr(field).ok_or_else(|| MapError::MalformedAttribute {
                element: element.to_string(),
                attribute: "csv",
                raw_text: field.to_string(),
            })
        })
        .collect()
}

fn decode_base64(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}

pub(crate) fn decompress(bytes: Vec<u8>, compression: Compression, limit: usize) -> Result<Vec<u8>> {
    match compression {
        Compression::None => Ok(bytes),
        Compression::Zlib => read_capped(flate2::read::ZlibDecoder::new(&bytes[..]), "zlib", limit),
        Compression::Gzip => read_capped(flate2::read::GzDecoder::new(&bytes[..]), "gzip", limit),
        Compression::Zstd => decompress_zstd(&bytes, limit),
    }
}

#[cfg(feature = "zstd")]
fn decompress_zstd(bytes: &[u8], limit: usize) -> Result<Vec<u8>> {
    let decoder = zstd::stream::read::Decoder::new(bytes)
        .map_err(|source| MapError::Decompression { scheme: "zstd", source })?;
    read_capped(decoder, "zstd", limit)
}

#[cfg(not(feature = "zstd"))]
fn decompress_zstd(_bytes: &[u8], _limit: usize) -> Result<Vec<u8>> {
    Err(MapError::UnsupportedCompression {
        scheme: "zstd".to_string(),
    })
}

fn read_capped(reader: impl Read, scheme: &'static str, limit: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    reader
        .take((limit as u64).saturating_add(1))
        .read_to_end(&mut out)
        .map_err(|source| MapError::Decompression { scheme, source })?;
    if out.len() > limit {
        return Err(MapError::DecompressedSizeExceeded { limit });
    }
    Ok(out)
}

fn gids_from_le_bytes(bytes: &[u8], cells: usize) -> Result<Vec<u32>> {
    let expected_bytes = cells.saturating_mul(4);
    if bytes.len() != expected_bytes {
        return Err(MapError::TruncatedTileBuffer {
            expected_bytes,
            actual_bytes: bytes.len(),
        });
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{GzEncoder, ZlibEncoder};
    use std::io::Write;

    fn le_bytes(gids: &[u32]) -> Vec<u8> {
        gids.iter().flat_map(|g| g.to_le_bytes()).collect()
    }

    fn data(encoding: Option<&str>, compression: Option<&str>, text: &str) -> Element {
        let mut el = Element::new("data").with_text(text);
        if let Some(e) = encoding {
            el = el.with_attr("encoding", e);
        }
        if let Some(c) = compression {
            el = el.with_attr("compression", c);
        }
        el
    }

    fn finite(layer: TileLayerData) -> Vec<u32> {
        match layer.tiles {
            TileStorage::Finite(gids) => gids,
            TileStorage::Chunks(_) => panic!("expected finite storage"),
        }
    }

    #[test]
    fn csv_two_by_two() {
        let el = data(Some("csv"), None, "\n1,0,\n0,2\n");
        let layer = decode_layer_data(&el, 2, 2, false, &ParseOptions::default()).expect("decode");
        assert_eq!(finite(layer), vec![1, 0, 0, 2]);
    }

    #[test]
    fn csv_with_carriage_returns() {
        let gids = decode_csv("data", "1,2,\r\n3,4\r\n", false).expect("csv");
        assert_eq!(gids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn csv_chunk_row_groups_split_on_indent_runs() {
        let gids = decode_csv("chunk", "\n    1,2\n    3,4\n   ", true).expect("csv");
        assert_eq!(gids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn csv_rejects_non_numeric_fields() {
        let err = decode_csv("data", "1,x,3", false).unwrap_err();
        assert!(matches!(err, MapError::MalformedAttribute { ref raw_text, .. } if raw_text == "x"));
    }

    #[test]
    fn csv_rejects_empty_fields_outside_chunks() {
        let err = decode_csv("data", "1,,0,2", false).unwrap_err();
        assert!(matches!(
            err,
            MapError::MalformedAttribute { attribute: "csv", ref raw_text, .. } if raw_text.is_empty()
        ));

        let el = data(Some("csv"), None, "1,,0,2");
        assert!(decode_layer_data(&el, 3, 1, false, &ParseOptions::default()).is_err());
    }

    #[test]
    fn csv_accepts_one_trailing_comma() {
        assert_eq!(decode_csv("data", "1,2,3,", false).expect("csv"), vec![1, 2, 3]);
        assert!(decode_csv("data", "1,2,3,,", false).is_err());
    }

    #[test]
    fn csv_rejects_signed_fields() {
        let err = decode_csv("data", "+1,0", false).unwrap_err();
        assert!(matches!(err, MapError::MalformedAttribute { ref raw_text, .. } if raw_text == "+1"));
    }

    #[test]
    fn csv_count_must_match() {
        let el = data(Some("csv"), None, "1,2,3");
        let err = decode_layer_data(&el, 2, 2, false, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::TileCountMismatch { expected: 4, actual: 3 }));
    }

    #[test]
    fn all_zero_layer_is_valid() {
        let el = data(Some("csv"), None, "0,0,0,0,0,0");
        let layer = decode_layer_data(&el, 3, 2, false, &ParseOptions::default()).expect("decode");
        assert!(finite(layer).iter().all(|&g| g == 0));
    }

    #[test]
    fn xml_tiles_default_to_empty() {
        let el = Element::new("data")
            .with_child(Element::new("tile").with_attr("gid", "7"))
            .with_child(Element::new("tile"))
            .with_child(Element::new("tile").with_attr("gid", "3"))
            .with_child(Element::new("tile"));
        let layer = decode_layer_data(&el, 2, 2, false, &ParseOptions::default()).expect("decode");
        assert_eq!(layer.encoding, Encoding::None);
        assert_eq!(finite(layer), vec![7, 0, 3, 0]);
    }

    #[test]
    fn xml_tile_count_must_match() {
        let el = Element::new("data").with_child(Element::new("tile"));
        let err = decode_layer_data(&el, 2, 1, false, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::TileCountMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn base64_uncompressed_is_little_endian() {
        let gids = [1u32, 0x8000_0002, 0, 300];
        let text = format!("\n   {}\n", STANDARD.encode(le_bytes(&gids)));
        let el = data(Some("base64"), None, &text);
        let layer = decode_layer_data(&el, 2, 2, false, &ParseOptions::default()).expect("decode");
        assert_eq!(finite(layer), gids.to_vec());
    }

    #[test]
    fn base64_zlib_and_gzip() {
        let gids: Vec<u32> = (0..12).collect();

        let mut z = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        z.write_all(&le_bytes(&gids)).unwrap();
        let zlib = STANDARD.encode(z.finish().unwrap());

        let mut g = GzEncoder::new(Vec::new(), flate2::Compression::default());
        g.write_all(&le_bytes(&gids)).unwrap();
        let gzip = STANDARD.encode(g.finish().unwrap());

        for (scheme, text) in [("zlib", zlib), ("gzip", gzip)] {
            let el = data(Some("base64"), Some(scheme), &text);
            let layer = decode_layer_data(&el, 4, 3, false, &ParseOptions::default()).expect(scheme);
            assert_eq!(layer.compression.name(), scheme);
            assert_eq!(finite(layer), gids);
        }
    }

    #[cfg(feature = "zstd")]
    #[test]
    fn base64_zstd() {
        let gids: Vec<u32> = vec![5; 9];
        let packed = zstd::encode_all(&le_bytes(&gids)[..], 0).unwrap();
        let el = data(Some("base64"), Some("zstd"), &STANDARD.encode(packed));
        let layer = decode_layer_data(&el, 3, 3, false, &ParseOptions::default()).expect("decode");
        assert_eq!(finite(layer), gids);
    }

    #[test]
    fn base64_buffer_length_is_checked() {
        let el = data(Some("base64"), None, &STANDARD.encode([1u8, 0, 0, 0, 2, 0]));
        let err = decode_layer_data(&el, 2, 1, false, &ParseOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            MapError::TruncatedTileBuffer { expected_bytes: 8, actual_bytes: 6 }
        ));
    }

    #[test]
    fn invalid_base64_is_reported() {
        let el = data(Some("base64"), None, "@@@@");
        let err = decode_layer_data(&el, 1, 1, false, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::InvalidBase64(_)));
    }

    #[test]
    fn decompression_ceiling_is_enforced() {
        let mut z = ZlibEncoder::new(Vec::new(), flate2::Compression::best());
        z.write_all(&vec![0u8; 64 * 1024]).unwrap();
        let el = data(Some("base64"), Some("zlib"), &STANDARD.encode(z.finish().unwrap()));
        let options = ParseOptions::default().with_max_decompressed_bytes(1024);
        let err = decode_layer_data(&el, 128, 128, false, &options).unwrap_err();
        assert!(matches!(err, MapError::DecompressedSizeExceeded { limit: 1024 }));
    }

    #[test]
    fn corrupt_compressed_stream_is_reported() {
        let el = data(Some("base64"), Some("zlib"), &STANDARD.encode([1u8, 2, 3, 4, 5]));
        let err = decode_layer_data(&el, 1, 1, false, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::Decompression { scheme: "zlib", .. }));
    }

    #[test]
    fn unknown_encoding_and_compression() {
        let el = data(Some("hex"), None, "");
        let err = decode_layer_data(&el, 1, 1, false, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedEncoding { ref encoding } if encoding == "hex"));

        let el = data(Some("base64"), Some("lz4"), "");
        let err = decode_layer_data(&el, 1, 1, false, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedCompression { ref scheme } if scheme == "lz4"));

        let el = data(Some("csv"), Some("zlib"), "1");
        let err = decode_layer_data(&el, 1, 1, false, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedCompression { ref scheme } if scheme == "zlib"));
    }

    #[test]
    fn chunks_decode_independently() {
        let full: Vec<String> = (0..256).map(|i| (i % 7).to_string()).collect();
        let empty = vec!["0"; 256];
        let el = data(Some("csv"), None, "")
            .with_child(
                Element::new("chunk")
                    .with_attr("x", "-16")
                    .with_attr("y", "0")
                    .with_attr("width", "16")
                    .with_attr("height", "16")
                    .with_text(full.join(",")),
            )
            .with_child(
                Element::new("chunk")
                    .with_attr("x", "0")
                    .with_attr("y", "16")
                    .with_attr("width", "16")
                    .with_attr("height", "16")
                    .with_text(empty.join(",")),
            );

        let layer = decode_layer_data(&el, 0, 0, true, &ParseOptions::default()).expect("decode");
        assert_eq!(layer.tile_count(), 512);
        let TileStorage::Chunks(chunks) = layer.tiles else {
            panic!("expected chunks");
        };
        assert_eq!(chunks.len(), 2);
        assert_eq!((chunks[0].x, chunks[0].y), (-16, 0));
        assert_eq!(chunks[0].gids.len(), 256);
        assert_eq!(chunks[0].get(1, 0), Some(1));
        assert_eq!(chunks[1].gids.len(), 256);
        assert!(chunks[1].gids.iter().all(|&g| g == 0));
    }

    #[test]
    fn chunk_count_mismatch_is_reported_per_chunk() {
        let el = data(Some("csv"), None, "").with_child(
            Element::new("chunk")
                .with_attr("x", "0")
                .with_attr("y", "0")
                .with_attr("width", "2")
                .with_attr("height", "2")
                .with_text("1,2,3"),
        );
        let err = decode_layer_data(&el, 0, 0, true, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::TileCountMismatch { expected: 4, actual: 3 }));
    }
}
