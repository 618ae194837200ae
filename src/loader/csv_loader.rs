use crate::errors::PipelineError;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::warn;

/// Decoders tried in order. The `latin1` and `iso-8859-1` labels both
/// resolve to the windows-1252 decoder in encoding_rs, so the original
/// three-step fallback chain collapses to two stages here.
const FALLBACK_ENCODINGS: &[&Encoding] = &[UTF_8, WINDOWS_1252];

/// Read a delimited source file into a raw frame. Schema inference is
/// disabled so every cell stays an untyped string until the normalizer
/// assigns it a type; empty cells load as nulls.
pub fn load_table(path: &Path) -> Result<DataFrame, PipelineError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            PipelineError::SourceNotFound {
                path: path.to_path_buf(),
            }
        }
        _ => PipelineError::Io(e),
    })?;

    let text = decode_with_fallback(&bytes, path)?;
    parse_delimited(text)
}

fn decode_with_fallback(bytes: &[u8], path: &Path) -> Result<String, PipelineError> {
    for encoding in FALLBACK_ENCODINGS {
        let (decoded, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            if !std::ptr::eq(*encoding, UTF_8) {
                warn!(
                    "decoded {} as {} after utf-8 failed",
                    path.display(),
                    encoding.name()
                );
            }
            return Ok(decoded.into_owned());
        }
    }

    Err(PipelineError::DecodingFailure {
        path: path.to_path_buf(),
    })
}

fn parse_delimited(text: String) -> Result<DataFrame, PipelineError> {
    let mut options = CsvReadOptions::default();
    options.has_header = true;
    // infer_schema_length of 0 keeps every column as String.
    options.infer_schema_length = Some(0);

    let df = CsvReader::new(Cursor::new(text.into_bytes()))
        .with_options(options)
        .finish()?;

    Ok(df)
}
