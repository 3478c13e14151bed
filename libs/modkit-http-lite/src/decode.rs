//! Response payload decoding.
//!
//! The raw body is decompressed according to `Content-Encoding` and then
//! decoded as UTF-8, replacing invalid sequences with U+FFFD. The size limit
//! applies to the decompressed bytes, so a small compressed payload cannot
//! expand past it.

use crate::config::EncodingPolicy;
use crate::error::HttpError;
use flate2::read::{MultiGzDecoder, ZlibDecoder};
use std::io::Read;

/// Decode a raw response body into text.
///
/// - `gzip`: gzip-framed data, all members concatenated; an empty body
///   decodes to empty text
/// - `deflate`: zlib-framed data
/// - anything else, including a missing header: `HttpError::UnsupportedEncoding`,
///   unless `policy` is [`EncodingPolicy::AllowIdentity`] and the header is
///   absent or `identity`
///
/// The header value is matched exactly (no trimming or case folding).
///
/// # Errors
/// - `HttpError::UnsupportedEncoding` for unsupported encodings
/// - `HttpError::Decompress` if the compressed stream is corrupt
/// - `HttpError::BodyTooLarge` if the decoded body exceeds `limit`
pub fn decode_payload(
    raw: &[u8],
    content_encoding: Option<&str>,
    policy: EncodingPolicy,
    limit: usize,
) -> Result<String, HttpError> {
    let decoded = match (content_encoding, policy) {
        (Some("gzip"), _) if raw.is_empty() => Vec::new(),
        (Some("gzip"), _) => inflate(MultiGzDecoder::new(raw), "gzip", limit)?,
        (Some("deflate"), _) => inflate(ZlibDecoder::new(raw), "deflate", limit)?,
        (None | Some("identity"), EncodingPolicy::AllowIdentity) => {
            check_limit(raw.len(), limit)?;
            raw.to_vec()
        }
        (other, _) => {
            return Err(HttpError::UnsupportedEncoding {
                encoding: other.map(str::to_owned),
            });
        }
    };

    tracing::debug!(
        encoding = content_encoding.unwrap_or("<none>"),
        raw_len = raw.len(),
        decoded_len = decoded.len(),
        "decoded response payload"
    );

    Ok(String::from_utf8_lossy(&decoded).into_owned())
}

/// Read a decompressing reader to the end, stopping one byte past `limit`.
fn inflate<R: Read>(reader: R, encoding: &'static str, limit: usize) -> Result<Vec<u8>, HttpError> {
    let mut out = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    reader
        .take(cap)
        .read_to_end(&mut out)
        .map_err(|source| HttpError::Decompress { encoding, source })?;
    check_limit(out.len(), limit)?;
    Ok(out)
}

fn check_limit(actual: usize, limit: usize) -> Result<(), HttpError> {
    if actual > limit {
        return Err(HttpError::BodyTooLarge { limit, actual });
    }
    Ok(())
}
