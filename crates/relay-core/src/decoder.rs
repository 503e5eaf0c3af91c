// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Byte-to-fragment decoding for line-oriented streamed responses.
//!
//! [`LineDecoder`] turns arbitrarily chunked bytes into complete text lines,
//! carrying partial UTF-8 sequences and partial lines across chunk boundaries.
//! [`decode`] builds on it to extract `data: {"text": ...}` fragments.

use async_stream::try_stream;
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RelayError;

/// Prefix that marks a fragment-carrying line.
const DATA_PREFIX: &str = "data: ";

/// Incremental UTF-8 line splitter.
///
/// Owned by exactly one decode operation. Whatever is left in the buffer when
/// the operation ends is discarded.
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Bytes of an incomplete multi-byte sequence from the previous chunk.
    pending: Vec<u8>,
    /// Decoded text not yet terminated by `\n`.
    buffer: String,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every line it completed, without the `\n`.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.decode_utf8(chunk);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);
        complete[..last_newline]
            .split('\n')
            .map(str::to_owned)
            .collect()
    }

    /// Text received after the last newline.
    pub fn residual(&self) -> &str {
        &self.buffer
    }

    fn decode_utf8(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        // Truncated sequence at the end: wait for the next chunk.
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                    }
                }
            }
        }
    }
}

#[derive(Deserialize)]
struct DataLine {
    text: String,
}

/// Extracts the fragment from one complete line, if it carries one.
///
/// Lines without the `data: ` prefix are ignored. Prefixed lines whose payload
/// is not a JSON object with a string `text` field are logged and skipped.
pub fn parse_data_line(line: &str) -> Option<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?;

    match serde_json::from_str::<DataLine>(payload) {
        Ok(data) if !data.text.is_empty() => Some(data.text),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, line = %payload, "skipping malformed stream line");
            None
        }
    }
}

/// Decodes a streamed response body into text fragments.
///
/// The returned stream is lazy and single-pass. It ends when `bytes` ends; a
/// residual partial line is dropped. A transport error while reading `bytes`
/// ends the stream with [`RelayError::BackendUnavailable`]. No finish marker is
/// expected from the backend, so callers synthesize their own terminal event.
pub fn decode<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, RelayError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: std::error::Error + Send + Sync + 'static,
{
    try_stream! {
        let mut bytes = Box::pin(bytes);
        let mut lines = LineDecoder::new();
        let mut fragments = 0usize;

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk
                .map_err(|e| RelayError::unavailable_from(format!("stream read failed: {e}"), e))?;
            for line in lines.push(chunk.as_ref()) {
                if let Some(fragment) = parse_data_line(&line) {
                    fragments += 1;
                    yield fragment;
                }
            }
        }

        debug!(
            fragments,
            discarded = lines.residual().len(),
            "byte stream ended"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::stream;
    use proptest::prelude::*;
    use tracing_test::traced_test;

    fn chunks(parts: Vec<Vec<u8>>) -> impl Stream<Item = Result<Vec<u8>, std::io::Error>> + Send {
        stream::iter(parts.into_iter().map(Ok))
    }

    fn decode_all(parts: Vec<Vec<u8>>) -> Vec<String> {
        block_on(decode(chunks(parts)).collect::<Vec<_>>())
            .into_iter()
            .map(|r| r.unwrap())
            .collect()
    }

    fn data_line(text: &str) -> String {
        format!("data: {}\n", serde_json::json!({ "text": text }))
    }

    #[test]
    fn line_decoder_keeps_incomplete_tail() {
        let mut lines = LineDecoder::new();
        assert!(lines.push(b"abc").is_empty());
        assert_eq!(lines.push(b"def\nghi"), vec!["abcdef".to_string()]);
        assert_eq!(lines.residual(), "ghi");
        assert_eq!(
            lines.push(b"\n\njkl\n"),
            vec!["ghi".to_string(), String::new(), "jkl".to_string()]
        );
        assert_eq!(lines.residual(), "");
    }

    #[test]
    fn line_decoder_carries_split_utf8() {
        let bytes = "é€\n".as_bytes();
        let mut lines = LineDecoder::new();
        for b in &bytes[..bytes.len() - 1] {
            assert!(lines.push(std::slice::from_ref(b)).is_empty());
        }
        assert_eq!(lines.push(&bytes[bytes.len() - 1..]), vec!["é€".to_string()]);
    }

    #[test]
    fn line_decoder_replaces_invalid_bytes() {
        let mut lines = LineDecoder::new();
        assert_eq!(lines.push(b"a\xffb\n"), vec!["a\u{FFFD}b".to_string()]);
    }

    #[test]
    fn decodes_fragments_and_drops_trailing_partial_line() {
        let body = "data: {\"text\":\"he\"}\ndata: {\"text\":\"llo\"}\ndata: {\"text\":\"lost";
        assert_eq!(decode_all(vec![body.as_bytes().to_vec()]), vec!["he", "llo"]);
    }

    #[test]
    fn ignores_lines_without_data_prefix() {
        let body = ": keep-alive\nevent: message\ndata: {\"text\":\"x\"}\n\n";
        assert_eq!(decode_all(vec![body.as_bytes().to_vec()]), vec!["x"]);
    }

    #[test]
    fn trims_carriage_returns() {
        let body = "data: {\"text\":\"a\"}\r\ndata: {\"text\":\"b\"}\r\n";
        assert_eq!(decode_all(vec![body.as_bytes().to_vec()]), vec!["a", "b"]);
    }

    #[test]
    #[traced_test]
    fn malformed_line_is_skipped_and_logged() {
        let body = "data: {\"text\":\"one\"}\ndata: {not json\ndata: {\"text\":\"two\"}\n";
        assert_eq!(decode_all(vec![body.as_bytes().to_vec()]), vec!["one", "two"]);
        assert!(logs_contain("skipping malformed stream line"));
    }

    #[test]
    fn data_line_without_text_field_is_skipped() {
        assert_eq!(parse_data_line("data: {\"delta\":\"x\"}"), None);
        assert_eq!(parse_data_line("data: \"bare\""), None);
        assert_eq!(parse_data_line("data: {\"text\":\"\"}"), None);
        assert_eq!(parse_data_line("data:{\"text\":\"x\"}"), None);
    }

    #[test]
    fn transport_error_ends_stream_with_unavailable() {
        let parts: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(b"data: {\"text\":\"ok\"}\n".to_vec()),
            Err(std::io::Error::other("connection reset")),
            Ok(b"data: {\"text\":\"never\"}\n".to_vec()),
        ];
        let items = block_on(decode(stream::iter(parts)).collect::<Vec<_>>());
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().unwrap(), "ok");
        assert!(matches!(
            items[1],
            Err(RelayError::BackendUnavailable { .. })
        ));
    }

    #[test]
    fn dropping_after_first_fragment_stops_decoding() {
        let body = format!("{}{}", data_line("first"), data_line("second"));
        let mut stream = Box::pin(decode(chunks(vec![body.into_bytes()])));
        let first = block_on(stream.next()).unwrap().unwrap();
        assert_eq!(first, "first");
        drop(stream);
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_fragments(
            texts in prop::collection::vec("\\PC{1,12}", 1..8),
            cuts in prop::collection::vec(any::<prop::sample::Index>(), 0..12),
        ) {
            let body: String = texts.iter().map(|t| data_line(t)).collect();
            let bytes = body.into_bytes();

            let mut offsets: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
            offsets.sort_unstable();
            offsets.dedup();
            let mut parts = Vec::new();
            let mut start = 0;
            for offset in offsets {
                parts.push(bytes[start..offset].to_vec());
                start = offset;
            }
            parts.push(bytes[start..].to_vec());

            let whole = decode_all(vec![bytes.clone()]);
            let split = decode_all(parts);
            prop_assert_eq!(&whole, &texts);
            prop_assert_eq!(split, whole);
        }

        #[test]
        fn one_malformed_line_among_valid_lines(
            texts in prop::collection::vec("[a-z ]{1,8}", 1..10),
            position in any::<prop::sample::Index>(),
        ) {
            let mut lines: Vec<String> = texts.iter().map(|t| data_line(t)).collect();
            lines.insert(position.index(lines.len() + 1), "data: {\"text\": oops}\n".to_string());
            let body: String = lines.concat();

            prop_assert_eq!(decode_all(vec![body.into_bytes()]), texts);
        }
    }
}
