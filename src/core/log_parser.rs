/// Decoding of multiplexed container log streams
///
/// The host's combined stdout/stderr endpoint returns a sequence of frames:
///
/// ```text
/// [stream:u8][0u8; 3][len:u32 big-endian][payload; len]
/// ```
///
/// with `stream` in {0 = stdin, 1 = stdout, 2 = stderr}. Containers with a
/// TTY send plain bytes instead, so anything that does not start with a
/// valid stream selector is copied through byte by byte.

use regex::Regex;
use std::sync::OnceLock;

const HEADER_LEN: usize = 8;
const MAX_STREAM: u8 = 2;

/// Text shown for an empty log buffer
pub const EMPTY_LOGS: &str = "Logs are empty...";

/// Build one frame in the multiplexed wire format
pub fn encode_frame(stream: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.push(stream);
    frame.extend_from_slice(&[0, 0, 0]);
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Strip frame headers and concatenate payloads
///
/// If a header declares more payload than the buffer still holds, decoding
/// stops there and only the bytes decoded so far are returned.
pub fn demultiplex(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        let rest = &raw[i..];
        if rest.len() >= HEADER_LEN && rest[0] <= MAX_STREAM {
            let size = u32::from_be_bytes([rest[4], rest[5], rest[6], rest[7]]) as usize;
            let payload = &rest[HEADER_LEN..];
            if payload.len() < size {
                break;
            }
            out.extend_from_slice(&payload[..size]);
            i += HEADER_LEN + size;
        } else {
            out.push(rest[0]);
            i += 1;
        }
    }

    out
}

/// Demultiplex and reorder so the most recent line comes first
pub fn decode_logs(raw: &[u8]) -> String {
    if raw.is_empty() {
        return EMPTY_LOGS.to_string();
    }

    let decoded = demultiplex(raw);
    let text = String::from_utf8_lossy(&decoded);
    let mut lines: Vec<&str> = text.split('\n').collect();
    lines.reverse();
    lines.join("\n")
}

/// Highlight class of a severity token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warn,
    Info,
    Fail,
    /// Timezone marker in the host timestamp
    Zone,
}

impl Severity {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "ERROR" => Some(Severity::Error),
            "WARN" => Some(Severity::Warn),
            "INFO" => Some(Severity::Info),
            "FAIL" => Some(Severity::Fail),
            "UTC" => Some(Severity::Zone),
            _ => None,
        }
    }
}

/// A slice of a log line with an optional highlight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSegment<'a> {
    pub text: &'a str,
    pub severity: Option<Severity>,
}

/// Split a line into plain and highlighted segments
///
/// Concatenating the segment texts always gives back the input line.
pub fn segments(line: &str) -> Vec<LogSegment<'_>> {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    let token_re = TOKEN_RE.get_or_init(|| {
        Regex::new(r"ERROR|WARN|INFO|FAIL|UTC").expect("static token pattern")
    });

    let mut result = Vec::new();
    let mut last = 0;

    for m in token_re.find_iter(line) {
        if m.start() > last {
            result.push(LogSegment { text: &line[last..m.start()], severity: None });
        }
        result.push(LogSegment {
            text: m.as_str(),
            severity: Severity::from_token(m.as_str()),
        });
        last = m.end();
    }

    if last < line.len() || result.is_empty() {
        result.push(LogSegment { text: &line[last..], severity: None });
    }

    result
}
