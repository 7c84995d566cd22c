//! Log redaction for patient identifiers.
//!
//! Assessment records carry a random identifier and callers may log free
//! text next to them. Every formatted log line passes through
//! [`RedactingMakeWriter`], which replaces:
//! - record identifiers (UUID format)
//! - medical record numbers (MRNs)
//! - SSN-like numbers
//! - email addresses and phone numbers
//!
//! Clinical values are never logged by this crate in the first place; this is
//! a second line for text that reaches the log through other paths.

use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

/// Lines longer than this are cut before redaction.
const MAX_LINE_BYTES: usize = 16 * 1024;

struct Redactions {
    any: RegexSet,
    each: Vec<(Regex, &'static str)>,
}

static REDACTIONS: OnceLock<Redactions> = OnceLock::new();

fn redactions() -> &'static Redactions {
    REDACTIONS.get_or_init(|| {
        let rules: [(&str, &'static str); 5] = [
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[REDACTED-ID]",
            ),
            (r"\bMRN[:\s]?\d{6,10}\b", "[REDACTED-MRN]"),
            (r"\b\d{3}-\d{2}-\d{4}\b", "[REDACTED-SSN]"),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            (
                r"\b(?:\+?1[-.\s]?)?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}\b",
                "[REDACTED-PHONE]",
            ),
        ];

        // Patterns are literals; a failure here is a programming error caught by tests.
        let any = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("valid redaction set");
        let each = rules
            .iter()
            .map(|(p, r)| (Regex::new(p).expect("valid redaction pattern"), *r))
            .collect();
        Redactions { any, each }
    })
}

fn cut_at_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Replace identifiers in `input`.
#[must_use]
pub fn redact(input: &str) -> String {
    redact_with_limit(input, MAX_LINE_BYTES)
}

fn redact_with_limit(input: &str, max_bytes: usize) -> String {
    let (text, truncated) = cut_at_char_boundary(input, max_bytes);
    let redactions = redactions();

    let mut out = text.to_string();
    for idx in redactions.any.matches(text).into_iter() {
        let (regex, replacement) = &redactions.each[idx];
        out = regex.replace_all(&out, *replacement).into_owned();
    }
    if truncated {
        out.push_str(" [TRUNCATED]");
    }
    out
}

/// `MakeWriter` wrapper that redacts each log line before it reaches `inner`.
#[derive(Debug, Clone)]
pub struct RedactingMakeWriter<M> {
    inner: M,
}

impl<M> RedactingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Line-buffering writer produced by [`RedactingMakeWriter`].
pub struct RedactingWriter<W: std::io::Write> {
    inner: W,
    pending: Vec<u8>,
}

impl<W: std::io::Write> RedactingWriter<W> {
    fn emit(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let line = String::from_utf8_lossy(bytes);
        self.inner.write_all(redact(&line).as_bytes())
    }

    fn drain_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.emit(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.pending.extend_from_slice(buf);

        if self.pending.len() > MAX_LINE_BYTES * 2 {
            let oversized = std::mem::take(&mut self.pending);
            self.emit(&oversized)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.drain_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.drain_lines()?;
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.emit(&rest)?;
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for RedactingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
            pending: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_redacts_record_id() {
        let out = redact("assessment 550e8400-e29b-41d4-a716-446655440000 stored");
        assert_eq!(out, "assessment [REDACTED-ID] stored");
    }

    #[test]
    fn test_redacts_contact_details() {
        let out = redact("patient jane.doe@clinic.org, MRN:12345678, SSN 123-45-6789");
        assert!(out.contains("[REDACTED-EMAIL]"));
        assert!(out.contains("[REDACTED-MRN]"));
        assert!(out.contains("[REDACTED-SSN]"));
        assert!(!out.contains("jane.doe"));
    }

    #[test]
    fn test_plain_text_untouched() {
        let line = "Assessment complete: score=0.45, band=MODERATE, contributions=4";
        assert_eq!(redact(line), line);
    }

    #[test]
    fn test_truncation() {
        let out = redact_with_limit("abcdef", 3);
        assert_eq!(out, "abc [TRUNCATED]");
    }

    #[derive(Clone, Default)]
    struct Sink(Arc<Mutex<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("sink lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_redacts_split_lines() {
        let sink = Sink::default();
        let make = RedactingMakeWriter::new({
            let sink = sink.clone();
            move || sink.clone()
        });

        {
            let mut writer = make.make_writer();
            writer.write_all(b"id 550e8400-e29b-").expect("write");
            writer.write_all(b"41d4-a716-446655440000\npartial").expect("write");
        }

        let written = String::from_utf8(sink.0.lock().expect("sink lock").clone()).expect("utf8");
        assert_eq!(written, "id [REDACTED-ID]\npartial");
    }
}
