//! Line reassembly for streamed child output
//!
//! Child processes write in arbitrary chunks; a record may span several
//! chunks and a chunk may carry zero or many records. `LineAssembler`
//! buffers the partial tail and hands back complete records as they
//! close.

/// Per-stream partial-line buffer.
///
/// Records include their terminator. A CR closes a record on its own;
/// the LF of a CRLF pair is swallowed silently, even when it arrives in
/// a later chunk.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Vec<u8>,
    skip_lf: bool,
}

impl LineAssembler {
    /// Create an empty assembler
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk, returning every record completed by it
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut records = Vec::new();
        loop {
            if self.skip_lf {
                match self.buf.first() {
                    Some(b'\n') => {
                        self.buf.remove(0);
                        self.skip_lf = false;
                    }
                    Some(_) => self.skip_lf = false,
                    // Still waiting to see the byte after the CR
                    None => break,
                }
            }

            let Some(pos) = self.buf.iter().position(|&b| b == b'\r' || b == b'\n') else {
                break;
            };

            let terminator = self.buf[pos];
            let record: Vec<u8> = self.buf.drain(..=pos).collect();
            if terminator == b'\r' {
                self.skip_lf = true;
            }
            records.push(String::from_utf8_lossy(&record).into_owned());
        }
        records
    }

    /// Close the stream, returning the unterminated tail if any
    pub fn finish(self) -> Option<String> {
        if self.buf.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.buf).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_spanning_chunks() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.feed(b"foo\r\nbar"), vec!["foo\r".to_string()]);
        assert_eq!(asm.feed(b"baz\n"), vec!["barbaz\n".to_string()]);
        assert_eq!(asm.finish(), None);
    }

    #[test]
    fn chunk_with_many_records() {
        let mut asm = LineAssembler::new();
        let records = asm.feed(b"one\ntwo\nthree");
        assert_eq!(records, vec!["one\n".to_string(), "two\n".to_string()]);
        assert_eq!(asm.finish(), Some("three".to_string()));
    }

    #[test]
    fn chunk_with_no_record() {
        let mut asm = LineAssembler::new();
        assert!(asm.feed(b"partial").is_empty());
        assert!(asm.feed(b" line").is_empty());
        assert_eq!(asm.feed(b"!\n"), vec!["partial line!\n".to_string()]);
    }

    #[test]
    fn crlf_split_across_chunks() {
        let mut asm = LineAssembler::new();
        assert_eq!(asm.feed(b"foo\r"), vec!["foo\r".to_string()]);
        // The LF completing the pair must not become its own record
        assert!(asm.feed(b"\n").is_empty());
        assert_eq!(asm.feed(b"bar\n"), vec!["bar\n".to_string()]);
    }

    #[test]
    fn bare_cr_records() {
        let mut asm = LineAssembler::new();
        let records = asm.feed(b"a\rb\rc");
        assert_eq!(records, vec!["a\r".to_string(), "b\r".to_string()]);
        assert_eq!(asm.finish(), Some("c".to_string()));
    }

    #[test]
    fn empty_line_is_a_record() {
        let mut asm = LineAssembler::new();
        assert_eq!(
            asm.feed(b"x\n\ny\n"),
            vec!["x\n".to_string(), "\n".to_string(), "y\n".to_string()]
        );
    }
}
