const MAX_LINE_LEN: usize = 4096;

/// Accumulates raw socket bytes into newline-delimited lines.
///
/// CR is tolerated and dropped; framing splits on LF only. A line longer
/// than 4096 bytes is truncated (the excess bytes are discarded) rather
/// than allowed to grow without bound.
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Feed raw data into the buffer. Returns any complete lines.
    pub fn feed(&mut self, data: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in data {
            match byte {
                b'\n' => lines.push(self.take_line()),
                b'\r' => {}
                _ => {
                    if self.buf.len() < MAX_LINE_LEN {
                        self.buf.push(byte);
                    }
                }
            }
        }
        lines
    }

    fn take_line(&mut self) -> String {
        let bytes = std::mem::take(&mut self.buf);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line() {
        let mut lb = LineBuffer::new();
        assert_eq!(lb.feed(b"world.getBlock(0,0,0)\n"), vec!["world.getBlock(0,0,0)"]);
    }

    #[test]
    fn multiple_lines_one_read() {
        let mut lb = LineBuffer::new();
        assert_eq!(lb.feed(b"a\nb\n"), vec!["a", "b"]);
    }

    #[test]
    fn partial_line_held_until_newline() {
        let mut lb = LineBuffer::new();
        assert!(lb.feed(b"setPla").is_empty());
        assert_eq!(lb.feed(b"yer(steve,0,64,0)\n"), vec!["setPlayer(steve,0,64,0)"]);
    }

    #[test]
    fn crlf_tolerated() {
        let mut lb = LineBuffer::new();
        assert_eq!(lb.feed(b"chat.post(hi)\r\n"), vec!["chat.post(hi)"]);
    }

    #[test]
    fn overlong_line_truncated() {
        let mut lb = LineBuffer::new();
        lb.feed(&vec![b'x'; MAX_LINE_LEN + 500]);
        let lines = lb.feed(b"\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), MAX_LINE_LEN);
    }

    #[test]
    fn empty_line_preserved() {
        let mut lb = LineBuffer::new();
        assert_eq!(lb.feed(b"\n"), vec![""]);
    }
}
