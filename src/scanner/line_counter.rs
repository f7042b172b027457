use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// 单个文件的读取缓冲大小
const READ_BUFFER_SIZE: usize = 64 * 1024;

/// 行数统计器 - 按字节流统计行数，不要求文件是合法的 UTF-8
pub struct LineCounter;

/// 跨缓冲区保持的扫描状态
#[derive(Debug, Default)]
struct LineScan {
    lines: u64,

    /// 上一个字节是 `\r`，紧随的 `\n` 不再单独计数
    after_cr: bool,

    /// 当前行是否已出现可解码的字符
    segment_has_char: bool,

    /// 未完成的多字节 UTF-8 序列
    pending: [u8; 4],
    pending_len: usize,
    pending_need: usize,
}

impl LineScan {
    fn feed(&mut self, buf: &[u8]) {
        for &b in buf {
            match b {
                b'\r' => {
                    self.lines += 1;
                    self.after_cr = true;
                    self.reset_segment();
                }
                b'\n' => {
                    if !self.after_cr {
                        self.lines += 1;
                    }
                    self.after_cr = false;
                    self.reset_segment();
                }
                _ => {
                    self.after_cr = false;
                    if !self.segment_has_char {
                        self.decode_byte(b);
                    }
                }
            }
        }
    }

    /// 只判断当前行里是否有合法字符，非法字节直接丢弃
    fn decode_byte(&mut self, b: u8) {
        if self.pending_len > 0 {
            if (0x80..=0xBF).contains(&b) {
                self.pending[self.pending_len] = b;
                self.pending_len += 1;
                if self.pending_len == self.pending_need {
                    if std::str::from_utf8(&self.pending[..self.pending_len]).is_ok() {
                        self.segment_has_char = true;
                    }
                    self.pending_len = 0;
                }
                return;
            }
            // 序列被打断，当前字节重新作为起始字节处理
            self.pending_len = 0;
        }

        let need = match b {
            0x00..=0x7F => {
                self.segment_has_char = true;
                return;
            }
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return,
        };
        self.pending[0] = b;
        self.pending_len = 1;
        self.pending_need = need;
    }

    fn reset_segment(&mut self) {
        self.segment_has_char = false;
        self.pending_len = 0;
    }

    fn finish(self) -> u64 {
        if self.segment_has_char {
            self.lines + 1
        } else {
            self.lines
        }
    }
}

impl LineCounter {
    /// 统计文件行数，无法打开或读取的文件返回 0
    pub fn count_file(path: &Path) -> u64 {
        match File::open(path).and_then(Self::count_reader) {
            Ok(count) => count,
            Err(err) => {
                tracing::debug!("无法读取文件 {}: {}", path.display(), err);
                0
            }
        }
    }

    /// 统计任意读取源的行数
    ///
    /// `\n`、`\r`、`\r\n` 各算一个行结束符。非法 UTF-8 字节被忽略，
    /// 末尾没有结束符的最后一行只有含合法字符时才计数。
    pub fn count_reader<R: Read>(reader: R) -> io::Result<u64> {
        let mut reader = BufReader::with_capacity(READ_BUFFER_SIZE, reader);
        let mut scan = LineScan::default();

        loop {
            let buf = reader.fill_buf()?;
            if buf.is_empty() {
                break;
            }

            scan.feed(buf);

            let consumed = buf.len();
            reader.consume(consumed);
        }

        Ok(scan.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    /// 每次只返回一个字节的读取源
    struct ByteByByte<'a>(&'a [u8]);

    impl Read for ByteByByte<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            match self.0.split_first() {
                Some((&b, rest)) if !out.is_empty() => {
                    out[0] = b;
                    self.0 = rest;
                    Ok(1)
                }
                _ => Ok(0),
            }
        }
    }

    #[test]
    fn test_count_terminated_lines() {
        let count = LineCounter::count_reader("a\nb\nc\n".as_bytes()).unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_trailing_line_without_newline() {
        assert_eq!(LineCounter::count_reader("a\nb".as_bytes()).unwrap(), 2);
        assert_eq!(LineCounter::count_reader("single".as_bytes()).unwrap(), 1);
    }

    #[test]
    fn test_empty_and_crlf() {
        assert_eq!(LineCounter::count_reader("".as_bytes()).unwrap(), 0);
        assert_eq!(LineCounter::count_reader("a\r\nb\r\n".as_bytes()).unwrap(), 2);
        assert_eq!(LineCounter::count_reader("\n\n".as_bytes()).unwrap(), 2);
    }

    #[test]
    fn test_bare_cr_ends_a_line() {
        assert_eq!(LineCounter::count_reader("a\rb\rc\r".as_bytes()).unwrap(), 3);
        assert_eq!(LineCounter::count_reader("a\rb\r\nc\nd".as_bytes()).unwrap(), 4);
        assert_eq!(LineCounter::count_reader("\r\r".as_bytes()).unwrap(), 2);
    }

    #[test]
    fn test_crlf_across_buffer_boundary() {
        // 第一个缓冲区恰好以 \r 结尾
        let mut data = vec![b'x'; READ_BUFFER_SIZE - 1];
        data.extend_from_slice(b"\r\ny\n");
        assert_eq!(data[READ_BUFFER_SIZE - 1], b'\r');

        assert_eq!(LineCounter::count_reader(data.as_slice()).unwrap(), 2);
        assert_eq!(LineCounter::count_reader(ByteByByte(&data)).unwrap(), 2);
    }

    #[test]
    fn test_multibyte_char_split_across_reads() {
        let data = "a\n中".as_bytes();
        assert_eq!(LineCounter::count_reader(ByteByByte(data)).unwrap(), 2);
    }

    #[test]
    fn test_invalid_tail_is_not_a_line() {
        assert_eq!(LineCounter::count_reader(&b"a\n\xff"[..]).unwrap(), 1);
        assert_eq!(LineCounter::count_reader(&b"a\n\xe4\xb8"[..]).unwrap(), 1);
        assert_eq!(LineCounter::count_reader(&b"a\n\xffb"[..]).unwrap(), 2);
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("blob.bin");
        fs::write(&path, [0xff, 0xfe, b'\n', 0xc3, 0x28, b'\n', 0x80]).unwrap();

        assert_eq!(LineCounter::count_file(&path), 2);
    }

    #[test]
    fn test_large_file_spans_buffers() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("big.txt");
        let line = "x".repeat(999) + "\n";
        fs::write(&path, line.repeat(200)).unwrap();

        assert_eq!(LineCounter::count_file(&path), 200);
    }

    #[test]
    fn test_cr_only_file_is_not_small() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("classic_mac.txt");
        fs::write(&path, "line\r".repeat(300)).unwrap();

        assert_eq!(LineCounter::count_file(&path), 300);
    }

    #[test]
    fn test_unreadable_path_counts_zero() {
        let temp_dir = tempdir().unwrap();
        assert_eq!(LineCounter::count_file(&temp_dir.path().join("missing.rs")), 0);
        // 目录可以打开但无法按文件读取
        assert_eq!(LineCounter::count_file(temp_dir.path()), 0);
    }
}
