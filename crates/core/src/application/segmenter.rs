// Segmenter - splits a line stream into blank-line delimited paragraphs

use crate::application::dispatch::constants::{
    PARAGRAPH_CHANNEL_CAPACITY, READER_THREAD_NAME, READ_DIAGNOSTIC_PREFIX,
};
use crate::domain::Paragraph;
use crate::port::DiagnosticSink;
use std::io::{self, BufRead};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Lazy, single-pass paragraph sequence over a buffered reader.
///
/// Line endings (`\n` or `\r\n`) are normalised to `\n`. A line is blank
/// only when nothing is left after removing its line ending. Blank lines
/// close the current paragraph; leading and repeated blank lines are
/// dropped. The last paragraph does not need a closing blank line.
///
/// A read error ends the sequence like end of input does. Complete lines
/// already accumulated are still emitted as a final paragraph, then the
/// error is yielded once. A line cut off by the error is dropped.
pub struct Segmenter<R> {
    reader: R,
    line: Vec<u8>,
    pending: Vec<u8>,
    emitted: usize,
    finished: bool,
    failure: Option<io::Error>,
}

impl<R: BufRead> Segmenter<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
            pending: Vec::new(),
            emitted: 0,
            finished: false,
            failure: None,
        }
    }

    fn take_paragraph(&mut self) -> Paragraph {
        self.emitted += 1;
        Paragraph::new(self.emitted, std::mem::take(&mut self.pending))
    }
}

impl<R: BufRead> Iterator for Segmenter<R> {
    type Item = io::Result<Paragraph>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.failure.take() {
            return Some(Err(e));
        }
        if self.finished {
            return None;
        }

        loop {
            self.line.clear();
            match self.reader.read_until(b'\n', &mut self.line) {
                Ok(0) => {
                    self.finished = true;
                    if self.pending.is_empty() {
                        return None;
                    }
                    return Some(Ok(self.take_paragraph()));
                }
                Ok(_) => {
                    let content = strip_line_ending(&self.line);
                    if !content.is_empty() {
                        self.pending.extend_from_slice(content);
                        self.pending.push(b'\n');
                    } else if !self.pending.is_empty() {
                        return Some(Ok(self.take_paragraph()));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    if self.pending.is_empty() {
                        return Some(Err(e));
                    }
                    self.failure = Some(e);
                    return Some(Ok(self.take_paragraph()));
                }
            }
        }
    }
}

fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Run a Segmenter over `reader` on a dedicated thread.
///
/// Paragraphs are handed over through a single-slot channel, so the reader
/// never runs more than one paragraph ahead of the consumer. The channel
/// closes at end of input, after a read error (recorded through `sink` once
/// the paragraphs read before it are handed over), or
/// when the receiver is dropped.
///
/// A plain OS thread is used because blocking stdin reads cannot be
/// cancelled and must not hold the async runtime open at exit.
pub fn spawn_reader<R>(
    reader: R,
    sink: Arc<dyn DiagnosticSink>,
) -> io::Result<mpsc::Receiver<Paragraph>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(PARAGRAPH_CHANNEL_CAPACITY);

    std::thread::Builder::new()
        .name(READER_THREAD_NAME.to_string())
        .spawn(move || pump(Segmenter::new(reader), &tx, sink.as_ref()))?;

    Ok(rx)
}

fn pump<R: BufRead>(
    segmenter: Segmenter<R>,
    tx: &mpsc::Sender<Paragraph>,
    sink: &dyn DiagnosticSink,
) {
    for item in segmenter {
        match item {
            Ok(paragraph) => {
                debug!(
                    paragraph = paragraph.index(),
                    lines = paragraph.line_count(),
                    bytes = paragraph.len(),
                    "Paragraph ready"
                );
                if tx.blocking_send(paragraph).is_err() {
                    debug!("Paragraph consumer gone, stopping reader");
                    return;
                }
            }
            Err(e) => {
                warn!(error = %e, "Input stream failed, treating as end of input");
                sink.record(&format!("{}: {}", READ_DIAGNOSTIC_PREFIX, e));
                return;
            }
        }
    }
    debug!("Input exhausted");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::diagnostic_sink::mocks::MemorySink;
    use std::io::{BufReader, Read};

    fn segment(input: &[u8]) -> Vec<String> {
        Segmenter::new(input)
            .map(|p| String::from_utf8(p.unwrap().into_bytes()).unwrap())
            .collect()
    }

    #[test]
    fn test_blank_only_inputs_yield_nothing() {
        for input in ["", "\n", "\r\n", "\n\n\n", "\r\n\n\r\n"] {
            assert!(segment(input.as_bytes()).is_empty(), "input {:?}", input);
        }
    }

    #[test]
    fn test_single_line_variants() {
        for input in [
            "1", "1\n", "1\r\n", "\n1", "\r\n1", "\n1\n", "\r\n1\r\n", "\r\n1\n", "\n1\r\n",
        ] {
            assert_eq!(segment(input.as_bytes()), ["1\n"], "input {:?}", input);
        }
    }

    #[test]
    fn test_paragraph_boundaries() {
        let cases: &[(&str, &[&str])] = &[
            ("1\n2", &["1\n2\n"]),
            ("1\n\n2", &["1\n", "2\n"]),
            ("1\n\n\n2", &["1\n", "2\n"]),
            ("1\n\n2\n3", &["1\n", "2\n3\n"]),
            ("1\n2\n\n3", &["1\n2\n", "3\n"]),
            ("1\n\n2\n\n3", &["1\n", "2\n", "3\n"]),
            ("1\n\n\n2\n\n\n3", &["1\n", "2\n", "3\n"]),
        ];
        for (input, expected) in cases {
            assert_eq!(segment(input.as_bytes()), *expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_crlf_normalised() {
        assert_eq!(segment(b"a\r\nb\r\n\r\nc"), ["a\nb\n", "c\n"]);
        assert_eq!(segment(b"a\nb\n"), segment(b"a\r\nb\r\n"));
    }

    #[test]
    fn test_whitespace_line_is_content() {
        assert_eq!(segment(b"a\n  \nb\n"), ["a\n  \nb\n"]);
    }

    #[test]
    fn test_indices_follow_stream_order() {
        let indices: Vec<usize> = Segmenter::new(&b"a\n\nb\n\n\nc"[..])
            .map(|p| p.unwrap().index())
            .collect();
        assert_eq!(indices, [1, 2, 3]);
    }

    #[test]
    fn test_non_utf8_passes_through() {
        let input = [0xff, b'\n', b'\n', 0xfe];
        let paragraphs: Vec<Vec<u8>> = Segmenter::new(&input[..])
            .map(|p| p.unwrap().into_bytes())
            .collect();
        assert_eq!(paragraphs, [vec![0xff, b'\n'], vec![0xfe, b'\n']]);
    }

    /// Yields `data`, then fails
    struct FailingReader {
        data: &'static [u8],
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::Other, "device gone"));
            }
            let n = self.data.len().min(buf.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_ends_sequence() {
        let reader = BufReader::new(FailingReader {
            data: b"a\n\nb\nc\n",
        });
        let mut segmenter = Segmenter::new(reader);

        assert_eq!(segmenter.next().unwrap().unwrap().as_bytes(), b"a\n");
        assert_eq!(segmenter.next().unwrap().unwrap().as_bytes(), b"b\nc\n");
        assert!(segmenter.next().unwrap().is_err());
        assert!(segmenter.next().is_none());
    }

    #[test]
    fn test_read_error_after_blank_line_yields_only_error() {
        let reader = BufReader::new(FailingReader { data: b"a\n\n" });
        let mut segmenter = Segmenter::new(reader);

        assert_eq!(segmenter.next().unwrap().unwrap().as_bytes(), b"a\n");
        assert!(segmenter.next().unwrap().is_err());
        assert!(segmenter.next().is_none());
    }

    #[test]
    fn test_read_error_drops_cut_off_line() {
        let reader = BufReader::new(FailingReader { data: b"a\nb" });
        let items: Vec<_> = Segmenter::new(reader).collect();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap().as_bytes(), b"a\n");
        assert!(items[1].is_err());
    }

    #[tokio::test]
    async fn test_spawn_reader_delivers_in_order() {
        let sink = Arc::new(MemorySink::new());
        let mut rx = spawn_reader(&b"one\n\ntwo\nlines\n\n\nthree"[..], sink.clone()).unwrap();

        let mut received = Vec::new();
        while let Some(paragraph) = rx.recv().await {
            received.push(String::from_utf8(paragraph.into_bytes()).unwrap());
        }

        assert_eq!(received, ["one\n", "two\nlines\n", "three\n"]);
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn test_spawn_reader_reports_read_error() {
        let sink = Arc::new(MemorySink::new());
        let reader = BufReader::new(FailingReader {
            data: b"p1\n\na\nb\n",
        });
        let mut rx = spawn_reader(reader, sink.clone()).unwrap();

        assert_eq!(rx.recv().await.unwrap().as_bytes(), b"p1\n");
        assert_eq!(rx.recv().await.unwrap().as_bytes(), b"a\nb\n");
        assert!(rx.recv().await.is_none());
        assert_eq!(sink.lines(), ["error reading input: device gone"]);
    }
}
