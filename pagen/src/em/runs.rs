//! Sorted spill runs shared by the external sorter and priority queue.
//!
//! Mid-stream I/O failures on run files are fatal: the generation cannot
//! recover from a lost run, so we log a diagnostic and abort rather than
//! threading errors through every iterator in the pipeline.

use crate::em::record::Record;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::error;

const RUN_BUFFER_BYTES: usize = 1 << 20;

fn io_fatal(what: &str, path: &Path, err: std::io::Error) -> ! {
    error!(path = %path.display(), %err, "{what}");
    panic!("{what} ({}): {err}", path.display());
}

/// Append-only writer producing one sorted run file.
pub(crate) struct RunWriter<R: Record> {
    path: PathBuf,
    out: BufWriter<File>,
    len: u64,
    _marker: PhantomData<R>,
}

impl<R: Record> RunWriter<R> {
    pub(crate) fn create(dir: &Path, sequence: usize) -> Self {
        assert!(R::ENCODED_LEN <= 32, "record too wide for the run buffer");
        let path = dir.join(format!("run{sequence}"));
        let file = match File::create(&path) {
            Ok(file) => file,
            Err(err) => io_fatal("failed to create spill run", &path, err),
        };
        RunWriter {
            path,
            out: BufWriter::with_capacity(RUN_BUFFER_BYTES, file),
            len: 0,
            _marker: PhantomData,
        }
    }

    pub(crate) fn append(&mut self, record: &R) {
        let mut buf = [0u8; 32];
        record.encode(&mut buf[..R::ENCODED_LEN]);
        if let Err(err) = self.out.write_all(&buf[..R::ENCODED_LEN]) {
            io_fatal("failed to write spill run", &self.path, err);
        }
        self.len += 1;
    }

    /// Flush and reopen the run for reading.
    pub(crate) fn into_reader(mut self) -> RunReader<R> {
        if let Err(err) = self.out.flush() {
            io_fatal("failed to flush spill run", &self.path, err);
        }
        RunReader::open(self.path, self.len)
    }
}

/// Streams records back out of a finished run file.
pub(crate) struct RunReader<R: Record> {
    path: PathBuf,
    input: BufReader<File>,
    remaining: u64,
    _marker: PhantomData<R>,
}

impl<R: Record> RunReader<R> {
    fn open(path: PathBuf, len: u64) -> Self {
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) => io_fatal("failed to reopen spill run", &path, err),
        };
        RunReader {
            path,
            input: BufReader::with_capacity(RUN_BUFFER_BYTES, file),
            remaining: len,
            _marker: PhantomData,
        }
    }
}

impl<R: Record> Iterator for RunReader<R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        if self.remaining == 0 {
            return None;
        }
        let mut buf = [0u8; 32];
        if let Err(err) = self.input.read_exact(&mut buf[..R::ENCODED_LEN]) {
            io_fatal("failed to read spill run", &self.path, err);
        }
        self.remaining -= 1;
        Some(R::decode(&buf[..R::ENCODED_LEN]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}
