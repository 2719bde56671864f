// laralog - platform/fs.rs
//
// Real filesystem implementation of the core `LogOpener` seam.

use crate::core::parser::LogOpener;
use crate::util::constants;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Opens log files from disk with a large read buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsOpener;

impl LogOpener for FsOpener {
    fn open(&self, path: &Path) -> io::Result<Box<dyn BufRead + Send>> {
        let file = File::open(path)?;
        tracing::trace!(path = %path.display(), "Opened log file");
        Ok(Box::new(BufReader::with_capacity(
            constants::READ_BUFFER_SIZE,
            file,
        )))
    }
}
