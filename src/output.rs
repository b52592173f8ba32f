use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Error};
use tempfile::NamedTempFile;

use crate::data::STDIN_STDOUT;

/// Where rendered output goes.
///
/// File output is staged in a temporary file next to the target and only
/// persisted on `commit`, so a failed render leaves an existing file
/// untouched.
pub enum Output {
    Stdout,
    File {
        target: PathBuf,
        temp: NamedTempFile,
    },
}

impl Output {
    pub fn new(filename: &Path) -> Result<Output, Error> {
        if filename == Path::new(STDIN_STDOUT) {
            return Ok(Output::Stdout);
        }
        let target = std::env::current_dir()?.join(filename);
        let temp = NamedTempFile::new_in(
            target
                .parent()
                .ok_or_else(|| anyhow!("cannot write to root"))?,
        )?;
        Ok(Output::File { target, temp })
    }

    pub fn commit(self) -> Result<(), Error> {
        if let Output::File { target, temp } = self {
            temp.persist(target)?;
        }
        Ok(())
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout => io::stdout().write(buf),
            Output::File { temp, .. } => temp.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().flush(),
            Output::File { temp, .. } => temp.flush(),
        }
    }
}
