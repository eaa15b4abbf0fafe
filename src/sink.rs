use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::Error;

/// Destination for rendered statements, keyed by relative output path.
pub trait Sink {
    fn write_output(&mut self, path: &Path, contents: &[u8]) -> Result<(), Error>;
}

/// Writes each output to a file below a base directory.
///
/// Outputs are written to a temporary sibling file and renamed into place,
/// so an existing output is either left alone or fully replaced.
#[derive(Debug)]
pub struct DirSink {
    path: PathBuf,
}

impl DirSink {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(DirSink {
            path: path.as_ref().to_owned(),
        })
    }

    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.path.join(path)
    }

    fn tmp_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().unwrap_or_default().to_owned();
        name.push(".tmp");
        path.with_file_name(name)
    }

    fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        if let Some(base) = path.parent() {
            fs::create_dir_all(base)?;
        }
        let tmp = DirSink::tmp_path(path);
        let result = File::create(&tmp).and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        });
        if let Err(e) = result.and_then(|_| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        Ok(())
    }
}

impl Sink for DirSink {
    fn write_output(&mut self, path: &Path, contents: &[u8]) -> Result<(), Error> {
        let path = self.resolve(path);
        DirSink::replace_file(&path, contents).map_err(|e| Error::io(path, e))
    }
}

/// Writes all outputs, each preceded by an SQL comment naming it, to a
/// single stream.
#[derive(Debug)]
pub struct StreamSink<W> {
    writer: W,
}

impl<W: Write> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        StreamSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_labeled(&mut self, path: &Path, contents: &[u8]) -> io::Result<()> {
        writeln!(self.writer, "-- {}", path.display())?;
        self.writer.write_all(contents)?;
        self.writer.flush()
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn write_output(&mut self, path: &Path, contents: &[u8]) -> Result<(), Error> {
        self.write_labeled(path, contents)
            .map_err(|e| Error::io(path, e))
    }
}
