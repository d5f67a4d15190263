use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Opens a writable byte sink for a named printer (§6 "printer transport
/// contract"). Kept as a trait so a real CUPS/lpr-backed transport can be
/// substituted without touching the spawner — the spawner only needs an
/// owned `File`-like handle it can hand to the pipeline's last stage.
pub trait PrinterTransport: Send + Sync {
    fn connect(&self, printer_name: &str, file_type: &str) -> io::Result<File>;
}

/// Default transport: writes each print to a regular file under a spool
/// directory, so the supervisor is fully runnable and testable without
/// real printer hardware. Truncates on each connect, matching "closing it
/// finalizes the print" from the transport contract.
pub struct FileTransport {
    spool_dir: PathBuf,
}

impl FileTransport {
    pub fn new(spool_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let spool_dir = spool_dir.into();
        fs::create_dir_all(&spool_dir)?;
        Ok(Self { spool_dir })
    }
}

impl PrinterTransport for FileTransport {
    fn connect(&self, printer_name: &str, _file_type: &str) -> io::Result<File> {
        let path = Path::new(&self.spool_dir).join(printer_name);
        OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_creates_a_file_under_the_spool_dir() {
        let dir = tempfile::tempdir().unwrap();
        let transport = FileTransport::new(dir.path()).unwrap();
        let file = transport.connect("p1", "txt").unwrap();
        drop(file);
        assert!(dir.path().join("p1").exists());
    }

    #[test]
    fn connect_truncates_on_reuse() {
        use std::io::{Read, Write};

        let dir = tempfile::tempdir().unwrap();
        let transport = FileTransport::new(dir.path()).unwrap();

        let mut first = transport.connect("p1", "txt").unwrap();
        first.write_all(b"first print job").unwrap();
        drop(first);

        let mut second = transport.connect("p1", "txt").unwrap();
        let mut contents = String::new();
        second.read_to_string(&mut contents).unwrap();
        assert!(contents.is_empty());
    }
}
