use std::{cell::RefCell, fmt::Write, fs::File, io, rc::Rc};

pub type RcRefCell<T> = Rc<RefCell<T>>;

fn rc_ref_cell<T>(t: T) -> RcRefCell<T> {
    Rc::new(RefCell::new(t))
}

pub struct StringBuffer {
    s: String,
}

impl StringBuffer {
    pub fn new() -> StringBuffer {
        StringBuffer { s: String::new() }
    }

    pub fn as_str(&self) -> &str {
        self.s.as_str()
    }

    /// Takes the buffered text, leaving the buffer empty.
    pub fn export_string(&mut self) -> String {
        std::mem::take(&mut self.s)
    }
}

impl Default for StringBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// String only implements fmt::Write
impl io::Write for StringBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let str_rep = std::str::from_utf8(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        match self.s.write_str(str_rep) {
            Ok(_) => Ok(buf.len()),
            Err(e) => Err(io::Error::new(io::ErrorKind::Other, e)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// A shared stream writer, so output and user-facing errors can go to
// stdout/stderr in the CLI, or be buffered and inspected in tests.
#[derive(Clone)]
pub struct WriteHandle {
    w: RcRefCell<dyn io::Write>,
}

impl WriteHandle {
    pub fn stdout_write_handle() -> WriteHandle {
        WriteHandle { w: rc_ref_cell(io::stdout()) }
    }

    pub fn stderr_write_handle() -> WriteHandle {
        WriteHandle { w: rc_ref_cell(io::stderr()) }
    }

    pub fn string_buff_write_handle() -> (WriteHandle, RcRefCell<StringBuffer>) {
        let buffer = rc_ref_cell(StringBuffer::new());
        let h = WriteHandle { w: buffer.clone() };
        (h, buffer)
    }

    pub fn file_write_handle(f: File) -> WriteHandle {
        WriteHandle { w: rc_ref_cell(io::BufWriter::new(f)) }
    }

    pub fn empty_write_handle() -> WriteHandle {
        WriteHandle { w: rc_ref_cell(io::sink()) }
    }
}

impl io::Write for WriteHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // The test harness cannot capture direct writes to stdout or stderr,
        // so mirror them into the trace log.
        tracing::trace!("WriteHandle::write {}", String::from_utf8_lossy(buf));
        self.w.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.w.borrow_mut().flush()
    }
}
