use crate::statement::Transaction;
use crate::util::rw::WriteHandle;

use super::model::{render_row, Error, TransactionWriter, COLUMNS};

pub struct CsvWriter {
    csv_w: csv::Writer<WriteHandle>,
    wrote_header: bool,
}

impl CsvWriter {
    pub fn new(w: WriteHandle) -> CsvWriter {
        CsvWriter {
            csv_w: csv::WriterBuilder::new()
                .has_headers(false)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(w),
            wrote_header: false,
        }
    }

    fn write_header(&mut self) -> Result<(), Error> {
        if !self.wrote_header {
            self.csv_w.write_record(COLUMNS).map_err(|e| e.to_string())?;
            self.wrote_header = true;
        }
        Ok(())
    }
}

impl TransactionWriter for CsvWriter {
    fn write_transactions(&mut self, txs: &[Transaction]) -> Result<(), Error> {
        self.write_header()?;
        for tx in txs {
            self.csv_w.write_record(render_row(tx)).map_err(|e| e.to_string())?;
        }
        // Flush per document, so rows show up while the batch is running.
        self.csv_w.flush().map_err(|e| e.to_string())
    }

    fn finish(mut self: Box<Self>) -> Result<(), Error> {
        self.write_header()?;
        self.csv_w.flush().map_err(|e| e.to_string())
    }
}
