use std::io::Write;

use tabled::settings::{
    object::{Columns, Rows},
    Alignment, Style,
};

use crate::statement::Transaction;
use crate::util::rw::WriteHandle;

use super::model::{render_row, Error, TransactionWriter, COLUMNS};

/// Human-readable table. Rows are held until finish, so the columns can be
/// sized to fit.
pub struct TextWriter {
    w: WriteHandle,
    rows: Vec<Vec<String>>,
}

impl TextWriter {
    pub fn new(w: WriteHandle) -> TextWriter {
        TextWriter { w, rows: Vec::new() }
    }
}

// Index of the amount column
const AMOUNT_COL: usize = 2;

impl TransactionWriter for TextWriter {
    fn write_transactions(&mut self, txs: &[Transaction]) -> Result<(), Error> {
        self.rows.extend(txs.iter().map(render_row));
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> Result<(), Error> {
        let map_write_err = |e| format!("{e}");

        let mut table_bldr = tabled::builder::Builder::default();
        table_bldr.push_record(COLUMNS.iter().map(|h| h.to_uppercase()));
        for row in &self.rows {
            table_bldr.push_record(row.clone());
        }

        let mut table = table_bldr.build();
        table.with(Style::ascii());
        table.modify(Columns::single(AMOUNT_COL), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        writeln!(self.w, "{}", table).map_err(map_write_err)?;
        writeln!(self.w, "{} transactions", self.rows.len()).map_err(map_write_err)?;
        self.w.flush().map_err(map_write_err)
    }
}
