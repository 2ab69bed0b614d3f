//! Columns command: list the header of a table.

use crate::config::TableOptions;
use crate::table::{Result, TableReader};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

/// Columns command configuration.
#[derive(Debug, Clone, Default)]
pub struct ColumnsCommand {
    pub options: TableOptions,
}

impl ColumnsCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// List the columns of a table file.
    pub fn run<P: AsRef<Path>, W: Write>(&self, input_path: P, output: &mut W) -> Result<usize> {
        let reader = TableReader::from_path(input_path, &self.options)?;
        self.run_streaming(reader, output)
    }

    /// List the columns of a table read from stdin.
    pub fn run_stdin<W: Write>(&self, output: &mut W) -> Result<usize> {
        let stdin = io::stdin();
        let reader = TableReader::with_options(stdin.lock(), &self.options)?;
        self.run_streaming(reader, output)
    }

    /// Write `index<TAB>name` for every column. Only the header is read.
    pub fn run_streaming<R: Read, W: Write>(
        &self,
        reader: TableReader<R>,
        output: &mut W,
    ) -> Result<usize> {
        let mut writer = BufWriter::new(output);
        let names = reader.header().names();
        for (i, name) in names.iter().enumerate() {
            writeln!(writer, "{}\t{}", i, name)?;
        }
        writer.flush()?;
        Ok(names.len())
    }
}
