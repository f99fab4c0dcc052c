mod csv_io;

pub(crate) use csv_io::{export_transactions, import_transactions, CSV_HEADER};
