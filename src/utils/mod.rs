pub mod csv_io;
pub mod env;
pub mod rate_limit;
