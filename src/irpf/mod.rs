//! IRPF output: Discriminação text, per-ticker aggregation and the CSV file

pub mod aggregate;
pub mod cost;
pub mod csv_writer;
pub mod discrimination;

pub use aggregate::aggregate;
pub use cost::{allocate_costs, CostAllocation};
pub use csv_writer::{output_path_for, render_csv, value_header, write_csv, DEFAULT_DELIMITER};
pub use discrimination::format_discrimination;
