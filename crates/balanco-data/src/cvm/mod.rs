//! CVM open-data portal access.
//!
//! The portal publishes one zip archive per filing family and year, holding
//! a CSV per statement and consolidation scope for every listed company:
//!
//! ```text
//! {base}/DFP/DADOS/dfp_cia_aberta_2023.zip
//!     dfp_cia_aberta_BPA_con_2023.csv
//!     dfp_cia_aberta_BPP_con_2023.csv
//!     dfp_cia_aberta_DRE_con_2023.csv
//!     ...
//! ```
//!
//! # Example
//!
//! ```no_run
//! use balanco_data::cvm::CvmClient;
//! use balanco_data::model::StatementKind;
//! use balanco_data::source::RowSetSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CvmClient::new()?;
//!     let rows = client.fetch(2023, StatementKind::IncomeStatement, "22470").await?;
//!     for item in &rows {
//!         println!("{} {} {}", item.account_code, item.description, item.value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod retry;
pub mod rows;

pub use client::{ClientConfig, CvmClient};
pub use retry::{Backoff, RetryConfig};
pub use rows::{decode_latin1, parse_amount, parse_statement_csv};
