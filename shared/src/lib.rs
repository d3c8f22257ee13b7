#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod advance_table;
pub mod crc;
pub mod ignition_hal;
pub mod ignition_mock;
pub mod table_store;
pub mod trace;

pub use advance_table::{AdvanceTable, TableAxis};
pub use table_store::FlashTableStore;
pub use trace::{IgnitionEvent, LogTrace, NoopTrace, RecordingTrace, TraceSink};
