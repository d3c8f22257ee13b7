use serde::{Deserialize, Serialize};
use strum_macros::{EnumCount as EnumCountMacro, EnumDiscriminants, EnumIter};

use crate::advance_table::{AdvanceTable, AdvanceTableError, DEFAULT_TABLE_AXIS_LEN};

/// Advance written whenever the controller cannot trust the table, in tenths of a degree.
pub const SAFE_ADVANCE: i32 = 100;

pub const IGNITION_TABLE_REF: TableRef = TableRef {
    slot: TableSlot::IgnitionTpsRpm,
    rows: DEFAULT_TABLE_AXIS_LEN as u8,
    cols: DEFAULT_TABLE_AXIS_LEN as u8,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnitionPhase {
    Uninitialized,
    Ready,
    FixedOverride,
    Fault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumCountMacro)]
pub enum TableSlot {
    IgnitionTpsRpm,
    IgnitionMapRpm,
}

impl TableSlot {
    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// A calibration slot together with the geometry it is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRef {
    pub slot: TableSlot,
    pub rows: u8,
    pub cols: u8,
}

impl TableRef {
    pub fn on_bounds(&self, load_index: usize, speed_index: usize) -> bool {
        load_index < self.rows as usize && speed_index < self.cols as usize
    }

    /// Whether a loaded table has exactly the declared geometry.
    pub fn matches(&self, table: &AdvanceTable) -> bool {
        table.rows() == self.rows as usize && table.cols() == self.cols as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedAdvancePolicy {
    // A periodic recompute during an override writes the safe advance
    RevertToSafe,
    // The fixed advance stays on the output until the override is cleared
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnitionConfig {
    pub safe_advance: i32,
    pub table_ref: TableRef,
    pub fixed_advance_policy: FixedAdvancePolicy,
}

impl IgnitionConfig {
    pub const fn default() -> Self {
        Self {
            safe_advance: SAFE_ADVANCE,
            table_ref: IGNITION_TABLE_REF,
            fixed_advance_policy: FixedAdvancePolicy::RevertToSafe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnitionError {
    InvalidCalibration(TableRef),
    NotReady(IgnitionPhase),
    FixedAdvanceActive,
    SensorFault,
    IndexOutOfBounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TableError {
    EmptySlot,
    PageTooSmall,
    Encoding,
    Decoding,
    Shape(AdvanceTableError),
    GeometryMismatch { rows: u8, cols: u8 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IgnitionCommand {
    SetFixedAdvance(i32),
    ClearFixedAdvance,
    ReloadTable,
    ConfigureIgnition(IgnitionConfig),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupResult {
    pub load: i32,
    pub speed: i32,
    pub load_index: usize,
    pub speed_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(IgnitionDebugInfoVariant))]
#[strum_discriminants(derive(EnumIter))]
pub enum IgnitionDebugInfo {
    ControllerInfo {
        phase: IgnitionPhase,
        current_advance: i32,
        table_loaded: bool,
    },
    LookupInfo {
        last_lookup: Option<LookupResult>,
    },
}

/// Storage and integrity checking for calibration tables.
pub trait TableService {
    fn load_table(&self, reference: TableRef) -> Result<AdvanceTable, TableError>;

    /// Integrity check over a loaded table. Must not have side effects.
    fn validate(&self, reference: TableRef, table: &AdvanceTable) -> bool;
}

/// Latest engine readings. A non-positive load means the sensor has faulted.
pub trait SensorService {
    fn current_load(&self) -> i32;
    fn current_speed(&self) -> i32;
}
