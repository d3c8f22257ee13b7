use core::cell::Cell;

use crate::{
    advance_table::AdvanceTable,
    ignition_hal::{SensorService, TableError, TableRef, TableService},
};

pub struct SensorServiceMock {
    load: Cell<i32>,
    speed: Cell<i32>,
}

impl SensorService for SensorServiceMock {
    fn current_load(&self) -> i32 {
        self.load.get()
    }

    fn current_speed(&self) -> i32 {
        self.speed.get()
    }
}

impl SensorServiceMock {
    pub fn new(load: i32, speed: i32) -> Self {
        Self {
            load: Cell::new(load),
            speed: Cell::new(speed),
        }
    }

    pub fn set_load(&self, load: i32) {
        self.load.set(load);
    }

    pub fn set_speed(&self, speed: i32) {
        self.speed.set(speed);
    }
}

pub struct TableServiceMock {
    table: Result<AdvanceTable, TableError>,
    valid: bool,
    load_count: Cell<u32>,
}

impl TableService for TableServiceMock {
    fn load_table(&self, _reference: TableRef) -> Result<AdvanceTable, TableError> {
        self.load_count.set(self.load_count.get() + 1);
        self.table.clone()
    }

    fn validate(&self, _reference: TableRef, _table: &AdvanceTable) -> bool {
        self.valid
    }
}

impl TableServiceMock {
    pub fn new(table: AdvanceTable, valid: bool) -> Self {
        Self {
            table: Ok(table),
            valid,
            load_count: Cell::new(0),
        }
    }

    pub fn failing(error: TableError) -> Self {
        Self {
            table: Err(error),
            valid: false,
            load_count: Cell::new(0),
        }
    }

    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    pub fn load_count(&self) -> u32 {
        self.load_count.get()
    }
}
