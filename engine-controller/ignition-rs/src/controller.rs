use shared::{
    advance_table::{AdvanceTable, TableAxis},
    ignition_hal::{
        FixedAdvancePolicy, IgnitionConfig, IgnitionError, IgnitionPhase, LookupResult,
        SensorService, TableError, TableRef, TableService,
    },
    trace::{IgnitionEvent, TraceSink},
};

use crate::{lookup::find_nearest_neighbor, silprintln, state::ControllerState};

/// Selects the spark advance from the calibration table.
///
/// `setup` runs once before the periodic trigger is armed. `recompute` is
/// then driven by the scheduler and writes the advance register read by
/// the spark timing hardware. Every path leaves the register defined:
/// faults and sensor dropouts write the configured safe advance, while an
/// undecidable lookup keeps the last value.
pub struct IgnitionController<T, S, L> {
    pub config: IgnitionConfig,
    pub tables: T,
    pub sensors: S,
    pub trace: L,
    state: ControllerState,
    table: Option<AdvanceTable>,
    last_lookup: Option<LookupResult>,
}

struct Recomputed {
    state: ControllerState,
    lookup: Option<LookupResult>,
    result: Result<i32, IgnitionError>,
}

impl<T, S, L> IgnitionController<T, S, L>
where
    T: TableService,
    S: SensorService,
    L: TraceSink,
{
    pub fn new(tables: T, sensors: S, trace: L) -> Self {
        Self::with_config(IgnitionConfig::default(), tables, sensors, trace)
    }

    pub fn with_config(config: IgnitionConfig, tables: T, sensors: S, trace: L) -> Self {
        Self {
            config,
            tables,
            sensors,
            trace,
            state: ControllerState::new(config.safe_advance),
            table: None,
            last_lookup: None,
        }
    }

    pub fn setup(&mut self) -> Result<(), IgnitionError> {
        let reference = self.config.table_ref;
        let safe_advance = self.config.safe_advance;
        self.last_lookup = None;

        match self.load_validated_table(reference) {
            Ok(table) => {
                log::info!(
                    "Ignition table {:?} loaded ({}x{})",
                    reference.slot,
                    table.rows(),
                    table.cols()
                );

                self.table = Some(table);
                self.state = ControllerState::settled(IgnitionPhase::Ready, safe_advance);

                Ok(())
            }
            Err(event) => {
                self.table = None;
                self.state = ControllerState::settled(IgnitionPhase::Fault, safe_advance);
                self.trace.trace(&event);

                // TODO: store a diagnostic trouble code once DTC flash storage exists

                Err(IgnitionError::InvalidCalibration(reference))
            }
        }
    }

    /// Periodic recomputation of the advance register.
    ///
    /// Bounded and allocation free. `Ok` carries the table value written,
    /// `Err` names the fallback that was taken instead.
    pub fn recompute(&mut self) -> Result<i32, IgnitionError> {
        let recomputed = self.evaluate(self.state);
        self.commit(recomputed)
    }

    pub fn set_fixed_advance(&mut self, advance: i32) {
        let state = self.state;
        let resume_phase = if state.phase == IgnitionPhase::FixedOverride {
            state.resume_phase
        } else {
            state.phase
        };

        log::info!("Fixed ignition advance set to {}", advance);

        self.state = ControllerState {
            phase: IgnitionPhase::FixedOverride,
            current_advance: advance,
            fixed_advance: advance,
            resume_phase,
        };
    }

    /// Leaves fixed mode and re-derives the advance in the same update.
    pub fn clear_fixed_advance(&mut self) -> Result<i32, IgnitionError> {
        let mut state = self.state;

        if state.phase == IgnitionPhase::FixedOverride {
            log::info!("Fixed ignition advance cleared, resuming {:?}", state.resume_phase);
            state = state.with_phase(state.resume_phase);
        }

        let recomputed = self.evaluate(state);
        self.commit(recomputed)
    }

    /// Replaces the configuration. A different table reference reloads the
    /// table once setup has run, so the held table always matches it.
    pub fn configure_ignition(&mut self, config: IgnitionConfig) -> Result<(), IgnitionError> {
        let reference_changed = config.table_ref != self.config.table_ref;
        self.config = config;

        if reference_changed && self.state.setup_attempted() {
            return self.setup();
        }

        Ok(())
    }

    pub fn current_advance(&self) -> i32 {
        self.state.current_advance
    }

    pub fn phase(&self) -> IgnitionPhase {
        self.state.phase
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn table(&self) -> Option<&AdvanceTable> {
        self.table.as_ref()
    }

    pub fn last_lookup(&self) -> Option<LookupResult> {
        self.last_lookup
    }

    fn load_validated_table(&self, reference: TableRef) -> Result<AdvanceTable, IgnitionEvent> {
        let table = self
            .tables
            .load_table(reference)
            .map_err(|error| IgnitionEvent::TableLoadFailed {
                table: reference,
                error,
            })?;

        if !self.tables.validate(reference, &table) {
            return Err(IgnitionEvent::InvalidTableChecksum { table: reference });
        }

        if !reference.matches(&table) {
            return Err(IgnitionEvent::TableLoadFailed {
                table: reference,
                error: TableError::GeometryMismatch {
                    rows: table.rows() as u8,
                    cols: table.cols() as u8,
                },
            });
        }

        Ok(table)
    }

    fn commit(&mut self, recomputed: Recomputed) -> Result<i32, IgnitionError> {
        self.state = recomputed.state;
        if recomputed.lookup.is_some() {
            self.last_lookup = recomputed.lookup;
        }

        recomputed.result
    }

    fn evaluate(&self, state: ControllerState) -> Recomputed {
        let safe = |error| Recomputed {
            state: state.with_advance(self.config.safe_advance),
            lookup: None,
            result: Err(error),
        };

        if matches!(state.phase, IgnitionPhase::Uninitialized | IgnitionPhase::Fault) {
            return safe(IgnitionError::NotReady(state.phase));
        }

        let load = self.sensors.current_load();
        if load <= 0 {
            return safe(IgnitionError::SensorFault);
        }

        if state.phase == IgnitionPhase::FixedOverride {
            return match self.config.fixed_advance_policy {
                FixedAdvancePolicy::RevertToSafe => safe(IgnitionError::FixedAdvanceActive),
                FixedAdvancePolicy::Hold => Recomputed {
                    state: state.with_advance(state.fixed_advance),
                    lookup: None,
                    result: Err(IgnitionError::FixedAdvanceActive),
                },
            };
        }

        let Some(table) = self.table.as_ref() else {
            return safe(IgnitionError::NotReady(state.phase));
        };

        let speed = self.sensors.current_speed();
        let load_index = find_nearest_neighbor(table.axis(TableAxis::Load), load);
        let speed_index = find_nearest_neighbor(table.axis(TableAxis::Speed), speed);

        silprintln!(
            "IGNITION: load {} rpm {} -> index {:?} / {:?}",
            load,
            speed,
            load_index,
            speed_index
        );

        let cell = match (load_index, speed_index) {
            (Some(load_index), Some(speed_index))
                if self.config.table_ref.on_bounds(load_index, speed_index) =>
            {
                table
                    .value_at(load_index, speed_index)
                    .map(|advance| (load_index, speed_index, advance))
            }
            _ => None,
        };

        match cell {
            Some((load_index, speed_index, advance)) => Recomputed {
                state: state.with_advance(advance),
                lookup: Some(LookupResult {
                    load,
                    speed,
                    load_index,
                    speed_index,
                }),
                result: Ok(advance),
            },
            // Freeze the last output rather than guessing
            None => Recomputed {
                state,
                lookup: None,
                result: Err(IgnitionError::IndexOutOfBounds),
            },
        }
    }
}
