use shared::{
    ignition_hal::{IgnitionDebugInfo, IgnitionDebugInfoVariant, SensorService, TableService},
    trace::TraceSink,
};
use strum::IntoEnumIterator;

use crate::IgnitionController;

impl<T, S, L> IgnitionController<T, S, L>
where
    T: TableService,
    S: SensorService,
    L: TraceSink,
{
    pub fn generate_debug_info(&self, variant: IgnitionDebugInfoVariant) -> IgnitionDebugInfo {
        match variant {
            IgnitionDebugInfoVariant::ControllerInfo => IgnitionDebugInfo::ControllerInfo {
                phase: self.phase(),
                current_advance: self.current_advance(),
                table_loaded: self.table().is_some(),
            },
            IgnitionDebugInfoVariant::LookupInfo => IgnitionDebugInfo::LookupInfo {
                last_lookup: self.last_lookup(),
            },
        }
    }

    pub fn generate_debug_info_all_variants(&self, mut callback: impl FnMut(IgnitionDebugInfo)) {
        for variant in IgnitionDebugInfoVariant::iter() {
            callback(self.generate_debug_info(variant));
        }
    }
}
