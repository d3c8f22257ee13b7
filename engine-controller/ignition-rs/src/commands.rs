use shared::{
    ignition_hal::{IgnitionCommand, IgnitionError, SensorService, TableService},
    trace::TraceSink,
};

use crate::IgnitionController;

impl<T, S, L> IgnitionController<T, S, L>
where
    T: TableService,
    S: SensorService,
    L: TraceSink,
{
    /// Applies a command received from the host link.
    pub fn handle_command(&mut self, command: &IgnitionCommand) -> Result<(), IgnitionError> {
        match command {
            IgnitionCommand::SetFixedAdvance(advance) => {
                self.set_fixed_advance(*advance);
                Ok(())
            }
            IgnitionCommand::ClearFixedAdvance => self.clear_fixed_advance().map(|_| ()),
            IgnitionCommand::ReloadTable => self.setup(),
            IgnitionCommand::ConfigureIgnition(config) => self.configure_ignition(*config),
        }
    }
}
