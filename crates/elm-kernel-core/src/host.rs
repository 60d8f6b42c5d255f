//! Interface to the kernel runtime hosting a controller.

use crate::render::DisplayData;

/// What the controller needs from its host runtime.
///
/// The host owns the transport and the execution counter; the controller
/// only publishes displays and reads the current count.
pub trait KernelHost {
    /// Publish a display message on the output channel.
    fn publish_display(&mut self, display: DisplayData);

    /// Execution count of the request being handled.
    fn execution_count(&self) -> u32;
}

/// Host that records every published display.
///
/// Used by the headless notebook runner and by tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    /// Execution count reported to the controller.
    pub execution_count: u32,
    /// Displays in publication order.
    pub displays: Vec<DisplayData>,
}

impl RecordingHost {
    pub fn new(execution_count: u32) -> Self {
        Self {
            execution_count,
            displays: Vec::new(),
        }
    }

    /// Take the recorded displays, leaving the list empty.
    pub fn take_displays(&mut self) -> Vec<DisplayData> {
        std::mem::take(&mut self.displays)
    }
}

impl KernelHost for RecordingHost {
    fn publish_display(&mut self, display: DisplayData) {
        self.displays.push(display);
    }

    fn execution_count(&self) -> u32 {
        self.execution_count
    }
}
