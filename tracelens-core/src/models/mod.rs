pub mod observation;
pub mod trace;

pub use observation::{Observation, ObservationLevel, ObservationType};
pub use trace::{Trace, TraceWithObservations};
