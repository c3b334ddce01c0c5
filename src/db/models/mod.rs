pub mod observation;

pub use observation::{
    KindCount, Observation, ObservationInput, ObservationKind, ObservationSource, TimeRange,
};
