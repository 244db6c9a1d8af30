pub mod config;
pub mod model;
pub mod pipeline;
pub mod population;
pub mod process;
pub mod report;
pub mod store;

pub use config::{FileConfig, Settings};
pub use model::{NormalizedObservation, Observation};
pub use pipeline::{run, InputKind, RunOptions, RunSummary};
pub use population::{PopulationEntry, PopulationTable};
pub use process::{
    aggregate::{aggregate, Matrix},
    series::{build_series, ChartSeries},
    sort::{order_categories, SortPolicy},
};
