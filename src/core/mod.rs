//! Extraction and aggregation

pub mod aggregate;
pub mod extract;
pub mod range_sum;
pub mod reference;

pub use aggregate::{
    discover_inputs, AggregateOptions, AggregateReport, Aggregator, FailurePolicy, SkippedFile,
};
pub use extract::{Extractor, MonthWindow, TallyLayout, FUNDS_LAYOUT, HOURS_LAYOUT};
pub use range_sum::sum_column_run;
pub use reference::{Indirection, ReferenceResolver, Region, SheetRange, SheetReference};
