// Runtime health counters for the pipeline.

pub mod stats;
