pub mod dataset;
pub mod matching;
pub mod share;
