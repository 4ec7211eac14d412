pub mod panels;
pub mod plot;
pub mod report;
pub mod tables;
