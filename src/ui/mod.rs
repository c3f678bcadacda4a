/// egui rendering of the application state and chart specifications.
pub mod panels;
pub mod plot;
