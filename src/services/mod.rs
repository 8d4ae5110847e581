pub mod catalog;
pub mod extraction;
pub mod history;
pub mod validation;
pub mod workflow;
