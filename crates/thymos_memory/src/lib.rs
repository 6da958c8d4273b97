pub mod qlearn;
pub mod store;

pub use qlearn::{FeedbackModel, StateKey};
pub use store::{load, load_or_default, save};
