pub mod index;
pub mod map;
pub mod stats;
pub mod undo;

mod interactive;

pub use interactive::ConsoleControl;
