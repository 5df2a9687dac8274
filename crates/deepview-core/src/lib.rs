pub mod config;
pub mod content;
pub mod correlation;
pub mod grounding;
pub mod interrupt;
pub mod todos;
pub mod tool_calls;
pub mod transcript;
pub mod turns;
pub mod view;

pub use correlation::*;
pub use interrupt::*;
pub use tool_calls::*;
pub use transcript::*;
pub use turns::*;
pub use view::*;
