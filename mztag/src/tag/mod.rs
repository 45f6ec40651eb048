mod component;
mod composition;
mod display;
mod matching;

pub use component::*;
pub use composition::*;
pub use matching::*;
