mod alphabet;
mod aminoacid;
mod concrete;
mod matching;
mod modification;
mod pattern;
mod position;

pub use alphabet::*;
pub use aminoacid::*;
pub use concrete::*;
pub use matching::*;
pub use modification::*;
pub use pattern::*;
pub use position::*;
