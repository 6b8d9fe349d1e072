pub mod item;
pub mod arrangement;

pub use item::*;
pub use arrangement::*;
