pub mod analysis;
pub mod bar;
pub mod record;

pub use analysis::*;
pub use bar::*;
pub use record::*;
