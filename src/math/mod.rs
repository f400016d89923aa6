//! Mathematical utilities: curve equations, 2×2 linear algebra, root bracketing.

pub mod linalg;
pub mod roots;
pub mod variant;

pub use linalg::*;
pub use roots::*;
pub use variant::*;
