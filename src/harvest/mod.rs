//! The harvest pipeline: normalization, identity and dedup, lazy-load
//! convergence, cursor pagination, and the session controller running them
//! once per category.

pub mod convergence;
pub mod filters;
pub mod identity;
pub mod normalize;
pub mod paginate;
pub mod record;
pub mod session;

pub use paginate::{Cursor, HarvestState, Paginator};
pub use record::{Clarity, Color, Cut, Record};
pub use session::{HarvestFailure, HarvestReport, HarvestSession};
