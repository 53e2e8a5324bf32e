mod constraint;
mod distance;

pub use self::constraint::Constraint;
pub use self::distance::{DistanceConstraint, DistanceConstraintConfig};
