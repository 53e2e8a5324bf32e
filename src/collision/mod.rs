mod collision_pair;
mod collision_data;
mod contact;
mod contact_manifold;
mod manifold_table;

pub use self::collision_pair::CollisionPair;
pub use self::collision_data::CollisionData;
pub use self::contact::Contact;
pub use self::contact_manifold::{ContactManifold, MAX_CONTACT_POINTS};
pub use self::manifold_table::ContactManifoldTable;
