pub mod award_type;
pub mod mechanism;

pub use award_type::TypeCategory;
pub use mechanism::MechanismCategory;
