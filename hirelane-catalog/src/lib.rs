pub mod addon;
pub mod package;
pub mod pricing;
pub mod vehicle;

pub use addon::AddOn;
pub use package::Package;
pub use pricing::price_for_duration;
pub use vehicle::Vehicle;
