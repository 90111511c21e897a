pub mod authorizer;
pub mod lifecycle;

pub use lifecycle::LifecycleService;
