pub mod reconciler;
pub mod resolver;
pub mod service;

pub use resolver::EntityResolver;
pub use service::ImportService;
