//! Configuration module

mod site;

pub use site::ContactLimits;
pub use site::RateLimitConfig;
pub use site::SiteConfig;
