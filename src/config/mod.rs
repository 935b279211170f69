//! Configuration module

mod site;

pub use site::DocSectionConfig;
pub use site::FooterConfig;
pub use site::HighlightConfig;
pub use site::LinkEntry;
pub use site::NavEntry;
pub use site::ProfileConfig;
pub use site::SidebarGroupConfig;
pub use site::SiteConfig;
