//! Configuration section definitions.
//!
//! Each module corresponds to a section in `xrefdoc.toml`:
//!
//! | Module      | TOML Section  | Purpose                                |
//! |-------------|---------------|----------------------------------------|
//! | `site`      | `[site]`      | Docs dir, output, host nav tree        |
//! | `reference` | `[reference]` | Package roots, placeholder, template   |
//! | `links`     | `[links]`     | Priority, pattern, source links        |

mod links;
mod reference;
mod site;

pub use links::LinksConfig;
pub use reference::ReferenceConfig;
pub use site::{NavItem, SiteSectionConfig};
