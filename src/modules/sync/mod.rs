pub mod master_list;
pub mod progress;
pub mod scrape;
pub mod seed;
pub mod state;

pub use master_list::MasterListSync;
pub use scrape::{MasterListScrape, ScrapeOptions};
pub use seed::{SeedDriver, SeedOptions, SeedSummary};
pub use state::{MasterListState, ScrapeState};
