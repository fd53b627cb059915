pub mod client;
pub mod dto;

pub use client::{AmqClient, MasterListFetch, MASTER_LIST_URL};
pub use dto::MasterList;
