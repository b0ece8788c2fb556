pub mod ballot;
pub mod booth;
pub mod catalog;
pub mod game;
pub mod movie;
pub mod search;
pub mod selection;
pub mod session;
pub mod tv;

pub use crate::domain::model::{BallotPayload, CatalogItem, Category, DispatchReceipt, SessionToken};
pub use crate::domain::ports::{CatalogSearch, ConfigProvider, SessionStore};
pub use crate::utils::error::Result;
