//! Pagination engine and response shaping
//!
//! - **Engine**: [`QueryEngine`] runs a [`PageRequest`] (filter, sort, count, slice, project)
//! - **Results**: [`EnhancedPagedResult`] carries the page, the total count, and [`QueryMetadata`]
//! - **Links**: [`build_links`] produces first/previous/current/next/last URLs
//! - **Responses**: [`PagedResponse`] and [`HypermediaResponse`] are ready-to-send envelopes

mod engine;
mod links;
mod metadata;
mod response;

pub use engine::{calculate_total_pages, EnhancedPagedResult, PageRequest, QueryEngine, ShapedItem};
pub use links::{build_links, PaginationLinks, PAGE_PARAM, PAGE_SIZE_PARAM};
pub use metadata::{CacheStatus, QueryComplexity, QueryMetadata};
pub use response::{
    HypermediaData, HypermediaPagination, HypermediaResponse, PagedResponse, DEFAULT_MESSAGE,
};
