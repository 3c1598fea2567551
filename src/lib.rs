/// Use mimalloc as the global allocator. The scatter-sort and aggregation
/// stages allocate tens of millions of short line buffers per run; mimalloc's
/// thread-local caching keeps that churn cheap and fragmentation low.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod aggregate;
pub mod common;
pub mod config;
pub mod corpus;
pub mod error;
pub mod filter;
pub mod lock;
pub mod pipeline;
pub mod scatter;
pub mod transform;
