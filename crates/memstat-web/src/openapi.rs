//! OpenAPI documentation definition.

use memstat_core::model::{AllocatorStats, MemorySnapshot, ProcessSample};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(crate::handlers::handle_health, crate::handlers::handle_memory),
    components(schemas(MemorySnapshot, ProcessSample, AllocatorStats)),
    info(
        title = "memstat API",
        version = "1.0",
        description = "Point-in-time host memory and process statistics"
    )
)]
pub(crate) struct ApiDoc;
