//! MCP server exposing search indexes as tools.

use crate::config::Config;
use crate::state::IndexState;
use crate::tools::{
    DiscoverIndexesRequest, GetDocumentRequest, InspectIndexRequest, LookupObjectRequest,
    SearchRequest, handle_discover_indexes, handle_get_document, handle_inspect_index,
    handle_lookup_object, handle_search,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for documentation search indexes
#[derive(Clone)]
pub struct IndexServer {
    /// Shared index cache and configuration
    state: Arc<IndexState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for IndexServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl IndexServer {
    pub fn new(config: Config) -> Self {
        Self {
            state: Arc::new(IndexState::new(config)),
            tool_router: Self::tool_router(),
        }
    }

    /// Get a reference to the shared index state.
    pub fn index_state(&self) -> &Arc<IndexState> {
        &self.state
    }

    #[tool(
        description = "Summarize a documentation search index (searchindex.js): document, term and object counts, generator versions, object types, and the first documents.",
        input_schema = inline_schema_for_type::<InspectIndexRequest>()
    )]
    async fn inspect_index(
        &self,
        Parameters(request): Parameters<InspectIndexRequest>,
    ) -> std::result::Result<String, String> {
        handle_inspect_index(&self.state, request).await
    }

    #[tool(
        description = "Full-text search over a documentation site's search index. Matches API objects, section titles, index entries and page text; all words must match, '-word' excludes pages. Returns page names, anchors and source files.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request).await
    }

    #[tool(
        description = "Show one document of a search index by name or numeric index: title, source file, sections, defined objects and index entries.",
        input_schema = inline_schema_for_type::<GetDocumentRequest>()
    )]
    async fn get_document(
        &self,
        Parameters(request): Parameters<GetDocumentRequest>,
    ) -> std::result::Result<String, String> {
        handle_get_document(&self.state, request).await
    }

    #[tool(
        description = "Look up documented API objects (functions, classes, modules, ...) by full or partial dotted name. Returns the object kind, page and anchor.",
        input_schema = inline_schema_for_type::<LookupObjectRequest>()
    )]
    async fn lookup_object(
        &self,
        Parameters(request): Parameters<LookupObjectRequest>,
    ) -> std::result::Result<String, String> {
        handle_lookup_object(&self.state, request).await
    }

    #[tool(
        description = "Find searchindex.js files under a directory, including gitignored build output such as docs/_build/html.",
        input_schema = inline_schema_for_type::<DiscoverIndexesRequest>()
    )]
    async fn discover_indexes(
        &self,
        Parameters(request): Parameters<DiscoverIndexesRequest>,
    ) -> std::result::Result<String, String> {
        handle_discover_indexes(&self.state, request).await
    }
}

#[tool_handler]
impl ServerHandler for IndexServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "searchindex-mcp: Query the search index (searchindex.js) of a generated \
                 documentation site. Tools take an optional `index` (a searchindex.js file or \
                 its directory); without it the first configured index is used. Use \
                 discover_indexes to find indexes in a project."
                    .to_string(),
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this function sets `inline_subschemas = true`
/// so nested types are expanded in place instead of referenced through `$ref`.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = serde_json::to_value(schema).expect("failed to serialize schema");

    let json_object = match object {
        serde_json::Value::Object(object) => object,
        _ => panic!("Schema serialization produced non-object value"),
    };

    Arc::new(json_object)
}
