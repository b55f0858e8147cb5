/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads newline-delimited JSON-RPC requests
/// 2. Processes tool calls using our habit tracker
/// 3. Writes JSON-RPC responses, one per line

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::tools::{self, ToolContext, ToolError};
use crate::{HabitTrackerServer, ServerError};

/// MCP server that handles communication with the client
pub struct McpServer {
    /// The underlying habit tracker server
    habit_tracker: HabitTrackerServer,
    /// Whether the client has confirmed initialization
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(habit_tracker: HabitTrackerServer) -> Self {
        Self {
            habit_tracker,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
    }

    /// Answer requests from `reader` on `writer` until the input ends
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> Result<(), ServerError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("MCP server shutting down (input closed)");
                    break;
                }
                Err(e) => {
                    error!("Failed to read request: {}", e);
                    return Err(e.into());
                }
            };

            if let Some(response) = self.handle_line(&line) {
                let response_str = serde_json::to_string(&response)?;

                // Write response + newline
                writer.write_all(response_str.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;

                debug!("Sent response: {}", response_str);
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request)
    }

    /// Handle a JSON-RPC request
    fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id else {
            self.handle_notification(&request.method);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                error_codes::INVALID_REQUEST,
                format!("Unsupported JSON-RPC version '{}'", request.jsonrpc),
                None,
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };

        Some(response)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "notifications/initialized" | "initialized" => {
                self.initialized = true;
                info!("MCP client initialized");
            }
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    /// Handle MCP initialization request
    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Streaks".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        respond(id, &result)
    }

    /// Handle tools/list request
    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        respond(id, &json!({ "tools": tool_definitions() }))
    }

    /// Handle tools/call request
    fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid parameters: {}", e),
                    None,
                );
            }
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        debug!("Calling tool '{}'", tool_params.name);

        match self.call_tool(&tool_params.name, Value::Object(tool_params.arguments)) {
            Ok(text) => respond(id, &ToolCallResult::success(text)),
            Err(e) => {
                warn!("Tool '{}' failed: {}", tool_params.name, e);
                JsonRpcResponse::error(
                    id,
                    tool_error_to_json_rpc_code(&e),
                    e.to_string(),
                    Some(json!({ "tool": tool_params.name })),
                )
            }
        }
    }

    /// Route a tool call and render its response as pretty JSON
    fn call_tool(&self, name: &str, args: Value) -> Result<String, ToolError> {
        let config = self.habit_tracker.config();
        let ctx = ToolContext::new(
            self.habit_tracker.storage(),
            config.today(),
            config.longest_streak_policy,
        );

        match name {
            "habit_create" => encode(tools::create_habit(&ctx, decode(args)?)?),
            "habit_get" => encode(tools::get_habit(&ctx, decode(args)?)?),
            "habit_update" => encode(tools::update_habit(&ctx, decode(args)?)?),
            "habit_delete" => encode(tools::delete_habit(&ctx, decode(args)?)?),
            "habit_list" => encode(tools::list_habits(&ctx, decode(args)?)?),
            "habit_toggle" => encode(tools::toggle_habit(&ctx, decode(args)?)?),
            "habit_mark" => encode(tools::mark_habit(&ctx, decode(args)?)?),
            "habit_stats" => encode(tools::habit_stats(&ctx, decode(args)?)?),
            "habit_history" => encode(tools::habit_history(&ctx, decode(args)?)?),
            "tag_create" => encode(tools::create_tag(&ctx, decode(args)?)?),
            "tag_list" => encode(tools::list_tags(&ctx, decode(args)?)?),
            "tag_delete" => encode(tools::delete_tag(&ctx, decode(args)?)?),
            _ => Err(ToolError::InvalidParams(format!("Unknown tool: {}", name))),
        }
    }
}

/// Every tool this server offers, with schemas generated from the
/// parameter types
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        definition::<tools::CreateHabitParams>("habit_create", "Create a new daily, weekly or monthly habit to track"),
        definition::<tools::GetHabitParams>("habit_get", "Get a habit with its tags, today's completion and current streak"),
        definition::<tools::UpdateHabitParams>("habit_update", "Update an existing habit's title, schedule, dates, icon or tags"),
        definition::<tools::DeleteHabitParams>("habit_delete", "Permanently delete a habit together with its history"),
        definition::<tools::ListHabitsParams>("habit_list", "List habits for a day with their completion status and streaks"),
        definition::<tools::ToggleHabitParams>("habit_toggle", "Toggle whether a habit is done on a day (defaults to today)"),
        definition::<tools::MarkHabitParams>("habit_mark", "Explicitly mark a habit done or not done on a day, with optional notes"),
        definition::<tools::HabitStatsParams>("habit_stats", "Completion rate, current streak and longest streak of a habit"),
        definition::<tools::HabitHistoryParams>("habit_history", "Completion logs of a habit over a date range"),
        definition::<tools::CreateTagParams>("tag_create", "Create a tag for grouping habits"),
        definition::<tools::ListTagsParams>("tag_list", "List all tags"),
        definition::<tools::DeleteTagParams>("tag_delete", "Delete a tag and detach it from its habits"),
    ]
}

fn definition<T: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    let schema = schemars::schema_for!(T);
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({ "type": "object" })),
    }
}

fn decode<T: DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

fn encode<T: Serialize>(response: T) -> Result<String, ToolError> {
    Ok(serde_json::to_string_pretty(&response)?)
}

/// Serialize a result, falling back to an internal error response
fn respond<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to serialize result: {}", e),
            None,
        ),
    }
}
