/// End-to-end MCP sessions over in-memory pipes
use habit_streaks::mcp::protocol::{error_codes, JsonRpcResponse};
use habit_streaks::mcp::McpServer;
use habit_streaks::*;
use serde_json::{json, Value};
use tempfile::tempdir;

#[cfg(test)]
mod mcp_session_tests {
    use super::*;

    /// Feed `requests` to a fresh server and collect its responses
    async fn run_session(server: HabitTrackerServer, requests: &[Value]) -> Vec<JsonRpcResponse> {
        let input: String = requests.iter().map(|r| format!("{}\n", r)).collect();
        let mut output = Vec::new();

        let mut mcp = McpServer::new(server);
        mcp.serve(input.as_bytes(), &mut output).await.expect("session failed");

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn tool_call(id: u64, name: &str, arguments: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        })
    }

    fn payload(response: &JsonRpcResponse) -> Value {
        let result = response.result.as_ref().expect("expected a result");
        assert_eq!(result["isError"], false);
        serde_json::from_str(result["content"][0]["text"].as_str().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_handshake_and_tool_listing() {
        let temp_dir = tempdir().unwrap();
        let server = HabitTrackerServer::new(ServerConfig::new(temp_dir.path().join("habits.db"))).unwrap();

        let responses = run_session(server, &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": "2024-11-05", "capabilities": {}, "clientInfo": {"name": "test", "version": "1"}
            }}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
        ]).await;

        // The notification gets no response
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0].id, json!(1));
        assert_eq!(responses[0].result.as_ref().unwrap()["protocolVersion"], "2024-11-05");

        let tools = responses[1].result.as_ref().unwrap()["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        for expected in [
            "habit_create", "habit_get", "habit_update", "habit_delete", "habit_list", "habit_toggle",
            "habit_mark", "habit_stats", "habit_history", "tag_create", "tag_list", "tag_delete",
        ] {
            assert!(names.contains(&expected), "missing tool {}", expected);
        }

        assert_eq!(responses[2].result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_habit_workflow() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("habits.db");

        // Seed a habit with a fixed start date so dates below are deterministic
        let server = HabitTrackerServer::new(ServerConfig::new(db_path.clone())).unwrap();
        let responses = run_session(server, &[
            tool_call(1, "tag_create", json!({"name": "Health"})),
            tool_call(2, "habit_create", json!({
                "title": "Run",
                "periodicity": "weekly",
                "frequency": 2,
                "selected_days": ["Wed", "Sun"],
                "start_date": "2024-01-01"
            })),
        ]).await;

        let tag_id = payload(&responses[0])["tag"]["id"].as_str().unwrap().to_string();
        let habit_id = payload(&responses[1])["habit"]["id"].as_str().unwrap().to_string();

        let server = HabitTrackerServer::new(ServerConfig::new(db_path.clone())).unwrap();
        let responses = run_session(server, &[
            tool_call(3, "habit_update", json!({"habit_id": habit_id, "tag_ids": [tag_id]})),
            tool_call(4, "habit_mark", json!({"habit_id": habit_id, "completed": true, "date": "2024-01-10", "notes": "5k"})),
            tool_call(5, "habit_toggle", json!({"habit_id": habit_id, "date": "2024-01-14"})),
            tool_call(6, "habit_toggle", json!({"habit_id": habit_id, "date": "2024-01-03"})),
            tool_call(7, "habit_history", json!({"habit_id": habit_id, "start_date": "2024-01-01", "end_date": "2024-01-31"})),
            tool_call(8, "habit_stats", json!({"habit_id": habit_id, "start_date": "2024-01-01", "end_date": "2024-01-14"})),
            tool_call(9, "habit_list", json!({"date": "2024-01-14", "tag_id": tag_id})),
        ]).await;

        assert_eq!(responses.len(), 7);
        assert_eq!(payload(&responses[0])["habit"]["tag_ids"], json!([tag_id]));
        assert_eq!(payload(&responses[1])["log"]["notes"], "5k");
        assert_eq!(payload(&responses[2])["log"]["completed"], true);

        let history = payload(&responses[4]);
        assert_eq!(history["completed_days"], 3);
        let dates: Vec<&str> = history["logs"].as_array().unwrap().iter()
            .map(|l| l["log_date"].as_str().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-10", "2024-01-14"]);

        let stats = payload(&responses[5]);
        assert_eq!(stats["periodicity"], "weekly");
        assert_eq!(stats["stats"]["total_days"], 14);
        assert_eq!(stats["stats"]["completed_days"], 3);

        let board = payload(&responses[6]);
        assert_eq!(board["summary"]["total_habits"], 1);
        let row = &board["habits"][0];
        assert_eq!(row["completed"], true);
        // Week of Jan 8 has Wed+Sun; week of Jan 1 only Wed
        assert_eq!(row["current_streak"], 1);
        assert_eq!(row["tags"][0]["name"], "Health");
    }

    #[tokio::test]
    async fn test_errors_are_reported_with_codes() {
        let temp_dir = tempdir().unwrap();
        let server = HabitTrackerServer::new(ServerConfig::new(temp_dir.path().join("habits.db"))).unwrap();
        let missing_id = HabitId::new().to_string();

        let responses = run_session(server, &[
            tool_call(1, "habit_toggle", json!({"habit_id": missing_id})),
            tool_call(2, "habit_create", json!({"title": "Run", "periodicity": "daily", "frequency": 2})),
            tool_call(3, "habit_history", json!({"habit_id": missing_id, "start_date": "2024-02-30", "end_date": "2024-03-01"})),
            tool_call(4, "habit_delete", json!({"habit_id": missing_id})),
        ]).await;

        let codes: Vec<i32> = responses.iter().map(|r| r.error.as_ref().unwrap().code).collect();
        assert_eq!(codes, vec![
            error_codes::NOT_FOUND,
            error_codes::VALIDATION_ERROR,
            error_codes::VALIDATION_ERROR,
            error_codes::NOT_FOUND,
        ]);
    }

    #[tokio::test]
    async fn test_delete_cascades_through_tools() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("habits.db");
        let server = HabitTrackerServer::new(ServerConfig::new(db_path.clone())).unwrap();

        let responses = run_session(server, &[
            tool_call(1, "habit_create", json!({"title": "Stretch", "periodicity": "daily", "start_date": "2024-01-01"})),
        ]).await;
        let habit_id = payload(&responses[0])["habit"]["id"].as_str().unwrap().to_string();

        let server = HabitTrackerServer::new(ServerConfig::new(db_path.clone())).unwrap();
        let responses = run_session(server, &[
            tool_call(2, "habit_toggle", json!({"habit_id": habit_id, "date": "2024-01-02"})),
            tool_call(3, "habit_delete", json!({"habit_id": habit_id})),
            tool_call(4, "habit_get", json!({"habit_id": habit_id})),
        ]).await;

        assert_eq!(payload(&responses[1])["success"], true);
        assert_eq!(responses[2].error.as_ref().unwrap().code, error_codes::NOT_FOUND);

        let storage = SqliteStorage::new(db_path).unwrap();
        let id = HabitId::parse(&habit_id).unwrap();
        let range = DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        ).unwrap();
        assert!(storage.list_logs(&id, range).unwrap().is_empty());
    }
}
