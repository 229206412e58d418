//! Integration tests for the agent loop
//!
//! A scripted chat client drives the real built-in tools, including
//! run_command with its confirmation gate and timeout.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use looptool::llm::{
    Arguments, CompletionRequest, CompletionResponse, LlmClient, LlmError, Message, Role, ToolCall,
};
use looptool::r#loop::{AgentError, AgentLoop, LoopConfig};
use looptool::tools::builtin::standard_registry;
use looptool::tools::{ConfirmationPolicy, FixedConfirm};

// =============================================================================
// Helpers
// =============================================================================

/// Replays canned responses and records every request
struct ScriptedClient {
    responses: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    fn new(responses: Vec<CompletionResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
    }
}

fn call(name: &str, args: Value) -> ToolCall {
    ToolCall::new(name, args.as_object().cloned().unwrap_or_else(Arguments::new))
}

fn tools(calls: Vec<ToolCall>) -> CompletionResponse {
    CompletionResponse::from_message(Message::assistant_with_tools("", calls))
}

fn answer(text: &str) -> CompletionResponse {
    CompletionResponse::from_message(Message::assistant(text))
}

fn agent(client: Arc<ScriptedClient>, policy: ConfirmationPolicy, confirm: Arc<FixedConfirm>) -> AgentLoop {
    let registry = standard_registry(policy, confirm, Duration::from_secs(30)).unwrap();
    AgentLoop::new(client, Arc::new(registry), LoopConfig::new("test-model"))
}

fn tool_payload(message: &Message) -> Value {
    assert_eq!(message.role, Role::Tool);
    serde_json::from_str(&message.content).unwrap()
}

// =============================================================================
// Command Execution Tests
// =============================================================================

#[tokio::test]
async fn test_read_only_command_runs_without_confirmation() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("hello.txt"), "hi").unwrap();
    let client = ScriptedClient::new(vec![
        tools(vec![call(
            "run_command",
            json!({"command": "ls .", "working_dir": temp.path().to_str().unwrap()}),
        )]),
        answer("There is one file."),
    ]);
    let confirm = Arc::new(FixedConfirm::deny());

    let outcome = agent(client, ConfirmationPolicy::new(true, true), Arc::clone(&confirm))
        .run("what files are here?")
        .await
        .unwrap();

    let payload = tool_payload(&outcome.messages[3]);
    assert_eq!(payload["exit_code"], 0);
    assert_eq!(payload["success"], true);
    assert!(payload["stdout"].as_str().unwrap().contains("hello.txt"));
    assert_eq!(confirm.call_count(), 0);
    assert_eq!(outcome.answer, "There is one file.");
}

#[tokio::test]
async fn test_denied_command_is_reported_to_model() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("should-not-exist");
    let command = format!("touch {}", marker.display());
    let client = ScriptedClient::new(vec![
        tools(vec![call("run_command", json!({"command": &command}))]),
        answer("The command was denied."),
    ]);
    let confirm = Arc::new(FixedConfirm::deny());

    let outcome = agent(Arc::clone(&client), ConfirmationPolicy::new(true, true), Arc::clone(&confirm))
        .run("create a file")
        .await
        .unwrap();

    let payload = tool_payload(&outcome.messages[3]);
    assert_eq!(payload["error"], "command execution denied by user");
    assert!(!marker.exists());
    assert_eq!(confirm.call_count(), 1);
    assert_eq!(confirm.requests()[0].command, command);

    // The model saw the denial before answering
    let second = &client.requests()[1];
    assert_eq!(second.messages.last().unwrap().content, outcome.messages[3].content);
}

#[tokio::test]
async fn test_read_only_prefix_does_not_approve_following_lines() {
    let temp = TempDir::new().unwrap();
    let marker = temp.path().join("marker");
    let command = format!("ls .\ntouch {}", marker.display());
    let client = ScriptedClient::new(vec![
        tools(vec![call("run_command", json!({"command": &command}))]),
        answer("The command was denied."),
    ]);
    let confirm = Arc::new(FixedConfirm::deny());

    let outcome = agent(client, ConfirmationPolicy::new(true, true), Arc::clone(&confirm))
        .run("list and touch")
        .await
        .unwrap();

    let payload = tool_payload(&outcome.messages[3]);
    assert_eq!(payload["error"], "command execution denied by user");
    assert_eq!(confirm.call_count(), 1);
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_command_timeout_is_a_normal_result() {
    let client = ScriptedClient::new(vec![
        tools(vec![call(
            "run_command",
            json!({"command": "echo partial; sleep 10", "timeout_seconds": 0.5}),
        )]),
        answer("It timed out."),
    ]);

    let started = Instant::now();
    let outcome = agent(client, ConfirmationPolicy::unattended(), Arc::new(FixedConfirm::deny()))
        .run("run the slow thing")
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(5));
    let payload = tool_payload(&outcome.messages[3]);
    assert_eq!(payload["exit_code"], -1);
    assert_eq!(payload["success"], false);
    assert_eq!(payload["error"], "command timed out");
    assert_eq!(payload["stdout"], "partial\n");
}

// =============================================================================
// Conversation Shape Tests
// =============================================================================

#[tokio::test]
async fn test_tool_results_follow_call_order() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("notes.txt");
    let path = file.to_str().unwrap();
    let client = ScriptedClient::new(vec![
        tools(vec![
            call("write_file", json!({"path": path, "content": "remember the milk"})),
            call("read_file", json!({"path": path})),
            call("get_weather", json!({"city": "Rijeka"})),
        ]),
        answer("Saved, and it is partly cloudy."),
    ]);

    let outcome = agent(client, ConfirmationPolicy::default(), Arc::new(FixedConfirm::deny()))
        .run("save a note and check the weather")
        .await
        .unwrap();

    let roles: Vec<Role> = outcome.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            Role::System,
            Role::User,
            Role::Assistant,
            Role::Tool,
            Role::Tool,
            Role::Tool,
            Role::Assistant
        ]
    );
    assert_eq!(tool_payload(&outcome.messages[3])["operation"], "created");
    assert_eq!(tool_payload(&outcome.messages[4])["content"], "remember the milk");
    assert_eq!(tool_payload(&outcome.messages[5])["city"], "Rijeka");
    assert_eq!(outcome.iterations, 1);
}

#[tokio::test]
async fn test_every_request_advertises_all_tools() {
    let client = ScriptedClient::new(vec![
        tools(vec![call("ping", json!({"hostname_or_ip": "10.0.0.1"}))]),
        answer("It is up."),
    ]);

    agent(Arc::clone(&client), ConfirmationPolicy::default(), Arc::new(FixedConfirm::deny()))
        .run("is 10.0.0.1 up?")
        .await
        .unwrap();

    for request in client.requests() {
        assert_eq!(request.model, "test-model");
        assert_eq!(request.tools.len(), 11);
        assert_eq!(request.tools.last().unwrap().name, "run_command");
    }
}

#[tokio::test]
async fn test_budget_exhaustion_with_real_tools() {
    let responses = (0..10)
        .map(|_| tools(vec![call("add_numbers", json!({"a": 1, "b": 1}))]))
        .collect();
    let client = ScriptedClient::new(responses);

    let err = agent(Arc::clone(&client), ConfirmationPolicy::default(), Arc::new(FixedConfirm::deny()))
        .run("keep adding")
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::IterationBudgetExceeded { max_iterations: 10 }));
    assert_eq!(client.requests().len(), 10);
}
