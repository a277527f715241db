use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::BridgeError;
use crate::llm::{ChatModel, ToolSpec};
use crate::prompts;
use crate::toolkit::{tool_spec, Tool};
use crate::transcript::MemoryMessage;

/// One recorded tool invocation.
#[derive(Debug, Clone, Serialize)]
pub struct IntermediateStep {
    pub tool: String,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    pub output: String,
    pub intermediate_steps: Vec<IntermediateStep>,
}

/// Drives the model/tool loop for a single question. Constructed fresh per
/// request by [`crate::agent::AgentFactory`]; invoked exactly once.
pub struct AgentExecutor {
    model: Arc<dyn ChatModel>,
    tools: Vec<Arc<dyn Tool>>,
    system_prompt: String,
    /// Optional framing applied to the question (`{input}` placeholder).
    question_template: Option<String>,
    memory: Vec<MemoryMessage>,
    max_iterations: usize,
    record_steps: bool,
}

impl AgentExecutor {
    pub fn new(
        model: Arc<dyn ChatModel>,
        tools: Vec<Arc<dyn Tool>>,
        system_prompt: String,
        question_template: Option<String>,
        memory: Vec<MemoryMessage>,
        record_steps: bool,
    ) -> Self {
        Self {
            model,
            tools,
            system_prompt,
            question_template,
            memory,
            max_iterations: prompts::MAX_ITERATIONS,
            record_steps,
        }
    }

    #[cfg(test)]
    fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Run the bounded tool-call loop. A model reply without tool calls is
    /// the final answer; reaching the iteration cap yields a best-effort
    /// answer rather than an error.
    pub async fn invoke(&self, question: &str) -> Result<AgentOutcome, BridgeError> {
        let specs: Vec<ToolSpec> = self.tools.iter().map(|t| tool_spec(t.as_ref())).collect();

        let mut messages = vec![json!({
            "role": "system",
            "content": self.system_prompt,
        })];
        for turn in &self.memory {
            messages.push(json!({
                "role": turn.role.as_str(),
                "content": turn.content,
            }));
        }
        let question_content = match &self.question_template {
            Some(template) => template
                .replace("{input}", question)
                .replace("{agent_scratchpad}", ""),
            None => question.to_string(),
        };
        messages.push(json!({ "role": "user", "content": question_content }));

        let mut steps = Vec::new();
        let mut last_content: Option<String> = None;

        for iteration in 0..self.max_iterations {
            let turn = self
                .model
                .complete(&messages, &specs)
                .await
                .map_err(BridgeError::Llm)?;

            if turn.tool_calls.is_empty() {
                match turn.content {
                    Some(content) => {
                        info!("Agent finished after {} iteration(s)", iteration + 1);
                        return Ok(AgentOutcome {
                            output: content,
                            intermediate_steps: steps,
                        });
                    }
                    // Neither an answer nor a tool request; stop early.
                    None => break,
                }
            }

            if let Some(content) = &turn.content {
                last_content = Some(content.clone());
            }

            let tool_calls: Vec<Value> = turn
                .tool_calls
                .iter()
                .map(|c| {
                    json!({
                        "id": c.id,
                        "type": "function",
                        "function": { "name": c.name, "arguments": c.arguments },
                    })
                })
                .collect();
            messages.push(json!({
                "role": "assistant",
                "content": turn.content,
                "tool_calls": tool_calls,
            }));

            for call in &turn.tool_calls {
                let input = extract_input(&call.arguments);
                debug!("Tool call: {}({})", call.name, input);

                // Tool failures go back to the model as tool output so it
                // can rewrite the query, which is the agent's own retry
                // mechanism.
                let output = match self.tools.iter().find(|t| t.name() == call.name) {
                    Some(tool) => tool
                        .call(&input)
                        .await
                        .unwrap_or_else(|e| format!("tool error: {}", e)),
                    None => format!("unknown tool: {}", call.name),
                };

                if self.record_steps {
                    steps.push(IntermediateStep {
                        tool: call.name.clone(),
                        input: input.clone(),
                        output: output.clone(),
                    });
                }

                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": call.id,
                    "content": output,
                }));
            }
        }

        info!("Agent stopped at the iteration cap");
        Ok(AgentOutcome {
            output: last_content.unwrap_or_else(|| prompts::STOPPED_ANSWER.to_string()),
            intermediate_steps: steps,
        })
    }
}

/// The model sends function arguments as a JSON document with an `input`
/// field; fall back to the raw text when it does not.
fn extract_input(arguments: &str) -> String {
    match serde_json::from_str::<Value>(arguments) {
        Ok(Value::Object(map)) => map
            .get("input")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| arguments.to_string()),
        Ok(Value::String(s)) => s,
        _ => arguments.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::llm::{ModelTurn, ToolCall};
    use crate::transcript::MemoryRole;

    /// Replays a fixed sequence of turns; repeats the last one when the
    /// script runs out. Records every message list it was shown.
    struct ScriptedModel {
        turns: Mutex<Vec<ModelTurn>>,
        calls: Mutex<Vec<Vec<Value>>>,
    }

    impl ScriptedModel {
        fn new(turns: Vec<ModelTurn>) -> Self {
            Self {
                turns: Mutex::new(turns),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[Value], _tools: &[ToolSpec]) -> Result<ModelTurn> {
            self.calls.lock().unwrap().push(messages.to_vec());
            let mut turns = self.turns.lock().unwrap();
            if turns.len() > 1 {
                Ok(turns.remove(0))
            } else {
                Ok(turns[0].clone())
            }
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "query-sql"
        }

        fn description(&self) -> &str {
            "echo"
        }

        async fn call(&self, input: &str) -> Result<String> {
            Ok(format!("rows for {}", input))
        }
    }

    fn answer(text: &str) -> ModelTurn {
        ModelTurn {
            content: Some(text.to_string()),
            tool_calls: vec![],
        }
    }

    fn tool_turn() -> ModelTurn {
        ModelTurn {
            content: None,
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: "query-sql".to_string(),
                arguments: r#"{"input": "SELECT 1"}"#.to_string(),
            }],
        }
    }

    fn executor(model: Arc<ScriptedModel>, record_steps: bool) -> AgentExecutor {
        AgentExecutor::new(
            model,
            vec![Arc::new(EchoTool)],
            "system".to_string(),
            None,
            vec![],
            record_steps,
        )
    }

    #[tokio::test]
    async fn direct_answer_needs_one_call() {
        let model = Arc::new(ScriptedModel::new(vec![answer("42")]));
        let outcome = executor(model.clone(), true).invoke("q").await.unwrap();

        assert_eq!(outcome.output, "42");
        assert!(outcome.intermediate_steps.is_empty());
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn tool_call_is_recorded_and_fed_back() {
        let model = Arc::new(ScriptedModel::new(vec![tool_turn(), answer("one row")]));
        let outcome = executor(model.clone(), true).invoke("q").await.unwrap();

        assert_eq!(outcome.output, "one row");
        assert_eq!(outcome.intermediate_steps.len(), 1);
        assert_eq!(outcome.intermediate_steps[0].tool, "query-sql");
        assert_eq!(outcome.intermediate_steps[0].input, "SELECT 1");
        assert_eq!(outcome.intermediate_steps[0].output, "rows for SELECT 1");

        // Second model call must include the tool result message.
        let calls = model.calls.lock().unwrap();
        let last = calls[1].last().unwrap();
        assert_eq!(last["role"], "tool");
        assert_eq!(last["content"], "rows for SELECT 1");
    }

    #[tokio::test]
    async fn steps_are_not_recorded_unless_requested() {
        let model = Arc::new(ScriptedModel::new(vec![tool_turn(), answer("done")]));
        let outcome = executor(model, false).invoke("q").await.unwrap();

        assert_eq!(outcome.output, "done");
        assert!(outcome.intermediate_steps.is_empty());
    }

    #[tokio::test]
    async fn iteration_cap_returns_best_effort() {
        // Model asks for a tool on every turn; the script never ends.
        let model = Arc::new(ScriptedModel::new(vec![tool_turn()]));
        let outcome = executor(model.clone(), false).invoke("q").await.unwrap();

        assert_eq!(model.call_count(), prompts::MAX_ITERATIONS);
        assert_eq!(outcome.output, prompts::STOPPED_ANSWER);
    }

    #[tokio::test]
    async fn memory_precedes_the_question() {
        let model = Arc::new(ScriptedModel::new(vec![answer("ok")]));
        let exec = AgentExecutor::new(
            model.clone(),
            vec![],
            "system".to_string(),
            None,
            vec![MemoryMessage {
                role: MemoryRole::Assistant,
                content: "earlier answer".to_string(),
            }],
            false,
        )
        .with_max_iterations(1);
        exec.invoke("next question").await.unwrap();

        let calls = model.calls.lock().unwrap();
        let messages = &calls[0];
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[1]["content"], "earlier answer");
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[2]["content"], "next question");
    }

    #[test]
    fn input_extraction_falls_back_to_raw_text() {
        assert_eq!(extract_input(r#"{"input": "SELECT 1"}"#), "SELECT 1");
        assert_eq!(extract_input(r#"{"query": "x"}"#), r#"{"query": "x"}"#);
        assert_eq!(extract_input("SELECT 2"), "SELECT 2");
    }
}
