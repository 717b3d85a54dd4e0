//! Ability execution.
//!
//! Command abilities run as a direct argument vector (never through a
//! shell) after placeholder substitution and argument validation.
//! Prompt abilities go through the model adapter as a single-turn call.
//! Executing the dialogue ability is a no-op signal.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use roundtable_types::ability::{Ability, AbilityKind, AbilityOutcome};
use roundtable_types::error::AbilityError;
use roundtable_types::model::{ChatTurn, ModelRequest};

use crate::model::BoxModelAdapter;

/// Returned when a prompt ability's model call produced no text.
pub const EMPTY_PROMPT_OUTPUT: &str = "(the model returned no output)";

/// Shell metacharacter sequences rejected in any argument.
const METACHARS: &[&str] = &[";", "|", "&", "`", "$(", "\n", "\r"];

/// Runs resolved abilities.
pub struct AbilityExecutor {
    adapter: Arc<BoxModelAdapter>,
    /// Model used for prompt-kind calls.
    model: String,
    /// Per-command timeout.
    timeout: Duration,
}

impl AbilityExecutor {
    pub fn new(adapter: Arc<BoxModelAdapter>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            adapter,
            model: model.into(),
            timeout,
        }
    }

    /// Execute an ability with the given parameters.
    ///
    /// Non-zero exit status is data in the outcome, not an error; only
    /// validation failures, spawn failures, and timeouts error out.
    pub async fn execute(
        &self,
        ability: &Ability,
        params: &HashMap<String, String>,
    ) -> Result<AbilityOutcome, AbilityError> {
        match &ability.kind {
            AbilityKind::Command { template } => self.run_command(template, params).await,
            AbilityKind::Prompt { template } => self.run_prompt(template, params).await,
            AbilityKind::Dialogue => Ok(AbilityOutcome::Dialogue),
        }
    }

    async fn run_command(
        &self,
        template: &[String],
        params: &HashMap<String, String>,
    ) -> Result<AbilityOutcome, AbilityError> {
        let mut argv = Vec::with_capacity(template.len());
        for token in template {
            argv.push(substitute_placeholders(token, params)?);
        }
        validate_args(&argv)?;

        let Some((program, args)) = argv.split_first() else {
            return Err(AbilityError::UnsafeArgument {
                argument: String::new(),
                reason: "command template is empty".to_string(),
            });
        };

        tracing::debug!(program = %program, args = args.len(), "running command ability");

        let child = tokio::process::Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|err| AbilityError::Spawn(err.to_string()))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| AbilityError::Timeout(self.timeout.as_secs()))?
            .map_err(|err| AbilityError::Spawn(err.to_string()))?;

        Ok(AbilityOutcome::Command {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }

    async fn run_prompt(
        &self,
        template: &str,
        params: &HashMap<String, String>,
    ) -> Result<AbilityOutcome, AbilityError> {
        let prompt = substitute_placeholders(template, params)?;

        let request = ModelRequest {
            model: self.model.clone(),
            turns: vec![ChatTurn::user(prompt)],
        };
        let text = match self.adapter.call(&request).await {
            Ok(text) => {
                let trimmed = text.trim().to_string();
                if trimmed.is_empty() {
                    EMPTY_PROMPT_OUTPUT.to_string()
                } else {
                    trimmed
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "prompt ability model call failed");
                EMPTY_PROMPT_OUTPUT.to_string()
            }
        };

        Ok(AbilityOutcome::Prompt { text })
    }
}

/// Replace every `{name}` placeholder from `params`. A placeholder with
/// no matching parameter terminates execution rather than defaulting.
fn substitute_placeholders(
    token: &str,
    params: &HashMap<String, String>,
) -> Result<String, AbilityError> {
    let mut out = String::with_capacity(token.len());
    let mut rest = token;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            // Unbalanced brace: treat the remainder as literal text.
            out.push_str(&rest[open..]);
            return Ok(out);
        };
        let name = &after[..close];
        match params.get(name) {
            Some(value) => out.push_str(value),
            None => {
                return Err(AbilityError::MissingParameter {
                    name: name.to_string(),
                });
            }
        }
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Whitelist every argument (letters, digits, `_ - . / : =`, space and
/// tab), then scan for shell metacharacters. Any violation aborts
/// before a process is spawned.
fn validate_args(args: &[String]) -> Result<(), AbilityError> {
    for arg in args {
        if arg.is_empty() || !arg.chars().all(is_safe_char) {
            return Err(AbilityError::UnsafeArgument {
                argument: arg.clone(),
                reason: "argument contains characters outside the whitelist".to_string(),
            });
        }
        for meta in METACHARS {
            if arg.contains(meta) {
                return Err(AbilityError::UnsafeArgument {
                    argument: arg.clone(),
                    reason: format!("shell metacharacter {meta:?} is not allowed"),
                });
            }
        }
    }
    Ok(())
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '=' | ' ' | '\t')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelAdapter;
    use roundtable_types::model::ModelError;

    struct FixedAdapter(String);

    impl ModelAdapter for FixedAdapter {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn call(&self, _request: &ModelRequest) -> Result<String, ModelError> {
            Ok(self.0.clone())
        }
    }

    fn executor_with(reply: &str) -> AbilityExecutor {
        AbilityExecutor::new(
            Arc::new(BoxModelAdapter::new(FixedAdapter(reply.to_string()))),
            "test-model",
            Duration::from_secs(5),
        )
    }

    fn command(template: &[&str]) -> Ability {
        Ability {
            id: "cmd".to_string(),
            name: "Cmd".to_string(),
            description: String::new(),
            kind: AbilityKind::Command {
                template: template.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitution_fills_placeholders() {
        let out =
            substitute_placeholders("prefix {a} mid {b}", &params(&[("a", "1"), ("b", "2")]))
                .unwrap();
        assert_eq!(out, "prefix 1 mid 2");
    }

    #[test]
    fn test_substitution_missing_parameter_errors() {
        let err = substitute_placeholders("{missing}", &HashMap::new()).unwrap_err();
        assert!(matches!(err, AbilityError::MissingParameter { name } if name == "missing"));
    }

    #[test]
    fn test_validation_rejects_metacharacters() {
        for bad in ["; rm -rf /", "a|b", "a&b", "`whoami`", "$(date)"] {
            let err = validate_args(&[bad.to_string()]).unwrap_err();
            assert!(
                matches!(err, AbilityError::UnsafeArgument { .. }),
                "expected rejection of {bad:?}"
            );
        }
    }

    #[test]
    fn test_validation_accepts_safe_arguments() {
        let args: Vec<String> = ["wc", "-l", "/tmp/file.txt", "key=value", "a:b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert!(validate_args(&args).is_ok());
    }

    #[tokio::test]
    async fn test_command_runs_without_shell_interpretation() {
        let executor = executor_with("");
        let ability = command(&["echo", "{message}"]);
        let outcome = executor
            .execute(&ability, &params(&[("message", "hello world")]))
            .await
            .unwrap();
        match outcome {
            AbilityOutcome::Command {
                stdout, exit_code, ..
            } => {
                assert_eq!(stdout.trim(), "hello world");
                assert_eq!(exit_code, Some(0));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_command_injection_attempt_is_rejected() {
        let executor = executor_with("");
        let ability = command(&["echo", "{message}"]);
        let err = executor
            .execute(&ability, &params(&[("message", "; rm -rf /")]))
            .await
            .unwrap_err();
        assert!(matches!(err, AbilityError::UnsafeArgument { .. }));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_data_not_error() {
        let executor = executor_with("");
        let ability = command(&["false"]);
        let outcome = executor.execute(&ability, &HashMap::new()).await.unwrap();
        match outcome {
            AbilityOutcome::Command { exit_code, .. } => assert_eq!(exit_code, Some(1)),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prompt_ability_returns_trimmed_text() {
        let executor = executor_with("  understood  ");
        let ability = Ability {
            id: "p".to_string(),
            name: "P".to_string(),
            description: String::new(),
            kind: AbilityKind::Prompt {
                template: "User request: {message}".to_string(),
            },
        };
        let outcome = executor
            .execute(&ability, &params(&[("message", "read it")]))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            AbilityOutcome::Prompt {
                text: "understood".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_prompt_ability_empty_response_placeholder() {
        let executor = executor_with("");
        let ability = Ability {
            id: "p".to_string(),
            name: "P".to_string(),
            description: String::new(),
            kind: AbilityKind::Prompt {
                template: "{message}".to_string(),
            },
        };
        let outcome = executor
            .execute(&ability, &params(&[("message", "x")]))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            AbilityOutcome::Prompt {
                text: EMPTY_PROMPT_OUTPUT.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_dialogue_execution_is_noop() {
        let executor = executor_with("");
        let outcome = executor
            .execute(&Ability::dialogue(), &HashMap::new())
            .await
            .unwrap();
        assert_eq!(outcome, AbilityOutcome::Dialogue);
    }
}
