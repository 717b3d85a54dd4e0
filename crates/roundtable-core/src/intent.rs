//! Best-effort intent detection over the triggering text.
//!
//! Two heuristics: an explicit "run ability X" instruction, and a
//! built-in folder-count question. These are heuristics rather than
//! contracts, so they live behind [`IntentStrategy`] where a richer
//! parser could replace them without touching the reply pipeline.

use std::path::Path;

/// What the triggering text asked for, beyond plain dialogue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedIntent {
    /// An imperative "run ability X" instruction naming a bound ability.
    InvokeAbility {
        ability_id: String,
        /// Remainder of the text after the ability id, used as the
        /// `{message}` parameter.
        argument: String,
    },
    /// A "how many folders does P contain" question.
    CountFolders { path: String },
}

/// Seam for intent detection. The default heuristic is deliberately
/// small and swappable.
pub trait IntentStrategy: Send + Sync {
    /// Inspect the text; `bound_abilities` limits which ability ids an
    /// invocation phrase may name.
    fn detect(&self, text: &str, bound_abilities: &[String]) -> Option<DetectedIntent>;
}

/// Fixed-phrase heuristic detection.
#[derive(Debug, Clone, Default)]
pub struct HeuristicIntentStrategy;

/// Imperative verbs that introduce an explicit ability invocation.
const INVOKE_VERBS: &[&str] = &["run", "execute", "exec", "执行"];

impl IntentStrategy for HeuristicIntentStrategy {
    fn detect(&self, text: &str, bound_abilities: &[String]) -> Option<DetectedIntent> {
        if let Some(intent) = detect_ability_invocation(text, bound_abilities) {
            return Some(intent);
        }
        detect_folder_count(text).map(|path| DetectedIntent::CountFolders { path })
    }
}

fn detect_ability_invocation(text: &str, bound_abilities: &[String]) -> Option<DetectedIntent> {
    let words: Vec<&str> = text.split_whitespace().collect();
    for (i, word) in words.iter().enumerate() {
        if !INVOKE_VERBS.contains(word) {
            continue;
        }
        let Some(candidate) = words.get(i + 1) else {
            continue;
        };
        if bound_abilities.iter().any(|a| a == candidate) {
            let argument = words[i + 2..].join(" ");
            return Some(DetectedIntent::InvokeAbility {
                ability_id: (*candidate).to_string(),
                argument,
            });
        }
    }
    None
}

/// Recognize "how many folders does <path> contain" and the
/// "检查 <path> 下有多少文件夹" form. Returns the path.
fn detect_folder_count(text: &str) -> Option<String> {
    if text.contains("多少文件夹") {
        // 检查 <path> 下有多少文件夹
        let after = text.split("检查").nth(1)?;
        let path = after
            .split("下")
            .next()?
            .split_whitespace()
            .next()?
            .to_string();
        if !path.is_empty() {
            return Some(path);
        }
        return None;
    }

    let lower = text.to_lowercase();
    if lower.contains("how many folders") || lower.contains("how many subfolders") {
        // how many (sub)folders does <path> contain
        let words: Vec<&str> = text.split_whitespace().collect();
        for (i, word) in words.iter().enumerate() {
            if word.eq_ignore_ascii_case("does") {
                if let Some(path) = words.get(i + 1) {
                    let path = path.trim_end_matches(['?', '.', ',']);
                    if !path.is_empty() {
                        return Some(path.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Count the immediate subdirectories of `path` and render the answer.
///
/// Missing or non-directory paths come back as reply text too; this
/// enrichment never fails past its own boundary.
pub fn count_folders_reply(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        return format!("Path does not exist: {path}");
    }
    if !p.is_dir() {
        return format!("Not a directory: {path}");
    }
    let count = match std::fs::read_dir(p) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .count(),
        Err(err) => return format!("Could not read directory {path}: {err}"),
    };
    format!("Directory {path} contains {count} folder(s).")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abilities(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detects_run_phrase_for_bound_ability() {
        let strategy = HeuristicIntentStrategy;
        let intent = strategy.detect("@task_runner run echo hello there", &abilities(&["echo"]));
        assert_eq!(
            intent,
            Some(DetectedIntent::InvokeAbility {
                ability_id: "echo".to_string(),
                argument: "hello there".to_string(),
            })
        );
    }

    #[test]
    fn test_detects_chinese_invoke_phrase() {
        let strategy = HeuristicIntentStrategy;
        let intent = strategy.detect("@task_runner 执行 echo 你好", &abilities(&["echo"]));
        assert_eq!(
            intent,
            Some(DetectedIntent::InvokeAbility {
                ability_id: "echo".to_string(),
                argument: "你好".to_string(),
            })
        );
    }

    #[test]
    fn test_unbound_ability_is_not_invoked() {
        let strategy = HeuristicIntentStrategy;
        let intent = strategy.detect("run echo hi", &abilities(&["other"]));
        assert_eq!(intent, None);
    }

    #[test]
    fn test_detects_folder_count_question() {
        let strategy = HeuristicIntentStrategy;
        let intent = strategy.detect("how many folders does /tmp contain?", &[]);
        assert_eq!(
            intent,
            Some(DetectedIntent::CountFolders {
                path: "/tmp".to_string()
            })
        );
    }

    #[test]
    fn test_detects_chinese_folder_count_question() {
        let strategy = HeuristicIntentStrategy;
        let intent = strategy.detect("@task_runner 检查 /tmp 下有多少文件夹", &[]);
        assert_eq!(
            intent,
            Some(DetectedIntent::CountFolders {
                path: "/tmp".to_string()
            })
        );
    }

    #[test]
    fn test_plain_text_yields_no_intent() {
        let strategy = HeuristicIntentStrategy;
        assert_eq!(strategy.detect("hello, how are you", &abilities(&["echo"])), None);
    }

    #[test]
    fn test_count_folders_reply_on_tempdir() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join("a")).unwrap();
        std::fs::create_dir(tmp.path().join("b")).unwrap();
        std::fs::write(tmp.path().join("file.txt"), "x").unwrap();

        let reply = count_folders_reply(&tmp.path().display().to_string());
        assert!(reply.contains("2 folder(s)."), "got: {reply}");
    }

    #[test]
    fn test_count_folders_reply_missing_path() {
        let reply = count_folders_reply("/definitely/not/here");
        assert!(reply.starts_with("Path does not exist:"));
    }

    #[test]
    fn test_count_folders_reply_on_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let reply = count_folders_reply(&tmp.path().display().to_string());
        assert!(reply.starts_with("Not a directory:"));
    }
}
