use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{DocsaiError, Result};
use super::ModelClient;

/// How to remove the markdown code fences the model wraps its answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceMode {
    /// Strip the first and last line only when they actually look like
    /// fence markers; otherwise pass the response through unchanged.
    Detect,

    /// Unconditionally drop the first and last line. Compatibility mode
    /// that reproduces the historical truncation behavior, including the
    /// empty output a one-line response collapses to.
    Always,
}

/// What to do when the response is too short to carry any code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedPolicy {
    /// Abort the whole batch. Files written before this point stay written.
    Abort,

    /// Log a warning, write nothing for this file, continue with the rest.
    SkipFile,
}

/// One per-file documentation job. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct DocumentationRequest {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
}

impl DocumentationRequest {
    /// Derive the output location: the source path itself in replace mode,
    /// otherwise a sibling file with a `doc_` name prefix.
    pub fn new(source_path: &Path, replace: bool) -> Result<Self> {
        let output_path = if replace {
            source_path.to_path_buf()
        } else {
            let name = source_path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| {
                    DocsaiError::Config(format!(
                        "path has no usable file name: {}",
                        source_path.display()
                    ))
                })?;
            source_path.with_file_name(format!("doc_{}", name))
        };

        Ok(Self {
            source_path: source_path.to_path_buf(),
            output_path,
        })
    }
}

/// Build the fixed instruction sent with every request.
pub fn system_instruction(target_language: &str) -> String {
    format!(
        "You are an expert code documenter. You will be passed source code that \
         may or may not have documentation; add documentation to it inside the \
         code. If the code is written in a language capable of strong typing, \
         add type annotations. Do not otherwise alter the code. Respond with \
         only the code. Write the documentation in {}.",
        target_language
    )
}

/// Drives the per-file read / generate / strip / write cycle.
///
/// Files are processed strictly one at a time in input order. A missing
/// source file aborts the whole batch; outputs already written are kept.
pub struct DocumentationPipeline {
    client: Box<dyn ModelClient>,
    system_instruction: String,
    fence_mode: FenceMode,
    malformed_policy: MalformedPolicy,
}

impl DocumentationPipeline {
    pub fn new(
        client: Box<dyn ModelClient>,
        target_language: &str,
        fence_mode: FenceMode,
        malformed_policy: MalformedPolicy,
    ) -> Self {
        Self {
            client,
            system_instruction: system_instruction(target_language),
            fence_mode,
            malformed_policy,
        }
    }

    pub async fn run(&self, files: &[PathBuf], replace: bool) -> Result<()> {
        for file in files {
            let request = DocumentationRequest::new(file, replace)?;

            let source = match std::fs::read_to_string(&request.source_path) {
                Ok(source) => source,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(DocsaiError::SourceMissing(request.source_path.clone()));
                }
                Err(e) => return Err(e.into()),
            };

            let response = self
                .client
                .generate(&source, &self.system_instruction)
                .await?;

            let documented = match strip_fences(&response, self.fence_mode) {
                Ok(documented) => documented,
                Err(e @ DocsaiError::MalformedResponse(_)) => match self.malformed_policy {
                    MalformedPolicy::Abort => return Err(e),
                    MalformedPolicy::SkipFile => {
                        warn!("Skipping {}: {}", request.source_path.display(), e);
                        continue;
                    }
                },
                Err(e) => return Err(e),
            };

            std::fs::write(&request.output_path, documented)?;

            info!(
                "Documentation for {} ready",
                request
                    .source_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("file")
            );
        }

        Ok(())
    }
}

/// Remove the fence lines wrapping a model response.
///
/// In `Always` mode a one-line response truncates to empty output and an
/// empty response is reported as malformed; neither happens in `Detect`
/// mode, which passes unfenced responses through untouched.
pub fn strip_fences(response: &str, mode: FenceMode) -> Result<String> {
    let lines: Vec<&str> = response.lines().collect();

    match mode {
        FenceMode::Detect => {
            let fenced = lines.len() >= 2
                && lines[0].trim_start().starts_with("```")
                && lines[lines.len() - 1].trim().starts_with("```");

            if fenced {
                Ok(lines[1..lines.len() - 1].join("\n"))
            } else {
                Ok(response.to_string())
            }
        }
        FenceMode::Always => match lines.len() {
            0 => Err(DocsaiError::MalformedResponse(
                "model returned an empty response".to_string(),
            )),
            1 => {
                warn!("Response was a single line; stripping fences leaves nothing");
                Ok(String::new())
            }
            n => Ok(lines[1..n - 1].join("\n")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    struct CannedClient {
        response: String,
    }

    #[async_trait]
    impl ModelClient for CannedClient {
        async fn generate(&self, _source: &str, _instruction: &str) -> Result<String> {
            Ok(self.response.clone())
        }
    }

    fn pipeline(response: &str, mode: FenceMode, policy: MalformedPolicy) -> DocumentationPipeline {
        DocumentationPipeline::new(
            Box::new(CannedClient {
                response: response.to_string(),
            }),
            "english",
            mode,
            policy,
        )
    }

    #[test]
    fn test_output_path_without_replace_gets_doc_prefix() {
        let request = DocumentationRequest::new(Path::new("/tmp/src/hello.py"), false).unwrap();
        assert_eq!(request.output_path, Path::new("/tmp/src/doc_hello.py"));
    }

    #[test]
    fn test_output_path_with_replace_is_the_source() {
        let request = DocumentationRequest::new(Path::new("/tmp/src/hello.py"), true).unwrap();
        assert_eq!(request.output_path, Path::new("/tmp/src/hello.py"));
    }

    #[test]
    fn test_strip_fences_detect_removes_fence_lines() {
        let response = "```python\nprint(1)  # prints one\n```";
        let stripped = strip_fences(response, FenceMode::Detect).unwrap();
        assert_eq!(stripped, "print(1)  # prints one");
    }

    #[test]
    fn test_strip_fences_detect_passes_unfenced_text_through() {
        let response = "print(1)\nprint(2)";
        let stripped = strip_fences(response, FenceMode::Detect).unwrap();
        assert_eq!(stripped, response);
    }

    #[test]
    fn test_strip_fences_detect_passes_single_line_through() {
        let stripped = strip_fences("print(1)", FenceMode::Detect).unwrap();
        assert_eq!(stripped, "print(1)");
    }

    #[test]
    fn test_strip_fences_always_drops_first_and_last_line() {
        let response = "first\nmiddle one\nmiddle two\nlast";
        let stripped = strip_fences(response, FenceMode::Always).unwrap();
        assert_eq!(stripped, "middle one\nmiddle two");
    }

    #[test]
    fn test_strip_fences_always_single_line_truncates_to_empty() {
        let stripped = strip_fences("only line", FenceMode::Always).unwrap();
        assert_eq!(stripped, "");
    }

    #[test]
    fn test_strip_fences_always_empty_response_is_malformed() {
        assert!(matches!(
            strip_fences("", FenceMode::Always),
            Err(DocsaiError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_system_instruction_embeds_language() {
        let instruction = system_instruction("spanish");
        assert!(instruction.contains("spanish"));
    }

    #[tokio::test]
    async fn test_run_writes_doc_sibling_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hello.py");
        std::fs::write(&input, "print(1)").unwrap();

        let pipeline = pipeline(
            "```python\nprint(1)  # prints one\n```",
            FenceMode::Detect,
            MalformedPolicy::Abort,
        );
        pipeline.run(&[input.clone()], false).await.unwrap();

        let output = dir.path().join("doc_hello.py");
        assert_eq!(
            std::fs::read_to_string(output).unwrap(),
            "print(1)  # prints one"
        );
        // The original is untouched in non-replace mode.
        assert_eq!(std::fs::read_to_string(input).unwrap(), "print(1)");
    }

    #[tokio::test]
    async fn test_run_replace_overwrites_the_source() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hello.py");
        std::fs::write(&input, "print(1)").unwrap();

        let pipeline = pipeline(
            "```python\nprint(1)  # prints one\n```",
            FenceMode::Detect,
            MalformedPolicy::Abort,
        );
        pipeline.run(&[input.clone()], true).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(input).unwrap(),
            "print(1)  # prints one"
        );
    }

    #[tokio::test]
    async fn test_run_missing_file_aborts_and_keeps_earlier_output() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("a.py");
        std::fs::write(&first, "print(1)").unwrap();
        let missing = dir.path().join("gone.py");
        let third = dir.path().join("c.py");
        std::fs::write(&third, "print(3)").unwrap();

        let pipeline = pipeline(
            "```python\ndocumented\n```",
            FenceMode::Detect,
            MalformedPolicy::Abort,
        );
        let result = pipeline
            .run(&[first.clone(), missing.clone(), third.clone()], false)
            .await;

        match result {
            Err(DocsaiError::SourceMissing(path)) => assert_eq!(path, missing),
            other => panic!("expected SourceMissing, got {:?}", other),
        }

        // First output survives the abort; the file after the missing one
        // was never processed.
        assert!(dir.path().join("doc_a.py").exists());
        assert!(!dir.path().join("doc_gone.py").exists());
        assert!(!dir.path().join("doc_c.py").exists());
    }

    #[tokio::test]
    async fn test_run_malformed_response_aborts_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hello.py");
        std::fs::write(&input, "print(1)").unwrap();

        let pipeline = pipeline("", FenceMode::Always, MalformedPolicy::Abort);
        let result = pipeline.run(&[input], false).await;

        assert!(matches!(result, Err(DocsaiError::MalformedResponse(_))));
        assert!(!dir.path().join("doc_hello.py").exists());
    }

    #[tokio::test]
    async fn test_run_malformed_response_can_skip_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hello.py");
        std::fs::write(&input, "print(1)").unwrap();

        let pipeline = pipeline("", FenceMode::Always, MalformedPolicy::SkipFile);
        pipeline.run(&[input], false).await.unwrap();

        assert!(!dir.path().join("doc_hello.py").exists());
    }
}
