use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::binding::CliBinding;
use crate::error::DriverError;
use crate::provider::Provider;
use crate::Result;

/// How long one assistant call may run before it is abandoned.
pub const INVOKE_TIMEOUT: Duration = Duration::from_secs(60);

// ─── Invoke ───────────────────────────────────────────────────────────────

/// Run one synchronous call against the bound assistant CLI.
///
/// Fails fast with [`DriverError::Unavailable`] on an unbound binding —
/// no process is launched. The user message is always passed as a single
/// opaque argument (never shell-interpolated), so quotes and newlines
/// survive intact. Argument shape per provider:
///
/// - claude: `--print [--append-system-prompt <text>] <message>`
/// - gemini: `--prompt <text>` with the system prompt folded into the
///   text, since the gemini CLI has no system-prompt flag
///
/// Exit 0 yields the trimmed stdout. Appending the turn to conversation
/// history is the caller's job; this function has no side effects beyond
/// the process launch.
pub async fn invoke(
    binding: &CliBinding,
    message: &str,
    system_prompt: Option<&str>,
) -> Result<String> {
    invoke_with_timeout(binding, message, system_prompt, INVOKE_TIMEOUT).await
}

pub(crate) async fn invoke_with_timeout(
    binding: &CliBinding,
    message: &str,
    system_prompt: Option<&str>,
    limit: Duration,
) -> Result<String> {
    let (Some(path), Some(provider)) = (binding.path.as_deref(), binding.provider) else {
        return Err(DriverError::Unavailable);
    };

    let mut parts = path.split_whitespace();
    let program = parts.next().ok_or(DriverError::Unavailable)?;
    let mut cmd = Command::new(program);
    cmd.args(parts);

    match provider {
        Provider::Claude => {
            cmd.arg("--print");
            if let Some(sp) = system_prompt {
                cmd.arg("--append-system-prompt").arg(sp);
            }
            cmd.arg(message);
        }
        Provider::Gemini => {
            let text = match system_prompt {
                Some(sp) => format!("{sp}\n\nUser: {message}"),
                None => message.to_string(),
            };
            cmd.arg("--prompt").arg(text);
        }
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(provider = provider.as_str(), len = message.len(), "invoking CLI");

    let child = cmd.spawn().map_err(|e| DriverError::Launch(e.to_string()))?;

    // kill_on_drop reaps the child when the timeout abandons the future.
    let output = match timeout(limit, child.wait_with_output()).await {
        Err(_) => return Err(DriverError::Timeout),
        Ok(Err(e)) => return Err(DriverError::Launch(e.to_string())),
        Ok(Ok(output)) => output,
    };

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(DriverError::Process(if stderr.is_empty() {
            "unknown error".to_string()
        } else {
            stderr
        }))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn fake_cli(dir: &Path, name: &str, body: &str) -> CliBinding {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        CliBinding::bound(path.to_string_lossy(), Provider::Claude)
    }

    #[tokio::test]
    async fn unbound_binding_fails_without_launch() {
        let err = invoke(&CliBinding::unbound(), "hi", None).await.unwrap_err();
        assert!(matches!(err, DriverError::Unavailable));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_yields_trimmed_stdout() {
        let dir = TempDir::new().unwrap();
        let binding = fake_cli(dir.path(), "claude", r#"echo "Hello!""#);
        let reply = invoke(&binding, "hi", None).await.unwrap();
        assert_eq!(reply, "Hello!");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_yields_stderr() {
        let dir = TempDir::new().unwrap();
        let binding = fake_cli(dir.path(), "claude", r#"echo "auth expired" >&2; exit 1"#);
        let err = invoke(&binding, "hi", None).await.unwrap_err();
        assert!(matches!(err, DriverError::Process(msg) if msg == "auth expired"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_zero_exit_with_empty_stderr_gets_placeholder() {
        let dir = TempDir::new().unwrap();
        let binding = fake_cli(dir.path(), "claude", "exit 3");
        let err = invoke(&binding, "hi", None).await.unwrap_err();
        assert!(matches!(err, DriverError::Process(msg) if msg == "unknown error"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn slow_process_times_out() {
        let dir = TempDir::new().unwrap();
        let binding = fake_cli(dir.path(), "claude", "sleep 5");
        let err = invoke_with_timeout(&binding, "hi", None, Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, DriverError::Timeout));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_executable_is_a_launch_failure() {
        let dir = TempDir::new().unwrap();
        let binding = CliBinding::bound(
            dir.path().join("vanished").to_string_lossy(),
            Provider::Claude,
        );
        let err = invoke(&binding, "hi", None).await.unwrap_err();
        assert!(matches!(err, DriverError::Launch(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn claude_argument_shape_keeps_message_opaque() {
        let dir = TempDir::new().unwrap();
        // Echo every argument separated by '|' so the shape is observable.
        let binding = fake_cli(dir.path(), "claude", r#"printf '%s|' "$@""#);
        let message = "what's \"quoted\" here?";
        let reply = invoke(&binding, message, Some("be brief")).await.unwrap();
        assert_eq!(
            reply,
            format!("--print|--append-system-prompt|be brief|{message}|")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn gemini_folds_system_prompt_into_the_text() {
        let dir = TempDir::new().unwrap();
        let mut binding = fake_cli(dir.path(), "gemini", r#"printf '%s|' "$@""#);
        binding.provider = Some(Provider::Gemini);
        let reply = invoke(&binding, "hello", Some("be brief")).await.unwrap();
        assert_eq!(reply, "--prompt|be brief\n\nUser: hello|");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn multi_word_candidate_splits_into_program_and_args() {
        let dir = TempDir::new().unwrap();
        let runner = dir.path().join("runner");
        {
            use std::os::unix::fs::PermissionsExt;
            // A stand-in for `npx claude`: first arg is the package name.
            std::fs::write(&runner, "#!/bin/sh\nshift\nprintf '%s|' \"$@\"\n").unwrap();
            let mut perms = std::fs::metadata(&runner).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&runner, perms).unwrap();
        }
        let binding = CliBinding::bound(
            format!("{} claude", runner.to_string_lossy()),
            Provider::Claude,
        );
        let reply = invoke(&binding, "hi", None).await.unwrap();
        assert_eq!(reply, "--print|hi|");
    }
}
