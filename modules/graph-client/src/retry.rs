use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tracing::error;

use crate::error::{GraphError, Result};

/// How many times a GET is reissued before giving up, and how long to wait
/// between attempts. The default retries forever with no pause.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: Option<u32>,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn forever() -> Self {
        Self::default()
    }

    /// At most `max_attempts` requests. Zero is treated as one since the
    /// first request is always made; callers validating user input should
    /// reject zero before getting here.
    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt >= max)
    }
}

/// Run `op` until it succeeds. Every failed attempt writes one error line.
///
/// With an unbounded policy this only returns `Ok`.
pub async fn until_ok<T, F, Fut>(policy: &RetryPolicy, url: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let shown = redact_token(url);
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                error!(url = %shown, attempt, error = %e, at = %Utc::now(), "Error for URL");

                if policy.exhausted(attempt) {
                    return Err(GraphError::RetriesExhausted {
                        url: shown,
                        attempts: attempt,
                    });
                }
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
        }
    }
}

/// Mask the `access_token` query value so app secrets stay out of logs.
pub fn redact_token(url: &str) -> String {
    let Some(start) = url.find("access_token=") else {
        return url.to_string();
    };
    let value_start = start + "access_token=".len();
    let value_end = url[value_start..]
        .find('&')
        .map_or(url.len(), |i| value_start + i);

    format!("{}***{}", &url[..value_start], &url[value_end..])
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    /// Collects formatted log output so tests can count lines.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn lines(&self) -> Vec<String> {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf)
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture() -> (Captured, tracing::subscriber::DefaultGuard) {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (captured, guard)
    }

    fn flaky(failures: u32, calls: &AtomicU32) -> impl FnMut() -> std::future::Ready<Result<String>> + '_ {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if n < failures {
                Err(GraphError::Http {
                    status: 500,
                    body: "boom".to_string(),
                })
            } else {
                Ok("body".to_string())
            })
        }
    }

    #[tokio::test]
    async fn n_failures_emit_n_error_lines_then_return_body() {
        let (captured, _guard) = capture();
        let calls = AtomicU32::new(0);

        let body = until_ok(&RetryPolicy::forever(), "https://graph/x", flaky(4, &calls))
            .await
            .unwrap();

        assert_eq!(body, "body");
        assert_eq!(calls.load(Ordering::SeqCst), 5);

        let lines = captured.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| l.contains("ERROR") && l.contains("Error for URL")));
    }

    #[tokio::test]
    async fn immediate_success_logs_nothing() {
        let (captured, _guard) = capture();
        let calls = AtomicU32::new(0);

        until_ok(&RetryPolicy::forever(), "https://graph/x", flaky(0, &calls))
            .await
            .unwrap();

        assert!(captured.lines().is_empty());
    }

    #[tokio::test]
    async fn bounded_policy_gives_up() {
        let calls = AtomicU32::new(0);

        let err = until_ok(&RetryPolicy::bounded(3), "https://graph/x", flaky(10, &calls))
            .await
            .unwrap_err();

        assert!(matches!(err, GraphError::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn token_is_masked() {
        assert_eq!(
            redact_token("https://g/1/feed/?fields=id&limit=100&access_token=app|secret"),
            "https://g/1/feed/?fields=id&limit=100&access_token=***"
        );
        assert_eq!(
            redact_token("https://g/next?access_token=app|secret&after=abc"),
            "https://g/next?access_token=***&after=abc"
        );
        assert_eq!(redact_token("https://g/plain"), "https://g/plain");
    }
}
