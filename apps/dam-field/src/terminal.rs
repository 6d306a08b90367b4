//! 终端提示与确认

use domain::{Confirmer, Notice, NoticeKind, Notifier};
use std::io::{self, BufRead, Write};

/// 把提示打印到标准输出。
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: Notice) {
        let tag = match notice.kind {
            NoticeKind::Info => "info",
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        };
        println!("[{}] {}: {}", tag, notice.title, notice.message);
    }
}

/// 从标准输入读取 y/N；`assume_yes` 时直接确认。
pub struct TerminalConfirmer {
    assume_yes: bool,
}

impl TerminalConfirmer {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, title: &str, message: &str) -> bool {
        println!("{}\n{}", title, message);
        if self.assume_yes {
            println!("> yes");
            return true;
        }
        print!("[y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        off_runtime_workers(|| read_answer(&mut io::stdin().lock()))
    }
}

/// 在多线程运行时中把阻塞的终端读取移出异步调度。
fn off_runtime_workers<T>(read: impl FnOnce() -> T) -> T {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(read)
        }
        _ => read(),
    }
}

fn read_answer(input: &mut impl BufRead) -> bool {
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => is_yes(&answer),
        Err(err) => {
            tracing::warn!(error = %err, "could not read confirmation");
            false
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn answer_is_read_off_the_async_workers() {
        let mut input = io::Cursor::new(b"yes\n".to_vec());
        assert!(off_runtime_workers(|| read_answer(&mut input)));
        let mut input = io::Cursor::new(Vec::new());
        assert!(!off_runtime_workers(|| read_answer(&mut input)));
    }

    #[test]
    fn answer_outside_runtime_reads_directly() {
        let mut input = io::Cursor::new(b"n\n".to_vec());
        assert!(!off_runtime_workers(|| read_answer(&mut input)));
    }

    #[test]
    fn assume_yes_skips_prompt() {
        assert!(TerminalConfirmer::new(true).confirm("Send", "Send anyway?"));
    }
}
