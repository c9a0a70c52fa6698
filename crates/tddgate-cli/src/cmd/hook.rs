use crate::context::{build_gate_or_default, Overrides};
use std::io::Read;
use std::path::Path;

/// Host entry point. Reads one payload from stdin, prints the block message
/// on stdout when blocking, and returns the exit code for the host.
///
/// Never fails: unreadable input, bad config, and log errors all degrade to
/// allowing the edit. Only `BLOCK/NO_TESTS` yields a non-zero code.
pub fn run(root: &Path, overrides: &Overrides) -> i32 {
    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        tracing::warn!(error = %e, "failed to read hook payload from stdin");
        input.clear();
    }

    let gate = build_gate_or_default(root, overrides);
    let decision = gate.evaluate_payload(&input);
    tracing::debug!(
        action = %decision.action,
        reason = %decision.reason,
        file = %decision.file_path,
        "hook decision"
    );

    if let Some(message) = decision.block_message() {
        print!("{message}");
    }
    decision.action.exit_code()
}
