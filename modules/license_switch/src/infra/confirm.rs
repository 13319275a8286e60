//! Operator confirmation before the first assignment change.

use std::io::IsTerminal;

use dialoguer::Confirm;

use crate::domain::ports::ConfirmPort;

/// Interactive yes/no prompt on the controlling terminal. Defaults to "no".
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalConfirm;

impl TerminalConfirm {
    pub fn is_interactive() -> bool {
        std::io::stdin().is_terminal() && std::io::stderr().is_terminal()
    }
}

impl ConfirmPort for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        if !Self::is_interactive() {
            anyhow::bail!("confirmation requires an interactive terminal; pass --yes to skip it");
        }
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}

/// Fixed answer, for unattended runs.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmPort for AutoConfirm {
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        tracing::debug!(prompt, answer = self.0, "confirmation answered automatically");
        Ok(self.0)
    }
}
