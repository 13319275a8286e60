/// Operator gate in front of the first mutating call.
pub trait ConfirmPort: Send + Sync {
    /// `Ok(false)` means the operator declined; `Err` means no answer could be obtained.
    fn confirm(&self, prompt: &str) -> anyhow::Result<bool>;
}
