use agent_runtime_tools::ToolError;

/// Per-execution tool call budget.
///
/// Created fresh for every `execute` call and never shared between
/// executions.
#[derive(Debug, Clone)]
pub struct CallBudget {
    max_calls: usize,
    used: usize,
}

impl CallBudget {
    pub fn new(max_calls: usize) -> Self {
        Self { max_calls, used: 0 }
    }

    /// Count one attempted call. Fails once the count passes the maximum.
    pub fn try_consume(&mut self) -> Result<(), ToolError> {
        self.used += 1;
        if self.used > self.max_calls {
            return Err(ToolError::RateLimit(format!(
                "Rate limit exceeded: at most {} tool calls per execution",
                self.max_calls
            )));
        }
        Ok(())
    }

    /// Attempts counted so far, including rejected ones.
    pub fn used(&self) -> usize {
        self.used
    }

    pub fn remaining(&self) -> usize {
        self.max_calls.saturating_sub(self.used)
    }
}
