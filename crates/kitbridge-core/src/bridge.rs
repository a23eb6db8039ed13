//! # Bridge Execution
//!
//! Runs payloads through validated port wirings.
//!
//! - `Bridge`: one source-port → target-port wire, created by the Registry
//! - `BridgeExecutor`: validates and converts one payload, keeps statistics
//! - `BridgeChain`: sequential composition, short-circuits on failure
//! - `BridgePair`: parallel composition over the same input
//!
//! Incompatibility is an expected outcome and is reported as
//! `success = false`, never as an error.

use crate::sync::lock;
use crate::{DataPort, DataType, KitId, Metadata, ProductionOutput};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

// =============================================================================
// BRIDGE
// =============================================================================

/// A validated wiring from one Kit's output port to another Kit's input port.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Bridge {
    pub source_kit: KitId,
    pub target_kit: KitId,
    pub source_port: DataPort,
    pub target_port: DataPort,
}

impl Bridge {
    /// Whether this bridge involves the given Kit on either end.
    #[must_use]
    pub fn touches(&self, kit: &KitId) -> bool {
        &self.source_kit == kit || &self.target_kit == kit
    }
}

/// Ephemeral payload flowing through the execution layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeData {
    pub data_type: DataType,
    pub value: String,
    pub metadata: Metadata,
    pub source_kit: KitId,
}

impl BridgeData {
    /// Create a payload.
    #[must_use]
    pub fn new(data_type: DataType, value: impl Into<String>, source_kit: KitId) -> Self {
        Self {
            data_type,
            value: value.into(),
            metadata: Metadata::new(),
            source_kit,
        }
    }
}

impl From<&ProductionOutput> for BridgeData {
    fn from(output: &ProductionOutput) -> Self {
        Self {
            data_type: output.data_type,
            value: output.content.clone(),
            metadata: output.metadata.clone(),
            source_kit: output.kit_id.clone(),
        }
    }
}

// =============================================================================
// RESULTS & STATISTICS
// =============================================================================

/// Outcome of running a payload through one bridge (or a chain).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub success: bool,
    pub output: Option<BridgeData>,
}

impl ExecutionResult {
    fn succeeded(output: BridgeData) -> Self {
        Self {
            success: true,
            output: Some(output),
        }
    }

    fn failed() -> Self {
        Self {
            success: false,
            output: None,
        }
    }
}

/// Outcome of a `BridgePair`. Callers decide how to combine the halves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairResult {
    pub first: ExecutionResult,
    pub second: ExecutionResult,
}

impl PairResult {
    /// Both halves succeeded.
    #[must_use]
    pub fn both_succeeded(&self) -> bool {
        self.first.success && self.second.success
    }

    /// At least one half succeeded.
    #[must_use]
    pub fn any_succeeded(&self) -> bool {
        self.first.success || self.second.success
    }
}

/// Running counters of the executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub total: u64,
    pub successes: u64,
    pub failures: u64,
}

// =============================================================================
// EXECUTOR
// =============================================================================

/// Executes payloads through bridges.
///
/// Safe to share between threads; the statistics are updated under the
/// executor's own lock.
#[derive(Debug, Default)]
pub struct BridgeExecutor {
    stats: Mutex<ExecutionStats>,
}

impl BridgeExecutor {
    /// Create an executor with zeroed statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `data` through `bridge`.
    ///
    /// Fails when the payload type does not fit the source port, or when the
    /// converted type does not fit the target port. On success the output
    /// carries the target's declared type and names the target Kit as its
    /// source.
    pub fn execute(&self, data: &BridgeData, bridge: &Bridge) -> ExecutionResult {
        let result = Self::convert(data, bridge)
            .map(ExecutionResult::succeeded)
            .unwrap_or_else(ExecutionResult::failed);
        self.record(result.success);

        if !result.success {
            tracing::debug!(
                source = %bridge.source_kit,
                target = %bridge.target_kit,
                payload = %data.data_type,
                "bridge rejected payload"
            );
        }
        result
    }

    fn convert(data: &BridgeData, bridge: &Bridge) -> Option<BridgeData> {
        let source_type = bridge.source_port.data_type;
        if !data.data_type.is_compatible(source_type) {
            return None;
        }

        let transformed = if source_type == DataType::Any {
            data.data_type
        } else {
            source_type
        };

        let target_type = bridge.target_port.data_type;
        if !transformed.is_compatible(target_type) {
            return None;
        }

        Some(BridgeData {
            data_type: target_type,
            value: data.value.clone(),
            metadata: data.metadata.clone(),
            source_kit: bridge.target_kit.clone(),
        })
    }

    fn record(&self, success: bool) {
        let mut stats = lock(&self.stats);
        stats.total = stats.total.saturating_add(1);
        if success {
            stats.successes = stats.successes.saturating_add(1);
        } else {
            stats.failures = stats.failures.saturating_add(1);
        }
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> ExecutionStats {
        *lock(&self.stats)
    }

    /// Reset all counters to zero.
    pub fn reset_stats(&self) {
        *lock(&self.stats) = ExecutionStats::default();
    }
}

// =============================================================================
// COMPOSITION
// =============================================================================

/// Bridges executed strictly in order, each feeding the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeChain {
    bridges: Vec<Bridge>,
}

impl BridgeChain {
    /// Create a chain from an ordered list of bridges.
    #[must_use]
    pub fn new(bridges: Vec<Bridge>) -> Self {
        Self { bridges }
    }

    /// Append a bridge (builder style).
    #[must_use]
    pub fn then(mut self, bridge: Bridge) -> Self {
        self.bridges.push(bridge);
        self
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bridges.len()
    }

    /// Whether the chain has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bridges.is_empty()
    }

    /// Run the chain. Returns the first failure without executing later
    /// steps; an empty chain fails.
    pub fn execute(&self, executor: &BridgeExecutor, data: BridgeData) -> ExecutionResult {
        if self.bridges.is_empty() {
            return ExecutionResult::failed();
        }

        let mut current = data;
        for bridge in &self.bridges {
            let step = executor.execute(&current, bridge);
            match (step.success, step.output) {
                (true, Some(next)) => current = next,
                _ => return ExecutionResult::failed(),
            }
        }
        ExecutionResult::succeeded(current)
    }
}

/// Two bridges run independently over the same input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgePair {
    pub first: Bridge,
    pub second: Bridge,
}

impl BridgePair {
    /// Create a pair.
    #[must_use]
    pub fn new(first: Bridge, second: Bridge) -> Self {
        Self { first, second }
    }

    /// Run both halves against `data`.
    pub fn execute(&self, executor: &BridgeExecutor, data: &BridgeData) -> PairResult {
        PairResult {
            first: executor.execute(data, &self.first),
            second: executor.execute(data, &self.second),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bridge(from: &str, out: DataType, to: &str, input: DataType) -> Bridge {
        Bridge {
            source_kit: KitId::new(from),
            target_kit: KitId::new(to),
            source_port: DataPort::new("out", out, ""),
            target_port: DataPort::new("in", input, ""),
        }
    }

    #[test]
    fn execute_retags_payload_with_target() {
        let executor = BridgeExecutor::new();
        let b = bridge("a", DataType::Json, "b", DataType::Json);
        let data = BridgeData::new(DataType::Json, "{}", KitId::new("a"));

        let result = executor.execute(&data, &b);

        assert!(result.success);
        let output = result.output.expect("output");
        assert_eq!(output.source_kit, KitId::new("b"));
        assert_eq!(output.data_type, DataType::Json);
        assert_eq!(output.value, "{}");
    }

    #[test]
    fn execute_rejects_payload_not_matching_source_port() {
        let executor = BridgeExecutor::new();
        let b = bridge("a", DataType::Json, "b", DataType::Json);
        let data = BridgeData::new(DataType::Text, "hi", KitId::new("a"));

        let result = executor.execute(&data, &b);

        assert!(!result.success);
        assert!(result.output.is_none());
        assert_eq!(executor.stats().failures, 1);
    }

    #[test]
    fn any_source_port_checks_payload_type_against_target() {
        let executor = BridgeExecutor::new();
        let to_code = bridge("a", DataType::Any, "b", DataType::Code);
        let to_json = bridge("a", DataType::Any, "c", DataType::Json);
        let data = BridgeData::new(DataType::Code, "fn main() {}", KitId::new("a"));

        let output = executor.execute(&data, &to_code).output.expect("output");
        assert_eq!(output.data_type, DataType::Code);
        assert!(!executor.execute(&data, &to_json).success);
    }

    #[test]
    fn any_target_port_retags_payload_as_any() {
        let executor = BridgeExecutor::new();
        let b = bridge("a", DataType::Markdown, "b", DataType::Any);
        let data = BridgeData::new(DataType::Markdown, "# t", KitId::new("a"));

        let output = executor.execute(&data, &b).output.expect("output");
        assert_eq!(output.data_type, DataType::Any);
        assert_eq!(output.value, "# t");
    }

    #[test]
    fn concurrent_execute_counts_every_call() {
        const THREADS: u64 = 8;
        const CALLS: u64 = 500;

        let executor = BridgeExecutor::new();
        let ok = bridge("a", DataType::Text, "b", DataType::Text);
        let bad = bridge("a", DataType::Json, "b", DataType::Json);
        let data = BridgeData::new(DataType::Text, "x", KitId::new("a"));

        std::thread::scope(|scope| {
            for t in 0..THREADS {
                let (executor, ok, bad, data) = (&executor, &ok, &bad, &data);
                scope.spawn(move || {
                    for i in 0..CALLS {
                        let b = if (t + i) % 3 == 0 { bad } else { ok };
                        executor.execute(data, b);
                    }
                });
            }
        });

        let stats = executor.stats();
        assert_eq!(stats.total, THREADS * CALLS);
        assert_eq!(stats.successes + stats.failures, stats.total);
        assert!(stats.failures > 0);
        assert!(stats.successes > 0);
    }

    #[test]
    fn stats_count_every_execution() {
        let executor = BridgeExecutor::new();
        let b = bridge("a", DataType::Text, "b", DataType::Text);
        let ok = BridgeData::new(DataType::Text, "x", KitId::new("a"));
        let bad = BridgeData::new(DataType::Json, "x", KitId::new("a"));

        executor.execute(&ok, &b);
        executor.execute(&ok, &b);
        executor.execute(&bad, &b);

        let stats = executor.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.successes, 2);
        assert_eq!(stats.failures, 1);

        executor.reset_stats();
        assert_eq!(executor.stats(), ExecutionStats::default());
    }

    #[test]
    fn chain_short_circuits_on_failure() {
        let executor = BridgeExecutor::new();
        let chain = BridgeChain::default()
            .then(bridge("a", DataType::Text, "b", DataType::Text))
            .then(bridge("b", DataType::Json, "c", DataType::Json))
            .then(bridge("c", DataType::Json, "d", DataType::Json));

        let data = BridgeData::new(DataType::Text, "t", KitId::new("a"));
        let result = chain.execute(&executor, data);

        assert!(!result.success);
        assert!(result.output.is_none());
        // Third bridge never ran
        assert_eq!(executor.stats().total, 2);
    }

    #[test]
    fn chain_output_is_last_step_output() {
        let executor = BridgeExecutor::new();
        let chain = BridgeChain::new(vec![
            bridge("a", DataType::Text, "b", DataType::Any),
            bridge("b", DataType::Any, "c", DataType::Text),
        ]);

        let data = BridgeData::new(DataType::Text, "t", KitId::new("a"));
        let result = chain.execute(&executor, data);

        assert!(result.success);
        let output = result.output.expect("output");
        assert_eq!(output.source_kit, KitId::new("c"));
        assert_eq!(output.data_type, DataType::Text);
    }

    #[test]
    fn any_hop_lets_chain_continue_into_concrete_port() {
        let executor = BridgeExecutor::new();
        let chain = BridgeChain::new(vec![
            bridge("a", DataType::Text, "b", DataType::Any),
            bridge("b", DataType::Json, "c", DataType::Json),
        ]);

        let data = BridgeData::new(DataType::Text, "t", KitId::new("a"));
        let result = chain.execute(&executor, data);

        assert!(result.success);
        let output = result.output.expect("output");
        assert_eq!(output.data_type, DataType::Json);
        assert_eq!(output.source_kit, KitId::new("c"));
        assert_eq!(executor.stats().successes, 2);
    }

    #[test]
    fn empty_chain_fails() {
        let executor = BridgeExecutor::new();
        let result = BridgeChain::default()
            .execute(&executor, BridgeData::new(DataType::Text, "t", KitId::new("a")));
        assert!(!result.success);
        assert_eq!(executor.stats().total, 0);
    }

    #[test]
    fn pair_allows_partial_success() {
        let executor = BridgeExecutor::new();
        let pair = BridgePair::new(
            bridge("a", DataType::Text, "b", DataType::Text),
            bridge("a", DataType::Json, "c", DataType::Json),
        );

        let data = BridgeData::new(DataType::Text, "t", KitId::new("a"));
        let result = pair.execute(&executor, &data);

        assert!(result.first.success);
        assert!(!result.second.success);
        assert!(result.any_succeeded());
        assert!(!result.both_succeeded());
    }
}
