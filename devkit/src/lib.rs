/*!
# Smartmon DevKit - test support for the smartmon agent

- Scripted smartctl runner that records invocations
- Builders for smartctl JSON output
- Harness wiring cache, collector and orchestrator with isolated state
*/

pub mod smartctl_stub;
pub mod test_utils;

pub use smartctl_stub::{FakeSmartctl, Reply, SmartctlJsonBuilder};
pub use test_utils::TestHarness;
