//! Script assembler
//!
//! Batches many wrapper invocations into one injectable script:
//!
//! ```text
//! [kind, ...args]*  ->  compile each (failures -> "")  ->  join
//!                   ->  optional legacy rewrite
//!                   ->  runtime template + final enclosure
//! ```
//!
//! Compilation of one invocation never affects another. A bad specification
//! is logged and contributes nothing to the script.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::builders::compile;
use crate::config::AssemblerConfig;
use crate::error::Result;
use crate::realm::rewrite_legacy_definitions;
use crate::spec::{WrapperCall, WrapperRegistry, WrapperSpec};

/// Outcome counts of one assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// Invocations compiled into a fragment
    pub compiled: usize,
    /// Invocations dropped because they failed to compile
    pub skipped: usize,
}

impl AssemblyStats {
    pub fn total(&self) -> usize {
        self.compiled + self.skipped
    }
}

/// Turns invocation lists into scripts using one registry and configuration.
#[derive(Debug, Clone, Default)]
pub struct ScriptAssembler {
    registry: WrapperRegistry,
    config: AssemblerConfig,
}

impl ScriptAssembler {
    pub fn new(registry: WrapperRegistry, config: AssemblerConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &WrapperRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WrapperRegistry {
        &mut self.registry
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Compile one invocation into its fragment.
    pub fn compile_call(&self, call: &WrapperCall) -> Result<String> {
        let spec: &WrapperSpec = self.registry.get(&call.kind)?;
        let fragment = compile(spec, &call.args_literal(), self.config.error_report())?;
        log::debug!("Compiled {} ({} bytes)", call.kind, fragment.len());
        Ok(fragment)
    }

    /// Assemble `calls` into one script. `None` when there is nothing to
    /// inject.
    pub fn assemble(&self, calls: &[WrapperCall]) -> Option<String> {
        self.assemble_with_stats(calls).map(|(script, _)| script)
    }

    /// Like [`assemble`](Self::assemble), also reporting how many invocations
    /// made it into the script.
    pub fn assemble_with_stats(&self, calls: &[WrapperCall]) -> Option<(String, AssemblyStats)> {
        if calls.is_empty() {
            return None;
        }

        let mut stats = AssemblyStats::default();
        let fragments: Vec<String> = calls
            .iter()
            .map(|call| match self.compile_call(call) {
                Ok(fragment) => {
                    stats.compiled += 1;
                    fragment
                }
                Err(e) => {
                    stats.skipped += 1;
                    log::warn!("Skipping wrapper {}: {}", call.kind, e);
                    String::new()
                }
            })
            .collect();
        let mut fragments = fragments.join("\n");

        if self.config.rewrite_legacy_definitions {
            match rewrite_legacy_definitions(&fragments) {
                Ok(rewritten) => fragments = rewritten,
                Err(e) => log::warn!("Legacy definition rewrite failed: {}", e),
            }
        }

        let script = self
            .config
            .runtime()
            .wrap(&fragments, self.config.error_report());
        log::info!(
            "Assembled wrapping script: {} compiled, {} skipped, {} bytes",
            stats.compiled,
            stats.skipped,
            script.len()
        );
        Some((script, stats))
    }

    /// Assemble from raw `[kind, ...args]` JSON entries. Entries that are not
    /// valid invocations are skipped like failed compilations.
    pub fn assemble_json(&self, entries: &[Value]) -> Option<String> {
        self.assemble_json_with_stats(entries).map(|(script, _)| script)
    }

    pub fn assemble_json_with_stats(&self, entries: &[Value]) -> Option<(String, AssemblyStats)> {
        if entries.is_empty() {
            return None;
        }
        let mut malformed = 0;
        let calls: Vec<WrapperCall> = entries
            .iter()
            .filter_map(|entry| match WrapperCall::try_from(entry.clone()) {
                Ok(call) => Some(call),
                Err(e) => {
                    malformed += 1;
                    log::warn!("Skipping invocation {}: {}", entry, e);
                    None
                }
            })
            .collect();

        let (script, mut stats) = if calls.is_empty() {
            let script = self.config.runtime().wrap("", self.config.error_report());
            (script, AssemblyStats::default())
        } else {
            self.assemble_with_stats(&calls)?
        };
        stats.skipped += malformed;
        Some((script, stats))
    }
}
