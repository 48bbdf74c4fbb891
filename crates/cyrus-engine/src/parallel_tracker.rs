// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Consolidates a fan-out of parallel `Task` sub-agent calls within one
//! assistant turn into a single replacing ephemeral activity (spec
//! §4.3).
//!
//! The committed [`cyrus_core::ParallelAgentGroup`] state lives on the
//! owning [`cyrus_core::Session`]; this tracker only holds the small,
//! unpersisted buffer of `Task` calls seen before a second one arrives
//! and promotes them into a group. Losing that buffer on crash just
//! means an in-flight fan-out is treated as ungrouped individual calls
//! after recovery, which is the same "dormant, no auto-resume" posture
//! the rest of the crash-recovery story takes (spec §4.9).

use cyrus_core::{GroupId, ParallelAgentGroup, ParallelAgentProgress, RunnerEvent};
use std::collections::HashMap;

const TASK_TOOL_NAME: &str = "Task";
const STALE_GROUP_MAX_AGE_SECS: u64 = 60 * 60;

/// What the coordinator should do with an event after folding it
/// through the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum Fold {
    /// Not part of any fan-out; post the event as normal.
    Unaffected,
    /// Belongs to group `group_id`; post `rendered` as a *replacing*
    /// ephemeral activity instead of the raw event.
    Ephemeral { group_id: GroupId, rendered: String },
    /// Group `group_id` just completed; post `rendered` as a final
    /// non-ephemeral summary, then drop the group.
    Completed { group_id: GroupId, rendered: String },
}

/// Per-session fan-out detector and consolidator.
///
/// Invariant (spec §4.3): at most one group is ever pending-create at
/// a time per session — enforced here by promoting the pending buffer
/// into a `ParallelAgentGroup` synchronously, inside `observe`, the
/// instant a second `Task` call arrives, before any tracker RPC.
#[derive(Default)]
pub struct ParallelTaskTracker {
    pending: Vec<(String, Option<String>)>,
}

impl ParallelTaskTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `event` against `groups` (the session's committed group
    /// map), creating, updating, or completing a group as needed.
    pub fn observe(
        &mut self,
        event: &RunnerEvent,
        groups: &mut HashMap<GroupId, ParallelAgentGroup>,
        now_epoch_s: u64,
    ) -> Fold {
        match event {
            RunnerEvent::Action { name, tool_use_id, detail } if name == TASK_TOOL_NAME => {
                self.observe_task_action(tool_use_id, detail.clone(), groups, now_epoch_s)
            }
            RunnerEvent::Action { tool_use_id, name, detail } => {
                self.observe_member_action(tool_use_id, name, detail.as_deref(), groups)
            }
            RunnerEvent::Result { tool_use_id, output, .. } => {
                self.observe_result(tool_use_id, output, groups)
            }
            _ => Fold::Unaffected,
        }
    }

    fn active_group_mut<'a>(
        &self,
        groups: &'a mut HashMap<GroupId, ParallelAgentGroup>,
    ) -> Option<(GroupId, &'a mut ParallelAgentGroup)> {
        groups.iter_mut().find(|(_, g)| !g.is_complete()).map(|(id, g)| (*id, g))
    }

    fn observe_task_action(
        &mut self,
        tool_use_id: &str,
        description: Option<String>,
        groups: &mut HashMap<GroupId, ParallelAgentGroup>,
        now_epoch_s: u64,
    ) -> Fold {
        if let Some((group_id, group)) = self.active_group_mut(groups) {
            group
                .agents
                .entry(tool_use_id.to_string())
                .or_insert_with(|| ParallelAgentProgress::new(description.unwrap_or_default()));
            return Fold::Ephemeral { group_id, rendered: group.render() };
        }

        self.pending.push((tool_use_id.to_string(), description));
        if self.pending.len() < 2 {
            return Fold::Unaffected;
        }

        let group_id = GroupId::new();
        let mut group = ParallelAgentGroup::new(now_epoch_s);
        for (id, desc) in self.pending.drain(..) {
            group.agents.insert(id, ParallelAgentProgress::new(desc.unwrap_or_default()));
        }
        let rendered = group.render();
        groups.insert(group_id, group);
        Fold::Ephemeral { group_id, rendered }
    }

    fn observe_member_action(
        &mut self,
        tool_use_id: &str,
        name: &str,
        detail: Option<&str>,
        groups: &mut HashMap<GroupId, ParallelAgentGroup>,
    ) -> Fold {
        let Some((group_id, group)) = self.active_group_mut(groups) else { return Fold::Unaffected };
        let Some(progress) = group.agents.get_mut(tool_use_id) else { return Fold::Unaffected };
        progress.tool_count += 1;
        progress.current_action = Some(detail.map(str::to_string).unwrap_or_else(|| name.to_string()));
        Fold::Ephemeral { group_id, rendered: group.render() }
    }

    fn observe_result(
        &mut self,
        tool_use_id: &str,
        output: &str,
        groups: &mut HashMap<GroupId, ParallelAgentGroup>,
    ) -> Fold {
        if let Some((group_id, group)) = self.active_group_mut(groups) {
            if let Some(progress) = group.agents.get_mut(tool_use_id) {
                progress.completed = true;
                progress.result = Some(output.to_string());
                let rendered = group.render();
                if group.is_complete() {
                    groups.remove(&group_id);
                    return Fold::Completed { group_id, rendered };
                }
                return Fold::Ephemeral { group_id, rendered };
            }
        }
        self.pending.retain(|(id, _)| id != tool_use_id);
        Fold::Unaffected
    }

    /// Periodic cleanup sweep (spec §4.3: "drops groups older than one
    /// hour"). Returns the ids of any groups dropped.
    pub fn sweep_stale(
        &mut self,
        groups: &mut HashMap<GroupId, ParallelAgentGroup>,
        now_epoch_s: u64,
    ) -> Vec<GroupId> {
        let stale: Vec<GroupId> = groups
            .iter()
            .filter(|(_, g)| g.is_stale(now_epoch_s, STALE_GROUP_MAX_AGE_SECS))
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            groups.remove(id);
        }
        stale
    }
}

#[cfg(test)]
#[path = "parallel_tracker_tests.rs"]
mod tests;
