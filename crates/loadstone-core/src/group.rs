// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Loadstone Developers

//! Merging masterlist and userlist group definitions into one sourced view.

use crate::metadata::{RawGroup, SourcedEdge, SourcedGroup};

/// Merges userlist groups into masterlist groups.
///
/// Masterlist entries and their edges are tagged as not user-added. A
/// userlist group with the same name as a masterlist group contributes only
/// the load-after edges the masterlist entry lacks, each tagged as
/// user-added; an edge already present keeps its original tag. Userlist
/// groups with no masterlist counterpart are appended whole as user-added.
/// The result is sorted by name with edge lists likewise sorted, so the
/// merge is order-insensitive.
pub fn merge_groups(masterlist: &[RawGroup], userlist: &[RawGroup]) -> Vec<SourcedGroup> {
    let mut merged: Vec<SourcedGroup> = masterlist
        .iter()
        .map(|group| SourcedGroup {
            name: group.name.clone(),
            is_user_added: false,
            after: group
                .after
                .iter()
                .map(|name| SourcedEdge {
                    name: name.clone(),
                    is_user_added: false,
                })
                .collect(),
        })
        .collect();

    for group in userlist {
        if let Some(existing) = merged.iter_mut().find(|merged| merged.name == group.name) {
            for name in &group.after {
                if !existing.after.iter().any(|edge| edge.name == *name) {
                    existing.after.push(SourcedEdge {
                        name: name.clone(),
                        is_user_added: true,
                    });
                }
            }
        } else {
            merged.push(SourcedGroup {
                name: group.name.clone(),
                is_user_added: true,
                after: group
                    .after
                    .iter()
                    .map(|name| SourcedEdge {
                        name: name.clone(),
                        is_user_added: true,
                    })
                    .collect(),
            });
        }
    }

    for group in &mut merged {
        group.after.sort_by(|a, b| a.name.cmp(&b.name));
        group.after.dedup_by(|a, b| a.name == b.name);
    }
    merged.sort_by(|a, b| a.name.cmp(&b.name));
    merged.dedup_by(|a, b| a.name == b.name);

    merged
}
