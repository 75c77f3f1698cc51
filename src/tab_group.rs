//! Grouping of tabs by root id.
//!
//! The filter keeps an ordered tab list where every tab belongs to the
//! group named by its root id. Members of a group are kept next to each
//! other. On top of that it maintains a dense group index so groups can be
//! addressed like a list, each represented by its last shown tab.

use crate::error::{Result, TabGroupError};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Identifies a tab. Group ids are the id of the group's root tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug)]
struct TabGroup {
    /// Members in model order.
    members: Vec<TabId>,
    last_shown: TabId,
}

/// A grouped view over a tab list.
#[derive(Debug, Default)]
pub struct TabGroupModelFilter {
    incognito: bool,
    tabs: Vec<TabId>,
    roots: HashMap<TabId, TabId>,
    groups: HashMap<TabId, TabGroup>,
    group_order: Vec<TabId>,
    group_index: HashMap<TabId, usize>,
    actual_group_count: usize,
}

impl TabGroupModelFilter {
    /// Create an empty filter.
    pub fn new(incognito: bool) -> Self {
        Self {
            incognito,
            ..Self::default()
        }
    }

    /// Whether this filter groups incognito tabs.
    pub fn is_incognito(&self) -> bool {
        self.incognito
    }

    /// Add `tab` to the group rooted at `root`.
    ///
    /// A tab that is its own root starts a new group at the end of the list;
    /// otherwise it is placed right after the last member of its group.
    pub fn add_tab(&mut self, tab: TabId, root: TabId) -> Result<()> {
        if self.roots.contains_key(&tab) {
            return Err(TabGroupError::DuplicateTab(tab));
        }

        if let Some(group) = self.groups.get_mut(&root) {
            let position = group
                .members
                .last()
                .and_then(|last| self.tabs.iter().position(|t| t == last))
                .map_or(self.tabs.len(), |index| index + 1);
            self.tabs.insert(position, tab);
            group.members.push(tab);
            if group.members.len() == 2 {
                self.actual_group_count += 1;
            }
        } else if root == tab {
            self.tabs.push(tab);
            self.groups.insert(
                root,
                TabGroup {
                    members: vec![tab],
                    last_shown: tab,
                },
            );
        } else {
            return Err(TabGroupError::UnknownGroup(root));
        }

        self.roots.insert(tab, root);
        self.rebuild_index();
        debug!(%tab, %root, "added tab");
        Ok(())
    }

    /// Remove `tab`. If it was its group's last shown tab, the next member
    /// takes over, or the previous one if it was last.
    pub fn close_tab(&mut self, tab: TabId) -> Result<()> {
        let root = self
            .roots
            .remove(&tab)
            .ok_or(TabGroupError::UnknownTab(tab))?;
        self.tabs.retain(|t| *t != tab);
        self.remove_member(root, tab);
        self.rebuild_index();
        debug!(%tab, %root, "closed tab");
        Ok(())
    }

    /// Record `tab` as the last shown tab of its group.
    pub fn select_tab(&mut self, tab: TabId) -> Result<()> {
        let root = self.root_id(tab)?;
        let group = self
            .groups
            .get_mut(&root)
            .ok_or(TabGroupError::UnknownGroup(root))?;
        group.last_shown = tab;
        Ok(())
    }

    /// Move every tab of `source`'s group into `dest`'s group, placing them
    /// after its current members.
    pub fn merge_tabs(&mut self, source: TabId, dest: TabId) -> Result<()> {
        let source_root = self.root_id(source)?;
        let dest_root = self.root_id(dest)?;
        if source_root == dest_root {
            return Err(TabGroupError::SameGroup(source, dest));
        }

        let moving = self
            .groups
            .remove(&source_root)
            .ok_or(TabGroupError::UnknownGroup(source_root))?
            .members;
        if moving.len() >= 2 {
            self.actual_group_count -= 1;
        }
        self.tabs.retain(|t| !moving.contains(t));

        let dest_group = self
            .groups
            .get_mut(&dest_root)
            .ok_or(TabGroupError::UnknownGroup(dest_root))?;
        let position = dest_group
            .members
            .last()
            .and_then(|last| self.tabs.iter().position(|t| t == last))
            .map_or(self.tabs.len(), |index| index + 1);
        if dest_group.members.len() == 1 {
            self.actual_group_count += 1;
        }
        self.tabs.splice(position..position, moving.iter().copied());
        dest_group.members.extend(moving.iter().copied());
        for tab in &moving {
            self.roots.insert(*tab, dest_root);
        }

        self.rebuild_index();
        debug!(%source_root, %dest_root, moved = moving.len(), "merged groups");
        Ok(())
    }

    /// Take `tab` out of its group and make it a group of its own, placed
    /// right after the group it left. Single-tab groups are left alone.
    pub fn move_tab_out_of_group(&mut self, tab: TabId) -> Result<()> {
        let root = self.root_id(tab)?;
        let size = self.groups.get(&root).map_or(0, |group| group.members.len());
        if size <= 1 {
            return Ok(());
        }

        self.remove_member(root, tab);
        self.tabs.retain(|t| *t != tab);

        let group = self
            .groups
            .remove(&root)
            .ok_or(TabGroupError::UnknownGroup(root))?;
        let position = group
            .members
            .last()
            .and_then(|last| self.tabs.iter().position(|t| t == last))
            .map_or(self.tabs.len(), |index| index + 1);
        self.tabs.insert(position, tab);

        // The group is named after its root; pick a new one if the root left.
        let group_root = if tab == root {
            group.members.first().copied().unwrap_or(root)
        } else {
            root
        };
        if group_root != root {
            for member in &group.members {
                self.roots.insert(*member, group_root);
            }
        }
        self.groups.insert(group_root, group);

        self.groups.insert(
            tab,
            TabGroup {
                members: vec![tab],
                last_shown: tab,
            },
        );
        self.roots.insert(tab, tab);

        self.rebuild_index();
        debug!(%tab, %root, %group_root, "moved tab out of group");
        Ok(())
    }

    /// Number of groups, counting single tabs as groups of one.
    pub fn count(&self) -> usize {
        self.group_order.len()
    }

    /// Number of tabs across all groups.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// All tabs in model order.
    pub fn tabs(&self) -> &[TabId] {
        &self.tabs
    }

    /// The last shown tab of the `index`-th group.
    pub fn tab_at(&self, index: usize) -> Option<TabId> {
        let root = self.group_order.get(index)?;
        self.groups.get(root).map(|group| group.last_shown)
    }

    /// Position of `tab`'s group in the group list.
    pub fn index_of(&self, tab: TabId) -> Option<usize> {
        let root = self.roots.get(&tab)?;
        self.group_index.get(root).copied()
    }

    /// The root id of `tab`'s group.
    pub fn root_id(&self, tab: TabId) -> Result<TabId> {
        self.roots
            .get(&tab)
            .copied()
            .ok_or(TabGroupError::UnknownTab(tab))
    }

    /// Every tab in `tab`'s group, in model order.
    pub fn related_tabs(&self, tab: TabId) -> Result<Vec<TabId>> {
        let root = self.root_id(tab)?;
        self.groups
            .get(&root)
            .map(|group| group.members.clone())
            .ok_or(TabGroupError::UnknownGroup(root))
    }

    /// Whether `tab` shares its group with at least one other tab.
    pub fn has_other_related_tabs(&self, tab: TabId) -> bool {
        self.related_tabs(tab).map_or(false, |tabs| tabs.len() > 1)
    }

    /// The last shown tab of the group rooted at `root`.
    pub fn last_shown(&self, root: TabId) -> Option<TabId> {
        self.groups.get(&root).map(|group| group.last_shown)
    }

    /// Number of groups with at least two tabs.
    pub fn actual_group_count(&self) -> usize {
        self.actual_group_count
    }

    fn remove_member(&mut self, root: TabId, tab: TabId) {
        let Some(group) = self.groups.get_mut(&root) else {
            return;
        };
        let Some(position) = group.members.iter().position(|t| *t == tab) else {
            return;
        };
        let was_grouped = group.members.len() >= 2;
        group.members.remove(position);

        if group.members.is_empty() {
            self.groups.remove(&root);
            return;
        }
        if group.last_shown == tab {
            if let Some(next) = group.members.get(position).or(group.members.last()) {
                group.last_shown = *next;
            }
        }
        if was_grouped && group.members.len() == 1 {
            self.actual_group_count -= 1;
        }
    }

    fn rebuild_index(&mut self) {
        self.group_order.clear();
        self.group_index.clear();
        for tab in &self.tabs {
            if let Some(root) = self.roots.get(tab) {
                if !self.group_index.contains_key(root) {
                    self.group_index.insert(*root, self.group_order.len());
                    self.group_order.push(*root);
                }
            }
        }
    }
}
