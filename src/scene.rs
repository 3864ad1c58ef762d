//! Keyed label mounts. Each visible region owns one mount for the lifetime
//! of its key; mounts are reconciled enter/update/exit against the active
//! key set, and each one carries at most one live feedback handle plus a
//! content-version counter guarding against stale callbacks.
//!
//! Everything coarser than this — any change to region data, colors,
//! stroke, label config, render hooks, the active key, or the show-labels
//! flag — is handled by rebuilding the whole layer from scratch, not by
//! patching. That is a deliberate correctness-over-efficiency choice.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::feedback::{FeedbackHandle, Scheduler, schedule_dimension_feedback};
use crate::layout::Size;

/// One label's mount point. Owns the scheduled feedback for its current
/// content; replacing the content cancels the old passes.
pub struct MountHandle {
    version: u64,
    feedback: Option<FeedbackHandle>,
}

impl MountHandle {
    pub fn version(&self) -> u64 {
        self.version
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileDiff {
    pub entered: Vec<String>,
    pub retained: Vec<String>,
    pub exited: Vec<String>,
}

pub struct MountRegistry {
    scheduler: Rc<dyn Scheduler>,
    mounts: BTreeMap<String, MountHandle>,
}

impl MountRegistry {
    pub fn new(scheduler: Rc<dyn Scheduler>) -> Self {
        Self {
            scheduler,
            mounts: BTreeMap::new(),
        }
    }

    /// Enter/update/exit join against the active key set. Exited mounts are
    /// torn down immediately, cancelling their pending feedback.
    pub fn reconcile<I, S>(&mut self, active: I) -> ReconcileDiff
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut diff = ReconcileDiff::default();
        let mut incoming: Vec<String> = active.into_iter().map(|k| k.as_ref().to_string()).collect();
        incoming.dedup();

        for key in &incoming {
            if self.mounts.contains_key(key) {
                diff.retained.push(key.clone());
            } else {
                self.mounts.insert(
                    key.clone(),
                    MountHandle {
                        version: 0,
                        feedback: None,
                    },
                );
                diff.entered.push(key.clone());
            }
        }

        let keep: std::collections::BTreeSet<&String> = incoming.iter().collect();
        let exited: Vec<String> = self
            .mounts
            .keys()
            .filter(|k| !keep.contains(k))
            .cloned()
            .collect();
        for key in &exited {
            // Dropping the handle cancels its scheduled passes.
            self.mounts.remove(key);
        }
        diff.exited = exited;
        diff
    }

    /// Assigns new content to a mounted key: bumps the content version,
    /// cancels feedback owned by the previous content, and schedules the
    /// measurement passes for the new one. Returns the new version, or
    /// `None` when the key is not mounted.
    pub fn set_content(
        &mut self,
        key: &str,
        measure: Rc<dyn Fn() -> Option<Size>>,
        on_corrected: Rc<dyn Fn(f32, f32)>,
    ) -> Option<u64> {
        let mount = self.mounts.get_mut(key)?;
        mount.version += 1;
        if let Some(mut previous) = mount.feedback.take() {
            previous.cancel();
        }
        mount.feedback = Some(schedule_dimension_feedback(
            self.scheduler.clone(),
            measure,
            on_corrected,
        ));
        Some(mount.version)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.mounts.contains_key(key)
    }

    pub fn version_of(&self, key: &str) -> Option<u64> {
        self.mounts.get(key).map(|m| m.version)
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    /// Full teardown: every mount is dropped and every pending pass
    /// cancelled.
    pub fn clear(&mut self) {
        self.mounts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::{CONFIRM_DELAY_MS, ManualScheduler};
    use std::cell::RefCell;

    fn measure_const(w: f32, h: f32) -> Rc<dyn Fn() -> Option<Size>> {
        Rc::new(move || Some(Size { w, h }))
    }

    fn counting_sink(count: &Rc<RefCell<u32>>) -> Rc<dyn Fn(f32, f32)> {
        let count = count.clone();
        Rc::new(move |_w, _h| *count.borrow_mut() += 1)
    }

    #[test]
    fn reconcile_enters_retains_exits() {
        let scheduler = ManualScheduler::new();
        let mut registry = MountRegistry::new(scheduler);

        let diff = registry.reconcile(["26", "27", "35"]);
        assert_eq!(diff.entered, vec!["26", "27", "35"]);
        assert!(diff.exited.is_empty());

        let diff = registry.reconcile(["27", "35", "8"]);
        assert_eq!(diff.entered, vec!["8"]);
        assert_eq!(diff.retained, vec!["27", "35"]);
        assert_eq!(diff.exited, vec!["26"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn set_content_bumps_version() {
        let scheduler = ManualScheduler::new();
        let mut registry = MountRegistry::new(scheduler);
        registry.reconcile(["26"]);
        assert_eq!(registry.version_of("26"), Some(0));

        let count = Rc::new(RefCell::new(0u32));
        let v1 = registry.set_content("26", measure_const(10.0, 10.0), counting_sink(&count));
        let v2 = registry.set_content("26", measure_const(10.0, 10.0), counting_sink(&count));
        assert_eq!(v1, Some(1));
        assert_eq!(v2, Some(2));
        assert_eq!(registry.set_content("missing", measure_const(1.0, 1.0), counting_sink(&count)), None);
    }

    #[test]
    fn superseded_content_never_reports() {
        let scheduler = ManualScheduler::new();
        let mut registry = MountRegistry::new(scheduler.clone());
        registry.reconcile(["26"]);

        let stale = Rc::new(RefCell::new(0u32));
        let fresh = Rc::new(RefCell::new(0u32));
        registry.set_content("26", measure_const(10.0, 10.0), counting_sink(&stale));
        // Supersede before anything fires.
        registry.set_content("26", measure_const(20.0, 20.0), counting_sink(&fresh));

        scheduler.run_settle();
        scheduler.advance(CONFIRM_DELAY_MS);
        assert_eq!(*stale.borrow(), 0);
        assert_eq!(*fresh.borrow(), 2);
    }

    #[test]
    fn exit_cancels_pending_feedback() {
        let scheduler = ManualScheduler::new();
        let mut registry = MountRegistry::new(scheduler.clone());
        registry.reconcile(["26"]);

        let count = Rc::new(RefCell::new(0u32));
        registry.set_content("26", measure_const(10.0, 10.0), counting_sink(&count));
        registry.reconcile(Vec::<String>::new());

        scheduler.run_settle();
        scheduler.advance(CONFIRM_DELAY_MS);
        assert_eq!(*count.borrow(), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn clear_tears_down_everything() {
        let scheduler = ManualScheduler::new();
        let mut registry = MountRegistry::new(scheduler.clone());
        registry.reconcile(["1", "2"]);

        let count = Rc::new(RefCell::new(0u32));
        registry.set_content("1", measure_const(10.0, 10.0), counting_sink(&count));
        registry.set_content("2", measure_const(10.0, 10.0), counting_sink(&count));
        registry.clear();

        scheduler.run_settle();
        scheduler.advance(CONFIRM_DELAY_MS);
        assert_eq!(*count.borrow(), 0);
        assert_eq!(scheduler.pending(), 0);
    }
}
