//! Rendered-size feedback for labels. The synthetic text estimate can be
//! wrong for custom label markup, so after content mounts, its real box is
//! read back and the container resized — without re-running placement.
//!
//! Scheduling is single-threaded and cooperative: one pass after the
//! render settles, one delayed confirmation pass for late layout shifts
//! (web fonts, async images). All passes belong to the content version
//! that scheduled them; superseding or tearing down that content cancels
//! them, so a stale measurement can never win.

use std::cell::RefCell;
use std::rc::Rc;

use crate::layout::Size;

/// Delay of the confirmation pass.
pub const CONFIRM_DELAY_MS: u64 = 100;
/// Padding added per side to the measured content box, mirroring the
/// estimate's padding.
pub const FEEDBACK_PAD_X: f32 = 10.0;
pub const FEEDBACK_PAD_Y: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

/// Host scheduling capability. `after_render_settle` fires once rendered
/// layout has settled (a frame boundary); `after_delay` fires after a fixed
/// delay. Both must honor `cancel` for not-yet-fired tasks.
pub trait Scheduler {
    fn after_render_settle(&self, task: Box<dyn FnOnce()>) -> TaskId;
    fn after_delay(&self, task: Box<dyn FnOnce()>, delay_ms: u64) -> TaskId;
    fn cancel(&self, id: TaskId);
}

/// Owns the scheduled passes for one piece of label content. Dropping the
/// handle cancels anything still pending.
pub struct FeedbackHandle {
    scheduler: Rc<dyn Scheduler>,
    tasks: Vec<TaskId>,
    cancelled: bool,
}

impl FeedbackHandle {
    pub fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        for id in &self.tasks {
            self.scheduler.cancel(*id);
        }
        self.cancelled = true;
    }
}

impl Drop for FeedbackHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Schedules the two measurement passes. `measure` reads the content's
/// rendered box (unpadded); `on_corrected` receives the padded dimensions.
/// Both passes may fire and both report; last write wins, which is fine
/// since they target the same content version.
pub fn schedule_dimension_feedback(
    scheduler: Rc<dyn Scheduler>,
    measure: Rc<dyn Fn() -> Option<Size>>,
    on_corrected: Rc<dyn Fn(f32, f32)>,
) -> FeedbackHandle {
    let settle = {
        let measure = measure.clone();
        let on_corrected = on_corrected.clone();
        scheduler.after_render_settle(Box::new(move || run_pass(&*measure, &*on_corrected)))
    };
    let confirm = scheduler.after_delay(
        Box::new(move || run_pass(&*measure, &*on_corrected)),
        CONFIRM_DELAY_MS,
    );
    FeedbackHandle {
        scheduler,
        tasks: vec![settle, confirm],
        cancelled: false,
    }
}

// A failed or degenerate measurement never propagates: the label keeps its
// estimated size and the pass is skipped.
fn run_pass(measure: &dyn Fn() -> Option<Size>, on_corrected: &dyn Fn(f32, f32)) {
    match measure() {
        Some(size) if size.w > 0.0 && size.h > 0.0 => {
            let w = size.w.ceil() + FEEDBACK_PAD_X * 2.0;
            let h = size.h.ceil() + FEEDBACK_PAD_Y * 2.0;
            on_corrected(w, h);
        }
        Some(_) => {
            tracing::warn!("label measurement returned a degenerate box; keeping estimated size")
        }
        None => tracing::warn!("label measurement failed; keeping estimated size"),
    }
}

type Task = Box<dyn FnOnce()>;

#[derive(Default)]
struct SchedulerState {
    next_id: u64,
    now_ms: u64,
    settle: Vec<(TaskId, Task)>,
    timers: Vec<(TaskId, u64, Task)>,
}

/// Deterministic task queue for tests and headless hosts: nothing runs
/// until the queue is pumped explicitly.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<SchedulerState>,
}

impl ManualScheduler {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Runs every queued render-settle task, in scheduling order.
    pub fn run_settle(&self) {
        // Tasks leave the queue before running: a task may schedule or
        // cancel reentrantly.
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                if state.settle.is_empty() {
                    None
                } else {
                    Some(state.settle.remove(0))
                }
            };
            match next {
                Some((_, task)) => task(),
                None => break,
            }
        }
    }

    /// Advances the virtual clock, firing due timers in (due, id) order.
    pub fn advance(&self, ms: u64) {
        let now = {
            let mut state = self.state.borrow_mut();
            state.now_ms += ms;
            state.now_ms
        };
        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                let mut best: Option<usize> = None;
                for (i, (id, due, _)) in state.timers.iter().enumerate() {
                    if *due <= now {
                        let better = match best {
                            Some(j) => {
                                let (bid, bdue, _) = &state.timers[j];
                                (*due, *id) < (*bdue, *bid)
                            }
                            None => true,
                        };
                        if better {
                            best = Some(i);
                        }
                    }
                }
                best.map(|i| state.timers.remove(i))
            };
            match next {
                Some((_, _, task)) => task(),
                None => break,
            }
        }
    }

    pub fn pending(&self) -> usize {
        let state = self.state.borrow();
        state.settle.len() + state.timers.len()
    }
}

impl Scheduler for ManualScheduler {
    fn after_render_settle(&self, task: Box<dyn FnOnce()>) -> TaskId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = TaskId(state.next_id);
        state.settle.push((id, task));
        id
    }

    fn after_delay(&self, task: Box<dyn FnOnce()>, delay_ms: u64) -> TaskId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = TaskId(state.next_id);
        let due = state.now_ms + delay_ms;
        state.timers.push((id, due, task));
        id
    }

    fn cancel(&self, id: TaskId) {
        let mut state = self.state.borrow_mut();
        state.settle.retain(|(tid, _)| *tid != id);
        state.timers.retain(|(tid, _, _)| *tid != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn fixed_measure(w: f32, h: f32) -> Rc<dyn Fn() -> Option<Size>> {
        Rc::new(move || Some(Size { w, h }))
    }

    #[test]
    fn both_passes_report_padded_dimensions() {
        let scheduler = ManualScheduler::new();
        let reports: Rc<RefCell<Vec<(f32, f32)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let reports = reports.clone();
            Rc::new(move |w: f32, h: f32| reports.borrow_mut().push((w, h)))
        };

        let _handle = schedule_dimension_feedback(
            scheduler.clone(),
            fixed_measure(41.3, 14.0),
            sink,
        );
        assert_eq!(scheduler.pending(), 2);

        scheduler.run_settle();
        scheduler.advance(CONFIRM_DELAY_MS);
        // ceil(41.3) + 20, 14 + 16
        assert_eq!(&*reports.borrow(), &[(62.0, 30.0), (62.0, 30.0)]);
    }

    #[test]
    fn confirmation_waits_for_its_delay() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(RefCell::new(0u32));
        let sink = {
            let count = count.clone();
            Rc::new(move |_w: f32, _h: f32| *count.borrow_mut() += 1)
        };

        let _handle =
            schedule_dimension_feedback(scheduler.clone(), fixed_measure(10.0, 10.0), sink);
        scheduler.run_settle();
        assert_eq!(*count.borrow(), 1);
        scheduler.advance(CONFIRM_DELAY_MS - 1);
        assert_eq!(*count.borrow(), 1);
        scheduler.advance(1);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn cancelled_handle_never_reports() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(RefCell::new(0u32));
        let sink = {
            let count = count.clone();
            Rc::new(move |_w: f32, _h: f32| *count.borrow_mut() += 1)
        };

        let mut handle =
            schedule_dimension_feedback(scheduler.clone(), fixed_measure(10.0, 10.0), sink);
        handle.cancel();
        scheduler.run_settle();
        scheduler.advance(CONFIRM_DELAY_MS);
        assert_eq!(*count.borrow(), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn dropping_handle_cancels_pending_passes() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(RefCell::new(0u32));
        let sink = {
            let count = count.clone();
            Rc::new(move |_w: f32, _h: f32| *count.borrow_mut() += 1)
        };

        {
            let _handle =
                schedule_dimension_feedback(scheduler.clone(), fixed_measure(10.0, 10.0), sink);
        }
        scheduler.run_settle();
        scheduler.advance(CONFIRM_DELAY_MS);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn degenerate_measurement_is_skipped() {
        let scheduler = ManualScheduler::new();
        let count = Rc::new(RefCell::new(0u32));
        let sink = {
            let count = count.clone();
            Rc::new(move |_w: f32, _h: f32| *count.borrow_mut() += 1)
        };

        let _handle = schedule_dimension_feedback(
            scheduler.clone(),
            Rc::new(|| Some(Size { w: 0.0, h: 12.0 })),
            sink.clone(),
        );
        let _handle2 =
            schedule_dimension_feedback(scheduler.clone(), Rc::new(|| None), sink);
        scheduler.run_settle();
        scheduler.advance(CONFIRM_DELAY_MS);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn cancel_mid_sequence_stops_confirmation() {
        // First pass fires, then the content is superseded before the
        // confirmation: the second pass must not run.
        let scheduler = ManualScheduler::new();
        let count = Rc::new(RefCell::new(0u32));
        let sink = {
            let count = count.clone();
            Rc::new(move |_w: f32, _h: f32| *count.borrow_mut() += 1)
        };

        let mut handle =
            schedule_dimension_feedback(scheduler.clone(), fixed_measure(10.0, 10.0), sink);
        scheduler.run_settle();
        assert_eq!(*count.borrow(), 1);
        handle.cancel();
        scheduler.advance(CONFIRM_DELAY_MS);
        assert_eq!(*count.borrow(), 1);
    }
}
