//! The layout validation scheduler.
//!
//! A [`LayoutValidator`] owns a tree of validate units, one per sizable
//! container, and decides when and in what order their layouts run.
//! Invalidation walks upward to the nearest validate root, the root is
//! queued, and one cooperative callback is requested through the
//! injected [`ScheduleHook`]. The next sweep lays out every queued root,
//! which recursively positions and validates everything beneath it, then
//! drains the post-validate queue.
//!
//! Everything is single-threaded: units live in a slab indexed by
//! [`UnitId`], and tree edges are plain indices, so no reference cycles
//! exist anywhere.

use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::rc::Rc;

use gridbox_core::{GridHint, Insets, LayoutError, MeasureSize, Rect, Size, SizeHints};

use crate::logical::Layout;

/// Stable handle to one validate unit inside a [`LayoutValidator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

/// Receives the "run a sweep on the next cooperative turn" request.
///
/// The validator guarantees at most one outstanding request: after
/// `schedule` fires, no further call happens until the next sweep runs.
/// The host environment decides what a turn is (a microtask, a timer, an
/// event-loop tick) and must eventually call
/// [`LayoutValidator::validate`].
pub trait ScheduleHook {
    /// Request one sweep on the next turn.
    fn schedule(&mut self);
}

/// Hook for hosts that drive validation by calling
/// [`LayoutValidator::validate`] themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualSchedule;

impl ScheduleHook for ManualSchedule {
    fn schedule(&mut self) {}
}

/// One sizable container tracked by the validator.
struct ValidateUnit {
    parent: Option<UnitId>,
    children: Vec<UnitId>,
    layout: Option<Box<dyn Layout>>,
    measure: Rc<dyn MeasureSize>,
    hint: GridHint,
    insets: Insets,
    bounds: Rect,
    validate_root: bool,
    valid: bool,
    pending: bool,
    cached_size: Option<(SizeHints, Size)>,
}

impl ValidateUnit {
    fn new(parent: Option<UnitId>, measure: Rc<dyn MeasureSize>) -> Self {
        Self {
            parent,
            children: Vec::new(),
            layout: None,
            measure,
            hint: GridHint::default(),
            insets: Insets::ZERO,
            bounds: Rect::ZERO,
            validate_root: false,
            valid: false,
            pending: false,
            cached_size: None,
        }
    }
}

struct PostValidateEntry {
    owner: Option<UnitId>,
    callback: Box<dyn FnOnce(&mut LayoutValidator)>,
}

type ErrorHandler = Box<dyn FnMut(&LayoutError)>;

/// Process-wide scheduler coordinating when container layouts run.
pub struct LayoutValidator {
    units: Vec<Option<ValidateUnit>>,
    free: Vec<usize>,
    pending: Vec<UnitId>,
    post_validate: VecDeque<PostValidateEntry>,
    suppressed: bool,
    scheduled: bool,
    validating: bool,
    hook: Box<dyn ScheduleHook>,
    on_error: ErrorHandler,
}

impl fmt::Debug for LayoutValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutValidator")
            .field("units", &self.units.iter().filter(|u| u.is_some()).count())
            .field("pending", &self.pending)
            .field("suppressed", &self.suppressed)
            .field("scheduled", &self.scheduled)
            .finish_non_exhaustive()
    }
}

impl Default for LayoutValidator {
    fn default() -> Self {
        Self::new(ManualSchedule)
    }
}

impl LayoutValidator {
    /// Create a validator with the given scheduling hook. Layout errors
    /// are logged via `log::error!` until a handler is installed with
    /// [`Self::set_error_handler`].
    #[must_use]
    pub fn new(hook: impl ScheduleHook + 'static) -> Self {
        Self {
            units: Vec::new(),
            free: Vec::new(),
            pending: Vec::new(),
            post_validate: VecDeque::new(),
            suppressed: false,
            scheduled: false,
            validating: false,
            hook: Box::new(hook),
            on_error: Box::new(|err| log::error!("layout: {err}")),
        }
    }

    /// Install the process-wide handler that receives errors caught at
    /// the sweep boundary.
    pub fn set_error_handler(&mut self, handler: impl FnMut(&LayoutError) + 'static) {
        self.on_error = Box::new(handler);
    }

    // ---- unit lifecycle ----------------------------------------------

    /// Create a tree root. Roots are implicit validate roots: upward
    /// invalidation always terminates there.
    pub fn create_root(&mut self, measure: Rc<dyn MeasureSize>) -> UnitId {
        self.alloc(ValidateUnit::new(None, measure))
    }

    /// Create a unit beneath `parent`.
    pub fn create_unit(
        &mut self,
        parent: UnitId,
        measure: Rc<dyn MeasureSize>,
    ) -> Result<UnitId, LayoutError> {
        if self.unit(parent).is_none() {
            return Err(LayoutError::configuration(format!(
                "parent unit {parent:?} does not exist"
            )));
        }
        let id = self.alloc(ValidateUnit::new(Some(parent), measure));
        if let Some(unit) = self.unit_mut(parent) {
            unit.children.push(id);
        }
        Ok(id)
    }

    /// Remove `id` and its whole subtree, purging every pending-list
    /// entry and owned post-validate callback that references it.
    pub fn remove_unit(&mut self, id: UnitId) {
        let doomed = self.subtree(id);
        if doomed.is_empty() {
            return;
        }
        if let Some(parent) = self.unit(id).and_then(|u| u.parent) {
            if let Some(unit) = self.unit_mut(parent) {
                unit.children.retain(|&c| c != id);
            }
        }
        self.pending.retain(|p| !doomed.contains(p));
        self.post_validate
            .retain(|entry| entry.owner.map_or(true, |owner| !doomed.contains(&owner)));
        for UnitId(index) in doomed {
            self.units[index] = None;
            self.free.push(index);
        }
    }

    /// Attach the unit's layout strategy (exactly one per unit).
    pub fn set_layout(&mut self, id: UnitId, layout: Box<dyn Layout>) {
        if let Some(unit) = self.unit_mut(id) {
            unit.layout = Some(layout);
            unit.valid = false;
            unit.cached_size = None;
        }
    }

    /// Mark or unmark `id` as a boundary where upward invalidation stops.
    pub fn set_validate_root(&mut self, id: UnitId, validate_root: bool) {
        if let Some(unit) = self.unit_mut(id) {
            unit.validate_root = validate_root;
        }
    }

    /// Replace the unit's grid hint and invalidate its tree when it
    /// changed.
    pub fn set_hint(&mut self, id: UnitId, hint: GridHint) {
        let changed = match self.unit_mut(id) {
            Some(unit) if unit.hint != hint => {
                unit.hint = hint;
                true
            }
            _ => false,
        };
        if changed {
            self.invalidate_tree(id);
        }
    }

    /// Replace the unit's insets.
    pub fn set_insets(&mut self, id: UnitId, insets: Insets) {
        if let Some(unit) = self.unit_mut(id) {
            unit.insets = insets;
        }
    }

    /// Assign pixel bounds from outside, typically to a root. A size
    /// change marks the unit invalid and queues it.
    pub fn set_bounds(&mut self, id: UnitId, bounds: Rect) {
        let resized = match self.unit_mut(id) {
            Some(unit) => {
                let resized = unit.bounds.size() != bounds.size();
                unit.bounds = bounds;
                resized
            }
            None => false,
        };
        if resized {
            self.invalidate(id);
        }
    }

    /// Current pixel bounds of a unit.
    #[must_use]
    pub fn bounds(&self, id: UnitId) -> Option<Rect> {
        self.unit(id).map(|u| u.bounds)
    }

    /// Child units of `id`, in insertion order.
    #[must_use]
    pub fn children(&self, id: UnitId) -> Vec<UnitId> {
        self.unit(id).map(|u| u.children.clone()).unwrap_or_default()
    }

    /// Whether the unit's layout is up to date.
    #[must_use]
    pub fn is_valid(&self, id: UnitId) -> bool {
        self.unit(id).is_some_and(|u| u.valid)
    }

    /// Whether the unit awaits the next sweep.
    #[must_use]
    pub fn is_pending(&self, id: UnitId) -> bool {
        self.unit(id).is_some_and(|u| u.pending)
    }

    // ---- invalidation ------------------------------------------------

    /// Walk from `id` through its ancestors, marking each invalid, up to
    /// and including the nearest validate root (or the tree root); queue
    /// only that terminal unit. Validating a root validates everything
    /// beneath it, so queueing the boundary alone is enough.
    pub fn invalidate_tree(&mut self, id: UnitId) {
        let mut current = id;
        loop {
            let Some(unit) = self.unit_mut(current) else {
                return;
            };
            unit.valid = false;
            unit.cached_size = None;
            if let Some(layout) = unit.layout.as_mut() {
                layout.invalidate(id);
            }
            match unit.parent {
                Some(parent) if !unit.validate_root => current = parent,
                _ => break,
            }
        }
        self.invalidate(current);
    }

    /// Queue one unit for the next sweep. Idempotent: a unit already
    /// pending is only rescheduled. The queue keeps ancestors before
    /// their pending descendants, so a descendant is never laid out
    /// before the ancestor that positions it.
    pub fn invalidate(&mut self, id: UnitId) {
        let Some(unit) = self.unit_mut(id) else {
            return;
        };
        if unit.pending {
            self.schedule();
            return;
        }
        unit.pending = true;
        unit.valid = false;
        unit.cached_size = None;
        let position = self
            .pending
            .iter()
            .position(|&queued| self.is_descendant_or_self(queued, id));
        match position {
            Some(index) => self.pending.insert(index, id),
            None => self.pending.push(id),
        }
        self.schedule();
    }

    /// Drop every pending unit inside the subtree of `ancestor`, along
    /// with post-validate callbacks owned there. Called before detaching
    /// a subtree so a later sweep never touches a unit whose external
    /// size provider is gone.
    pub fn cleanup_invalid_components(&mut self, ancestor: UnitId) {
        let pending = mem::take(&mut self.pending);
        let (inside, keep): (Vec<UnitId>, Vec<UnitId>) = pending
            .into_iter()
            .partition(|&p| self.is_descendant_or_self(p, ancestor));
        self.pending = keep;
        for id in inside {
            if let Some(unit) = self.unit_mut(id) {
                unit.pending = false;
            }
        }
        let inside_subtree: Vec<UnitId> = self.subtree(ancestor);
        self.post_validate
            .retain(|entry| entry.owner.map_or(true, |owner| !inside_subtree.contains(&owner)));
    }

    // ---- suppression -------------------------------------------------

    /// Defer the effect of [`Self::validate`] without discarding pending
    /// work, for bulk mutations that would otherwise trigger premature
    /// passes.
    pub fn suppress_validate(&mut self) {
        self.suppressed = true;
    }

    /// Lift suppression and schedule exactly one fresh sweep if work is
    /// waiting.
    pub fn unsuppress_validate(&mut self) {
        if !self.suppressed {
            return;
        }
        self.suppressed = false;
        if !self.pending.is_empty() || !self.post_validate.is_empty() {
            self.scheduled = false;
            self.schedule();
        }
    }

    // ---- validation sweep --------------------------------------------

    /// Run one validation sweep: lay out every queued root still pending,
    /// then drain the post-validate queue FIFO.
    ///
    /// While suppressed this is a no-op that keeps the queues intact. A
    /// failure inside one unit's layout is forwarded to the error handler
    /// and the sweep continues with the remaining units. Re-entrant calls
    /// violate the scheduler contract and are reported without touching
    /// the queues.
    pub fn validate(&mut self) {
        if self.suppressed {
            return;
        }
        if self.validating {
            let err = LayoutError::scheduler("validate() re-entered during an active sweep");
            (self.on_error)(&err);
            return;
        }
        self.scheduled = false;
        self.validating = true;
        let snapshot = mem::take(&mut self.pending);
        for id in snapshot {
            if !self.is_pending(id) {
                continue;
            }
            if let Err(err) = self.validate_unit(id) {
                (self.on_error)(&err);
            }
        }
        self.validating = false;
        // Callbacks queued during the drain belong to the next sweep.
        let mut queue = mem::take(&mut self.post_validate);
        while let Some(entry) = queue.pop_front() {
            (entry.callback)(self);
        }
    }

    /// Defer a one-shot callback to run after the current (or next)
    /// sweep's unit pass.
    pub fn schedule_post_validate(&mut self, callback: impl FnOnce(&mut Self) + 'static) {
        self.post_validate.push_back(PostValidateEntry {
            owner: None,
            callback: Box::new(callback),
        });
        self.schedule();
    }

    /// Like [`Self::schedule_post_validate`], but tied to a unit: the
    /// callback is discarded when that unit's subtree is removed or
    /// cleaned up before it runs.
    pub fn schedule_post_validate_for(
        &mut self,
        owner: UnitId,
        callback: impl FnOnce(&mut Self) + 'static,
    ) {
        self.post_validate.push_back(PostValidateEntry {
            owner: Some(owner),
            callback: Box::new(callback),
        });
        self.schedule();
    }

    /// Preferred size of a unit under the given hints, computed through
    /// its layout when it has one and its measure provider otherwise.
    /// Results are cached per unit until the next invalidation.
    pub fn preferred_size(
        &mut self,
        id: UnitId,
        hints: &SizeHints,
    ) -> Result<Size, LayoutError> {
        let Some(unit) = self.unit(id) else {
            return Err(LayoutError::scheduler(format!(
                "preferred_size requested for removed unit {id:?}"
            )));
        };
        if let Some((cached_hints, size)) = unit.cached_size {
            if cached_hints == *hints {
                return Ok(size);
            }
        }
        let size = match self.take_layout(id) {
            Some(layout) => {
                let mut ctx = LayoutContext {
                    validator: self,
                    unit: id,
                };
                let result = layout.preferred_layout_size(&mut ctx, hints);
                self.put_layout(id, layout);
                result?
            }
            None => {
                let measure = self
                    .unit(id)
                    .map(|u| Rc::clone(&u.measure))
                    .ok_or_else(|| LayoutError::scheduler("unit vanished during measurement"))?;
                measure.preferred_size(hints)
            }
        };
        if let Some(unit) = self.unit_mut(id) {
            unit.cached_size = Some((*hints, size));
        }
        Ok(size)
    }

    /// Lay out one unit, then recursively validate its invalid children.
    ///
    /// The pending flag is cleared before the layout runs: a layout that
    /// re-invalidates something queues a fresh sweep instead of being
    /// swallowed by the current one.
    fn validate_unit(&mut self, id: UnitId) -> Result<(), LayoutError> {
        match self.unit_mut(id) {
            Some(unit) => {
                unit.pending = false;
                unit.valid = true;
            }
            None => return Ok(()),
        }
        let result = match self.take_layout(id) {
            Some(mut layout) => {
                let mut ctx = LayoutContext {
                    validator: self,
                    unit: id,
                };
                let result = layout.layout(&mut ctx);
                self.put_layout(id, layout);
                result
            }
            None => Ok(()),
        };
        for child in self.children(id) {
            if self.unit(child).is_some_and(|u| !u.valid) {
                if let Err(err) = self.validate_unit(child) {
                    (self.on_error)(&err);
                }
            }
        }
        result
    }

    // ---- internals ---------------------------------------------------

    fn schedule(&mut self) {
        if self.scheduled {
            return;
        }
        self.scheduled = true;
        self.hook.schedule();
    }

    fn alloc(&mut self, unit: ValidateUnit) -> UnitId {
        match self.free.pop() {
            Some(index) => {
                self.units[index] = Some(unit);
                UnitId(index)
            }
            None => {
                self.units.push(Some(unit));
                UnitId(self.units.len() - 1)
            }
        }
    }

    fn unit(&self, id: UnitId) -> Option<&ValidateUnit> {
        self.units.get(id.0).and_then(Option::as_ref)
    }

    fn unit_mut(&mut self, id: UnitId) -> Option<&mut ValidateUnit> {
        self.units.get_mut(id.0).and_then(Option::as_mut)
    }

    fn take_layout(&mut self, id: UnitId) -> Option<Box<dyn Layout>> {
        self.unit_mut(id).and_then(|u| u.layout.take())
    }

    fn put_layout(&mut self, id: UnitId, layout: Box<dyn Layout>) {
        if let Some(unit) = self.unit_mut(id) {
            unit.layout = Some(layout);
        }
    }

    fn is_descendant_or_self(&self, id: UnitId, ancestor: UnitId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.unit(c).and_then(|u| u.parent);
        }
        false
    }

    fn subtree(&self, id: UnitId) -> Vec<UnitId> {
        if self.unit(id).is_none() {
            return Vec::new();
        }
        let mut out = vec![id];
        let mut cursor = 0;
        while cursor < out.len() {
            let current = out[cursor];
            cursor += 1;
            if let Some(unit) = self.unit(current) {
                out.extend(&unit.children);
            }
        }
        out
    }
}

/// Window through which a [`Layout`] reads and writes its container's
/// state during a sweep.
pub struct LayoutContext<'a> {
    validator: &'a mut LayoutValidator,
    unit: UnitId,
}

impl LayoutContext<'_> {
    /// The container being laid out.
    #[must_use]
    pub const fn unit(&self) -> UnitId {
        self.unit
    }

    /// The container's assigned pixel bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.validator.bounds(self.unit).unwrap_or(Rect::ZERO)
    }

    /// The container's insets.
    #[must_use]
    pub fn insets(&self) -> Insets {
        self.validator
            .unit(self.unit)
            .map_or(Insets::ZERO, |u| u.insets)
    }

    /// The content area in container-local coordinates: the bounds at
    /// the origin, shrunk by the insets.
    #[must_use]
    pub fn content_bounds(&self) -> Rect {
        Rect::from_size(self.bounds().size()).inset(&self.insets())
    }

    /// Number of direct children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.validator
            .unit(self.unit)
            .map_or(0, |u| u.children.len())
    }

    /// Grid hints of the direct children, in child order.
    #[must_use]
    pub fn child_hints(&self) -> Vec<GridHint> {
        self.validator
            .unit(self.unit)
            .map(|u| {
                u.children
                    .iter()
                    .filter_map(|&c| self.validator.unit(c).map(|child| child.hint))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Measured preferred size of the child at `index`.
    pub fn child_preferred_size(
        &mut self,
        index: usize,
        hints: &SizeHints,
    ) -> Result<Size, LayoutError> {
        match self.child_at(index) {
            Some(child) => self.validator.preferred_size(child, hints),
            None => Ok(Size::ZERO),
        }
    }

    /// Assign pixel bounds to the child at `index`, in container-local
    /// coordinates. A size change marks the child invalid so the sweep
    /// re-validates it after this layout returns.
    pub fn set_child_bounds(&mut self, index: usize, bounds: Rect) {
        let Some(child) = self.child_at(index) else {
            return;
        };
        if let Some(unit) = self.validator.unit_mut(child) {
            let resized = unit.bounds.size() != bounds.size();
            unit.bounds = bounds;
            if resized {
                unit.valid = false;
                unit.cached_size = None;
            }
        }
    }

    fn child_at(&self, index: usize) -> Option<UnitId> {
        self.validator
            .unit(self.unit)
            .and_then(|u| u.children.get(index).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use gridbox_core::FixedSize;

    /// Hook counting how often a new turn was requested.
    #[derive(Debug, Clone, Default)]
    struct CountingHook(Rc<Cell<usize>>);

    impl ScheduleHook for CountingHook {
        fn schedule(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    /// Layout that counts its `layout` calls and optionally fails.
    #[derive(Debug)]
    struct RecordingLayout {
        calls: Rc<Cell<usize>>,
        fail: bool,
    }

    impl RecordingLayout {
        fn new(calls: &Rc<Cell<usize>>) -> Box<Self> {
            Box::new(Self {
                calls: Rc::clone(calls),
                fail: false,
            })
        }

        fn failing(calls: &Rc<Cell<usize>>) -> Box<Self> {
            Box::new(Self {
                calls: Rc::clone(calls),
                fail: true,
            })
        }
    }

    impl Layout for RecordingLayout {
        fn layout(&mut self, _ctx: &mut LayoutContext<'_>) -> Result<(), LayoutError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(LayoutError::configuration("layout failure for testing"));
            }
            Ok(())
        }

        fn preferred_layout_size(
            &self,
            _ctx: &mut LayoutContext<'_>,
            _hints: &SizeHints,
        ) -> Result<Size, LayoutError> {
            Ok(Size::ZERO)
        }
    }

    fn measure() -> Rc<dyn MeasureSize> {
        Rc::new(FixedSize(Size::new(10, 10)))
    }

    #[test]
    fn test_double_invalidation_coalesces_to_one_layout() {
        let calls = Rc::new(Cell::new(0));
        let mut validator = LayoutValidator::default();
        let root = validator.create_root(measure());
        validator.set_layout(root, RecordingLayout::new(&calls));

        validator.invalidate(root);
        validator.invalidate(root);
        validator.validate();
        assert_eq!(calls.get(), 1);

        // Nothing pending; another sweep is a no-op.
        validator.validate();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_parent_sweep_covers_independently_pending_child() {
        let parent_calls = Rc::new(Cell::new(0));
        let child_calls = Rc::new(Cell::new(0));
        let mut validator = LayoutValidator::default();
        let parent = validator.create_root(measure());
        let child = validator.create_unit(parent, measure()).unwrap();
        validator.set_layout(parent, RecordingLayout::new(&parent_calls));
        validator.set_layout(child, RecordingLayout::new(&child_calls));

        // Child queued first; the parent must still run first and its
        // recursion satisfies the child's pending state.
        validator.invalidate(child);
        validator.invalidate(parent);
        assert_eq!(validator.pending, vec![parent, child]);

        validator.validate();
        assert_eq!(parent_calls.get(), 1);
        assert_eq!(child_calls.get(), 1);
        assert!(validator.is_valid(child));
        assert!(!validator.is_pending(child));
    }

    #[test]
    fn test_invalidate_tree_stops_at_validate_root() {
        let mut validator = LayoutValidator::default();
        let root = validator.create_root(measure());
        let mid = validator.create_unit(root, measure()).unwrap();
        let leaf = validator.create_unit(mid, measure()).unwrap();
        validator.set_validate_root(mid, true);

        validator.invalidate_tree(leaf);
        assert_eq!(validator.pending, vec![mid]);
        assert!(!validator.is_valid(leaf));
        assert!(!validator.is_valid(mid));
        assert!(validator.is_pending(mid));
        // Propagation stopped below the root.
        assert!(!validator.is_pending(root));
    }

    #[test]
    fn test_cleanup_purges_pending_subtree() {
        let mut validator = LayoutValidator::default();
        let root = validator.create_root(measure());
        let branch = validator.create_unit(root, measure()).unwrap();
        let leaf = validator.create_unit(branch, measure()).unwrap();
        validator.set_validate_root(branch, true);
        validator.set_validate_root(leaf, true);

        validator.invalidate(root);
        validator.invalidate(branch);
        validator.invalidate(leaf);
        validator.cleanup_invalid_components(branch);

        assert_eq!(validator.pending, vec![root]);
        assert!(!validator.is_pending(branch));
        assert!(!validator.is_pending(leaf));

        validator.remove_unit(branch);
        // The sweep after detaching must not touch the removed units.
        validator.validate();
        assert!(validator.is_valid(root));
    }

    #[test]
    fn test_suppress_defers_and_unsuppress_schedules_once() {
        let calls = Rc::new(Cell::new(0));
        let turns = Rc::new(Cell::new(0));
        let mut validator = LayoutValidator::new(CountingHook(Rc::clone(&turns)));
        let root = validator.create_root(measure());
        validator.set_layout(root, RecordingLayout::new(&calls));

        validator.suppress_validate();
        validator.invalidate(root);
        validator.validate();
        assert_eq!(calls.get(), 0);
        assert!(validator.is_pending(root));

        let turns_before = turns.get();
        validator.unsuppress_validate();
        assert_eq!(turns.get(), turns_before + 1);

        validator.validate();
        assert_eq!(calls.get(), 1);
        assert!(!validator.is_pending(root));
    }

    #[test]
    fn test_schedules_at_most_one_turn() {
        let turns = Rc::new(Cell::new(0));
        let mut validator = LayoutValidator::new(CountingHook(Rc::clone(&turns)));
        let root = validator.create_root(measure());

        validator.invalidate(root);
        validator.invalidate(root);
        validator.invalidate_tree(root);
        assert_eq!(turns.get(), 1);

        validator.validate();
        validator.invalidate(root);
        assert_eq!(turns.get(), 2);
    }

    #[test]
    fn test_failing_unit_does_not_block_sweep() {
        let failing_calls = Rc::new(Cell::new(0));
        let ok_calls = Rc::new(Cell::new(0));
        let errors: Rc<RefCell<Vec<LayoutError>>> = Rc::default();

        let mut validator = LayoutValidator::default();
        let sink = Rc::clone(&errors);
        validator.set_error_handler(move |err| sink.borrow_mut().push(err.clone()));

        let bad = validator.create_root(measure());
        let good = validator.create_root(measure());
        validator.set_layout(bad, RecordingLayout::failing(&failing_calls));
        validator.set_layout(good, RecordingLayout::new(&ok_calls));

        validator.invalidate(bad);
        validator.invalidate(good);
        validator.validate();

        assert_eq!(failing_calls.get(), 1);
        assert_eq!(ok_calls.get(), 1);
        assert_eq!(errors.borrow().len(), 1);
        assert!(matches!(
            errors.borrow()[0],
            LayoutError::Configuration { .. }
        ));
    }

    #[test]
    fn test_post_validate_runs_fifo_after_sweep() {
        let order: Rc<RefCell<Vec<&'static str>>> = Rc::default();
        let calls = Rc::new(Cell::new(0));
        let mut validator = LayoutValidator::default();
        let root = validator.create_root(measure());

        let log = Rc::clone(&order);
        validator.set_layout(
            root,
            Box::new(OrderedLayout {
                calls: Rc::clone(&calls),
                order: Rc::clone(&order),
            }),
        );
        validator.invalidate(root);
        validator.schedule_post_validate(move |_| log.borrow_mut().push("first"));
        let log = Rc::clone(&order);
        validator.schedule_post_validate(move |_| log.borrow_mut().push("second"));

        validator.validate();
        assert_eq!(*order.borrow(), vec!["layout", "first", "second"]);

        // Each callback ran exactly once.
        validator.validate();
        assert_eq!(order.borrow().len(), 3);
    }

    #[derive(Debug)]
    struct OrderedLayout {
        calls: Rc<Cell<usize>>,
        order: Rc<RefCell<Vec<&'static str>>>,
    }

    impl Layout for OrderedLayout {
        fn layout(&mut self, _ctx: &mut LayoutContext<'_>) -> Result<(), LayoutError> {
            self.calls.set(self.calls.get() + 1);
            self.order.borrow_mut().push("layout");
            Ok(())
        }

        fn preferred_layout_size(
            &self,
            _ctx: &mut LayoutContext<'_>,
            _hints: &SizeHints,
        ) -> Result<Size, LayoutError> {
            Ok(Size::ZERO)
        }
    }

    #[test]
    fn test_remove_unit_purges_owned_callbacks() {
        let hits = Rc::new(Cell::new(0));
        let mut validator = LayoutValidator::default();
        let root = validator.create_root(measure());
        let child = validator.create_unit(root, measure()).unwrap();

        let counter = Rc::clone(&hits);
        validator.schedule_post_validate_for(child, move |_| counter.set(counter.get() + 1));
        let counter = Rc::clone(&hits);
        validator.schedule_post_validate_for(root, move |_| counter.set(counter.get() + 10));

        validator.invalidate(child);
        validator.remove_unit(child);
        assert!(validator.pending.is_empty());

        validator.validate();
        // Only the root-owned callback survived.
        assert_eq!(hits.get(), 10);
    }

    #[test]
    fn test_preferred_size_is_cached_until_invalidation() {
        #[derive(Debug)]
        struct CountingMeasure {
            calls: Cell<usize>,
            size: Size,
        }
        impl MeasureSize for CountingMeasure {
            fn preferred_size(&self, _hints: &SizeHints) -> Size {
                self.calls.set(self.calls.get() + 1);
                self.size
            }
        }

        let provider = Rc::new(CountingMeasure {
            calls: Cell::new(0),
            size: Size::new(30, 20),
        });
        let mut validator = LayoutValidator::default();
        let root = validator.create_root(Rc::<CountingMeasure>::clone(&provider));

        let hints = SizeHints::none();
        assert_eq!(validator.preferred_size(root, &hints).unwrap(), Size::new(30, 20));
        assert_eq!(validator.preferred_size(root, &hints).unwrap(), Size::new(30, 20));
        assert_eq!(provider.calls.get(), 1);

        let wider = SizeHints::none().with_width(100);
        validator.preferred_size(root, &wider).unwrap();
        assert_eq!(provider.calls.get(), 2);

        validator.invalidate(root);
        validator.preferred_size(root, &wider).unwrap();
        assert_eq!(provider.calls.get(), 3);
    }
}
